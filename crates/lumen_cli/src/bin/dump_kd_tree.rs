// Debug tool to inspect the kd-tree built over a scene's triangles
// Run with: cargo run --bin dump_kd_tree -- <scene-file> [capacity]

use std::env;

use anyhow::{Context, Result};
use lumen_core::kd_tree::{KdTree, DEFAULT_CAPACITY};
use lumen_core::Scene;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <scene-file> [capacity]", args[0]);
        std::process::exit(1);
    }

    let capacity = match args.get(2) {
        Some(value) => value
            .parse::<usize>()
            .with_context(|| format!("Invalid capacity '{value}'"))?,
        None => DEFAULT_CAPACITY,
    };

    let scene = Scene::load(&args[1])?;
    let tree = KdTree::build(scene.triangles(), capacity);
    let stats = tree.stats();

    println!("Triangles: {}", scene.triangles().len());
    println!("Leaf capacity: {}", tree.capacity());
    println!(
        "Nodes: {} ({} leaves), depth {}, {} triangle references",
        stats.nodes, stats.leaves, stats.depth, stats.references
    );
    println!();
    print!("{}", tree.dump(scene.triangles()));

    Ok(())
}
