use std::env;
use std::time::Instant;

use anyhow::{Context, Result};
use lumen_core::Scene;
use lumen_renderer::{RayTracer, RenderConfig};

const USAGE: &str = "\
Usage:
  lumen render <config-file> <scene-file> <output-image>
  lumen init-config <config-file>

The output format follows the image extension (png, jpg).
Set RUST_LOG=debug for kd-tree statistics.";

/// A parsed command line.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Render {
        config: &'a str,
        scene: &'a str,
        output: &'a str,
    },
    InitConfig {
        path: &'a str,
    },
}

fn parse_args(args: &[String]) -> Option<Command<'_>> {
    match args {
        [_, cmd, config, scene, output] if cmd == "render" => Some(Command::Render {
            config,
            scene,
            output,
        }),
        [_, cmd, path] if cmd == "init-config" => Some(Command::InitConfig { path }),
        _ => None,
    }
}

fn render(config_path: &str, scene_path: &str, output: &str) -> Result<()> {
    let config = RenderConfig::load_from_file(config_path)?;

    let mut scene = Scene::load(scene_path)?;
    if config.use_kd_tree() {
        let start = Instant::now();
        scene.set_use_spatial_index(true);
        log::info!("Kd-tree built in {:.3}s", start.elapsed().as_secs_f64());
    }

    let tracer = RayTracer::new(config);
    let start = Instant::now();
    let image = tracer.render_image(&scene)?;
    log::info!("Total render time {:.3}s", start.elapsed().as_secs_f64());

    image
        .save(output)
        .with_context(|| format!("Failed to save image to '{output}'"))?;
    log::info!("Saved {}", output);

    Ok(())
}

fn init_config(path: &str) -> Result<()> {
    let config = RenderConfig::default();
    config.save_to_file(path)?;
    println!("Wrote default config to {path}:\n{config}");
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();

    match parse_args(&args) {
        Some(Command::Render { config, scene, output }) => render(config, scene, output),
        Some(Command::InitConfig { path }) => init_config(path),
        None => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }
}
