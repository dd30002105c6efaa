//! Example: Load and inspect a scene description.
//!
//! Run with: cargo run --example load_scene -- assets/scenes/spheres.txt

use std::env;

use lumen_core::Scene;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: load_scene <path-to-scene-file>");
        println!("\nExamples:");
        println!("  cargo run --example load_scene -- assets/scenes/spheres.txt");
        println!("  cargo run --example load_scene -- assets/scenes/room.txt");
        return;
    }

    let path = &args[1];
    println!("Loading scene file: {}", path);

    let mut scene = match Scene::load(path) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error loading scene: {}", e);
            std::process::exit(1);
        }
    };

    println!("\n=== Scene ===");
    println!("Ambient: {}", scene.ambient());
    println!("Background: {}", scene.background());
    println!("Lights: {}", scene.lights().len());
    println!("Triangles: {}", scene.triangles().len());
    println!("Spheres: {}", scene.spheres().len());
    println!("Bounds: {}", scene.bounds());

    let camera = scene.camera();
    println!("\n--- Camera ---");
    println!("  Position: {}", camera.position);
    println!("  Rotation: {} rad", camera.rotation);
    println!("  Vertical fov: {:.1} deg", camera.fov_y.to_degrees());

    println!("\n--- Spheres ---");
    for (i, (sphere, attrib)) in scene.spheres().iter().zip(scene.sphere_attribs()).enumerate() {
        println!(
            "  [{}] center {} radius {:.2}, diffuse {}, n = {:.2}",
            i, sphere.center, sphere.radius, attrib.diffuse, attrib.refraction_index
        );
    }

    scene.set_use_spatial_index(true);
    if let Some(tree) = scene.kd_tree() {
        let stats = tree.stats();
        println!("\n--- Kd-tree ---");
        println!(
            "  {} nodes, {} leaves, depth {}, {} triangle references",
            stats.nodes, stats.leaves, stats.depth, stats.references
        );
    }
}
