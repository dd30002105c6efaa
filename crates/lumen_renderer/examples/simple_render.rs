//! Simple ray tracer example.
//!
//! Builds a small scene in code (a checkered floor, a mirror, a glass
//! sphere and a matte sphere) and saves it as a PNG.

use std::f32::consts::FRAC_PI_8;

use lumen_core::{Camera, Light, Scene, SphereAttrib, TriangleAttrib};
use lumen_math::{Sphere, Triangle};
use lumen_renderer::{Color, RayTracer, RenderConfig, Vec3, Vec4};

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    println!("Lumen Ray Tracer - Simple Example");
    println!("=================================");

    let start = std::time::Instant::now();
    let mut scene = build_scene();
    scene.set_use_spatial_index(true);
    println!("Scene built in {:?}", start.elapsed());

    let config = RenderConfig::default()
        .with_resolution(800, 450)
        .with_depth(5)
        .with_anti_aliasing(true)
        .with_threads(std::thread::available_parallelism().map_or(1, |n| n.get() as i64))
        .with_kd_tree(true);

    println!("Rendering {}", config.summary());

    let tracer = RayTracer::new(config);
    let start = std::time::Instant::now();
    let image = tracer.render_image(&scene).expect("Failed to render");
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.png";
    image.save(filename).expect("Failed to save image");
    println!("Saved to {}", filename);
}

fn build_scene() -> Scene {
    let mut scene = Scene::new();
    scene.set_ambient(Color::splat(0.08));
    scene.set_background(Vec4::new(0.05, 0.07, 0.12, 1.0));

    scene.add_light(Light::new(Vec3::new(-4.0, 6.0, 4.0), Color::splat(0.7)));
    scene.add_light(Light::new(Vec3::new(5.0, 3.0, 2.0), Color::new(0.3, 0.25, 0.2)));

    // Floor tiles
    let light_tile = SphereAttrib::matte(Color::splat(0.8));
    let dark_tile = SphereAttrib::matte(Color::splat(0.2));
    for i in -6..6 {
        for j in -10..2 {
            let material = if (i + j) % 2 == 0 { &light_tile } else { &dark_tile };
            let attrib = TriangleAttrib::uniform(Vec3::Y, material);
            let (x, z) = (i as f32, j as f32);

            let a = Vec3::new(x, -1.0, z);
            let b = Vec3::new(x + 1.0, -1.0, z);
            let c = Vec3::new(x + 1.0, -1.0, z + 1.0);
            let d = Vec3::new(x, -1.0, z + 1.0);
            scene.add_triangle(Triangle::new(a, c, b), attrib);
            scene.add_triangle(Triangle::new(a, d, c), attrib);
        }
    }

    // Mirror behind the spheres
    let mirror = SphereAttrib::new(Color::splat(0.05), Color::splat(0.9), 64.0, 1.0);
    let mirror_attrib = TriangleAttrib::uniform(Vec3::Z, &mirror);
    scene.add_triangle(
        Triangle::new(
            Vec3::new(-4.0, -1.0, -9.0),
            Vec3::new(4.0, -1.0, -9.0),
            Vec3::new(0.0, 4.0, -9.0),
        ),
        mirror_attrib,
    );

    // Glass sphere
    scene.add_sphere(
        Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0),
        SphereAttrib::new(Color::splat(0.05), Color::splat(0.9), 32.0, 1.5),
    );

    // Matte spheres
    scene.add_sphere(
        Sphere::new(Vec3::new(-2.3, -0.4, -6.0), 0.6),
        SphereAttrib::matte(Color::new(0.8, 0.2, 0.1)),
    );
    scene.add_sphere(
        Sphere::new(Vec3::new(2.2, -0.5, -4.5), 0.5),
        SphereAttrib::matte(Color::new(0.1, 0.4, 0.8)),
    );

    // Slightly above, looking down at the floor.
    scene.set_camera(Camera::new(Vec3::new(0.0, 1.0, 1.0), Vec3::new(-FRAC_PI_8 / 2.0, 0.0, 0.0)));

    scene
}
