//! Lumen Core - Scene description for the lumen ray tracer.
//!
//! This crate provides:
//!
//! - **Scene types**: `Scene`, `Light`, `Camera` and the per-primitive
//!   materials `TriangleAttrib` / `SphereAttrib`
//! - **Scene loading**: the whitespace-token scene description format
//! - **Spatial index**: a kd-tree over the scene's triangles
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::Scene;
//!
//! let mut scene = Scene::load("scene.txt")?;
//! scene.set_use_spatial_index(true);
//! println!("Loaded {} triangles, {} spheres",
//!     scene.triangles().len(),
//!     scene.spheres().len());
//! ```

pub mod camera;
pub mod kd_tree;
pub mod material;
pub mod parser;
pub mod scene;

// Re-export commonly used types
pub use camera::Camera;
pub use kd_tree::{KdStats, KdTree};
pub use material::{SphereAttrib, SurfacePoint, TriangleAttrib, AIR_REFRACTION_INDEX};
pub use parser::{SceneError, SceneResult};
pub use scene::{Light, Scene};
