//! Scene description text format.
//!
//! The file is a stream of whitespace-separated tokens. It opens with the
//! ambient light and continues with object blocks introduced by a
//! case-insensitive keyword:
//!
//! ```text
//! amb: 0.1 0.1 0.1
//! n_refr 1.5
//! sphere pos: 0 0 -5 rad: 1 dif: 1 0 0 spe: 0.2 0.2 0.2 shi: 16
//! triangle
//!   pos: -1 0 0 nor: 0 0 1 dif: 1 1 1 spe: 0 0 0 shi: 1
//!   pos:  1 0 0 nor: 0 0 1 dif: 1 1 1 spe: 0 0 0 shi: 1
//!   pos:  0 1 0 nor: 0 0 1 dif: 1 1 1 spe: 0 0 0 shi: 1
//! light pos: 0 5 0 col: 1 1 1
//! camera pos: 0 0 5 rot: 0 0 0 scale: 1
//! background-color rgb: 0.2 0.2 0.2 alpha: 1
//! ```
//!
//! `n_refr` sets the refraction index for every primitive that follows it.
//! `obj <path>` is accepted and skipped.

use std::fs;
use std::path::{Path, PathBuf};

use lumen_math::{Sphere, Triangle, Vec3, Vec4};
use thiserror::Error;

use crate::camera::Camera;
use crate::material::{SphereAttrib, TriangleAttrib, AIR_REFRACTION_INDEX};
use crate::scene::{Light, Scene};

/// Errors that can occur while loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error at line {line} in {object}: {message}")]
    Parse {
        line: usize,
        object: String,
        message: String,
    },

    #[error("Unknown object type '{keyword}' at line {line}")]
    UnknownObject { line: usize, keyword: String },

    #[error("Unexpected end of file in {object}: expected {expected}")]
    UnexpectedEof { object: String, expected: String },
}

/// Result type for scene loading.
pub type SceneResult<T> = Result<T, SceneError>;

impl Scene {
    /// Load a scene description from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> SceneResult<Scene> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Loading scene from {}", path.display());
        let scene = Scene::parse(&content)?;
        scene.log_summary();
        Ok(scene)
    }

    /// Parse a scene description held in memory.
    ///
    /// Either the whole text parses or an error is returned; there is no
    /// partially filled scene.
    pub fn parse(content: &str) -> SceneResult<Scene> {
        SceneParser::new(content).parse()
    }
}

struct SceneParser<'a> {
    tokens: Vec<(usize, &'a str)>,
    pos: usize,
    scene: Scene,
    refraction_index: f32,
}

impl<'a> SceneParser<'a> {
    fn new(content: &'a str) -> Self {
        let tokens = content
            .lines()
            .enumerate()
            .flat_map(|(i, line)| line.split_whitespace().map(move |tok| (i + 1, tok)))
            .collect();

        Self {
            tokens,
            pos: 0,
            scene: Scene::new(),
            refraction_index: AIR_REFRACTION_INDEX,
        }
    }

    fn parse(mut self) -> SceneResult<Scene> {
        let ambient = self.vec3_attribute("amb:", "ambient light")?;
        self.scene.set_ambient(ambient);

        while let Some((line, token)) = self.next_token() {
            match token.to_lowercase().as_str() {
                "triangle" => self.parse_triangle()?,
                "sphere" => self.parse_sphere()?,
                "light" => self.parse_light()?,
                "n_refr" => {
                    self.refraction_index = self.float_value("n_refr", "refraction index")?;
                }
                "camera" => self.parse_camera()?,
                "background-color" => self.parse_background()?,
                "obj" => {
                    let (_, path) = self.expect_token("obj", "a file path")?;
                    log::warn!("Mesh import is not supported, skipping obj '{path}' at line {line}");
                }
                _ => {
                    return Err(SceneError::UnknownObject {
                        line,
                        keyword: token.to_string(),
                    })
                }
            }
        }

        Ok(self.scene)
    }

    fn parse_triangle(&mut self) -> SceneResult<()> {
        let object = format!("triangle #{}", self.scene.triangles().len() + 1);

        let mut positions = [Vec3::ZERO; 3];
        let mut normals = [Vec3::ZERO; 3];
        let mut diffuse = [Vec3::ZERO; 3];
        let mut specular = [Vec3::ZERO; 3];
        let mut shininess = [0.0; 3];

        for i in 0..3 {
            let vertex = format!("{object}, vertex {}", i + 1);
            positions[i] = self.vec3_attribute("pos:", &vertex)?;
            normals[i] = self.vec3_attribute("nor:", &vertex)?;
            diffuse[i] = self.vec3_attribute("dif:", &vertex)?;
            specular[i] = self.vec3_attribute("spe:", &vertex)?;
            shininess[i] = self.float_attribute("shi:", &vertex)?;
        }

        let [a, b, c] = positions;
        self.scene.add_triangle(
            Triangle::new(a, b, c),
            TriangleAttrib::from_vertices(diffuse, specular, normals, shininess, self.refraction_index),
        );
        Ok(())
    }

    fn parse_sphere(&mut self) -> SceneResult<()> {
        let object = format!("sphere #{}", self.scene.spheres().len() + 1);

        let center = self.vec3_attribute("pos:", &object)?;
        let radius = self.float_attribute("rad:", &object)?;
        let diffuse = self.vec3_attribute("dif:", &object)?;
        let specular = self.vec3_attribute("spe:", &object)?;
        let shininess = self.float_attribute("shi:", &object)?;

        self.scene.add_sphere(
            Sphere::new(center, radius),
            SphereAttrib::new(diffuse, specular, shininess, self.refraction_index),
        );
        Ok(())
    }

    fn parse_light(&mut self) -> SceneResult<()> {
        let object = format!("light #{}", self.scene.lights().len() + 1);

        let position = self.vec3_attribute("pos:", &object)?;
        let color = self.vec3_attribute("col:", &object)?;

        self.scene.add_light(Light::new(position, color));
        Ok(())
    }

    fn parse_camera(&mut self) -> SceneResult<()> {
        let position = self.vec3_attribute("pos:", "camera")?;
        let rotation = self.vec3_attribute("rot:", "camera")?;
        let scale = self.float_attribute("scale:", "camera")?;

        let camera = Camera {
            position,
            rotation,
            scale,
            ..*self.scene.camera()
        };
        self.scene.set_camera(camera);
        Ok(())
    }

    fn parse_background(&mut self) -> SceneResult<()> {
        let rgb = self.vec3_attribute("rgb:", "background-color")?;
        let alpha = self.float_attribute("alpha:", "background-color")?;

        self.scene.set_background(Vec4::new(rgb.x, rgb.y, rgb.z, alpha));
        Ok(())
    }

    fn next_token(&mut self) -> Option<(usize, &'a str)> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_token(&mut self, object: &str, expected: &str) -> SceneResult<(usize, &'a str)> {
        self.next_token().ok_or_else(|| SceneError::UnexpectedEof {
            object: object.to_string(),
            expected: expected.to_string(),
        })
    }

    /// Consume an attribute name such as `pos:`, compared case-insensitively.
    fn expect_name(&mut self, name: &str, object: &str) -> SceneResult<()> {
        let (line, token) = self.expect_token(object, &format!("attribute '{name}'"))?;
        if token.to_lowercase() == name {
            Ok(())
        } else {
            Err(SceneError::Parse {
                line,
                object: object.to_string(),
                message: format!("expected attribute '{name}', found '{token}'"),
            })
        }
    }

    fn float_value(&mut self, name: &str, object: &str) -> SceneResult<f32> {
        let (line, token) = self.expect_token(object, &format!("a number for '{name}'"))?;
        token.parse::<f32>().map_err(|_| SceneError::Parse {
            line,
            object: object.to_string(),
            message: format!("invalid number '{token}' for '{name}'"),
        })
    }

    fn float_attribute(&mut self, name: &str, object: &str) -> SceneResult<f32> {
        self.expect_name(name, object)?;
        self.float_value(name, object)
    }

    fn vec3_attribute(&mut self, name: &str, object: &str) -> SceneResult<Vec3> {
        self.expect_name(name, object)?;
        let x = self.float_value(name, object)?;
        let y = self.float_value(name, object)?;
        let z = self.float_value(name, object)?;
        Ok(Vec3::new(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = "nor: 0 0 1 dif: 1 1 1 spe: 0 0 0 shi: 1";

    fn triangle_block() -> String {
        format!("triangle\npos: -1 0 0 {VERTEX}\npos: 1 0 0 {VERTEX}\npos: 0 1 0 {VERTEX}\n")
    }

    #[test]
    fn test_parse_full_scene() {
        let text = format!(
            "amb: 0.1 0.2 0.3\n\
             sphere pos: 0 0 -5 rad: 1.5 dif: 1 0 0 spe: 0.5 0.5 0.5 shi: 16\n\
             {}\
             LIGHT pos: 0 5 0 col: 1 1 1\n\
             camera pos: 0 0 5 rot: 0.1 0.2 0.3 scale: 2\n\
             background-color rgb: 0.2 0.3 0.4 alpha: 0.5\n",
            triangle_block()
        );

        let scene = Scene::parse(&text).expect("scene should parse");

        assert_eq!(scene.ambient(), Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(scene.spheres().len(), 1);
        assert_eq!(scene.spheres()[0].radius, 1.5);
        assert_eq!(scene.sphere_attribs()[0].shininess, 16.0);
        assert_eq!(scene.triangles().len(), 1);
        assert_eq!(scene.triangles()[0].vertices[2], Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(scene.lights().len(), 1);
        assert_eq!(scene.camera().position, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(scene.camera().rotation, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(scene.camera().scale, 2.0);
        assert_eq!(scene.background(), Vec4::new(0.2, 0.3, 0.4, 0.5));
        assert_eq!(scene.object_count(), 3);
    }

    #[test]
    fn test_refraction_index_applies_forward() {
        let text = "amb: 0 0 0\n\
            sphere pos: 0 0 0 rad: 1 dif: 1 1 1 spe: 1 1 1 shi: 1\n\
            n_refr 1.5\n\
            sphere pos: 3 0 0 rad: 1 dif: 1 1 1 spe: 1 1 1 shi: 1\n";

        let scene = Scene::parse(text).expect("scene should parse");

        assert_eq!(scene.sphere_attribs()[0].refraction_index, 1.0);
        assert_eq!(scene.sphere_attribs()[1].refraction_index, 1.5);
    }

    #[test]
    fn test_missing_ambient() {
        let err = Scene::parse("sphere pos: 0 0 0").unwrap_err();
        assert!(matches!(err, SceneError::Parse { line: 1, .. }));
        assert!(err.to_string().contains("amb:"));
    }

    #[test]
    fn test_missing_specular_names_triangle() {
        let text = format!(
            "amb: 0 0 0\n{}triangle\n\
             pos: 0 0 0 {VERTEX}\n\
             pos: 1 0 0 nor: 0 0 1 dif: 1 1 1 shi: 1\n\
             pos: 0 1 0 {VERTEX}\n",
            triangle_block()
        );

        let err = Scene::parse(&text).unwrap_err();
        let message = err.to_string();

        assert!(message.contains("triangle #2"), "{message}");
        assert!(message.contains("vertex 2"), "{message}");
        assert!(message.contains("spe:"), "{message}");
        assert!(matches!(err, SceneError::Parse { line: 8, .. }));
    }

    #[test]
    fn test_invalid_number() {
        let text = "amb: 0 0 0\nlight pos: 0 abc 0 col: 1 1 1\n";
        let err = Scene::parse(text).unwrap_err();

        assert!(err.to_string().contains("light #1"));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_unknown_object() {
        let err = Scene::parse("amb: 0 0 0\n\ncube size: 1\n").unwrap_err();
        match err {
            SceneError::UnknownObject { line, keyword } => {
                assert_eq!(line, 3);
                assert_eq!(keyword, "cube");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_truncated_sphere() {
        let err = Scene::parse("amb: 0 0 0 sphere pos: 0 0 0 rad:").unwrap_err();
        assert!(matches!(err, SceneError::UnexpectedEof { .. }));
        assert!(err.to_string().contains("sphere #1"));
    }

    #[test]
    fn test_obj_is_skipped() {
        let text = "amb: 0 0 0\nobj models/teapot.obj\nlight pos: 0 1 0 col: 1 1 1\n";
        let scene = Scene::parse(text).expect("scene should parse");

        assert_eq!(scene.lights().len(), 1);
        assert!(scene.triangles().is_empty());
    }

    #[test]
    fn test_camera_keeps_projection_defaults() {
        let scene = Scene::parse("amb: 0 0 0 camera pos: 1 2 3 rot: 0 0 0 scale: 1").expect("scene should parse");
        let camera = scene.camera();

        assert_eq!(camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(camera.fov_y, Camera::default().fov_y);
        assert_eq!(camera.far, 10000.0);
    }

    #[test]
    fn test_bundled_scenes_parse() {
        let spheres = Scene::parse(include_str!("../../../assets/scenes/spheres.txt")).expect("spheres.txt");
        assert_eq!(spheres.spheres().len(), 3);
        assert_eq!(spheres.sphere_attribs()[2].refraction_index, 1.5);

        let room = Scene::parse(include_str!("../../../assets/scenes/room.txt")).expect("room.txt");
        assert_eq!(room.triangles().len(), 8);
        assert_eq!(room.lights().len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Scene::load("/nonexistent/lumen/scene.txt").unwrap_err();
        assert!(matches!(err, SceneError::Io { .. }));
        assert!(err.to_string().contains("scene.txt"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("lumen_core_test_scene.txt");
        fs::write(&path, "amb: 0.5 0.5 0.5\nlight pos: 0 0 0 col: 1 0 0\n").expect("write temp scene");

        let scene = Scene::load(&path).expect("scene should load");
        assert_eq!(scene.ambient(), Vec3::splat(0.5));
        assert_eq!(scene.lights()[0].color, Vec3::X);

        let _ = fs::remove_file(&path);
    }
}
