//! Render settings and their text file format.
//!
//! The file holds whitespace-separated `key value` pairs:
//!
//! ```text
//! w 800
//! h 600
//! depth 4
//! anti-aliasing 0
//! num-threads 1
//! use-kd-tree 0
//! ```
//!
//! Loading is lenient. Unknown keys are ignored and a value that does not
//! parse as an integer drops the remainder of its line. Only a file that
//! cannot be read is an error.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur reading or writing a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render configuration.
///
/// Depth and thread count are at least one. The setters enforce this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    width: u32,
    height: u32,
    depth: u32,
    anti_aliasing: bool,
    num_threads: usize,
    use_kd_tree: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            depth: 4,
            anti_aliasing: false,
            num_threads: 1,
            use_kd_tree: false,
        }
    }
}

impl RenderConfig {
    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.set_resolution(width, height);
        self
    }

    /// Set maximum recursion depth.
    pub fn with_depth(mut self, depth: i64) -> Self {
        self.set_depth(depth);
        self
    }

    /// Set worker thread count.
    pub fn with_threads(mut self, num_threads: i64) -> Self {
        self.set_num_threads(num_threads);
        self
    }

    pub fn with_anti_aliasing(mut self, enabled: bool) -> Self {
        self.anti_aliasing = enabled;
        self
    }

    pub fn with_kd_tree(mut self, enabled: bool) -> Self {
        self.use_kd_tree = enabled;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Maximum number of trace levels per primary ray.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn anti_aliasing(&self) -> bool {
        self.anti_aliasing
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn use_kd_tree(&self) -> bool {
        self.use_kd_tree
    }

    /// Bytes needed for a BGRA buffer of this resolution.
    pub fn buffer_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Values below one are raised to one.
    pub fn set_depth(&mut self, depth: i64) {
        self.depth = depth.clamp(1, u32::MAX as i64) as u32;
    }

    /// Values below one are raised to one.
    pub fn set_num_threads(&mut self, num_threads: i64) {
        self.num_threads = num_threads.max(1).try_into().unwrap_or(usize::MAX);
    }

    pub fn set_anti_aliasing(&mut self, enabled: bool) {
        self.anti_aliasing = enabled;
    }

    pub fn set_use_kd_tree(&mut self, enabled: bool) {
        self.use_kd_tree = enabled;
    }

    /// Parse config text, starting from the defaults.
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for (line_no, line) in content.lines().enumerate() {
            let mut tokens = line.split_whitespace();
            while let Some(key) = tokens.next() {
                let Some(value) = tokens.next().and_then(|v| v.parse::<i64>().ok()) else {
                    log::warn!("Config line {}: no valid value for '{}', skipping rest of line", line_no + 1, key);
                    break;
                };
                if !config.apply(key, value) {
                    log::warn!("Config line {}: unknown key '{}' ignored", line_no + 1, key);
                }
            }
        }

        config
    }

    /// Returns false for an unknown key.
    fn apply(&mut self, key: &str, value: i64) -> bool {
        match key {
            "w" => match u32::try_from(value) {
                Ok(width) => self.width = width,
                Err(_) => log::warn!("Config width {value} out of range, keeping {}", self.width),
            },
            "h" => match u32::try_from(value) {
                Ok(height) => self.height = height,
                Err(_) => log::warn!("Config height {value} out of range, keeping {}", self.height),
            },
            "depth" => self.set_depth(value),
            "anti-aliasing" => self.anti_aliasing = value != 0,
            "num-threads" => self.set_num_threads(value),
            "use-kd-tree" => self.use_kd_tree = value != 0,
            _ => return false,
        }
        true
    }

    /// Load a config file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::parse(&content);
        log::info!("Loaded render config from {}: {}", path.display(), config.summary());
        Ok(config)
    }

    /// Write the config as one `key value` pair per line.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        fs::write(path, self.to_string()).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// One-line description for logs.
    pub fn summary(&self) -> String {
        format!(
            "{}x{}, depth {}, anti-aliasing {}, {} thread(s), kd-tree {}",
            self.width,
            self.height,
            self.depth,
            if self.anti_aliasing { "on" } else { "off" },
            self.num_threads,
            if self.use_kd_tree { "on" } else { "off" }
        )
    }
}

impl fmt::Display for RenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "w {}", self.width)?;
        writeln!(f, "h {}", self.height)?;
        writeln!(f, "depth {}", self.depth)?;
        writeln!(f, "anti-aliasing {}", u8::from(self.anti_aliasing))?;
        writeln!(f, "num-threads {}", self.num_threads)?;
        writeln!(f, "use-kd-tree {}", u8::from(self.use_kd_tree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();

        assert_eq!(config.width(), 800);
        assert_eq!(config.height(), 600);
        assert_eq!(config.depth(), 4);
        assert!(!config.anti_aliasing());
        assert_eq!(config.num_threads(), 1);
        assert!(!config.use_kd_tree());
    }

    #[test]
    fn test_parse_all_keys() {
        let config = RenderConfig::parse("w 320\nh 240\ndepth 2\nanti-aliasing 1\nnum-threads 4\nuse-kd-tree 1\n");

        assert_eq!(config.width(), 320);
        assert_eq!(config.height(), 240);
        assert_eq!(config.depth(), 2);
        assert!(config.anti_aliasing());
        assert_eq!(config.num_threads(), 4);
        assert!(config.use_kd_tree());
    }

    #[test]
    fn test_parse_several_pairs_per_line_any_order() {
        let config = RenderConfig::parse("num-threads 3 w 64   h 32\nfoo 12 depth 7");

        assert_eq!(config.num_threads(), 3);
        assert_eq!((config.width(), config.height()), (64, 32));
        assert_eq!(config.depth(), 7);
    }

    #[test]
    fn test_unknown_key_reported() {
        let mut config = RenderConfig::default();

        assert!(!config.apply("foo", 12));
        assert!(!config.apply("width", 12));
        assert!(config.apply("w", 12));
        assert_eq!(config.width(), 12);
        assert_eq!(config, RenderConfig::default().with_resolution(12, 600));
    }

    #[test]
    fn test_non_positive_clamped() {
        let config = RenderConfig::parse("depth 0\nnum-threads -4\n");

        assert_eq!(config.depth(), 1);
        assert_eq!(config.num_threads(), 1);
    }

    #[test]
    fn test_malformed_value_skips_rest_of_line() {
        let config = RenderConfig::parse("w abc h 100\ndepth 9\nh -5\n");

        assert_eq!(config.width(), 800);
        assert_eq!(config.height(), 600);
        assert_eq!(config.depth(), 9);
    }

    #[test]
    fn test_save_load_round_trip() {
        let path = std::env::temp_dir().join("lumen_renderer_config_round_trip.cfg");
        let config = RenderConfig::default()
            .with_resolution(1024, 768)
            .with_depth(6)
            .with_anti_aliasing(true)
            .with_threads(8)
            .with_kd_tree(true);

        config.save_to_file(&path).expect("save config");
        let loaded = RenderConfig::load_from_file(&path).expect("load config");
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_saved_format() {
        let text = RenderConfig::default().to_string();
        assert_eq!(text, "w 800\nh 600\ndepth 4\nanti-aliasing 0\nnum-threads 1\nuse-kd-tree 0\n");
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = RenderConfig::load_from_file("/nonexistent/lumen/render.cfg").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("render.cfg"));
    }
}
