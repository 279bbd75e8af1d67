//! Engine configuration loaded from TOML.
//!
//! Every field has a default, so a partial file (or no file at all) is valid:
//!
//! ```toml
//! [window]
//! width = 1600
//! height = 900
//!
//! [camera]
//! fov_y_degrees = 60.0
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::logging::DEFAULT_FILTER;

/// File read by [`Config::load_default`] when `ENGINE_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "engine.toml";

/// Environment variable overriding the configuration path.
pub const CONFIG_ENV_VAR: &str = "ENGINE_CONFIG";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub renderer: RendererConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub assets: AssetsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Engine".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RendererConfig {
    /// Enables the Khronos validation layer.
    pub validation: bool,
    /// RGBA clear color of the swap chain render pass.
    pub clear_color: [f32; 4],
    /// Use MAILBOX when the surface offers it, otherwise always FIFO.
    pub prefer_mailbox: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            validation: cfg!(debug_assertions),
            clear_color: [0.01, 0.01, 0.01, 1.0],
            prefer_mailbox: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 50.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Translation speed in units per second.
    pub move_speed: f32,
    /// Keyboard look speed in radians per second.
    pub turn_speed: f32,
    /// Radians per unit of normalized mouse motion.
    pub mouse_sensitivity: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            turn_speed: 1.5,
            mouse_sensitivity: 0.02,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory holding compiled SPIR-V shaders.
    pub shader_dir: PathBuf,
    /// Vertex shader file name inside `shader_dir`.
    pub vertex_shader: String,
    /// Fragment shader file name inside `shader_dir`.
    pub fragment_shader: String,
    /// OBJ files placed in the scene at startup.
    pub models: Vec<PathBuf>,
}

impl AssetsConfig {
    pub fn vertex_shader_path(&self) -> PathBuf {
        self.shader_dir.join(&self.vertex_shader)
    }

    pub fn fragment_shader_path(&self) -> PathBuf {
        self.shader_dir.join(&self.fragment_shader)
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            shader_dir: PathBuf::from("shaders"),
            vertex_shader: "simple_shader.vert.spv".to_string(),
            fragment_shader: "simple_shader.frag.spv".to_string(),
            models: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Parses a configuration document. `origin` is only used for diagnostics.
    pub fn from_toml_str(source: &str, origin: &Path) -> Result<Self> {
        toml::from_str(source).map_err(|e| Error::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the file exists but is not valid TOML for
    /// this schema, and [`Error::Io`] when it cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let source = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source, path)?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Loads from `$ENGINE_CONFIG`, or `engine.toml` in the working directory.
    pub fn load_default() -> Result<Self> {
        let path = env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = Config::from_toml_str("", Path::new("empty.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let source = r#"
            [window]
            width = 640

            [camera]
            far = 250.0
        "#;
        let config = Config::from_toml_str(source, Path::new("partial.toml")).unwrap();

        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.camera.far, 250.0);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.controls, ControlsConfig::default());
    }

    #[test]
    fn test_malformed_document_is_config_error() {
        let err = Config::from_toml_str("[window\nwidth = 1", Path::new("bad.toml")).unwrap_err();
        match err {
            Error::Config { path, .. } => assert_eq!(path, PathBuf::from("bad.toml")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_wrong_type_is_config_error() {
        let result = Config::from_toml_str("[window]\nwidth = \"wide\"", Path::new("t.toml"));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load(Path::new("definitely/not/here/engine.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_shader_paths_join_dir() {
        let assets = AssetsConfig::default();
        assert_eq!(
            assets.vertex_shader_path(),
            PathBuf::from("shaders").join("simple_shader.vert.spv")
        );
    }
}
