//! Foundation shared by every engine crate.
//!
//! - Error types and result aliases
//! - Logging initialization
//! - Frame timing
//! - TOML configuration

mod config;
mod error;
mod logging;
mod timer;

pub use config::{
    AssetsConfig, CameraConfig, Config, ControlsConfig, LoggingConfig, RendererConfig,
    WindowConfig, CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH,
};
pub use error::{Error, Result};
pub use logging::{init_logging, DEFAULT_FILTER};
pub use timer::Timer;
