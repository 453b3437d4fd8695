//! Configuration file parsing for afcdeck
//!
//! Supports:
//! - `<config_dir>/afcdeck/config.toml` - Global settings

pub mod settings;
pub mod types;

pub use settings::{default_config_path, init_config_file, load_settings, load_settings_from};
pub use types::*;
