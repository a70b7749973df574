//! Parsing and validation of `uefast.toml` project configuration files.
//!
//! The configuration is optional: a project without `uefast.toml` gets the
//! defaults. The resulting [`ProjectConfig`] is an explicit value passed to
//! every stage of the build; nothing reads it from global state.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    load_config, load_config_file, load_config_from_str, validate_config, CONFIG_FILE,
};
pub use types::*;
