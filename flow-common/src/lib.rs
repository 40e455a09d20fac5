//! # Flow Common Library
//!
//! Shared code for the Flow crates:
//! - Error types
//! - TOML configuration loading and resolution

pub mod config;
pub mod error;

pub use config::TomlConfig;
pub use error::{Error, Result};
