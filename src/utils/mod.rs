//! Configuration utilities.

/// TOML configuration (`elstudio.toml`).
pub mod toml_config;
