//! Configuration management for umapi-cli.
//!
//! Credentials and endpoints are read from `UMAPI_*` environment variables,
//! optionally backed by a YAML file given with `--config`.

mod settings;

pub use settings::{Settings, SettingsFile};
