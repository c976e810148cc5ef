//! Project configuration for prp-runner.
//!
//! This module defines the Config struct that represents `prp-runner.yaml`
//! at the project root. The file is optional. It supports forward-compatible
//! YAML parsing (unknown fields are ignored), defaults for every field, and
//! validation of config values.

mod model;


pub use model::Config;
