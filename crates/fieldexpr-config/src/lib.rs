//! Configuration for the fieldexpr type registry.
//!
//! Load registry settings from TOML or YAML so the annotation tag and the
//! handling of self-referential records can change without code changes.
//!
//! # Examples
//!
//! ```
//! use fieldexpr_config::{RegistryConfig, SelfReferencePolicy};
//!
//! let config = RegistryConfig::from_toml_str(r#"
//!     tag_name = "validate"
//!     initial_capacity = 64
//!     self_reference = "reject"
//! "#).unwrap();
//!
//! assert_eq!(config.tag_name, "validate");
//! assert_eq!(config.self_reference, SelfReferencePolicy::Reject);
//! ```
//!
//! Use the default config when the file is missing:
//!
//! ```
//! use fieldexpr_config::RegistryConfig;
//!
//! let config = RegistryConfig::load("fieldexpr.toml").unwrap_or_default();
//! assert_eq!(config.tag_name, "expr");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag read by a registry built with the default configuration.
pub const DEFAULT_TAG_NAME: &str = "expr";

/// Default number of descriptor slots reserved up front.
pub const DEFAULT_INITIAL_CAPACITY: usize = 256;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Registry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RegistryConfig {
    /// Annotation tag the registry reads expressions from.
    #[serde(default = "default_tag_name")]
    pub tag_name: String,

    /// Number of type descriptors the cache reserves room for.
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,

    /// What to do when a record contains itself.
    #[serde(default)]
    pub self_reference: SelfReferencePolicy,
}

fn default_tag_name() -> String {
    DEFAULT_TAG_NAME.to_string()
}

fn default_initial_capacity() -> usize {
    DEFAULT_INITIAL_CAPACITY
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            tag_name: default_tag_name(),
            initial_capacity: default_initial_capacity(),
            self_reference: SelfReferencePolicy::default(),
        }
    }
}

impl RegistryConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML, or fails
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the annotation tag name.
    pub fn with_tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = tag_name.into();
        self
    }

    /// Sets the initial descriptor capacity.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the self-reference policy.
    pub fn with_self_reference(mut self, policy: SelfReferencePolicy) -> Self {
        self.self_reference = policy;
        self
    }

    /// Checks that the tag name is usable as an attribute key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tag_name.is_empty() {
            return Err(ConfigError::Invalid("tag_name must not be empty".into()));
        }
        if self.tag_name.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!(
                "tag_name must not contain whitespace: {:?}",
                self.tag_name
            )));
        }
        Ok(())
    }
}

/// Handling of a record type that reaches itself through a nested field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfReferencePolicy {
    /// Stop flattening and treat the recursive field as unsupported.
    #[default]
    Opaque,

    /// Fail registration of the outer type.
    Reject,
}
