#![forbid(unsafe_code)]

//! Tunables for the reordering engine.
//!
//! [`ReorderConfig`] can be loaded from TOML or JSON at startup when the
//! `config` feature is enabled.
//!
//! ```toml
//! # menusort.toml
//! renumber_stride = 1000
//! baseline = 0
//! axis = "vertical"
//! swap_on_entity_hover = true
//! ```
//!
//! ```rust,ignore
//! let config = ReorderConfig::from_toml_file("menusort.toml")?;
//! ```
//!
//! Every field defaults to the constants in [`crate::allocator`], so
//! `ReorderConfig::default()` matches the built-in behavior.

#[cfg(feature = "config")]
use std::fmt;
#[cfg(feature = "config")]
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::allocator::{DEFAULT_BASELINE, DEFAULT_RENUMBER_STRIDE};
use crate::geometry::Axis;

/// Configuration shared by the drag controller and the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderConfig {
    /// Spacing between positions written by a renumbering pass.
    pub renumber_stride: i64,
    /// Position of the first entity in an empty container, and the start of
    /// a renumbered sequence.
    pub baseline: i64,
    /// Axis along which siblings are laid out for the midpoint rule.
    pub axis: Axis,
    /// Treat hovering directly over another entity of the same container as
    /// a swap instead of an insertion.
    pub swap_on_entity_hover: bool,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            renumber_stride: DEFAULT_RENUMBER_STRIDE,
            baseline: DEFAULT_BASELINE,
            axis: Axis::Vertical,
            swap_on_entity_hover: true,
        }
    }
}

impl ReorderConfig {
    /// Validate parameters. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.renumber_stride <= 1 {
            errors.push(format!(
                "renumber_stride must be > 1 to leave room between positions, got {}",
                self.renumber_stride
            ));
        }
        errors
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.checked()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.checked()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    #[cfg(feature = "config")]
    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

/// Errors from loading a [`ReorderConfig`].
#[cfg(feature = "config")]
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Json(serde_json::Error),
    Invalid(Vec<String>),
}

#[cfg(feature = "config")]
impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Toml(e) => write!(f, "config TOML parse error: {e}"),
            Self::Json(e) => write!(f, "config JSON parse error: {e}"),
            Self::Invalid(errors) => write!(f, "invalid config: {}", errors.join("; ")),
        }
    }
}

#[cfg(feature = "config")]
impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}
