//! Linked editing configuration.

use serde::Deserialize;
use thiserror::Error;

/// Default decoration style name for active linked ranges.
pub const DEFAULT_DECORATION_STYLE: &str = "linked-editing";

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("invalid linked editing config: {0}")]
	Parse(#[from] toml::de::Error),
}

/// User-facing settings for linked editing.
///
/// ```toml
/// enabled = true
/// decoration-style = "linked-editing"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct LinkedEditingConfig {
	/// Whether linked ranges are resolved and kept in sync.
	pub enabled: bool,
	/// Style name passed to the host with every decoration.
	pub decoration_style: String,
}

impl Default for LinkedEditingConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			decoration_style: DEFAULT_DECORATION_STYLE.to_string(),
		}
	}
}

impl LinkedEditingConfig {
	/// Parses a config from TOML. Missing keys take their defaults.
	pub fn from_toml(src: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(src)?)
	}

	/// Default settings with the feature switched off.
	pub fn disabled() -> Self {
		Self {
			enabled: false,
			..Self::default()
		}
	}
}
