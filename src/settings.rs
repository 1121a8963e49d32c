//! Aggregate settings loaded from TOML.

use crate::render::RendererSettings;
use crate::state::PersistenceSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for both the persistence side and the rendering side.
///
/// Every section and field is optional; omitted values take their defaults.
///
/// ```toml
/// [persistence]
/// default_service_mode = "server"
///
/// [renderer]
/// queue_capacity = 128
/// thread_name = "prerender"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarryoverSettings {
	pub persistence: PersistenceSettings,
	pub renderer: RendererSettings,
}

impl CarryoverSettings {
	/// Loads settings from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
			path: path.as_ref().to_path_buf(),
			source: e,
		})?;
		Self::from_toml(&content)
	}

	/// Parses and validates settings from a TOML string.
	pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
		let settings: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
			message: e.to_string(),
		})?;
		settings.validate()?;
		Ok(settings)
	}

	/// Validates both sections.
	pub fn validate(&self) -> Result<(), ConfigError> {
		self.persistence
			.validate()
			.map_err(|e| ConfigError::Invalid {
				section: "persistence",
				message: e.to_string(),
			})?;
		self.renderer.validate().map_err(|e| ConfigError::Invalid {
			section: "renderer",
			message: e.to_string(),
		})
	}
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
	#[error("IO error reading {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse configuration: {message}")]
	Parse { message: String },

	#[error("Invalid [{section}] configuration: {message}")]
	Invalid {
		section: &'static str,
		message: String,
	},
}
