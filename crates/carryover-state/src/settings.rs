//! Persistence settings.

use crate::error::PersistError;
use crate::mode::SerializationMode;
use serde::{Deserialize, Serialize};

/// Configuration for component state persistence.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
	/// Mode assigned to callbacks registered by services or by components
	/// without an interactive render mode.
	pub default_service_mode: SerializationMode,
}

impl Default for PersistenceSettings {
	fn default() -> Self {
		Self {
			default_service_mode: SerializationMode::Both,
		}
	}
}

impl PersistenceSettings {
	/// Sets the default mode for callbacks with no interactive owner.
	pub fn with_default_service_mode(mut self, mode: SerializationMode) -> Self {
		self.default_service_mode = mode;
		self
	}

	/// Checks the settings for values that would silently disable persistence.
	pub fn validate(&self) -> Result<(), PersistError> {
		if self.default_service_mode == SerializationMode::None {
			return Err(PersistError::ArgumentInvalid(
				"default_service_mode must not be `none`".to_string(),
			));
		}
		Ok(())
	}
}
