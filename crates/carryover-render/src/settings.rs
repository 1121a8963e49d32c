//! Renderer settings.

use crate::error::RenderError;
use serde::{Deserialize, Serialize};

/// Configuration for the rendering dispatcher.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
	/// Work items that may wait for the dispatcher before senders are held back.
	pub queue_capacity: usize,
	/// Name of the dispatcher's OS thread.
	pub thread_name: String,
}

impl Default for RendererSettings {
	fn default() -> Self {
		Self {
			queue_capacity: 64,
			thread_name: "carryover-renderer".to_string(),
		}
	}
}

impl RendererSettings {
	/// Sets the dispatcher queue capacity.
	pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
		self.queue_capacity = queue_capacity;
		self
	}

	/// Sets the dispatcher thread name.
	pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
		self.thread_name = thread_name.into();
		self
	}

	/// Validates the settings.
	pub fn validate(&self) -> Result<(), RenderError> {
		if self.queue_capacity == 0 {
			return Err(RenderError::Configuration(
				"queue_capacity must be greater than zero".to_string(),
			));
		}
		if self.thread_name.trim().is_empty() {
			return Err(RenderError::Configuration(
				"thread_name must not be empty".to_string(),
			));
		}
		Ok(())
	}
}
