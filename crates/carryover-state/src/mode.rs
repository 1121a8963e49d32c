//! Serialization modes and the policy that assigns them to persistence callbacks.

use crate::settings::PersistenceSettings;
use serde::{Deserialize, Serialize};

/// The rendering environment(s) a piece of persisted state applies to.
///
/// Modes combine as a two-bit set: `Both` is the union of `Server` and
/// `WebAssembly`, and `None` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializationMode {
	/// Applies to no environment.
	None,
	/// Server-executed interactive rendering.
	Server,
	/// Client-executed (WebAssembly) interactive rendering.
	WebAssembly,
	/// Any environment.
	#[default]
	Both,
}

impl SerializationMode {
	const fn bits(self) -> u8 {
		match self {
			Self::None => 0b00,
			Self::Server => 0b01,
			Self::WebAssembly => 0b10,
			Self::Both => 0b11,
		}
	}

	const fn from_bits(bits: u8) -> Self {
		match bits & 0b11 {
			0b01 => Self::Server,
			0b10 => Self::WebAssembly,
			0b11 => Self::Both,
			_ => Self::None,
		}
	}

	/// Returns `true` when both modes share at least one environment.
	///
	/// A callback registered for `self` fires during a run targeting `other`
	/// only when this holds.
	///
	/// # Examples
	///
	/// ```
	/// use carryover_state::SerializationMode;
	///
	/// assert!(SerializationMode::Server.intersects(SerializationMode::Both));
	/// assert!(!SerializationMode::Server.intersects(SerializationMode::WebAssembly));
	/// assert!(!SerializationMode::None.intersects(SerializationMode::Both));
	/// ```
	pub const fn intersects(self, other: Self) -> bool {
		self.bits() & other.bits() != 0
	}

	/// Combines two modes.
	pub const fn union(self, other: Self) -> Self {
		Self::from_bits(self.bits() | other.bits())
	}
}

/// Interactive render mode a component instance runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractiveRenderMode {
	/// Interactive on the server.
	Server,
	/// Interactive in the browser via WebAssembly.
	WebAssembly,
	/// Server first, then WebAssembly once the client runtime is available.
	Auto,
}

impl InteractiveRenderMode {
	/// The serialization mode state owned by such a component targets.
	pub const fn serialization_mode(self) -> SerializationMode {
		match self {
			Self::Server => SerializationMode::Server,
			Self::WebAssembly => SerializationMode::WebAssembly,
			Self::Auto => SerializationMode::Both,
		}
	}
}

/// A component instance that owns a persistence callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentOwner {
	name: String,
	render_mode: Option<InteractiveRenderMode>,
}

impl ComponentOwner {
	/// Creates an owner with no interactive render mode (static rendering only).
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			render_mode: None,
		}
	}

	/// Sets the interactive render mode the component runs under.
	pub fn with_render_mode(mut self, render_mode: InteractiveRenderMode) -> Self {
		self.render_mode = Some(render_mode);
		self
	}

	/// Returns the component name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the interactive render mode, if any.
	pub fn render_mode(&self) -> Option<InteractiveRenderMode> {
		self.render_mode
	}
}

/// Where a persistence callback was registered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOrigin {
	/// Registered by a component instance.
	Component(ComponentOwner),
	/// Registered by an application service with no owning component.
	Service,
}

/// Decides which serialization mode a callback targets when the caller does
/// not state one.
pub trait SerializationModeHandler {
	/// Returns the mode a callback registered from `origin` applies to.
	fn callback_target_mode(&self, origin: &CallbackOrigin) -> SerializationMode;
}

/// Maps a component's interactive render mode to a serialization mode and
/// falls back to a configured default for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultSerializationModeHandler {
	default_mode: SerializationMode,
}

impl DefaultSerializationModeHandler {
	/// Creates a handler using `default_mode` for services and static components.
	pub fn new(default_mode: SerializationMode) -> Self {
		Self { default_mode }
	}

	/// Creates a handler from persistence settings.
	pub fn from_settings(settings: &PersistenceSettings) -> Self {
		Self::new(settings.default_service_mode)
	}
}

impl Default for DefaultSerializationModeHandler {
	fn default() -> Self {
		Self::new(SerializationMode::Both)
	}
}

impl SerializationModeHandler for DefaultSerializationModeHandler {
	fn callback_target_mode(&self, origin: &CallbackOrigin) -> SerializationMode {
		match origin {
			CallbackOrigin::Component(owner) => owner
				.render_mode()
				.map(InteractiveRenderMode::serialization_mode)
				.unwrap_or(self.default_mode),
			CallbackOrigin::Service => self.default_mode,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(SerializationMode::Server, SerializationMode::Server, true)]
	#[case(SerializationMode::Server, SerializationMode::Both, true)]
	#[case(SerializationMode::Server, SerializationMode::WebAssembly, false)]
	#[case(SerializationMode::WebAssembly, SerializationMode::Both, true)]
	#[case(SerializationMode::Both, SerializationMode::WebAssembly, true)]
	#[case(SerializationMode::None, SerializationMode::Both, false)]
	#[case(SerializationMode::Both, SerializationMode::None, false)]
	fn test_intersects(
		#[case] registered: SerializationMode,
		#[case] active: SerializationMode,
		#[case] expected: bool,
	) {
		assert_eq!(registered.intersects(active), expected);
	}

	#[rstest]
	fn test_union() {
		assert_eq!(
			SerializationMode::Server.union(SerializationMode::WebAssembly),
			SerializationMode::Both
		);
		assert_eq!(
			SerializationMode::None.union(SerializationMode::Server),
			SerializationMode::Server
		);
	}

	#[rstest]
	#[case(InteractiveRenderMode::Server, SerializationMode::Server)]
	#[case(InteractiveRenderMode::WebAssembly, SerializationMode::WebAssembly)]
	#[case(InteractiveRenderMode::Auto, SerializationMode::Both)]
	fn test_component_owner_mode_inference(
		#[case] render_mode: InteractiveRenderMode,
		#[case] expected: SerializationMode,
	) {
		let handler = DefaultSerializationModeHandler::default();
		let origin =
			CallbackOrigin::Component(ComponentOwner::new("Counter").with_render_mode(render_mode));

		assert_eq!(handler.callback_target_mode(&origin), expected);
	}

	#[rstest]
	fn test_static_component_and_service_use_default() {
		let handler = DefaultSerializationModeHandler::new(SerializationMode::Server);

		assert_eq!(
			handler.callback_target_mode(&CallbackOrigin::Service),
			SerializationMode::Server
		);
		assert_eq!(
			handler.callback_target_mode(&CallbackOrigin::Component(ComponentOwner::new("Nav"))),
			SerializationMode::Server
		);
	}

	#[rstest]
	fn test_mode_serde_names() {
		let json = serde_json::to_string(&SerializationMode::WebAssembly).unwrap();
		assert_eq!(json, "\"webassembly\"");

		let mode: SerializationMode = serde_json::from_str("\"both\"").unwrap();
		assert_eq!(mode, SerializationMode::Both);
	}
}
