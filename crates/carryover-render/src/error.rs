//! Rendering errors.

use thiserror::Error;

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors raised while dispatching or rendering a component.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum RenderError {
	/// The activator could not create a component instance.
	#[error("failed to activate component '{component}': {message}")]
	ComponentActivation {
		/// Component name.
		component: String,
		/// Reason reported by the activator.
		message: String,
	},

	/// A parameter was missing, duplicated or of the wrong shape.
	#[error("invalid parameter: {0}")]
	InvalidParameter(String),

	/// A required service was not registered.
	#[error("no service of type '{0}' is registered")]
	MissingService(&'static str),

	/// The component failed during initialization or rendering.
	#[error("component '{component}' failed: {message}")]
	Component {
		/// Component name.
		component: String,
		/// Failure description.
		message: String,
	},

	/// The dispatcher thread could not be started.
	#[error("dispatcher failed to start: {0}")]
	DispatcherStartup(String),

	/// The dispatcher no longer accepts work.
	#[error("dispatcher is closed")]
	DispatcherClosed,

	/// The work item was dropped before it produced a result.
	#[error("dispatched work was cancelled")]
	Cancelled,

	/// The render engine has been disposed.
	#[error("render engine has been disposed")]
	Disposed,

	/// Renderer settings are invalid.
	#[error("invalid renderer configuration: {0}")]
	Configuration(String),
}
