//! Error types for component state persistence.

use crate::context::PersistedState;
use crate::mode::SerializationMode;
use thiserror::Error;

/// Result type for state store operations.
pub type Result<T> = std::result::Result<T, PersistError>;

/// Contract violations raised by [`PersistentComponentState`](crate::PersistentComponentState).
///
/// These indicate a bug in calling code. Absence of restored data is never an
/// error and is reported as `None` instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistError {
	/// Operation attempted outside its legal window.
	#[error("invalid state: {0}")]
	InvalidState(String),

	/// The same key was persisted twice during one persistence run.
	#[error("there is already a persisted object under the same key '{0}'")]
	DuplicateKey(String),

	/// A required argument was empty or otherwise unusable.
	#[error("invalid argument: {0}")]
	ArgumentInvalid(String),

	/// Encoding or decoding a typed value failed.
	#[error(transparent)]
	Codec(#[from] CodecError),
}

/// Failures of a [`StateCodec`](crate::StateCodec).
#[derive(Debug, Error)]
pub enum CodecError {
	/// The value could not be serialized.
	#[error("failed to encode {format} payload: {message}")]
	Encode {
		/// Codec format name.
		format: &'static str,
		/// Underlying serializer message.
		message: String,
	},

	/// The stored bytes could not be deserialized into the requested type.
	#[error("failed to decode {format} payload: {message}")]
	Decode {
		/// Codec format name.
		format: &'static str,
		/// Underlying deserializer message.
		message: String,
	},
}

/// Failures reported by a [`PersistentStateStore`](crate::PersistentStateStore).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
	/// The backing store cannot be reached.
	#[error("state store unavailable: {0}")]
	Unavailable(String),

	/// The store refused the payload.
	#[error("state store rejected the payload: {0}")]
	Rejected(String),
}

/// A persistence callback that returned an error during a run.
#[derive(Debug)]
pub struct CallbackFailure {
	/// Zero-based position of the callback in the run's invocation order.
	pub position: usize,
	/// Mode the callback was registered for.
	pub mode: SerializationMode,
	/// The error returned by the callback.
	pub error: anyhow::Error,
}

/// Errors surfaced by a persistence run or a restore.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistenceRunError {
	/// The run violated the state store contract (e.g. a context was already open).
	#[error(transparent)]
	State(#[from] PersistError),

	/// The host store failed to read or write.
	#[error(transparent)]
	Store(#[from] StoreError),

	/// One or more callbacks failed. Every callback was still attempted and
	/// `state` holds what the successful ones wrote.
	#[error("{} persistence callback(s) failed", .failures.len())]
	CallbackFailures {
		/// Failed callbacks in invocation order.
		failures: Vec<CallbackFailure>,
		/// Outgoing state accumulated during the run.
		state: PersistedState,
	},
}

impl PersistenceRunError {
	/// Returns the failed callbacks, if this is an aggregate callback failure.
	pub fn callback_failures(&self) -> &[CallbackFailure] {
		match self {
			Self::CallbackFailures { failures, .. } => failures,
			_ => &[],
		}
	}
}
