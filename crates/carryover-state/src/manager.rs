//! Host-side orchestration of restore and persistence runs.

use crate::context::PersistedState;
use crate::error::{CallbackFailure, PersistenceRunError};
use crate::mode::SerializationMode;
use crate::settings::PersistenceSettings;
use crate::state::PersistentComponentState;
use crate::store::PersistentStateStore;

/// Drives a session's [`PersistentComponentState`] through restore and
/// persistence runs.
///
/// A run opens the persistence context, awaits every callback whose mode
/// intersects the run's mode in registration order, then closes the context.
/// A failing callback does not stop the others: all are attempted and the
/// failures are reported together as [`PersistenceRunError::CallbackFailures`].
#[derive(Debug, Clone, Default)]
pub struct ComponentStatePersistenceManager {
	state: PersistentComponentState,
}

impl ComponentStatePersistenceManager {
	/// Creates a manager with a fresh state configured from `settings`.
	pub fn new(settings: &PersistenceSettings) -> Self {
		Self::with_state(PersistentComponentState::from_settings(settings))
	}

	/// Wraps an existing state handle.
	pub fn with_state(state: PersistentComponentState) -> Self {
		Self { state }
	}

	/// The managed state, for application code to register callbacks and take values.
	pub fn state(&self) -> &PersistentComponentState {
		&self.state
	}

	/// Reads the previous phase's output from `store` and installs it as
	/// existing state.
	pub async fn restore_state(
		&self,
		store: &dyn PersistentStateStore,
	) -> Result<(), PersistenceRunError> {
		let existing = store.get_persisted_state().await?;
		self.state.initialize_existing_state(existing)?;
		Ok(())
	}

	/// Runs the persistence callbacks targeting `mode` and returns the
	/// outgoing state.
	pub async fn collect_state(
		&self,
		mode: SerializationMode,
	) -> Result<PersistedState, PersistenceRunError> {
		self.state.open_persistence_context()?;
		let run = OpenRun::new(&self.state);

		let callbacks = self.state.callbacks_targeting(mode);
		tracing::debug!(
			mode = ?mode,
			callbacks = callbacks.len(),
			"Running persistence callbacks"
		);

		let mut failures = Vec::new();
		for (position, entry) in callbacks.into_iter().enumerate() {
			if let Err(error) = (entry.callback)().await {
				tracing::error!(
					position,
					mode = ?entry.mode,
					error = %error,
					"Persistence callback failed"
				);
				failures.push(CallbackFailure {
					position,
					mode: entry.mode,
					error,
				});
			}
		}

		let state = run.close()?;
		if failures.is_empty() {
			Ok(state)
		} else {
			Err(PersistenceRunError::CallbackFailures { failures, state })
		}
	}

	/// Runs the callbacks targeting `mode` and writes the result to `store`.
	///
	/// When some callbacks fail, whatever the others wrote is still handed to
	/// the store before the aggregate failure is returned.
	pub async fn persist_state(
		&self,
		store: &dyn PersistentStateStore,
		mode: SerializationMode,
	) -> Result<(), PersistenceRunError> {
		match self.collect_state(mode).await {
			Ok(state) => {
				store.persist_state(state).await?;
				Ok(())
			}
			Err(PersistenceRunError::CallbackFailures { failures, state }) => {
				tracing::warn!(
					failed = failures.len(),
					entries = state.len(),
					"Persisting partial component state"
				);
				store.persist_state(state.clone()).await?;
				Err(PersistenceRunError::CallbackFailures { failures, state })
			}
			Err(other) => Err(other),
		}
	}
}

/// Open persistence context of a run in progress.
///
/// Closes the context when dropped before [`close`](Self::close), so a
/// cancelled run does not block later runs on the same session.
struct OpenRun<'a> {
	state: &'a PersistentComponentState,
	closed: bool,
}

impl<'a> OpenRun<'a> {
	fn new(state: &'a PersistentComponentState) -> Self {
		Self {
			state,
			closed: false,
		}
	}

	fn close(mut self) -> Result<PersistedState, PersistenceRunError> {
		self.closed = true;
		Ok(self.state.close_persistence_context()?)
	}
}

impl Drop for OpenRun<'_> {
	fn drop(&mut self) {
		if !self.closed && self.state.close_persistence_context().is_ok() {
			tracing::warn!("Persistence run cancelled; discarded its partial state");
		}
	}
}
