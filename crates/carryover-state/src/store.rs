//! Host-side transport of persisted state between rendering phases.

use crate::context::PersistedState;
use crate::error::StoreError;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

/// Where the host reads restored state from and writes outgoing state to.
#[async_trait(?Send)]
pub trait PersistentStateStore {
	/// Returns the state persisted by the previous phase.
	async fn get_persisted_state(&self) -> Result<PersistedState, StoreError>;

	/// Hands the output of a persistence run to the next phase.
	async fn persist_state(&self, state: PersistedState) -> Result<(), StoreError>;
}

/// Process-local store, shareable across threads.
///
/// Each write replaces the previous contents.
///
/// # Examples
///
/// ```
/// use carryover_state::InMemoryStateStore;
/// use std::collections::HashMap;
///
/// let store = InMemoryStateStore::with_state(HashMap::from([("k".to_string(), vec![1])]));
/// assert_eq!(store.snapshot().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateStore {
	state: Arc<Mutex<PersistedState>>,
}

impl InMemoryStateStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a store pre-populated with `state`.
	pub fn with_state(state: PersistedState) -> Self {
		Self {
			state: Arc::new(Mutex::new(state)),
		}
	}

	/// Returns a copy of the current contents.
	pub fn snapshot(&self) -> PersistedState {
		self.state
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}
}

#[async_trait(?Send)]
impl PersistentStateStore for InMemoryStateStore {
	async fn get_persisted_state(&self) -> Result<PersistedState, StoreError> {
		Ok(self.snapshot())
	}

	async fn persist_state(&self, state: PersistedState) -> Result<(), StoreError> {
		*self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
		Ok(())
	}
}
