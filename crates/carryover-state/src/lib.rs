//! # Carryover State
//!
//! Component state persistence and handoff between rendering phases.
//!
//! State captured while one phase (for example a non-interactive prerender)
//! is about to pause is handed to the next phase, where each value can be
//! claimed exactly once.
//!
//! ## Pieces
//!
//! - [`PersistentComponentState`]: the per-session store. Holds restored
//!   *existing* state (take-once) and gates writes of *outgoing* state.
//! - [`PersistenceContext`]: the open window of a persistence run. Writes
//!   outside it fail, and each key may be written once per run.
//! - [`PersistingComponentStateSubscription`]: returned by callback
//!   registration, disposes the registration.
//! - [`SerializationMode`] and [`SerializationModeHandler`]: which rendering
//!   environments a callback's state applies to.
//! - [`StateCodec`]: byte codecs ([`JsonCodec`], `MessagePackCodec` with the
//!   `msgpack` feature) behind the typed helpers.
//! - [`ComponentStatePersistenceManager`] and [`PersistentStateStore`]: the
//!   host side that restores state and runs persistence.
//!
//! ## Example
//!
//! ```
//! use carryover_state::{
//! 	ComponentStatePersistenceManager, InMemoryStateStore, PersistenceSettings,
//! 	SerializationMode,
//! };
//!
//! # futures::executor::block_on(async {
//! let store = InMemoryStateStore::new();
//!
//! // Prerender phase
//! let prerender = ComponentStatePersistenceManager::new(&PersistenceSettings::default());
//! let state = prerender.state().downgrade();
//! let _subscription = prerender.state().register_on_persisting_with_mode(
//! 	move || {
//! 		let state = state.clone();
//! 		async move {
//! 			if let Some(state) = state.upgrade() {
//! 				state.persist_as_json("count", &3)?;
//! 			}
//! 			Ok::<(), anyhow::Error>(())
//! 		}
//! 	},
//! 	SerializationMode::Server,
//! );
//! prerender
//! 	.persist_state(&store, SerializationMode::Server)
//! 	.await
//! 	.unwrap();
//!
//! // Interactive phase
//! let interactive = ComponentStatePersistenceManager::new(&PersistenceSettings::default());
//! interactive.restore_state(&store).await.unwrap();
//! assert_eq!(interactive.state().try_take_from_json::<i32>("count").unwrap(), Some(3));
//! # });
//! ```

pub mod codec;
pub mod context;
pub mod error;
pub mod manager;
pub mod mode;
pub mod registry;
pub mod settings;
pub mod state;
pub mod store;

#[cfg(feature = "msgpack")]
pub use codec::MessagePackCodec;
pub use codec::{JsonCodec, StateCodec};
pub use context::{PersistedState, PersistenceContext};
pub use error::{
	CallbackFailure, CodecError, PersistError, PersistenceRunError, Result, StoreError,
};
pub use manager::ComponentStatePersistenceManager;
pub use mode::{
	CallbackOrigin, ComponentOwner, DefaultSerializationModeHandler, InteractiveRenderMode,
	SerializationMode, SerializationModeHandler,
};
pub use registry::{PersistCallback, PersistingComponentStateSubscription};
pub use settings::PersistenceSettings;
pub use state::{PersistentComponentState, WeakPersistentComponentState};
pub use store::{InMemoryStateStore, PersistentStateStore};
