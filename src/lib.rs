//! # Carryover
//!
//! Component state that survives the move from one rendering phase to the
//! next, typically from a non-interactive server prerender to the interactive
//! session that resumes it.
//!
//! ## Crates
//!
//! - [`state`] (`carryover-state`): the take-once state store, persistence
//!   callbacks and their serialization modes, byte codecs, and the host-side
//!   [`ComponentStatePersistenceManager`](state::ComponentStatePersistenceManager).
//! - [`render`] (`carryover-render`): the single-affinity
//!   [`Dispatcher`](render::Dispatcher) and the
//!   [`HtmlRenderer`](render::HtmlRenderer) gateway.
//!
//! ## Feature Flags
//!
//! - `msgpack` - MessagePack state codec (`state::MessagePackCodec`)
//!
//! ## Handoff
//!
//! The state of a session is `!Send` and must live on the renderer's
//! affinity. Run the prerender side of the handoff through the renderer's
//! dispatcher and ship the collected map to the next phase:
//!
//! ```
//! use carryover::prelude::*;
//!
//! # futures::executor::block_on(async {
//! let renderer = HtmlRenderer::new(ServiceProvider::new())?;
//!
//! let outgoing = renderer
//! 	.dispatcher()
//! 	.invoke_async(|_engine| async move {
//! 		let manager = ComponentStatePersistenceManager::default();
//! 		let state = manager.state().downgrade();
//! 		let _subscription = manager.state().register_on_persisting(
//! 			&CallbackOrigin::Service,
//! 			move || {
//! 				let state = state.clone();
//! 				async move {
//! 					if let Some(state) = state.upgrade() {
//! 						state.persist_as_json("theme", "dark")?;
//! 					}
//! 					Ok::<(), anyhow::Error>(())
//! 				}
//! 			},
//! 		);
//! 		manager.collect_state(SerializationMode::Server).await.ok()
//! 	})
//! 	.await?
//! 	.unwrap_or_default();
//! renderer.dispose().await?;
//!
//! let resumed = PersistentComponentState::default();
//! resumed.initialize_existing_state(outgoing).unwrap();
//! assert_eq!(
//! 	resumed.try_take_from_json::<String>("theme").unwrap().as_deref(),
//! 	Some("dark")
//! );
//! # Ok::<(), RenderError>(())
//! # }).unwrap();
//! ```

pub mod settings;

pub use carryover_render as render;
pub use carryover_state as state;

pub use settings::{CarryoverSettings, ConfigError};

/// Commonly used types from both crates.
pub mod prelude {
	pub use crate::settings::CarryoverSettings;

	pub use carryover_state::{
		CallbackOrigin, ComponentOwner, ComponentStatePersistenceManager, InMemoryStateStore,
		InteractiveRenderMode, JsonCodec, PersistError, PersistedState, PersistenceRunError,
		PersistentComponentState, PersistentStateStore, PersistingComponentStateSubscription,
		SerializationMode, StateCodec,
	};

	pub use carryover_render::{
		Component, ComponentContext, HtmlContent, HtmlRenderer, ParameterView, RenderError,
		ServiceProvider, html_escape,
	};
}
