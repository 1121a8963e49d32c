//! The persistent component state store.
//!
//! Holds the *existing* state restored from a previous rendering phase and
//! gates writes of *outgoing* state behind an open persistence context.

use crate::context::{PersistedState, PersistenceContext};
use crate::error::{PersistError, Result};
use crate::mode::{
	CallbackOrigin, DefaultSerializationModeHandler, SerializationMode, SerializationModeHandler,
};
use crate::registry::{
	CallbackRegistry, PersistenceCallback, PersistingComponentStateSubscription,
};
use crate::settings::PersistenceSettings;
use futures::FutureExt;
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

#[derive(Default)]
struct StateSlots {
	existing: Option<PersistedState>,
	context: Option<PersistenceContext>,
}

/// The state for the components and services of one render session.
///
/// Handles are cheap to clone and share the same store. The type is `!Send`:
/// it lives on the session's rendering affinity and relies on that single
/// owner instead of locking.
///
/// # Example
///
/// ```
/// use carryover_state::PersistentComponentState;
/// use std::collections::HashMap;
///
/// let state = PersistentComponentState::default();
/// state
/// 	.initialize_existing_state(HashMap::from([("count".to_string(), b"42".to_vec())]))
/// 	.unwrap();
///
/// assert_eq!(state.try_take_from_json::<u32>("count").unwrap(), Some(42));
/// assert_eq!(state.try_take_from_json::<u32>("count").unwrap(), None);
/// ```
#[derive(Clone)]
pub struct PersistentComponentState {
	slots: Rc<RefCell<StateSlots>>,
	callbacks: Rc<RefCell<CallbackRegistry>>,
	mode_handler: Rc<dyn SerializationModeHandler>,
}

impl Default for PersistentComponentState {
	fn default() -> Self {
		Self::new(Rc::new(DefaultSerializationModeHandler::default()))
	}
}

impl PersistentComponentState {
	/// Creates an uninitialized store using `mode_handler` to infer callback modes.
	pub fn new(mode_handler: Rc<dyn SerializationModeHandler>) -> Self {
		Self {
			slots: Rc::new(RefCell::new(StateSlots::default())),
			callbacks: Rc::new(RefCell::new(CallbackRegistry::default())),
			mode_handler,
		}
	}

	/// Creates a store whose mode policy follows `settings`.
	pub fn from_settings(settings: &PersistenceSettings) -> Self {
		Self::new(Rc::new(DefaultSerializationModeHandler::from_settings(settings)))
	}

	/// Supplies the state restored from a previous phase.
	///
	/// Must be called at most once, before component code reads state. A store
	/// that is never initialized behaves as empty.
	pub fn initialize_existing_state(&self, existing: PersistedState) -> Result<()> {
		let mut slots = self.slots.borrow_mut();
		if slots.existing.is_some() {
			return Err(PersistError::InvalidState(
				"existing state has already been initialized".to_string(),
			));
		}
		tracing::debug!(entries = existing.len(), "Initialized existing component state");
		slots.existing = Some(existing);
		Ok(())
	}

	/// Returns `true` once existing state has been supplied.
	pub fn is_initialized(&self) -> bool {
		self.slots.borrow().existing.is_some()
	}

	/// Registers a callback invoked when the host is about to pause, inferring
	/// its mode from where it was registered.
	///
	/// A callback that captures this handle keeps the session alive for as long
	/// as it stays registered; capture [`downgrade`](Self::downgrade) instead to
	/// avoid the cycle.
	pub fn register_on_persisting<F, Fut>(
		&self,
		origin: &CallbackOrigin,
		callback: F,
	) -> PersistingComponentStateSubscription
	where
		F: Fn() -> Fut + 'static,
		Fut: Future<Output = anyhow::Result<()>> + 'static,
	{
		let mode = self.mode_handler.callback_target_mode(origin);
		self.register_on_persisting_with_mode(callback, mode)
	}

	/// Registers a callback for an explicit serialization mode.
	pub fn register_on_persisting_with_mode<F, Fut>(
		&self,
		callback: F,
		mode: SerializationMode,
	) -> PersistingComponentStateSubscription
	where
		F: Fn() -> Fut + 'static,
		Fut: Future<Output = anyhow::Result<()>> + 'static,
	{
		let id = self
			.callbacks
			.borrow_mut()
			.add(Rc::new(move || callback().boxed_local()), mode);
		PersistingComponentStateSubscription::new(&self.callbacks, id)
	}

	/// Number of registered callbacks.
	pub fn callback_count(&self) -> usize {
		self.callbacks.borrow().len()
	}

	/// Writes serialized bytes under `key` into the open persistence context.
	pub fn persist(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
		self.ensure_can_persist(key)?;
		let mut slots = self.slots.borrow_mut();
		match slots.context.as_mut() {
			Some(context) => context.persist(key, bytes),
			None => Err(not_persisting()),
		}
	}

	/// Checks every precondition of [`persist`](Self::persist) without writing.
	pub(crate) fn ensure_can_persist(&self, key: &str) -> Result<()> {
		require_key(key)?;
		let slots = self.slots.borrow();
		match slots.context.as_ref() {
			None => Err(not_persisting()),
			Some(context) if context.contains_key(key) => {
				Err(PersistError::DuplicateKey(key.to_string()))
			}
			Some(_) => Ok(()),
		}
	}

	/// Takes the restored bytes stored under `key`.
	///
	/// Returns `None` when the key is absent or the store was never
	/// initialized. A successful take removes the entry, so each value is
	/// handed out once.
	pub fn try_take(&self, key: &str) -> Result<Option<Vec<u8>>> {
		require_key(key)?;
		let mut slots = self.slots.borrow_mut();
		Ok(slots
			.existing
			.as_mut()
			.and_then(|existing| existing.remove(key)))
	}

	/// Returns `true` while a persistence context is open.
	pub fn is_persisting(&self) -> bool {
		self.slots.borrow().context.is_some()
	}

	/// Opens a persistence context. Fails if one is already open.
	pub fn open_persistence_context(&self) -> Result<()> {
		let mut slots = self.slots.borrow_mut();
		if slots.context.is_some() {
			return Err(PersistError::InvalidState(
				"a persistence context is already open".to_string(),
			));
		}
		slots.context = Some(PersistenceContext::open());
		tracing::debug!("Opened persistence context");
		Ok(())
	}

	/// Closes the open persistence context and returns what was written.
	pub fn close_persistence_context(&self) -> Result<PersistedState> {
		let context = self.slots.borrow_mut().context.take().ok_or_else(|| {
			PersistError::InvalidState("no persistence context is open".to_string())
		})?;
		let state = context.close();
		tracing::debug!(entries = state.len(), "Closed persistence context");
		Ok(state)
	}

	pub(crate) fn callbacks_targeting(&self, mode: SerializationMode) -> Vec<PersistenceCallback> {
		self.callbacks.borrow().targeting(mode)
	}

	/// Creates a non-owning handle.
	pub fn downgrade(&self) -> WeakPersistentComponentState {
		WeakPersistentComponentState {
			slots: Rc::downgrade(&self.slots),
			callbacks: Rc::downgrade(&self.callbacks),
			mode_handler: Rc::downgrade(&self.mode_handler),
		}
	}
}

impl fmt::Debug for PersistentComponentState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let slots = self.slots.borrow();
		f.debug_struct("PersistentComponentState")
			.field(
				"existing",
				&slots.existing.as_ref().map(|existing| existing.len()),
			)
			.field("persisting", &slots.context.is_some())
			.field("callbacks", &self.callbacks.borrow().len())
			.finish()
	}
}

/// Non-owning handle to a [`PersistentComponentState`].
#[derive(Clone)]
pub struct WeakPersistentComponentState {
	slots: Weak<RefCell<StateSlots>>,
	callbacks: Weak<RefCell<CallbackRegistry>>,
	mode_handler: Weak<dyn SerializationModeHandler>,
}

impl WeakPersistentComponentState {
	/// Returns the store if the session still holds it.
	pub fn upgrade(&self) -> Option<PersistentComponentState> {
		Some(PersistentComponentState {
			slots: self.slots.upgrade()?,
			callbacks: self.callbacks.upgrade()?,
			mode_handler: self.mode_handler.upgrade()?,
		})
	}
}

impl fmt::Debug for WeakPersistentComponentState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WeakPersistentComponentState")
			.field("alive", &(self.slots.strong_count() > 0))
			.finish()
	}
}

fn require_key(key: &str) -> Result<()> {
	if key.is_empty() {
		return Err(PersistError::ArgumentInvalid(
			"key must not be empty".to_string(),
		));
	}
	Ok(())
}

fn not_persisting() -> PersistError {
	PersistError::InvalidState(
		"persisting state is only allowed during an on-persisting callback".to_string(),
	)
}
