//! Ordered registry of persistence callbacks and their subscriptions.

use crate::mode::SerializationMode;
use futures::future::LocalBoxFuture;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A zero-argument asynchronous callback invoked when the host is about to pause.
pub type PersistCallback = Rc<dyn Fn() -> LocalBoxFuture<'static, anyhow::Result<()>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CallbackId(u64);

#[derive(Clone)]
pub(crate) struct PersistenceCallback {
	pub(crate) id: CallbackId,
	pub(crate) callback: PersistCallback,
	pub(crate) mode: SerializationMode,
}

impl fmt::Debug for PersistenceCallback {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PersistenceCallback")
			.field("id", &self.id)
			.field("mode", &self.mode)
			.finish_non_exhaustive()
	}
}

#[derive(Debug, Default)]
pub(crate) struct CallbackRegistry {
	next_id: u64,
	entries: Vec<PersistenceCallback>,
}

impl CallbackRegistry {
	pub(crate) fn add(&mut self, callback: PersistCallback, mode: SerializationMode) -> CallbackId {
		let id = CallbackId(self.next_id);
		self.next_id += 1;
		self.entries.push(PersistenceCallback { id, callback, mode });
		id
	}

	pub(crate) fn remove(&mut self, id: CallbackId) -> bool {
		let before = self.entries.len();
		self.entries.retain(|entry| entry.id != id);
		self.entries.len() != before
	}

	pub(crate) fn contains(&self, id: CallbackId) -> bool {
		self.entries.iter().any(|entry| entry.id == id)
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.len()
	}

	/// Snapshot of the callbacks a run targeting `active` invokes, in
	/// registration order.
	pub(crate) fn targeting(&self, active: SerializationMode) -> Vec<PersistenceCallback> {
		self.entries
			.iter()
			.filter(|entry| entry.mode.intersects(active))
			.cloned()
			.collect()
	}
}

/// Handle returned by callback registration.
///
/// Dropping the handle leaves the callback registered; call
/// [`dispose`](Self::dispose) to remove it.
pub struct PersistingComponentStateSubscription {
	registry: Weak<RefCell<CallbackRegistry>>,
	id: CallbackId,
}

impl PersistingComponentStateSubscription {
	pub(crate) fn new(registry: &Rc<RefCell<CallbackRegistry>>, id: CallbackId) -> Self {
		Self {
			registry: Rc::downgrade(registry),
			id,
		}
	}

	/// Removes the registered callback. Calling this more than once, or after
	/// the owning state is gone, does nothing.
	pub fn dispose(&mut self) {
		if let Some(registry) = self.registry.upgrade() {
			registry.borrow_mut().remove(self.id);
		}
		self.registry = Weak::new();
	}

	/// Returns `true` while the callback is still registered.
	pub fn is_active(&self) -> bool {
		self.registry
			.upgrade()
			.is_some_and(|registry| registry.borrow().contains(self.id))
	}
}

impl fmt::Debug for PersistingComponentStateSubscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PersistingComponentStateSubscription")
			.field("id", &self.id)
			.field("active", &self.is_active())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::FutureExt;
	use rstest::rstest;

	fn noop() -> PersistCallback {
		Rc::new(|| async { Ok::<(), anyhow::Error>(()) }.boxed_local())
	}

	#[rstest]
	fn test_targeting_filters_by_mode_and_keeps_order() {
		let mut registry = CallbackRegistry::default();
		let a = registry.add(noop(), SerializationMode::Server);
		let b = registry.add(noop(), SerializationMode::WebAssembly);
		let c = registry.add(noop(), SerializationMode::Both);

		let server: Vec<_> = registry
			.targeting(SerializationMode::Server)
			.into_iter()
			.map(|entry| entry.id)
			.collect();
		assert_eq!(server, vec![a, c]);

		let both: Vec<_> = registry
			.targeting(SerializationMode::Both)
			.into_iter()
			.map(|entry| entry.id)
			.collect();
		assert_eq!(both, vec![a, b, c]);
	}

	#[rstest]
	fn test_dispose_is_idempotent() {
		let registry = Rc::new(RefCell::new(CallbackRegistry::default()));
		let id = registry.borrow_mut().add(noop(), SerializationMode::Both);
		let mut subscription = PersistingComponentStateSubscription::new(&registry, id);

		assert!(subscription.is_active());
		subscription.dispose();
		assert!(!subscription.is_active());
		subscription.dispose();
		assert_eq!(registry.borrow().len(), 0);
	}

	#[rstest]
	fn test_dispose_removes_only_its_entry() {
		let registry = Rc::new(RefCell::new(CallbackRegistry::default()));
		let callback = noop();
		let first = registry
			.borrow_mut()
			.add(Rc::clone(&callback), SerializationMode::Both);
		let second = registry.borrow_mut().add(callback, SerializationMode::Both);

		PersistingComponentStateSubscription::new(&registry, first).dispose();

		assert_eq!(registry.borrow().len(), 1);
		assert!(registry.borrow().contains(second));
	}

	#[rstest]
	fn test_dispose_after_registry_dropped() {
		let registry = Rc::new(RefCell::new(CallbackRegistry::default()));
		let id = registry.borrow_mut().add(noop(), SerializationMode::Both);
		let mut subscription = PersistingComponentStateSubscription::new(&registry, id);
		drop(registry);

		subscription.dispose();
		assert!(!subscription.is_active());
	}
}
