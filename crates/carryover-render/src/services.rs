//! Service locator handed to component activation.

use crate::component::ComponentActivator;
use crate::error::RenderError;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Type-keyed collection of shared services.
///
/// Clones share the same entries. Components resolve what they need from it
/// in [`Component::from_context`](crate::Component::from_context).
///
/// # Examples
///
/// ```
/// use carryover_render::ServiceProvider;
///
/// let services = ServiceProvider::new();
/// services.insert(42u32);
///
/// assert_eq!(*services.get::<u32>().unwrap(), 42);
/// assert!(services.get::<String>().is_none());
/// ```
#[derive(Clone, Default)]
pub struct ServiceProvider {
	entries: Arc<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>>,
}

impl ServiceProvider {
	/// Creates an empty provider.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `value`, replacing any service of the same type.
	pub fn insert<T: Any + Send + Sync>(&self, value: T) {
		self.insert_arc(Arc::new(value));
	}

	/// Registers an already shared service.
	pub fn insert_arc<T: Any + Send + Sync>(&self, value: Arc<T>) {
		let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
		entries.insert(TypeId::of::<T>(), value);
	}

	/// Looks up the service of type `T`.
	pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
		entries
			.get(&TypeId::of::<T>())
			.and_then(|entry| Arc::clone(entry).downcast::<T>().ok())
	}

	/// Looks up the service of type `T`, failing when it is not registered.
	pub fn get_required<T: Any + Send + Sync>(&self) -> Result<Arc<T>, RenderError> {
		self.get::<T>()
			.ok_or(RenderError::MissingService(type_name::<T>()))
	}

	/// Returns `true` when a service of type `T` is registered.
	pub fn contains<T: Any + Send + Sync>(&self) -> bool {
		let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
		entries.contains_key(&TypeId::of::<T>())
	}

	/// Registers the activator used to create component instances.
	pub fn set_activator(&self, activator: impl ComponentActivator) {
		self.insert::<Arc<dyn ComponentActivator>>(Arc::new(activator));
	}

	/// The registered component activator, if any.
	pub fn activator(&self) -> Option<Arc<dyn ComponentActivator>> {
		self.get::<Arc<dyn ComponentActivator>>()
			.map(|activator| Arc::clone(&*activator))
	}
}

impl fmt::Debug for ServiceProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
		f.debug_struct("ServiceProvider")
			.field("services", &entries.len())
			.finish()
	}
}
