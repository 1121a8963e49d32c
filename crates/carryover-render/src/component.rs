//! Component model: the component trait, type-erased component types and
//! activation.

use crate::error::RenderError;
use crate::parameters::ParameterView;
use crate::services::ServiceProvider;
use async_trait::async_trait;
use std::any::TypeId;
use std::fmt;

/// A renderable component.
///
/// Instances live on the renderer's affinity for their whole life, so they may
/// hold `!Send` state.
///
/// # Lifecycle
///
/// 1. [`from_context`](Self::from_context) builds the instance from its
///    parameters and services.
/// 2. [`on_initialized`](Self::on_initialized) runs synchronously, then
///    [`render`](Self::render) produces the initial markup.
/// 3. [`on_initialized_async`](Self::on_initialized_async) runs; once it
///    completes the component is rendered again and considered settled.
#[async_trait(?Send)]
pub trait Component: 'static {
	/// Name used in diagnostics and output handles.
	fn name() -> &'static str
	where
		Self: Sized;

	/// Creates an instance from its parameters and services.
	fn from_context(context: &ComponentContext<'_>) -> Result<Self, RenderError>
	where
		Self: Sized;

	/// Synchronous initialization, run before the first render.
	fn on_initialized(&mut self) {}

	/// Asynchronous initialization, such as loading data.
	async fn on_initialized_async(&mut self) -> Result<(), RenderError> {
		Ok(())
	}

	/// Produces the component's current markup.
	fn render(&self) -> String;
}

/// What a component is created from.
#[derive(Debug, Clone, Copy)]
pub struct ComponentContext<'a> {
	parameters: &'a ParameterView,
	services: &'a ServiceProvider,
}

impl<'a> ComponentContext<'a> {
	/// Bundles the parameters and services for one activation.
	pub fn new(parameters: &'a ParameterView, services: &'a ServiceProvider) -> Self {
		Self {
			parameters,
			services,
		}
	}

	/// Parameters supplied by the caller.
	pub fn parameters(&self) -> &'a ParameterView {
		self.parameters
	}

	/// Services registered with the renderer.
	pub fn services(&self) -> &'a ServiceProvider {
		self.services
	}
}

type ComponentFactory = fn(&ComponentContext<'_>) -> Result<Box<dyn Component>, RenderError>;

/// Type-erased handle to a [`Component`] implementation.
///
/// It is `Copy + Send`, so it can cross into the rendering affinity where the
/// instance is then created.
#[derive(Clone, Copy)]
pub struct ComponentType {
	name: &'static str,
	type_id: TypeId,
	factory: ComponentFactory,
}

impl ComponentType {
	/// The component type of `C`.
	pub fn of<C: Component>() -> Self {
		Self {
			name: C::name(),
			type_id: TypeId::of::<C>(),
			factory: create::<C>,
		}
	}

	/// The component's diagnostic name.
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// The [`TypeId`] of the implementing type.
	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	/// Returns `true` when this is the component type of `C`.
	pub fn is<C: Component>(&self) -> bool {
		self.type_id == TypeId::of::<C>()
	}

	/// Creates an instance through the component's own constructor.
	pub fn instantiate(
		&self,
		context: &ComponentContext<'_>,
	) -> Result<Box<dyn Component>, RenderError> {
		(self.factory)(context)
	}
}

impl fmt::Debug for ComponentType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentType")
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}

impl PartialEq for ComponentType {
	fn eq(&self, other: &Self) -> bool {
		self.type_id == other.type_id
	}
}

impl Eq for ComponentType {}

fn create<C: Component>(
	context: &ComponentContext<'_>,
) -> Result<Box<dyn Component>, RenderError> {
	Ok(Box::new(C::from_context(context)?))
}

/// Strategy for creating component instances.
///
/// Register a custom activator with
/// [`ServiceProvider::set_activator`](crate::ServiceProvider::set_activator).
pub trait ComponentActivator: Send + Sync + 'static {
	/// Creates an instance of `component` from `context`.
	fn create_instance(
		&self,
		component: ComponentType,
		context: &ComponentContext<'_>,
	) -> Result<Box<dyn Component>, RenderError>;
}

/// Creates components through [`Component::from_context`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultComponentActivator;

impl ComponentActivator for DefaultComponentActivator {
	fn create_instance(
		&self,
		component: ComponentType,
		context: &ComponentContext<'_>,
	) -> Result<Box<dyn Component>, RenderError> {
		component.instantiate(context)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	struct Badge {
		label: String,
	}

	impl Component for Badge {
		fn name() -> &'static str {
			"Badge"
		}

		fn from_context(context: &ComponentContext<'_>) -> Result<Self, RenderError> {
			Ok(Self {
				label: context.parameters().get_required("label")?,
			})
		}

		fn render(&self) -> String {
			format!("<span>{}</span>", self.label)
		}
	}

	struct Divider;

	impl Component for Divider {
		fn name() -> &'static str {
			"Divider"
		}

		fn from_context(_context: &ComponentContext<'_>) -> Result<Self, RenderError> {
			Ok(Self)
		}

		fn render(&self) -> String {
			"<hr>".to_string()
		}
	}

	#[rstest]
	fn test_component_type_identity() {
		let badge = ComponentType::of::<Badge>();
		assert_eq!(badge.name(), "Badge");
		assert!(badge.is::<Badge>());
		assert!(!badge.is::<Divider>());
		assert_ne!(badge, ComponentType::of::<Divider>());
	}

	#[rstest]
	fn test_default_activator_uses_from_context() {
		let parameters = ParameterView::builder().add("label", "new").unwrap().build();
		let services = ServiceProvider::new();
		let context = ComponentContext::new(&parameters, &services);

		let instance = DefaultComponentActivator
			.create_instance(ComponentType::of::<Badge>(), &context)
			.unwrap();

		assert_eq!(instance.render(), "<span>new</span>");
	}

	#[rstest]
	fn test_activation_propagates_parameter_errors() {
		let parameters = ParameterView::empty();
		let services = ServiceProvider::new();
		let context = ComponentContext::new(&parameters, &services);

		let result =
			DefaultComponentActivator.create_instance(ComponentType::of::<Badge>(), &context);

		assert!(matches!(result, Err(RenderError::InvalidParameter(_))));
	}
}
