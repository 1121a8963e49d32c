//! Render engine seam and the default passive HTML engine.

use crate::component::{
	ComponentActivator, ComponentContext, ComponentType, DefaultComponentActivator,
};
use crate::content::HtmlContent;
use crate::error::RenderError;
use crate::parameters::ParameterView;
use crate::services::ServiceProvider;
use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Engine that turns a component type and its parameters into markup.
///
/// Engines live on the dispatcher thread and are driven only from there, so
/// implementations need not be `Send`.
#[async_trait(?Send)]
pub trait RenderEngine: 'static {
	/// Renders `component` as a root component.
	///
	/// With `await_quiescence`, the returned markup reflects the component after
	/// its asynchronous initialization has completed. Without it, the markup of
	/// the initial pass is returned and initialization continues in the
	/// background.
	async fn render_component(
		&self,
		component: ComponentType,
		parameters: ParameterView,
		await_quiescence: bool,
	) -> Result<HtmlContent, RenderError>;

	/// Releases the engine's resources, cancelling unfinished background work.
	async fn dispose(&self);
}

type Settle = JoinHandle<Result<String, RenderError>>;

/// Passive renderer producing HTML strings from [`Component`](crate::Component)s.
///
/// Asynchronous initialization runs in a local task that owns the component
/// instance, so this engine must be driven inside a [`tokio::task::LocalSet`]
/// such as the one of a [`Dispatcher`](crate::Dispatcher).
pub struct HtmlRendererCore {
	services: ServiceProvider,
	activator: Arc<dyn ComponentActivator>,
	pending: RefCell<Vec<Settle>>,
	disposed: Cell<bool>,
}

impl HtmlRendererCore {
	/// Creates an engine resolving components from `services`.
	///
	/// Uses the activator registered in `services`, or
	/// [`DefaultComponentActivator`] when there is none.
	pub fn new(services: ServiceProvider) -> Self {
		let activator = services
			.activator()
			.unwrap_or_else(|| Arc::new(DefaultComponentActivator));
		Self {
			services,
			activator,
			pending: RefCell::new(Vec::new()),
			disposed: Cell::new(false),
		}
	}

	/// Services components are resolved from.
	pub fn services(&self) -> &ServiceProvider {
		&self.services
	}

	/// Number of background initializations still running.
	pub fn pending_tasks(&self) -> usize {
		self.pending
			.borrow()
			.iter()
			.filter(|task| !task.is_finished())
			.count()
	}

	/// Returns `true` once [`dispose`](RenderEngine::dispose) has run.
	pub fn is_disposed(&self) -> bool {
		self.disposed.get()
	}

	fn track(&self, task: Settle) {
		let mut pending = self.pending.borrow_mut();
		pending.retain(|task| !task.is_finished());
		pending.push(task);
	}
}

#[async_trait(?Send)]
impl RenderEngine for HtmlRendererCore {
	async fn render_component(
		&self,
		component: ComponentType,
		parameters: ParameterView,
		await_quiescence: bool,
	) -> Result<HtmlContent, RenderError> {
		if self.disposed.get() {
			return Err(RenderError::Disposed);
		}

		let name = component.name();
		let context = ComponentContext::new(&parameters, &self.services);
		let mut instance = self
			.activator
			.create_instance(component, &context)
			.inspect_err(|error| {
				tracing::warn!(component = name, error = %error, "Component activation failed");
			})?;

		instance.on_initialized();
		let initial = instance.render();
		tracing::debug!(component = name, await_quiescence, "Rendered initial pass");

		let settle = tokio::task::spawn_local(async move {
			let result = instance.on_initialized_async().await;
			match result {
				Ok(()) => {
					tracing::debug!(component = name, "Component reached quiescence");
					Ok(instance.render())
				}
				Err(error) => {
					tracing::warn!(
						component = name,
						error = %error,
						"Asynchronous initialization failed"
					);
					Err(error)
				}
			}
		});

		if !await_quiescence {
			self.track(settle);
			return Ok(HtmlContent::new(name, initial, false));
		}

		match settle.await {
			Ok(Ok(html)) => Ok(HtmlContent::new(name, html, true)),
			Ok(Err(error)) => Err(error),
			Err(join_error) if join_error.is_cancelled() => Err(RenderError::Cancelled),
			Err(join_error) => Err(RenderError::Component {
				component: name.to_string(),
				message: join_error.to_string(),
			}),
		}
	}

	async fn dispose(&self) {
		if self.disposed.replace(true) {
			return;
		}
		let pending: Vec<Settle> = self.pending.borrow_mut().drain(..).collect();
		let unfinished = pending.iter().filter(|task| !task.is_finished()).count();
		for task in pending {
			task.abort();
		}
		tracing::debug!(cancelled = unfinished, "Render engine disposed");
	}
}

impl fmt::Debug for HtmlRendererCore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HtmlRendererCore")
			.field("services", &self.services)
			.field("pending", &self.pending.borrow().len())
			.field("disposed", &self.disposed.get())
			.finish_non_exhaustive()
	}
}
