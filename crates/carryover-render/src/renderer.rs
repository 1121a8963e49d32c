//! Non-interactive rendering gateway.

use crate::component::{Component, ComponentType};
use crate::content::HtmlContent;
use crate::dispatcher::Dispatcher;
use crate::engine::{HtmlRendererCore, RenderEngine};
use crate::error::RenderError;
use crate::parameters::ParameterView;
use crate::services::ServiceProvider;
use crate::settings::RendererSettings;
use std::fmt;

/// Renders components to HTML outside of any interactive session.
///
/// The gateway owns a render engine living on its own [`Dispatcher`] thread.
/// Every call is marshaled onto that thread, whichever thread or runtime it
/// comes from. Call [`dispose`](Self::dispose) to release the engine; dropping
/// the gateway stops the thread without running the engine's disposal.
///
/// # Examples
///
/// ```
/// use carryover_render::{
/// 	Component, ComponentContext, HtmlRenderer, ParameterView, RenderError, ServiceProvider,
/// 	html_escape,
/// };
///
/// struct Hello {
/// 	name: String,
/// }
///
/// impl Component for Hello {
/// 	fn name() -> &'static str {
/// 		"Hello"
/// 	}
///
/// 	fn from_context(context: &ComponentContext<'_>) -> Result<Self, RenderError> {
/// 		Ok(Self {
/// 			name: context.parameters().get_required("name")?,
/// 		})
/// 	}
///
/// 	fn render(&self) -> String {
/// 		format!("<h1>Hello, {}!</h1>", html_escape(&self.name))
/// 	}
/// }
///
/// # futures::executor::block_on(async {
/// let renderer = HtmlRenderer::new(ServiceProvider::new())?;
/// let parameters = ParameterView::builder().add("name", "<world>")?.build();
///
/// let html = renderer
/// 	.render_component_with_parameters::<Hello>(parameters)
/// 	.await?;
/// assert_eq!(html.to_html_string(), "<h1>Hello, &lt;world&gt;!</h1>");
///
/// renderer.dispose().await?;
/// # Ok::<(), RenderError>(())
/// # }).unwrap();
/// ```
pub struct HtmlRenderer<E: RenderEngine = HtmlRendererCore> {
	dispatcher: Dispatcher<E>,
}

impl HtmlRenderer<HtmlRendererCore> {
	/// Starts a renderer with default settings.
	pub fn new(services: ServiceProvider) -> Result<Self, RenderError> {
		Self::with_settings(services, &RendererSettings::default())
	}

	/// Starts a renderer configured by `settings`.
	pub fn with_settings(
		services: ServiceProvider,
		settings: &RendererSettings,
	) -> Result<Self, RenderError> {
		Self::with_engine(settings, move || Ok(HtmlRendererCore::new(services)))
	}
}

impl<E: RenderEngine> HtmlRenderer<E> {
	/// Starts a renderer around the engine built by `factory` on the
	/// dispatcher thread.
	pub fn with_engine<F>(settings: &RendererSettings, factory: F) -> Result<Self, RenderError>
	where
		F: FnOnce() -> Result<E, RenderError> + Send + 'static,
	{
		Ok(Self {
			dispatcher: Dispatcher::start(settings, factory)?,
		})
	}

	/// The dispatcher owning the engine, for running other work on the
	/// rendering affinity.
	pub fn dispatcher(&self) -> &Dispatcher<E> {
		&self.dispatcher
	}

	/// Renders `C` without parameters and waits for quiescence.
	pub async fn render_component<C: Component>(&self) -> Result<HtmlContent, RenderError> {
		self.render_component_with::<C>(ParameterView::empty(), true)
			.await
	}

	/// Renders `C` with `parameters` and waits for quiescence.
	pub async fn render_component_with_parameters<C: Component>(
		&self,
		parameters: ParameterView,
	) -> Result<HtmlContent, RenderError> {
		self.render_component_with::<C>(parameters, true).await
	}

	/// Renders `C` with `parameters`.
	///
	/// With `await_quiescence` set to `false` the call returns after the
	/// initial pass and asynchronous initialization may still be running.
	pub async fn render_component_with<C: Component>(
		&self,
		parameters: ParameterView,
		await_quiescence: bool,
	) -> Result<HtmlContent, RenderError> {
		let component = ComponentType::of::<C>();
		self.dispatcher
			.invoke_async(move |engine| async move {
				engine
					.render_component(component, parameters, await_quiescence)
					.await
			})
			.await?
	}

	/// Disposes the engine on its thread and stops the dispatcher.
	pub async fn dispose(self) -> Result<(), RenderError> {
		self.dispatcher
			.shutdown(|engine| async move { engine.dispose().await })
			.await
	}
}

impl<E: RenderEngine> fmt::Debug for HtmlRenderer<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HtmlRenderer")
			.field("dispatcher", &self.dispatcher)
			.finish()
	}
}
