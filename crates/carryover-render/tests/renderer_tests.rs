//! Rendering gateway integration tests

use async_trait::async_trait;
use carryover_render::{
	Component, ComponentActivator, ComponentContext, ComponentType, DefaultComponentActivator,
	HtmlRenderer, ParameterView, RenderEngine, RenderError, RendererSettings, ServiceProvider,
	html_escape,
};
use rstest::{fixture, rstest};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Released by the test to let `SlowProfile` finish loading.
struct LoadGate(Notify);

struct SlowProfile {
	user: String,
	gate: Arc<LoadGate>,
	bio: Option<String>,
}

#[async_trait(?Send)]
impl Component for SlowProfile {
	fn name() -> &'static str {
		"SlowProfile"
	}

	fn from_context(context: &ComponentContext<'_>) -> Result<Self, RenderError> {
		Ok(Self {
			user: context.parameters().get_required("user")?,
			gate: context.services().get_required::<LoadGate>()?,
			bio: None,
		})
	}

	async fn on_initialized_async(&mut self) -> Result<(), RenderError> {
		self.gate.0.notified().await;
		self.bio = Some(format!("{} writes Rust", self.user));
		Ok(())
	}

	fn render(&self) -> String {
		match &self.bio {
			Some(bio) => format!(
				"<section><h2>{}</h2><p>{}</p></section>",
				html_escape(&self.user),
				html_escape(bio)
			),
			None => format!(
				"<section><h2>{}</h2><p>Loading…</p></section>",
				html_escape(&self.user)
			),
		}
	}
}

struct Static;

impl Component for Static {
	fn name() -> &'static str {
		"Static"
	}

	fn from_context(_context: &ComponentContext<'_>) -> Result<Self, RenderError> {
		Ok(Self)
	}

	fn render(&self) -> String {
		"<footer>static</footer>".to_string()
	}
}

struct Refusing;

impl ComponentActivator for Refusing {
	fn create_instance(
		&self,
		component: ComponentType,
		context: &ComponentContext<'_>,
	) -> Result<Box<dyn Component>, RenderError> {
		if component.is::<Static>() {
			return Err(RenderError::ComponentActivation {
				component: component.name().to_string(),
				message: "not allowed here".to_string(),
			});
		}
		DefaultComponentActivator.create_instance(component, context)
	}
}

#[fixture]
fn gate() -> Arc<LoadGate> {
	Arc::new(LoadGate(Notify::new()))
}

fn renderer_with(gate: &Arc<LoadGate>) -> HtmlRenderer {
	let services = ServiceProvider::new();
	services.insert_arc(Arc::clone(gate));
	HtmlRenderer::new(services).unwrap()
}

fn profile_parameters() -> ParameterView {
	ParameterView::builder().add("user", "ada").unwrap().build()
}

/// Test: awaiting quiescence returns only after asynchronous initialization
#[rstest]
#[tokio::test]
async fn test_await_quiescence_waits_for_async_initialization(gate: Arc<LoadGate>) {
	let renderer = renderer_with(&gate);

	let html = {
		let render = renderer.render_component_with::<SlowProfile>(profile_parameters(), true);
		tokio::pin!(render);

		let early = tokio::time::timeout(Duration::from_millis(50), &mut render).await;
		assert!(early.is_err(), "render returned before initialization finished");

		gate.0.notify_one();
		render.await.unwrap()
	};

	assert!(html.is_quiescent());
	assert_eq!(
		html.to_html_string(),
		"<section><h2>ada</h2><p>ada writes Rust</p></section>"
	);
	renderer.dispose().await.unwrap();
}

/// Test: without quiescence the initial pass is returned while loading continues
#[rstest]
#[tokio::test]
async fn test_without_quiescence_returns_before_initialization(gate: Arc<LoadGate>) {
	let renderer = renderer_with(&gate);

	let html = renderer
		.render_component_with::<SlowProfile>(profile_parameters(), false)
		.await
		.unwrap();

	assert!(!html.is_quiescent());
	assert_eq!(html.component_name(), "SlowProfile");
	assert_eq!(
		html.to_html_string(),
		"<section><h2>ada</h2><p>Loading…</p></section>"
	);
	let pending = renderer
		.dispatcher()
		.invoke(|engine| engine.pending_tasks())
		.await
		.unwrap();
	assert_eq!(pending, 1);

	renderer.dispose().await.unwrap();
}

/// Test: default overloads render without parameters
#[rstest]
#[tokio::test]
async fn test_render_component_without_parameters() {
	let renderer = HtmlRenderer::new(ServiceProvider::new()).unwrap();

	let html = renderer.render_component::<Static>().await.unwrap();

	assert_eq!(html.to_html_string(), "<footer>static</footer>");
	assert!(html.is_quiescent());
	renderer.dispose().await.unwrap();
}

/// Test: parameter errors reach the caller
#[rstest]
#[tokio::test]
async fn test_missing_parameter_is_reported(gate: Arc<LoadGate>) {
	let renderer = renderer_with(&gate);

	let result = renderer
		.render_component_with_parameters::<SlowProfile>(ParameterView::empty())
		.await;

	assert!(matches!(result, Err(RenderError::InvalidParameter(_))));
	renderer.dispose().await.unwrap();
}

/// Test: a registered activator decides how components are created
#[rstest]
#[tokio::test]
async fn test_custom_activator_can_refuse_components() {
	let services = ServiceProvider::new();
	services.set_activator(Refusing);
	let renderer = HtmlRenderer::new(services).unwrap();

	let result = renderer.render_component::<Static>().await;

	match result {
		Err(RenderError::ComponentActivation { component, .. }) => assert_eq!(component, "Static"),
		other => panic!("unexpected result: {other:?}"),
	}
	renderer.dispose().await.unwrap();
}

/// Test: renders are marshaled onto the dispatcher thread
#[rstest]
#[tokio::test]
async fn test_work_runs_on_dispatcher_thread() {
	let settings = RendererSettings::default().with_thread_name("gateway-test");
	let renderer = HtmlRenderer::with_settings(ServiceProvider::new(), &settings).unwrap();

	assert!(!renderer.dispatcher().check_access());
	let (on_affinity, name) = renderer
		.dispatcher()
		.invoke(|_| {
			(
				std::thread::current().name() == Some("gateway-test"),
				std::thread::current().name().map(str::to_string),
			)
		})
		.await
		.unwrap();

	assert!(on_affinity);
	assert_eq!(name.as_deref(), Some("gateway-test"));
	renderer.dispose().await.unwrap();
}

/// Test: the gateway is usable from several threads at once
#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_callers_share_one_renderer() {
	let renderer = Arc::new(HtmlRenderer::new(ServiceProvider::new()).unwrap());

	let mut handles = Vec::new();
	for _ in 0..8 {
		let renderer = Arc::clone(&renderer);
		handles.push(tokio::spawn(async move {
			renderer.render_component::<Static>().await
		}));
	}
	for handle in handles {
		let html = handle.await.unwrap().unwrap();
		assert_eq!(html.to_html_string(), "<footer>static</footer>");
	}
}

/// Test: a disposed engine cancels background work and rejects renders
#[rstest]
#[tokio::test]
async fn test_disposed_engine_rejects_renders(gate: Arc<LoadGate>) {
	let renderer = renderer_with(&gate);
	renderer
		.render_component_with::<SlowProfile>(profile_parameters(), false)
		.await
		.unwrap();

	let (pending, disposed) = renderer
		.dispatcher()
		.invoke_async(|engine| async move {
			engine.dispose().await;
			(engine.pending_tasks(), engine.is_disposed())
		})
		.await
		.unwrap();
	assert_eq!(pending, 0);
	assert!(disposed);

	let result = renderer.render_component::<Static>().await;
	assert!(matches!(result, Err(RenderError::Disposed)));

	renderer.dispose().await.unwrap();
}
