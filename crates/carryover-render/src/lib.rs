//! # Carryover Render
//!
//! Non-interactive component rendering on a single execution affinity.
//!
//! Component instances and render engines are `!Send` and must only be
//! touched by one owner. This crate gives that owner a dedicated thread
//! ([`Dispatcher`]) and exposes a gateway ([`HtmlRenderer`]) that can be
//! called from anywhere: each call is marshaled onto the dispatcher, rendered
//! by the engine and returned as an immutable [`HtmlContent`] handle.
//!
//! ## Quiescence
//!
//! A component may initialize asynchronously
//! ([`Component::on_initialized_async`]). Rendering with `await_quiescence`
//! returns only once that work has finished; without it, the markup of the
//! initial pass is returned while the rest keeps running on the dispatcher.
//!
//! ## Modules
//!
//! - [`dispatcher`]: dedicated thread with a local task set
//! - [`component`]: component trait, component types and activation
//! - [`engine`]: render engine trait and the default HTML engine
//! - [`renderer`]: the rendering gateway
//! - [`services`]: type-keyed service locator

pub mod component;
pub mod content;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod parameters;
pub mod renderer;
pub mod services;
pub mod settings;

pub use component::{
	Component, ComponentActivator, ComponentContext, ComponentType, DefaultComponentActivator,
};
pub use content::{HtmlContent, html_escape};
pub use dispatcher::Dispatcher;
pub use engine::{HtmlRendererCore, RenderEngine};
pub use error::{RenderError, Result};
pub use parameters::{ParameterView, ParameterViewBuilder};
pub use renderer::HtmlRenderer;
pub use services::ServiceProvider;
pub use settings::RendererSettings;
