//! Validated component parameters.

use crate::error::RenderError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Immutable set of named parameters passed to a component.
///
/// Values are held as JSON so a view built on one thread can be handed to the
/// rendering thread and read back as typed values there.
///
/// # Examples
///
/// ```
/// use carryover_render::ParameterView;
///
/// let parameters = ParameterView::builder()
/// 	.add("name", "Ada")?
/// 	.add("visits", 3)?
/// 	.build();
///
/// assert_eq!(parameters.get::<String>("name")?, Some("Ada".to_string()));
/// assert_eq!(parameters.get::<u32>("visits")?, Some(3));
/// assert_eq!(parameters.get::<u32>("missing")?, None);
/// # Ok::<(), carryover_render::RenderError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterView {
	values: Arc<BTreeMap<String, Value>>,
}

impl ParameterView {
	/// A view with no parameters.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Starts building a view.
	pub fn builder() -> ParameterViewBuilder {
		ParameterViewBuilder::default()
	}

	/// Number of parameters.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns `true` when there are no parameters.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Returns `true` when a parameter named `name` is present.
	pub fn contains(&self, name: &str) -> bool {
		self.values.contains_key(name)
	}

	/// Parameter names in sorted order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.values.keys().map(String::as_str)
	}

	/// The raw JSON value of a parameter.
	pub fn get_raw(&self, name: &str) -> Option<&Value> {
		self.values.get(name)
	}

	/// Reads a parameter as `T`.
	///
	/// Returns `Ok(None)` when the parameter is absent and
	/// [`RenderError::InvalidParameter`] when it has the wrong shape.
	pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, RenderError> {
		self.values
			.get(name)
			.map(|value| {
				serde_json::from_value(value.clone()).map_err(|e| {
					RenderError::InvalidParameter(format!("parameter '{name}': {e}"))
				})
			})
			.transpose()
	}

	/// Reads a parameter that must be present.
	pub fn get_required<T: DeserializeOwned>(&self, name: &str) -> Result<T, RenderError> {
		self.get(name)?.ok_or_else(|| {
			RenderError::InvalidParameter(format!("missing required parameter '{name}'"))
		})
	}
}

/// Builder for [`ParameterView`].
#[derive(Debug, Default)]
pub struct ParameterViewBuilder {
	values: BTreeMap<String, Value>,
}

impl ParameterViewBuilder {
	/// Adds a parameter. Names must be non-empty and unique.
	pub fn add(
		mut self,
		name: impl Into<String>,
		value: impl Serialize,
	) -> Result<Self, RenderError> {
		let name = name.into();
		if name.is_empty() {
			return Err(RenderError::InvalidParameter(
				"parameter name must not be empty".to_string(),
			));
		}
		if self.values.contains_key(&name) {
			return Err(RenderError::InvalidParameter(format!(
				"parameter '{name}' was supplied more than once"
			)));
		}
		let value = serde_json::to_value(value)
			.map_err(|e| RenderError::InvalidParameter(format!("parameter '{name}': {e}")))?;
		self.values.insert(name, value);
		Ok(self)
	}

	/// Finishes the view.
	pub fn build(self) -> ParameterView {
		ParameterView {
			values: Arc::new(self.values),
		}
	}
}
