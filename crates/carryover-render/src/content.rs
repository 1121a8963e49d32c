//! Rendered output handle.

use std::fmt;
use std::sync::Arc;

/// Materialized markup produced by one render call.
///
/// The handle is immutable and cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlContent {
	component: &'static str,
	html: Arc<str>,
	quiescent: bool,
}

impl HtmlContent {
	pub(crate) fn new(component: &'static str, html: impl Into<Arc<str>>, quiescent: bool) -> Self {
		Self {
			component,
			html: html.into(),
			quiescent,
		}
	}

	/// The markup as an owned string.
	pub fn to_html_string(&self) -> String {
		self.html.to_string()
	}

	/// Writes the markup into `out`.
	pub fn write_html_to<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
		out.write_str(&self.html)
	}

	/// Name of the root component that produced this output.
	pub fn component_name(&self) -> &'static str {
		self.component
	}

	/// `true` when the output reflects the settled component, including its
	/// asynchronous initialization. `false` means only the initial pass ran
	/// before the handle was returned.
	pub fn is_quiescent(&self) -> bool {
		self.quiescent
	}
}

impl fmt::Display for HtmlContent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.html)
	}
}

/// Escapes text for inclusion in HTML content or attribute values.
pub fn html_escape(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("plain", "plain")]
	#[case("<b>&</b>", "&lt;b&gt;&amp;&lt;/b&gt;")]
	#[case(r#"a="1" b='2'"#, "a=&quot;1&quot; b=&#x27;2&#x27;")]
	fn test_html_escape(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(html_escape(input), expected);
	}

	#[rstest]
	fn test_write_html_to_appends() {
		let content = HtmlContent::new("Greeting", "<p>hi</p>", true);
		let mut out = String::from("<body>");
		content.write_html_to(&mut out).unwrap();

		assert_eq!(out, "<body><p>hi</p>");
		assert_eq!(content.to_string(), content.to_html_string());
		assert_eq!(content.component_name(), "Greeting");
		assert!(content.is_quiescent());
	}
}
