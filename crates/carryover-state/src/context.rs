//! The persistence context: the window during which outgoing state may be written.

use crate::error::{PersistError, Result};
use std::collections::HashMap;

/// Serialized state keyed by caller-supplied keys.
///
/// This is both the shape restored at session start and the output of a
/// persistence run.
pub type PersistedState = HashMap<String, Vec<u8>>;

/// Outgoing state accumulated during one persistence run.
///
/// A context exists only while a run is open. Each key may be written once.
#[derive(Debug, Default)]
pub struct PersistenceContext {
	state: PersistedState,
}

impl PersistenceContext {
	pub(crate) fn open() -> Self {
		Self::default()
	}

	pub(crate) fn persist(&mut self, key: &str, bytes: Vec<u8>) -> Result<()> {
		if self.state.contains_key(key) {
			return Err(PersistError::DuplicateKey(key.to_string()));
		}
		self.state.insert(key.to_string(), bytes);
		Ok(())
	}

	pub(crate) fn contains_key(&self, key: &str) -> bool {
		self.state.contains_key(key)
	}

	/// Number of entries written so far.
	pub fn len(&self) -> usize {
		self.state.len()
	}

	/// Returns `true` if nothing has been written yet.
	pub fn is_empty(&self) -> bool {
		self.state.is_empty()
	}

	pub(crate) fn close(self) -> PersistedState {
		self.state
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_second_write_is_rejected_and_first_kept() {
		let mut context = PersistenceContext::open();
		context.persist("weather", vec![1, 2, 3]).unwrap();

		let err = context.persist("weather", vec![9]).unwrap_err();
		assert!(matches!(err, PersistError::DuplicateKey(ref key) if key == "weather"));

		let state = context.close();
		assert_eq!(state.get("weather"), Some(&vec![1, 2, 3]));
	}

	#[rstest]
	fn test_len_tracks_writes() {
		let mut context = PersistenceContext::open();
		assert!(context.is_empty());
		context.persist("a", vec![]).unwrap();
		context.persist("b", vec![0]).unwrap();
		assert_eq!(context.len(), 2);
		assert!(context.contains_key("a"));
	}
}
