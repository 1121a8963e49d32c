//! Property tests for take-once reads and write-once persistence.

use carryover_state::{PersistError, PersistentComponentState};
use proptest::prelude::*;
use std::collections::HashMap;

fn existing_state() -> impl Strategy<Value = HashMap<String, Vec<u8>>> {
	prop::collection::hash_map("[a-z]{1,8}", prop::collection::vec(any::<u8>(), 0..32), 0..16)
}

proptest! {
	#[test]
	fn first_take_returns_bytes_and_later_takes_miss(existing in existing_state()) {
		let state = PersistentComponentState::default();
		state.initialize_existing_state(existing.clone()).unwrap();

		for (key, bytes) in &existing {
			prop_assert_eq!(state.try_take(key).unwrap(), Some(bytes.clone()));
			prop_assert_eq!(state.try_take(key).unwrap(), None);
		}
	}

	#[test]
	fn uninitialized_store_never_finds_anything(key in "[a-z]{1,8}") {
		let state = PersistentComponentState::default();
		prop_assert_eq!(state.try_take(&key).unwrap(), None);
	}

	#[test]
	fn second_write_fails_and_first_survives(
		key in "[a-z]{1,8}",
		first in prop::collection::vec(any::<u8>(), 0..16),
		second in prop::collection::vec(any::<u8>(), 0..16),
	) {
		let state = PersistentComponentState::default();
		state.open_persistence_context().unwrap();
		state.persist(&key, first.clone()).unwrap();

		let duplicate = state.persist(&key, second);
		prop_assert!(matches!(duplicate, Err(PersistError::DuplicateKey(_))));

		let output = state.close_persistence_context().unwrap();
		prop_assert_eq!(output.get(&key), Some(&first));
	}
}
