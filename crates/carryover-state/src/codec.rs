//! Byte codecs and the typed helpers built on top of the raw store.
//!
//! The store itself only sees bytes. These helpers encode on the way in and
//! decode on the way out, inheriting the store's gating and take-once rules.

use crate::error::{CodecError, Result};
use crate::state::PersistentComponentState;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A fixed-configuration serializer for persisted values.
pub trait StateCodec {
	/// Human-readable format name used in error messages.
	const FORMAT: &'static str;

	/// Serializes `value` to bytes.
	fn encode<T: Serialize + ?Sized>(value: &T) -> std::result::Result<Vec<u8>, CodecError>;

	/// Deserializes bytes produced by [`encode`](Self::encode).
	fn decode<T: DeserializeOwned>(bytes: &[u8]) -> std::result::Result<T, CodecError>;
}

/// Compact UTF-8 JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl StateCodec for JsonCodec {
	const FORMAT: &'static str = "json";

	fn encode<T: Serialize + ?Sized>(value: &T) -> std::result::Result<Vec<u8>, CodecError> {
		serde_json::to_vec(value).map_err(|e| CodecError::Encode {
			format: Self::FORMAT,
			message: e.to_string(),
		})
	}

	fn decode<T: DeserializeOwned>(bytes: &[u8]) -> std::result::Result<T, CodecError> {
		serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
			format: Self::FORMAT,
			message: e.to_string(),
		})
	}
}

/// MessagePack with named struct fields via `rmp-serde`.
#[cfg(feature = "msgpack")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePackCodec;

#[cfg(feature = "msgpack")]
impl StateCodec for MessagePackCodec {
	const FORMAT: &'static str = "msgpack";

	fn encode<T: Serialize + ?Sized>(value: &T) -> std::result::Result<Vec<u8>, CodecError> {
		rmp_serde::to_vec_named(value).map_err(|e| CodecError::Encode {
			format: Self::FORMAT,
			message: e.to_string(),
		})
	}

	fn decode<T: DeserializeOwned>(bytes: &[u8]) -> std::result::Result<T, CodecError> {
		rmp_serde::from_slice(bytes).map_err(|e| CodecError::Decode {
			format: Self::FORMAT,
			message: e.to_string(),
		})
	}
}

impl PersistentComponentState {
	/// Encodes `value` with `C` and persists it under `key`.
	///
	/// Context and duplicate-key checks run before encoding.
	pub fn persist_with<C, T>(&self, key: &str, value: &T) -> Result<()>
	where
		C: StateCodec,
		T: Serialize + ?Sized,
	{
		self.ensure_can_persist(key)?;
		let bytes = C::encode(value)?;
		self.persist(key, bytes)
	}

	/// Takes the entry under `key` and decodes it with `C`.
	///
	/// The entry is consumed even if decoding fails.
	pub fn try_take_with<C, T>(&self, key: &str) -> Result<Option<T>>
	where
		C: StateCodec,
		T: DeserializeOwned,
	{
		match self.try_take(key)? {
			Some(bytes) => Ok(Some(C::decode(&bytes)?)),
			None => Ok(None),
		}
	}

	/// Serializes `value` as JSON and persists it under `key`.
	pub fn persist_as_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
		self.persist_with::<JsonCodec, T>(key, value)
	}

	/// Takes the JSON entry under `key` and deserializes it.
	pub fn try_take_from_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
		self.try_take_with::<JsonCodec, T>(key)
	}
}
