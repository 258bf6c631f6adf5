//! Key-value persistence with versioned JSON envelopes
//!
//! Every value is stored as `{"version": N, "data": ...}`. Readers reject
//! envelopes written by an unknown version instead of guessing.

mod memory;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(target_arch = "wasm32")]
mod local;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Current envelope version
pub const ENVELOPE_VERSION: u32 = 1;

/// String storage keyed by name
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    data: T,
}

/// Wrap `value` in an envelope and serialize it
pub fn encode<T: Serialize>(value: &T) -> Result<String, StoreError> {
    let envelope = Envelope {
        version: ENVELOPE_VERSION,
        data: value,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse an envelope, checking its version before touching the payload
pub fn decode<T: DeserializeOwned>(json: &str) -> Result<T, StoreError> {
    let envelope: Envelope<serde_json::Value> = serde_json::from_str(json)?;
    if envelope.version != ENVELOPE_VERSION {
        return Err(StoreError::Version {
            found: envelope.version,
            expected: ENVELOPE_VERSION,
        });
    }
    Ok(serde_json::from_value(envelope.data)?)
}

/// Read and decode `key`; `Ok(None)` if it was never written
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StoreError> {
    store.get(key)?.map(|json| decode(&json)).transpose()
}

/// Encode and write `value` under `key`
pub fn save<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<(), StoreError> {
    let json = encode(value)?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_envelope_shape() {
        let json = encode(&7u32).unwrap();
        assert_eq!(json, r#"{"version":1,"data":7}"#);
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let sample = Sample {
            name: "abc".into(),
            count: 3,
        };
        save(&mut store, "sample", &sample).unwrap();
        assert_eq!(load::<Sample>(&store, "sample").unwrap(), Some(sample));
        assert_eq!(load::<Sample>(&store, "missing").unwrap(), None);
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let err = decode::<u32>(r#"{"version":9,"data":7}"#).unwrap_err();
        assert!(matches!(err, StoreError::Version { found: 9, expected: 1 }));
    }

    #[test]
    fn test_garbage_is_a_json_error() {
        assert!(matches!(decode::<u32>("not json"), Err(StoreError::Json(_))));
        // right version, wrong payload type
        assert!(matches!(
            decode::<u32>(r#"{"version":1,"data":"seven"}"#),
            Err(StoreError::Json(_))
        ));
    }
}
