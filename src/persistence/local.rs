//! Browser LocalStorage

use super::KeyValueStore;
use crate::error::StoreError;

/// LocalStorage-backed store, keys are prefixed to share the origin safely
#[derive(Debug, Clone)]
pub struct LocalStore {
    prefix: String,
}

impl LocalStore {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    fn storage(&self) -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StoreError::Unavailable("LocalStorage not accessible".into()))
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key)
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage()?
            .get_item(&self.full_key(key))
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?
            .set_item(&self.full_key(key), value)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }
}
