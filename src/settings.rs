//! Persisted device settings.
//!
//! Settings live in the same key-value store as the temperature history,
//! under their own key, postcard-encoded. Managing the network itself is
//! someone else's job; this module only keeps the record.

use serde::{Deserialize, Serialize};

use crate::storage::{KvStore, StorageKey, StoreError};

pub const WIFI_SSID_MAX_LENGTH: usize = 32;
pub const WIFI_PASSWORD_MAX_LENGTH: usize = 64;

/// Upper bound on the postcard encoding: each string costs its length
/// plus a one-byte varint prefix at these capacities.
const SETTINGS_BUF_SIZE: usize = 128;

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Settings {
    pub wifi_ssid: heapless::String<WIFI_SSID_MAX_LENGTH>,
    pub wifi_password: heapless::String<WIFI_PASSWORD_MAX_LENGTH>,
}

/// Reads the settings record. A missing key yields defaults, which are
/// written back immediately so the key exists from then on.
pub fn load_settings<K: KvStore>(store: &mut K) -> Result<Settings, StoreError> {
    let mut buf = [0u8; SETTINGS_BUF_SIZE];
    match store.read(StorageKey::Settings, &mut buf) {
        Ok(n) => postcard::from_bytes(&buf[..n]).map_err(|_| StoreError::Malformed),
        Err(StoreError::NotFound) => {
            let settings = Settings::default();
            store_settings(store, &settings)?;
            Ok(settings)
        }
        Err(e) => Err(e),
    }
}

/// Writes the settings record.
pub fn store_settings<K: KvStore>(store: &mut K, settings: &Settings) -> Result<(), StoreError> {
    let mut buf = [0u8; SETTINGS_BUF_SIZE];
    let encoded = postcard::to_slice(settings, &mut buf).map_err(|_| StoreError::Malformed)?;

    let written = store.write(StorageKey::Settings, encoded)?;
    if written == encoded.len() || written == 0 {
        Ok(())
    } else {
        Err(StoreError::ShortWrite {
            expected: encoded.len(),
            actual: written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use core::str::FromStr;

    #[test]
    fn test_load_creates_default_record() {
        let mut store = MemoryStore::new();

        let settings = load_settings(&mut store).unwrap();
        assert_eq!(settings, Settings::default());

        // the record now exists in the store
        let mut buf = [0u8; SETTINGS_BUF_SIZE];
        assert!(store.read(StorageKey::Settings, &mut buf).is_ok());
    }

    #[test]
    fn test_round_trip() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            wifi_ssid: heapless::String::from_str("attic-ap").unwrap(),
            wifi_password: heapless::String::from_str("hunter2hunter2").unwrap(),
        };

        store_settings(&mut store, &settings).unwrap();
        assert_eq!(load_settings(&mut store).unwrap(), settings);
    }

    #[test]
    fn test_garbage_record_is_malformed() {
        let mut store = MemoryStore::new();
        store.write(StorageKey::Settings, &[0xFF; 16]).unwrap();

        assert_eq!(load_settings(&mut store), Err(StoreError::Malformed));
    }
}
