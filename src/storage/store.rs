//! Persistent key-value store interface and the history record on top of it.
//!
//! The store itself (flash layout, wear leveling, CRC) is platform
//! territory; this module only fixes the contract the sampling subsystem
//! relies on and the load/store semantics of the temperature record.

use log::error;
use thiserror_no_std::Error;

use super::TemperatureLog;

/// Keys of the records kept in the persistent store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    Settings,
    History,
}

impl StorageKey {
    /// Numeric id of the record, stable across firmware versions.
    pub const fn id(self) -> u16 {
        match self {
            Self::Settings => 1,
            Self::History => 2,
        }
    }
}

/// Failures of the persistent store and of record (de)serialization.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    #[error("key not present in the store")]
    NotFound,
    #[error("short read: expected {expected} bytes, read {actual}")]
    ShortRead { expected: usize, actual: usize },
    #[error("short write: expected {expected} bytes, wrote {actual}")]
    ShortWrite { expected: usize, actual: usize },
    #[error("stored record is malformed")]
    Malformed,
    #[error("backing store operation failed")]
    Io,
}

/// Byte-addressed persistent key-value store.
///
/// Calls are synchronous and blocking from the caller's point of view; a
/// slow store stretches the sampling cycle but never corrupts the RAM
/// list. A write whose content matches the stored record may report 0
/// bytes written — that is a success, not a failure.
pub trait KvStore {
    /// Reads a record into `buf`, returning the number of bytes read.
    /// A missing key is [`StoreError::NotFound`].
    fn read(&mut self, key: StorageKey, buf: &mut [u8]) -> Result<usize, StoreError>;

    /// Writes a record, returning the number of bytes written.
    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<usize, StoreError>;
}

/// Reads the temperature history record into `list`.
///
/// A missing key is not an error: the list is reset and the empty record
/// is written immediately, so later reads never see a missing key. The
/// caller must hold the list's lock.
pub fn load_history<K: KvStore>(store: &mut K, list: &mut TemperatureLog) -> Result<(), StoreError> {
    let mut buf = [0u8; TemperatureLog::STORED_SIZE];
    match store.read(StorageKey::History, &mut buf) {
        Ok(n) if n == TemperatureLog::STORED_SIZE => {
            *list = TemperatureLog::decode_from(&buf)?;
            Ok(())
        }
        Ok(n) => {
            error!(
                "failed to load temperature history: expected {} bytes, read {}",
                TemperatureLog::STORED_SIZE,
                n
            );
            Err(StoreError::ShortRead {
                expected: TemperatureLog::STORED_SIZE,
                actual: n,
            })
        }
        Err(StoreError::NotFound) => {
            list.reset();
            list.encode_into(&mut buf)?;
            store.write(StorageKey::History, &buf)?;
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Writes the temperature history record. The caller must hold the
/// list's lock.
pub fn store_history<K: KvStore>(store: &mut K, list: &TemperatureLog) -> Result<(), StoreError> {
    let mut buf = [0u8; TemperatureLog::STORED_SIZE];
    list.encode_into(&mut buf)?;

    let written = store.write(StorageKey::History, &buf)?;
    if written == TemperatureLog::STORED_SIZE || written == 0 {
        Ok(())
    } else {
        error!(
            "failed to write temperature history: expected {} or 0 bytes, wrote {}",
            TemperatureLog::STORED_SIZE,
            written
        );
        Err(StoreError::ShortWrite {
            expected: TemperatureLog::STORED_SIZE,
            actual: written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use crate::storage::sample::{Sample, Temperature};

    fn sample(uptime: u32, raw: i16) -> Sample {
        Sample::new(Temperature::from_raw(raw), uptime)
    }

    /// Store whose reads succeed but come up short, and whose writes
    /// land partially.
    struct TruncatingStore {
        read_len: usize,
        write_len: usize,
    }

    impl KvStore for TruncatingStore {
        fn read(&mut self, _key: StorageKey, _buf: &mut [u8]) -> Result<usize, StoreError> {
            Ok(self.read_len)
        }

        fn write(&mut self, _key: StorageKey, _data: &[u8]) -> Result<usize, StoreError> {
            Ok(self.write_len)
        }
    }

    #[test]
    fn test_key_ids() {
        assert_eq!(StorageKey::Settings.id(), 1);
        assert_eq!(StorageKey::History.id(), 2);
    }

    #[test]
    fn test_load_creates_missing_record() {
        let mut store = MemoryStore::new();
        let mut list = TemperatureLog::new();

        assert_eq!(load_history(&mut store, &mut list), Ok(()));
        assert!(list.is_empty());

        // the empty record now exists, so a second load is a plain read
        let mut buf = [0u8; TemperatureLog::STORED_SIZE];
        assert_eq!(
            store.read(StorageKey::History, &mut buf),
            Ok(TemperatureLog::STORED_SIZE)
        );
    }

    #[test]
    fn test_store_then_load_round_trip() {
        let mut store = MemoryStore::new();
        let mut list = TemperatureLog::new();
        list.append(sample(10, 160)).unwrap();
        list.append(sample(20, 320)).unwrap();

        assert_eq!(store_history(&mut store, &list), Ok(()));

        let mut loaded = TemperatureLog::new();
        assert_eq!(load_history(&mut store, &mut loaded), Ok(()));
        assert_eq!(loaded, list);
    }

    #[test]
    fn test_rewriting_identical_record_succeeds() {
        let mut store = MemoryStore::new();
        let mut list = TemperatureLog::new();
        list.append(sample(10, 160)).unwrap();

        assert_eq!(store_history(&mut store, &list), Ok(()));
        // the second write is content-identical and reports 0 bytes
        assert_eq!(store_history(&mut store, &list), Ok(()));
    }

    #[test]
    fn test_short_read_is_an_error() {
        let mut store = TruncatingStore {
            read_len: 3,
            write_len: 0,
        };
        let mut list = TemperatureLog::new();

        assert_eq!(
            load_history(&mut store, &mut list),
            Err(StoreError::ShortRead {
                expected: TemperatureLog::STORED_SIZE,
                actual: 3
            })
        );
    }

    #[test]
    fn test_short_write_is_an_error() {
        let mut store = TruncatingStore {
            read_len: 0,
            write_len: 7,
        };
        let list = TemperatureLog::new();

        assert_eq!(
            store_history(&mut store, &list),
            Err(StoreError::ShortWrite {
                expected: TemperatureLog::STORED_SIZE,
                actual: 7
            })
        );
    }
}
