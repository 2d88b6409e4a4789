//! In-memory key-value store for host-side tests and the desktop
//! simulator. Mirrors the flash store's observable quirks: a missing key
//! reads as [`StoreError::NotFound`], and rewriting identical content
//! reports 0 bytes written.

use super::store::{KvStore, StorageKey, StoreError};
use super::TemperatureLog;

/// Largest record any key holds; the history record dominates.
const SLOT_SIZE: usize = TemperatureLog::STORED_SIZE;

const SLOT_COUNT: usize = 2;

type Slot = Option<heapless::Vec<u8, SLOT_SIZE>>;

/// RAM-backed [`KvStore`].
#[derive(Debug)]
pub struct MemoryStore {
    slots: [Slot; SLOT_COUNT],
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub const fn new() -> Self {
        Self {
            slots: [None, None],
        }
    }

    const fn index(key: StorageKey) -> usize {
        match key {
            StorageKey::Settings => 0,
            StorageKey::History => 1,
        }
    }
}

impl KvStore for MemoryStore {
    fn read(&mut self, key: StorageKey, buf: &mut [u8]) -> Result<usize, StoreError> {
        let slot = self.slots[Self::index(key)]
            .as_ref()
            .ok_or(StoreError::NotFound)?;

        let n = slot.len().min(buf.len());
        buf[..n].copy_from_slice(&slot[..n]);
        Ok(n)
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<usize, StoreError> {
        let slot = &mut self.slots[Self::index(key)];

        if slot.as_deref() == Some(data) {
            return Ok(0);
        }

        *slot = Some(heapless::Vec::from_slice(data).map_err(|_| StoreError::Io)?);
        Ok(data.len())
    }
}
