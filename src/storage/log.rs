//! Fixed-capacity, append-only, time-ordered sample list.
//!
//! One list shape serves three roles: the RAM list written every cycle,
//! the scratch list used to stage compaction, and the persisted record.
//!
//! Binary format (little-endian):
//! - data: N × 6 bytes (every slot, used or not — unused slots are zero)
//! - length: 4 bytes (u32)

use thiserror_no_std::Error;

use super::sample::{Sample, Temperature};
use super::store::StoreError;

/// Appending to a list that already holds `N` samples.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("sample list is at capacity")]
pub struct BufferFull;

/// Summary of a sample list for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogStats {
    pub min: Temperature,
    pub max: Temperature,
    pub mean: Temperature,
    pub count: usize,
}

/// Bounded list of samples, non-decreasing in uptime.
///
/// The ordering invariant is upheld by the writers (append-only sampling
/// and compaction, which always emits sorted output); it is never
/// re-validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleLog<const N: usize> {
    data: heapless::Vec<Sample, N>,
}

impl<const N: usize> SampleLog<N> {
    /// Serialized size of the record: the full slot array plus the
    /// length word. The lock guarding a list lives outside the data
    /// (in the surrounding `Mutex`), so the whole struct is encoded.
    pub const STORED_SIZE: usize = N * Sample::ENCODED_SIZE + size_of::<u32>();

    pub const fn new() -> Self {
        Self {
            data: heapless::Vec::new(),
        }
    }

    /// Clears the list back to length zero. The encoded form zeroes the
    /// unused tail, so a reset list persists as an all-zero record.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Appends a sample at the end. The caller must hold the list's lock
    /// and must keep timestamps non-decreasing.
    pub fn append(&mut self, sample: Sample) -> Result<(), BufferFull> {
        self.data.push(sample).map_err(|_| BufferFull)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.data.len() == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.data
    }

    pub fn first(&self) -> Option<&Sample> {
        self.data.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.data.last()
    }

    /// Min/max/mean over the valid entries. `None` when empty.
    pub fn stats(&self) -> Option<LogStats> {
        if self.data.is_empty() {
            return None;
        }

        let mut min = i16::MAX;
        let mut max = i16::MIN;
        let mut sum = 0i32; // i32 so a full list of extremes cannot overflow

        for sample in &self.data {
            let raw = sample.temperature.raw();
            min = min.min(raw);
            max = max.max(raw);
            sum += raw as i32;
        }

        Some(LogStats {
            min: Temperature::from_raw(min),
            max: Temperature::from_raw(max),
            mean: Temperature::from_raw((sum / self.data.len() as i32) as i16),
            count: self.data.len(),
        })
    }

    /// Serializes the list into `out`, which must hold `STORED_SIZE` bytes.
    pub fn encode_into(&self, out: &mut [u8]) -> Result<usize, StoreError> {
        if out.len() < Self::STORED_SIZE {
            return Err(StoreError::ShortWrite {
                expected: Self::STORED_SIZE,
                actual: out.len(),
            });
        }

        out[..Self::STORED_SIZE].fill(0);

        let mut offset = 0;
        for sample in &self.data {
            out[offset..offset + Sample::ENCODED_SIZE].copy_from_slice(&sample.to_bytes());
            offset += Sample::ENCODED_SIZE;
        }

        let length_offset = N * Sample::ENCODED_SIZE;
        out[length_offset..length_offset + 4]
            .copy_from_slice(&(self.data.len() as u32).to_le_bytes());

        Ok(Self::STORED_SIZE)
    }

    /// Deserializes a record produced by [`Self::encode_into`].
    pub fn decode_from(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() != Self::STORED_SIZE {
            return Err(StoreError::ShortRead {
                expected: Self::STORED_SIZE,
                actual: bytes.len(),
            });
        }

        let length_offset = N * Sample::ENCODED_SIZE;
        let mut length_bytes = [0u8; 4];
        length_bytes.copy_from_slice(&bytes[length_offset..length_offset + 4]);
        let length = u32::from_le_bytes(length_bytes) as usize;
        if length > N {
            return Err(StoreError::Malformed);
        }

        let mut log = Self::new();
        for i in 0..length {
            let offset = i * Sample::ENCODED_SIZE;
            let mut sample_bytes = [0u8; Sample::ENCODED_SIZE];
            sample_bytes.copy_from_slice(&bytes[offset..offset + Sample::ENCODED_SIZE]);
            // length <= N was checked above, so every push fits
            let _ = log.data.push(Sample::from_bytes(&sample_bytes));
        }

        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(uptime: u32, raw: i16) -> Sample {
        Sample::new(Temperature::from_raw(raw), uptime)
    }

    #[test]
    fn test_stored_size() {
        assert_eq!(SampleLog::<4>::STORED_SIZE, 28);
        assert_eq!(SampleLog::<100>::STORED_SIZE, 604);
    }

    #[test]
    fn test_append_until_full() {
        let mut log = SampleLog::<2>::new();
        assert!(log.append(sample(1, 16)).is_ok());
        assert!(log.append(sample(2, 32)).is_ok());
        assert_eq!(log.append(sample(3, 48)), Err(BufferFull));
        // a rejected append leaves the length untouched
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_reset_clears_length() {
        let mut log = SampleLog::<4>::new();
        log.append(sample(1, 16)).unwrap();
        log.reset();
        assert!(log.is_empty());
        assert!(!log.is_full());
    }

    #[test]
    fn test_record_round_trip() {
        let mut log = SampleLog::<4>::new();
        log.append(sample(10, 160)).unwrap();
        log.append(sample(20, -320)).unwrap();

        let mut buf = [0u8; SampleLog::<4>::STORED_SIZE];
        assert_eq!(log.encode_into(&mut buf), Ok(SampleLog::<4>::STORED_SIZE));

        let decoded = SampleLog::<4>::decode_from(&buf).unwrap();
        assert_eq!(decoded, log);
    }

    #[test]
    fn test_unused_slots_encode_as_zero() {
        let mut log = SampleLog::<3>::new();
        log.append(sample(5, 80)).unwrap();

        let mut buf = [0xFFu8; SampleLog::<3>::STORED_SIZE];
        log.encode_into(&mut buf).unwrap();

        let tail = &buf[Sample::ENCODED_SIZE..3 * Sample::ENCODED_SIZE];
        assert!(tail.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_decode_rejects_wrong_size() {
        let buf = [0u8; 10];
        assert_eq!(
            SampleLog::<4>::decode_from(&buf),
            Err(StoreError::ShortRead {
                expected: 28,
                actual: 10
            })
        );
    }

    #[test]
    fn test_decode_rejects_oversized_length() {
        let mut buf = [0u8; SampleLog::<2>::STORED_SIZE];
        let length_offset = 2 * Sample::ENCODED_SIZE;
        buf[length_offset..length_offset + 4].copy_from_slice(&3u32.to_le_bytes());
        assert_eq!(SampleLog::<2>::decode_from(&buf), Err(StoreError::Malformed));
    }

    #[test]
    fn test_stats() {
        let mut log = SampleLog::<4>::new();
        assert_eq!(log.stats(), None);

        log.append(sample(1, 160)).unwrap();
        log.append(sample(2, 320)).unwrap();
        log.append(sample(3, 480)).unwrap();

        let stats = log.stats().unwrap();
        assert_eq!(stats.min.raw(), 160);
        assert_eq!(stats.max.raw(), 480);
        assert_eq!(stats.mean.raw(), 320);
        assert_eq!(stats.count, 3);
    }
}
