//! Compaction of two bounded sample lists into one.
//!
//! Two lists whose combined length still fits the capacity are merged
//! exactly; nothing is lost. Once the union outgrows the capacity the
//! merged timeline is resampled onto `N` uniformly spaced target
//! timestamps instead, trading fidelity for bounded storage. Earlier
//! decimation output is itself decimated again on later cycles, so old
//! history degrades gradually — that is the design, not an accident.

use thiserror_no_std::Error;

use super::interpolate::interpolate;
use super::log::SampleLog;
use super::merge::MergeIter;

/// Compaction failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactionError {
    /// The merge ran dry before every target timestamp was produced.
    /// Unreachable while the list ordering invariant holds.
    #[error("merge sources exhausted before the output was filled")]
    SourcesExhausted,
}

/// Merges two sample lists into a destination of the same capacity.
///
/// The engine owns its staging list, sized once at construction, so a
/// compaction never allocates and the destination is only touched after
/// the whole output has been produced.
pub struct CompactionEngine<const N: usize> {
    staging: SampleLog<N>,
}

impl<const N: usize> CompactionEngine<N> {
    /// Decimation divides the merged duration by `N - 1`.
    const MIN_CAPACITY: () = assert!(N >= 2, "compaction needs a capacity of at least 2");

    pub const fn new() -> Self {
        let () = Self::MIN_CAPACITY;
        Self {
            staging: SampleLog::new(),
        }
    }

    /// Combines `src1` and `src2` into `dest`, by exact merge when the
    /// combined length fits and by decimation otherwise.
    pub fn compact(
        &mut self,
        src1: &SampleLog<N>,
        src2: &SampleLog<N>,
        dest: &mut SampleLog<N>,
    ) -> Result<(), CompactionError> {
        self.stage(src1, src2)?;
        dest.clone_from(&self.staging);
        Ok(())
    }

    /// Like [`Self::compact`], with `dest` doubling as the second
    /// source. This is the shape the sampling cycle uses: the scratch
    /// list holds the persisted history and receives the merge result.
    pub fn compact_in_place(
        &mut self,
        src: &SampleLog<N>,
        dest: &mut SampleLog<N>,
    ) -> Result<(), CompactionError> {
        self.stage(src, dest)?;
        dest.clone_from(&self.staging);
        Ok(())
    }

    fn stage(&mut self, src1: &SampleLog<N>, src2: &SampleLog<N>) -> Result<(), CompactionError> {
        // at a combined length of exactly N the merge is still exact
        if src1.len() + src2.len() <= N {
            self.stage_exact(src1, src2);
            Ok(())
        } else {
            self.stage_decimated(src1, src2)
        }
    }

    fn stage_exact(&mut self, src1: &SampleLog<N>, src2: &SampleLog<N>) {
        self.staging.reset();
        for sample in MergeIter::new(src1, src2) {
            // dispatch guarantees the combined length fits
            let _ = self.staging.append(*sample);
        }
    }

    fn stage_decimated(
        &mut self,
        src1: &SampleLog<N>,
        src2: &SampleLog<N>,
    ) -> Result<(), CompactionError> {
        // a combined length above N with each list bounded by N means
        // neither source is empty here
        let (Some(first1), Some(last1), Some(first2), Some(last2)) =
            (src1.first(), src1.last(), src2.first(), src2.last())
        else {
            return Err(CompactionError::SourcesExhausted);
        };

        let start = first1.uptime.min(first2.uptime);
        let end = last1.uptime.max(last2.uptime);
        let duration = end - start;

        // N - 1 intervals between N targets; the first `long_periods`
        // intervals are one minute longer so the final target lands
        // exactly on `end`
        let intervals = (N - 1) as u32;
        let base_period = duration / intervals;
        let long_periods = duration % intervals;

        let mut iter = MergeIter::new(src1, src2);
        let mut prev = iter.next().ok_or(CompactionError::SourcesExhausted)?;
        let mut current = iter.next().ok_or(CompactionError::SourcesExhausted)?;

        self.staging.reset();
        let mut target = start;
        while self.staging.len() < N {
            if target >= prev.uptime && target <= current.uptime {
                // the loop bound leaves room for every target
                let _ = self.staging.append(interpolate(prev, current, target));
                let step = self.staging.len() as u32;
                target += base_period + u32::from(step <= long_periods);
            } else {
                prev = current;
                current = iter.next().ok_or(CompactionError::SourcesExhausted)?;
            }
        }

        Ok(())
    }
}

impl<const N: usize> Default for CompactionEngine<N> {
    fn default() -> Self {
        Self::new()
    }
}
