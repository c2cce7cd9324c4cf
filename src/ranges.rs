//! Range compression: collapse a sorted set of legal values into the minimal
//! sequence of contiguous closed intervals.
//!
//! This is the heart of discrete-enum validation. A type declaring
//! `{0, 1, 2, 5}` needs two checks, not four: `0..=2` and `== 5`. The
//! compressor is a single left-to-right scan - a run-length encoding over a
//! sorted key space - and is correct only because the value extractor
//! guarantees ascending, distinct input. An unsorted or duplicated input
//! would produce a non-maximal interval set, so that upstream invariant is
//! load-bearing and debug-asserted here.

use smallvec::SmallVec;

/// A closed interval `[min, max]` of contiguous legal values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueRun {
    pub min: i64,
    pub max: i64,
}

impl ValueRun {
    /// A run covering a single value. The emitter renders these as equality
    /// checks rather than range checks.
    #[inline]
    pub fn is_single(&self) -> bool {
        self.min == self.max
    }

    /// Number of values the run covers.
    #[inline]
    pub fn count(&self) -> u64 {
        self.max.abs_diff(self.min) + 1
    }
}

/// Most real enums compress to a handful of runs; keep them inline.
pub type ValueRuns = SmallVec<[ValueRun; 4]>;

/// Compress ascending distinct values into maximal contiguous runs.
///
/// The result partitions the input exactly: intervals are non-overlapping,
/// non-adjacent (no two could be merged), and emitted in ascending order of
/// `min`. Empty input is rejected upstream by the value extractor and never
/// reaches this function; compressing an empty slice returns no runs.
pub fn compress_runs(values: &[i64]) -> ValueRuns {
    debug_assert!(
        values.windows(2).all(|w| w[0] < w[1]),
        "compress_runs requires ascending distinct input"
    );

    let mut runs = ValueRuns::new();
    let Some((&first, rest)) = values.split_first() else {
        return runs;
    };

    let mut current = ValueRun {
        min: first,
        max: first,
    };
    for &value in rest {
        if current.max != i64::MAX && value == current.max + 1 {
            current.max = value;
        } else {
            runs.push(current);
            current = ValueRun {
                min: value,
                max: value,
            };
        }
    }
    runs.push(current);
    runs
}
