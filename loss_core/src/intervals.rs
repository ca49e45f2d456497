//! # Analysis Intervals
//!
//! An interval is a discrete construction/time stage of the staged analysis.
//! Intervals are totally ordered by index. The sequence itself is owned by an
//! external [`IntervalAuthority`]; this crate only queries it.
//!
//! ```text
//!  0: cast segment   1: stress strands   2: release   ...   N-1: final
//!                                        ^ release interval (per segment)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::LossResult;
use crate::poi::SegmentKey;
use crate::providers::TendonScope;

/// Index of a construction/time stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalIndex(pub usize);

impl IntervalIndex {
    /// The interval immediately before this one, if any
    pub fn previous(self) -> Option<IntervalIndex> {
        self.0.checked_sub(1).map(IntervalIndex)
    }
}

impl fmt::Display for IntervalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // intervals are labeled one-based in reports
        write!(f, "Interval {}", self.0 + 1)
    }
}

/// Which intervals a loss query must cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IntervalSelector {
    /// Losses through (at least) the given interval
    Through(IntervalIndex),
    /// Losses through the last interval of the sequence
    #[default]
    AllIntervals,
}

impl IntervalSelector {
    /// Resolve to a concrete interval using the authority's interval count
    pub fn resolve(self, interval_count: usize) -> Option<IntervalIndex> {
        match self {
            IntervalSelector::Through(idx) => Some(idx),
            IntervalSelector::AllIntervals => interval_count.checked_sub(1).map(IntervalIndex),
        }
    }
}

impl From<IntervalIndex> for IntervalSelector {
    fn from(idx: IntervalIndex) -> Self {
        IntervalSelector::Through(idx)
    }
}

/// Incremental results are the change during an interval; cumulative results
/// are the total through the end of the interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultsType {
    Incremental,
    Cumulative,
}

/// A point in time within an interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalTime {
    Start,
    Middle,
    End,
}

/// The external authority over the interval sequence.
///
/// Implementations are read-only from this crate's point of view.
pub trait IntervalAuthority {
    /// Number of intervals in the sequence
    fn interval_count(&self) -> usize;

    /// Interval in which prestress is released for the segment
    fn release_interval(&self, segment: &SegmentKey) -> LossResult<IntervalIndex>;

    /// Interval in which the deck becomes composite with the girders
    fn composite_deck_interval(&self) -> IntervalIndex;

    /// Interval in which temporary strands are removed, if they ever are
    fn temporary_strand_removal_interval(&self, segment: &SegmentKey) -> Option<IntervalIndex>;

    /// Interval in which the tendons of the scope are stressed
    fn tendon_stressing_interval(&self, scope: &TendonScope) -> LossResult<IntervalIndex>;

    /// Age of the segment concrete (days after casting) at a point in an interval
    fn concrete_age_days(
        &self,
        segment: &SegmentKey,
        interval: IntervalIndex,
        time: IntervalTime,
    ) -> LossResult<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_previous_interval() {
        assert_eq!(IntervalIndex(3).previous(), Some(IntervalIndex(2)));
        assert_eq!(IntervalIndex(0).previous(), None);
    }

    #[test]
    fn test_selector_resolution() {
        assert_eq!(
            IntervalSelector::AllIntervals.resolve(6),
            Some(IntervalIndex(5))
        );
        assert_eq!(IntervalSelector::AllIntervals.resolve(0), None);
        assert_eq!(
            IntervalSelector::from(IntervalIndex(2)).resolve(6),
            Some(IntervalIndex(2))
        );
    }

    #[test]
    fn test_interval_label_is_one_based() {
        assert_eq!(IntervalIndex(0).to_string(), "Interval 1");
    }
}
