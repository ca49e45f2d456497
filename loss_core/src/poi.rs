//! # Points of Interest
//!
//! Structural locations along a girder. A [`PointOfInterest`] belongs to
//! exactly one segment and carries a stable [`PoiId`]; the id is the cache
//! key for computed losses, so two values built at different times for the
//! same location share cached results as long as they share the id.
//!
//! ## Example
//!
//! ```rust
//! use loss_core::poi::{PointOfInterest, SegmentKey};
//!
//! let segment = SegmentKey::new(0, 0, 0);
//! let midspan = PointOfInterest::new(segment, 60.0);
//!
//! // Rebuilding the same location keeps its identity
//! let again = PointOfInterest::with_id(midspan.id(), segment, 60.0);
//! assert_eq!(midspan, again);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a girder by its group and position within the group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GirderKey {
    pub group: usize,
    pub girder: usize,
}

impl GirderKey {
    pub fn new(group: usize, girder: usize) -> Self {
        GirderKey { group, girder }
    }
}

impl fmt::Display for GirderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group {} Girder {}", self.group + 1, self.girder + 1)
    }
}

/// Identifies one precast segment of a girder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentKey {
    pub group: usize,
    pub girder: usize,
    pub segment: usize,
}

impl SegmentKey {
    pub fn new(group: usize, girder: usize, segment: usize) -> Self {
        SegmentKey {
            group,
            girder,
            segment,
        }
    }

    /// The girder this segment belongs to
    pub fn girder_key(&self) -> GirderKey {
        GirderKey::new(self.group, self.girder)
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Group {} Girder {} Segment {}",
            self.group + 1,
            self.girder + 1,
            self.segment + 1
        )
    }
}

/// Opaque, stable identity of a structural location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoiId(pub Uuid);

impl PoiId {
    /// Allocate a fresh identity
    pub fn new() -> Self {
        PoiId(Uuid::new_v4())
    }
}

impl Default for PoiId {
    fn default() -> Self {
        PoiId::new()
    }
}

impl fmt::Display for PoiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A location along a segment used as the unit of loss analysis.
///
/// Equality and hashing use the identity only. Ordering is by segment, then
/// distance from the start of the segment, then identity, so sorted lists
/// read left to right along the bridge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointOfInterest {
    id: PoiId,
    segment: SegmentKey,
    dist_from_start_ft: f64,
}

impl PointOfInterest {
    /// Create a POI with a freshly allocated identity
    pub fn new(segment: SegmentKey, dist_from_start_ft: f64) -> Self {
        PointOfInterest {
            id: PoiId::new(),
            segment,
            dist_from_start_ft,
        }
    }

    /// Create a POI for a location whose identity is already known
    pub fn with_id(id: PoiId, segment: SegmentKey, dist_from_start_ft: f64) -> Self {
        PointOfInterest {
            id,
            segment,
            dist_from_start_ft,
        }
    }

    pub fn id(&self) -> PoiId {
        self.id
    }

    pub fn segment(&self) -> SegmentKey {
        self.segment
    }

    /// Distance from the start of the segment (ft)
    pub fn dist_from_start_ft(&self) -> f64 {
        self.dist_from_start_ft
    }
}

impl PartialEq for PointOfInterest {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PointOfInterest {}

impl Hash for PointOfInterest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for PointOfInterest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PointOfInterest {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.id == other.id {
            return Ordering::Equal;
        }
        self.segment
            .cmp(&other.segment)
            .then_with(|| self.dist_from_start_ft.total_cmp(&other.dist_from_start_ft))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Display for PointOfInterest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {:.2} ft", self.segment, self.dist_from_start_ft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_is_by_identity() {
        let seg = SegmentKey::new(0, 1, 0);
        let a = PointOfInterest::new(seg, 10.0);
        let b = PointOfInterest::new(seg, 10.0);
        assert_ne!(a, b, "same location, different identity");

        let a_again = PointOfInterest::with_id(a.id(), seg, 10.0);
        assert_eq!(a, a_again);

        let set: HashSet<_> = [a, a_again, b].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_ordering_follows_location() {
        let seg0 = SegmentKey::new(0, 0, 0);
        let seg1 = SegmentKey::new(0, 0, 1);
        let mut pois = vec![
            PointOfInterest::new(seg1, 0.0),
            PointOfInterest::new(seg0, 50.0),
            PointOfInterest::new(seg0, 5.0),
        ];
        pois.sort();
        assert_eq!(pois[0].dist_from_start_ft(), 5.0);
        assert_eq!(pois[1].dist_from_start_ft(), 50.0);
        assert_eq!(pois[2].segment(), seg1);
    }

    #[test]
    fn test_segment_girder_key() {
        let seg = SegmentKey::new(2, 3, 1);
        assert_eq!(seg.girder_key(), GirderKey::new(2, 3));
        assert_eq!(seg.to_string(), "Group 3 Girder 4 Segment 2");
    }
}
