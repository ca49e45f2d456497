//! # Collaborator Interfaces
//!
//! The loss engine computes nothing about geometry, section properties, or
//! the construction sequence. It reads those through the traits in this
//! module (and [`IntervalAuthority`]) and never mutates the implementor.
//!
//! A [`Broker`] is any type implementing every collaborator trait; the
//! blanket impl means a project model only has to implement the parts.
//!
//! Units: ksi, kip, in, in², in³, in⁴, ft for distances along members.

use serde::{Deserialize, Serialize};

use crate::config::GirderConfiguration;
use crate::criteria::LossCriteria;
use crate::errors::{LossError, LossResult};
use crate::intervals::{IntervalAuthority, IntervalIndex, IntervalTime};
use crate::poi::{GirderKey, PointOfInterest, SegmentKey};
use crate::strands::{StrandMaterial, StrandType, TemporaryStrandUsage};

/// Fiber at which a stress is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StressLocation {
    TopGirder,
    BottomGirder,
    TopDeck,
    BottomDeck,
}

impl StressLocation {
    pub fn is_deck(&self) -> bool {
        matches!(self, StressLocation::TopDeck | StressLocation::BottomDeck)
    }
}

/// Owner of a set of post-tensioning ducts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TendonScope {
    /// Tendons running through every segment of a spliced girder
    Girder(GirderKey),
    /// Tendons local to one segment
    Segment(SegmentKey),
}

impl std::fmt::Display for TendonScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TendonScope::Girder(key) => write!(f, "{} girder tendons", key),
            TendonScope::Segment(key) => write!(f, "{} segment tendons", key),
        }
    }
}

/// End(s) of a tendon from which it is stressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum JackingEnd {
    #[default]
    Left,
    Right,
    Both,
}

impl JackingEnd {
    pub fn jacks_left(&self) -> bool {
        matches!(self, JackingEnd::Left | JackingEnd::Both)
    }

    pub fn jacks_right(&self) -> bool {
        matches!(self, JackingEnd::Right | JackingEnd::Both)
    }
}

/// One end of a tendon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TendonEnd {
    Left,
    Right,
}

/// A post-tensioning duct and its tendon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuctData {
    pub strand_count: usize,
    pub strand: StrandMaterial,
    /// Total jacking force (kip)
    pub jacking_force_kip: f64,
    pub jacking_end: JackingEnd,
}

impl DuctData {
    pub fn aps_in2(&self) -> f64 {
        self.strand.total_area_in2(self.strand_count)
    }

    /// Jacking stress fpj, zero for an empty duct
    pub fn fpj_ksi(&self) -> f64 {
        let aps = self.aps_in2();
        if aps > 0.0 {
            self.jacking_force_kip / aps
        } else {
            0.0
        }
    }
}

/// A station along a tendon profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TendonStation {
    /// Distance from the left end of the tendon (ft)
    pub x_ft: f64,
    /// Cumulative angular change from the left end (radians)
    pub alpha_rad: f64,
}

/// Cast-in-place deck properties for the after-deck phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeckInputs {
    /// Transformed area of deck acting with the girder
    pub area_in2: f64,
    /// Deck centroid above the composite centroid
    pub eccentricity_in: f64,
    pub fc_ksi: f64,
    pub ec_ksi: f64,
    pub vs_ratio_in: f64,
}

/// Everything the refined methods need at one POI under one configuration.
///
/// Eccentricities are positive below the centroid. Moments are positive
/// sagging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossInputs {
    pub strand: StrandMaterial,
    pub aps_permanent_in2: f64,
    pub aps_temporary_in2: f64,
    pub fpj_permanent_ksi: f64,
    pub fpj_temporary_ksi: f64,
    pub temporary_usage: TemporaryStrandUsage,
    /// Permanent strand eccentricity on the girder section
    pub e_permanent_in: f64,
    pub e_temporary_in: f64,
    /// Permanent strand eccentricity on the composite section
    pub e_permanent_composite_in: f64,
    pub ag_in2: f64,
    pub ig_in4: f64,
    pub ac_in2: f64,
    pub ic_in4: f64,
    /// Girder self-weight moment at release
    pub girder_moment_kip_in: f64,
    /// Deck, haunch and diaphragms carried by the girder alone
    pub noncomposite_dead_moment_kip_in: f64,
    /// Barriers and overlay carried by the composite section
    pub composite_dead_moment_kip_in: f64,
    /// Volume to surface ratio of the girder
    pub vs_ratio_in: f64,
    pub relative_humidity_pct: f64,
    pub fci_ksi: f64,
    pub fc_ksi: f64,
    pub eci_ksi: f64,
    pub ec_ksi: f64,
    pub deck: Option<DeckInputs>,
}

impl LossInputs {
    /// Reject inputs the loss formulas cannot evaluate
    pub fn validate(&self) -> LossResult<()> {
        let positive = [
            ("ag_in2", self.ag_in2),
            ("ig_in4", self.ig_in4),
            ("ac_in2", self.ac_in2),
            ("ic_in4", self.ic_in4),
            ("eci_ksi", self.eci_ksi),
            ("ec_ksi", self.ec_ksi),
            ("fci_ksi", self.fci_ksi),
            ("vs_ratio_in", self.vs_ratio_in),
        ];
        for (field, value) in positive {
            if value <= 0.0 || !value.is_finite() {
                return Err(LossError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }
        if !(0.0..=100.0).contains(&self.relative_humidity_pct) {
            return Err(LossError::invalid_input(
                "relative_humidity_pct",
                self.relative_humidity_pct.to_string(),
                "Relative humidity must be between 0 and 100",
            ));
        }
        Ok(())
    }

    /// Area of the strands that shorten the girder at transfer
    pub fn aps_at_transfer_in2(&self) -> f64 {
        match self.temporary_usage {
            TemporaryStrandUsage::Pretensioned => self.aps_permanent_in2 + self.aps_temporary_in2,
            TemporaryStrandUsage::PostTensioned => self.aps_permanent_in2,
        }
    }

    /// Eccentricity of the strands acting at transfer
    pub fn e_at_transfer_in(&self) -> f64 {
        let aps = self.aps_at_transfer_in2();
        if aps <= 0.0 {
            return self.e_permanent_in;
        }
        let temp = self.aps_at_transfer_in2() - self.aps_permanent_in2;
        (self.aps_permanent_in2 * self.e_permanent_in + temp * self.e_temporary_in) / aps
    }

    /// Area-weighted jacking stress of the strands acting at transfer
    pub fn fpj_at_transfer_ksi(&self) -> f64 {
        let aps = self.aps_at_transfer_in2();
        if aps <= 0.0 {
            return 0.0;
        }
        let temp = aps - self.aps_permanent_in2;
        (self.aps_permanent_in2 * self.fpj_permanent_ksi + temp * self.fpj_temporary_ksi) / aps
    }
}

/// Section properties and strand geometry
pub trait SectionProvider {
    /// Cross-sectional area acting in the interval
    fn area(&self, interval: IntervalIndex, poi: &PointOfInterest) -> LossResult<f64>;

    /// Signed section modulus. Zero where the fiber does not exist yet.
    fn section_modulus(
        &self,
        interval: IntervalIndex,
        poi: &PointOfInterest,
        location: StressLocation,
    ) -> LossResult<f64>;

    /// Eccentricity and effective strand count of a strand group
    fn eccentricity(
        &self,
        interval: IntervalIndex,
        poi: &PointOfInterest,
        strand_type: StrandType,
    ) -> LossResult<(f64, f64)>;

    fn strand_count(&self, segment: &SegmentKey, strand_type: StrandType) -> LossResult<usize>;
}

/// Force in pretensioned strands
pub trait ForceProvider {
    fn pretension_force(
        &self,
        poi: &PointOfInterest,
        strand_type: StrandType,
        interval: IntervalIndex,
        time: IntervalTime,
    ) -> LossResult<f64>;
}

/// Project data the refined methods consume
pub trait LossInputProvider {
    fn loss_criteria(&self) -> LossCriteria;

    /// The persisted configuration of a segment
    fn girder_configuration(&self, segment: &SegmentKey) -> LossResult<GirderConfiguration>;

    /// Pretensioning strand of a segment
    fn strand_material(&self, segment: &SegmentKey) -> LossResult<StrandMaterial>;

    fn loss_inputs(
        &self,
        poi: &PointOfInterest,
        config: &GirderConfiguration,
    ) -> LossResult<LossInputs>;
}

/// Post-tensioning ducts and tendon profiles
pub trait TendonProvider {
    /// Number of ducts in the scope (zero when there is no post-tensioning)
    fn duct_count(&self, scope: &TendonScope) -> usize;

    fn duct(&self, scope: &TendonScope, duct: usize) -> LossResult<DuctData>;

    /// Profile stations ordered left to right, first at x = 0
    fn tendon_stations(&self, scope: &TendonScope, duct: usize) -> LossResult<Vec<TendonStation>>;

    /// Distance along the tendon to the POI, `None` when the tendon does not reach it
    fn tendon_coordinate(
        &self,
        scope: &TendonScope,
        duct: usize,
        poi: &PointOfInterest,
    ) -> LossResult<Option<f64>>;
}

/// The full collaborator context a loss engineer works against
pub trait Broker:
    IntervalAuthority + SectionProvider + ForceProvider + LossInputProvider + TendonProvider
{
}

impl<T> Broker for T where
    T: IntervalAuthority + SectionProvider + ForceProvider + LossInputProvider + TendonProvider + ?Sized
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_duct_jacking_stress() {
        let duct = DuctData {
            strand_count: 10,
            strand: StrandMaterial::default(),
            jacking_force_kip: 10.0 * 0.153 * 216.0,
            jacking_end: JackingEnd::Both,
        };
        assert_relative_eq!(duct.fpj_ksi(), 216.0, epsilon = 1e-9);
        assert!(duct.jacking_end.jacks_left() && duct.jacking_end.jacks_right());
    }

    #[test]
    fn test_deck_locations() {
        assert!(StressLocation::TopDeck.is_deck());
        assert!(!StressLocation::BottomGirder.is_deck());
    }
}
