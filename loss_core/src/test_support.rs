//! Instrumented collaborator context for engine tests

use std::cell::Cell;

use crate::config::GirderConfiguration;
use crate::criteria::LossCriteria;
use crate::errors::LossResult;
use crate::intervals::{IntervalAuthority, IntervalIndex, IntervalTime};
use crate::model::GirderModel;
use crate::poi::{PointOfInterest, SegmentKey};
use crate::providers::{
    DuctData, ForceProvider, LossInputProvider, LossInputs, SectionProvider, StressLocation,
    TendonProvider, TendonScope, TendonStation,
};
use crate::strands::{StrandMaterial, StrandType};

/// Hand-set section and force for stress checks against closed-form values
#[derive(Debug, Clone, Copy)]
pub struct FixedSection {
    pub release: IntervalIndex,
    pub force_kip: f64,
    pub area_in2: f64,
    pub eccentricity_in: f64,
    pub st_in3: f64,
    pub sb_in3: f64,
}

/// Wraps a [`GirderModel`] and counts how often loss inputs are read
#[derive(Debug)]
pub struct CountingBroker {
    pub model: GirderModel,
    pub fixed: Option<FixedSection>,
    loss_input_calls: Cell<usize>,
}

impl CountingBroker {
    pub fn new(model: GirderModel) -> Self {
        CountingBroker {
            model,
            fixed: None,
            loss_input_calls: Cell::new(0),
        }
    }

    /// Single straight-strand group with a fixed section
    pub fn fixed(section: FixedSection) -> Self {
        CountingBroker {
            fixed: Some(section),
            ..Self::new(GirderModel::default())
        }
    }

    pub fn loss_input_calls(&self) -> usize {
        self.loss_input_calls.get()
    }
}

impl IntervalAuthority for CountingBroker {
    fn interval_count(&self) -> usize {
        self.model.interval_count()
    }

    fn release_interval(&self, segment: &SegmentKey) -> LossResult<IntervalIndex> {
        match self.fixed {
            Some(f) => Ok(f.release),
            None => self.model.release_interval(segment),
        }
    }

    fn composite_deck_interval(&self) -> IntervalIndex {
        self.model.composite_deck_interval()
    }

    fn temporary_strand_removal_interval(&self, segment: &SegmentKey) -> Option<IntervalIndex> {
        self.model.temporary_strand_removal_interval(segment)
    }

    fn tendon_stressing_interval(&self, scope: &TendonScope) -> LossResult<IntervalIndex> {
        self.model.tendon_stressing_interval(scope)
    }

    fn concrete_age_days(
        &self,
        segment: &SegmentKey,
        interval: IntervalIndex,
        time: IntervalTime,
    ) -> LossResult<f64> {
        self.model.concrete_age_days(segment, interval, time)
    }
}

impl SectionProvider for CountingBroker {
    fn area(&self, interval: IntervalIndex, poi: &PointOfInterest) -> LossResult<f64> {
        match self.fixed {
            Some(f) => Ok(f.area_in2),
            None => self.model.area(interval, poi),
        }
    }

    fn section_modulus(
        &self,
        interval: IntervalIndex,
        poi: &PointOfInterest,
        location: StressLocation,
    ) -> LossResult<f64> {
        match (self.fixed, location) {
            (Some(f), StressLocation::TopGirder) => Ok(f.st_in3),
            (Some(f), StressLocation::BottomGirder) => Ok(f.sb_in3),
            (Some(_), _) => Ok(0.0),
            (None, _) => self.model.section_modulus(interval, poi, location),
        }
    }

    fn eccentricity(
        &self,
        interval: IntervalIndex,
        poi: &PointOfInterest,
        strand_type: StrandType,
    ) -> LossResult<(f64, f64)> {
        match (self.fixed, strand_type) {
            (Some(f), StrandType::Straight) => Ok((f.eccentricity_in, 1.0)),
            (Some(_), _) => Ok((0.0, 0.0)),
            (None, _) => self.model.eccentricity(interval, poi, strand_type),
        }
    }

    fn strand_count(&self, segment: &SegmentKey, strand_type: StrandType) -> LossResult<usize> {
        match (self.fixed, strand_type) {
            (Some(_), StrandType::Straight) => Ok(1),
            (Some(_), _) => Ok(0),
            (None, _) => self.model.strand_count(segment, strand_type),
        }
    }
}

impl ForceProvider for CountingBroker {
    fn pretension_force(
        &self,
        poi: &PointOfInterest,
        strand_type: StrandType,
        interval: IntervalIndex,
        time: IntervalTime,
    ) -> LossResult<f64> {
        match self.fixed {
            Some(f) if interval < f.release || strand_type != StrandType::Straight => Ok(0.0),
            Some(f) => Ok(f.force_kip),
            None => self.model.pretension_force(poi, strand_type, interval, time),
        }
    }
}

impl LossInputProvider for CountingBroker {
    fn loss_criteria(&self) -> LossCriteria {
        self.model.loss_criteria()
    }

    fn girder_configuration(&self, segment: &SegmentKey) -> LossResult<GirderConfiguration> {
        self.model.girder_configuration(segment)
    }

    fn strand_material(&self, segment: &SegmentKey) -> LossResult<StrandMaterial> {
        self.model.strand_material(segment)
    }

    fn loss_inputs(
        &self,
        poi: &PointOfInterest,
        config: &GirderConfiguration,
    ) -> LossResult<LossInputs> {
        self.loss_input_calls.set(self.loss_input_calls.get() + 1);
        self.model.loss_inputs(poi, config)
    }
}

impl TendonProvider for CountingBroker {
    fn duct_count(&self, scope: &TendonScope) -> usize {
        self.model.duct_count(scope)
    }

    fn duct(&self, scope: &TendonScope, duct: usize) -> LossResult<DuctData> {
        self.model.duct(scope, duct)
    }

    fn tendon_stations(&self, scope: &TendonScope, duct: usize) -> LossResult<Vec<TendonStation>> {
        self.model.tendon_stations(scope, duct)
    }

    fn tendon_coordinate(
        &self,
        scope: &TendonScope,
        duct: usize,
        poi: &PointOfInterest,
    ) -> LossResult<Option<f64>> {
        self.model.tendon_coordinate(scope, duct, poi)
    }
}
