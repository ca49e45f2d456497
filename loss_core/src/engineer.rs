//! # Loss Engineer
//!
//! The facade over prestress loss computation for one beam type. It selects
//! the loss method once at construction, owns the persisted and design
//! caches, and answers every loss query.
//!
//! The collaborator context is held weakly. Queries made after the context
//! has been dropped fail with [`LossError::BrokerUnavailable`].
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use loss_core::engineer::LossEngineer;
//! use loss_core::intervals::IntervalSelector;
//! use loss_core::model::GirderModel;
//! use loss_core::strategy::BeamType;
//!
//! let model = Rc::new(GirderModel::default());
//! let mut engineer = LossEngineer::new(BeamType::IBeam, Rc::downgrade(&model)).unwrap();
//!
//! let midspan = model.pois()[5];
//! let losses = engineer.get_losses(&midspan, IntervalSelector::AllIntervals).unwrap();
//! assert!(losses.total_losses() > 0.0);
//!
//! // the second request is served from the cache
//! engineer.get_losses(&midspan, IntervalSelector::AllIntervals).unwrap();
//! assert_eq!(engineer.cache_stats().persisted.computations, 1);
//! ```

use std::rc::{Rc, Weak};

use tracing::{debug, info};

use crate::cache::{CacheStats, DesignLossCache, PersistedLossCache};
use crate::config::GirderConfiguration;
use crate::errors::{LossError, LossResult};
use crate::intervals::{IntervalIndex, IntervalSelector, ResultsType};
use crate::losses::{AnchorSetDetails, AverageTendonLoss, LossDetails};
use crate::poi::{GirderKey, PointOfInterest, SegmentKey};
use crate::pretension;
use crate::providers::{Broker, StressLocation, TendonEnd, TendonScope};
use crate::report::LossReporter;
use crate::strands::StrandType;
use crate::strategy::{BeamType, LossStrategy, StrategyKind};

pub struct LossEngineer<B: Broker + ?Sized> {
    broker: Weak<B>,
    strategy: LossStrategy,
    persisted: PersistedLossCache,
    design: DesignLossCache,
}

impl<B: Broker + ?Sized> LossEngineer<B> {
    /// Select the loss method for `beam_type` from the broker's loss criteria
    pub fn new(beam_type: BeamType, broker: Weak<B>) -> LossResult<Self> {
        let context = broker.upgrade().ok_or(LossError::BrokerUnavailable)?;
        let criteria = context.loss_criteria();
        let strategy = LossStrategy::new(beam_type, criteria)?;
        info!(
            beam_type = beam_type.display_name(),
            method = strategy.kind().display_name(),
            edition = strategy.criteria().spec_edition.display_name(),
            "loss method selected"
        );
        Ok(LossEngineer {
            broker,
            strategy,
            persisted: PersistedLossCache::default(),
            design: DesignLossCache::default(),
        })
    }

    fn broker(&self) -> LossResult<Rc<B>> {
        self.broker.upgrade().ok_or(LossError::BrokerUnavailable)
    }

    pub fn method(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn beam_type(&self) -> BeamType {
        self.strategy.beam_type()
    }

    fn resolve(broker: &B, selector: IntervalSelector) -> LossResult<IntervalIndex> {
        selector.resolve(broker.interval_count()).ok_or_else(|| {
            LossError::invalid_input("interval", "all intervals", "no intervals are defined")
        })
    }

    /// Losses under the project configuration, computed through at least the
    /// selected interval and cached per POI identity and interval
    pub fn get_losses(
        &mut self,
        poi: &PointOfInterest,
        selector: IntervalSelector,
    ) -> LossResult<Rc<LossDetails>> {
        let broker = self.broker()?;
        let interval = Self::resolve(&broker, selector)?;
        if let Some(hit) = self.persisted.get(poi.id(), interval) {
            debug!(poi = %poi, interval = interval.0, "persisted loss cache hit");
            return Ok(hit);
        }
        debug!(poi = %poi, interval = interval.0, "persisted loss cache miss");
        let config = broker.girder_configuration(&poi.segment())?;
        let series = self.strategy.compute_series(&*broker, poi, &config, interval)?;
        self.persisted.insert_series(poi.id(), series).ok_or_else(|| LossError::Internal {
            message: format!("losses for {} at {} were not stored", poi, interval),
        })
    }

    /// Losses under a trial configuration. The design cache holds one live
    /// configuration per POI; an unequal configuration replaces it.
    pub fn get_design_losses(
        &mut self,
        poi: &PointOfInterest,
        config: &GirderConfiguration,
        selector: IntervalSelector,
    ) -> LossResult<Rc<LossDetails>> {
        let broker = self.broker()?;
        let interval = Self::resolve(&broker, selector)?;
        if let Some(hit) = self.design.get(poi.id(), config, interval) {
            debug!(poi = %poi, interval = interval.0, "design loss cache hit");
            return Ok(hit);
        }
        debug!(poi = %poi, interval = interval.0, "design loss cache miss");
        config.validate()?;
        let series = self.strategy.compute_series(&*broker, poi, config, interval)?;
        self.design.insert_series(poi.id(), config, series).ok_or_else(|| LossError::Internal {
            message: format!("design losses for {} at {} were not stored", poi, interval),
        })
    }

    /// Discard every design-loss entry. Persisted losses are untouched.
    pub fn clear_design_losses(&mut self) {
        debug!("design losses cleared");
        self.design.clear();
    }

    /// Discard everything computed so far, as after a project change
    pub fn invalidate(&mut self) {
        info!("loss engineer invalidated");
        self.persisted.clear();
        self.design.clear();
        self.strategy.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            persisted: self.persisted.counters(),
            design: self.design.counters(),
        }
    }

    /// Top and bottom stress from pretensioning at each POI
    pub fn get_pretension_stress(
        &self,
        interval: IntervalIndex,
        results: ResultsType,
        pois: &[PointOfInterest],
        top: StressLocation,
        bottom: StressLocation,
    ) -> LossResult<(Vec<f64>, Vec<f64>)> {
        let broker = self.broker()?;
        pretension::pretension_stress(&*broker, interval, results, pois, top, bottom)
    }

    /// Effective force in a pretensioned strand group at the end of an interval (kip)
    pub fn get_prestress_force(
        &mut self,
        poi: &PointOfInterest,
        strand_type: StrandType,
        interval: IntervalIndex,
    ) -> LossResult<f64> {
        let broker = self.broker()?;
        let segment = poi.segment();
        let config = broker.girder_configuration(&segment)?;
        let group = *config.group(strand_type);
        if group.count == 0 || interval < broker.release_interval(&segment)? {
            return Ok(0.0);
        }
        if strand_type == StrandType::Temporary {
            if let Some(removal) = broker.temporary_strand_removal_interval(&segment) {
                if interval >= removal {
                    return Ok(0.0);
                }
            }
        }
        let strand = broker.strand_material(&segment)?;
        let aps = strand.total_area_in2(group.count);
        let fpj = group.jacking_stress_ksi(strand.area_in2);
        let losses = self.get_losses(poi, IntervalSelector::Through(interval))?;
        Ok(aps * (fpj - losses.pretension_losses()).max(0.0))
    }

    pub fn get_girder_tendon_anchor_set_details(
        &mut self,
        girder: GirderKey,
        duct: usize,
    ) -> LossResult<Option<AnchorSetDetails>> {
        let broker = self.broker()?;
        self.strategy.anchor_set_details(&*broker, TendonScope::Girder(girder), duct)
    }

    pub fn get_segment_tendon_anchor_set_details(
        &mut self,
        segment: SegmentKey,
        duct: usize,
    ) -> LossResult<Option<AnchorSetDetails>> {
        let broker = self.broker()?;
        self.strategy.anchor_set_details(&*broker, TendonScope::Segment(segment), duct)
    }

    /// Elongation at a tendon end (in); `None` without post-tensioning
    pub fn get_girder_tendon_elongation(
        &mut self,
        girder: GirderKey,
        duct: usize,
        end: TendonEnd,
    ) -> LossResult<Option<f64>> {
        let broker = self.broker()?;
        self.strategy.elongation(&*broker, TendonScope::Girder(girder), duct, end)
    }

    pub fn get_segment_tendon_elongation(
        &mut self,
        segment: SegmentKey,
        duct: usize,
        end: TendonEnd,
    ) -> LossResult<Option<f64>> {
        let broker = self.broker()?;
        self.strategy.elongation(&*broker, TendonScope::Segment(segment), duct, end)
    }

    pub fn get_girder_tendon_average_friction_and_anchor_set_loss(
        &mut self,
        girder: GirderKey,
        duct: usize,
    ) -> LossResult<Option<AverageTendonLoss>> {
        let broker = self.broker()?;
        self.strategy
            .average_friction_and_anchor_set(&*broker, TendonScope::Girder(girder), duct)
    }

    pub fn get_segment_tendon_average_friction_and_anchor_set_loss(
        &mut self,
        segment: SegmentKey,
        duct: usize,
    ) -> LossResult<Option<AverageTendonLoss>> {
        let broker = self.broker()?;
        self.strategy
            .average_friction_and_anchor_set(&*broker, TendonScope::Segment(segment), duct)
    }

    /// Hand the losses at each POI to a reporter
    pub fn build_report(
        &mut self,
        pois: &[PointOfInterest],
        selector: IntervalSelector,
        reporter: &mut dyn LossReporter,
    ) -> LossResult<()> {
        for poi in pois {
            let details = self.get_losses(poi, selector)?;
            reporter.report_losses(poi, &details)?;
        }
        Ok(())
    }

    /// Hand the final losses at each POI to a reporter
    pub fn report_final_losses(
        &mut self,
        pois: &[PointOfInterest],
        reporter: &mut dyn LossReporter,
    ) -> LossResult<()> {
        for poi in pois {
            let details = self.get_losses(poi, IntervalSelector::AllIntervals)?;
            reporter.report_final_losses(poi, &details)?;
        }
        Ok(())
    }
}

impl<B: Broker + ?Sized> std::fmt::Debug for LossEngineer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LossEngineer")
            .field("strategy", &self.strategy)
            .field("stats", &self.cache_stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{FcgpMethod, LossMethod, SpecEdition};
    use crate::intervals::IntervalTime;
    use crate::model::{GirderModel, POIS_PER_SEGMENT};
    use crate::providers::ForceProvider;
    use crate::report::LossTableReporter;
    use crate::test_support::{CountingBroker, FixedSection};
    use approx::assert_relative_eq;

    fn engineer(
        beam_type: BeamType,
        model: GirderModel,
    ) -> (Rc<CountingBroker>, LossEngineer<CountingBroker>) {
        let broker = Rc::new(CountingBroker::new(model));
        let engineer = LossEngineer::new(beam_type, Rc::downgrade(&broker)).unwrap();
        (broker, engineer)
    }

    fn midspan(model: &GirderModel) -> PointOfInterest {
        model.pois()[POIS_PER_SEGMENT / 2]
    }

    fn scenario_section() -> FixedSection {
        FixedSection {
            release: IntervalIndex(2),
            force_kip: 500.0,
            area_in2: 800.0,
            eccentricity_in: 10.0,
            st_in3: 5000.0,
            sb_in3: 4000.0,
        }
    }

    #[test]
    fn test_pretension_stress_closed_form() {
        let broker = Rc::new(CountingBroker::fixed(scenario_section()));
        let engineer = LossEngineer::new(BeamType::IBeam, Rc::downgrade(&broker)).unwrap();
        let pois = [midspan(&broker.model)];
        let stress = |interval, results| {
            engineer
                .get_pretension_stress(
                    IntervalIndex(interval),
                    results,
                    &pois,
                    StressLocation::TopGirder,
                    StressLocation::BottomGirder,
                )
                .unwrap()
        };

        let (top, bottom) = stress(2, ResultsType::Cumulative);
        assert_eq!(top, vec![-1.625]);
        assert_eq!(bottom, vec![-1.875]);

        assert_eq!(stress(1, ResultsType::Cumulative), (vec![0.0], vec![0.0]));
        assert_eq!(stress(2, ResultsType::Incremental), (vec![-1.625], vec![-1.875]));
    }

    #[test]
    fn test_incremental_stress_sums_to_cumulative() {
        let (broker, engineer) = engineer(BeamType::IBeam, GirderModel::default());
        let pois = broker.model.pois();
        let count = broker.model.intervals.len();
        let release = broker.model.release_interval.0;
        let bottom_at = |i: usize, results: ResultsType| {
            engineer
                .get_pretension_stress(
                    IntervalIndex(i),
                    results,
                    &pois,
                    StressLocation::TopGirder,
                    StressLocation::BottomGirder,
                )
                .unwrap()
                .1
        };

        let mut running = vec![0.0; pois.len()];
        let mut moved_after_release = false;
        for i in 0..count {
            let incremental = bottom_at(i, ResultsType::Incremental);
            if i > 0 {
                let now = bottom_at(i, ResultsType::Cumulative);
                let before = bottom_at(i - 1, ResultsType::Cumulative);
                for ((inc, n), b) in incremental.iter().zip(&now).zip(&before) {
                    assert_relative_eq!(*inc, n - b, epsilon = 1e-6);
                }
            }
            if i > release && incremental[POIS_PER_SEGMENT / 2] != 0.0 {
                moved_after_release = true;
            }
            for (sum, value) in running.iter_mut().zip(incremental) {
                *sum += value;
            }
        }
        assert!(moved_after_release);

        let cumulative = bottom_at(count - 1, ResultsType::Cumulative);
        for (sum, value) in running.iter().zip(&cumulative) {
            assert_relative_eq!(*sum, *value, epsilon = 1e-6);
        }
        // prestress relaxes the bottom fiber as losses accumulate
        let at_release = bottom_at(release, ResultsType::Cumulative);
        let mid = POIS_PER_SEGMENT / 2;
        assert!(cumulative[mid] < 0.0);
        assert!(cumulative[mid] > at_release[mid]);
    }

    #[test]
    fn test_deck_fibers_carry_no_pretension_stress() {
        let (broker, engineer) = engineer(BeamType::IBeam, GirderModel::default());
        let pois = broker.model.pois();
        let last = IntervalIndex(broker.model.intervals.len() - 1);
        let (top, bottom) = engineer
            .get_pretension_stress(
                last,
                ResultsType::Cumulative,
                &pois,
                StressLocation::TopDeck,
                StressLocation::BottomDeck,
            )
            .unwrap();
        assert!(top.iter().chain(&bottom).all(|f| *f == 0.0));
    }

    #[test]
    fn test_model_force_matches_engineer_force() {
        let (broker, mut engineer) = engineer(BeamType::IBeam, GirderModel::default());
        let poi = midspan(&broker.model);
        for i in 0..broker.model.intervals.len() {
            let interval = IntervalIndex(i);
            let from_engineer = engineer.get_prestress_force(&poi, StrandType::Straight, interval).unwrap();
            let from_model = broker
                .model
                .pretension_force(&poi, StrandType::Straight, interval, IntervalTime::End)
                .unwrap();
            assert_relative_eq!(from_engineer, from_model, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_component_sum() {
        for beam_type in [BeamType::IBeam, BeamType::SplicedIBeam] {
            let (broker, mut engineer) = engineer(beam_type, GirderModel::spliced_demo());
            let poi = midspan(&broker.model);
            for i in 0..broker.model.intervals.len() {
                let d = engineer.get_losses(&poi, IntervalSelector::Through(IntervalIndex(i))).unwrap();
                let sum = d.creep_losses()
                    + d.shrinkage_losses()
                    + d.relaxation_loss_before_deck()
                    + d.relaxation_loss_after_deck()
                    + d.lump_sum_losses()
                    + d.friction_loss()
                    + d.anchor_set_loss();
                assert_relative_eq!(d.time_dependent_losses(), sum, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_losses_cached_per_poi_and_interval() {
        let (broker, mut engineer) = engineer(BeamType::IBeam, GirderModel::default());
        let poi = midspan(&broker.model);
        let first = engineer.get_losses(&poi, IntervalSelector::AllIntervals).unwrap();
        let second = engineer.get_losses(&poi, IntervalSelector::AllIntervals).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        engineer.get_losses(&poi, IntervalSelector::Through(IntervalIndex(2))).unwrap();
        assert_eq!(broker.loss_input_calls(), 1);

        let stats = engineer.cache_stats();
        assert_eq!(stats.persisted.computations, 1);
        assert_eq!(stats.persisted.hits, 2);
        assert_eq!(stats.persisted.entries, broker.model.intervals.len());
    }

    #[test]
    fn test_losses_before_release_are_zero() {
        let (broker, mut engineer) = engineer(BeamType::IBeam, GirderModel::default());
        let poi = midspan(&broker.model);
        let d = engineer.get_losses(&poi, IntervalSelector::Through(IntervalIndex(0))).unwrap();
        assert_eq!(d.phase, crate::losses::LossPhase::BeforeRelease);
        assert_eq!(d.elastic_shortening(), 0.0);
        assert_eq!(d.time_dependent_losses(), 0.0);
    }

    #[test]
    fn test_design_configuration_replaces_entry() {
        let (broker, mut engineer) = engineer(BeamType::IBeam, GirderModel::default());
        let poi = midspan(&broker.model);
        let config_a = broker.model.configuration.clone();
        let mut config_b = config_a.clone();
        config_b.straight = crate::config::StrandGroup::new(24, 24.0 * 0.153 * 202.5);

        let a = engineer.get_design_losses(&poi, &config_a, IntervalSelector::AllIntervals).unwrap();
        let b = engineer.get_design_losses(&poi, &config_b, IntervalSelector::AllIntervals).unwrap();
        assert_eq!(broker.loss_input_calls(), 2);
        assert!(b.elastic_shortening() > a.elastic_shortening());

        // configuration A was displaced by B
        let again = engineer.get_design_losses(&poi, &config_a, IntervalSelector::AllIntervals).unwrap();
        assert_eq!(broker.loss_input_calls(), 3);
        assert_relative_eq!(again.elastic_shortening(), a.elastic_shortening(), epsilon = 1e-12);
    }

    #[test]
    fn test_clear_design_losses_forces_recompute() {
        let (broker, mut engineer) = engineer(BeamType::IBeam, GirderModel::default());
        let poi = midspan(&broker.model);
        let config = broker.model.configuration.clone();

        engineer.get_losses(&poi, IntervalSelector::AllIntervals).unwrap();
        engineer.get_design_losses(&poi, &config, IntervalSelector::AllIntervals).unwrap();
        engineer.get_design_losses(&poi, &config, IntervalSelector::AllIntervals).unwrap();
        assert_eq!(broker.loss_input_calls(), 2);

        engineer.clear_design_losses();
        engineer.get_design_losses(&poi, &config, IntervalSelector::AllIntervals).unwrap();
        assert_eq!(broker.loss_input_calls(), 3);

        // persisted losses survive
        engineer.get_losses(&poi, IntervalSelector::AllIntervals).unwrap();
        assert_eq!(broker.loss_input_calls(), 3);
    }

    #[test]
    fn test_method_narrowing() {
        let (broker, mut engineer) = engineer(BeamType::IBeam, GirderModel::default());
        let d = engineer.get_losses(&midspan(&broker.model), IntervalSelector::AllIntervals).unwrap();
        assert!(d.refined_2005().is_ok());
        assert!(d.as_refined_pre2005().is_none());
        assert!(matches!(d.txdot_2013(), Err(LossError::MethodMismatch { .. })));
    }

    #[test]
    fn test_pre2005_reports_no_separate_initial_relaxation() {
        let mut model = GirderModel::default();
        model.criteria.spec_edition = SpecEdition::ThirdEdition2004;
        let (broker, mut engineer) = engineer(BeamType::IBeam, model);
        assert_eq!(engineer.method(), StrategyKind::RefinedPre2005);
        let d = engineer.get_losses(&midspan(&broker.model), IntervalSelector::AllIntervals).unwrap();
        assert_eq!(d.initial_relaxation(), 0.0);
        assert!(d.relaxation_loss_before_deck() > 0.0);
    }

    #[test]
    fn test_approximate_lump_sum_by_edition() {
        let mut model = GirderModel::default();
        model.criteria.loss_method = LossMethod::AashtoLumpSum;
        let (broker, mut engineer) = engineer(BeamType::IBeam, model);
        assert_eq!(engineer.method(), StrategyKind::ApproximateLumpSum { wsdot: false, lrfd_2005: true });
        let d = engineer.get_losses(&midspan(&broker.model), IntervalSelector::AllIntervals).unwrap();
        let approx = d.approximate_lump_sum().unwrap();
        assert_relative_eq!(
            d.lump_sum_losses() + d.relaxation_loss_before_deck() + d.relaxation_loss_after_deck(),
            approx.long_term_final_ksi,
            epsilon = 1e-9
        );
        assert_eq!(d.creep_losses(), 0.0);
        assert!(d.elastic_shortening() > 0.0);
    }

    #[test]
    fn test_tabulated_lump_sum_follows_beam_type() {
        let mut model = GirderModel::default();
        model.criteria.loss_method = LossMethod::WsdotLumpSum;
        model.criteria.spec_edition = SpecEdition::SecondEdition1998;
        let (broker, mut box_engineer) = engineer(BeamType::BoxBeam, model);
        assert_eq!(box_engineer.method(), StrategyKind::ApproximateLumpSum { wsdot: true, lrfd_2005: false });
        let d = box_engineer.get_losses(&midspan(&broker.model), IntervalSelector::AllIntervals).unwrap();
        // 19 + 4·PPR less the low-relaxation reduction
        assert_relative_eq!(d.approximate_lump_sum().unwrap().long_term_final_ksi, 19.0, epsilon = 1e-9);
        assert_relative_eq!(d.lump_sum_losses(), 19.0, epsilon = 1e-9);
    }

    #[test]
    fn test_general_lump_sum_reaches_final_stage() {
        let mut model = GirderModel::default();
        model.criteria.loss_method = LossMethod::GeneralLumpSum;
        let stages = model.criteria.general_lump_sum;
        let (broker, mut engineer) = engineer(BeamType::IBeam, model);
        let poi = midspan(&broker.model);

        let at_release = engineer
            .get_losses(&poi, IntervalSelector::Through(broker.model.release_interval))
            .unwrap();
        assert_relative_eq!(at_release.pretension_losses(), stages.after_transfer_ksi, epsilon = 1e-9);

        let d = engineer.get_losses(&poi, IntervalSelector::AllIntervals).unwrap();
        assert!(d.general_lump_sum().is_ok());
        assert_relative_eq!(d.total_losses(), stages.final_ksi, epsilon = 1e-9);

        let mut reporter = LossTableReporter::new();
        engineer.report_final_losses(&[poi], &mut reporter).unwrap();
        let row = &reporter.final_rows[0];
        assert_relative_eq!(row.lump_sum_ksi, stages.final_ksi - stages.after_transfer_ksi, epsilon = 1e-9);
        assert_eq!(row.references, vec!["Owner-specified lump sum".to_string()]);
    }

    #[test]
    fn test_assumed_fcgp_is_constant_along_girder() {
        let mut model = GirderModel::default();
        model.criteria.loss_method = LossMethod::TxdotRefined2013;
        model.criteria.fcgp_method = FcgpMethod::AssumedFraction;
        let (broker, mut engineer) = engineer(BeamType::IBeam, model);
        let pois = broker.model.pois();

        let mut reporter = LossTableReporter::new();
        engineer.build_report(&pois, IntervalSelector::AllIntervals, &mut reporter).unwrap();
        assert_eq!(reporter.rows.len(), pois.len());
        assert!(reporter.rows.iter().all(|r| r.fpt_ksi.is_none()));
        assert_relative_eq!(reporter.constant_fpt_ksi.unwrap(), 0.7 * 270.0, epsilon = 1e-9);
    }

    #[test]
    fn test_iterative_fcgp_varies_along_girder() {
        let (broker, mut engineer) = engineer(BeamType::IBeam, GirderModel::default());
        let mut reporter = LossTableReporter::new();
        engineer.report_final_losses(&broker.model.pois(), &mut reporter).unwrap();
        assert!(reporter.constant_fpt_ksi.is_none());
        assert!(reporter.final_rows.iter().all(|r| r.fpt_ksi.is_some()));
    }

    #[test]
    fn test_post_tension_not_applicable_without_tendons() {
        let (broker, mut engineer) = engineer(BeamType::IBeam, GirderModel::spliced_demo());
        let girder = broker.model.girder;
        assert!(engineer.get_girder_tendon_anchor_set_details(girder, 0).unwrap().is_none());
        assert!(engineer
            .get_girder_tendon_elongation(girder, 0, TendonEnd::Left)
            .unwrap()
            .is_none());
        let d = engineer.get_losses(&midspan(&broker.model), IntervalSelector::AllIntervals).unwrap();
        assert!(d.post_tension.is_none());
        assert_eq!(d.friction_loss(), 0.0);
    }

    #[test]
    fn test_spliced_girder_post_tension() {
        let (broker, mut engineer) = engineer(BeamType::SplicedIBeam, GirderModel::spliced_demo());
        let girder = broker.model.girder;
        let segment = SegmentKey::new(0, 0, 0);

        let details = engineer.get_girder_tendon_anchor_set_details(girder, 0).unwrap().unwrap();
        assert_eq!(details.duct, 0);
        let elongation = engineer
            .get_girder_tendon_elongation(girder, 1, TendonEnd::Left)
            .unwrap()
            .unwrap();
        assert!(elongation > 0.0);
        let average = engineer
            .get_segment_tendon_average_friction_and_anchor_set_loss(segment, 0)
            .unwrap()
            .unwrap();
        assert!(average.total_ksi() > 0.0);
        assert!(engineer.get_segment_tendon_anchor_set_details(segment, 1).is_err());

        let poi = midspan(&broker.model);
        let before = engineer.get_losses(&poi, IntervalSelector::Through(IntervalIndex(2))).unwrap();
        assert!(before.post_tension.is_none());
        let after = engineer.get_losses(&poi, IntervalSelector::AllIntervals).unwrap();
        assert!(after.friction_loss() > 0.0);
        assert!(after.total_losses() > after.pretension_losses());
    }

    #[test]
    fn test_prestress_force() {
        let (broker, mut engineer) = engineer(BeamType::IBeam, GirderModel::default());
        let poi = midspan(&broker.model);
        let jacking = broker.model.configuration.straight.jacking_force_kip;
        assert_eq!(engineer.get_prestress_force(&poi, StrandType::Straight, IntervalIndex(0)).unwrap(), 0.0);
        assert_eq!(engineer.get_prestress_force(&poi, StrandType::Temporary, IntervalIndex(2)).unwrap(), 0.0);
        let at_release = engineer.get_prestress_force(&poi, StrandType::Straight, IntervalIndex(1)).unwrap();
        let last = IntervalIndex(broker.model.intervals.len() - 1);
        let final_force = engineer.get_prestress_force(&poi, StrandType::Straight, last).unwrap();
        assert!(at_release < jacking);
        assert!(final_force < at_release);
    }

    #[test]
    fn test_dropped_context_is_reported() {
        let (broker, mut engineer) = engineer(BeamType::IBeam, GirderModel::default());
        let poi = midspan(&broker.model);
        drop(broker);
        assert!(matches!(
            engineer.get_losses(&poi, IntervalSelector::AllIntervals),
            Err(LossError::BrokerUnavailable)
        ));
    }

    #[test]
    fn test_invalidate_clears_everything() {
        let (broker, mut engineer) = engineer(BeamType::IBeam, GirderModel::default());
        let poi = midspan(&broker.model);
        engineer.get_losses(&poi, IntervalSelector::AllIntervals).unwrap();
        engineer.invalidate();
        assert_eq!(engineer.cache_stats().persisted.entries, 0);
        engineer.get_losses(&poi, IntervalSelector::AllIntervals).unwrap();
        assert_eq!(broker.loss_input_calls(), 2);
    }
}
