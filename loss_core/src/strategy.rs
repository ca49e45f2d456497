//! # Loss Method Strategy
//!
//! The loss method and the post-tensioning sub-model a loss engineer uses
//! for its girder. The choice is made once, from the beam type and the loss
//! criteria, and never changes.
//!
//! A strategy evaluates a POI as a series: every interval from the first up
//! to the requested one, in order, from a single read of the loss inputs.

use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GirderConfiguration;
use crate::criteria::{FcgpMethod, LossCriteria, LossMethod};
use crate::errors::{LossError, LossResult};
use crate::intervals::{IntervalIndex, IntervalTime};
use crate::losses::elastic::{self, ElasticShortening};
use crate::losses::lump_sum::{ApproximateLumpSum, GeneralLumpSum};
use crate::losses::post_tension::{
    AnchorSetDetails, AverageTendonLoss, DuctLossAtPoi, PostTensionLosses, TendonLosses,
};
use crate::losses::refined_2005::Refined2005;
use crate::losses::refined_pre2005::RefinedPre2005;
use crate::losses::txdot_2013::TxdotRefined2013;
use crate::losses::{relaxation, LossDetails, LossPhase, MethodLosses, PhaseAges};
use crate::poi::PointOfInterest;
use crate::providers::{Broker, TendonEnd, TendonScope};

/// Girder family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeamType {
    IBeam,
    UBeam,
    BoxBeam,
    Slab,
    SingleTee,
    SplicedIBeam,
    SplicedUBeam,
}

impl BeamType {
    pub const ALL: [BeamType; 7] = [
        BeamType::IBeam,
        BeamType::UBeam,
        BeamType::BoxBeam,
        BeamType::Slab,
        BeamType::SingleTee,
        BeamType::SplicedIBeam,
        BeamType::SplicedUBeam,
    ];

    /// Spliced girders carry post-tensioning tendons
    pub fn is_spliced(&self) -> bool {
        matches!(self, BeamType::SplicedIBeam | BeamType::SplicedUBeam)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BeamType::IBeam => "I-Beam",
            BeamType::UBeam => "U-Beam",
            BeamType::BoxBeam => "Box Beam",
            BeamType::Slab => "Slab",
            BeamType::SingleTee => "Single Tee",
            BeamType::SplicedIBeam => "Spliced I-Beam",
            BeamType::SplicedUBeam => "Spliced U-Beam",
        }
    }
}

/// Loss method selected for a girder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// General refined method, LRFD 2005 interims and later
    Refined2005 { wsdot: bool },
    /// Agency refined method A, LRFD through 2004 and TxDOT 2004
    RefinedPre2005,
    /// Agency refined method B
    TxdotRefined2013,
    /// Approximate estimate, tabulated through 2004
    ApproximateLumpSum { wsdot: bool, lrfd_2005: bool },
    /// Owner-specified stage losses
    GeneralLumpSum,
}

impl StrategyKind {
    pub fn select(criteria: &LossCriteria) -> Self {
        match criteria.loss_method {
            LossMethod::AashtoRefined | LossMethod::WsdotRefined
                if criteria.spec_edition.is_pre_2005() =>
            {
                StrategyKind::RefinedPre2005
            }
            LossMethod::AashtoRefined => StrategyKind::Refined2005 { wsdot: false },
            LossMethod::WsdotRefined => StrategyKind::Refined2005 { wsdot: true },
            LossMethod::TxdotRefined2004 => StrategyKind::RefinedPre2005,
            LossMethod::TxdotRefined2013 => StrategyKind::TxdotRefined2013,
            LossMethod::AashtoLumpSum | LossMethod::WsdotLumpSum => StrategyKind::ApproximateLumpSum {
                wsdot: criteria.loss_method == LossMethod::WsdotLumpSum,
                lrfd_2005: !criteria.spec_edition.is_pre_2005(),
            },
            LossMethod::GeneralLumpSum => StrategyKind::GeneralLumpSum,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StrategyKind::Refined2005 { wsdot: true } => "WSDOT Refined (2005)",
            StrategyKind::Refined2005 { wsdot: false } => "Refined (2005)",
            StrategyKind::RefinedPre2005 => "Refined (pre-2005)",
            StrategyKind::TxdotRefined2013 => "TxDOT Refined (2013)",
            StrategyKind::ApproximateLumpSum { wsdot: true, lrfd_2005: true } => "WSDOT Approximate (2005)",
            StrategyKind::ApproximateLumpSum { wsdot: false, lrfd_2005: true } => "Approximate (2005)",
            StrategyKind::ApproximateLumpSum { wsdot: true, lrfd_2005: false } => {
                "WSDOT Approximate Lump Sum (pre-2005)"
            }
            StrategyKind::ApproximateLumpSum { wsdot: false, lrfd_2005: false } => {
                "Approximate Lump Sum (pre-2005)"
            }
            StrategyKind::GeneralLumpSum => "General Lump Sum",
        }
    }
}

enum Evaluator {
    Refined2005(Refined2005),
    RefinedPre2005(RefinedPre2005),
    TxdotRefined2013(TxdotRefined2013),
    ApproximateLumpSum(ApproximateLumpSum),
    GeneralLumpSum(GeneralLumpSum),
}

impl Evaluator {
    fn at(&self, phase: LossPhase, t: f64) -> MethodLosses {
        match self {
            Evaluator::Refined2005(m) => MethodLosses::Refined2005(m.at(phase, t)),
            Evaluator::RefinedPre2005(m) => MethodLosses::RefinedPre2005(m.at(phase, t)),
            Evaluator::TxdotRefined2013(m) => MethodLosses::TxdotRefined2013(m.at(phase, t)),
            Evaluator::ApproximateLumpSum(m) => MethodLosses::ApproximateLumpSum(m.at(phase, t)),
            Evaluator::GeneralLumpSum(m) => MethodLosses::GeneralLumpSum(m.at(phase, t)),
        }
    }
}

/// Selected loss method plus the tendon models of a spliced girder
#[derive(Debug)]
pub struct LossStrategy {
    beam_type: BeamType,
    kind: StrategyKind,
    criteria: LossCriteria,
    tendons: HashMap<TendonScope, Option<Rc<TendonLosses>>>,
}

impl LossStrategy {
    pub fn new(beam_type: BeamType, criteria: LossCriteria) -> LossResult<Self> {
        criteria.validate()?;
        Ok(LossStrategy {
            beam_type,
            kind: StrategyKind::select(&criteria),
            criteria,
            tendons: HashMap::new(),
        })
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn beam_type(&self) -> BeamType {
        self.beam_type
    }

    pub fn criteria(&self) -> &LossCriteria {
        &self.criteria
    }

    fn fcgp_method(&self) -> FcgpMethod {
        match self.kind {
            StrategyKind::TxdotRefined2013 => self.criteria.fcgp_method,
            _ => FcgpMethod::Iterative,
        }
    }

    /// Forget the tendon models
    pub fn clear(&mut self) {
        self.tendons.clear();
    }

    /// Losses at every interval from the first through `through`, in order
    pub fn compute_series<B: Broker + ?Sized>(
        &mut self,
        broker: &B,
        poi: &PointOfInterest,
        config: &GirderConfiguration,
        through: IntervalIndex,
    ) -> LossResult<Vec<LossDetails>> {
        let segment = poi.segment();
        let count = broker.interval_count();
        if through.0 >= count {
            return Err(LossError::invalid_input(
                "interval",
                through.0.to_string(),
                format!("only {} intervals are defined", count),
            ));
        }
        let release = broker.release_interval(&segment)?;
        let deck = broker.composite_deck_interval();
        if deck < release {
            return Err(LossError::invalid_input(
                "composite_deck_interval",
                deck.0.to_string(),
                "Deck cannot become composite before release",
            ));
        }
        let last = IntervalIndex(count - 1);
        let ages = PhaseAges {
            ti: broker.concrete_age_days(&segment, release, IntervalTime::Start)?,
            td: broker.concrete_age_days(&segment, deck, IntervalTime::Start)?,
            tf: broker.concrete_age_days(&segment, last, IntervalTime::End)?,
        };
        ages.validate()?;

        let inputs = broker.loss_inputs(poi, config)?;
        inputs.validate()?;

        let shortening = || -> LossResult<ElasticShortening> {
            let r0 = relaxation::intrinsic(&inputs.strand, inputs.fpj_at_transfer_ksi(), ages.ti)?;
            elastic::compute(&inputs, r0, self.fcgp_method())
        };
        let (es, evaluator) = match self.kind {
            StrategyKind::Refined2005 { wsdot } => {
                let es = shortening()?;
                let method = Refined2005::prepare(&self.criteria, &inputs, &es, ages, wsdot)?;
                (es, Evaluator::Refined2005(method))
            }
            StrategyKind::RefinedPre2005 => {
                let es = shortening()?;
                let method = RefinedPre2005::prepare(&self.criteria, &inputs, &es, ages)?;
                (es, Evaluator::RefinedPre2005(method))
            }
            StrategyKind::TxdotRefined2013 => {
                let es = shortening()?;
                let method = TxdotRefined2013::prepare(&self.criteria, &inputs, &es, ages)?;
                (es, Evaluator::TxdotRefined2013(method))
            }
            StrategyKind::ApproximateLumpSum { wsdot, lrfd_2005 } => {
                let es = shortening()?;
                let method = ApproximateLumpSum::prepare(
                    &self.criteria,
                    &inputs,
                    &es,
                    ages,
                    self.beam_type,
                    wsdot,
                    lrfd_2005,
                )?;
                (es, Evaluator::ApproximateLumpSum(method))
            }
            StrategyKind::GeneralLumpSum => {
                let method = GeneralLumpSum::prepare(&self.criteria, &inputs, ages)?;
                (method.elastic(&inputs), Evaluator::GeneralLumpSum(method))
            }
        };

        let scopes = [TendonScope::Girder(segment.girder_key()), TendonScope::Segment(segment)];
        let mut tendons = Vec::new();
        for scope in scopes {
            if let Some(t) = self.tendon_losses(broker, scope)? {
                tendons.push(t);
            }
        }

        debug!(poi = %poi, through = through.0, method = self.kind.display_name(), "evaluating losses");
        let mut series = Vec::with_capacity(through.0 + 1);
        for i in (0..=through.0).map(IntervalIndex) {
            let phase = if i < release {
                LossPhase::BeforeRelease
            } else if i < deck {
                LossPhase::BeforeDeck
            } else {
                LossPhase::AfterDeck
            };
            let age = broker.concrete_age_days(&segment, i, IntervalTime::End)?;
            let elastic = if phase == LossPhase::BeforeRelease {
                ElasticShortening::none(es.method)
            } else {
                es
            };
            let post_tension = post_tension_at(broker, poi, i, &tendons)?;
            series.push(LossDetails::new(
                poi.id(),
                i,
                phase,
                age,
                elastic,
                evaluator.at(phase, age),
                post_tension,
            ));
        }
        Ok(series)
    }

    /// Tendon model of a scope, `None` when the scope has no post-tensioning
    fn tendon_losses<B: Broker + ?Sized>(
        &mut self,
        broker: &B,
        scope: TendonScope,
    ) -> LossResult<Option<Rc<TendonLosses>>> {
        if !self.beam_type.is_spliced() {
            return Ok(None);
        }
        if let Some(cached) = self.tendons.get(&scope) {
            return Ok(cached.clone());
        }
        let model = if broker.duct_count(&scope) == 0 {
            None
        } else {
            let stressing = broker.tendon_stressing_interval(&scope)?;
            debug!(scope = %scope, "computing tendon friction and anchor set");
            Some(Rc::new(TendonLosses::compute(
                broker,
                scope,
                stressing,
                self.criteria.post_tension,
            )?))
        };
        self.tendons.insert(scope, model.clone());
        Ok(model)
    }

    pub fn anchor_set_details<B: Broker + ?Sized>(
        &mut self,
        broker: &B,
        scope: TendonScope,
        duct: usize,
    ) -> LossResult<Option<AnchorSetDetails>> {
        match self.tendon_losses(broker, scope)? {
            Some(t) => Ok(Some(t.duct(duct)?.anchor_set)),
            None => Ok(None),
        }
    }

    pub fn elongation<B: Broker + ?Sized>(
        &mut self,
        broker: &B,
        scope: TendonScope,
        duct: usize,
        end: TendonEnd,
    ) -> LossResult<Option<f64>> {
        match self.tendon_losses(broker, scope)? {
            Some(t) => Ok(Some(t.duct(duct)?.elongation_in(end))),
            None => Ok(None),
        }
    }

    pub fn average_friction_and_anchor_set<B: Broker + ?Sized>(
        &mut self,
        broker: &B,
        scope: TendonScope,
        duct: usize,
    ) -> LossResult<Option<AverageTendonLoss>> {
        match self.tendon_losses(broker, scope)? {
            Some(t) => Ok(Some(t.duct(duct)?.average)),
            None => Ok(None),
        }
    }
}

/// Post-tensioning losses at a POI once its tendons have been stressed
fn post_tension_at<B: Broker + ?Sized>(
    broker: &B,
    poi: &PointOfInterest,
    interval: IntervalIndex,
    tendons: &[Rc<TendonLosses>],
) -> LossResult<Option<PostTensionLosses>> {
    let mut ducts = Vec::new();
    for tendon in tendons.iter().filter(|t| interval >= t.stressing_interval) {
        for duct in &tendon.ducts {
            if let Some(x) = broker.tendon_coordinate(&tendon.scope, duct.duct, poi)? {
                ducts.push(DuctLossAtPoi {
                    scope: tendon.scope,
                    duct: duct.duct,
                    aps_in2: duct.data.aps_in2(),
                    friction_ksi: duct.friction_at(x),
                    anchor_set_ksi: duct.anchor_set_at(x),
                });
            }
        }
    }
    Ok(if ducts.is_empty() {
        None
    } else {
        Some(PostTensionLosses { ducts })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::SpecEdition;

    fn criteria(method: LossMethod, edition: SpecEdition) -> LossCriteria {
        LossCriteria {
            loss_method: method,
            spec_edition: edition,
            ..Default::default()
        }
    }

    #[test]
    fn test_method_selection() {
        use LossMethod::*;
        use SpecEdition::*;
        let cases = [
            (AashtoRefined, ThirdEdition2004, StrategyKind::RefinedPre2005),
            (AashtoRefined, Interims2005, StrategyKind::Refined2005 { wsdot: false }),
            (WsdotRefined, SecondEdition1998, StrategyKind::RefinedPre2005),
            (WsdotRefined, EighthEdition2017, StrategyKind::Refined2005 { wsdot: true }),
            (TxdotRefined2004, EighthEdition2017, StrategyKind::RefinedPre2005),
            (TxdotRefined2013, FirstEdition1994, StrategyKind::TxdotRefined2013),
            (
                AashtoLumpSum,
                ThirdEdition2004,
                StrategyKind::ApproximateLumpSum { wsdot: false, lrfd_2005: false },
            ),
            (
                AashtoLumpSum,
                SixthEdition2012,
                StrategyKind::ApproximateLumpSum { wsdot: false, lrfd_2005: true },
            ),
            (
                WsdotLumpSum,
                Interims2005,
                StrategyKind::ApproximateLumpSum { wsdot: true, lrfd_2005: true },
            ),
            (GeneralLumpSum, FirstEdition1994, StrategyKind::GeneralLumpSum),
        ];
        for (method, edition, expected) in cases {
            assert_eq!(StrategyKind::select(&criteria(method, edition)), expected);
        }
    }

    #[test]
    fn test_only_spliced_beams_post_tension() {
        let spliced: Vec<_> = BeamType::ALL.iter().filter(|b| b.is_spliced()).collect();
        assert_eq!(spliced.len(), 2);
    }

    #[test]
    fn test_invalid_criteria_rejected() {
        let bad = LossCriteria {
            curing_time_factor: 0.5,
            ..Default::default()
        };
        assert!(LossStrategy::new(BeamType::IBeam, bad).is_err());
    }
}
