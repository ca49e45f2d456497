//! # Loss Details
//!
//! The result of evaluating one loss method at one POI and interval.
//!
//! Every method reports the same physical phases, so consumers read losses
//! through the method-agnostic accessors on [`LossDetails`]. The
//! method-specific breakdown lives in [`MethodLosses`] and is reached by an
//! explicit narrowing accessor that fails visibly when the result was
//! produced by a different method:
//!
//! ```rust,ignore
//! match details.refined_2005() {
//!     Ok(refined) => println!("K_id = {:.3}", refined.kid),
//!     Err(e) if e.is_recoverable() => println!("not applicable: {e}"),
//!     Err(e) => return Err(e),
//! }
//! ```
//!
//! All values are cumulative through the end of the interval, in ksi of
//! strand stress, losses positive.

pub mod elastic;
pub mod lump_sum;
pub mod material;
pub mod post_tension;
pub mod refined_2005;
pub mod refined_pre2005;
pub mod relaxation;
pub mod txdot_2013;

use serde::{Deserialize, Serialize};

use crate::criteria::lrfd_ref;
use crate::errors::{LossError, LossResult};
use crate::intervals::IntervalIndex;
use crate::poi::PoiId;

pub use elastic::ElasticShortening;
pub use lump_sum::{ApproximateLumpSumLosses, GeneralLumpSumLosses};
pub use post_tension::{AnchorSetDetails, AverageTendonLoss, PostTensionLosses};
pub use refined_2005::Refined2005Losses;
pub use refined_pre2005::RefinedPre2005Losses;
pub use txdot_2013::TxdotRefined2013Losses;

/// Stage of the construction sequence an interval falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossPhase {
    BeforeRelease,
    BeforeDeck,
    AfterDeck,
}

/// Method-specific loss breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum MethodLosses {
    Refined2005(Refined2005Losses),
    RefinedPre2005(RefinedPre2005Losses),
    TxdotRefined2013(TxdotRefined2013Losses),
    ApproximateLumpSum(ApproximateLumpSumLosses),
    GeneralLumpSum(GeneralLumpSumLosses),
}

impl MethodLosses {
    pub fn name(&self) -> &'static str {
        match self {
            MethodLosses::Refined2005(l) if l.wsdot => "WSDOT Refined (2005)",
            MethodLosses::Refined2005(_) => "Refined (2005)",
            MethodLosses::RefinedPre2005(_) => "Refined (pre-2005)",
            MethodLosses::TxdotRefined2013(_) => "TxDOT Refined (2013)",
            MethodLosses::ApproximateLumpSum(l) => match (l.wsdot, l.lrfd_2005) {
                (true, true) => "WSDOT Approximate (2005)",
                (false, true) => "Approximate (2005)",
                (true, false) => "WSDOT Approximate Lump Sum (pre-2005)",
                (false, false) => "Approximate Lump Sum (pre-2005)",
            },
            MethodLosses::GeneralLumpSum(_) => "General Lump Sum",
        }
    }

    /// Code article the method's time-dependent losses come from
    pub fn code_reference(&self) -> &'static str {
        match self {
            MethodLosses::Refined2005(_) => lrfd_ref::REFINED_2005,
            MethodLosses::RefinedPre2005(_) => lrfd_ref::REFINED_PRE_2005,
            MethodLosses::TxdotRefined2013(_) => lrfd_ref::TXDOT_2013,
            MethodLosses::ApproximateLumpSum(l) if l.lrfd_2005 => lrfd_ref::APPROXIMATE_2005,
            MethodLosses::ApproximateLumpSum(_) => lrfd_ref::APPROXIMATE_PRE_2005,
            MethodLosses::GeneralLumpSum(_) => lrfd_ref::GENERAL_LUMP_SUM,
        }
    }

    fn creep_ksi(&self) -> f64 {
        match self {
            MethodLosses::Refined2005(l) => l.creep_before_deck_ksi + l.creep_after_deck_ksi,
            MethodLosses::RefinedPre2005(l) => l.creep_before_deck_ksi + l.creep_after_deck_ksi,
            MethodLosses::TxdotRefined2013(l) => l.creep_before_deck_ksi + l.creep_after_deck_ksi,
            MethodLosses::ApproximateLumpSum(_) | MethodLosses::GeneralLumpSum(_) => 0.0,
        }
    }

    fn shrinkage_ksi(&self) -> f64 {
        match self {
            MethodLosses::Refined2005(l) => {
                l.shrinkage_before_deck_ksi + l.shrinkage_after_deck_ksi - l.deck_shrinkage_gain_ksi
            }
            MethodLosses::RefinedPre2005(l) => {
                l.shrinkage_before_deck_ksi + l.shrinkage_after_deck_ksi
            }
            MethodLosses::TxdotRefined2013(l) => {
                l.shrinkage_before_deck_ksi + l.shrinkage_after_deck_ksi
            }
            MethodLosses::ApproximateLumpSum(_) | MethodLosses::GeneralLumpSum(_) => 0.0,
        }
    }

    fn relaxation_before_deck_ksi(&self) -> f64 {
        match self {
            MethodLosses::Refined2005(l) => l.relaxation_before_deck_ksi,
            MethodLosses::RefinedPre2005(l) => l.relaxation_before_deck_ksi,
            MethodLosses::TxdotRefined2013(l) => l.relaxation_before_deck_ksi,
            MethodLosses::ApproximateLumpSum(l) => l.relaxation_before_deck_ksi,
            MethodLosses::GeneralLumpSum(_) => 0.0,
        }
    }

    fn relaxation_after_deck_ksi(&self) -> f64 {
        match self {
            MethodLosses::Refined2005(l) => l.relaxation_after_deck_ksi,
            MethodLosses::RefinedPre2005(l) => l.relaxation_after_deck_ksi,
            MethodLosses::TxdotRefined2013(l) => l.relaxation_after_deck_ksi,
            MethodLosses::ApproximateLumpSum(l) => l.relaxation_after_deck_ksi,
            MethodLosses::GeneralLumpSum(_) => 0.0,
        }
    }

    /// Long-term loss not split into creep, shrinkage and relaxation
    fn lump_sum_ksi(&self) -> f64 {
        match self {
            MethodLosses::ApproximateLumpSum(l) => l.lump_before_deck_ksi + l.lump_after_deck_ksi,
            MethodLosses::GeneralLumpSum(l) => l.lump_before_deck_ksi + l.lump_after_deck_ksi,
            _ => 0.0,
        }
    }
}

/// Loss breakdown at one POI and interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossDetails {
    pub poi: PoiId,
    pub interval: IntervalIndex,
    pub phase: LossPhase,
    /// Concrete age at the end of the interval (days)
    pub age_days: f64,
    pub elastic: ElasticShortening,
    pub method: MethodLosses,
    pub post_tension: Option<PostTensionLosses>,
    time_dependent_ksi: f64,
}

impl LossDetails {
    pub fn new(
        poi: PoiId,
        interval: IntervalIndex,
        phase: LossPhase,
        age_days: f64,
        elastic: ElasticShortening,
        method: MethodLosses,
        post_tension: Option<PostTensionLosses>,
    ) -> Self {
        let pt = post_tension
            .as_ref()
            .map(|pt| pt.friction_ksi() + pt.anchor_set_ksi())
            .unwrap_or(0.0);
        let time_dependent_ksi = method.creep_ksi()
            + method.shrinkage_ksi()
            + method.relaxation_before_deck_ksi()
            + method.relaxation_after_deck_ksi()
            + method.lump_sum_ksi()
            + pt;
        LossDetails {
            poi,
            interval,
            phase,
            age_days,
            elastic,
            method,
            post_tension,
            time_dependent_ksi,
        }
    }

    pub fn method_name(&self) -> &'static str {
        self.method.name()
    }

    pub fn creep_losses(&self) -> f64 {
        self.method.creep_ksi()
    }

    /// Girder shrinkage net of any deck shrinkage gain
    pub fn shrinkage_losses(&self) -> f64 {
        self.method.shrinkage_ksi()
    }

    pub fn relaxation_loss_before_deck(&self) -> f64 {
        self.method.relaxation_before_deck_ksi()
    }

    pub fn relaxation_loss_after_deck(&self) -> f64 {
        self.method.relaxation_after_deck_ksi()
    }

    /// Long-term loss of the lump-sum methods
    pub fn lump_sum_losses(&self) -> f64 {
        self.method.lump_sum_ksi()
    }

    /// Area-weighted friction loss in the tendons passing this POI
    pub fn friction_loss(&self) -> f64 {
        self.post_tension.as_ref().map(|pt| pt.friction_ksi()).unwrap_or(0.0)
    }

    pub fn anchor_set_loss(&self) -> f64 {
        self.post_tension.as_ref().map(|pt| pt.anchor_set_ksi()).unwrap_or(0.0)
    }

    /// Sum of every time-dependent component, post-tensioning included
    pub fn time_dependent_losses(&self) -> f64 {
        self.time_dependent_ksi
    }

    pub fn elastic_shortening(&self) -> f64 {
        self.elastic.delta_fpes_ksi
    }

    /// Relaxation between jacking and transfer. The pre-2005 method reports
    /// it as its before-deck relaxation instead.
    pub fn initial_relaxation(&self) -> f64 {
        match self.method {
            MethodLosses::RefinedPre2005(_) => 0.0,
            _ => self.elastic.initial_relaxation_ksi,
        }
    }

    /// Time-dependent losses of the pretensioned strands alone
    pub fn pretension_time_dependent_losses(&self) -> f64 {
        self.creep_losses()
            + self.shrinkage_losses()
            + self.relaxation_loss_before_deck()
            + self.relaxation_loss_after_deck()
            + self.lump_sum_losses()
    }

    /// Everything lost in the pretensioned strands since jacking
    pub fn pretension_losses(&self) -> f64 {
        self.initial_relaxation() + self.elastic_shortening() + self.pretension_time_dependent_losses()
    }

    pub fn total_losses(&self) -> f64 {
        self.initial_relaxation() + self.elastic_shortening() + self.time_dependent_losses()
    }

    /// Code articles behind the reported values
    pub fn code_references(&self) -> Vec<&'static str> {
        let mut refs = Vec::with_capacity(4);
        if !matches!(self.method, MethodLosses::GeneralLumpSum(_)) {
            refs.push(lrfd_ref::ELASTIC_SHORTENING);
        }
        refs.push(self.method.code_reference());
        if self.post_tension.is_some() {
            refs.push(lrfd_ref::FRICTION);
            refs.push(lrfd_ref::ANCHOR_SET);
        }
        refs
    }

    /// Stress at transfer does not vary along the girder
    pub fn is_constant_along_girder(&self) -> bool {
        self.elastic.is_constant_along_girder()
    }

    pub fn as_refined_2005(&self) -> Option<&Refined2005Losses> {
        match &self.method {
            MethodLosses::Refined2005(l) => Some(l),
            _ => None,
        }
    }

    pub fn refined_2005(&self) -> LossResult<&Refined2005Losses> {
        self.as_refined_2005()
            .ok_or_else(|| LossError::method_mismatch("Refined (2005)", self.method_name()))
    }

    pub fn as_refined_pre2005(&self) -> Option<&RefinedPre2005Losses> {
        match &self.method {
            MethodLosses::RefinedPre2005(l) => Some(l),
            _ => None,
        }
    }

    pub fn refined_pre2005(&self) -> LossResult<&RefinedPre2005Losses> {
        self.as_refined_pre2005()
            .ok_or_else(|| LossError::method_mismatch("Refined (pre-2005)", self.method_name()))
    }

    pub fn as_txdot_2013(&self) -> Option<&TxdotRefined2013Losses> {
        match &self.method {
            MethodLosses::TxdotRefined2013(l) => Some(l),
            _ => None,
        }
    }

    pub fn txdot_2013(&self) -> LossResult<&TxdotRefined2013Losses> {
        self.as_txdot_2013()
            .ok_or_else(|| LossError::method_mismatch("TxDOT Refined (2013)", self.method_name()))
    }

    pub fn as_approximate_lump_sum(&self) -> Option<&ApproximateLumpSumLosses> {
        match &self.method {
            MethodLosses::ApproximateLumpSum(l) => Some(l),
            _ => None,
        }
    }

    pub fn approximate_lump_sum(&self) -> LossResult<&ApproximateLumpSumLosses> {
        self.as_approximate_lump_sum()
            .ok_or_else(|| LossError::method_mismatch("Approximate", self.method_name()))
    }

    pub fn as_general_lump_sum(&self) -> Option<&GeneralLumpSumLosses> {
        match &self.method {
            MethodLosses::GeneralLumpSum(l) => Some(l),
            _ => None,
        }
    }

    pub fn general_lump_sum(&self) -> LossResult<&GeneralLumpSumLosses> {
        self.as_general_lump_sum()
            .ok_or_else(|| LossError::method_mismatch("General Lump Sum", self.method_name()))
    }
}

/// Ages bounding the phases of one segment (days)
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PhaseAges {
    /// Age at transfer
    pub ti: f64,
    /// Age at deck placement
    pub td: f64,
    /// Age at the end of the last interval
    pub tf: f64,
}

impl PhaseAges {
    pub fn validate(&self) -> LossResult<()> {
        if !(self.ti > 0.0 && self.ti <= self.td && self.td <= self.tf) {
            return Err(LossError::invalid_input(
                "concrete ages",
                format!("ti={}, td={}, tf={}", self.ti, self.td, self.tf),
                "Ages must satisfy 0 < ti <= td <= tf",
            ));
        }
        Ok(())
    }

    /// Time since transfer, held within the before-deck phase
    pub fn before_deck_duration(&self, t: f64) -> f64 {
        t.clamp(self.ti, self.td) - self.ti
    }

    /// Time since transfer, held within the after-deck phase
    pub fn after_deck_duration(&self, t: f64) -> f64 {
        t.clamp(self.td, self.tf) - self.ti
    }
}

#[cfg(test)]
pub(crate) fn test_inputs() -> crate::providers::LossInputs {
    use crate::providers::{DeckInputs, LossInputs};
    use crate::strands::{StrandMaterial, TemporaryStrandUsage};

    // AASHTO Type IV girder, 28 strands, 100 ft span at midspan
    LossInputs {
        strand: StrandMaterial::default(),
        aps_permanent_in2: 28.0 * 0.153,
        aps_temporary_in2: 0.0,
        fpj_permanent_ksi: 202.5,
        fpj_temporary_ksi: 0.0,
        temporary_usage: TemporaryStrandUsage::Pretensioned,
        e_permanent_in: 20.0,
        e_temporary_in: -20.0,
        e_permanent_composite_in: 35.0,
        ag_in2: 789.0,
        ig_in4: 260_730.0,
        ac_in2: 1_400.0,
        ic_in4: 600_000.0,
        girder_moment_kip_in: 12_330.0,
        noncomposite_dead_moment_kip_in: 12_000.0,
        composite_dead_moment_kip_in: 4_500.0,
        vs_ratio_in: 3.0,
        relative_humidity_pct: 75.0,
        fci_ksi: 5.5,
        fc_ksi: 7.0,
        eci_ksi: 4_268.0,
        ec_ksi: 4_815.0,
        deck: Some(DeckInputs {
            area_in2: 650.0,
            eccentricity_in: 25.0,
            fc_ksi: 4.0,
            ec_ksi: 3_640.0,
            vs_ratio_in: 4.0,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refined(creep: f64, shrink: f64, gain: f64, r1: f64, r2: f64) -> MethodLosses {
        MethodLosses::Refined2005(Refined2005Losses {
            creep_before_deck_ksi: creep,
            shrinkage_before_deck_ksi: shrink,
            deck_shrinkage_gain_ksi: gain,
            relaxation_before_deck_ksi: r1,
            relaxation_after_deck_ksi: r2,
            ..Default::default()
        })
    }

    fn details(method: MethodLosses) -> LossDetails {
        let mut es = ElasticShortening::none(crate::criteria::FcgpMethod::Iterative);
        es.delta_fpes_ksi = 12.0;
        es.initial_relaxation_ksi = 1.5;
        LossDetails::new(
            PoiId::new(),
            IntervalIndex(4),
            LossPhase::AfterDeck,
            2000.0,
            es,
            method,
            None,
        )
    }

    #[test]
    fn test_component_sum() {
        let d = details(refined(10.0, 5.0, 1.0, 1.2, 1.2));
        let sum = d.creep_losses()
            + d.shrinkage_losses()
            + d.relaxation_loss_before_deck()
            + d.relaxation_loss_after_deck()
            + d.lump_sum_losses();
        assert!((d.time_dependent_losses() - sum).abs() < 1e-12);
        assert!((d.time_dependent_losses() - 16.4).abs() < 1e-12);
        assert!((d.total_losses() - (1.5 + 12.0 + 16.4)).abs() < 1e-12);
    }

    #[test]
    fn test_narrowing_reports_mismatch() {
        let d = details(refined(1.0, 1.0, 0.0, 0.0, 0.0));
        assert!(d.as_refined_2005().is_some());
        assert!(d.as_txdot_2013().is_none());

        let err = d.txdot_2013().unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(err.error_code(), "METHOD_MISMATCH");
        assert!(err.to_string().contains("Refined (2005)"));
    }

    #[test]
    fn test_pre2005_folds_initial_relaxation() {
        let d = details(MethodLosses::RefinedPre2005(RefinedPre2005Losses {
            relaxation_before_deck_ksi: 1.5,
            ..Default::default()
        }));
        assert_eq!(d.initial_relaxation(), 0.0);
        assert!((d.pretension_losses() - 13.5).abs() < 1e-12);
    }

    #[test]
    fn test_lump_sum_counts_toward_time_dependent_loss() {
        let d = details(MethodLosses::GeneralLumpSum(GeneralLumpSumLosses {
            lump_before_deck_ksi: 10.0,
            lump_after_deck_ksi: 8.0,
            ..Default::default()
        }));
        assert_eq!(d.creep_losses(), 0.0);
        assert_eq!(d.lump_sum_losses(), 18.0);
        assert!((d.time_dependent_losses() - 18.0).abs() < 1e-12);
        assert!((d.pretension_losses() - (1.5 + 12.0 + 18.0)).abs() < 1e-12);
        assert!(d.general_lump_sum().is_ok());
        assert_eq!(d.approximate_lump_sum().unwrap_err().error_code(), "METHOD_MISMATCH");
        assert_eq!(d.code_references(), vec![lrfd_ref::GENERAL_LUMP_SUM]);
    }

    #[test]
    fn test_approximate_narrowing_and_references() {
        let d = details(MethodLosses::ApproximateLumpSum(ApproximateLumpSumLosses {
            lrfd_2005: true,
            lump_before_deck_ksi: 6.0,
            relaxation_before_deck_ksi: 1.0,
            ..Default::default()
        }));
        assert_eq!(d.method_name(), "Approximate (2005)");
        assert!(d.as_approximate_lump_sum().is_some());
        assert!(d.as_refined_2005().is_none());
        assert!((d.time_dependent_losses() - 7.0).abs() < 1e-12);
        assert_eq!(
            d.code_references(),
            vec![lrfd_ref::ELASTIC_SHORTENING, lrfd_ref::APPROXIMATE_2005]
        );
    }

    #[test]
    fn test_phase_durations() {
        let ages = PhaseAges { ti: 1.0, td: 90.0, tf: 2000.0 };
        assert!(ages.validate().is_ok());
        assert_eq!(ages.before_deck_duration(500.0), 89.0);
        assert_eq!(ages.after_deck_duration(30.0), 89.0);
        assert_eq!(ages.after_deck_duration(2000.0), 1999.0);
        assert!(PhaseAges { ti: 10.0, td: 5.0, tf: 20.0 }.validate().is_err());
    }
}
