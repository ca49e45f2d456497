//! Refined estimate of time-dependent losses as published through the 2004
//! third edition (also the TxDOT 2004 method).
//!
//! ```text
//! ΔfpSR = 17.0 - 0.150·H
//! ΔfpCR = 12·fcgp - 7·Δfcdp  >= 0
//! ΔfpR1 = log10(24t)/40·(fpj/fpy - 0.55)·fpj
//! ΔfpR2 = 0.3·[20.0 - 0.4·ΔfpES - 0.2·(ΔfpSR + ΔfpCR)]
//! ```
//!
//! The code gives only final values. A configurable share of shrinkage and
//! creep is placed before deck placement and each phase develops with the
//! concrete time-development factor.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::material::ConcreteTimeModel;
use super::relaxation;
use super::{ElasticShortening, LossPhase, PhaseAges};
use crate::criteria::LossCriteria;
use crate::errors::LossResult;
use crate::providers::LossInputs;
use crate::strands::StrandKind;

/// Breakdown of the pre-2005 refined method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RefinedPre2005Losses {
    /// Final ΔfpSR
    pub shrinkage_final_ksi: f64,
    /// Final ΔfpCR
    pub creep_final_ksi: f64,
    /// Concrete stress change at the strands from permanent loads after transfer
    pub delta_fcdp_ksi: f64,
    pub before_deck_fraction: f64,
    pub shrinkage_before_deck_ksi: f64,
    pub creep_before_deck_ksi: f64,
    /// ΔfpR1, complete at transfer
    pub relaxation_before_deck_ksi: f64,
    pub shrinkage_after_deck_ksi: f64,
    pub creep_after_deck_ksi: f64,
    pub relaxation_after_deck_ksi: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct RefinedPre2005 {
    time: ConcreteTimeModel,
    ages: PhaseAges,
    fraction: f64,
    shrinkage: f64,
    creep: f64,
    delta_fcdp: f64,
    r1: f64,
    r2: f64,
}

impl RefinedPre2005 {
    pub fn prepare(
        criteria: &LossCriteria,
        inputs: &LossInputs,
        elastic: &ElasticShortening,
        ages: PhaseAges,
    ) -> LossResult<Self> {
        let time = ConcreteTimeModel::new(inputs.vs_ratio_in, inputs.relative_humidity_pct, inputs.fci_ksi)?;
        let e = inputs.e_permanent_in;
        let delta_fcdp = inputs.noncomposite_dead_moment_kip_in * e / inputs.ig_in4
            + inputs.composite_dead_moment_kip_in * inputs.e_permanent_composite_in / inputs.ic_in4;

        let shrinkage = (17.0 - 0.150 * inputs.relative_humidity_pct).max(0.0);
        let creep = 12.0 * elastic.fcgp_ksi - 7.0 * delta_fcdp;
        if creep < 0.0 {
            warn!(creep_ksi = creep, delta_fcdp_ksi = delta_fcdp, "negative creep loss taken as zero");
        }
        let creep = creep.max(0.0);
        let r1 = relaxation::intrinsic(&inputs.strand, inputs.fpj_permanent_ksi, ages.ti)?;

        let stress_relieved = 20.0 - 0.4 * elastic.delta_fpes_ksi - 0.2 * (shrinkage + creep);
        let r2 = match inputs.strand.kind {
            StrandKind::LowRelaxation => 0.3 * stress_relieved,
            StrandKind::StressRelieved => stress_relieved,
        }
        .max(0.0);

        Ok(RefinedPre2005 {
            time,
            ages,
            fraction: criteria.pre2005_before_deck_fraction,
            shrinkage,
            creep,
            delta_fcdp,
            r1,
            r2,
        })
    }

    pub fn at(&self, phase: LossPhase, t: f64) -> RefinedPre2005Losses {
        let mut losses = RefinedPre2005Losses {
            shrinkage_final_ksi: self.shrinkage,
            creep_final_ksi: self.creep,
            delta_fcdp_ksi: self.delta_fcdp,
            before_deck_fraction: self.fraction,
            ..Default::default()
        };
        if phase == LossPhase::BeforeRelease {
            return losses;
        }

        let ages = &self.ages;
        let dur_deck = ages.td - ages.ti;
        let developed = self.time.progression(0.0, dur_deck, ages.before_deck_duration(t));
        losses.shrinkage_before_deck_ksi = self.fraction * self.shrinkage * developed;
        losses.creep_before_deck_ksi = self.fraction * self.creep * developed;
        losses.relaxation_before_deck_ksi = self.r1;

        if phase == LossPhase::AfterDeck {
            let developed = self
                .time
                .progression(dur_deck, ages.tf - ages.ti, ages.after_deck_duration(t));
            let rest = 1.0 - self.fraction;
            losses.shrinkage_after_deck_ksi = rest * self.shrinkage * developed;
            losses.creep_after_deck_ksi = rest * self.creep * developed;
            losses.relaxation_after_deck_ksi = self.r2 * developed;
        }
        losses
    }
}
