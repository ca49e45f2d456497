//! TxDOT refined method (2013 research report).
//!
//! Uses the LRFD 2005 creep and shrinkage model without the deck shrinkage
//! gain and without the after-deck Δfcd creep term. Total relaxation is
//! split evenly before and after deck placement. The elastic shortening
//! stress at transfer comes from the configured fcgp method.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::material::ConcreteTimeModel;
use super::relaxation::{self, RelaxationState};
use super::{ElasticShortening, LossPhase, PhaseAges};
use crate::criteria::{FcgpMethod, LossCriteria};
use crate::errors::LossResult;
use crate::providers::LossInputs;

/// Breakdown of the TxDOT 2013 refined method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TxdotRefined2013Losses {
    pub fcgp_method: FcgpMethod,
    pub kid: f64,
    pub kdf: f64,
    /// ΔfpR over the life of the girder
    pub total_relaxation_ksi: f64,
    pub shrinkage_before_deck_ksi: f64,
    pub creep_before_deck_ksi: f64,
    pub relaxation_before_deck_ksi: f64,
    pub shrinkage_after_deck_ksi: f64,
    pub creep_after_deck_ksi: f64,
    pub relaxation_after_deck_ksi: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct TxdotRefined2013 {
    fcgp_method: FcgpMethod,
    girder: ConcreteTimeModel,
    ages: PhaseAges,
    loading_age: f64,
    ep: f64,
    n_i: f64,
    fcgp: f64,
    creep_at_deck: f64,
    shrinkage_at_deck: f64,
    kid: f64,
    kdf: f64,
    relaxation: f64,
}

impl TxdotRefined2013 {
    pub fn prepare(
        criteria: &LossCriteria,
        inputs: &LossInputs,
        elastic: &ElasticShortening,
        ages: PhaseAges,
    ) -> LossResult<Self> {
        let girder = ConcreteTimeModel::new(inputs.vs_ratio_in, inputs.relative_humidity_pct, inputs.fci_ksi)?;
        let loading_age = criteria.adjusted_age_days(ages.ti);
        let dur_deck = ages.td - ages.ti;
        let dur_final = ages.tf - ages.ti;

        let ep = inputs.strand.ep_ksi;
        let n_i = ep / inputs.eci_ksi;
        let aps = inputs.aps_permanent_in2;
        let e = inputs.e_permanent_in;
        let epc = inputs.e_permanent_composite_in;

        let creep_final = girder.creep_coefficient(dur_final, loading_age);
        let kid = 1.0
            / (1.0
                + n_i * aps / inputs.ag_in2
                    * (1.0 + inputs.ag_in2 * e * e / inputs.ig_in4)
                    * (1.0 + 0.7 * creep_final));
        let kdf = 1.0
            / (1.0
                + n_i * aps / inputs.ac_in2
                    * (1.0 + inputs.ac_in2 * epc * epc / inputs.ic_in4)
                    * (1.0 + 0.7 * creep_final));

        let fcgp = elastic.fcgp_ksi;
        let shrinkage_final = girder.shrinkage_strain(dur_final) * ep * kid;
        let creep_total = n_i * fcgp * creep_final * kid;
        let relaxation = relaxation::time_dependent(
            criteria.relaxation_method,
            &inputs.strand,
            &RelaxationState {
                fpt_ksi: elastic.fpt_ksi,
                t_days: ages.tf,
                ti_days: ages.ti,
                shrinkage_and_creep_ksi: shrinkage_final + creep_total,
                kid,
            },
            criteria.lump_sum_relaxation_ksi,
        )?;

        Ok(TxdotRefined2013 {
            fcgp_method: elastic.method,
            girder,
            ages,
            loading_age,
            ep,
            n_i,
            fcgp,
            creep_at_deck: girder.creep_coefficient(dur_deck, loading_age),
            shrinkage_at_deck: girder.shrinkage_strain(dur_deck),
            kid,
            kdf,
            relaxation,
        })
    }

    pub fn at(&self, phase: LossPhase, t: f64) -> TxdotRefined2013Losses {
        let mut losses = TxdotRefined2013Losses {
            fcgp_method: self.fcgp_method,
            kid: self.kid,
            kdf: self.kdf,
            total_relaxation_ksi: self.relaxation,
            ..Default::default()
        };
        if phase == LossPhase::BeforeRelease {
            return losses;
        }

        let ages = &self.ages;
        let dur_deck = ages.td - ages.ti;
        let half = 0.5 * self.relaxation;
        let before = ages.before_deck_duration(t);
        losses.shrinkage_before_deck_ksi = self.girder.shrinkage_strain(before) * self.ep * self.kid;
        losses.creep_before_deck_ksi =
            self.n_i * self.fcgp * self.girder.creep_coefficient(before, self.loading_age) * self.kid;
        losses.relaxation_before_deck_ksi = half * self.girder.progression(0.0, dur_deck, before);

        if phase == LossPhase::AfterDeck {
            let after = ages.after_deck_duration(t);
            losses.shrinkage_after_deck_ksi =
                (self.girder.shrinkage_strain(after) - self.shrinkage_at_deck) * self.ep * self.kdf;
            let creep = self.n_i
                * self.fcgp
                * (self.girder.creep_coefficient(after, self.loading_age) - self.creep_at_deck)
                * self.kdf;
            if creep < 0.0 {
                warn!(creep_ksi = creep, age_days = t, "negative creep after deck placement taken as zero");
            }
            losses.creep_after_deck_ksi = creep.max(0.0);
            losses.relaxation_after_deck_ksi =
                half * self.girder.progression(dur_deck, ages.tf - ages.ti, after);
        }
        losses
    }
}
