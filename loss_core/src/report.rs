//! # Loss Reporting
//!
//! Reporting collaborators receive computed losses read-only through
//! [`LossReporter`]. [`LossTableReporter`] collects serde rows for a summary
//! table; table layout and rendering belong to the caller.

use serde::{Deserialize, Serialize};

use crate::errors::LossResult;
use crate::losses::{LossDetails, MethodLosses};
use crate::poi::PointOfInterest;

/// Consumer of computed losses
pub trait LossReporter {
    /// Losses at one POI for the requested interval
    fn report_losses(&mut self, poi: &PointOfInterest, details: &LossDetails) -> LossResult<()>;

    /// Final losses at one POI
    fn report_final_losses(&mut self, poi: &PointOfInterest, details: &LossDetails) -> LossResult<()> {
        self.report_losses(poi, details)
    }
}

/// One line of a loss summary table (ksi unless noted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossSummaryRow {
    pub location: String,
    pub dist_from_start_ft: f64,
    pub interval: usize,
    pub method: String,
    /// Omitted when the stress at transfer is constant along the girder
    pub fpt_ksi: Option<f64>,
    pub initial_relaxation_ksi: f64,
    pub elastic_shortening_ksi: f64,
    pub creep_ksi: f64,
    pub shrinkage_ksi: f64,
    pub relaxation_before_deck_ksi: f64,
    pub relaxation_after_deck_ksi: f64,
    /// Long-term loss of the lump-sum methods
    pub lump_sum_ksi: f64,
    pub friction_ksi: f64,
    pub anchor_set_ksi: f64,
    pub time_dependent_ksi: f64,
    pub total_ksi: f64,
    /// Transformed section coefficients of the methods that use them
    pub kid: Option<f64>,
    pub kdf: Option<f64>,
    /// Code articles behind the values
    pub references: Vec<String>,
}

impl LossSummaryRow {
    pub fn new(poi: &PointOfInterest, details: &LossDetails) -> Self {
        let (kid, kdf) = match &details.method {
            MethodLosses::Refined2005(l) => (Some(l.kid), Some(l.kdf)),
            MethodLosses::TxdotRefined2013(l) => (Some(l.kid), Some(l.kdf)),
            MethodLosses::RefinedPre2005(_)
            | MethodLosses::ApproximateLumpSum(_)
            | MethodLosses::GeneralLumpSum(_) => (None, None),
        };
        LossSummaryRow {
            location: poi.segment().to_string(),
            dist_from_start_ft: poi.dist_from_start_ft(),
            interval: details.interval.0,
            method: details.method_name().to_string(),
            fpt_ksi: (!details.is_constant_along_girder()).then_some(details.elastic.fpt_ksi),
            initial_relaxation_ksi: details.initial_relaxation(),
            elastic_shortening_ksi: details.elastic_shortening(),
            creep_ksi: details.creep_losses(),
            shrinkage_ksi: details.shrinkage_losses(),
            relaxation_before_deck_ksi: details.relaxation_loss_before_deck(),
            relaxation_after_deck_ksi: details.relaxation_loss_after_deck(),
            lump_sum_ksi: details.lump_sum_losses(),
            friction_ksi: details.friction_loss(),
            anchor_set_ksi: details.anchor_set_loss(),
            time_dependent_ksi: details.time_dependent_losses(),
            total_ksi: details.total_losses(),
            kid,
            kdf,
            references: details.code_references().into_iter().map(String::from).collect(),
        }
    }
}

/// Collects summary rows for interval and final loss reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LossTableReporter {
    pub rows: Vec<LossSummaryRow>,
    pub final_rows: Vec<LossSummaryRow>,
    /// Stress at transfer when it is the same at every POI
    pub constant_fpt_ksi: Option<f64>,
}

impl LossTableReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn note_constant(&mut self, details: &LossDetails) {
        if details.is_constant_along_girder() && self.constant_fpt_ksi.is_none() {
            self.constant_fpt_ksi = Some(details.elastic.fpt_ksi);
        }
    }
}

impl LossReporter for LossTableReporter {
    fn report_losses(&mut self, poi: &PointOfInterest, details: &LossDetails) -> LossResult<()> {
        self.note_constant(details);
        self.rows.push(LossSummaryRow::new(poi, details));
        Ok(())
    }

    fn report_final_losses(&mut self, poi: &PointOfInterest, details: &LossDetails) -> LossResult<()> {
        self.note_constant(details);
        self.final_rows.push(LossSummaryRow::new(poi, details));
        Ok(())
    }
}
