//! Strand relaxation.

use crate::criteria::RelaxationMethod;
use crate::errors::{LossError, LossResult};
use crate::strands::StrandMaterial;

/// Intrinsic relaxation between jacking and `days` later:
/// log10(24t)/40 · (fpj/fpy - 0.55) · fpj (divisor 10 for stress-relieved).
///
/// Used for ΔfpR0 before transfer and for ΔfpR1 of the pre-2005 method.
pub fn intrinsic(strand: &StrandMaterial, fpj_ksi: f64, days: f64) -> LossResult<f64> {
    if fpj_ksi <= 0.0 {
        return Ok(0.0);
    }
    if fpj_ksi <= 0.5 * strand.fpu_ksi {
        return Err(LossError::calculation_failed(
            "Relaxation",
            format!("fpj does not exceed 0.5fpu (fpj = {:.2} ksi)", fpj_ksi),
        ));
    }
    let hours = 24.0 * days;
    if hours <= 1.0 {
        return Ok(0.0);
    }
    let stress_term = (fpj_ksi / strand.fpy_ksi() - 0.55).max(0.0);
    Ok(hours.log10() / strand.kind.intrinsic_relaxation_divisor() * stress_term * fpj_ksi)
}

/// Stress state a time-dependent relaxation estimate is evaluated from
#[derive(Debug, Clone, Copy)]
pub struct RelaxationState {
    /// Strand stress after transfer
    pub fpt_ksi: f64,
    /// Age at the end of the phase
    pub t_days: f64,
    /// Age at transfer
    pub ti_days: f64,
    /// Shrinkage plus creep loss of the phase
    pub shrinkage_and_creep_ksi: f64,
    pub kid: f64,
}

/// Relaxation over a phase per the selected estimate
pub fn time_dependent(
    method: RelaxationMethod,
    strand: &StrandMaterial,
    state: &RelaxationState,
    lump_sum_ksi: f64,
) -> LossResult<f64> {
    let fpt = state.fpt_ksi;
    if fpt <= 0.0 {
        return Ok(0.0);
    }
    let stress_term = (fpt / strand.fpy_ksi() - 0.55).max(0.0);
    match method {
        RelaxationMethod::Simplified => Ok(fpt / strand.kind.kl_simplified() * stress_term),
        RelaxationMethod::LumpSum => Ok(lump_sum_ksi),
        RelaxationMethod::Refined => {
            let log_ti = (24.0 * state.ti_days).log10();
            if log_ti <= 0.0 {
                return Err(LossError::calculation_failed(
                    "Relaxation",
                    format!("age at transfer too small ({:.3} days)", state.ti_days),
                ));
            }
            let log_t = (24.0 * state.t_days.max(state.ti_days)).log10();
            let restraint = (1.0 - 3.0 * state.shrinkage_and_creep_ksi / fpt).max(0.0);
            Ok(fpt * log_t / (strand.kind.kl_refined() * log_ti) * stress_term * restraint * state.kid)
        }
    }
}
