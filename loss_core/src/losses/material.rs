//! Creep and shrinkage of concrete (LRFD 5.4.2.3).
//!
//! ```text
//! k_s  = max(1.45 - 0.13 V/S, 1.0)
//! k_hs = 2.00 - 0.014 H          k_hc = 1.56 - 0.008 H
//! k_f  = 5 / (1 + f'ci)          k_td = t / (61 - 4 f'ci + t)
//! ψ(t, ti) = 1.9 k_s k_hc k_f k_td ti^-0.118
//! ε_sh     = k_s k_hs k_f k_td 0.48e-3
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{LossError, LossResult};

/// Correction factors of one concrete placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ConcreteTimeModel {
    pub ks: f64,
    pub khs: f64,
    pub khc: f64,
    pub kf: f64,
    /// Strength governing the time-development factor
    pub fci_ksi: f64,
}

impl ConcreteTimeModel {
    pub fn new(vs_ratio_in: f64, relative_humidity_pct: f64, fci_ksi: f64) -> LossResult<Self> {
        // k_td denominator must stay positive
        if fci_ksi <= 0.0 || fci_ksi >= 15.25 {
            return Err(LossError::calculation_failed(
                "Creep and shrinkage",
                format!("concrete strength out of range (f'ci = {:.2} ksi)", fci_ksi),
            ));
        }
        Ok(ConcreteTimeModel {
            ks: (1.45 - 0.13 * vs_ratio_in).max(1.0),
            khs: 2.00 - 0.014 * relative_humidity_pct,
            khc: 1.56 - 0.008 * relative_humidity_pct,
            kf: 5.0 / (1.0 + fci_ksi),
            fci_ksi,
        })
    }

    /// Time development factor for a duration in days
    pub fn ktd(&self, duration_days: f64) -> f64 {
        if duration_days <= 0.0 {
            return 0.0;
        }
        duration_days / (61.0 - 4.0 * self.fci_ksi + duration_days)
    }

    /// Creep coefficient after `duration_days` under load applied at `loading_age_days`
    pub fn creep_coefficient(&self, duration_days: f64, loading_age_days: f64) -> f64 {
        if duration_days <= 0.0 || loading_age_days <= 0.0 {
            return 0.0;
        }
        1.9 * self.ks * self.khc * self.kf * self.ktd(duration_days) * loading_age_days.powf(-0.118)
    }

    /// Shrinkage strain accumulated over `duration_days`
    pub fn shrinkage_strain(&self, duration_days: f64) -> f64 {
        self.ks * self.khs * self.kf * self.ktd(duration_days) * 0.48e-3
    }

    /// Share of a phase running from `start` to `end` (durations since
    /// release) that has developed by `t`, following k_td
    pub fn progression(&self, start: f64, end: f64, t: f64) -> f64 {
        let t = t.clamp(start, end);
        let span = self.ktd(end) - self.ktd(start);
        if span <= f64::EPSILON {
            return if t >= end { 1.0 } else { 0.0 };
        }
        ((self.ktd(t) - self.ktd(start)) / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn girder() -> ConcreteTimeModel {
        ConcreteTimeModel::new(3.0, 75.0, 5.0).unwrap()
    }

    #[test]
    fn test_correction_factors() {
        let m = girder();
        assert_relative_eq!(m.ks, 1.06, epsilon = 1e-12);
        assert_relative_eq!(m.khs, 0.95, epsilon = 1e-12);
        assert_relative_eq!(m.khc, 0.96, epsilon = 1e-12);
        assert_relative_eq!(m.kf, 5.0 / 6.0, epsilon = 1e-12);
        // small members bottom out at 1.0
        assert_eq!(ConcreteTimeModel::new(8.0, 75.0, 5.0).unwrap().ks, 1.0);
    }

    #[test]
    fn test_time_development() {
        let m = girder();
        assert_eq!(m.ktd(0.0), 0.0);
        assert_relative_eq!(m.ktd(41.0), 0.5, epsilon = 1e-12);
        assert!(m.ktd(20000.0) > 0.99);
    }

    #[test]
    fn test_creep_grows_with_time() {
        let m = girder();
        let early = m.creep_coefficient(30.0, 1.0);
        let late = m.creep_coefficient(20000.0, 1.0);
        assert!(early > 0.0 && late > early);
        // later loading creeps less
        assert!(m.creep_coefficient(20000.0, 90.0) < late);
    }

    #[test]
    fn test_progression_bounds() {
        let m = girder();
        assert_eq!(m.progression(0.0, 90.0, 0.0), 0.0);
        assert_eq!(m.progression(0.0, 90.0, 90.0), 1.0);
        assert_eq!(m.progression(0.0, 90.0, 500.0), 1.0);
        let mid = m.progression(0.0, 90.0, 30.0);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_strength_out_of_range() {
        let err = ConcreteTimeModel::new(3.0, 75.0, 16.0).unwrap_err();
        assert_eq!(err.error_code(), "CALCULATION_FAILED");
    }
}
