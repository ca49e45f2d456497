//! # Girder Configuration
//!
//! The strand layout and concrete strengths a loss evaluation runs against.
//! The project supplies the persisted configuration for each segment; design
//! iteration builds trial configurations and evaluates them through the
//! design-loss cache without touching the project.
//!
//! Two configurations are the same trial when they compare equal field by
//! field. The design cache relies on that equality.
//!
//! ## Example
//!
//! ```rust
//! use loss_core::config::{GirderConfiguration, StrandGroup};
//! use loss_core::strands::StrandType;
//!
//! let mut trial = GirderConfiguration::default();
//! trial.straight = StrandGroup::new(24, 24.0 * 0.153 * 202.5);
//! assert_eq!(trial.group(StrandType::Straight).count, 24);
//! assert!(trial.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{LossError, LossResult};
use crate::strands::{StrandType, TemporaryStrandUsage};

/// Count and total jacking force of one strand group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct StrandGroup {
    pub count: usize,
    /// Total jacking force of the group (kip)
    pub jacking_force_kip: f64,
}

impl StrandGroup {
    pub fn new(count: usize, jacking_force_kip: f64) -> Self {
        StrandGroup {
            count,
            jacking_force_kip,
        }
    }

    /// Jacking stress for the given per-strand area, zero for an empty group
    pub fn jacking_stress_ksi(&self, strand_area_in2: f64) -> f64 {
        let aps = self.count as f64 * strand_area_in2;
        if self.count == 0 || aps <= 0.0 {
            0.0
        } else {
            self.jacking_force_kip / aps
        }
    }
}

/// Strand layout and concrete strengths of one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GirderConfiguration {
    pub straight: StrandGroup,
    pub harped: StrandGroup,
    pub temporary: StrandGroup,
    #[serde(default)]
    pub temporary_usage: TemporaryStrandUsage,
    /// Concrete strength at release
    pub fci_ksi: f64,
    /// 28-day concrete strength
    pub fc_ksi: f64,
}

impl Default for GirderConfiguration {
    fn default() -> Self {
        // 0.75 fpu on 0.5" grade 270 strand
        let per_strand = 0.75 * 270.0 * 0.153;
        GirderConfiguration {
            straight: StrandGroup::new(20, 20.0 * per_strand),
            harped: StrandGroup::new(8, 8.0 * per_strand),
            temporary: StrandGroup::default(),
            temporary_usage: TemporaryStrandUsage::Pretensioned,
            fci_ksi: 5.5,
            fc_ksi: 7.0,
        }
    }
}

impl GirderConfiguration {
    pub fn group(&self, strand_type: StrandType) -> &StrandGroup {
        match strand_type {
            StrandType::Straight => &self.straight,
            StrandType::Harped => &self.harped,
            StrandType::Temporary => &self.temporary,
        }
    }

    pub fn group_mut(&mut self, strand_type: StrandType) -> &mut StrandGroup {
        match strand_type {
            StrandType::Straight => &mut self.straight,
            StrandType::Harped => &mut self.harped,
            StrandType::Temporary => &mut self.temporary,
        }
    }

    /// Straight plus harped strand count
    pub fn permanent_strand_count(&self) -> usize {
        self.straight.count + self.harped.count
    }

    /// Validate input parameters.
    pub fn validate(&self) -> LossResult<()> {
        if self.fci_ksi <= 0.0 {
            return Err(LossError::invalid_input(
                "fci_ksi",
                self.fci_ksi.to_string(),
                "Release strength must be positive",
            ));
        }
        if self.fc_ksi < self.fci_ksi {
            return Err(LossError::invalid_input(
                "fc_ksi",
                self.fc_ksi.to_string(),
                "28-day strength cannot be less than release strength",
            ));
        }
        for strand_type in StrandType::ALL {
            let group = self.group(strand_type);
            if group.jacking_force_kip < 0.0 {
                return Err(LossError::invalid_input(
                    format!("{}.jacking_force_kip", strand_type.display_name().to_lowercase()),
                    group.jacking_force_kip.to_string(),
                    "Jacking force cannot be negative",
                ));
            }
            if group.count == 0 && group.jacking_force_kip > 0.0 {
                return Err(LossError::invalid_input(
                    format!("{}.count", strand_type.display_name().to_lowercase()),
                    "0",
                    "A jacking force was given for an empty strand group",
                ));
            }
        }
        Ok(())
    }
}
