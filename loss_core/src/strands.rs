//! # Prestressing Strand
//!
//! Strand types tracked independently by the loss engine and the strand
//! material properties the loss formulas consume.
//!
//! ## Reference
//!
//! AASHTO LRFD 5.4.4 (prestressing steel) and Table 5.9.2.2-1 (fpy).

use serde::{Deserialize, Serialize};

/// Strand group within a pretensioned segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrandType {
    Straight,
    Harped,
    /// Temporary top strands, removed during construction
    Temporary,
}

impl StrandType {
    /// All strand types in reporting order
    pub const ALL: [StrandType; 3] = [StrandType::Straight, StrandType::Harped, StrandType::Temporary];

    /// Straight and harped strands remain for the life of the girder
    pub fn is_permanent(&self) -> bool {
        !matches!(self, StrandType::Temporary)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StrandType::Straight => "Straight",
            StrandType::Harped => "Harped",
            StrandType::Temporary => "Temporary",
        }
    }
}

impl std::fmt::Display for StrandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Relaxation class of the strand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StrandKind {
    #[default]
    LowRelaxation,
    StressRelieved,
}

impl StrandKind {
    pub const ALL: [StrandKind; 2] = [StrandKind::LowRelaxation, StrandKind::StressRelieved];

    /// fpy / fpu per LRFD Table 5.9.2.2-1
    pub fn yield_ratio(&self) -> f64 {
        match self {
            StrandKind::LowRelaxation => 0.90,
            StrandKind::StressRelieved => 0.85,
        }
    }

    /// K'L for the refined relaxation estimate (LRFD C5.9.5.4.2c-1)
    pub fn kl_refined(&self) -> f64 {
        match self {
            StrandKind::LowRelaxation => 45.0,
            StrandKind::StressRelieved => 10.0,
        }
    }

    /// KL for the simplified relaxation estimate (LRFD 5.9.5.4.2c-1)
    pub fn kl_simplified(&self) -> f64 {
        match self {
            StrandKind::LowRelaxation => 30.0,
            StrandKind::StressRelieved => 7.0,
        }
    }

    /// Denominator of the intrinsic relaxation term log(24t)/K (40 or 10)
    pub fn intrinsic_relaxation_divisor(&self) -> f64 {
        match self {
            StrandKind::LowRelaxation => 40.0,
            StrandKind::StressRelieved => 10.0,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StrandKind::LowRelaxation => "Low Relaxation",
            StrandKind::StressRelieved => "Stress Relieved",
        }
    }
}

/// Strand material used by every strand group of a segment.
///
/// ## JSON Example
///
/// ```json
/// { "fpu_ksi": 270.0, "kind": "LowRelaxation", "ep_ksi": 28500.0, "area_in2": 0.153 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrandMaterial {
    /// Ultimate tensile strength
    pub fpu_ksi: f64,
    pub kind: StrandKind,
    /// Modulus of elasticity
    pub ep_ksi: f64,
    /// Nominal area of one strand
    pub area_in2: f64,
}

impl Default for StrandMaterial {
    /// Grade 270 low-relaxation 0.5" strand
    fn default() -> Self {
        StrandMaterial {
            fpu_ksi: 270.0,
            kind: StrandKind::LowRelaxation,
            ep_ksi: 28500.0,
            area_in2: 0.153,
        }
    }
}

impl StrandMaterial {
    /// Yield strength fpy
    pub fn fpy_ksi(&self) -> f64 {
        self.kind.yield_ratio() * self.fpu_ksi
    }

    /// Total area of `count` strands
    pub fn total_area_in2(&self, count: usize) -> f64 {
        count as f64 * self.area_in2
    }
}

/// How temporary strands are installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TemporaryStrandUsage {
    /// Pretensioned with the permanent strands; participate in elastic shortening
    #[default]
    Pretensioned,
    /// Post-tensioned after release; do not shorten the girder at transfer
    PostTensioned,
}
