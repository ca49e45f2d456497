//! # loss_core - Prestress Loss Engine
//!
//! `loss_core` computes prestress losses in precast and spliced girders
//! across a bridge's construction intervals. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Read-only collaborators**: geometry, section properties and the
//!   construction sequence come in through traits in [`providers`]
//! - **Typed results**: loss details are a sum type over the loss methods,
//!   narrowed with `Option`/`Result` accessors
//! - **Rich Errors**: Structured error types, not just strings
//! - **Explicit caches**: persisted and design losses live in owned memo tables
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use loss_core::{BeamType, GirderModel, IntervalSelector, LossEngineer};
//!
//! let model = Rc::new(GirderModel::default());
//! let mut engineer = LossEngineer::new(BeamType::IBeam, Rc::downgrade(&model)).unwrap();
//!
//! let losses = engineer
//!     .get_losses(&model.pois()[5], IntervalSelector::AllIntervals)
//!     .unwrap();
//! let json = serde_json::to_string_pretty(&*losses).unwrap();
//! assert!(json.contains("Refined2005"));
//! ```
//!
//! ## Modules
//!
//! - [`engineer`] - Loss engineer facade and pretension stress queries
//! - [`strategy`] - Method selection and series evaluation
//! - [`losses`] - Elastic shortening, refined and lump-sum methods, post-tensioning
//! - [`cache`] - Persisted and design loss caches
//! - [`intervals`] - Interval indices and the interval authority
//! - [`providers`] - Collaborator traits
//! - [`model`] - Reference girder implementing every collaborator
//! - [`errors`] - Structured error types

pub mod cache;
pub mod config;
pub mod criteria;
pub mod engineer;
pub mod errors;
pub mod intervals;
pub mod losses;
pub mod model;
pub mod poi;
pub mod pretension;
pub mod providers;
pub mod report;
pub mod strands;
pub mod strategy;

#[cfg(test)]
mod test_support;

// Re-export commonly used types at crate root for convenience
pub use config::{GirderConfiguration, StrandGroup};
pub use criteria::LossCriteria;
pub use engineer::LossEngineer;
pub use errors::{LossError, LossResult};
pub use intervals::{IntervalIndex, IntervalSelector, ResultsType};
pub use losses::{LossDetails, MethodLosses};
pub use model::GirderModel;
pub use poi::{PoiId, PointOfInterest, SegmentKey};
pub use strategy::{BeamType, StrategyKind};
