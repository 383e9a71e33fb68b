//! One-at-a-time parameter sensitivity for sitecarbon runs.
//!
//! Each tracked parameter is perturbed down and up while every other parameter keeps its
//! baseline value. Every perturbed run is a complete, independent simulation, and each is
//! reduced to its final total carbon storage (vegetation + soil). Results report the
//! percentage deviation of those totals from the baseline run, which is what a tornado
//! chart displays.
//!
//! ```rust
//! use sitecarbon_core::parameters::ModelParameters;
//! use sitecarbon_core::site::SiteRecord;
//! use sitecarbon_sensitivity::{analyze_sensitivity, rank_by_impact};
//!
//! let site = SiteRecord::new("FR-Hes-F01")
//!     .with_climate(9.21, 800.0, 0.9121)
//!     .with_production(2253.0, 4956.6)
//!     .with_initial_vegetation_carbon(22530.0)
//!     .with_soil_carbon_mean(6.3)
//!     .with_human_modification_index(0.1154);
//!
//! let mut results = analyze_sensitivity(&site, &ModelParameters::default());
//! assert_eq!(results.len(), 4);
//!
//! rank_by_impact(&mut results);
//! println!("Most influential: {}", results[0].label);
//! ```

pub mod analyzer;
pub mod perturbation;
pub mod result;

pub use analyzer::{analyze_sensitivity, SensitivityAnalyzer, DEFAULT_TRACKED_PARAMETERS};
pub use perturbation::{Direction, Perturbation};
pub use result::{rank_by_impact, Deviation, SensitivityResult};
