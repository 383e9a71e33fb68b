//! Site-scale carbon budget model with one-at-a-time sensitivity analysis.
//!
//! This crate re-exports the model core and the sensitivity analyzer so downstream users
//! depend on a single package.
//!
//! ```rust
//! use sitecarbon::prelude::*;
//!
//! let site = SiteRecord::new("FR-Hes-F01")
//!     .with_climate(9.21, 800.0, 0.9121)
//!     .with_production(2253.0, 4956.6)
//!     .with_initial_vegetation_carbon(22530.0)
//!     .with_soil_carbon_mean(6.3)
//!     .with_human_modification_index(0.1154);
//! let params = ParameterPreset::HighWarming.parameters();
//!
//! let run = simulate(&site, &params, DEFAULT_HORIZON_YEARS);
//! let results = analyze_sensitivity(&site, &params);
//! assert_eq!(results.len(), 4);
//! assert_eq!(results[0].baseline, run.final_total_storage());
//! ```

pub use sitecarbon_core::{
    config, constants, drivers, errors, factors, parameters, simulator, site, timeseries,
};
pub use sitecarbon_sensitivity as sensitivity;

/// Commonly used types and entry points
pub mod prelude {
    pub use sitecarbon_core::config::ScenarioConfig;
    pub use sitecarbon_core::errors::{SiteCarbonError, SiteCarbonResult};
    pub use sitecarbon_core::parameters::{ModelParameters, ParameterId, ParameterPreset};
    pub use sitecarbon_core::simulator::{simulate, Simulator, DEFAULT_HORIZON_YEARS};
    pub use sitecarbon_core::site::{Habitat, SiteRecord};
    pub use sitecarbon_core::timeseries::{SimulationRun, SimulationStep};
    pub use sitecarbon_sensitivity::{
        analyze_sensitivity, rank_by_impact, Deviation, SensitivityAnalyzer, SensitivityResult,
    };
}
