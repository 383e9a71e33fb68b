//! Core of a site-scale carbon budget model.
//!
//! The model tracks three stocks for a single forest or grassland site:
//! vegetation carbon, soil carbon and the cumulative net exchange with the atmosphere.
//! Stocks are integrated with a fixed annual forward-Euler step, driven by a linear
//! warming and precipitation-change scenario and a human-disturbance pressure.
//!
//! ```rust
//! use sitecarbon_core::parameters::ModelParameters;
//! use sitecarbon_core::simulator::{simulate, DEFAULT_HORIZON_YEARS};
//! use sitecarbon_core::site::SiteRecord;
//!
//! let site = SiteRecord::new("US-Ha1-F01")
//!     .with_climate(7.0, 1102.0, 1.0976)
//!     .with_production(1312.0, 2886.4)
//!     .with_initial_vegetation_carbon(13120.0)
//!     .with_soil_carbon_mean(6.3)
//!     .with_human_modification_index(0.1661);
//!
//! let run = simulate(&site, &ModelParameters::default(), DEFAULT_HORIZON_YEARS);
//! assert_eq!(run.len(), 51);
//! assert!((run[0].gpp - 2886.4).abs() < 1e-6);
//! ```

pub mod config;
pub mod constants;
pub mod drivers;
pub mod errors;
pub mod factors;
pub mod parameters;
pub mod simulator;
pub mod site;
pub mod timeseries;
