//! Regulatory factors
//!
//! Dimensionless multipliers that scale production and decomposition with temperature
//! and moisture. Clamps are applied as `max(floor)` followed by `min(ceiling)`, so a NaN
//! input resolves to the floor instead of propagating.

use crate::constants::ModelConstants;
use crate::drivers::ClimateDrivers;
use crate::parameters::ModelParameters;
use crate::timeseries::FloatValue;

/// Q10 temperature response, one at the reference temperature.
///
/// $$f_T = Q_{10}^{(T - T_{ref}) / 10}$$
pub fn temperature_factor(
    temperature: FloatValue,
    q10: FloatValue,
    constants: &ModelConstants,
) -> FloatValue {
    q10.powf((temperature - constants.reference_temperature) / 10.0)
}

/// Moisture limitation of photosynthesis.
///
/// $$f_W = \min(1, \max(f_{W,min}, AI / AI_{opt}))$$
pub fn photosynthesis_water_factor(
    aridity_index: FloatValue,
    constants: &ModelConstants,
) -> FloatValue {
    (aridity_index / constants.optimum_aridity)
        .max(constants.photosynthesis_water_floor)
        .min(constants.water_factor_ceiling)
}

/// Moisture limitation of soil decomposition.
///
/// $$f_{W,soil} = \min(1, \max(f_{W,soil,min}, AI))$$
pub fn decomposition_water_factor(
    aridity_index: FloatValue,
    constants: &ModelConstants,
) -> FloatValue {
    aridity_index
        .max(constants.decomposition_water_floor)
        .min(constants.water_factor_ceiling)
}

/// Extra autotrophic respiration with warming since the start of the run.
///
/// $$p = b^{\Delta T}$$
pub fn heat_penalty(warming: FloatValue, constants: &ModelConstants) -> FloatValue {
    constants.heat_penalty_base.powf(warming)
}

/// All regulatory factors in effect for one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegulatoryFactors {
    /// Shared by photosynthesis and decomposition
    pub temperature: FloatValue,
    pub water_photosynthesis: FloatValue,
    pub water_decomposition: FloatValue,
    pub heat_penalty: FloatValue,
}

impl RegulatoryFactors {
    pub fn evaluate(
        drivers: &ClimateDrivers,
        params: &ModelParameters,
        constants: &ModelConstants,
    ) -> Self {
        Self {
            temperature: temperature_factor(drivers.temperature, params.q10, constants),
            water_photosynthesis: photosynthesis_water_factor(drivers.aridity_index, constants),
            water_decomposition: decomposition_water_factor(drivers.aridity_index, constants),
            heat_penalty: heat_penalty(drivers.warming, constants),
        }
    }
}
