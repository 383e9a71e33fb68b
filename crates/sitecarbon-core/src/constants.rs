//! Named model constants
//!
//! Fixed coefficients of the regulatory functions and of stock initialisation.
//! They are passed explicitly to every function that uses them so each can be tested
//! and overridden without touching the integration loop.

use crate::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Constants shared by the driver, regulatory-factor and initialisation functions.
///
/// # Regulatory factors
///
/// $$f_T = Q_{10}^{(T - T_{ref}) / 10}$$
///
/// $$f_W = \min(1, \max(f_{W,min}, AI / AI_{opt}))$$
///
/// $$f_{W,soil} = \min(1, \max(f_{W,soil,min}, AI))$$
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConstants {
    /// Reference temperature at which the temperature factor equals one
    /// unit: °C
    /// default: 10.0
    pub reference_temperature: FloatValue,

    /// Aridity index above which photosynthesis is not water limited
    /// unit: dimensionless
    /// default: 1.5
    pub optimum_aridity: FloatValue,

    /// Base of the supralinear heat penalty on autotrophic respiration
    /// unit: dimensionless, raised to the warming since the start of the run (°C)
    /// default: 1.05
    pub heat_penalty_base: FloatValue,

    /// Lower clamp of the photosynthesis water factor
    /// default: 0.1
    pub photosynthesis_water_floor: FloatValue,

    /// Lower clamp of the decomposition water factor.
    ///
    /// Decomposition tolerates drier conditions than photosynthesis before it is
    /// floor-limited, hence the lower floor.
    /// default: 0.05
    pub decomposition_water_floor: FloatValue,

    /// Upper clamp of both water factors
    /// default: 1.0
    pub water_factor_ceiling: FloatValue,

    /// Proportional growth of potential evapotranspiration per degree of warming
    /// unit: 1 / °C
    /// default: 0.02
    pub pet_sensitivity: FloatValue,

    /// Conversion applied to a site's mean soil carbon when it is reported.
    ///
    /// Heuristic unit conversion, not a validated one.
    /// default: 10.0
    pub soil_carbon_mean_factor: FloatValue,

    /// Conversion applied to the coarse soil organic carbon proxy when no mean soil
    /// carbon is reported.
    ///
    /// Heuristic unit conversion, not a validated one.
    /// default: 20.0
    pub soc_proxy_factor: FloatValue,

    /// Absorbed-radiation capacity used when it cannot be back-solved from observed GPP
    /// default: 1000.0
    pub fallback_capacity: FloatValue,
}

impl Default for ModelConstants {
    fn default() -> Self {
        Self {
            reference_temperature: 10.0,
            optimum_aridity: 1.5,
            heat_penalty_base: 1.05,
            photosynthesis_water_floor: 0.1,
            decomposition_water_floor: 0.05,
            water_factor_ceiling: 1.0,
            pet_sensitivity: 0.02,
            soil_carbon_mean_factor: 10.0,
            soc_proxy_factor: 20.0,
            fallback_capacity: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let constants = ModelConstants::default();
        assert_eq!(constants.reference_temperature, 10.0);
        assert_eq!(constants.optimum_aridity, 1.5);
        assert_eq!(constants.heat_penalty_base, 1.05);
        assert_eq!(constants.photosynthesis_water_floor, 0.1);
        assert_eq!(constants.decomposition_water_floor, 0.05);
        assert!(constants.decomposition_water_floor < constants.photosynthesis_water_floor);
    }

    #[test]
    fn test_partial_deserialization() {
        let json = r#"{"optimum_aridity": 2.0}"#;
        let constants: ModelConstants =
            serde_json::from_str(json).expect("Partial deserialization failed");

        assert_eq!(constants.optimum_aridity, 2.0);
        assert_eq!(constants.reference_temperature, 10.0);
        assert_eq!(constants.fallback_capacity, 1000.0);
    }
}
