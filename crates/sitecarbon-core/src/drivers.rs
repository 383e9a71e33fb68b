//! Climate driver trajectory
//!
//! Temperature and precipitation follow linear trends from the site's baseline climate.
//! Potential evapotranspiration grows proportionally with warming, so the effective
//! aridity index rises with wetter trends and falls with warmer ones.

use crate::constants::ModelConstants;
use crate::parameters::ModelParameters;
use crate::site::SiteRecord;
use crate::timeseries::FloatValue;

/// Climate drivers in effect during one simulated year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateDrivers {
    /// unit: °C
    pub temperature: FloatValue,
    /// unit: mm / yr
    pub precipitation: FloatValue,
    /// Precipitation relative to the site baseline
    pub precipitation_modifier: FloatValue,
    /// Potential evapotranspiration relative to the site baseline
    pub pet_modifier: FloatValue,
    /// Effective aridity index
    pub aridity_index: FloatValue,
    /// Warming since the start of the run
    /// unit: °C
    pub warming: FloatValue,
}

impl ClimateDrivers {
    /// Drivers for year offset `t` (0 for the first simulated year).
    ///
    /// $$T(t) = MAT + w t$$
    ///
    /// $$P(t) = MAP (1 + \frac{p}{100} t)$$
    ///
    /// $$AI(t) = AI_0 \frac{1 + \frac{p}{100} t}{1 + k_{PET} (T(t) - MAT)}$$
    pub fn at_year(
        site: &SiteRecord,
        params: &ModelParameters,
        constants: &ModelConstants,
        t: u32,
    ) -> Self {
        let t = t as FloatValue;
        let temperature = site.mean_annual_temperature + params.warming_rate * t;
        let precipitation_modifier = 1.0 + (params.precipitation_change / 100.0) * t;
        let precipitation = site.mean_annual_precipitation * precipitation_modifier;

        let warming = temperature - site.mean_annual_temperature;
        let pet_modifier = 1.0 + constants.pet_sensitivity * warming;
        let aridity_index = site.aridity_index * (precipitation_modifier / pet_modifier);

        Self {
            temperature,
            precipitation,
            precipitation_modifier,
            pet_modifier,
            aridity_index,
            warming,
        }
    }
}
