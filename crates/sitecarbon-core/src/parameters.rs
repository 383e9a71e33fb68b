//! Model parameters
//!
//! Physiological parameters and the climate forcing scenario for one simulation run.
//! Each field is independently tunable; there are no cross-field invariants.

use crate::errors::{SiteCarbonError, SiteCarbonResult};
use crate::timeseries::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parameter set for a single run.
///
/// A run never mutates its parameters. Variants of a parameter set are derived with
/// [`ModelParameters::with_override`], which leaves the original untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    /// Light-use efficiency ceiling (εmax)
    /// unit: gC / MJ PAR
    /// default: 1.1
    #[serde(alias = "epsilonMax")]
    pub light_use_efficiency: FloatValue,

    /// Temperature sensitivity coefficient (Q10)
    /// unit: dimensionless
    /// default: 2.0
    #[serde(alias = "Q10")]
    pub q10: FloatValue,

    /// Fraction of GPP lost to autotrophic respiration (αRa)
    /// default: 0.53, so NPP ≈ 0.47 GPP
    #[serde(alias = "alphaRa")]
    pub respiration_fraction: FloatValue,

    /// Litterfall turnover rate of the vegetation stock (kLit)
    /// unit: 1 / yr
    /// default: 0.15
    #[serde(alias = "kLit")]
    pub litterfall_rate: FloatValue,

    /// Soil decomposition rate (kSoil)
    /// unit: 1 / yr
    /// default: 0.03
    #[serde(alias = "kSoil")]
    pub soil_decomposition_rate: FloatValue,

    /// Human-disturbance coefficient (h), scaled by the site HMI
    /// unit: 1 / yr
    /// default: 0.01
    #[serde(alias = "h_human")]
    pub human_disturbance: FloatValue,

    /// Linear warming trend of the forcing scenario
    /// unit: °C / yr
    /// default: 0.0
    #[serde(alias = "warmingRate")]
    pub warming_rate: FloatValue,

    /// Linear precipitation trend of the forcing scenario
    /// unit: % / yr
    /// default: 0.0
    #[serde(alias = "precipChange")]
    pub precipitation_change: FloatValue,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            light_use_efficiency: 1.1,
            q10: 2.0,
            respiration_fraction: 0.53,
            litterfall_rate: 0.15,
            soil_decomposition_rate: 0.03,
            human_disturbance: 0.01,
            warming_rate: 0.0,
            precipitation_change: 0.0,
        }
    }
}

impl ModelParameters {
    /// Value of a single parameter.
    pub fn get(&self, id: ParameterId) -> FloatValue {
        match id {
            ParameterId::LightUseEfficiency => self.light_use_efficiency,
            ParameterId::TemperatureSensitivity => self.q10,
            ParameterId::RespirationFraction => self.respiration_fraction,
            ParameterId::LitterfallRate => self.litterfall_rate,
            ParameterId::SoilDecompositionRate => self.soil_decomposition_rate,
            ParameterId::HumanDisturbance => self.human_disturbance,
            ParameterId::WarmingRate => self.warming_rate,
            ParameterId::PrecipitationChange => self.precipitation_change,
        }
    }

    /// A copy of these parameters with one field replaced.
    pub fn with_override(&self, id: ParameterId, value: FloatValue) -> Self {
        let mut updated = *self;
        match id {
            ParameterId::LightUseEfficiency => updated.light_use_efficiency = value,
            ParameterId::TemperatureSensitivity => updated.q10 = value,
            ParameterId::RespirationFraction => updated.respiration_fraction = value,
            ParameterId::LitterfallRate => updated.litterfall_rate = value,
            ParameterId::SoilDecompositionRate => updated.soil_decomposition_rate = value,
            ParameterId::HumanDisturbance => updated.human_disturbance = value,
            ParameterId::WarmingRate => updated.warming_rate = value,
            ParameterId::PrecipitationChange => updated.precipitation_change = value,
        }
        updated
    }

    /// Parameters lying outside their documented range.
    ///
    /// Advisory only: runs accept any finite value and the behaviour outside these
    /// ranges is simply not characterised.
    pub fn out_of_range(&self) -> Vec<ParameterId> {
        ParameterId::ALL
            .iter()
            .copied()
            .filter(|id| {
                let (min, max) = id.documented_range();
                let value = self.get(*id);
                value < min || value > max
            })
            .collect()
    }
}

/// Identifies one field of [`ModelParameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParameterId {
    LightUseEfficiency,
    TemperatureSensitivity,
    RespirationFraction,
    LitterfallRate,
    SoilDecompositionRate,
    HumanDisturbance,
    WarmingRate,
    PrecipitationChange,
}

impl ParameterId {
    pub const ALL: [ParameterId; 8] = [
        ParameterId::LightUseEfficiency,
        ParameterId::TemperatureSensitivity,
        ParameterId::RespirationFraction,
        ParameterId::LitterfallRate,
        ParameterId::SoilDecompositionRate,
        ParameterId::HumanDisturbance,
        ParameterId::WarmingRate,
        ParameterId::PrecipitationChange,
    ];

    /// Short key used on the wire and in parameter tables
    pub fn key(&self) -> &'static str {
        match self {
            ParameterId::LightUseEfficiency => "epsilonMax",
            ParameterId::TemperatureSensitivity => "Q10",
            ParameterId::RespirationFraction => "alphaRa",
            ParameterId::LitterfallRate => "kLit",
            ParameterId::SoilDecompositionRate => "kSoil",
            ParameterId::HumanDisturbance => "h_human",
            ParameterId::WarmingRate => "warmingRate",
            ParameterId::PrecipitationChange => "precipChange",
        }
    }

    /// Field name in [`ModelParameters`]
    pub fn field_name(&self) -> &'static str {
        match self {
            ParameterId::LightUseEfficiency => "light_use_efficiency",
            ParameterId::TemperatureSensitivity => "q10",
            ParameterId::RespirationFraction => "respiration_fraction",
            ParameterId::LitterfallRate => "litterfall_rate",
            ParameterId::SoilDecompositionRate => "soil_decomposition_rate",
            ParameterId::HumanDisturbance => "human_disturbance",
            ParameterId::WarmingRate => "warming_rate",
            ParameterId::PrecipitationChange => "precipitation_change",
        }
    }

    /// Human readable label for reports
    pub fn label(&self) -> &'static str {
        match self {
            ParameterId::LightUseEfficiency => "εmax (light-use efficiency)",
            ParameterId::TemperatureSensitivity => "Q10 (temperature sensitivity)",
            ParameterId::RespirationFraction => "αRa (autotrophic respiration fraction)",
            ParameterId::LitterfallRate => "kLit (litterfall rate)",
            ParameterId::SoilDecompositionRate => "kSoil (soil decomposition rate)",
            ParameterId::HumanDisturbance => "h (human disturbance coefficient)",
            ParameterId::WarmingRate => "warming rate (°C/yr)",
            ParameterId::PrecipitationChange => "precipitation change (%/yr)",
        }
    }

    /// Inclusive (min, max) range over which the model has been exercised.
    pub fn documented_range(&self) -> (FloatValue, FloatValue) {
        match self {
            ParameterId::LightUseEfficiency => (0.1, 2.5),
            ParameterId::TemperatureSensitivity => (1.0, 3.5),
            ParameterId::RespirationFraction => (0.2, 0.8),
            ParameterId::LitterfallRate => (0.0, 1.0),
            ParameterId::SoilDecompositionRate => (0.0, 0.5),
            ParameterId::HumanDisturbance => (0.0, 0.1),
            ParameterId::WarmingRate => (-0.1, 0.2),
            ParameterId::PrecipitationChange => (-2.0, 2.0),
        }
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for ParameterId {
    type Err = SiteCarbonError;

    /// Accepts either the short key (`kSoil`) or the field name (`soil_decomposition_rate`).
    fn from_str(s: &str) -> SiteCarbonResult<Self> {
        let s = s.trim();
        ParameterId::ALL
            .iter()
            .copied()
            .find(|id| id.key() == s || id.field_name() == s)
            .ok_or_else(|| {
                let expected: Vec<&str> = ParameterId::ALL.iter().map(|id| id.key()).collect();
                SiteCarbonError::UnknownParameter(s.to_string(), expected.join(", "))
            })
    }
}

impl TryFrom<String> for ParameterId {
    type Error = SiteCarbonError;

    fn try_from(value: String) -> SiteCarbonResult<Self> {
        value.parse()
    }
}

impl From<ParameterId> for String {
    fn from(value: ParameterId) -> Self {
        value.key().to_string()
    }
}

/// Named parameter sets for common scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterPreset {
    /// Literature values with no climate trend
    Classic,
    /// High-emission pathway: ~4 °C over 50 years with a drying trend
    HighWarming,
    /// Strong logging and degradation pressure
    HighDisturbance,
}

impl ParameterPreset {
    pub fn parameters(&self) -> ModelParameters {
        let classic = ModelParameters::default();
        match self {
            ParameterPreset::Classic => classic,
            ParameterPreset::HighWarming => ModelParameters {
                warming_rate: 0.08,
                q10: 2.2,
                precipitation_change: -0.5,
                ..classic
            },
            ParameterPreset::HighDisturbance => ModelParameters {
                human_disturbance: 0.08,
                light_use_efficiency: 0.9,
                ..classic
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParameterPreset::Classic => "Classic literature values",
            ParameterPreset::HighWarming => "High emissions (RCP 8.5)",
            ParameterPreset::HighDisturbance => "Strong human disturbance (logging/degradation)",
        }
    }
}

impl FromStr for ParameterPreset {
    type Err = SiteCarbonError;

    fn from_str(s: &str) -> SiteCarbonResult<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "classic" => Ok(ParameterPreset::Classic),
            "high_warming" => Ok(ParameterPreset::HighWarming),
            "high_disturbance" => Ok(ParameterPreset::HighDisturbance),
            _ => Err(SiteCarbonError::UnknownPreset(s.to_string())),
        }
    }
}
