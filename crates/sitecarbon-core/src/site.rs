//! Site record
//!
//! Immutable description of one study site as delivered by the ingestion layer.
//! All fields are expected to be finite with missing values already substituted;
//! the model does not re-validate them.

use crate::constants::ModelConstants;
use crate::timeseries::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad vegetation class of a site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Habitat {
    #[default]
    Forest,
    Grassland,
    Other(String),
}

impl Habitat {
    /// Single-letter code used in site tables
    pub fn code(&self) -> &str {
        match self {
            Habitat::Forest => "F",
            Habitat::Grassland => "G",
            Habitat::Other(code) => code.as_str(),
        }
    }
}

impl From<String> for Habitat {
    fn from(value: String) -> Self {
        match value.trim() {
            "F" | "f" | "Forest" | "forest" => Habitat::Forest,
            "G" | "g" | "Grassland" | "grassland" => Habitat::Grassland,
            other => Habitat::Other(other.to_string()),
        }
    }
}

impl From<Habitat> for String {
    fn from(value: Habitat) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for Habitat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Habitat::Forest => write!(f, "Forest"),
            Habitat::Grassland => write!(f, "Grassland"),
            Habitat::Other(code) => write!(f, "{}", code),
        }
    }
}

/// Observations and initial conditions for a single site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    /// Site identifier
    pub id: String,
    /// unit: decimal degrees
    pub latitude: FloatValue,
    /// unit: decimal degrees
    pub longitude: FloatValue,
    pub habitat: Habitat,
    /// Mean annual temperature (MAT)
    /// unit: °C
    pub mean_annual_temperature: FloatValue,
    /// Mean annual precipitation (MAP)
    /// unit: mm / yr
    pub mean_annual_precipitation: FloatValue,
    /// Precipitation to potential evapotranspiration ratio
    /// unit: dimensionless
    pub aridity_index: FloatValue,
    /// Human modification index, 0 (pristine) to 1 (maximally altered)
    pub human_modification_index: FloatValue,
    /// Observed net primary production
    /// unit: gC / m^2 / yr
    pub observed_npp: FloatValue,
    /// Observed gross primary production
    /// unit: gC / m^2 / yr
    pub observed_gpp: FloatValue,
    /// Initial vegetation carbon stock
    /// unit: gC / m^2
    pub initial_vegetation_carbon: FloatValue,
    /// Mean soil carbon. Zero when not reported.
    pub soil_carbon_mean: FloatValue,
    /// Coarse soil organic carbon proxy, used when `soil_carbon_mean` is not reported
    pub soil_organic_carbon: FloatValue,
    /// unit: m
    pub elevation: FloatValue,
}

impl SiteRecord {
    /// Create an empty site record with the given identifier.
    ///
    /// All numeric fields start at zero and the habitat is forest.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            latitude: 0.0,
            longitude: 0.0,
            habitat: Habitat::Forest,
            mean_annual_temperature: 0.0,
            mean_annual_precipitation: 0.0,
            aridity_index: 0.0,
            human_modification_index: 0.0,
            observed_npp: 0.0,
            observed_gpp: 0.0,
            initial_vegetation_carbon: 0.0,
            soil_carbon_mean: 0.0,
            soil_organic_carbon: 0.0,
            elevation: 0.0,
        }
    }

    pub fn with_location(self, latitude: FloatValue, longitude: FloatValue) -> Self {
        Self {
            latitude,
            longitude,
            ..self
        }
    }

    pub fn with_habitat(self, habitat: Habitat) -> Self {
        Self { habitat, ..self }
    }

    /// Set mean annual temperature (°C), precipitation (mm) and aridity index.
    pub fn with_climate(
        self,
        mean_annual_temperature: FloatValue,
        mean_annual_precipitation: FloatValue,
        aridity_index: FloatValue,
    ) -> Self {
        Self {
            mean_annual_temperature,
            mean_annual_precipitation,
            aridity_index,
            ..self
        }
    }

    /// Set observed NPP and GPP.
    pub fn with_production(self, observed_npp: FloatValue, observed_gpp: FloatValue) -> Self {
        Self {
            observed_npp,
            observed_gpp,
            ..self
        }
    }

    pub fn with_initial_vegetation_carbon(self, initial_vegetation_carbon: FloatValue) -> Self {
        Self {
            initial_vegetation_carbon,
            ..self
        }
    }

    pub fn with_soil_carbon_mean(self, soil_carbon_mean: FloatValue) -> Self {
        Self {
            soil_carbon_mean,
            ..self
        }
    }

    pub fn with_soil_organic_carbon(self, soil_organic_carbon: FloatValue) -> Self {
        Self {
            soil_organic_carbon,
            ..self
        }
    }

    pub fn with_human_modification_index(self, human_modification_index: FloatValue) -> Self {
        Self {
            human_modification_index,
            ..self
        }
    }

    pub fn with_elevation(self, elevation: FloatValue) -> Self {
        Self { elevation, ..self }
    }

    /// Initial soil carbon stock.
    ///
    /// Uses the reported mean soil carbon scaled by
    /// [`ModelConstants::soil_carbon_mean_factor`] when it is positive, otherwise the soil
    /// organic carbon proxy scaled by [`ModelConstants::soc_proxy_factor`].
    /// Both conversions are approximations of unknown input units.
    pub fn initial_soil_carbon(&self, constants: &ModelConstants) -> FloatValue {
        if self.soil_carbon_mean > 0.0 {
            self.soil_carbon_mean * constants.soil_carbon_mean_factor
        } else {
            self.soil_organic_carbon * constants.soc_proxy_factor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn test_initial_soil_carbon_prefers_mean() {
        let site = SiteRecord::new("A")
            .with_soil_carbon_mean(6.3)
            .with_soil_organic_carbon(3.46);
        let constants = ModelConstants::default();

        assert!(is_close!(site.initial_soil_carbon(&constants), 63.0));
    }

    #[test]
    fn test_initial_soil_carbon_falls_back_to_proxy() {
        let site = SiteRecord::new("A").with_soil_organic_carbon(3.46);
        let constants = ModelConstants::default();

        assert!(is_close!(site.initial_soil_carbon(&constants), 69.2));
    }

    #[test]
    fn test_initial_soil_carbon_uses_constants() {
        let site = SiteRecord::new("A").with_soil_carbon_mean(2.0);
        let constants = ModelConstants {
            soil_carbon_mean_factor: 3.0,
            ..ModelConstants::default()
        };

        assert!(is_close!(site.initial_soil_carbon(&constants), 6.0));
    }

    #[test]
    fn test_habitat_codes() {
        assert_eq!(Habitat::from("F".to_string()), Habitat::Forest);
        assert_eq!(Habitat::from("G".to_string()), Habitat::Grassland);
        assert_eq!(
            Habitat::from("W".to_string()),
            Habitat::Other("W".to_string())
        );
        assert_eq!(Habitat::Grassland.code(), "G");
    }

    #[test]
    fn test_serialization() {
        let site = SiteRecord::new("DE-Hai-F01")
            .with_habitat(Habitat::Grassland)
            .with_climate(7.49, 870.0, 1.0923);
        let json = serde_json::to_string(&site).expect("Serialization failed");
        assert!(json.contains(r#""habitat":"G""#));

        let parsed: SiteRecord = serde_json::from_str(&json).expect("Deserialization failed");
        assert_eq!(parsed, site);
    }
}
