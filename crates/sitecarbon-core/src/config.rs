//! Scenario configuration
//!
//! A scenario bundles one site, a parameter set and run settings in a TOML document:
//!
//! ```toml
//! horizon_years = 50
//! preset = "high_warming"
//!
//! [site]
//! id = "US-Ha1-F01"
//! MAT = 7.0
//! MAP = 1102
//! AridityIndex = 1.0976
//! HMI = 0.1661
//! NPP = 1312
//! SoilC_mean = 6.3
//!
//! [parameters]
//! kSoil = 0.04
//! ```
//!
//! Missing site fields receive the same substitutes the ingestion layer documents for
//! incomplete site tables, so a scenario file and a parsed table row yield the same record.

use crate::constants::ModelConstants;
use crate::errors::{SiteCarbonError, SiteCarbonResult};
use crate::parameters::{ModelParameters, ParameterId, ParameterPreset};
use crate::simulator::{Simulator, DEFAULT_HORIZON_YEARS, DEFAULT_START_YEAR};
use crate::site::{Habitat, SiteRecord};
use crate::timeseries::{FloatValue, Year};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Substitute mean annual temperature (°C)
pub const DEFAULT_MAT: FloatValue = 15.0;
/// Substitute mean annual precipitation (mm)
pub const DEFAULT_MAP: FloatValue = 1000.0;
/// Substitute soil organic carbon proxy
pub const DEFAULT_SOC: FloatValue = 50.0;
/// Substitute NPP when it is missing or not positive
pub const DEFAULT_NPP: FloatValue = 500.0;
/// GPP is approximated as this multiple of NPP when not observed
pub const GPP_TO_NPP_RATIO: FloatValue = 2.2;
/// Initial vegetation carbon is approximated as this multiple of NPP when not given
pub const VEGETATION_TO_NPP_RATIO: FloatValue = 10.0;
/// Substitute aridity index
pub const DEFAULT_ARIDITY_INDEX: FloatValue = 1.0;

fn default_horizon_years() -> u32 {
    DEFAULT_HORIZON_YEARS
}

fn default_start_year() -> Year {
    DEFAULT_START_YEAR
}

/// Site table row with optional fields.
///
/// Field aliases accept the column names of common site tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(alias = "Site")]
    pub id: String,
    #[serde(default, alias = "Lat")]
    pub latitude: Option<FloatValue>,
    #[serde(default, alias = "Lon")]
    pub longitude: Option<FloatValue>,
    #[serde(default, alias = "Habitat")]
    pub habitat: Option<Habitat>,
    #[serde(default, alias = "MAT")]
    pub mean_annual_temperature: Option<FloatValue>,
    #[serde(default, alias = "MAP")]
    pub mean_annual_precipitation: Option<FloatValue>,
    #[serde(default, alias = "AridityIndex", alias = "AI")]
    pub aridity_index: Option<FloatValue>,
    #[serde(default, alias = "HMI", alias = "gHM")]
    pub human_modification_index: Option<FloatValue>,
    #[serde(default, alias = "NPP")]
    pub observed_npp: Option<FloatValue>,
    #[serde(default, alias = "GPP")]
    pub observed_gpp: Option<FloatValue>,
    #[serde(default, alias = "Cveg_initial")]
    pub initial_vegetation_carbon: Option<FloatValue>,
    #[serde(default, alias = "SoilC_mean")]
    pub soil_carbon_mean: Option<FloatValue>,
    #[serde(default, alias = "SOC")]
    pub soil_organic_carbon: Option<FloatValue>,
    #[serde(default, alias = "Elevation")]
    pub elevation: Option<FloatValue>,
}

impl SiteConfig {
    /// Fill missing fields with their documented substitutes.
    ///
    /// - NPP that is missing or not positive becomes [`DEFAULT_NPP`]
    /// - GPP defaults to [`GPP_TO_NPP_RATIO`] × NPP
    /// - initial vegetation carbon defaults to [`VEGETATION_TO_NPP_RATIO`] × NPP
    /// - a missing or zero mean soil carbon takes the soil organic carbon value when that is
    ///   positive
    pub fn resolve(&self) -> SiteRecord {
        let npp = self
            .observed_npp
            .filter(|npp| *npp > 0.0)
            .unwrap_or(DEFAULT_NPP);
        let soil_organic_carbon = self.soil_organic_carbon.unwrap_or(DEFAULT_SOC);
        let soil_carbon_mean = match self.soil_carbon_mean.unwrap_or(0.0) {
            mean if mean == 0.0 && soil_organic_carbon > 0.0 => soil_organic_carbon,
            mean => mean,
        };

        SiteRecord {
            id: self.id.clone(),
            latitude: self.latitude.unwrap_or(0.0),
            longitude: self.longitude.unwrap_or(0.0),
            habitat: self.habitat.clone().unwrap_or_default(),
            mean_annual_temperature: self.mean_annual_temperature.unwrap_or(DEFAULT_MAT),
            mean_annual_precipitation: self.mean_annual_precipitation.unwrap_or(DEFAULT_MAP),
            aridity_index: self.aridity_index.unwrap_or(DEFAULT_ARIDITY_INDEX),
            human_modification_index: self.human_modification_index.unwrap_or(0.0),
            observed_npp: npp,
            observed_gpp: self.observed_gpp.unwrap_or(npp * GPP_TO_NPP_RATIO),
            initial_vegetation_carbon: self
                .initial_vegetation_carbon
                .unwrap_or(npp * VEGETATION_TO_NPP_RATIO),
            soil_carbon_mean,
            soil_organic_carbon,
            elevation: self.elevation.unwrap_or(0.0),
        }
    }
}

/// A complete scenario: site, parameters and run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub site: SiteConfig,
    /// Base parameter set; the classic values when absent
    #[serde(default)]
    pub preset: Option<ParameterPreset>,
    /// Overrides applied on top of the preset, keyed by parameter key or field name
    #[serde(default)]
    pub parameters: BTreeMap<ParameterId, FloatValue>,
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,
    #[serde(default = "default_start_year")]
    pub start_year: Year,
    #[serde(default)]
    pub constants: ModelConstants,
}

impl ScenarioConfig {
    pub fn from_toml_str(contents: &str) -> SiteCarbonResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SiteCarbonResult<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| SiteCarbonError::ScenarioIo {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&contents)
    }

    /// Site record with missing fields substituted
    pub fn site(&self) -> SiteRecord {
        self.site.resolve()
    }

    /// Preset parameters with the scenario overrides applied
    pub fn parameters(&self) -> ModelParameters {
        let base = self.preset.unwrap_or(ParameterPreset::Classic).parameters();
        self.parameters
            .iter()
            .fold(base, |params, (id, value)| params.with_override(*id, *value))
    }

    pub fn simulator(&self) -> Simulator {
        Simulator::from_constants(self.constants.clone()).with_start_year(self.start_year)
    }
}
