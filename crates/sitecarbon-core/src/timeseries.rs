//! Simulation output
//!
//! A run produces one [`SimulationStep`] per simulated year. Steps carry every flux and
//! regulatory factor of that year so consumers never need to recompute anything.

use crate::simulator::CarbonStocks;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::ops::Index;

pub type FloatValue = f64;

/// Calendar year
pub type Year = i32;

/// State and fluxes of one simulated year.
///
/// Stocks are the values after the year's update has been applied.
/// Serialised field names match the column names used by export and charting layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationStep {
    pub year: Year,
    /// Driven temperature
    /// unit: °C
    #[serde(rename = "temp")]
    pub temperature: FloatValue,
    /// Driven precipitation
    /// unit: mm / yr
    #[serde(rename = "precip")]
    pub precipitation: FloatValue,
    /// unit: gC / m^2 / yr
    #[serde(rename = "GPP")]
    pub gpp: FloatValue,
    /// unit: gC / m^2 / yr
    #[serde(rename = "NPP")]
    pub npp: FloatValue,
    /// Autotrophic respiration
    /// unit: gC / m^2 / yr
    #[serde(rename = "Ra")]
    pub autotrophic_respiration: FloatValue,
    /// Heterotrophic respiration
    /// unit: gC / m^2 / yr
    #[serde(rename = "Rh")]
    pub heterotrophic_respiration: FloatValue,
    /// unit: gC / m^2 / yr
    #[serde(rename = "Litter")]
    pub litterfall: FloatValue,
    /// Carbon removed from vegetation by human disturbance
    /// unit: gC / m^2 / yr
    #[serde(rename = "H")]
    pub human_extraction: FloatValue,
    /// unit: gC / m^2
    #[serde(rename = "Cveg")]
    pub vegetation_carbon: FloatValue,
    /// unit: gC / m^2
    #[serde(rename = "Csoil")]
    pub soil_carbon: FloatValue,
    /// Net ecosystem-to-atmosphere exchange accumulated since the start of the run.
    /// Negative values mean the site has been a net sink.
    /// unit: gC / m^2
    #[serde(rename = "Catm_accumulated")]
    pub cumulative_exchange: FloatValue,
    /// Temperature factor
    #[serde(rename = "fT")]
    pub temperature_factor: FloatValue,
    /// Photosynthesis water factor
    #[serde(rename = "fW")]
    pub water_factor: FloatValue,
}

impl SimulationStep {
    /// Vegetation plus soil carbon
    pub fn total_storage(&self) -> FloatValue {
        self.vegetation_carbon + self.soil_carbon
    }

    pub fn value(&self, field: StepField) -> FloatValue {
        match field {
            StepField::Year => self.year as FloatValue,
            StepField::Temperature => self.temperature,
            StepField::Precipitation => self.precipitation,
            StepField::Gpp => self.gpp,
            StepField::Npp => self.npp,
            StepField::AutotrophicRespiration => self.autotrophic_respiration,
            StepField::HeterotrophicRespiration => self.heterotrophic_respiration,
            StepField::Litterfall => self.litterfall,
            StepField::HumanExtraction => self.human_extraction,
            StepField::VegetationCarbon => self.vegetation_carbon,
            StepField::SoilCarbon => self.soil_carbon,
            StepField::CumulativeExchange => self.cumulative_exchange,
            StepField::TemperatureFactor => self.temperature_factor,
            StepField::WaterFactor => self.water_factor,
            StepField::TotalStorage => self.total_storage(),
        }
    }
}

/// Selects one series out of a [`SimulationRun`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepField {
    Year,
    Temperature,
    Precipitation,
    Gpp,
    Npp,
    AutotrophicRespiration,
    HeterotrophicRespiration,
    Litterfall,
    HumanExtraction,
    VegetationCarbon,
    SoilCarbon,
    CumulativeExchange,
    TemperatureFactor,
    WaterFactor,
    TotalStorage,
}

/// Ordered, immutable sequence of simulated years.
///
/// Also keeps the stocks the run started from, which no step records since every step
/// holds the stocks after its update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    initial: CarbonStocks,
    steps: Vec<SimulationStep>,
}

impl SimulationRun {
    pub fn new(initial: CarbonStocks, steps: Vec<SimulationStep>) -> Self {
        Self { initial, steps }
    }

    /// Stocks before the first annual update
    pub fn initial(&self) -> &CarbonStocks {
        &self.initial
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[SimulationStep] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&SimulationStep> {
        self.steps.get(index)
    }

    pub fn first(&self) -> Option<&SimulationStep> {
        self.steps.first()
    }

    pub fn last(&self) -> Option<&SimulationStep> {
        self.steps.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimulationStep> {
        self.steps.iter()
    }

    /// Vegetation plus soil carbon at the end of the final year.
    ///
    /// Zero for an empty run.
    pub fn final_total_storage(&self) -> FloatValue {
        self.last().map_or(0.0, SimulationStep::total_storage)
    }

    /// Extract a single series, e.g. for plotting
    pub fn column(&self, field: StepField) -> Array1<FloatValue> {
        self.steps.iter().map(|step| step.value(field)).collect()
    }

    /// Headline numbers of the run. `None` for an empty run.
    pub fn summary(&self) -> Option<RunSummary> {
        let first = self.first()?;
        let last = self.last()?;

        Some(RunSummary {
            first_year: first.year,
            final_year: last.year,
            initial_vegetation_carbon: self.initial.vegetation,
            initial_soil_carbon: self.initial.soil,
            initial_total_storage: self.initial.total_storage(),
            final_vegetation_carbon: last.vegetation_carbon,
            final_soil_carbon: last.soil_carbon,
            final_total_storage: last.total_storage(),
            total_storage_change: last.total_storage() - self.initial.total_storage(),
            cumulative_exchange: last.cumulative_exchange,
            net_sink: last.cumulative_exchange < 0.0,
        })
    }

    pub fn into_steps(self) -> Vec<SimulationStep> {
        self.steps
    }
}

impl Index<usize> for SimulationRun {
    type Output = SimulationStep;

    fn index(&self, index: usize) -> &Self::Output {
        &self.steps[index]
    }
}

impl<'a> IntoIterator for &'a SimulationRun {
    type Item = &'a SimulationStep;
    type IntoIter = std::slice::Iter<'a, SimulationStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Headline numbers of a run.
///
/// Storage change and cumulative exchange both span the whole run, from the initial stocks
/// to the end of the final year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub first_year: Year,
    pub final_year: Year,
    pub initial_vegetation_carbon: FloatValue,
    pub initial_soil_carbon: FloatValue,
    pub initial_total_storage: FloatValue,
    pub final_vegetation_carbon: FloatValue,
    pub final_soil_carbon: FloatValue,
    pub final_total_storage: FloatValue,
    pub total_storage_change: FloatValue,
    pub cumulative_exchange: FloatValue,
    /// Whether the site took up more carbon than it released over the run
    pub net_sink: bool,
}
