//! Three-stock carbon simulator
//!
//! Integrates vegetation carbon, soil carbon and the cumulative atmospheric exchange of a
//! single site with a fixed one-year forward-Euler step.
//!
//! # Flows
//!
//! ```text
//!              GPP                    litterfall
//! Atmosphere -----> [VEGETATION] -----------------> [SOIL]
//!     ^                 |     |                        |
//!     |        Ra       |     | human extraction       | Rh
//!     +-----------------+     v                        |
//!     +------------------------------------------------+
//! ```
//!
//! # Differences from a full ecosystem model
//!
//! - **Explicit Euler only**: no adaptive or implicit integration. Stiffness effects of large
//!   turnover rates or large Q10 values are understated, which is accepted at annual resolution.
//! - **Stock clamp**: stocks are floored at zero after each update without adjusting the
//!   fluxes, so mass balance can be violated in pathological parameter regimes.
//! - **Single temperature response**: photosynthesis and decomposition share the same Q10.

use crate::constants::ModelConstants;
use crate::drivers::ClimateDrivers;
use crate::factors::{photosynthesis_water_factor, temperature_factor, RegulatoryFactors};
use crate::parameters::ModelParameters;
use crate::site::SiteRecord;
use crate::timeseries::{FloatValue, SimulationRun, SimulationStep, Year};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Number of years simulated after the initial year when no horizon is given
pub const DEFAULT_HORIZON_YEARS: u32 = 50;

/// Calendar year of the first simulated step
pub const DEFAULT_START_YEAR: Year = 2000;

/// Carbon stocks carried from one year to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarbonStocks {
    /// unit: gC / m^2
    pub vegetation: FloatValue,
    /// unit: gC / m^2
    pub soil: FloatValue,
    /// Net ecosystem-to-atmosphere exchange since the start of the run
    /// unit: gC / m^2
    pub cumulative_exchange: FloatValue,
}

impl CarbonStocks {
    /// Stocks at the start of a run
    pub fn initial(site: &SiteRecord, constants: &ModelConstants) -> Self {
        Self {
            vegetation: site.initial_vegetation_carbon,
            soil: site.initial_soil_carbon(constants),
            cumulative_exchange: 0.0,
        }
    }

    pub fn total_storage(&self) -> FloatValue {
        self.vegetation + self.soil
    }
}

/// Fluxes of one year.
///
/// unit: gC / m^2 / yr
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarbonFluxes {
    pub gpp: FloatValue,
    pub autotrophic_respiration: FloatValue,
    pub npp: FloatValue,
    pub litterfall: FloatValue,
    pub heterotrophic_respiration: FloatValue,
    pub human_extraction: FloatValue,
}

impl CarbonFluxes {
    /// Stocks after applying these fluxes for one year, floored at zero.
    ///
    /// $$C_{veg}' = \max(0, C_{veg} + NPP - L - H)$$
    ///
    /// $$C_{soil}' = \max(0, C_{soil} + L - R_h)$$
    ///
    /// $$C_{atm}' = C_{atm} + R_a + R_h - GPP$$
    pub fn apply(&self, stocks: &CarbonStocks) -> CarbonStocks {
        let d_vegetation = self.npp - self.litterfall - self.human_extraction;
        let d_soil = self.litterfall - self.heterotrophic_respiration;
        let d_exchange = self.autotrophic_respiration + self.heterotrophic_respiration - self.gpp;

        CarbonStocks {
            vegetation: (stocks.vegetation + d_vegetation).max(0.0),
            soil: (stocks.soil + d_soil).max(0.0),
            cumulative_exchange: stocks.cumulative_exchange + d_exchange,
        }
    }
}

/// Forward-Euler integrator for the three-stock model.
///
/// A simulator holds configuration only; each call to [`Simulator::run`] is a pure function
/// of its arguments and identical inputs give bit-for-bit identical outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulator {
    constants: ModelConstants,
    start_year: Year,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    pub fn new() -> Self {
        Self::from_constants(ModelConstants::default())
    }

    pub fn from_constants(constants: ModelConstants) -> Self {
        Self {
            constants,
            start_year: DEFAULT_START_YEAR,
        }
    }

    /// Set the calendar year labelling the first step
    pub fn with_start_year(self, start_year: Year) -> Self {
        Self { start_year, ..self }
    }

    pub fn constants(&self) -> &ModelConstants {
        &self.constants
    }

    pub fn start_year(&self) -> Year {
        self.start_year
    }

    /// Calendar year of year offset `t`, saturating at [`Year::MAX`]
    pub fn year_of(&self, t: u32) -> Year {
        Year::try_from(t).map_or(Year::MAX, |t| self.start_year.saturating_add(t))
    }

    /// Absorbed-radiation capacity back-solved from observed GPP.
    ///
    /// Chosen so that year 0 reproduces the observed GPP under the given parameters:
    ///
    /// $$APAR_0 = \frac{GPP_{obs}}{\varepsilon_{max} f_T(MAT) f_W(AI_0)}$$
    ///
    /// Falls back to [`ModelConstants::fallback_capacity`] when observed GPP is not positive
    /// or the quotient is not a finite positive number.
    pub fn baseline_capacity(&self, site: &SiteRecord, params: &ModelParameters) -> FloatValue {
        let fallback = self.constants.fallback_capacity;
        if site.observed_gpp <= 0.0 {
            warn!(
                site = %site.id,
                observed_gpp = site.observed_gpp,
                fallback,
                "Observed GPP is not positive; using fallback capacity"
            );
            return fallback;
        }

        let initial_temperature_factor =
            temperature_factor(site.mean_annual_temperature, params.q10, &self.constants);
        let initial_water_factor = photosynthesis_water_factor(site.aridity_index, &self.constants);
        let capacity = site.observed_gpp
            / (params.light_use_efficiency * initial_temperature_factor * initial_water_factor);

        if capacity.is_finite() && capacity > 0.0 {
            capacity
        } else {
            warn!(
                site = %site.id,
                light_use_efficiency = params.light_use_efficiency,
                q10 = params.q10,
                fallback,
                "Capacity could not be back-solved from observed GPP; using fallback capacity"
            );
            fallback
        }
    }

    /// Fluxes for one year given the stocks at its start.
    pub fn fluxes(
        &self,
        site: &SiteRecord,
        params: &ModelParameters,
        capacity: FloatValue,
        factors: &RegulatoryFactors,
        stocks: &CarbonStocks,
    ) -> CarbonFluxes {
        let gpp =
            params.light_use_efficiency * capacity * factors.temperature * factors.water_photosynthesis;
        let autotrophic_respiration = params.respiration_fraction * gpp * factors.heat_penalty;
        let npp = (gpp - autotrophic_respiration).max(0.0);

        let litterfall = params.litterfall_rate * stocks.vegetation;
        let heterotrophic_respiration = params.soil_decomposition_rate
            * stocks.soil
            * factors.temperature
            * factors.water_decomposition;
        let disturbance_rate = params.human_disturbance * site.human_modification_index;
        let human_extraction = disturbance_rate * stocks.vegetation;

        CarbonFluxes {
            gpp,
            autotrophic_respiration,
            npp,
            litterfall,
            heterotrophic_respiration,
            human_extraction,
        }
    }

    /// Advance the stocks by one year.
    ///
    /// `t` is the year offset from the start of the run. Returns the updated stocks and the
    /// record of that year.
    pub fn step(
        &self,
        site: &SiteRecord,
        params: &ModelParameters,
        capacity: FloatValue,
        stocks: &CarbonStocks,
        t: u32,
    ) -> (CarbonStocks, SimulationStep) {
        let drivers = ClimateDrivers::at_year(site, params, &self.constants, t);
        let factors = RegulatoryFactors::evaluate(&drivers, params, &self.constants);
        let fluxes = self.fluxes(site, params, capacity, &factors, stocks);
        let next = fluxes.apply(stocks);

        let record = SimulationStep {
            year: self.year_of(t),
            temperature: drivers.temperature,
            precipitation: drivers.precipitation,
            gpp: fluxes.gpp,
            npp: fluxes.npp,
            autotrophic_respiration: fluxes.autotrophic_respiration,
            heterotrophic_respiration: fluxes.heterotrophic_respiration,
            litterfall: fluxes.litterfall,
            human_extraction: fluxes.human_extraction,
            vegetation_carbon: next.vegetation,
            soil_carbon: next.soil,
            cumulative_exchange: next.cumulative_exchange,
            temperature_factor: factors.temperature,
            water_factor: factors.water_photosynthesis,
        };

        (next, record)
    }

    /// Simulate years `0..=horizon_years`, returning `horizon_years + 1` steps.
    ///
    /// Every step is kept, so memory grows linearly with the horizon. Years past
    /// [`Year::MAX`] are labelled [`Year::MAX`].
    pub fn run(
        &self,
        site: &SiteRecord,
        params: &ModelParameters,
        horizon_years: u32,
    ) -> SimulationRun {
        let capacity = self.baseline_capacity(site, params);
        let initial = CarbonStocks::initial(site, &self.constants);

        debug!(
            site = %site.id,
            horizon_years,
            capacity,
            vegetation = initial.vegetation,
            soil = initial.soil,
            "Starting simulation"
        );

        let (_, steps) = (0..=horizon_years).fold(
            (initial, Vec::with_capacity(step_count(horizon_years))),
            |(stocks, mut steps), t| {
                let (next, record) = self.step(site, params, capacity, &stocks, t);
                steps.push(record);
                (next, steps)
            },
        );

        SimulationRun::new(initial, steps)
    }
}

/// Upper bound on the steps reserved up front; longer runs grow the buffer as they go
const MAX_PREALLOCATED_STEPS: usize = 10_000;

/// Number of steps to reserve for a run
fn step_count(horizon_years: u32) -> usize {
    usize::try_from(horizon_years)
        .map_or(MAX_PREALLOCATED_STEPS, |years| years.saturating_add(1))
        .min(MAX_PREALLOCATED_STEPS)
}

/// Simulate a site with the default constants and start year.
pub fn simulate(site: &SiteRecord, params: &ModelParameters, horizon_years: u32) -> SimulationRun {
    Simulator::new().run(site, params, horizon_years)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterId;
    use is_close::is_close;

    fn reference_site() -> SiteRecord {
        SiteRecord::new("reference")
            .with_climate(10.0, 1000.0, 1.0)
            .with_production(545.0, 1200.0)
            .with_initial_vegetation_carbon(5450.0)
            .with_soil_carbon_mean(6.3)
            .with_human_modification_index(0.2)
    }

    // ===== Initialisation Tests =====

    #[test]
    fn test_initial_stocks() {
        let constants = ModelConstants::default();
        let stocks = CarbonStocks::initial(&reference_site(), &constants);

        assert_eq!(stocks.vegetation, 5450.0);
        assert!(is_close!(stocks.soil, 63.0));
        assert_eq!(stocks.cumulative_exchange, 0.0);
    }

    #[test]
    fn test_baseline_capacity_back_solved() {
        let simulator = Simulator::new();
        let params = ModelParameters::default();
        let capacity = simulator.baseline_capacity(&reference_site(), &params);

        // fT = 1 at the reference temperature, fW = 1.0 / 1.5
        let expected = 1200.0 / (1.1 * 1.0 * (1.0 / 1.5));
        assert!(is_close!(capacity, expected));
    }

    #[test]
    fn test_baseline_capacity_fallback_for_zero_gpp() {
        let simulator = Simulator::new();
        let site = reference_site().with_production(545.0, 0.0);
        let capacity = simulator.baseline_capacity(&site, &ModelParameters::default());

        assert_eq!(capacity, 1000.0);
    }

    #[test]
    fn test_baseline_capacity_fallback_for_zero_efficiency() {
        let simulator = Simulator::new();
        let params = ModelParameters::default().with_override(ParameterId::LightUseEfficiency, 0.0);
        let capacity = simulator.baseline_capacity(&reference_site(), &params);

        assert_eq!(capacity, 1000.0);
    }

    // ===== Flux Tests =====

    #[test]
    fn test_fluxes_at_baseline() {
        let simulator = Simulator::new();
        let site = reference_site();
        let params = ModelParameters::default();
        let capacity = simulator.baseline_capacity(&site, &params);
        let stocks = CarbonStocks::initial(&site, simulator.constants());
        let drivers = ClimateDrivers::at_year(&site, &params, simulator.constants(), 0);
        let factors = RegulatoryFactors::evaluate(&drivers, &params, simulator.constants());

        let fluxes = simulator.fluxes(&site, &params, capacity, &factors, &stocks);

        assert!(is_close!(fluxes.gpp, 1200.0));
        assert!(is_close!(fluxes.autotrophic_respiration, 636.0));
        assert!(is_close!(fluxes.npp, 564.0));
        assert!(is_close!(fluxes.litterfall, 817.5));
        // kSoil * Csoil * fT * fW_soil = 0.03 * 63 * 1 * 1
        assert!(is_close!(fluxes.heterotrophic_respiration, 1.89));
        // h * HMI * Cveg = 0.01 * 0.2 * 5450
        assert!(is_close!(fluxes.human_extraction, 10.9));
    }

    #[test]
    fn test_npp_floored_at_zero() {
        let simulator = Simulator::new();
        let site = reference_site();
        let params = ModelParameters::default().with_override(ParameterId::RespirationFraction, 1.5);
        let capacity = simulator.baseline_capacity(&site, &params);
        let stocks = CarbonStocks::initial(&site, simulator.constants());

        let (_, record) = simulator.step(&site, &params, capacity, &stocks, 0);

        assert!(record.gpp - record.autotrophic_respiration < 0.0);
        assert_eq!(record.npp, 0.0);
    }

    #[test]
    fn test_apply_clamps_stocks() {
        let fluxes = CarbonFluxes {
            gpp: 0.0,
            autotrophic_respiration: 0.0,
            npp: 0.0,
            litterfall: 5.0,
            heterotrophic_respiration: 100.0,
            human_extraction: 100.0,
        };
        let stocks = CarbonStocks {
            vegetation: 10.0,
            soil: 10.0,
            cumulative_exchange: 0.0,
        };

        let next = fluxes.apply(&stocks);
        assert_eq!(next.vegetation, 0.0);
        assert_eq!(next.soil, 0.0);
        // The exchange is not adjusted for the clamp
        assert_eq!(next.cumulative_exchange, 100.0);
    }

    #[test]
    fn test_apply_mass_balance_without_clamp() {
        let fluxes = CarbonFluxes {
            gpp: 1200.0,
            autotrophic_respiration: 636.0,
            npp: 564.0,
            litterfall: 100.0,
            heterotrophic_respiration: 30.0,
            human_extraction: 4.0,
        };
        let stocks = CarbonStocks {
            vegetation: 1000.0,
            soil: 500.0,
            cumulative_exchange: 0.0,
        };

        let next = fluxes.apply(&stocks);
        let storage_change = next.total_storage() - stocks.total_storage();

        // Ecosystem gain equals atmospheric loss minus what was extracted
        assert!(is_close!(
            storage_change,
            -(next.cumulative_exchange - stocks.cumulative_exchange) - fluxes.human_extraction
        ));
    }

    // ===== Run Tests =====

    #[test]
    fn test_run_length_and_years() {
        let run = simulate(&reference_site(), &ModelParameters::default(), 10);

        assert_eq!(run.len(), 11);
        assert_eq!(run[0].year, DEFAULT_START_YEAR);
        for pair in run.steps().windows(2) {
            assert_eq!(pair[1].year, pair[0].year + 1);
        }
    }

    #[test]
    fn test_zero_horizon() {
        let run = simulate(&reference_site(), &ModelParameters::default(), 0);
        assert_eq!(run.len(), 1);
    }

    #[test]
    fn test_custom_start_year() {
        let simulator = Simulator::new().with_start_year(1990);
        let run = simulator.run(&reference_site(), &ModelParameters::default(), 5);

        assert_eq!(run[0].year, 1990);
        assert_eq!(run[5].year, 1995);
    }

    #[test]
    fn test_run_matches_manual_steps() {
        let simulator = Simulator::new();
        let site = reference_site();
        let params = ModelParameters::default();
        let run = simulator.run(&site, &params, 3);

        let capacity = simulator.baseline_capacity(&site, &params);
        let mut stocks = CarbonStocks::initial(&site, simulator.constants());
        for t in 0..=3 {
            let (next, record) = simulator.step(&site, &params, capacity, &stocks, t);
            assert_eq!(record, run[t as usize]);
            stocks = next;
        }
    }

    #[test]
    fn test_first_step_reproduces_observed_gpp() {
        let run = simulate(&reference_site(), &ModelParameters::default(), 5);
        assert!(is_close!(run[0].gpp, 1200.0));
        assert!(is_close!(run[0].temperature_factor, 1.0));
        assert!(is_close!(run[0].water_factor, 1.0 / 1.5));
    }

    #[test]
    fn test_warming_raises_respiration_share() {
        let site = reference_site();
        let params = ModelParameters::default().with_override(ParameterId::WarmingRate, 0.1);
        let run = simulate(&site, &params, 20);

        let first = &run[0];
        let last = &run[20];
        assert!(is_close!(last.temperature, 12.0));
        assert!(
            last.autotrophic_respiration / last.gpp > first.autotrophic_respiration / first.gpp,
            "Heat penalty should raise Ra/GPP with warming"
        );
    }

    #[test]
    fn test_human_disturbance_reduces_vegetation() {
        let site = reference_site();
        let pristine = simulate(
            &site,
            &ModelParameters::default().with_override(ParameterId::HumanDisturbance, 0.0),
            30,
        );
        let disturbed = simulate(
            &site,
            &ModelParameters::default().with_override(ParameterId::HumanDisturbance, 0.08),
            30,
        );

        assert!(disturbed[30].vegetation_carbon < pristine[30].vegetation_carbon);
        assert!(pristine.iter().all(|step| step.human_extraction == 0.0));
    }

    #[test]
    fn test_run_keeps_initial_stocks() {
        let site = reference_site();
        let run = simulate(&site, &ModelParameters::default(), 50);

        assert_eq!(run.initial().vegetation, 5450.0);
        assert!(is_close!(run.initial().soil, 63.0));

        let summary = run.summary().unwrap();
        assert_eq!(summary.initial_vegetation_carbon, site.initial_vegetation_carbon);
        assert!(is_close!(summary.initial_soil_carbon, 63.0));
        assert!(is_close!(
            summary.total_storage_change,
            run.final_total_storage() - (5450.0 + 63.0)
        ));
        // The first step already carries the year-0 update
        assert!(run[0].vegetation_carbon != summary.initial_vegetation_carbon);
    }

    #[test]
    fn test_year_labels_saturate() {
        let simulator = Simulator::new().with_start_year(Year::MAX - 2);
        assert_eq!(simulator.year_of(1), Year::MAX - 1);
        assert_eq!(simulator.year_of(5), Year::MAX);
        assert_eq!(simulator.year_of(u32::MAX), Year::MAX);
        assert_eq!(Simulator::new().year_of(7), 2007);
    }

    #[test]
    fn test_step_count_is_bounded() {
        assert_eq!(step_count(0), 1);
        assert_eq!(step_count(50), 51);
        assert_eq!(step_count(u32::MAX), MAX_PREALLOCATED_STEPS);
    }
}
