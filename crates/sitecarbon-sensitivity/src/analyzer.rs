//! Sensitivity analyzer
//!
//! One baseline run plus two perturbed runs per tracked parameter, `2n + 1` runs in total.
//! Runs share no state, so they are evaluated in parallel; the result order always follows
//! the tracked parameter order.

use crate::perturbation::{Direction, Perturbation};
use crate::result::SensitivityResult;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sitecarbon_core::parameters::{ModelParameters, ParameterId};
use sitecarbon_core::simulator::{Simulator, DEFAULT_HORIZON_YEARS};
use sitecarbon_core::site::SiteRecord;
use sitecarbon_core::timeseries::FloatValue;
use tracing::{debug, warn};

/// Parameters analysed when no list is given, in report order
pub const DEFAULT_TRACKED_PARAMETERS: [ParameterId; 4] = [
    ParameterId::TemperatureSensitivity,
    ParameterId::LightUseEfficiency,
    ParameterId::HumanDisturbance,
    ParameterId::SoilDecompositionRate,
];

/// One-at-a-time (±) local sensitivity analysis of final total carbon storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityAnalyzer {
    simulator: Simulator,
    horizon_years: u32,
    tracked: Vec<ParameterId>,
    /// Fraction used for relative perturbations
    relative_delta: FloatValue,
    /// Offset used for the human-disturbance coefficient
    absolute_offset: FloatValue,
}

impl Default for SensitivityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SensitivityAnalyzer {
    pub fn new() -> Self {
        Self::from_simulator(Simulator::new())
    }

    pub fn from_simulator(simulator: Simulator) -> Self {
        Self {
            simulator,
            horizon_years: DEFAULT_HORIZON_YEARS,
            tracked: DEFAULT_TRACKED_PARAMETERS.to_vec(),
            relative_delta: 0.1,
            absolute_offset: 0.005,
        }
    }

    pub fn with_horizon_years(self, horizon_years: u32) -> Self {
        Self {
            horizon_years,
            ..self
        }
    }

    pub fn with_tracked(self, tracked: Vec<ParameterId>) -> Self {
        Self { tracked, ..self }
    }

    pub fn with_relative_delta(self, relative_delta: FloatValue) -> Self {
        Self {
            relative_delta,
            ..self
        }
    }

    pub fn with_absolute_offset(self, absolute_offset: FloatValue) -> Self {
        Self {
            absolute_offset,
            ..self
        }
    }

    pub fn tracked(&self) -> &[ParameterId] {
        &self.tracked
    }

    pub fn horizon_years(&self) -> u32 {
        self.horizon_years
    }

    /// Perturbation rule for a parameter.
    ///
    /// The human-disturbance coefficient is commonly zero or close to it, so it is shifted by
    /// an absolute offset. Everything else is scaled relatively.
    pub fn perturbation_for(&self, id: ParameterId) -> Perturbation {
        match id {
            ParameterId::HumanDisturbance => Perturbation::Absolute(self.absolute_offset),
            _ => Perturbation::Relative(self.relative_delta),
        }
    }

    /// Final vegetation plus soil storage of one run
    fn final_storage(&self, site: &SiteRecord, params: &ModelParameters) -> FloatValue {
        self.simulator
            .run(site, params, self.horizon_years)
            .final_total_storage()
    }

    /// Perturbed parameter sets for one parameter as (low, high).
    pub fn perturbed_parameters(
        &self,
        params: &ModelParameters,
        id: ParameterId,
    ) -> (ModelParameters, ModelParameters) {
        let perturbation = self.perturbation_for(id);
        let baseline = params.get(id);
        (
            params.with_override(id, perturbation.apply(baseline, Direction::Low)),
            params.with_override(id, perturbation.apply(baseline, Direction::High)),
        )
    }

    /// Analyse every tracked parameter around `params`.
    ///
    /// Returns one result per tracked parameter, in tracked order. If the baseline final
    /// storage is zero every result carries undefined deviations.
    pub fn analyze(&self, site: &SiteRecord, params: &ModelParameters) -> Vec<SensitivityResult> {
        let baseline = self.final_storage(site, params);
        if baseline == 0.0 {
            warn!(
                site = %site.id,
                "Baseline total storage is zero; percentage deviations are undefined"
            );
        }

        self.tracked
            .par_iter()
            .map(|&id| {
                let (low_params, high_params) = self.perturbed_parameters(params, id);
                let (low, high) = rayon::join(
                    || self.final_storage(site, &low_params),
                    || self.final_storage(site, &high_params),
                );

                let result = SensitivityResult::new(id, baseline, low, high);
                debug!(
                    site = %site.id,
                    parameter = %id,
                    baseline,
                    low,
                    high,
                    change_low = %result.change_low,
                    change_high = %result.change_high,
                    "Evaluated parameter sensitivity"
                );
                result
            })
            .collect()
    }
}

/// Analyse the default tracked parameters over the default horizon.
pub fn analyze_sensitivity(site: &SiteRecord, params: &ModelParameters) -> Vec<SensitivityResult> {
    SensitivityAnalyzer::new().analyze(site, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn site() -> SiteRecord {
        SiteRecord::new("test")
            .with_climate(12.0, 900.0, 0.9)
            .with_production(800.0, 1760.0)
            .with_initial_vegetation_carbon(8000.0)
            .with_soil_carbon_mean(6.3)
            .with_human_modification_index(0.3)
    }

    #[test]
    fn test_perturbation_rules() {
        let analyzer = SensitivityAnalyzer::new();
        assert_eq!(
            analyzer.perturbation_for(ParameterId::HumanDisturbance),
            Perturbation::Absolute(0.005)
        );
        assert_eq!(
            analyzer.perturbation_for(ParameterId::TemperatureSensitivity),
            Perturbation::Relative(0.1)
        );
    }

    #[test]
    fn test_perturbed_parameters_change_one_field() {
        let analyzer = SensitivityAnalyzer::new();
        let params = ModelParameters::default();

        let (low, high) = analyzer.perturbed_parameters(&params, ParameterId::SoilDecompositionRate);
        assert!(is_close!(low.soil_decomposition_rate, 0.027));
        assert!(is_close!(high.soil_decomposition_rate, 0.033));
        assert_eq!(low.with_override(ParameterId::SoilDecompositionRate, 0.03), params);
        assert_eq!(high.with_override(ParameterId::SoilDecompositionRate, 0.03), params);
    }

    #[test]
    fn test_human_disturbance_at_zero() {
        let analyzer = SensitivityAnalyzer::new();
        let params = ModelParameters::default().with_override(ParameterId::HumanDisturbance, 0.0);

        let (low, high) = analyzer.perturbed_parameters(&params, ParameterId::HumanDisturbance);
        assert_eq!(low.human_disturbance, 0.0);
        assert!(is_close!(high.human_disturbance, 0.005));
    }

    #[test]
    fn test_results_follow_tracked_order() {
        let results = analyze_sensitivity(&site(), &ModelParameters::default());
        let order: Vec<ParameterId> = results.iter().map(|r| r.parameter).collect();
        assert_eq!(order, DEFAULT_TRACKED_PARAMETERS.to_vec());
    }

    #[test]
    fn test_custom_tracked_list() {
        let analyzer = SensitivityAnalyzer::new()
            .with_horizon_years(20)
            .with_tracked(vec![ParameterId::LitterfallRate, ParameterId::RespirationFraction]);
        let results = analyzer.analyze(&site(), &ModelParameters::default());

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].parameter, ParameterId::LitterfallRate);
        assert_eq!(results[1].parameter, ParameterId::RespirationFraction);
        // More respiration leaves less carbon
        assert!(results[1].high < results[1].low);
    }

    #[test]
    fn test_more_disturbance_less_storage() {
        let results = analyze_sensitivity(&site(), &ModelParameters::default());
        let disturbance = results
            .iter()
            .find(|r| r.parameter == ParameterId::HumanDisturbance)
            .unwrap();

        assert!(disturbance.high < disturbance.baseline);
        assert!(disturbance.low > disturbance.baseline);
        assert!(disturbance.change_high.percent().unwrap() < 0.0);
    }
}
