//! The bundled scenario files load and run end to end.

use approx::assert_relative_eq;
use sitecarbon::prelude::*;
use std::path::PathBuf;

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

#[test]
fn classic_scenario() {
    let config = ScenarioConfig::from_path(scenario_path("us-ha1-f01.toml")).unwrap();
    let site = config.site();
    let params = config.parameters();

    assert_eq!(site.id, "US-Ha1-F01");
    assert_eq!(site.habitat, Habitat::Forest);
    // GPP is derived from NPP when the table omits it
    assert_relative_eq!(site.observed_gpp, 1312.0 * 2.2, max_relative = 1e-12);
    assert_eq!(params, ModelParameters::default());

    let run = config.simulator().run(&site, &params, config.horizon_years);
    assert_eq!(run.len(), 51);
    assert_eq!(run[0].year, 2000);
    assert_eq!(run[50].year, 2050);
    assert_relative_eq!(run[0].gpp, site.observed_gpp, max_relative = 1e-12);
}

#[test]
fn high_warming_scenario() {
    let config = ScenarioConfig::from_path(scenario_path("fr-hes-high-warming.toml")).unwrap();
    let params = config.parameters();

    assert_eq!(config.horizon_years, 80);
    assert_relative_eq!(params.warming_rate, 0.08);
    assert_relative_eq!(params.q10, 2.2);
    assert_relative_eq!(params.soil_decomposition_rate, 0.035);
    assert!(params.out_of_range().is_empty());

    let site = config.site();
    let analyzer = SensitivityAnalyzer::from_simulator(config.simulator())
        .with_horizon_years(config.horizon_years);
    let mut results = analyzer.analyze(&site, &params);
    rank_by_impact(&mut results);

    let run = config.simulator().run(&site, &params, config.horizon_years);
    assert_eq!(results.len(), 4);
    for result in &results {
        assert_eq!(result.baseline, run.final_total_storage());
        assert!(!result.is_degenerate());
    }
}

#[test]
fn missing_scenario_file() {
    let err = ScenarioConfig::from_path(scenario_path("does-not-exist.toml")).unwrap_err();
    assert!(matches!(err, SiteCarbonError::ScenarioIo { .. }));
}
