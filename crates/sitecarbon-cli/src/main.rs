//! sitecarbon command-line runner
//!
//! Loads a TOML scenario, runs the simulator or the sensitivity analyzer and writes the
//! results as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p sitecarbon-cli -- simulate scenarios/us-ha1-f01.toml --horizon 80
//! cargo run -p sitecarbon-cli -- sensitivity scenarios/us-ha1-f01.toml --set Q10=2.4
//! ```

use clap::{Parser, Subcommand};
use serde::Serialize;
use sitecarbon_core::config::ScenarioConfig;
use sitecarbon_core::errors::{SiteCarbonError, SiteCarbonResult};
use sitecarbon_core::parameters::{ModelParameters, ParameterId, ParameterPreset};
use sitecarbon_core::timeseries::{RunSummary, SimulationRun};
use sitecarbon_sensitivity::{rank_by_impact, SensitivityAnalyzer, SensitivityResult};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Site carbon budget simulator
#[derive(Parser, Debug)]
#[command(name = "sitecarbon")]
#[command(about = "Run site carbon budget scenarios and sensitivity analyses")]
struct Args {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a scenario and write the annual steps with a summary
    Simulate {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Number of years to simulate, overriding the scenario
        #[arg(long)]
        horizon: Option<u32>,
    },
    /// Rank parameters by their impact on final total carbon storage
    Sensitivity {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
}

#[derive(clap::Args, Debug)]
struct ScenarioArgs {
    /// Scenario file (TOML)
    scenario: PathBuf,

    /// Base parameter preset, replacing the scenario's (classic, high_warming, high_disturbance)
    #[arg(long)]
    preset: Option<ParameterPreset>,

    /// Parameter override as key=value, e.g. Q10=2.4 or soil_decomposition_rate=0.05
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_override)]
    overrides: Vec<(ParameterId, f64)>,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct SimulationOutput<'a> {
    site: &'a str,
    parameters: ModelParameters,
    summary: Option<RunSummary>,
    #[serde(flatten)]
    run: &'a SimulationRun,
}

#[derive(Serialize)]
struct SensitivityOutput<'a> {
    site: &'a str,
    parameters: ModelParameters,
    horizon_years: u32,
    results: &'a [SensitivityResult],
}

fn parse_override(value: &str) -> SiteCarbonResult<(ParameterId, f64)> {
    let (key, number) = value
        .split_once('=')
        .ok_or_else(|| SiteCarbonError::Error(format!("Expected KEY=VALUE, got '{}'", value)))?;
    let id: ParameterId = key.parse()?;
    let number = number.trim().parse::<f64>().map_err(|e| {
        SiteCarbonError::Error(format!("Invalid value for {}: '{}' ({})", id, number, e))
    })?;
    Ok((id, number))
}

impl ScenarioArgs {
    fn load(&self) -> SiteCarbonResult<(ScenarioConfig, ModelParameters)> {
        let mut config = ScenarioConfig::from_path(&self.scenario)?;
        if let Some(preset) = self.preset {
            config.preset = Some(preset);
        }
        let params = self
            .overrides
            .iter()
            .fold(config.parameters(), |params, (id, value)| {
                params.with_override(*id, *value)
            });

        for id in params.out_of_range() {
            let (min, max) = id.documented_range();
            warn!(
                parameter = %id,
                value = params.get(id),
                min,
                max,
                "Parameter outside its documented range"
            );
        }
        Ok((config, params))
    }

    fn write(&self, json: String) -> SiteCarbonResult<()> {
        match &self.output {
            Some(path) => {
                fs::write(path, json + "\n").map_err(|e| {
                    SiteCarbonError::Error(format!("Failed to write {}: {}", path.display(), e))
                })?;
                info!(path = %path.display(), "Wrote results");
            }
            None => println!("{}", json),
        }
        Ok(())
    }
}

fn to_json<T: Serialize>(value: &T) -> SiteCarbonResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| SiteCarbonError::Error(format!("Failed to serialise results: {}", e)))
}

fn simulate(scenario: &ScenarioArgs, horizon: Option<u32>) -> SiteCarbonResult<()> {
    let (config, params) = scenario.load()?;
    let site = config.site();
    let run = config
        .simulator()
        .run(&site, &params, horizon.unwrap_or(config.horizon_years));

    scenario.write(to_json(&SimulationOutput {
        site: &site.id,
        parameters: params,
        summary: run.summary(),
        run: &run,
    })?)
}

fn sensitivity(scenario: &ScenarioArgs) -> SiteCarbonResult<()> {
    let (config, params) = scenario.load()?;
    let site = config.site();
    let analyzer = SensitivityAnalyzer::from_simulator(config.simulator())
        .with_horizon_years(config.horizon_years);

    let mut results = analyzer.analyze(&site, &params);
    rank_by_impact(&mut results);

    scenario.write(to_json(&SensitivityOutput {
        site: &site.id,
        parameters: params,
        horizon_years: analyzer.horizon_years(),
        results: &results,
    })?)
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match &args.command {
        Command::Simulate { scenario, horizon } => simulate(scenario, *horizon),
        Command::Sensitivity { scenario } => sensitivity(scenario),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
