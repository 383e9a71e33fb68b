use std::path::PathBuf;
use thiserror::Error;

/// Error type for invalid operations.
///
/// Simulation and sensitivity analysis are total over finite inputs and never produce
/// these; they arise when loading scenarios or resolving parameter names.
#[derive(Error, Debug)]
pub enum SiteCarbonError {
    #[error("{0}")]
    Error(String),
    #[error("Could not read scenario file {path}: {source}")]
    ScenarioIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid scenario: {0}")]
    InvalidScenario(#[from] toml::de::Error),
    #[error("Unknown parameter '{0}'. Expected one of: {1}")]
    UnknownParameter(String, String),
    #[error("Unknown preset '{0}'. Expected one of: classic, high_warming, high_disturbance")]
    UnknownPreset(String),
}

/// Convenience type for `Result<T, SiteCarbonError>`.
pub type SiteCarbonResult<T> = Result<T, SiteCarbonError>;
