//! Sensitivity results
//!
//! Percentage deviations are undefined when the baseline storage is zero. That case is
//! carried as [`Deviation::Undefined`] rather than a NaN or a zero, so a report can tell an
//! undefined baseline apart from a parameter with no measurable impact.

use serde::{Deserialize, Serialize};
use sitecarbon_core::parameters::ParameterId;
use sitecarbon_core::timeseries::FloatValue;
use std::cmp::Ordering;
use std::fmt;

/// Relative change of a perturbed run's final storage from the baseline.
///
/// Serialises as a plain number, or `null` when undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Deviation {
    /// unit: %
    Percent(FloatValue),
    /// The baseline total storage is zero
    Undefined,
}

impl Deviation {
    /// `(perturbed - baseline) / baseline × 100`
    pub fn between(perturbed: FloatValue, baseline: FloatValue) -> Self {
        if baseline == 0.0 {
            Deviation::Undefined
        } else {
            Deviation::Percent((perturbed - baseline) / baseline * 100.0)
        }
    }

    pub fn percent(&self) -> Option<FloatValue> {
        match self {
            Deviation::Percent(value) => Some(*value),
            Deviation::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Deviation::Undefined)
    }
}

impl fmt::Display for Deviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deviation::Percent(value) => write!(f, "{:+.2}%", value),
            Deviation::Undefined => write!(f, "undefined"),
        }
    }
}

/// Outcome of perturbing one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub parameter: ParameterId,
    pub label: String,
    /// Final total storage of the baseline run
    /// unit: gC / m^2
    pub baseline: FloatValue,
    /// Final total storage with the parameter perturbed down
    /// unit: gC / m^2
    pub low: FloatValue,
    /// Final total storage with the parameter perturbed up
    /// unit: gC / m^2
    pub high: FloatValue,
    #[serde(rename = "changeLow")]
    pub change_low: Deviation,
    #[serde(rename = "changeHigh")]
    pub change_high: Deviation,
}

impl SensitivityResult {
    pub fn new(
        parameter: ParameterId,
        baseline: FloatValue,
        low: FloatValue,
        high: FloatValue,
    ) -> Self {
        Self {
            parameter,
            label: parameter.label().to_string(),
            baseline,
            low,
            high,
            change_low: Deviation::between(low, baseline),
            change_high: Deviation::between(high, baseline),
        }
    }

    /// Width of the tornado bar, `|changeHigh - changeLow|`.
    ///
    /// `None` when the baseline is degenerate.
    pub fn impact(&self) -> Option<FloatValue> {
        match (self.change_low, self.change_high) {
            (Deviation::Percent(low), Deviation::Percent(high)) => Some((high - low).abs()),
            _ => None,
        }
    }

    /// Whether the percentage deviations are undefined
    pub fn is_degenerate(&self) -> bool {
        self.change_low.is_undefined() || self.change_high.is_undefined()
    }
}

/// Sort results by descending impact, degenerate entries last.
///
/// The sort is stable, so ties keep their original order.
pub fn rank_by_impact(results: &mut [SensitivityResult]) {
    results.sort_by(|a, b| match (a.impact(), b.impact()) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
