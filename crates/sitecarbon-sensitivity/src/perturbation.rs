//! Perturbation rules
//!
//! Most parameters are perturbed relative to their baseline value. Parameters whose
//! baseline can sit at or near zero are perturbed by an absolute offset instead, since a
//! relative change of zero is no change at all.

use serde::{Deserialize, Serialize};
use sitecarbon_core::timeseries::FloatValue;

/// Side of a symmetric perturbation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Low,
    High,
}

impl Direction {
    fn sign(&self) -> FloatValue {
        match self {
            Direction::Low => -1.0,
            Direction::High => 1.0,
        }
    }
}

/// How a parameter value is moved away from its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perturbation {
    /// Scale by `1 ± delta`
    Relative(FloatValue),
    /// Shift by `± offset`, never below zero
    Absolute(FloatValue),
}

impl Perturbation {
    /// Perturbed value of `baseline`.
    pub fn apply(&self, baseline: FloatValue, direction: Direction) -> FloatValue {
        match *self {
            Perturbation::Relative(delta) => baseline * (1.0 + direction.sign() * delta),
            Perturbation::Absolute(offset) => (baseline + direction.sign() * offset).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn test_relative() {
        let perturbation = Perturbation::Relative(0.1);
        assert!(is_close!(perturbation.apply(2.0, Direction::Low), 1.8));
        assert!(is_close!(perturbation.apply(2.0, Direction::High), 2.2));
    }

    #[test]
    fn test_relative_of_zero_is_no_op() {
        let perturbation = Perturbation::Relative(0.1);
        assert_eq!(perturbation.apply(0.0, Direction::Low), 0.0);
        assert_eq!(perturbation.apply(0.0, Direction::High), 0.0);
    }

    #[test]
    fn test_absolute() {
        let perturbation = Perturbation::Absolute(0.005);
        assert!(is_close!(perturbation.apply(0.01, Direction::Low), 0.005));
        assert!(is_close!(perturbation.apply(0.01, Direction::High), 0.015));
    }

    #[test]
    fn test_absolute_floored_at_zero() {
        let perturbation = Perturbation::Absolute(0.005);
        assert_eq!(perturbation.apply(0.0, Direction::Low), 0.0);
        assert_eq!(perturbation.apply(0.002, Direction::Low), 0.0);
        assert!(is_close!(perturbation.apply(0.0, Direction::High), 0.005));
    }
}
