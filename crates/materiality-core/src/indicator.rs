//! Financial Indicators and Calculation Parameters

use serde::{Deserialize, Serialize};

/// A named financial indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    /// Indicator name, e.g. "Sales revenue"
    pub name: String,
    /// Monetary value of the indicator
    pub value: f64,
}

impl Indicator {
    /// Create a new indicator
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Calculation thresholds, both expressed in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationParameters {
    /// Indicators deviating from the initial mean by more than this
    /// percentage are excluded (default: 50)
    pub deviation_threshold: f64,
    /// Maximum percent deviation the rounding step may introduce before
    /// the unrounded mean is kept (default: 50)
    pub rounding_limit: f64,
}

impl Default for CalculationParameters {
    fn default() -> Self {
        Self {
            deviation_threshold: 50.0,
            rounding_limit: 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let params = CalculationParameters::default();
        assert_eq!(params.deviation_threshold, 50.0);
        assert_eq!(params.rounding_limit, 50.0);
    }

    #[test]
    fn test_indicator_constructor() {
        let ind = Indicator::new("Net profit", 480_000.0);
        assert_eq!(ind.name, "Net profit");
        assert_eq!(ind.value, 480_000.0);
    }
}
