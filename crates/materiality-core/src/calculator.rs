//! Materiality Calculator Implementation

use crate::error::{CalculationError, ValidationError};
use crate::indicator::{CalculationParameters, Indicator};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Deviation of one indicator from the initial mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    /// Signed difference from the initial mean
    pub absolute: f64,
    /// Signed relative difference in percent. `None` when the initial
    /// mean is zero and the value is not, where the ratio is undefined;
    /// an undefined deviation is always treated as an outlier.
    pub percent: Option<f64>,
}

/// An indicator paired with its computed deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDeviation {
    pub indicator: Indicator,
    pub deviation: Deviation,
}

/// Full trace of one materiality calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Arithmetic mean over all indicators
    pub initial_mean: f64,
    /// Arithmetic mean after outlier exclusion
    pub filtered_mean: f64,
    /// Number of excluded indicators
    pub excluded_count: usize,
    /// Values of excluded indicators, in original order
    pub excluded_values: Vec<f64>,
    /// Every indicator with its deviation, in original order
    pub indicators: Vec<IndicatorDeviation>,
    /// Filtered mean rounded to the nearest 100 units
    pub rounded_value: f64,
    /// Final materiality level: the rounded value, or the unrounded
    /// filtered mean when rounding would deviate beyond the limit
    pub materiality_level: f64,
}

/// Materiality level calculator
///
/// A pure, stateless pipeline: validate, average, exclude outliers in a
/// single pass against the initial mean, re-average, round. Safe to share
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct MaterialityCalculator {
    params: CalculationParameters,
}

impl MaterialityCalculator {
    /// Create a calculator with the given thresholds
    pub fn new(params: CalculationParameters) -> Self {
        Self { params }
    }

    /// Calculation parameters in effect
    pub fn params(&self) -> &CalculationParameters {
        &self.params
    }

    /// Run the full calculation over a set of indicators
    pub fn calculate(
        &self,
        indicators: &[Indicator],
    ) -> Result<CalculationResult, CalculationError> {
        self.validate(indicators)?;

        let n = indicators.len() as f64;
        let initial_mean = indicators.iter().map(|i| i.value).sum::<f64>() / n;

        // Deviations and exclusion decisions are all made relative to the
        // initial mean; exclusions never trigger a re-filtering pass.
        let with_deviation: Vec<IndicatorDeviation> = indicators
            .iter()
            .map(|ind| IndicatorDeviation {
                indicator: ind.clone(),
                deviation: Self::deviation_from(ind.value, initial_mean),
            })
            .collect();

        let mut excluded_values = Vec::new();
        let mut retained_values = Vec::new();
        for entry in &with_deviation {
            if self.is_outlier(&entry.deviation) {
                excluded_values.push(entry.indicator.value);
            } else {
                retained_values.push(entry.indicator.value);
            }
        }

        if retained_values.is_empty() {
            return Err(CalculationError::NoRepresentativeIndicators {
                excluded_count: excluded_values.len(),
            });
        }

        let filtered_mean =
            retained_values.iter().sum::<f64>() / retained_values.len() as f64;

        // Round half away from zero to the nearest 100 units, then keep the
        // rounding only if it stays within the configured percent limit.
        let rounded_value = (filtered_mean / 100.0).round() * 100.0;
        let rounding_deviation_percent = if filtered_mean == 0.0 {
            0.0
        } else {
            (rounded_value - filtered_mean).abs() / filtered_mean.abs() * 100.0
        };
        let materiality_level = if rounding_deviation_percent > self.params.rounding_limit {
            filtered_mean
        } else {
            rounded_value
        };

        debug!(
            initial_mean,
            filtered_mean,
            excluded = excluded_values.len(),
            materiality_level,
            "materiality calculation complete"
        );

        Ok(CalculationResult {
            initial_mean,
            filtered_mean,
            excluded_count: excluded_values.len(),
            excluded_values,
            indicators: with_deviation,
            rounded_value,
            materiality_level,
        })
    }

    /// Validate indicators and thresholds before any arithmetic
    fn validate(&self, indicators: &[Indicator]) -> Result<(), ValidationError> {
        if indicators.is_empty() {
            return Err(ValidationError::EmptyIndicators);
        }
        for (index, ind) in indicators.iter().enumerate() {
            if ind.name.trim().is_empty() {
                return Err(ValidationError::EmptyName { index });
            }
            if !ind.value.is_finite() {
                return Err(ValidationError::NonFiniteValue {
                    name: ind.name.clone(),
                });
            }
        }
        if self.params.deviation_threshold < 0.0 {
            return Err(ValidationError::NegativeParameter {
                parameter: "deviation_threshold",
                value: self.params.deviation_threshold,
            });
        }
        if self.params.rounding_limit < 0.0 {
            return Err(ValidationError::NegativeParameter {
                parameter: "rounding_limit",
                value: self.params.rounding_limit,
            });
        }
        Ok(())
    }

    /// Deviation of a value from the reference mean
    fn deviation_from(value: f64, mean: f64) -> Deviation {
        let absolute = value - mean;
        let percent = if mean != 0.0 {
            Some(absolute / mean * 100.0)
        } else if value == 0.0 {
            Some(0.0)
        } else {
            None
        };
        Deviation { absolute, percent }
    }

    /// Exclusion test: strictly beyond the threshold, equality survives
    fn is_outlier(&self, deviation: &Deviation) -> bool {
        match deviation.percent {
            Some(percent) => percent.abs() > self.params.deviation_threshold,
            None => true,
        }
    }
}
