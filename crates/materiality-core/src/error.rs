//! Calculation Error Types

use thiserror::Error;

/// Errors raised while validating calculation input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// No indicators were supplied, the mean is undefined
    #[error("No indicators supplied")]
    EmptyIndicators,

    /// Indicator carries a NaN or infinite value
    #[error("Indicator '{name}' has a non-finite value")]
    NonFiniteValue { name: String },

    /// Indicator name is empty or blank
    #[error("Indicator at position {index} has an empty name")]
    EmptyName { index: usize },

    /// Threshold parameters must be non-negative percentages
    #[error("{parameter} must be non-negative, got {value}")]
    NegativeParameter { parameter: &'static str, value: f64 },
}

/// Errors raised by the materiality calculation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    /// Input failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Every indicator was excluded as an outlier
    #[error("All {excluded_count} indicators excluded as non-representative")]
    NoRepresentativeIndicators { excluded_count: usize },
}
