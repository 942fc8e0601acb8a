//! Materiality Level Calculation
//!
//! Computes an audit materiality level from named financial indicators:
//! arithmetic mean, single-pass percent-deviation outlier exclusion,
//! recomputed mean over the survivors, and a bounded round-to-100 rule.
//! The full calculation trace is returned so callers can render an
//! auditable report.

mod calculator;
mod error;
mod indicator;

pub use calculator::{CalculationResult, Deviation, IndicatorDeviation, MaterialityCalculator};
pub use error::{CalculationError, ValidationError};
pub use indicator::{CalculationParameters, Indicator};
