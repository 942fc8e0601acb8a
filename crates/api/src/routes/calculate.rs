//! Calculation Route

use axum::extract::State;
use axum::Json;
use materiality_core::{
    CalculationParameters, CalculationResult, Indicator, MaterialityCalculator,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

/// Request body for the calculation endpoint
#[derive(Debug, Deserialize)]
pub struct CalculationRequest {
    /// Financial indicators, at most `max_indicators` of them
    pub indicators: Vec<Indicator>,
    /// Outlier exclusion threshold in percent
    #[serde(default = "default_threshold")]
    pub deviation_threshold: f64,
    /// Maximum percent deviation tolerated when rounding
    #[serde(default = "default_threshold")]
    pub rounding_limit: f64,
}

fn default_threshold() -> f64 {
    50.0
}

/// Deviation of one indicator in the response
#[derive(Debug, Serialize)]
pub struct DeviationInfo {
    pub absolute: f64,
    /// `null` when the initial mean is zero and the ratio is undefined
    pub percent: Option<f64>,
}

/// Per-indicator calculation detail
#[derive(Debug, Serialize)]
pub struct IndicatorResult {
    pub name: String,
    pub value: f64,
    pub deviation: DeviationInfo,
}

/// Intermediate values of the calculation, returned for auditability
#[derive(Debug, Serialize)]
pub struct CalculationSteps {
    pub initial_mean: f64,
    pub filtered_mean: f64,
    pub excluded_count: usize,
    pub excluded_values: Vec<f64>,
    pub indicators: Vec<IndicatorResult>,
    pub rounded_value: f64,
}

/// Response body for the calculation endpoint
#[derive(Debug, Serialize)]
pub struct CalculationResponse {
    pub materiality_level: f64,
    pub calculation_steps: CalculationSteps,
    pub indicators: Vec<Indicator>,
    pub message: String,
}

impl CalculationResponse {
    fn from_result(result: CalculationResult, indicators: Vec<Indicator>) -> Self {
        let indicator_results = result
            .indicators
            .into_iter()
            .map(|entry| IndicatorResult {
                name: entry.indicator.name,
                value: entry.indicator.value,
                deviation: DeviationInfo {
                    absolute: entry.deviation.absolute,
                    percent: entry.deviation.percent,
                },
            })
            .collect();

        Self {
            materiality_level: result.materiality_level,
            calculation_steps: CalculationSteps {
                initial_mean: result.initial_mean,
                filtered_mean: result.filtered_mean,
                excluded_count: result.excluded_count,
                excluded_values: result.excluded_values,
                indicators: indicator_results,
                rounded_value: result.rounded_value,
            },
            indicators,
            message: "Calculation completed successfully".to_string(),
        }
    }
}

/// Compute the materiality level for a set of indicators
pub async fn calculate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CalculationRequest>,
) -> Result<Json<CalculationResponse>, ApiError> {
    if request.indicators.len() > state.settings.max_indicators {
        return Err(ApiError::TooManyIndicators {
            max: state.settings.max_indicators,
        });
    }

    let calculator = MaterialityCalculator::new(CalculationParameters {
        deviation_threshold: request.deviation_threshold,
        rounding_limit: request.rounding_limit,
    });
    let result = calculator.calculate(&request.indicators)?;

    info!(
        indicators = request.indicators.len(),
        excluded = result.excluded_count,
        materiality_level = result.materiality_level,
        "calculation served"
    );

    Ok(Json(CalculationResponse::from_result(
        result,
        request.indicators,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use materiality_core::CalculationError;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(Settings::default()))
    }

    fn request(values: &[f64]) -> CalculationRequest {
        CalculationRequest {
            indicators: values
                .iter()
                .enumerate()
                .map(|(i, &v)| Indicator::new(format!("Indicator {}", i + 1), v))
                .collect(),
            deviation_threshold: 50.0,
            rounding_limit: 50.0,
        }
    }

    #[tokio::test]
    async fn test_calculate_success() {
        let response = calculate(State(state()), Json(request(&[90.0, 100.0, 110.0])))
            .await
            .unwrap();
        assert_eq!(response.0.materiality_level, 100.0);
        assert_eq!(response.0.calculation_steps.excluded_count, 0);
        assert_eq!(response.0.indicators.len(), 3);
        assert_eq!(response.0.message, "Calculation completed successfully");
    }

    #[tokio::test]
    async fn test_calculate_all_excluded() {
        let err = calculate(State(state()), Json(request(&[1_800_000.0, 480_000.0])))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Calculation(CalculationError::NoRepresentativeIndicators { .. })
        ));
    }

    #[tokio::test]
    async fn test_calculate_too_many_indicators() {
        let mut settings = Settings::default();
        settings.max_indicators = 2;
        let state = Arc::new(AppState::new(settings));

        let err = calculate(State(state), Json(request(&[1.0, 2.0, 3.0])))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::TooManyIndicators { max: 2 }));
    }

    #[tokio::test]
    async fn test_thresholds_default_to_fifty() {
        let body = serde_json::json!({
            "indicators": [
                {"name": "Revenue", "value": 100.0},
                {"name": "Profit", "value": 100.0}
            ]
        });
        let parsed: CalculationRequest = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.deviation_threshold, 50.0);
        assert_eq!(parsed.rounding_limit, 50.0);
    }

    #[tokio::test]
    async fn test_response_shape() {
        let response = calculate(State(state()), Json(request(&[200.0, 200.0])))
            .await
            .unwrap();
        let json = serde_json::to_value(&response.0).unwrap();
        assert_eq!(json["materiality_level"], 200.0);
        assert_eq!(json["calculation_steps"]["initial_mean"], 200.0);
        assert_eq!(
            json["calculation_steps"]["indicators"][0]["deviation"]["percent"],
            0.0
        );
    }
}
