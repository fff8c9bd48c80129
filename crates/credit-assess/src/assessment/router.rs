use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::{DerivedSnapshot, RawInputs};
use super::evaluator::CalculatorFailure;
use super::scoring::{deserialize_selections, Selections};
use super::service::{AssessmentRequest, AssessmentService};

#[derive(Debug, Serialize)]
pub(crate) struct DeriveResponse {
    pub(crate) values: DerivedSnapshot,
    pub(crate) display: BTreeMap<String, String>,
    pub(crate) failures: Vec<CalculatorFailure>,
}

/// Score route body; `null` answers count as unanswered.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub(crate) struct SelectionsPayload(
    #[serde(deserialize_with = "deserialize_selections")] pub(crate) Selections,
);

/// Router builder exposing derivation and scoring over HTTP.
pub fn assessment_router(service: Arc<AssessmentService>) -> Router {
    Router::new()
        .route("/api/v1/assessments", post(assess_handler))
        .route("/api/v1/assessments/derive", post(derive_handler))
        .route("/api/v1/assessments/score", post(score_handler))
        .route("/api/v1/assessments/calculators", get(catalog_handler))
        .route("/api/v1/assessments/scorecard", get(scorecard_handler))
        .with_state(service)
}

pub(crate) async fn derive_handler(
    State(service): State<Arc<AssessmentService>>,
    Json(inputs): Json<RawInputs>,
) -> Response {
    let report = service.derive(&inputs);
    let display = service.display_values(&report.snapshot);
    let body = DeriveResponse {
        values: report.snapshot,
        display,
        failures: report.failures,
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub(crate) async fn score_handler(
    State(service): State<Arc<AssessmentService>>,
    Json(SelectionsPayload(selections)): Json<SelectionsPayload>,
) -> Response {
    (StatusCode::OK, Json(service.score(&selections))).into_response()
}

pub(crate) async fn assess_handler(
    State(service): State<Arc<AssessmentService>>,
    Json(request): Json<AssessmentRequest>,
) -> Response {
    (StatusCode::OK, Json(service.assess(&request))).into_response()
}

pub(crate) async fn catalog_handler(State(service): State<Arc<AssessmentService>>) -> Response {
    (StatusCode::OK, Json(service.catalog())).into_response()
}

pub(crate) async fn scorecard_handler(State(service): State<Arc<AssessmentService>>) -> Response {
    (StatusCode::OK, Json(service.scorecard().clone())).into_response()
}
