use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::assessment::router::{assessment_router, derive_handler};

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).expect("serialise payload")))
        .expect("request builds")
}

#[tokio::test]
async fn derive_handler_returns_values_and_display_strings() {
    let response = derive_handler(
        State(standard_service()),
        axum::Json(sample_application()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["values"]["loan_to_value"], json!(62.5));
    assert_eq!(body["display"]["loan_to_value"], json!("62.50%"));
    assert_eq!(body["failures"], json!([]));
}

#[tokio::test]
async fn score_route_classifies_selections() {
    let router = assessment_router(standard_service());

    let response = router
        .oneshot(post_json(
            "/api/v1/assessments/score",
            &json!({
                "credit_bureau_score": "650-699",
                "repayment_track_record": "No delays",
                "years_in_business": "5-10 years",
                "debt_burden": "Below 30%",
                "collateral_coverage": "125-150%",
                "cash_flow_stability": "Moderately stable",
                "industry_outlook": "Neutral",
                "management_quality": "Adequate",
            }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["score"], json!(77.0));
    assert_eq!(body["band"]["name"], json!("Low Risk"));
    assert_eq!(body["contributions"].as_array().map(Vec::len), Some(8));
}

#[tokio::test]
async fn score_route_treats_null_answers_as_unanswered() {
    let router = assessment_router(standard_service());

    let response = router
        .oneshot(post_json(
            "/api/v1/assessments/score",
            &json!({
                "credit_bureau_score": "750 and above",
                "industry_outlook": null,
            }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["score"], json!(20.0));
    assert_eq!(body["band"]["name"], json!("High Risk"));
    let outlook = body["contributions"]
        .as_array()
        .and_then(|entries| {
            entries
                .iter()
                .find(|entry| entry["parameter"] == json!("industry_outlook"))
        })
        .cloned()
        .expect("outlook contribution listed");
    assert_eq!(outlook["selected"], Value::Null);
    assert_eq!(outlook["contribution"], json!(0.0));
}

#[tokio::test]
async fn assess_route_accepts_null_selections() {
    let router = assessment_router(standard_service());
    let payload = json!({
        "inputs": serde_json::to_value(sample_application()).expect("inputs serialise"),
        "selections": { "management_quality": "Strong", "debt_burden": null },
    });

    let response = router
        .oneshot(post_json("/api/v1/assessments", &payload))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["risk"]["score"], json!(5.0));
}

#[tokio::test]
async fn assess_route_combines_derivation_and_scoring() {
    let router = assessment_router(standard_service());
    let payload = json!({
        "inputs": serde_json::to_value(sample_application()).expect("inputs serialise"),
        "selections": serde_json::to_value(strongest_selections()).expect("selections serialise"),
    });

    let response = router
        .oneshot(post_json("/api/v1/assessments", &payload))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["values"]["policy_deviations"], json!("No deviation"));
    assert_eq!(body["display"]["current_ratio"], json!("1.50"));
    assert_eq!(body["risk"]["band"]["name"], json!("Very Low Risk"));
}

#[tokio::test]
async fn calculators_route_lists_catalogue() {
    let router = assessment_router(standard_service());

    let response = router
        .oneshot(
            Request::get("/api/v1/assessments/calculators")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let stability = body
        .as_array()
        .and_then(|entries| {
            entries
                .iter()
                .find(|entry| entry["name"] == json!("cash_flow_stability_score"))
        })
        .cloned()
        .expect("stability calculator listed");
    assert_eq!(stability["format"], json!("score"));
    assert_eq!(
        stability["dependencies"],
        json!(["credit_volatility_index", "credit_trend", "credit_concentration"])
    );
}

#[tokio::test]
async fn scorecard_route_exposes_bands() {
    let router = assessment_router(standard_service());

    let response = router
        .oneshot(
            Request::get("/api/v1/assessments/scorecard")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route responds");

    let body = read_json_body(response).await;
    assert_eq!(body["bands"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["default_band"]["name"], json!("Manual Review"));
}

#[tokio::test]
async fn malformed_payload_is_rejected() {
    let router = assessment_router(standard_service());

    let response = router
        .oneshot(
            Request::post("/api/v1/assessments/derive")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"loan_amount\": [1, 2]}"))
                .expect("request builds"),
        )
        .await
        .expect("route responds");

    assert!(response.status().is_client_error());
}
