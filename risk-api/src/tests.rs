//! Router tests
//!
//! Drive the full router in-process with a small two-tree forest and no
//! database.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use dropout_risk_core::model::RandomForest;
use dropout_risk_core::{RiskClassifier, StudentFeatureVector};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{config::Config, create_router, AppState};

/// Two trees keyed on tuition status (13) and first-semester grade (22)
fn forest() -> RandomForest {
    let doc = json!({
        "classes": ["Dropout", "Enrolled", "Graduate"],
        "trees": [
            {
                "children_left":  [1, -1, 3, -1, -1],
                "children_right": [2, -1, 4, -1, -1],
                "feature":   [13, -2, 22, -2, -2],
                "threshold": [0.5, -2.0, 10.0, -2.0, -2.0],
                "value": [[11, 7, 12], [8, 1, 1], [3, 6, 11], [3, 4, 3], [0, 2, 8]]
            },
            {
                "children_left":  [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature":   [13, -2, -2],
                "threshold": [0.5, -2.0, -2.0],
                "value": [[10, 4, 6], [9, 1, 0], [1, 3, 6]]
            }
        ]
    });
    RandomForest::from_slice(&serde_json::to_vec(&doc).unwrap(), "test-forest.json").unwrap()
}

fn app_with(classifier: RiskClassifier, config: Config) -> Router {
    create_router(AppState {
        classifier,
        pool: None,
        config,
    })
}

fn app() -> Router {
    app_with(RiskClassifier::new(Arc::new(forest())), Config::default())
}

fn student(fees_up_to_date: u32, first_sem_grade: f64) -> Value {
    let mut v = StudentFeatureVector::example();
    v.tuition_fees_up_to_date = fees_up_to_date;
    v.curricular_units_1st_sem_grade = first_sem_grade;
    v.to_json()
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let (status, body) = send(app(), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Student Dropout Prediction API");
    assert!(body["endpoints"]["POST /predict"].is_string());
}

#[tokio::test]
async fn test_health_reports_model_and_persistence() {
    let (status, body) = send(app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["persistence_enabled"], false);

    let degraded = app_with(RiskClassifier::unavailable(), Config::default());
    let (_, body) = send(degraded, Method::GET, "/health", None).await;
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn test_features_lists_layout() {
    let (status, body) = send(app(), Method::GET, "/features", None).await;
    assert_eq!(status, StatusCode::OK);

    let features = body["features"].as_array().unwrap();
    assert_eq!(features.len(), 31);
    assert_eq!(features[0], "marital_status");
    assert_eq!(body["feature_descriptions"]["nationality"], "Nacionality");
    assert_eq!(body["layout"]["feature_count"], 31);
    assert_eq!(body["example"]["age_at_enrollment"], 20);
}

#[tokio::test]
async fn test_model_info() {
    let (status, body) = send(app(), Method::GET, "/model", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], "forest");
    assert_eq!(body["n_estimators"], 2);
    assert_eq!(body["checksum"].as_str().unwrap().len(), 64);

    let degraded = app_with(RiskClassifier::unavailable(), Config::default());
    let (status, body) = send(degraded, Method::GET, "/model", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "model_unavailable");
}

#[tokio::test]
async fn test_predict_high_risk_student() {
    let (status, body) = send(app(), Method::POST, "/predict", Some(student(0, 12.0))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["prediction"], "Dropout");
    assert_eq!(body["risk_level"], "High");

    let probabilities = body["probabilities"].as_object().unwrap();
    assert_eq!(probabilities.len(), 3);
    let sum: f64 = probabilities.values().map(|v| v.as_f64().unwrap()).sum();
    assert!((sum - 1.0).abs() < 1e-6);
    assert!((body["confidence"].as_f64().unwrap() - 0.85).abs() < 1e-9);
}

#[tokio::test]
async fn test_predict_missing_feature_is_bad_request() {
    let mut payload = student(1, 12.0);
    payload.as_object_mut().unwrap().remove("inflation_rate");

    let (status, body) = send(app(), Method::POST, "/predict", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["kind"], "missing_feature");
    assert_eq!(body["fields"], json!(["inflation_rate"]));
    assert!(body["error"].as_str().unwrap().contains("inflation_rate"));
}

#[tokio::test]
async fn test_predict_invalid_feature_is_bad_request() {
    let mut payload = student(1, 12.0);
    payload.as_object_mut().unwrap().insert("course".to_string(), json!("nursing"));

    let (status, body) = send(app(), Method::POST, "/predict", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_feature");
    assert_eq!(body["fields"], json!(["course"]));
}

#[tokio::test]
async fn test_predict_without_model_is_unavailable() {
    let degraded = app_with(RiskClassifier::unavailable(), Config::default());
    let (status, body) = send(degraded, Method::POST, "/predict", Some(student(1, 12.0))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Model not loaded");
}

#[tokio::test]
async fn test_batch_isolates_failures() {
    let mut malformed = student(1, 12.0);
    malformed.as_object_mut().unwrap().remove("gdp");

    let body = json!({ "students": [student(0, 5.0), malformed, student(1, 15.0)] });
    let (status, body) = send(app(), Method::POST, "/predict_batch", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["total_processed"], 3);
    assert_eq!(body["successful"], 2);
    assert_eq!(body["failed"], 1);

    let results = body["results"].as_array().unwrap();
    let indices: Vec<u64> = results.iter().map(|r| r["index"].as_u64().unwrap()).collect();
    assert_eq!(indices, vec![0, 1, 2]);

    assert_eq!(results[0]["status"], "success");
    assert_eq!(results[0]["prediction"], "Dropout");
    assert_eq!(results[1]["status"], "error");
    assert_eq!(results[1]["kind"], "missing_feature");
    assert_eq!(results[1]["fields"], json!(["gdp"]));
    assert_eq!(results[2]["status"], "success");
    assert_eq!(results[2]["risk_level"], "Low");
}

#[tokio::test]
async fn test_batch_requires_student_list() {
    let (status, body) = send(app(), Method::POST, "/predict_batch", Some(json!({"students": 3}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Students data must be a list");

    let (status, _) = send(app(), Method::POST, "/predict_batch", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_size_limit() {
    let config = Config { max_batch_size: 2, ..Config::default() };
    let limited = app_with(RiskClassifier::new(Arc::new(forest())), config);

    let body = json!({ "students": [student(0, 5.0), student(0, 5.0), student(0, 5.0)] });
    let (status, _) = send(limited, Method::POST, "/predict_batch", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_without_model_is_unavailable() {
    let degraded = app_with(RiskClassifier::unavailable(), Config::default());
    let body = json!({ "students": [student(0, 5.0)] });
    let (status, _) = send(degraded, Method::POST, "/predict_batch", Some(body)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_registry_routes_need_database() {
    let save = json!({ "student_id": "S-1001", "features": student(0, 5.0) });
    let (status, body) = send(app(), Method::POST, "/api/v1/students/high-risk", Some(save)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");

    let (status, _) = send(app(), Method::GET, "/api/v1/students/high-risk", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(app(), Method::GET, "/api/v1/students/high-risk/S-1001", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(app(), Method::DELETE, "/api/v1/students/high-risk", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(app(), Method::GET, "/api/v1/reports/high-risk-summary", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_save_validates_student_id_before_database() {
    let save = json!({ "student_id": "", "features": student(0, 5.0) });
    let (status, body) = send(app(), Method::POST, "/api/v1/students/high-risk", Some(save)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

async fn send_raw(app: Router, uri: &str, content_type: Option<&str>, body: &'static str) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }

    let response = app.oneshot(builder.body(Body::from(body)).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_malformed_json_is_structured_bad_request() {
    for body in ["not json", "[1", "{\"course\": }"] {
        let (status, body) = send_raw(app(), "/predict", Some("application/json"), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], 400);
        assert!(body["error"].is_string());
    }

    let (status, body) = send_raw(app(), "/predict_batch", Some("application/json"), "{\"students\": [").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_missing_content_type_is_structured_bad_request() {
    let (status, body) = send_raw(app(), "/predict", None, "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], 400);

    let (status, body) = send_raw(app(), "/predict", Some("text/plain"), "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_save_rejects_wrongly_shaped_body() {
    let (status, body) = send_raw(
        app(),
        "/api/v1/students/high-risk",
        Some("application/json"),
        "{\"student_id\": 42}",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_mood_routes_need_database() {
    let entry = json!({ "mood": "Happy", "stress_level": 3, "sleep_hours": 7.5, "notes": "exam week" });
    let (status, body) = send(app(), Method::POST, "/api/v1/students/S-1001/moods", Some(entry)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");

    let (status, _) = send(app(), Method::GET, "/api/v1/students/S-1001/moods?limit=10", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_mood_entry_validated_before_database() {
    let cases = [
        json!({ "mood": "Happy", "stress_level": 11, "sleep_hours": 7.0 }),
        json!({ "mood": "Happy", "stress_level": 4, "sleep_hours": 25.0 }),
        json!({ "mood": "Ecstatic", "stress_level": 4, "sleep_hours": 7.0 }),
        json!({ "mood": "Sad", "sleep_hours": 7.0 }),
    ];
    for entry in cases {
        let (status, body) =
            send(app(), Method::POST, "/api/v1/students/S-1001/moods", Some(entry.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", entry);
        assert_eq!(body["status"], "error");
    }
}

#[tokio::test]
async fn test_root_lists_mood_endpoints() {
    let (_, body) = send(app(), Method::GET, "/", None).await;
    assert!(body["endpoints"]["POST /api/v1/students/:student_id/moods"].is_string());
}

#[tokio::test]
async fn test_bad_query_string_is_structured_bad_request() {
    let (status, body) = send(app(), Method::GET, "/api/v1/students/high-risk?limit=many", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, _) = send(app(), Method::GET, "/api/v1/students/S-1/moods?limit=-", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
