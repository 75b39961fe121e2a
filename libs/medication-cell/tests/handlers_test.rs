use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, State},
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use medication_cell::handlers::{list_medications, parse_schedule, save_medications};
use medication_cell::models::{
    MedicationSchedule, ParseScheduleRequest, SaveMedicationsRequest,
};
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

fn mock_config(mock_server: &MockServer) -> AppConfig {
    TestConfig::default()
        .with_supabase_url(&mock_server.uri())
        .with_openai_base_url(&mock_server.uri())
        .to_app_config()
}

fn auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

fn schedule(name: &str, alert_times: &[&str]) -> MedicationSchedule {
    MedicationSchedule {
        name: name.to_string(),
        dosage: "500mg".to_string(),
        frequency: Some("twice a day".to_string()),
        alert_times: alert_times.iter().map(|s| s.to_string()).collect(),
        end_date: None,
        notes: None,
    }
}

#[tokio::test]
async fn test_parse_schedule_success() {
    let mock_server = MockServer::start().await;
    let config = mock_config(&mock_server);
    let user = TestUser::default();

    let content = json!([
        {
            "name": "Amoxicillin",
            "dosage": "500mg",
            "frequency": "three times a day",
            "alert_times": ["08:00", "14:00", "20:00"],
            "end_date": "2025-11-20",
            "notes": null
        }
    ])
    .to_string();

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })))
        .mount(&mock_server)
        .await;

    let result = parse_schedule(
        State(Arc::new(config)),
        Extension(user.to_user()),
        Json(ParseScheduleRequest {
            instructions: "Take Amoxicillin 500mg three times a day for 7 days".to_string(),
        }),
    )
    .await;

    let schedules = result.unwrap().0;
    assert_eq!(schedules.len(), 1);
    assert_eq!(schedules[0].name, "Amoxicillin");
    assert_eq!(schedules[0].alert_times, vec!["08:00", "14:00", "20:00"]);
    assert!(schedules[0].end_date.is_some());
}

#[tokio::test]
async fn test_parse_schedule_rejects_empty_instructions() {
    let mock_server = MockServer::start().await;
    let config = mock_config(&mock_server);
    let user = TestUser::default();

    let result = parse_schedule(
        State(Arc::new(config)),
        Extension(user.to_user()),
        Json(ParseScheduleRequest {
            instructions: "   ".to_string(),
        }),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_parse_schedule_empty_result_is_an_error() {
    let mock_server = MockServer::start().await;
    let config = mock_config(&mock_server);
    let user = TestUser::default();

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "[]" } }]
        })))
        .mount(&mock_server)
        .await;

    let result = parse_schedule(
        State(Arc::new(config)),
        Extension(user.to_user()),
        Json(ParseScheduleRequest {
            instructions: "the weather is nice today".to_string(),
        }),
    )
    .await;

    match result.unwrap_err() {
        AppError::ValidationError(msg) => assert!(msg.contains("Could not understand")),
        other => panic!("Expected ValidationError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_save_medications_success() {
    let mock_server = MockServer::start().await;
    let config = mock_config(&mock_server);
    let user = TestUser::patient("pat@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("POST"))
        .and(path("/rest/v1/medications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::medication_row(&user.id, "Amoxicillin", &["08:00", "20:00"])
        ])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let result = save_medications(
        State(Arc::new(config)),
        Extension(user.to_user()),
        auth_header(&token),
        Json(SaveMedicationsRequest {
            medications: vec![
                schedule("Amoxicillin", &["08:00", "20:00"]),
                schedule("Metformin", &["21:00"]),
            ],
        }),
    )
    .await;

    let response = result.unwrap().0;
    assert_eq!(response.saved, 2);
    assert_eq!(response.total, 2);
}

#[tokio::test]
async fn test_save_medications_reports_partial_failure() {
    let mock_server = MockServer::start().await;
    let config = mock_config(&mock_server);
    let user = TestUser::patient("pat@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    // First insert succeeds, the second blows up
    Mock::given(method("POST"))
        .and(path("/rest/v1/medications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::medication_row(&user.id, "Amoxicillin", &["08:00"])
        ])))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/medications"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockSupabaseResponses::error_response("insert failed", "PGRST500"),
        ))
        .mount(&mock_server)
        .await;

    let result = save_medications(
        State(Arc::new(config)),
        Extension(user.to_user()),
        auth_header(&token),
        Json(SaveMedicationsRequest {
            medications: vec![
                schedule("Amoxicillin", &["08:00"]),
                schedule("Metformin", &["21:00"]),
            ],
        }),
    )
    .await;

    match result.unwrap_err() {
        AppError::Database(msg) => {
            assert!(msg.contains("Only saved 1/2"));
            assert!(msg.contains("Metformin"));
        }
        other => panic!("Expected Database error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_save_medications_rejects_bad_alert_time_before_persisting() {
    let mock_server = MockServer::start().await;
    let config = mock_config(&mock_server);
    let user = TestUser::default();
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    // Validation failure must short-circuit before any insert
    Mock::given(method("POST"))
        .and(path("/rest/v1/medications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = save_medications(
        State(Arc::new(config)),
        Extension(user.to_user()),
        auth_header(&token),
        Json(SaveMedicationsRequest {
            medications: vec![schedule("Amoxicillin", &["8 in the morning"])],
        }),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_list_medications() {
    let mock_server = MockServer::start().await;
    let config = mock_config(&mock_server);
    let user = TestUser::patient("pat@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("GET"))
        .and(path("/rest/v1/medications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::medication_row(&user.id, "Amoxicillin", &["08:00", "20:00"]),
            MockSupabaseResponses::medication_row(&user.id, "Metformin", &["21:00"]),
        ])))
        .mount(&mock_server)
        .await;

    let result = list_medications(
        State(Arc::new(config)),
        Extension(user.to_user()),
        auth_header(&token),
    )
    .await;

    let medications = result.unwrap().0;
    assert_eq!(medications.len(), 2);
    assert_eq!(medications[0]["name"], "Amoxicillin");
}
