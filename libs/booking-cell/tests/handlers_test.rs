use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Extension, Path, State};
use axum::Json;
use axum_extra::TypedHeader;
use chrono::{Duration, SecondsFormat, Utc};
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::handlers;
use booking_cell::models::CreateBookingRequest;
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::test_utils::{MockRows, TestConfig, TestUser};

fn test_config(server: &MockServer) -> Arc<AppConfig> {
    TestConfig::with_store_url(&server.uri()).to_arc()
}

fn auth_header() -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer("test-token").expect("valid bearer"))
}

fn future_start() -> String {
    (Utc::now() + Duration::days(3)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn booking_request(professional: &TestUser, start: &str) -> CreateBookingRequest {
    serde_json::from_value(json!({
        "medicalClerkId": professional.external_id,
        "startTime": start,
        "endTime": start,
        "notes": "First consultation"
    }))
    .expect("valid request shape")
}

async fn mount_directory_user(server: &MockServer, user: &TestUser, row: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("external_id", format!("eq.{}", user.external_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn create_booking_succeeds_and_copies_meeting_link() {
    let server = MockServer::start().await;
    let patient = TestUser::base("patient@example.com");
    let professional = TestUser::medical("doc@example.com");
    let (patient_id, professional_id) = (Uuid::new_v4(), Uuid::new_v4());
    let start = future_start();

    mount_directory_user(
        &server,
        &patient,
        MockRows::user(patient_id, &patient.external_id, &patient.email, "user"),
    )
    .await;
    mount_directory_user(
        &server,
        &professional,
        MockRows::medical_user(professional_id, &professional.external_id, &professional.email),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("status", "eq.confirmed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRows::booking(Uuid::new_v4(), patient_id, professional_id, &start, "confirmed")
        ])))
        .mount(&server)
        .await;

    let result = handlers::create_booking(
        State(test_config(&server)),
        auth_header(),
        Extension(patient.to_auth_user()),
        Json(booking_request(&professional, &start)),
    )
    .await;

    let Json(body) = result.expect("booking should be created");
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["meeting_link"], "https://meet.example.com/dr-test");
}

#[tokio::test]
async fn create_booking_rejects_non_medical_professional() {
    let server = MockServer::start().await;
    let patient = TestUser::base("patient@example.com");
    let not_a_doctor = TestUser::writer("writer@example.com");
    let start = future_start();

    mount_directory_user(
        &server,
        &patient,
        MockRows::user(Uuid::new_v4(), &patient.external_id, &patient.email, "user"),
    )
    .await;
    mount_directory_user(
        &server,
        &not_a_doctor,
        MockRows::user(Uuid::new_v4(), &not_a_doctor.external_id, &not_a_doctor.email, "writer"),
    )
    .await;

    let result = handlers::create_booking(
        State(test_config(&server)),
        auth_header(),
        Extension(patient.to_auth_user()),
        Json(booking_request(&not_a_doctor, &start)),
    )
    .await;

    assert_matches!(result, Err(AppError::ValidationError(msg)) => {
        assert_eq!(msg, "This user is not a medical professional");
    });
}

#[tokio::test]
async fn create_booking_rejects_self_booking() {
    let server = MockServer::start().await;
    let professional = TestUser::medical("doc@example.com");
    let professional_id = Uuid::new_v4();
    let start = future_start();

    mount_directory_user(
        &server,
        &professional,
        MockRows::medical_user(professional_id, &professional.external_id, &professional.email),
    )
    .await;

    let result = handlers::create_booking(
        State(test_config(&server)),
        auth_header(),
        Extension(professional.to_auth_user()),
        Json(booking_request(&professional, &start)),
    )
    .await;

    assert_matches!(result, Err(AppError::ValidationError(msg)) => {
        assert_eq!(msg, "You cannot book an appointment with yourself");
    });
}

#[tokio::test]
async fn create_booking_rejects_past_start_time() {
    let server = MockServer::start().await;
    let patient = TestUser::base("patient@example.com");
    let professional = TestUser::medical("doc@example.com");
    let past = (Utc::now() - Duration::days(1)).to_rfc3339_opts(SecondsFormat::Secs, true);

    mount_directory_user(
        &server,
        &patient,
        MockRows::user(Uuid::new_v4(), &patient.external_id, &patient.email, "user"),
    )
    .await;
    mount_directory_user(
        &server,
        &professional,
        MockRows::medical_user(Uuid::new_v4(), &professional.external_id, &professional.email),
    )
    .await;

    let result = handlers::create_booking(
        State(test_config(&server)),
        auth_header(),
        Extension(patient.to_auth_user()),
        Json(booking_request(&professional, &past)),
    )
    .await;

    assert_matches!(result, Err(AppError::ValidationError(msg)) => {
        assert_eq!(msg, "Cannot book appointments in the past");
    });
}

#[tokio::test]
async fn create_booking_rejects_unknown_professional() {
    let server = MockServer::start().await;
    let patient = TestUser::base("patient@example.com");
    let ghost = TestUser::medical("ghost@example.com");
    let start = future_start();

    mount_directory_user(
        &server,
        &patient,
        MockRows::user(Uuid::new_v4(), &patient.external_id, &patient.email, "user"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("external_id", format!("eq.{}", ghost.external_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = handlers::create_booking(
        State(test_config(&server)),
        auth_header(),
        Extension(patient.to_auth_user()),
        Json(booking_request(&ghost, &start)),
    )
    .await;

    assert_matches!(result, Err(AppError::NotFound(msg)) => {
        assert_eq!(msg, "User not found");
    });
}

#[tokio::test]
async fn create_booking_rejects_taken_slot() {
    let server = MockServer::start().await;
    let patient = TestUser::base("patient@example.com");
    let professional = TestUser::medical("doc@example.com");
    let (patient_id, professional_id) = (Uuid::new_v4(), Uuid::new_v4());
    let start = future_start();

    mount_directory_user(
        &server,
        &patient,
        MockRows::user(patient_id, &patient.external_id, &patient.email, "user"),
    )
    .await;
    mount_directory_user(
        &server,
        &professional,
        MockRows::medical_user(professional_id, &professional.external_id, &professional.email),
    )
    .await;

    // A confirmed booking already sits at this start time.
    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("status", "eq.confirmed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::booking(Uuid::new_v4(), Uuid::new_v4(), professional_id, &start, "confirmed")
        ])))
        .mount(&server)
        .await;

    let result = handlers::create_booking(
        State(test_config(&server)),
        auth_header(),
        Extension(patient.to_auth_user()),
        Json(booking_request(&professional, &start)),
    )
    .await;

    assert_matches!(result, Err(AppError::Conflict(msg)) => {
        assert_eq!(msg, "This time slot is already booked");
    });
}

#[tokio::test]
async fn create_booking_lost_insert_race_reads_as_conflict() {
    let server = MockServer::start().await;
    let patient = TestUser::base("patient@example.com");
    let professional = TestUser::medical("doc@example.com");
    let start = future_start();

    mount_directory_user(
        &server,
        &patient,
        MockRows::user(Uuid::new_v4(), &patient.external_id, &patient.email, "user"),
    )
    .await;
    mount_directory_user(
        &server,
        &professional,
        MockRows::medical_user(Uuid::new_v4(), &professional.external_id, &professional.email),
    )
    .await;

    // Pre-check sees a free slot; the partial unique index still wins the
    // race and rejects the insert.
    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint"
        })))
        .mount(&server)
        .await;

    let result = handlers::create_booking(
        State(test_config(&server)),
        auth_header(),
        Extension(patient.to_auth_user()),
        Json(booking_request(&professional, &start)),
    )
    .await;

    assert_matches!(result, Err(AppError::Conflict(msg)) => {
        assert_eq!(msg, "This time slot is already booked");
    });
}

#[tokio::test]
async fn cancel_booking_succeeds_for_patient() {
    let server = MockServer::start().await;
    let patient = TestUser::base("patient@example.com");
    let (patient_id, professional_id, booking_id) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let start = future_start();

    mount_directory_user(
        &server,
        &patient,
        MockRows::user(patient_id, &patient.external_id, &patient.email, "user"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::booking(booking_id, patient_id, professional_id, &start, "confirmed")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::booking(booking_id, patient_id, professional_id, &start, "cancelled")
        ])))
        .mount(&server)
        .await;

    let result = handlers::cancel_booking(
        State(test_config(&server)),
        Path(booking_id),
        auth_header(),
        Extension(patient.to_auth_user()),
    )
    .await;

    let Json(body) = result.expect("cancellation should succeed");
    assert_eq!(body["status"], "cancelled");
}

#[tokio::test]
async fn cancel_booking_twice_is_rejected() {
    let server = MockServer::start().await;
    let patient = TestUser::base("patient@example.com");
    let (patient_id, booking_id) = (Uuid::new_v4(), Uuid::new_v4());
    let start = future_start();

    mount_directory_user(
        &server,
        &patient,
        MockRows::user(patient_id, &patient.external_id, &patient.email, "user"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::booking(booking_id, patient_id, Uuid::new_v4(), &start, "cancelled")
        ])))
        .mount(&server)
        .await;

    let result = handlers::cancel_booking(
        State(test_config(&server)),
        Path(booking_id),
        auth_header(),
        Extension(patient.to_auth_user()),
    )
    .await;

    assert_matches!(result, Err(AppError::Conflict(msg)) => {
        assert_eq!(msg, "Booking is already cancelled");
    });
}

#[tokio::test]
async fn cancel_booking_rejects_non_participant() {
    let server = MockServer::start().await;
    let bystander = TestUser::base("bystander@example.com");
    let booking_id = Uuid::new_v4();
    let start = future_start();

    mount_directory_user(
        &server,
        &bystander,
        MockRows::user(Uuid::new_v4(), &bystander.external_id, &bystander.email, "user"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::booking(booking_id, Uuid::new_v4(), Uuid::new_v4(), &start, "confirmed")
        ])))
        .mount(&server)
        .await;

    let result = handlers::cancel_booking(
        State(test_config(&server)),
        Path(booking_id),
        auth_header(),
        Extension(bystander.to_auth_user()),
    )
    .await;

    assert_matches!(result, Err(AppError::Forbidden(msg)) => {
        assert_eq!(msg, "Not authorized to modify this booking");
    });
}

#[tokio::test]
async fn cancel_missing_booking_is_not_found() {
    let server = MockServer::start().await;
    let patient = TestUser::base("patient@example.com");

    mount_directory_user(
        &server,
        &patient,
        MockRows::user(Uuid::new_v4(), &patient.external_id, &patient.email, "user"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = handlers::cancel_booking(
        State(test_config(&server)),
        Path(Uuid::new_v4()),
        auth_header(),
        Extension(patient.to_auth_user()),
    )
    .await;

    assert_matches!(result, Err(AppError::NotFound(msg)) => {
        assert_eq!(msg, "Booking not found");
    });
}

#[tokio::test]
async fn my_bookings_attach_professional_profile() {
    let server = MockServer::start().await;
    let patient = TestUser::base("patient@example.com");
    let (patient_id, professional_id) = (Uuid::new_v4(), Uuid::new_v4());
    let start = future_start();

    mount_directory_user(
        &server,
        &patient,
        MockRows::user(patient_id, &patient.external_id, &patient.email, "user"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("patient_id", format!("eq.{}", patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::booking(Uuid::new_v4(), patient_id, professional_id, &start, "confirmed")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("in.({})", professional_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::medical_user(professional_id, "user_prof", "doc@example.com")
        ])))
        .mount(&server)
        .await;

    let result = handlers::get_my_bookings(
        State(test_config(&server)),
        auth_header(),
        Extension(patient.to_auth_user()),
    )
    .await;

    let Json(body) = result.expect("listing should succeed");
    assert_eq!(body[0]["medical_user"]["specialty"], "Nutritionist");
}

#[tokio::test]
async fn public_upcoming_listing_hides_patient_identity() {
    let server = MockServer::start().await;
    let professional = TestUser::medical("doc@example.com");
    let professional_id = Uuid::new_v4();
    let start = future_start();

    mount_directory_user(
        &server,
        &professional,
        MockRows::medical_user(professional_id, &professional.external_id, &professional.email),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("select", "start_time,end_time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "start_time": start, "end_time": start }
        ])))
        .mount(&server)
        .await;

    let result = handlers::get_bookings_for_professional(
        State(test_config(&server)),
        Path(professional.external_id.clone()),
    )
    .await;

    let Json(body) = result.expect("listing should succeed");
    assert!(body[0].get("patient_id").is_none());
    assert!(body[0].get("start_time").is_some());
}
