use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use turnover::prelude::*;

async fn setup_store(server: &MockServer) -> SupabaseStore {
    let client = Turnover::new(&server.uri(), "fake-api-key").unwrap();
    SupabaseStore::new(Arc::new(client))
}

fn cleaner_json(id: Uuid, host_id: Uuid, availability: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "host_id": host_id,
        "user_id": null,
        "full_name": "Ana",
        "email": "ana@example.com",
        "phone": null,
        "hourly_rate": 18.5,
        "availability": availability
    })
}

#[tokio::test]
async fn test_apartments_for_host_request() {
    let server = MockServer::start().await;
    let store = setup_store(&server).await;
    let host_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/apartments"))
        .and(query_param("select", "*"))
        .and(query_param("host_id", format!("eq.{}", host_id)))
        .and(query_param("order", "name.asc"))
        .and(header("apikey", "fake-api-key"))
        .and(header("Authorization", "Bearer fake-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "host_id": host_id,
            "external_id": "AIR-1",
            "name": "Loft",
            "address": null,
            "default_cleaner_id": null
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let apartments = store.apartments_for_host(host_id).await.unwrap();
    assert_eq!(apartments.len(), 1);
    assert_eq!(apartments[0].name, "Loft");
}

#[tokio::test]
async fn test_null_availability_reads_as_empty() {
    let server = MockServer::start().await;
    let store = setup_store(&server).await;
    let host_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/cleaners"))
        .and(query_param("order", "full_name.asc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([cleaner_json(Uuid::new_v4(), host_id, json!(null))])),
        )
        .mount(&server)
        .await;

    let cleaners = store.cleaners_for_host(host_id).await.unwrap();
    assert!(cleaners[0].availability.is_empty());
    assert_eq!(cleaners[0].hourly_rate, Some(18.5));
}

#[tokio::test]
async fn test_no_apartments_means_no_task_query() {
    let server = MockServer::start().await;
    let store = setup_store(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/cleaning_tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    assert!(store.tasks_for_apartments(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_tasks_for_apartments_uses_in_filter() {
    let server = MockServer::start().await;
    let store = setup_store(&server).await;
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    Mock::given(method("GET"))
        .and(path("/rest/v1/cleaning_tasks"))
        .and(query_param("apartment_id", format!("in.({},{})", a, b)))
        .and(query_param("order", "cleaning_date.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "apartment_id": a,
            "cleaner_id": null,
            "cleaning_date": "2026-10-20",
            "deadline_date": "2026-10-21",
            "note": "Spare keys in the mailbox"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = store.tasks_for_apartments(&[a, b]).await.unwrap();
    assert_eq!(tasks[0].cleaning_date.to_string(), "2026-10-20");
    assert_eq!(tasks[0].note.as_deref(), Some("Spare keys in the mailbox"));
}

#[tokio::test]
async fn test_availability_written_in_one_patch() {
    let server = MockServer::start().await;
    let store = setup_store(&server).await;
    let (id, host_id) = (Uuid::new_v4(), Uuid::new_v4());
    let dates = vec!["2026-10-30".to_string(), "2026-10-31".to_string()];

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/cleaners"))
        .and(query_param("id", format!("eq.{}", id)))
        .and(header("Prefer", "return=representation"))
        .and(body_json(json!({ "availability": dates })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([cleaner_json(id, host_id, json!(dates))])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cleaner = store.set_unavailable_dates(id, &dates).await.unwrap();
    assert_eq!(cleaner.availability, dates);
}

#[tokio::test]
async fn test_update_hidden_by_row_security_is_an_error() {
    let server = MockServer::start().await;
    let store = setup_store(&server).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/cleaning_tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let changes = TaskChanges {
        note: Some(Some("Bring towels".into())),
        ..Default::default()
    };
    let err = store.update_task(Uuid::new_v4(), &changes).await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn test_remote_message_is_surfaced() {
    let server = MockServer::start().await;
    let store = setup_store(&server).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/apartments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"apartments_external_id_key\""
        })))
        .mount(&server)
        .await;

    let new = NewApartment {
        host_id: Uuid::new_v4(),
        external_id: "AIR-1".into(),
        name: "Loft".into(),
        address: None,
        default_cleaner_id: None,
    };
    match store.insert_apartment(&new).await.unwrap_err() {
        Error::Api { status, message } => {
            assert_eq!(status, 409);
            assert!(message.starts_with("duplicate key value"));
        }
        other => panic!("Expected Error::Api, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invite_cleaner_calls_function() {
    let server = MockServer::start().await;
    let store = setup_store(&server).await;
    let host_id = Uuid::new_v4();
    let id = Uuid::new_v4();

    let invite = CleanerForm {
        full_name: "Ana".into(),
        email: "Ana@Example.com".into(),
        hourly_rate: Some(18.5),
        ..Default::default()
    }
    .into_invite(host_id, Some("https://turnover.example/set-password".into()))
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/functions/v1/invite-cleaner"))
        .and(header("apikey", "fake-api-key"))
        .and(body_json(json!({
            "host_id": host_id,
            "full_name": "Ana",
            "email": "ana@example.com",
            "phone": null,
            "hourly_rate": 18.5,
            "redirect_to": "https://turnover.example/set-password"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "cleaner": cleaner_json(id, host_id, json!([])) })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cleaner = store.invite_cleaner(&invite).await.unwrap();
    assert_eq!(cleaner.id, id);
    assert_eq!(cleaner.registration_status(), RegistrationStatus::Pending);
}

#[tokio::test]
async fn test_delete_cleaner_reports_function_error() {
    let server = MockServer::start().await;
    let store = setup_store(&server).await;
    let id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/functions/v1/delete-cleaner"))
        .and(body_json(json!({ "cleaner_id": id })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Cleaner not found"
        })))
        .mount(&server)
        .await;

    let err = store.delete_cleaner(id).await.unwrap_err();
    assert!(matches!(err, Error::Function(ref m) if m == "Cleaner not found"));
}

#[tokio::test]
async fn test_link_cleaner_only_touches_pending_rows() {
    let server = MockServer::start().await;
    let store = setup_store(&server).await;
    let user_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/cleaners"))
        .and(query_param("email", "eq.ana@example.com"))
        .and(query_param("user_id", "is.null"))
        .and(body_json(json!({ "user_id": user_id })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let linked = store
        .link_cleaner_account(" ANA@example.com ", user_id)
        .await
        .unwrap();
    assert!(linked.is_none());
}
