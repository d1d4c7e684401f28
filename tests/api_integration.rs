//! Integration tests for the REST layer against a mock ChMS server

use chms_cli::AppError;
use chms_cli::api::ChmsClient;
use chms_cli::api::models::{CurrentUser, Fellowship, NewFellowship};
use chms_cli::core::async_state::{
    AsyncState, Callback, MapOptions, StateContext, StateTag, map_to_async_state,
};
use chms_cli::core::auth::LoginInput;
use chms_cli::core::permissions::PermissionsManager;
use chms_cli::core::query_client::QueryClient;
use chms_cli::core::services::{AuthService, Repository, ResourceManager, RestRepository};
use chms_cli::core::session::{Session, SessionStore};
use chms_cli::error::ApiError;
use chms_cli::query::{QueryBuilder, QueryParams};
use chms_cli::utils::retry::RetryConfig;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user() -> CurrentUser {
    CurrentUser {
        id: "u-1".to_string(),
        email: "pastor@example.org".to_string(),
        first_name: Some("Ada".to_string()),
        last_name: None,
        role: None,
    }
}

fn session_with(actions: &[&str]) -> SessionStore {
    SessionStore::with_session(Session::new(
        user(),
        "test-token".to_string(),
        actions.iter().map(|a| a.to_string()).collect(),
    ))
}

fn client(server: &MockServer, session: SessionStore) -> ChmsClient {
    ChmsClient::new(server.uri(), session).expect("client creation failed")
}

fn fellowship_json(id: &str, name: &str) -> serde_json::Value {
    json!({ "id": id, "name": name, "description": null, "leaderId": null })
}

#[tokio::test]
async fn test_find_all_sends_serialized_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fellowships"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("name:likeLower", "%youth%"))
        .and(query_param("rangeStart", "0"))
        .and(query_param("rangeEnd", "9"))
        .and(query_param("orderBy", "name"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([fellowship_json("f-1", "Youth")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let repo: RestRepository<Fellowship> = RestRepository::new(client(&server, session_with(&[])));
    let params = QueryBuilder::new()
        .where_contains("name", "youth")
        .order_by_asc("name")
        .paginate(1, 10)
        .build()
        .unwrap();

    let fellowships = repo.find_all(&params).await.unwrap();
    assert_eq!(fellowships.len(), 1);
    assert_eq!(fellowships[0].name, "Youth");
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fellowships"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let repo: RestRepository<Fellowship> =
        RestRepository::with_retry(client(&server, session_with(&[])), RetryConfig::quick());
    let result = repo.find_all(&QueryParams::new()).await;

    assert!(matches!(
        result,
        Err(AppError::Api(ApiError::Http { status: 503, .. }))
    ));
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fellowships/f-9"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let repo: RestRepository<Fellowship> =
        RestRepository::with_retry(client(&server, session_with(&[])), RetryConfig::quick());
    let result = repo.find_one("f-9", &QueryParams::new()).await;
    assert!(matches!(result, Err(AppError::Api(ApiError::NotFound { .. }))));
}

#[tokio::test]
async fn test_missing_record_maps_to_not_found_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fellowships/f-9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let manager: ResourceManager<Fellowship> = ResourceManager::rest(
        client(&server, session_with(&["fellowship.findOne"])),
        PermissionsManager::new(session_with(&["fellowship.findOne"])),
    );
    let queries = QueryClient::default();
    let snapshot = queries
        .fetch(
            "fellowship/f-9",
            manager.find_one("f-9", &QueryParams::new()),
            Callback::noop(),
        )
        .await;

    let state = map_to_async_state(
        &snapshot,
        MapOptions::new(StateContext::new("fellowship").resource_id("f-9")),
    );
    assert_eq!(state.tag(), StateTag::NotFound);
    assert_eq!(state.message(), Some("Fellowship f-9 was not found"));
}

#[tokio::test]
async fn test_forbidden_maps_to_unauthorized_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fellowships"))
        .respond_with(ResponseTemplate::new(403).set_body_string("role lacks access"))
        .mount(&server)
        .await;

    let repo: RestRepository<Fellowship> = RestRepository::new(client(&server, session_with(&[])));
    let queries = QueryClient::default();
    let snapshot = queries
        .fetch("fellowship", repo.find_all(&QueryParams::new()), Callback::noop())
        .await;

    let context = StateContext::new("fellowship").required_permissions(["fellowship.findAll"]);
    match map_to_async_state(&snapshot, MapOptions::new(context)) {
        AsyncState::Unauthorized {
            required_permissions,
            ..
        } => assert_eq!(required_permissions, vec!["fellowship.findAll".to_string()]),
        other => panic!("expected Unauthorized, got {:?}", other.tag()),
    }
}

#[tokio::test]
async fn test_create_expects_created_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fellowships"))
        .and(body_json(json!({ "name": "Choir" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(fellowship_json("f-2", "Choir")))
        .mount(&server)
        .await;

    let repo: RestRepository<Fellowship> = RestRepository::new(client(&server, session_with(&[])));
    let created = repo
        .create(NewFellowship {
            name: "Choir".to_string(),
            description: None,
            leader_id: None,
        })
        .await
        .unwrap();
    assert_eq!(created.id, "f-2");
}

#[tokio::test]
async fn test_create_rejects_other_success_codes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fellowships"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fellowship_json("f-2", "Choir")))
        .mount(&server)
        .await;

    let repo: RestRepository<Fellowship> = RestRepository::new(client(&server, session_with(&[])));
    let result = repo
        .create(NewFellowship {
            name: "Choir".to_string(),
            description: None,
            leader_id: None,
        })
        .await;
    assert!(matches!(
        result,
        Err(AppError::Api(ApiError::UnexpectedStatus {
            expected: 201,
            actual: 200,
            ..
        }))
    ));
}

#[tokio::test]
async fn test_denied_action_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let session = session_with(&["fellowship.findAll"]);
    let manager: ResourceManager<Fellowship> = ResourceManager::rest(
        client(&server, session.clone()),
        PermissionsManager::new(session),
    );
    let result = manager.delete("f-1").await;
    assert!(matches!(result, Err(AppError::Permission(_))));
}

#[tokio::test]
async fn test_login_replaces_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "username": "ada", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "fresh-token",
            "user": { "id": "u-1", "email": "pastor@example.org", "firstName": "Ada" },
            "allowedActions": ["member.findAll", "member.create"]
        })))
        .mount(&server)
        .await;

    let session = SessionStore::new();
    let service = AuthService::new(client(&server, session.clone()));
    let user = service.login(LoginInput::new("ada", "secret")).await.unwrap();

    assert_eq!(user.display_name(), "Ada");
    assert_eq!(session.token().as_deref(), Some("fresh-token"));
    let permissions = PermissionsManager::new(session);
    assert!(permissions.can_perform_action("member.create"));
    assert!(!permissions.can_perform_action("member.delete"));
}

#[tokio::test]
async fn test_restore_with_rejected_token_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = SessionStore::new();
    let service = AuthService::new(client(&server, session.clone()));
    let result = service.restore("stale-token".to_string()).await;

    assert!(matches!(
        result,
        Err(AppError::Api(ApiError::Unauthorized { .. }))
    ));
    assert!(!session.is_authenticated());
    assert_eq!(session.token(), None);
}
