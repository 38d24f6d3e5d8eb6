use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use user_search_widget::domain::model::FormDraft;
use user_search_widget::domain::ports::{CreateUserRequest, UserDirectory};
use user_search_widget::utils::error::ErrorCategory;
use user_search_widget::widgets::ListContent;
use user_search_widget::{FormField, HttpUserDirectory, PageHost, SearchSelect, WidgetConfig};

const SEARCH_PATH: &str = "/sales/ajax/search-users/";
const CREATE_PATH: &str = "/sales/ajax/create-user/";

fn directory_for(server: &MockServer) -> HttpUserDirectory {
    HttpUserDirectory::from_endpoints(Some(&server.base_url()), SEARCH_PATH, CREATE_PATH).unwrap()
}

fn users_body() -> serde_json::Value {
    json!({
        "success": true,
        "users": [
            {
                "id": 7,
                "username": "ana.rojas",
                "email": "ana@example.com",
                "first_name": "Ana",
                "last_name": "Rojas",
                "full_name": "Ana Rojas"
            },
            {
                "id": 8,
                "username": "anibal",
                "email": "anibal@example.com",
                "first_name": "",
                "last_name": "",
                "full_name": ""
            }
        ]
    })
}

#[tokio::test]
async fn test_search_sends_query_parameter() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start();
    let search_mock = server.mock(|when, then| {
        when.method(GET).path(SEARCH_PATH).query_param("q", "ana");
        then.status(200).json_body(users_body());
    });

    let directory = directory_for(&server);
    let users = directory.search(Some("ana")).await?;

    search_mock.assert();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].display_name(), "Ana Rojas");
    // full_name 為空時以 username 顯示
    assert_eq!(users[1].display_name(), "anibal");
    Ok(())
}

#[tokio::test]
async fn test_initial_search_without_query() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start();
    let search_mock = server.mock(|when, then| {
        when.method(GET).path(SEARCH_PATH);
        then.status(200).json_body(users_body());
    });

    let users = directory_for(&server).search(None).await?;

    search_mock.assert();
    assert_eq!(users.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_search_failure_message_is_kept() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(SEARCH_PATH);
        then.status(200)
            .json_body(json!({"success": false, "message": "Permission denied"}));
    });

    let err = directory_for(&server).search(Some("ana")).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ServiceFailure);
    assert_eq!(err.to_string(), "Service reported failure: Permission denied");
}

#[tokio::test]
async fn test_non_json_body_is_transport_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(SEARCH_PATH);
        then.status(500).body("<html>Server Error</html>");
    });

    let err = directory_for(&server).search(Some("ana")).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TransportFailure);
}

#[tokio::test]
async fn test_create_posts_multipart_with_token() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start();
    let create_mock = server.mock(|when, then| {
        when.method(POST)
            .path(CREATE_PATH)
            .header("X-CSRFToken", "csrf-abc")
            .body_contains("juan.perez")
            .body_contains("name=\"cedula\"");
        then.status(200).json_body(json!({
            "success": true,
            "message": "Usuario creado",
            "user": {
                "id": 42,
                "username": "juan.perez",
                "email": "juan@example.com",
                "first_name": "Juan",
                "last_name": "Pérez",
                "full_name": "Juan Pérez",
                "cedula": "12345678-9",
                "fecha_nacimiento": "1990-04-01",
                "latitud": -17.78,
                "longitud": -63.18
            }
        }));
    });

    let mut draft = FormDraft::default();
    draft.set(FormField::FirstName, "Juan");
    draft.set(FormField::LastName, "Pérez");
    draft.set(FormField::Email, "juan@example.com");
    draft.set(FormField::Username, "juan.perez");
    draft.set(FormField::NationalId, "12345678-9");
    draft.set(FormField::Password, "temp123");
    let request = CreateUserRequest {
        draft,
        csrf_token: "csrf-abc".to_string(),
    };

    let response = directory_for(&server).create(&request).await?;

    create_mock.assert();
    assert_eq!(response.message.as_deref(), Some("Usuario creado"));
    assert_eq!(response.user.account.id, 42);
    assert_eq!(response.user.national_id.as_deref(), Some("12345678-9"));
    assert!(response.user.birth_date.is_some());
    assert!(response.user.location().is_some());
    Ok(())
}

#[tokio::test]
async fn test_create_field_errors_become_validation_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(CREATE_PATH);
        then.status(200).json_body(json!({
            "success": false,
            "errors": {
                "email": ["already exists"],
                "username": "taken"
            }
        }));
    });

    let request = CreateUserRequest {
        draft: FormDraft::default(),
        csrf_token: "csrf-abc".to_string(),
    };
    let err = directory_for(&server).create(&request).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::ValidationFailure);
    let payload = err.payload().unwrap();
    assert_eq!(payload.render(), "already exists\ntaken");
}

#[tokio::test]
async fn test_search_select_over_http() -> Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start();
    let search_mock = server.mock(|when, then| {
        when.method(GET).path(SEARCH_PATH);
        then.status(200).json_body(users_body());
    });

    let mut config = WidgetConfig::default();
    config.search.debounce_delay_ms = 50;
    let page = PageHost::new();
    let widget =
        SearchSelect::initialize(std::sync::Arc::new(directory_for(&server)), config, page).await?;
    widget.on_focus();

    widget.on_input_changed("an");
    widget.on_input_changed("ana");
    tokio::time::sleep(Duration::from_millis(400)).await;

    // 初始載入一次，防抖後的搜尋一次
    assert_eq!(search_mock.hits(), 2);
    match widget.view().list {
        ListContent::Candidates(candidates) => assert_eq!(candidates.len(), 2),
        other => panic!("unexpected list: {:?}", other),
    }

    let selected = widget.select_index(0).unwrap();
    assert_eq!(selected.id, 7);
    assert_eq!(widget.value(), Some(7));
    Ok(())
}
