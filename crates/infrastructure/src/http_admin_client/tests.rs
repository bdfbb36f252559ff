use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;
use warden_application::{AdminSessionRepository, AdminUserRepository, BatchUserAction};
use warden_core::{AccessToken, AppError};
use warden_domain::{AdminUser, SystemRole, UserId, UserStatus, WorkspaceRole};

use super::wire::{MemberListWire, RoleOptionsWire, UserWire, Wrapped, parse_timestamp};
use super::{HttpAdminClient, map_status_error};

/// Answers a single request with a canned response and returns the raw request.
async fn serve_once(status_line: &'static str, body: String) -> (Url, JoinHandle<String>) {
    let response = format!(
        "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    serve_raw(response).await
}

async fn serve_raw(response: String) -> (Url, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|_| panic!("test"));
    let address = listener.local_addr().unwrap_or_else(|_| panic!("test"));

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap_or_else(|_| panic!("test"));
        let mut raw = Vec::new();
        let mut buffer = [0_u8; 4096];
        loop {
            let read = stream
                .read(&mut buffer)
                .await
                .unwrap_or_else(|_| panic!("test"));
            raw.extend_from_slice(&buffer[..read]);
            if read == 0 || request_complete(&raw) {
                break;
            }
        }

        stream
            .write_all(response.as_bytes())
            .await
            .unwrap_or_else(|_| panic!("test"));
        let _ = stream.shutdown().await;

        String::from_utf8_lossy(&raw).into_owned()
    });

    let base_url = Url::parse(&format!("http://{address}/console/api"))
        .unwrap_or_else(|_| panic!("test"));
    (base_url, handle)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    raw.len() >= header_end + 4 + content_length
}

fn client(base_url: Url) -> HttpAdminClient {
    HttpAdminClient::new(
        base_url,
        AccessToken::new("token-123").unwrap_or_else(|_| panic!("test")),
        Duration::from_secs(5),
    )
    .unwrap_or_else(|_| panic!("test"))
}

fn user_id(value: &str) -> UserId {
    UserId::new(value).unwrap_or_else(|_| panic!("test"))
}

#[test]
fn status_codes_map_to_error_kinds() {
    let body = r#"{"error": "nope"}"#;

    assert_eq!(
        map_status_error(StatusCode::BAD_REQUEST, body),
        AppError::Validation("nope".to_owned())
    );
    assert_eq!(
        map_status_error(StatusCode::UNPROCESSABLE_ENTITY, body),
        AppError::Validation("nope".to_owned())
    );
    assert_eq!(
        map_status_error(StatusCode::UNAUTHORIZED, body),
        AppError::Unauthorized("nope".to_owned())
    );
    assert_eq!(
        map_status_error(StatusCode::FORBIDDEN, body),
        AppError::Forbidden("nope".to_owned())
    );
    assert_eq!(
        map_status_error(StatusCode::NOT_FOUND, body),
        AppError::NotFound("nope".to_owned())
    );
    assert_eq!(
        map_status_error(StatusCode::CONFLICT, body),
        AppError::Conflict("nope".to_owned())
    );
    assert!(matches!(
        map_status_error(StatusCode::BAD_GATEWAY, body),
        AppError::Internal(message) if message.contains("nope")
    ));
}

#[test]
fn error_message_falls_back_to_message_key_and_reason() {
    assert_eq!(
        map_status_error(StatusCode::CONFLICT, r#"{"message": "email taken"}"#),
        AppError::Conflict("email taken".to_owned())
    );
    assert_eq!(
        map_status_error(StatusCode::NOT_FOUND, "<html>"),
        AppError::NotFound("Not Found".to_owned())
    );
}

#[test]
fn timestamps_parse_from_numbers_and_strings() {
    assert_eq!(parse_timestamp(&json!(1_700_000_000)), Some(1_700_000_000));
    assert_eq!(parse_timestamp(&json!(1_700_000_000.9)), Some(1_700_000_000));
    assert_eq!(parse_timestamp(&json!("1700000000")), Some(1_700_000_000));
    assert_eq!(
        parse_timestamp(&json!("2023-11-14T22:13:20+00:00")),
        Some(1_700_000_000)
    );
    assert_eq!(
        parse_timestamp(&json!("2023-11-14 22:13:20")),
        Some(1_700_000_000)
    );
    assert_eq!(parse_timestamp(&json!("None")), None);
    assert_eq!(parse_timestamp(&json!("")), None);
    assert_eq!(parse_timestamp(&json!("yesterday")), None);
    assert_eq!(parse_timestamp(&json!(null)), None);
}

#[test]
fn user_detail_accepts_wrapped_and_bare_shapes() {
    let user = json!({
        "id": "u-1",
        "name": "Ada",
        "email": "ada@example.com",
        "avatar": "https://cdn.example.com/ada.png",
        "system_role": "super_admin",
        "status": "active",
        "created_at": "1700000000",
        "last_login_at": null,
        "workspaces": [{"id": "ws-1", "name": "Research", "role": "owner", "created_at": 1_700_000_000}]
    });

    let wrapped: Wrapped<UserWire> =
        serde_json::from_value(json!({ "data": user.clone() })).unwrap_or_else(|_| panic!("test"));
    let bare: Wrapped<UserWire> = serde_json::from_value(user).unwrap_or_else(|_| panic!("test"));

    let wrapped = AdminUser::try_from(wrapped.into_inner()).unwrap_or_else(|_| panic!("test"));
    let bare = AdminUser::try_from(bare.into_inner()).unwrap_or_else(|_| panic!("test"));

    assert_eq!(wrapped, bare);
    assert_eq!(wrapped.system_role, SystemRole::SystemAdmin);
    assert_eq!(wrapped.status, UserStatus::Active);
    assert_eq!(wrapped.created_at, Some(1_700_000_000));
    assert_eq!(wrapped.last_login_at, None);
    assert_eq!(
        wrapped.avatar_url.as_deref(),
        Some("https://cdn.example.com/ada.png")
    );
    assert_eq!(wrapped.workspaces[0].role, WorkspaceRole::Owner);
}

#[test]
fn unknown_wire_values_fall_back() {
    let user: UserWire = serde_json::from_value(json!({
        "id": "u-2",
        "system_role": "overlord",
        "status": "frozen",
        "workspaces": [{"id": "ws-1", "role": "intern"}]
    }))
    .unwrap_or_else(|_| panic!("test"));

    let user = AdminUser::try_from(user).unwrap_or_else(|_| panic!("test"));

    assert_eq!(user.system_role, SystemRole::User);
    assert_eq!(user.status, UserStatus::Closed);
    assert_eq!(user.workspaces[0].role, WorkspaceRole::Normal);
}

#[test]
fn role_options_use_local_labels_and_drop_unknown_values() {
    let options: RoleOptionsWire = serde_json::from_value(json!({
        "roles": [
            {"value": "super_admin", "label": "Super Admin"},
            {"value": "system_admin", "label": "System Admin"},
            {"value": "workspace_admin", "label": "Workspace Admin"},
            {"value": "wizard", "label": "Wizard"}
        ]
    }))
    .unwrap_or_else(|_| panic!("test"));

    let roles = options.system_roles();

    let values: Vec<SystemRole> = roles.iter().map(|option| option.value).collect();
    assert_eq!(values, vec![SystemRole::SystemAdmin, SystemRole::TenantManager]);
    assert_eq!(roles[0].label, SystemRole::SystemAdmin.label());

    let workspace_options: RoleOptionsWire = serde_json::from_value(json!({
        "data": [{"value": "owner"}, {"value": "editor"}]
    }))
    .unwrap_or_else(|_| panic!("test"));
    let workspace_values: Vec<WorkspaceRole> = workspace_options
        .workspace_roles()
        .iter()
        .map(|option| option.value)
        .collect();
    assert_eq!(
        workspace_values,
        vec![WorkspaceRole::Owner, WorkspaceRole::Editor]
    );
}

#[test]
fn member_list_reads_workspace_name_from_object() {
    let list: MemberListWire = serde_json::from_value(json!({
        "data": [{"id": "u-1", "name": "Ada", "role": "owner", "joined_at": "2023-11-14 22:13:20"}],
        "workspace": {"id": "ws-1", "name": "Research"},
        "page": 1,
        "limit": 100,
        "total": 1,
        "has_more": false
    }))
    .unwrap_or_else(|_| panic!("test"));

    let page = list
        .into_member_page(1, 100)
        .unwrap_or_else(|_| panic!("test"));

    assert_eq!(page.workspace_name.as_deref(), Some("Research"));
    assert_eq!(page.members.total, 1);
    assert!(!page.members.has_more);
    assert_eq!(page.members.items[0].user_id, user_id("u-1"));
    assert_eq!(page.members.items[0].joined_at, Some(1_700_000_000));
}

#[tokio::test]
async fn get_user_sends_bearer_token_and_unwraps_data() {
    let body = json!({
        "data": {"id": "u-1", "name": "Ada", "email": "ada@example.com", "system_role": "tenant_manager"}
    })
    .to_string();
    let (base_url, request) = serve_once("200 OK", body).await;

    let user = client(base_url)
        .get_user(&user_id("u-1"))
        .await
        .unwrap_or_else(|_| panic!("test"));
    let request = request.await.unwrap_or_else(|_| panic!("test"));

    assert_eq!(user.system_role, SystemRole::TenantManager);
    assert!(request.starts_with("GET /console/api/custom/admin/users/u-1 HTTP/1.1"));
    assert!(
        request
            .to_ascii_lowercase()
            .contains("authorization: bearer token-123")
    );
}

#[tokio::test]
async fn not_found_body_becomes_not_found_error() {
    let (base_url, request) =
        serve_once("404 Not Found", json!({"error": "User not found"}).to_string()).await;

    let result = client(base_url).get_user(&user_id("ghost")).await;
    let _ = request.await;

    assert_eq!(result, Err(AppError::NotFound("User not found".to_owned())));
}

#[tokio::test]
async fn batch_request_carries_ids_and_action() {
    let body = json!({
        "processed": 1,
        "failed": 1,
        "errors": [{"id": "u-2", "error": "User not found"}]
    })
    .to_string();
    let (base_url, request) = serve_once("200 OK", body).await;

    let report = client(base_url)
        .batch_user_action(&[user_id("u-1"), user_id("u-2")], BatchUserAction::Disable)
        .await
        .unwrap_or_else(|_| panic!("test"));
    let request = request.await.unwrap_or_else(|_| panic!("test"));

    assert_eq!(report.processed, 1);
    assert_eq!(report.failed_ids(), vec![user_id("u-2")]);
    assert!(request.starts_with("POST /console/api/custom/admin/users/batch HTTP/1.1"));
    let payload = request
        .split("\r\n\r\n")
        .nth(1)
        .unwrap_or_else(|| panic!("test"));
    let payload: serde_json::Value =
        serde_json::from_str(payload).unwrap_or_else(|_| panic!("test"));
    assert_eq!(payload, json!({"user_ids": ["u-1", "u-2"], "action": "disable"}));
}

#[tokio::test]
async fn session_without_feature_flag_reads_as_disabled() {
    let (base_url, request) =
        serve_once("200 OK", json!({"system_role": "normal"}).to_string()).await;

    let session = client(base_url)
        .current_session()
        .await
        .unwrap_or_else(|_| panic!("test"));
    let _ = request.await;

    assert_eq!(session.system_role, SystemRole::User);
    assert!(!session.multi_workspace_permission_enabled);
}

#[tokio::test]
async fn truncated_success_body_is_an_internal_error() {
    let response = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 64\r\nconnection: close\r\n\r\n{\"ok\""
        .to_owned();
    let (base_url, request) = serve_raw(response).await;

    let result = client(base_url).delete_user(&user_id("u-1")).await;
    let _ = request.await;

    assert!(matches!(
        result,
        Err(AppError::Internal(message)) if message.starts_with("failed to read admin API response")
    ));
}
