use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use serde_json::{json, Value};
use tower::ServiceExt;

use navhub_api::{build_router, AppState};
use navhub_core::domain::OrphanPolicy;
use navhub_core::services::{AuthService, CapacityPolicy, HierarchyService};
use navhub_infrastructure::Store;
use navhub_security::JwtService;
use navhub_shared::config::HttpSettings;

fn test_app_with(policy: OrphanPolicy) -> Router {
    let store = Store::memory();
    let jwt = Arc::new(JwtService::new("http-test-secret", 3600));
    let auth = AuthService::new(store.users.clone(), jwt);
    let hierarchy = HierarchyService::new(
        store.menus.clone(),
        store.nodes.clone(),
        CapacityPolicy::default(),
        policy,
    );
    let http = HttpSettings {
        request_timeout_secs: 30,
        cors_origins: vec![],
    };
    build_router(AppState::new(auth, hierarchy, store.health.clone()), &http)
}

fn test_app() -> Router {
    test_app_with(OrphanPolicy::Orphan)
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, read_json(response).await)
}

async fn register(app: &Router, prefix: &str, role: &str) -> String {
    let email: String = SafeEmail().fake();
    let body = json!({
        "username": format!("{prefix}-user"),
        "email": format!("{prefix}.{email}"),
        "password": "secret123",
        "role": role,
    });
    let (status, value) = send(app, json_request(Method::POST, "/api/auth/register", None, Some(body))).await;
    assert_eq!(status, StatusCode::CREATED, "{value}");
    value["token"].as_str().unwrap().to_string()
}

async fn create_menu(app: &Router, token: &str, name: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(Method::POST, "/api/menus", Some(token), Some(json!({ "name": name }))),
    )
    .await
}

async fn create_node(app: &Router, token: &str, parent_id: &str, parent_model: &str, template: &str) -> (StatusCode, Value) {
    let body = json!({
        "name": "Child",
        "parentId": parent_id,
        "parentModel": parent_model,
        "templateType": template,
    });
    send(app, json_request(Method::POST, "/api/nodes", Some(token), Some(body))).await
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_endpoints_report_ok() {
    let app = test_app();

    let (status, body) = send(&app, json_request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, json_request(Method::GET, "/health/ready", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], "memory");
}

#[tokio::test]
async fn eleventh_menu_is_rejected_until_one_is_deleted() {
    let app = test_app();
    let admin = register(&app, "admin", "admin").await;

    let mut ids = Vec::new();
    for i in 1..=10 {
        let (status, body) = create_menu(&app, &admin, &format!("Menu {i}")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["menuId"], i);
        ids.push(id_of(&body));
    }

    let (status, body) = create_menu(&app, &admin, "Eleventh").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "CAPACITY_EXCEEDED");

    let (status, body) = send(
        &app,
        json_request(Method::DELETE, &format!("/api/menus/{}", ids[0]), Some(&admin), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Menu removed");

    let (status, body) = create_menu(&app, &admin, "Replacement").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["menuId"], 11);

    let (_, list) = send(&app, json_request(Method::GET, "/api/menus", None, None)).await;
    assert_eq!(list.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn sixth_child_of_a_parent_is_rejected() {
    let app = test_app();
    let admin = register(&app, "admin", "admin").await;
    let (_, menu_a) = create_menu(&app, &admin, "A").await;
    let (_, menu_b) = create_menu(&app, &admin, "B").await;

    for _ in 0..5 {
        let (status, _) = create_node(&app, &admin, &id_of(&menu_a), "Menu", "grid").await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, body) = create_node(&app, &admin, &id_of(&menu_a), "Menu", "grid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CAPACITY_EXCEEDED");

    // Limits are per parent.
    let (status, _) = create_node(&app, &admin, &id_of(&menu_b), "Menu", "grid").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn moving_into_a_full_parent_fails_but_staying_put_succeeds() {
    let app = test_app();
    let admin = register(&app, "admin", "admin").await;
    let (_, full) = create_menu(&app, &admin, "Full").await;
    let (_, other) = create_menu(&app, &admin, "Other").await;
    let full_id = id_of(&full);

    let mut children = Vec::new();
    for _ in 0..5 {
        let (_, node) = create_node(&app, &admin, &full_id, "Menu", "table").await;
        children.push(id_of(&node));
    }
    let (_, mover) = create_node(&app, &admin, &id_of(&other), "Menu", "table").await;

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/nodes/{}", id_of(&mover)),
            Some(&admin),
            Some(json!({ "parentId": full_id, "parentModel": "Menu" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CAPACITY_EXCEEDED");

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/nodes/{}", children[0]),
            Some(&admin),
            Some(json!({ "parentId": full_id, "parentModel": "Menu", "name": "Renamed" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");
}

#[tokio::test]
async fn container_nodes_never_keep_content() {
    let app = test_app();
    let admin = register(&app, "admin", "admin").await;
    let (_, menu) = create_menu(&app, &admin, "Root").await;

    let body = json!({
        "name": "Section",
        "parentId": id_of(&menu),
        "parentModel": "Menu",
        "templateType": "submenu",
        "contentItems": [{"title": "dropped"}],
    });
    let (status, node) = send(&app, json_request(Method::POST, "/api/nodes", Some(&admin), Some(body))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(node["templateType"], "container");
    assert_eq!(node["contentItems"], json!([]));

    let body = json!({
        "name": "Gallery",
        "parentId": id_of(&menu),
        "parentModel": "Menu",
        "templateType": "gallery",
        "contentItems": ["a", "b"],
    });
    let (_, gallery) = send(&app, json_request(Method::POST, "/api/nodes", Some(&admin), Some(body))).await;
    let (status, updated) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/nodes/{}", id_of(&gallery)),
            Some(&admin),
            Some(json!({ "templateType": "container" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["contentItems"], json!([]));
}

#[tokio::test]
async fn content_items_keep_their_order() {
    let app = test_app();
    let admin = register(&app, "admin", "admin").await;
    let (_, menu) = create_menu(&app, &admin, "Root").await;

    let items = json!([{"title": "z", "n": 1}, "plain", [3, 2, 1], null]);
    let body = json!({
        "name": "Table",
        "parentId": id_of(&menu),
        "parentModel": "Menu",
        "templateType": "table",
        "contentItems": items,
    });
    let (_, node) = send(&app, json_request(Method::POST, "/api/nodes", Some(&admin), Some(body))).await;

    let (status, fetched) = send(
        &app,
        json_request(Method::GET, &format!("/api/nodes/{}", id_of(&node)), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["contentItems"], items);
}

#[tokio::test]
async fn content_items_must_be_an_array() {
    let app = test_app();
    let admin = register(&app, "admin", "admin").await;
    let (_, menu) = create_menu(&app, &admin, "Root").await;

    let body = json!({
        "name": "Table",
        "parentId": id_of(&menu),
        "parentModel": "Menu",
        "templateType": "table",
        "contentItems": {"not": "an array"},
    });
    let (status, value) = send(&app, json_request(Method::POST, "/api/nodes", Some(&admin), Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"]["message"], "Content items must be an array.");
}

#[tokio::test]
async fn node_listing_requires_both_or_neither_filter() {
    let app = test_app();
    let admin = register(&app, "admin", "admin").await;
    let (_, menu) = create_menu(&app, &admin, "Root").await;
    let menu_id = id_of(&menu);
    let (_, section) = create_node(&app, &admin, &menu_id, "Menu", "container").await;
    create_node(&app, &admin, &id_of(&section), "Submenu", "grid").await;

    let (status, body) = send(
        &app,
        json_request(Method::GET, &format!("/api/nodes?parentId={menu_id}"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        json_request(Method::GET, &format!("/api/nodes?parentId={menu_id}&parentModel=Menu"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, json_request(Method::GET, "/api/nodes", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn mutations_require_an_admin_token() {
    let app = test_app();
    let member = register(&app, "member", "user").await;

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/menus", None, Some(json!({ "name": "X" }))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/menus", Some("not-a-jwt"), Some(json!({ "name": "X" }))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = create_menu(&app, &member, "X").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/nodes", Some(&member), Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, json_request(Method::GET, "/api/users", Some(&member), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Reads stay open.
    let (status, _) = send(&app, json_request(Method::GET, "/api/menus", None, None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn non_admin_is_forbidden_before_the_request_is_parsed() {
    let app = test_app();
    let member = register(&app, "member", "user").await;

    let cases = [
        (Method::POST, "/api/menus".to_string(), Some(json!({ "name": 5 }))),
        (Method::PUT, "/api/menus/not-a-uuid".to_string(), Some(json!({ "order": "x" }))),
        (Method::DELETE, "/api/menus/not-a-uuid".to_string(), None),
        (Method::POST, "/api/nodes".to_string(), Some(json!({ "order": "x" }))),
        (Method::PUT, "/api/nodes/not-a-uuid".to_string(), Some(json!({ "name": "Renamed" }))),
        (
            Method::PUT,
            format!("/api/nodes/{}", uuid::Uuid::new_v4()),
            Some(json!({ "contentItems": 3 })),
        ),
        (Method::DELETE, "/api/nodes/not-a-uuid".to_string(), None),
    ];

    for (method, uri, body) in cases {
        let (status, value) = send(&app, json_request(method.clone(), &uri, Some(&member), body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method} {uri}: {value}");
        assert_eq!(value["error"]["code"], "FORBIDDEN");
    }

    // A body that is not JSON at all is still refused on role first.
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/menus")
        .header(header::AUTHORIZATION, format!("Bearer {member}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_parent_and_bad_ids_are_reported() {
    let app = test_app();
    let admin = register(&app, "admin", "admin").await;

    let missing = uuid::Uuid::new_v4().to_string();
    let (status, body) = create_node(&app, &admin, &missing, "Menu", "grid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "PARENT_NOT_FOUND");

    let (status, body) = send(&app, json_request(Method::GET, "/api/menus/not-a-uuid", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        json_request(Method::GET, &format!("/api/nodes/{missing}"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = test_app();
    let admin = register(&app, "admin", "admin").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/menus")
        .header(header::AUTHORIZATION, format!("Bearer {admin}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn a_node_cannot_move_under_its_descendant() {
    let app = test_app();
    let admin = register(&app, "admin", "admin").await;
    let (_, menu) = create_menu(&app, &admin, "Root").await;
    let (_, outer) = create_node(&app, &admin, &id_of(&menu), "Menu", "container").await;
    let (_, inner) = create_node(&app, &admin, &id_of(&outer), "Node", "container").await;

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/nodes/{}", id_of(&outer)),
            Some(&admin),
            Some(json!({ "parentId": id_of(&inner), "parentModel": "Node" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/nodes/{}", id_of(&outer)),
            Some(&admin),
            Some(json!({ "parentId": id_of(&outer), "parentModel": "Node" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (_, stored) = send(&app, json_request(Method::GET, &format!("/api/nodes/{}", id_of(&outer)), None, None)).await;
    assert_eq!(stored["parentId"], id_of(&menu));
}

#[tokio::test]
async fn cascade_policy_removes_descendants() {
    let app = test_app_with(OrphanPolicy::Cascade);
    let admin = register(&app, "admin", "admin").await;
    let (_, menu) = create_menu(&app, &admin, "Root").await;
    let (_, outer) = create_node(&app, &admin, &id_of(&menu), "Menu", "container").await;
    create_node(&app, &admin, &id_of(&outer), "Node", "grid").await;

    let (status, body) = send(
        &app,
        json_request(Method::DELETE, &format!("/api/menus/{}", id_of(&menu)), Some(&admin), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removedDescendants"], 2);

    let (_, all) = send(&app, json_request(Method::GET, "/api/nodes", None, None)).await;
    assert!(all.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn register_login_and_profile() {
    let app = test_app();
    let body = json!({
        "username": "carol",
        "email": "Carol@Example.com",
        "password": "secret123",
    });
    let (status, registered) = send(&app, json_request(Method::POST, "/api/auth/register", None, Some(body.clone()))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered["email"], "carol@example.com");
    assert_eq!(registered["role"], "user");

    let (status, value) = send(&app, json_request(Method::POST, "/api/auth/register", None, Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"]["code"], "DUPLICATE_EMAIL");

    let (status, value) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "carol@example.com", "password": "wrong-pass" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(value["error"]["code"], "INVALID_CREDENTIALS");

    let (status, login) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "CAROL@example.com", "password": "secret123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = login["token"].as_str().unwrap();

    let (status, me) = send(&app, json_request(Method::GET, "/api/auth/me", Some(token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "carol");
    assert!(me.get("passwordHash").is_none());
}

#[tokio::test]
async fn short_password_is_rejected() {
    let app = test_app();
    let body = json!({ "username": "dave", "email": "dave@example.com", "password": "12345" });
    let (status, value) = send(&app, json_request(Method::POST, "/api/auth/register", None, Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"]["code"], "VALIDATION_ERROR");
}
