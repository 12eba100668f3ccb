use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    response::Response,
};
use serde_json::Value;
use tower::ServiceExt;

use identity_gate::app::{build_router, build_state};
use identity_gate::config::IdentityConfig;
use identity_gate::services::identity::RoleRegistry;

fn app(allow_anonymous_access: bool) -> Router {
    let roles = RoleRegistry::parse(
        "lnx-CloudServer-Admin:admin,admin_role_2:admin,support_role_1:support",
    )
    .unwrap();
    build_router(build_state(IdentityConfig {
        roles,
        allow_anonymous_access,
    }))
}

fn confirmed(path: &str, roles: &str) -> Request<Body> {
    Request::get(path)
        .header("X-Identity-Status", "Confirmed")
        .header("X-User-Id", "u-42")
        .header("X-User-Name", "alice")
        .header("X-Project-Id", "123456")
        .header("X-Project-Name", "demo")
        .header("X-Roles", roles)
        .header("X-Auth-Token", "secret-token")
        .header("Content-Type", "application/json")
        .body(Body::empty())
        .unwrap()
}

fn unconfirmed(path: &str) -> Request<Body> {
    Request::get(path)
        .header("X-Identity-Status", "Invalid")
        .body(Body::empty())
        .unwrap()
}

async fn json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_outside_the_gate() {
    let response = app(false)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn default_deny_rejects_unconfirmed_identities() {
    for request in [
        unconfirmed("/api/v1/whoami"),
        Request::get("/api/v1/whoami").body(Body::empty()).unwrap(),
    ] {
        let response = app(false).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = json(response).await;
        assert_eq!(body["code"], 401);
        assert_eq!(body["title"], "Unauthorized");
        assert_eq!(
            body["message"],
            "The request you have made requires authentication."
        );
    }
}

#[tokio::test]
async fn default_deny_covers_unknown_paths() {
    for path in ["/api/v1/nope", "/nope"] {
        let response = app(false)
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "path: {path}");
    }

    let response = app(false)
        .oneshot(confirmed("/api/v1/nope", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn default_deny_runs_before_role_guards() {
    let response = app(false).oneshot(unconfirmed("/api/v1/admin")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_exposes_normalized_attributes_and_predicates() {
    let response = app(false)
        .oneshot(confirmed("/api/v1/whoami", "lnx-CloudServer-Admin, other"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["anonymous"], false);
    assert_eq!(body["user_id"], "u-42");
    assert_eq!(body["attributes"]["project_id"], "123456");
    assert_eq!(
        body["attributes"]["roles"],
        serde_json::json!(["lnx-CloudServer-Admin", "other"])
    );
    assert!(body["attributes"].get("content_type").is_none());
    assert!(body["attributes"].get("auth_token").is_none());
    assert_eq!(body["roles"], serde_json::json!(["admin"]));
    assert_eq!(body["predicates"]["is_admin"], true);
    assert_eq!(body["predicates"]["is_support"], false);
}

#[tokio::test]
async fn role_guard_allows_mapped_role() {
    let response = app(false)
        .oneshot(confirmed("/api/v1/admin", "admin_role_2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["is_admin"], true);
    assert_eq!(body["is_support"], false);
}

#[tokio::test]
async fn role_guard_forbids_authenticated_user_without_role() {
    let response = app(false)
        .oneshot(confirmed("/api/v1/admin", "support_role_1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = json(response).await;
    assert_eq!(body["code"], 403);
    assert_eq!(body["title"], "Forbidden");
}

#[tokio::test]
async fn any_role_guard_accepts_either_role() {
    for roles in ["support_role_1", "lnx-CloudServer-Admin"] {
        let response = app(false)
            .oneshot(confirmed("/api/v1/support", roles))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "roles: {roles}");
    }

    let response = app(false)
        .oneshot(confirmed("/api/v1/support", "billing"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn anonymous_mode_leaves_unguarded_routes_open() {
    let response = app(true).oneshot(unconfirmed("/api/v1/whoami")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["anonymous"], true);
    assert_eq!(body["user_id"], Value::Null);
    assert_eq!(body["predicates"]["is_admin"], false);
    assert_eq!(body["predicates"]["is_support"], false);
}

#[tokio::test]
async fn anonymous_mode_still_applies_explicit_guards() {
    let login = app(true)
        .oneshot(unconfirmed("/api/v1/projects/current"))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);

    // login_required is declared first on /support.
    let chained = app(true).oneshot(unconfirmed("/api/v1/support")).await.unwrap();
    assert_eq!(chained.status(), StatusCode::UNAUTHORIZED);

    // /admin only asks for a role, so the anonymous identity is forbidden.
    let role_only = app(true).oneshot(unconfirmed("/api/v1/admin")).await.unwrap();
    assert_eq!(role_only.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn request_scope_carries_the_identity_to_handlers() {
    let response = app(false)
        .oneshot(confirmed("/api/v1/projects/current", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["project_id"], "123456");
    assert_eq!(body["project_name"], "demo");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let response = app(false)
        .oneshot(unconfirmed("/api/v1/whoami"))
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn non_ascii_attribute_values_reach_the_identity() {
    let mut request = confirmed("/api/v1/whoami", "");
    request.headers_mut().insert(
        "x-user-name",
        axum::http::HeaderValue::from_bytes("Jos\u{e9}".as_bytes()).unwrap(),
    );

    let response = app(false).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    assert_eq!(body["attributes"]["user_name"], "Jos\u{e9}");
}

#[tokio::test]
async fn project_endpoint_reports_project_domain() {
    let mut request = confirmed("/api/v1/projects/current", "");
    request.headers_mut().insert(
        "x-project-domain-id",
        axum::http::HeaderValue::from_static("default"),
    );

    let response = app(false).oneshot(request).await.unwrap();
    let body = json(response).await;
    assert_eq!(body["project_domain_id"], "default");
    assert!(body.get("domain_id").is_none());
}
