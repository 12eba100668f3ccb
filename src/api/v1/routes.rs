/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認可が必要な範囲は route_layer (middleware::guard) でここで決める
 */
use axum::{Router, routing::get};

use crate::middleware::guard;
use crate::state::AppState;

use crate::api::v1::handlers::identity::{admin, current_project, support, whoami};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/whoami", get(whoami))
        .route(
            "/projects/current",
            get(current_project).route_layer(guard::login_required()),
        )
        .route(
            "/admin",
            get(admin).route_layer(guard::requires_role("admin")),
        )
        .route(
            "/support",
            get(support).route_layer(
                guard::login_required().and_requires_any_role(["admin", "support"]),
            ),
        )
}
