/*
 * Responsibility
 * - tracing / panic hook 初期化
 * - Config読み込み → IdentityService 生成 → Router 組み立て
 * - Middleware の適用 (identity / http)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::{Router, http::StatusCode, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::api::v1::roles::AppRoles;
use crate::config::{Config, IdentityConfig};
use crate::middleware;
use crate::services::identity::{IdentityRecord, IdentityService, predicates};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,identity_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting identity gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(config.identity);
    tracing::info!(
        allow_anonymous = state.identity.allow_anonymous(),
        "identity gate configured"
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_state(identity: IdentityConfig) -> AppState {
    let missing = predicates::unconfigured(
        <IdentityRecord as AppRoles>::ROLES,
        &identity.roles,
    );
    if !missing.is_empty() {
        tracing::warn!(
            roles = ?missing,
            "roles used by this API are not configured; their checks always fail"
        );
    }

    let service = IdentityService::new(identity.roles, identity.allow_anonymous_access);
    AppState::new(Arc::new(service))
}

/// `/health` is added after the identity layer and stays open. Everything
/// else, unknown paths included, goes through the default-deny first.
pub fn build_router(state: AppState) -> Router {
    let gated = Router::new()
        .nest("/api/v1", api::v1::routes())
        .fallback(not_found);

    let router = middleware::identity::apply(gated, state.clone())
        .route("/health", get(health))
        .with_state(state);

    middleware::http::apply(router)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
