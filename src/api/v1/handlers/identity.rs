/*
 * Responsibility
 * - identity / role を参照する handler 群
 * - 認可は route_layer (middleware::guard) 側。handler は結果を読むだけ
 */
use axum::Json;

use crate::{
    api::v1::{
        dto::identity::{ProjectResponse, RoleCheckResponse, WhoAmIResponse},
        extractors::CurrentIdentity,
        roles::AppRoles,
    },
    error::AppError,
    services::identity::scope,
};

pub async fn whoami(identity: CurrentIdentity) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse::from(&*identity))
}

/// Reads the identity from the request scope instead of an extractor.
pub async fn current_project() -> Result<Json<ProjectResponse>, AppError> {
    let identity = scope::current().ok_or(AppError::Unauthorized)?;

    Ok(Json(ProjectResponse {
        project_id: identity.project_id().map(str::to_string),
        project_name: identity.project_name().map(str::to_string),
        project_domain_id: identity.project_domain_id().map(str::to_string),
    }))
}

pub async fn admin(identity: CurrentIdentity) -> Json<RoleCheckResponse> {
    Json(role_check(&identity))
}

pub async fn support(identity: CurrentIdentity) -> Json<RoleCheckResponse> {
    Json(role_check(&identity))
}

fn role_check(identity: &CurrentIdentity) -> RoleCheckResponse {
    RoleCheckResponse {
        user_id: identity.user_id().map(str::to_string),
        is_admin: identity.is_admin(),
        is_support: identity.is_support(),
    }
}
