/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - gate の Denial / identity 構築エラーを統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::identity::{Denial, DenialReason, IdentityError, ResolveError};

/// `{"code": 401, "title": "Unauthorized", "message": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub title: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, title, message) = match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "The request you have made requires authentication.",
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Forbidden",
                "The provided credentials were accepted, but were not sufficient to access this resource.",
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "internal server error",
            ),
        };

        let body = ErrorResponse {
            code: status.as_u16(),
            title,
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        match denial.reason {
            DenialReason::Unauthenticated => AppError::Unauthorized,
            DenialReason::InsufficientRole => AppError::Forbidden,
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        // The upstream validator must always hand over headers; this is a wiring bug.
        tracing::error!(error = %e, "identity construction failed");
        AppError::Internal
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::Denied(denial) => denial.into(),
            ResolveError::Construction(e) => e.into(),
        }
    }
}
