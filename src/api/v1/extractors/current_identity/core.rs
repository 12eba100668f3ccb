use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::identity::{IdentityRecord, scope};

use super::CurrentIdentity;

/// middleware::identity が extensions に insert 済みである前提
/// 見つからない場合は 401 を返す (identity middleware 未設定)
impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<IdentityRecord>>()
            .cloned()
            .or_else(scope::current)
            .map(CurrentIdentity)
            .ok_or(AppError::Unauthorized)
    }
}
