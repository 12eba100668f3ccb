//! trusted header → IdentityRecord を構築し、request に公開する
//!
//! - upstream の identity validator が付けた `X-*` header だけを信頼する (token 検証はしない)
//! - anonymous access が無効なら、ここで login_required 相当の default-deny を行う
//! - 構築した identity は extensions と task-local scope の両方に載せる

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::identity::{IdentityRecord, ResolveError, scope};
use crate::state::AppState;

/// Apply the identity hook to every route of `router`.
///
/// Route-level guards (`middleware::guard`) run inside this layer, so the
/// default-deny always happens first.
///
/// Apply it after the fallback is set so unknown paths are gated too.
///
/// ```ignore
/// let gated = Router::new().nest("/api/v1", api::v1::routes()).fallback(not_found);
/// let app = middleware::identity::apply(gated, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, identity_middleware))
}

async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let headers = trusted_headers(req.headers());

    let identity: Arc<IdentityRecord> = match state.identity.resolve(Some(headers.as_slice())) {
        Ok(identity) => identity,
        Err(err) => {
            if let ResolveError::Denied(_) = &err {
                tracing::warn!(
                    path = %req.uri().path(),
                    "rejected request: user could not be authenticated"
                );
            }
            return Err(err.into());
        }
    };

    req.extensions_mut().insert(identity.clone());

    Ok(scope::scope(identity, next.run(req)).await)
}

/// Header pairs in canonical `X-Train-Case` form.
///
/// The HTTP stack hands names over lowercased. Values are decoded as UTF-8,
/// with invalid sequences replaced rather than dropping the header.
pub fn trusted_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = match value.to_str() {
                Ok(ascii) => ascii.to_string(),
                Err(_) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
            };
            (canonical_header_name(name.as_str()), value)
        })
        .collect()
}

/// "x-project-id" => "X-Project-Id"
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
