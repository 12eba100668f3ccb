//! Request-scoped "current identity".
//!
//! The identity is bound to the task that drives one request, so concurrent
//! requests never observe each other's identity. Outside a scope there is no
//! current identity.

use std::future::Future;
use std::sync::Arc;

use super::record::IdentityRecord;

tokio::task_local! {
    static CURRENT_IDENTITY: Arc<IdentityRecord>;
}

/// Runs `fut` with `identity` published as the current identity.
pub async fn scope<F>(identity: Arc<IdentityRecord>, fut: F) -> F::Output
where
    F: Future,
{
    CURRENT_IDENTITY.scope(identity, fut).await
}

pub fn current() -> Option<Arc<IdentityRecord>> {
    CURRENT_IDENTITY.try_with(Arc::clone).ok()
}
