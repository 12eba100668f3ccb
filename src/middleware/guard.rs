//! Route-level authorization guards.
//!
//! A [`GuardLayer`] holds an ordered list of guards and evaluates them
//! against the identity published by `middleware::identity`. The first
//! denial short-circuits the handler and becomes a 401 or 403.
//!
//! ```ignore
//! Router::new()
//!     .route("/admin", get(admin).route_layer(guard::requires_role("admin")))
//!     .route(
//!         "/reports",
//!         get(reports).route_layer(guard::login_required().and_requires_any_role(["admin", "auditor"])),
//!     );
//! ```

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::error::AppError;
use crate::services::identity::{Decision, DenialReason, Guard, IdentityRecord, gate, scope};

pub fn login_required() -> GuardLayer {
    GuardLayer::default().and_login_required()
}

pub fn requires_role(role: impl Into<String>) -> GuardLayer {
    GuardLayer::default().and_requires_role(role)
}

pub fn requires_any_role<I, R>(roles: I) -> GuardLayer
where
    I: IntoIterator<Item = R>,
    R: Into<String>,
{
    GuardLayer::default().and_requires_any_role(roles)
}

/// Ordered guard chain, applied in the order the guards were added.
#[derive(Clone, Debug, Default)]
pub struct GuardLayer {
    guards: Arc<Vec<Guard>>,
}

impl GuardLayer {
    pub fn and_login_required(self) -> Self {
        self.push(Guard::LoginRequired)
    }

    pub fn and_requires_role(self, role: impl Into<String>) -> Self {
        self.push(Guard::requires_role(role))
    }

    pub fn and_requires_any_role<I, R>(self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.push(Guard::RequiresAnyRole(
            roles.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    fn push(mut self, guard: Guard) -> Self {
        Arc::make_mut(&mut self.guards).push(guard);
        self
    }
}

impl<S> Layer<S> for GuardLayer {
    type Service = GuardService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GuardService {
            inner,
            guards: self.guards.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GuardService<S> {
    inner: S,
    guards: Arc<Vec<Guard>>,
}

impl<S> Service<Request<Body>> for GuardService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // Extensions are set by the identity hook; the task-local scope covers
        // guards mounted somewhere the extensions were not carried over.
        let identity = req
            .extensions()
            .get::<Arc<IdentityRecord>>()
            .cloned()
            .or_else(scope::current);

        if let Decision::Deny(denial) = gate::evaluate(self.guards.iter(), identity.as_deref()) {
            let user_id = identity
                .as_deref()
                .and_then(IdentityRecord::user_id)
                .unwrap_or("None");
            match denial.reason {
                DenialReason::Unauthenticated => tracing::warn!(
                    user_id,
                    path = %req.uri().path(),
                    "rejected user: could not be authenticated"
                ),
                DenialReason::InsufficientRole => tracing::info!(
                    user_id,
                    path = %req.uri().path(),
                    required = ?denial.required_roles,
                    "rejected user due to RBAC"
                ),
            }
            let response = AppError::from(denial).into_response();
            return Box::pin(async move { Ok(response) });
        }

        // The clone may not be ready; keep the instance poll_ready was called on.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(inner.call(req))
    }
}
