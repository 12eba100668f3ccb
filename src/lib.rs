//! Request identity and role authorization for services sitting behind an
//! identity-validating proxy.
//!
//! The proxy validates the caller's token and injects `X-*` headers
//! (`X-Identity-Status`, `X-User-Id`, `X-Project-Id`, `X-Roles`, ...). This
//! crate turns those headers into an [`IdentityRecord`], publishes it for the
//! duration of the request, and gates handlers on login and configured roles.
//!
//! [`IdentityRecord`]: services::identity::IdentityRecord

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
