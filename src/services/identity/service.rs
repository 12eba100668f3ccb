/*
 * Responsibility
 * - process 全体で共有する identity 設定 (factory + anonymous access flag)
 * - request 毎の identity 解決 (X-Identity-Status 確認 → default-deny / anonymous / 構築)
 * - role mapping の reload (factory ごと atomic に差し替え)
 */
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use super::factory::{IdentityError, IdentityFactory};
use super::gate::Denial;
use super::record::IdentityRecord;
use super::registry::RoleRegistry;

pub const IDENTITY_STATUS_HEADER: &str = "X-Identity-Status";
pub const IDENTITY_STATUS_CONFIRMED: &str = "Confirmed";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Denied(#[from] Denial),
    #[error(transparent)]
    Construction(#[from] IdentityError),
}

#[derive(Debug)]
pub struct IdentityService {
    factory: RwLock<Arc<IdentityFactory>>,
    allow_anonymous: bool,
}

impl IdentityService {
    pub fn new(registry: RoleRegistry, allow_anonymous: bool) -> Self {
        tracing::debug!(
            roles = ?registry.all_configured_application_roles(),
            allow_anonymous,
            "initialized identity gate"
        );
        Self {
            factory: RwLock::new(Arc::new(IdentityFactory::new(registry))),
            allow_anonymous,
        }
    }

    pub fn allow_anonymous(&self) -> bool {
        self.allow_anonymous
    }

    /// Factory of the active configuration. Callers keep the `Arc` for the
    /// rest of the request, so a reload never changes a request mid-flight.
    pub fn factory(&self) -> Arc<IdentityFactory> {
        self.factory.read().clone()
    }

    pub fn reload(&self, registry: RoleRegistry) {
        tracing::info!(
            roles = ?registry.all_configured_application_roles(),
            "reloading role mapping"
        );
        let next = Arc::new(IdentityFactory::new(registry));
        *self.factory.write() = next;
    }

    /// Decides which identity a request runs as.
    ///
    /// Only `X-Identity-Status: Confirmed` yields a real identity. Anything
    /// else, including a missing header set, is denied or becomes the
    /// anonymous identity when anonymous access is enabled.
    pub fn resolve(
        &self,
        headers: Option<&[(String, String)]>,
    ) -> Result<Arc<IdentityRecord>, ResolveError> {
        let factory = self.factory();

        let status = headers
            .and_then(|h| header_value(h, IDENTITY_STATUS_HEADER))
            .unwrap_or("Invalid");
        if status != IDENTITY_STATUS_CONFIRMED {
            tracing::info!(
                user_id = headers
                    .and_then(|h| header_value(h, "X-User-Id"))
                    .unwrap_or("None"),
                identity_status = status,
                "could not authenticate user"
            );
            if !self.allow_anonymous {
                tracing::debug!("anonymous access disabled, rejecting request");
                return Err(Denial::unauthenticated().into());
            }
            tracing::debug!("setting anonymous user");
            return Ok(factory.build_anonymous());
        }

        let pairs = headers.map(|h| h.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        Ok(Arc::new(factory.build(pairs)?))
    }
}

fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .rev()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::identity::DenialReason;

    fn service(allow_anonymous: bool) -> IdentityService {
        IdentityService::new(
            RoleRegistry::from_pairs([("admin_role_1", "admin")]),
            allow_anonymous,
        )
    }

    fn headers(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn confirmed_status_builds_an_identity() {
        let h = headers(&[
            ("X-Identity-Status", "Confirmed"),
            ("X-User-Id", "u-1"),
            ("X-Roles", "admin_role_1"),
        ]);

        let identity = service(false).resolve(Some(h.as_slice())).unwrap();
        assert!(!identity.is_anonymous());
        assert!(identity.has_role("admin"));
    }

    #[test]
    fn unconfirmed_status_is_denied_by_default() {
        for h in [
            headers(&[("X-Identity-Status", "Invalid")]),
            headers(&[("X-User-Id", "u-1")]),
            headers(&[]),
        ] {
            match service(false).resolve(Some(h.as_slice())) {
                Err(ResolveError::Denied(denial)) => {
                    assert_eq!(denial.reason, DenialReason::Unauthenticated)
                }
                other => panic!("expected denial, got {other:?}"),
            }
        }
    }

    #[test]
    fn unconfirmed_status_is_anonymous_when_allowed() {
        let h = headers(&[("X-Identity-Status", "Invalid"), ("X-Roles", "admin_role_1")]);

        let service = service(true);
        assert!(service.allow_anonymous());
        let identity = service.resolve(Some(h.as_slice())).unwrap();
        assert!(identity.is_anonymous());
        assert!(!identity.has_role("admin"));
    }

    #[test]
    fn missing_header_set_is_treated_as_unconfirmed() {
        assert!(service(true).resolve(None).unwrap().is_anonymous());
        assert!(matches!(
            service(false).resolve(None),
            Err(ResolveError::Denied(_))
        ));
    }

    #[test]
    fn reload_swaps_the_registry_for_new_requests_only() {
        let service = service(false);
        let h = headers(&[("X-Identity-Status", "Confirmed"), ("X-Roles", "ops")]);

        let before = service.resolve(Some(h.as_slice())).unwrap();
        service.reload(RoleRegistry::from_pairs([("ops", "admin")]));
        let after = service.resolve(Some(h.as_slice())).unwrap();

        assert!(!before.has_role("admin"));
        assert!(after.has_role("admin"));
    }
}
