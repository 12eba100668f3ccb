/*
 * Responsibility
 * - 1 リクエスト分の認証主体 (IdentityRecord)
 * - attribute 参照と role membership predicate (has_role / is_<role>)
 *
 * Notes
 * - predicate は保存しない。raw_roles と RoleRegistry から都度計算する
 * - 構築後は immutable
 */
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::attribute::AttributeValue;
use super::registry::RoleRegistry;

pub const ROLES_KEY: &str = "roles";

#[derive(Debug, Clone)]
pub struct IdentityRecord {
    attributes: BTreeMap<String, AttributeValue>,
    raw_roles: BTreeSet<String>,
    anonymous: bool,
    registry: Arc<RoleRegistry>,
}

impl IdentityRecord {
    pub(crate) fn authenticated(
        attributes: BTreeMap<String, AttributeValue>,
        registry: Arc<RoleRegistry>,
    ) -> Self {
        let raw_roles = attributes
            .get(ROLES_KEY)
            .and_then(AttributeValue::as_list)
            .map(|roles| roles.iter().cloned().collect())
            .unwrap_or_default();

        Self {
            attributes,
            raw_roles,
            anonymous: false,
            registry,
        }
    }

    pub(crate) fn anonymous(registry: Arc<RoleRegistry>) -> Self {
        Self {
            attributes: BTreeMap::new(),
            raw_roles: BTreeSet::new(),
            anonymous: true,
            registry,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attribute(key).and_then(AttributeValue::as_str)
    }

    /// Upstream role names as delivered by the identity validator.
    pub fn raw_roles(&self) -> &BTreeSet<String> {
        &self.raw_roles
    }

    /// Application roles this identity holds under the bound registry.
    pub fn application_roles(&self) -> BTreeSet<String> {
        if self.anonymous {
            return BTreeSet::new();
        }
        self.registry.application_roles_for(&self.raw_roles)
    }

    /// Membership in a configured application role.
    ///
    /// Never fails: unconfigured role names and the anonymous identity both
    /// evaluate to `false`.
    pub fn has_role(&self, application_role: &str) -> bool {
        if self.anonymous {
            return false;
        }
        if !self.registry.is_configured(application_role) {
            tracing::warn!(
                role = %application_role,
                user_id = self.user_id().unwrap_or("None"),
                "membership queried for a role that is not configured"
            );
            return false;
        }

        self.raw_roles
            .iter()
            .any(|raw| self.registry.application_role_for(raw) == Some(application_role))
    }

    pub fn has_any_role<R: AsRef<str>>(&self, application_roles: &[R]) -> bool {
        application_roles.iter().any(|r| self.has_role(r.as_ref()))
    }

    /// Registry-driven `is_<role>` dispatch.
    ///
    /// Returns `None` when no predicate with that name was registered.
    pub fn predicate(&self, name: &str) -> Option<bool> {
        self.registry
            .predicate_role(name)
            .map(|role| self.has_role(role))
    }

    pub fn predicate_names(&self) -> impl Iterator<Item = &str> {
        self.registry.predicate_names()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.attribute_str("user_id")
    }

    pub fn user_name(&self) -> Option<&str> {
        self.attribute_str("user_name")
    }

    pub fn user_domain_id(&self) -> Option<&str> {
        self.attribute_str("user_domain_id")
    }

    pub fn user_domain_name(&self) -> Option<&str> {
        self.attribute_str("user_domain_name")
    }

    pub fn project_id(&self) -> Option<&str> {
        self.attribute_str("project_id")
    }

    pub fn project_name(&self) -> Option<&str> {
        self.attribute_str("project_name")
    }

    pub fn project_domain_id(&self) -> Option<&str> {
        self.attribute_str("project_domain_id")
    }

    pub fn project_domain_name(&self) -> Option<&str> {
        self.attribute_str("project_domain_name")
    }

    pub fn domain_id(&self) -> Option<&str> {
        self.attribute_str("domain_id")
    }

    pub fn domain_name(&self) -> Option<&str> {
        self.attribute_str("domain_name")
    }

    pub fn identity_status(&self) -> Option<&str> {
        self.attribute_str("identity_status")
    }

    pub fn roles(&self) -> Option<&[String]> {
        self.attribute(ROLES_KEY).and_then(AttributeValue::as_list)
    }
}
