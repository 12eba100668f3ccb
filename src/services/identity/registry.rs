/*
 * Responsibility
 * - upstream role → application role の対応表 (起動時に一度だけ構築、以後 read-only)
 * - membership 解決と is_<role> predicate 名の登録
 */
use std::collections::{BTreeMap, BTreeSet, HashMap};

use thiserror::Error;

pub const PREDICATE_PREFIX: &str = "is_";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoleConfigError {
    #[error("role mapping entry '{0}' must look like 'upstream_role:application_role'")]
    MalformedEntry(String),
    #[error("role mapping entry '{0}' has an empty role name")]
    EmptyName(String),
}

/// Configured mapping from upstream roles to application roles.
///
/// Many upstream roles may map to one application role. When the same
/// upstream role is configured twice, the later mapping wins.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    by_upstream: HashMap<String, String>,
    application_roles: BTreeSet<String>,
    // "is_admin" => "admin"
    predicates: BTreeMap<String, String>,
}

impl RoleRegistry {
    pub fn from_pairs<I, U, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (U, A)>,
        U: Into<String>,
        A: Into<String>,
    {
        let mut by_upstream: HashMap<String, String> = HashMap::new();
        for (upstream, application) in pairs {
            let upstream = upstream.into();
            let application = application.into();
            if let Some(previous) = by_upstream.insert(upstream.clone(), application.clone())
                && previous != application
            {
                tracing::warn!(
                    upstream_role = %upstream,
                    previous = %previous,
                    current = %application,
                    "upstream role configured twice; later mapping wins"
                );
            }
        }

        let application_roles: BTreeSet<String> = by_upstream.values().cloned().collect();
        let predicates = application_roles
            .iter()
            .map(|role| (format!("{PREDICATE_PREFIX}{role}"), role.clone()))
            .collect();

        Self {
            by_upstream,
            application_roles,
            predicates,
        }
    }

    /// Parses `upstream:application` pairs separated by commas.
    ///
    /// An empty (or all-whitespace) string yields an empty registry.
    pub fn parse(raw: &str) -> Result<Self, RoleConfigError> {
        let mut pairs = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (upstream, application) = entry
                .split_once(':')
                .ok_or_else(|| RoleConfigError::MalformedEntry(entry.to_string()))?;
            let (upstream, application) = (upstream.trim(), application.trim());
            if upstream.is_empty() || application.is_empty() {
                return Err(RoleConfigError::EmptyName(entry.to_string()));
            }
            pairs.push((upstream, application));
        }

        Ok(Self::from_pairs(pairs))
    }

    pub fn application_role_for(&self, upstream_role: &str) -> Option<&str> {
        self.by_upstream.get(upstream_role).map(String::as_str)
    }

    /// Upstream roles without a configured mapping are dropped.
    pub fn application_roles_for<'a, I>(&self, upstream_roles: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        upstream_roles
            .into_iter()
            .filter_map(|role| self.application_role_for(role))
            .map(str::to_string)
            .collect()
    }

    pub fn all_configured_application_roles(&self) -> &BTreeSet<String> {
        &self.application_roles
    }

    pub fn is_configured(&self, application_role: &str) -> bool {
        self.application_roles.contains(application_role)
    }

    /// Resolves a predicate name such as `is_admin` to its application role.
    pub fn predicate_role(&self, predicate: &str) -> Option<&str> {
        self.predicates.get(predicate).map(String::as_str)
    }

    pub fn predicate_names(&self) -> impl Iterator<Item = &str> {
        self.predicates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_upstream.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_upstream.is_empty()
    }
}
