/*
 * Responsibility
 * - identity 系 endpoint の response DTO
 */
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::services::identity::{AttributeValue, IdentityRecord};

// Credentials travel as identity-prefixed headers too; never echo them back.
const HIDDEN_ATTRIBUTES: &[&str] = &["auth_token", "service_token"];

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub anonymous: bool,
    pub user_id: Option<String>,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub roles: BTreeSet<String>,
    // "is_admin" => true
    pub predicates: BTreeMap<String, bool>,
}

impl From<&IdentityRecord> for WhoAmIResponse {
    fn from(identity: &IdentityRecord) -> Self {
        let predicates = identity
            .predicate_names()
            .filter_map(|name| identity.predicate(name).map(|v| (name.to_string(), v)))
            .collect();

        Self {
            anonymous: identity.is_anonymous(),
            user_id: identity.user_id().map(str::to_string),
            attributes: identity
                .attributes()
                .iter()
                .filter(|(key, _)| !HIDDEN_ATTRIBUTES.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            roles: identity.application_roles(),
            predicates,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub project_domain_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleCheckResponse {
    pub user_id: Option<String>,
    pub is_admin: bool,
    pub is_support: bool,
}
