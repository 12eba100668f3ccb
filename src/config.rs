/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, APP_ENV, role mapping, anonymous access)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 */
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::services::identity::{RoleConfigError, RoleRegistry};

pub const DEFAULT_IDENTITY_GROUP: &str = "IDENTITY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("invalid role mapping in {key}: {source}")]
    Roles {
        key: String,
        #[source]
        source: RoleConfigError,
    },
}

/// Identity settings read from one variable group, e.g. `IDENTITY_ROLES`.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub roles: RoleRegistry,
    pub allow_anonymous_access: bool,
}

impl IdentityConfig {
    pub fn from_env_group(group: &str) -> Result<Self, ConfigError> {
        let lookup = |key: &str| std::env::var(key).ok();
        Self::from_lookup(group, lookup)
    }

    /// Reads `{group}_ROLES` (required) and `{group}_ALLOW_ANONYMOUS_ACCESS`.
    pub fn from_lookup<F>(group: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let roles_key = format!("{group}_ROLES");
        let raw_roles = lookup(&roles_key)
            .ok_or_else(|| ConfigError::Missing(roles_key.clone()))?;
        let roles = RoleRegistry::parse(&raw_roles).map_err(|source| ConfigError::Roles {
            key: roles_key,
            source,
        })?;

        let anonymous_key = format!("{group}_ALLOW_ANONYMOUS_ACCESS");
        let allow_anonymous_access = match lookup(&anonymous_key) {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid(anonymous_key))?,
            None => false,
        };

        Ok(Self {
            roles,
            allow_anonymous_access,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub identity: IdentityConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT".into()))?;

        let app_env = AppEnv::from_env();

        let group = std::env::var("IDENTITY_CONFIG_GROUP")
            .unwrap_or_else(|_| DEFAULT_IDENTITY_GROUP.to_string());
        let identity = IdentityConfig::from_env_group(&group.to_ascii_uppercase())?;

        Ok(Self {
            addr,
            app_env,
            identity,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<IdentityConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        IdentityConfig::from_lookup("IDENTITY", |key| vars.get(key).cloned())
    }

    #[test]
    fn reads_roles_and_anonymous_flag() {
        let config = load(&[
            ("IDENTITY_ROLES", "admin_role_1:admin,admin_role_2:admin,support_role_1:support"),
            ("IDENTITY_ALLOW_ANONYMOUS_ACCESS", "True"),
        ])
        .unwrap();

        assert!(config.allow_anonymous_access);
        assert_eq!(config.roles.len(), 3);
        assert_eq!(config.roles.application_role_for("admin_role_2"), Some("admin"));
    }

    #[test]
    fn anonymous_access_defaults_to_off() {
        let config = load(&[("IDENTITY_ROLES", "")]).unwrap();
        assert!(!config.allow_anonymous_access);
        assert!(config.roles.is_empty());
    }

    #[test]
    fn missing_roles_fail_fast() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(key) if key == "IDENTITY_ROLES"));
    }

    #[test]
    fn malformed_roles_fail_fast() {
        let err = load(&[("IDENTITY_ROLES", "admin_role_1=admin")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Roles {
                source: RoleConfigError::MalformedEntry(_),
                ..
            }
        ));
    }

    #[test]
    fn invalid_anonymous_flag_fails_fast() {
        let err = load(&[
            ("IDENTITY_ROLES", "a:b"),
            ("IDENTITY_ALLOW_ANONYMOUS_ACCESS", "maybe"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn group_prefix_selects_variables() {
        let config = IdentityConfig::from_lookup("MY_APP", |key| {
            (key == "MY_APP_ROLES").then(|| "ops:admin".to_string())
        })
        .unwrap();
        assert!(config.roles.is_configured("admin"));
    }
}
