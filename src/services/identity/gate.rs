/*
 * Responsibility
 * - 認可判定 (login_required / requires_role) を Decision として返す
 * - HTTP には依存しない。401/403 への変換は error.rs 側
 */
use std::fmt;

use thiserror::Error;

use super::record::IdentityRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    Unauthenticated,
    InsufficientRole,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InsufficientRole => "insufficient-role",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured "no" from the gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("access denied: {reason}")]
pub struct Denial {
    pub reason: DenialReason,
    /// Roles the failing guard asked for (empty for `login_required`).
    pub required_roles: Vec<String>,
}

impl Denial {
    pub fn unauthenticated() -> Self {
        Self {
            reason: DenialReason::Unauthenticated,
            required_roles: Vec::new(),
        }
    }

    pub fn insufficient_role(required_roles: Vec<String>) -> Self {
        Self {
            reason: DenialReason::InsufficientRole,
            required_roles,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(denial) => Err(denial),
        }
    }
}

/// A guard attachable to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    LoginRequired,
    /// Passes when the identity holds at least one of the roles.
    RequiresAnyRole(Vec<String>),
}

impl Guard {
    pub fn requires_role(role: impl Into<String>) -> Self {
        Self::RequiresAnyRole(vec![role.into()])
    }

    pub fn check(&self, identity: Option<&IdentityRecord>) -> Decision {
        match self {
            Self::LoginRequired => login_required(identity),
            Self::RequiresAnyRole(roles) => requires_any_role(identity, roles.as_slice()),
        }
    }
}

/// ALLOW iff a non-anonymous identity is published.
pub fn login_required(identity: Option<&IdentityRecord>) -> Decision {
    match identity {
        Some(identity) if !identity.is_anonymous() => Decision::Allow,
        _ => Decision::Deny(Denial::unauthenticated()),
    }
}

/// A missing identity is treated like the anonymous one: it denies.
pub fn requires_role(identity: Option<&IdentityRecord>, role: &str) -> Decision {
    requires_any_role(identity, &[role])
}

pub fn requires_any_role<R: AsRef<str>>(
    identity: Option<&IdentityRecord>,
    roles: &[R],
) -> Decision {
    match identity {
        Some(identity) if identity.has_any_role(roles) => Decision::Allow,
        _ => Decision::Deny(Denial::insufficient_role(
            roles.iter().map(|r| r.as_ref().to_string()).collect(),
        )),
    }
}

/// Applies guards in declaration order; the first denial wins.
pub fn evaluate<'a, I>(guards: I, identity: Option<&IdentityRecord>) -> Decision
where
    I: IntoIterator<Item = &'a Guard>,
{
    guards
        .into_iter()
        .map(|guard| guard.check(identity))
        .find(|decision| !decision.is_allowed())
        .unwrap_or(Decision::Allow)
}
