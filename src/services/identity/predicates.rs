//! Named `is_<role>()` predicates for consuming code.
//!
//! Roles are only known once the role mapping is loaded, so the runtime
//! surface is [`IdentityRecord::predicate`]. Code that wants real methods
//! declares the roles it relies on with [`role_predicates!`] and gets a trait
//! whose methods are exactly `has_role(<role>)`.
//!
//! ```ignore
//! identity_gate::role_predicates! {
//!     pub trait AppRoles {
//!         is_admin => "admin",
//!         is_support => "support",
//!     }
//! }
//!
//! if identity.is_admin() { /* ... */ }
//! ```
//!
//! [`IdentityRecord::predicate`]: crate::services::identity::IdentityRecord::predicate

use super::registry::RoleRegistry;

#[macro_export]
macro_rules! role_predicates {
    ($vis:vis trait $name:ident { $($method:ident => $role:literal),+ $(,)? }) => {
        $vis trait $name {
            const ROLES: &'static [&'static str] = &[$($role),+];

            $(fn $method(&self) -> bool;)+
        }

        impl $name for $crate::services::identity::IdentityRecord {
            $(
                fn $method(&self) -> bool {
                    self.has_role($role)
                }
            )+
        }
    };
}

/// Declared roles that the registry does not configure.
///
/// Their predicates are always false; startup logs them.
pub fn unconfigured<'a>(declared: &[&'a str], registry: &RoleRegistry) -> Vec<&'a str> {
    declared
        .iter()
        .copied()
        .filter(|role| !registry.is_configured(role))
        .collect()
}
