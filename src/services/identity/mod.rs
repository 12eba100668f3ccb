/*
 * Responsibility
 * - identity 導出と role 認可のエンジン (axum 非依存)
 *   attribute → registry → record/factory → scope → gate
 * - HTTP への配線は middleware 側
 */
pub mod attribute;
pub mod factory;
pub mod gate;
pub mod predicates;
pub mod record;
pub mod registry;
pub mod scope;
pub mod service;

pub use attribute::AttributeValue;
pub use factory::{IdentityError, IdentityFactory};
pub use gate::{Decision, Denial, DenialReason, Guard};
pub use record::IdentityRecord;
pub use registry::{RoleConfigError, RoleRegistry};
pub use service::{IdentityService, ResolveError};
