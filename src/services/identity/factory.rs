/*
 * Responsibility
 * - trusted header set から IdentityRecord を構築する
 * - anonymous identity は factory 毎に 1 つだけ持ち、共有する
 */
use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use super::attribute;
use super::record::IdentityRecord;
use super::registry::RoleRegistry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    // Integration fault: the upstream validator must always hand over a header set.
    #[error("no header set was supplied to build an identity from")]
    MissingHeaderSet,
}

#[derive(Debug)]
pub struct IdentityFactory {
    registry: Arc<RoleRegistry>,
    anonymous: Arc<IdentityRecord>,
}

impl IdentityFactory {
    pub fn new(registry: RoleRegistry) -> Self {
        let registry = Arc::new(registry);
        let anonymous = Arc::new(IdentityRecord::anonymous(registry.clone()));
        Self {
            registry,
            anonymous,
        }
    }

    /// Best-effort projection of the identity headers.
    ///
    /// Headers outside the identity prefix are ignored, and when two headers
    /// normalize to the same key the later one wins. An empty set is valid;
    /// only a missing set is a fault.
    pub fn build<'a, I>(&self, headers: Option<I>) -> Result<IdentityRecord, IdentityError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let headers = headers.ok_or(IdentityError::MissingHeaderSet)?;

        let attributes: BTreeMap<_, _> = headers
            .into_iter()
            .filter_map(|(name, value)| attribute::map_header(name, value))
            .collect();

        Ok(IdentityRecord::authenticated(attributes, self.registry.clone()))
    }

    /// Shared anonymous identity for this registry generation.
    pub fn build_anonymous(&self) -> Arc<IdentityRecord> {
        self.anonymous.clone()
    }
}
