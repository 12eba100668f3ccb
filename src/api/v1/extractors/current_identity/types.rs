/*
 * Responsibility
 * - Handler から見える「現在の identity」の型
 * - middleware が request extensions / task-local scope に載せ、handler はこの型だけを受け取る
 */
use std::ops::Deref;
use std::sync::Arc;

use crate::services::identity::IdentityRecord;

/// The identity the current request runs as (possibly anonymous).
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Arc<IdentityRecord>);

impl Deref for CurrentIdentity {
    type Target = IdentityRecord;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
