/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - identity: role mapping + anonymous access 設定
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::identity::IdentityService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub identity: Arc<IdentityService>,
}

impl AppState {
    pub fn new(identity: Arc<IdentityService>) -> Self {
        Self { identity }
    }
}
