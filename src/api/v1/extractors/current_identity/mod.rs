/*!
 * Current identity extractor
 *
 * Responsibility:
 * - middleware が公開した IdentityRecord を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - CurrentIdentity
 */

mod core;
mod types;

pub use types::CurrentIdentity;
