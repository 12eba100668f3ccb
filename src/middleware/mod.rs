/*
 * Responsibility
 * - middleware の公開インターフェース
 * - identity: trusted header → IdentityRecord (global, default-deny)
 * - guard: route 単位の login_required / requires_role
 * - http: request id / trace / limit / timeout
 */
pub mod guard;
pub mod http;
pub mod identity;
