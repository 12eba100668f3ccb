/*
 * Responsibility
 * - この API が前提とする application role の宣言
 * - is_<role>() を IdentityRecord に生やす (中身は has_role)
 */
crate::role_predicates! {
    pub trait AppRoles {
        is_admin => "admin",
        is_support => "support",
    }
}
