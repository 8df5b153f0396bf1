//! Well-known role names and the admin authorization rule.
//!
//! These must match the values written to `profiles.role`.

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SUPER_ADMIN: &str = "super_admin";

/// Roles that grant access to the admin portal.
pub const ADMIN_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_SUPER_ADMIN];

/// Whether a `profiles.role` value grants admin access.
pub fn is_admin_role(role: &str) -> bool {
    ADMIN_ROLES.contains(&role)
}

/// Whether `email` appears in the superuser allowlist.
///
/// Comparison ignores ASCII case and surrounding whitespace on both sides.
pub fn email_in_allowlist(email: &str, allowlist: &[String]) -> bool {
    let email = email.trim();
    if email.is_empty() {
        return false;
    }
    allowlist
        .iter()
        .any(|allowed| allowed.trim().eq_ignore_ascii_case(email))
}

/// Decide whether a caller is an admin.
///
/// The email allowlist is a superset override: an allowlisted email is an
/// admin regardless of its profile role, and a profile with an admin role is
/// an admin regardless of the allowlist.
pub fn is_admin(email: Option<&str>, profile_role: Option<&str>, allowlist: &[String]) -> bool {
    if email.is_some_and(|e| email_in_allowlist(e, allowlist)) {
        return true;
    }
    profile_role.is_some_and(is_admin_role)
}
