//! Role and ownership guards.
//!
//! Every mutating service goes through one of these before touching the
//! store.

use rentora_common::{AppError, AppResult};
use rentora_db::entities::{property, user, user::Role};

/// Fail with `Forbidden` unless the user holds one of the allowed roles.
pub fn require_role(user: &user::Model, allowed: &[Role]) -> AppResult<()> {
    if allowed.contains(&user.role) {
        return Ok(());
    }
    Err(AppError::Forbidden(format!(
        "requires one of roles {allowed:?}"
    )))
}

/// Fail with `Forbidden` unless the user is an admin, or is an owner and
/// owns the given property.
pub fn require_owner_or_admin(user: &user::Model, property: &property::Model) -> AppResult<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Owner if property.owner_id == user.id => Ok(()),
        _ => Err(AppError::Forbidden(
            "not the owner of this property".to_string(),
        )),
    }
}
