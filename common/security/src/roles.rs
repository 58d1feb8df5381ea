use common_auth::{Identity, Role};
use tracing::warn;

use crate::SecurityError;

pub const MANAGE_ROLES: &[Role] = &[Role::Editor, Role::Superuser];
pub const ADMIN_ROLES: &[Role] = &[Role::Superuser];

pub fn ensure_role(identity: &Identity, required: Role) -> Result<(), SecurityError> {
    if identity.role == required { return Ok(()); }
    warn!(user_id = identity.id, ?required, role = %identity.role, "role_check_failed");
    Err(SecurityError::Forbidden)
}

pub fn ensure_any_role(identity: &Identity, required: &[Role]) -> Result<(), SecurityError> {
    if identity.has_any_role(required) { return Ok(()); }
    warn!(user_id = identity.id, ?required, role = %identity.role, "any_role_check_failed");
    Err(SecurityError::Forbidden)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_identity(role: Role) -> Identity {
        Identity { id: 1, role, sector: None, profile_incomplete: false, profile_image: None, issued_at: None, expires_at: None }
    }

    #[test]
    fn viewer_cannot_manage() {
        assert_eq!(ensure_any_role(&mk_identity(Role::Viewer), MANAGE_ROLES), Err(SecurityError::Forbidden));
    }

    #[test]
    fn editor_manages_but_is_not_admin() {
        let editor = mk_identity(Role::Editor);
        assert!(ensure_any_role(&editor, MANAGE_ROLES).is_ok());
        assert!(ensure_any_role(&editor, ADMIN_ROLES).is_err());
        assert!(ensure_role(&editor, Role::Editor).is_ok());
    }
}
