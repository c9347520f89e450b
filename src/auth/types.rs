use serde::Serialize;

use super::permissions::{Permission, PermissionSet, full_permissions};
use crate::error::AppError;

/// Identity attached to a request by the active auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub groups: Vec<String>,
    pub permissions: PermissionSet,
}

impl CurrentUser {
    /// Identity used when authentication is disabled for local development.
    pub fn local_admin() -> Self {
        Self {
            id: "local".to_string(),
            email: "local@localhost".to_string(),
            display_name: "Local Admin".to_string(),
            groups: vec!["local".to_string()],
            permissions: full_permissions(),
        }
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.has(permission) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("Permission required: {permission}")))
        }
    }

    /// Admin means holding the complete permission vocabulary.
    pub fn is_admin(&self) -> bool {
        self.permissions == full_permissions()
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("Admin permissions required"))
        }
    }
}

/// Type-level permission for `PermissionGuard`.
pub trait RequiredPermission: Send + Sync + 'static {
    fn required() -> Permission;
}

pub struct ReadDolls;

impl RequiredPermission for ReadDolls {
    fn required() -> Permission {
        Permission::DollRead
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub groups: Vec<String>,
    pub permissions: Vec<&'static str>,
}

impl From<&CurrentUser> for MeResponse {
    fn from(user: &CurrentUser) -> Self {
        let mut permissions: Vec<&'static str> =
            user.permissions.iter().map(|permission| permission.as_str()).collect();
        permissions.sort_unstable();
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            groups: user.groups.clone(),
            permissions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CurrentUser, MeResponse};
    use crate::auth::permissions::Permission;
    use crate::error::AppError;

    fn kid() -> CurrentUser {
        CurrentUser {
            id: "kid".to_string(),
            email: "kid@example.com".to_string(),
            display_name: "kid".to_string(),
            groups: vec![],
            permissions: Permission::KID.into_iter().collect(),
        }
    }

    #[test]
    fn missing_permission_is_forbidden_and_named() {
        let err = kid()
            .require(Permission::DollDelete)
            .expect_err("kid cannot delete");
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(err.message(), "Permission required: doll:delete");
    }

    #[test]
    fn local_admin_is_admin() {
        assert!(CurrentUser::local_admin().is_admin());
        assert!(!kid().is_admin());
    }

    #[test]
    fn me_lists_permissions_alphabetically() {
        let me = MeResponse::from(&kid());
        assert_eq!(
            me.permissions,
            vec![
                "doll:read",
                "doll:update_location",
                "event:read",
                "photo:add",
                "photo:set_primary"
            ]
        );
    }
}
