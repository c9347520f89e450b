use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "doll:read")]
    DollRead,
    #[serde(rename = "doll:create")]
    DollCreate,
    #[serde(rename = "doll:update_location")]
    DollUpdateLocation,
    #[serde(rename = "doll:rename")]
    DollRename,
    #[serde(rename = "doll:delete")]
    DollDelete,
    #[serde(rename = "photo:add")]
    PhotoAdd,
    #[serde(rename = "photo:set_primary")]
    PhotoSetPrimary,
    #[serde(rename = "event:read")]
    EventRead,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::DollRead,
        Permission::DollCreate,
        Permission::DollUpdateLocation,
        Permission::DollRename,
        Permission::DollDelete,
        Permission::PhotoAdd,
        Permission::PhotoSetPrimary,
        Permission::EventRead,
    ];

    /// Default set for members of neither the admin nor the editor group.
    pub const KID: [Permission; 5] = [
        Permission::DollRead,
        Permission::DollUpdateLocation,
        Permission::PhotoAdd,
        Permission::PhotoSetPrimary,
        Permission::EventRead,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::DollRead => "doll:read",
            Permission::DollCreate => "doll:create",
            Permission::DollUpdateLocation => "doll:update_location",
            Permission::DollRename => "doll:rename",
            Permission::DollDelete => "doll:delete",
            Permission::PhotoAdd => "photo:add",
            Permission::PhotoSetPrimary => "photo:set_primary",
            Permission::EventRead => "event:read",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type PermissionSet = BTreeSet<Permission>;

pub fn full_permissions() -> PermissionSet {
    Permission::ALL.into_iter().collect()
}

/// Maps group membership to permissions. First matching rule wins:
/// admin group → everything, editor group → everything but `doll:delete`,
/// otherwise the kid set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionResolver {
    admin_group: String,
    editor_group: String,
}

impl PermissionResolver {
    pub fn new(admin_group: impl Into<String>, editor_group: impl Into<String>) -> Self {
        Self {
            admin_group: admin_group.into(),
            editor_group: editor_group.into(),
        }
    }

    pub fn from_config(cfg: &AuthConfig) -> Self {
        Self::new(cfg.admin_group.trim(), cfg.editor_group.trim())
    }

    pub fn resolve<S: AsRef<str>>(&self, groups: &[S]) -> PermissionSet {
        let member_of = |wanted: &str| groups.iter().any(|group| group.as_ref() == wanted);

        if member_of(&self.admin_group) {
            return full_permissions();
        }
        if member_of(&self.editor_group) {
            return Permission::ALL
                .into_iter()
                .filter(|permission| *permission != Permission::DollDelete)
                .collect();
        }
        Permission::KID.into_iter().collect()
    }
}

/// Splits a raw group header. Commas, semicolons and whitespace all delimit.
pub fn parse_groups(raw: &str) -> Vec<String> {
    raw.split(|ch: char| ch == ',' || ch == ';' || ch.is_whitespace())
        .filter(|group| !group.is_empty())
        .map(str::to_string)
        .collect()
}
