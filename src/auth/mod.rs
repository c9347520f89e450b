pub mod bootstrap;
pub mod permissions;
pub mod providers;
pub mod types;

pub use permissions::{Permission, PermissionResolver, PermissionSet, parse_groups};
pub use types::{CurrentUser, MeResponse, ReadDolls, RequiredPermission};
