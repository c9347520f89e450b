pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_PERMISSIVE_CORS: bool = true;
pub const DEFAULT_RUST_LOG: &str = "info,tower_http=info";
pub const DEFAULT_DB_URL: &str = "sqlite://data/db/app.sqlite?mode=rwc";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_DB_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_DB_ACQUIRE_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_HEADER_USER: &str = "X-Forwarded-User";
pub const DEFAULT_HEADER_EMAIL: &str = "X-Forwarded-Email";
pub const DEFAULT_HEADER_GROUPS: &str = "X-Forwarded-Groups";
pub const DEFAULT_ADMIN_GROUP: &str = "dolls_admin";
pub const DEFAULT_EDITOR_GROUP: &str = "dolls_editor";
pub const DEFAULT_PHOTOS_DIR: &str = "data/photos";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
