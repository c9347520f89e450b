use anyhow::{Result, bail};
use axum::http::HeaderName;

use super::AppConfig;
use crate::auth::providers::AuthMode;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if cfg.general.port == 0 {
        errors.push("general.port must be > 0".to_string());
    }

    let database = &cfg.database;
    if database.url.trim().is_empty() {
        errors.push("database.url must not be empty".to_string());
    } else if !database.url.trim().to_ascii_lowercase().starts_with("sqlite:") {
        errors.push("database.url must use the sqlite:// scheme".to_string());
    }

    if database.max_connections == 0 {
        errors.push("database.max_connections must be > 0".to_string());
    }

    if database.min_connections > database.max_connections {
        errors.push(format!(
            "database.min_connections ({}) must be <= database.max_connections ({})",
            database.min_connections, database.max_connections
        ));
    }

    let auth = &cfg.auth;
    if auth.mode == AuthMode::Disabled && !auth.allow_insecure_local {
        errors.push(
            "auth.mode = disabled requires auth.allow_insecure_local = true".to_string(),
        );
    }

    for (key, value) in [
        ("auth.header_user", &auth.header_user),
        ("auth.header_email", &auth.header_email),
        ("auth.header_groups", &auth.header_groups),
    ] {
        if HeaderName::from_bytes(value.trim().as_bytes()).is_err() {
            errors.push(format!("{key} must be a valid header name"));
        }
    }

    if auth.admin_group.trim().is_empty() {
        errors.push("auth.admin_group must not be empty".to_string());
    }

    if auth.editor_group.trim().is_empty() {
        errors.push("auth.editor_group must not be empty".to_string());
    }

    if cfg.storage.photos_dir.as_os_str().is_empty() {
        errors.push("storage.photos_dir must not be empty".to_string());
    }

    if cfg.storage.max_upload_bytes == 0 {
        errors.push("storage.max_upload_bytes must be > 0".to_string());
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
