//! Admin-tunable application settings with hardcoded defaults. Stored rows
//! override the defaults; unknown keys are rejected at the API boundary.

use crate::error::ApiError;
use crate::store::db;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;

pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("game.allow_multiple_submissions", "false"),
    ("game.points_multiplier", "1.0"),
    ("game.leaderboard_size", "10"),
    ("access.enable_registration", "true"),
    ("access.enable_mobile_api", "true"),
    ("access.maintenance_mode", "false"),
    ("access.maintenance_message", "We'll be back shortly."),
];

pub fn is_known_key(key: &str) -> bool {
    DEFAULT_SETTINGS.iter().any(|(k, _)| *k == key)
}

pub fn to_bool(val: &str) -> bool {
    matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<String, ApiError> {
    let stored: Option<String> = conn
        .query_row("SELECT value FROM app_settings WHERE key = ?1", params![key], |row| {
            row.get(0)
        })
        .optional()?;
    if let Some(v) = stored {
        return Ok(v);
    }
    Ok(DEFAULT_SETTINGS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
        .unwrap_or_default())
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<(), ApiError> {
    conn.execute(
        "INSERT INTO app_settings (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, db::now()],
    )?;
    Ok(())
}

/// Defaults merged with stored overrides, sorted by key.
pub fn settings_map(conn: &Connection) -> Result<BTreeMap<String, String>, ApiError> {
    let mut map: BTreeMap<String, String> = DEFAULT_SETTINGS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let mut stmt = conn.prepare("SELECT key, value FROM app_settings")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
    for row in rows {
        let (k, v) = row?;
        map.insert(k, v);
    }
    Ok(map)
}

pub fn get_bool(conn: &Connection, key: &str) -> Result<bool, ApiError> {
    Ok(to_bool(&get_setting(conn, key)?))
}

pub fn get_f64(conn: &Connection, key: &str, default: f64) -> Result<f64, ApiError> {
    Ok(get_setting(conn, key)?.trim().parse().unwrap_or(default))
}

pub fn get_i64(conn: &Connection, key: &str, default: i64) -> Result<i64, ApiError> {
    Ok(get_setting(conn, key)?.trim().parse().unwrap_or(default))
}

/// Gate for the mobile endpoints. Maintenance mode takes precedence over the
/// mobile-API switch.
pub fn api_guard(conn: &Connection) -> Result<(), ApiError> {
    if get_bool(conn, "access.maintenance_mode")? {
        let msg = get_setting(conn, "access.maintenance_message")?;
        return Err(ApiError::Unavailable(msg));
    }
    if !get_bool(conn, "access.enable_mobile_api")? {
        return Err(ApiError::Unavailable("Mobile API is disabled by admin".into()));
    }
    Ok(())
}
