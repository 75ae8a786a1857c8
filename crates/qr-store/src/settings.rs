//! Key-value settings, used to remember the last generator settings.

use rusqlite::OptionalExtension;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Database, DbError};

impl Database {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, DbError> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                    row.get(0)
                })
                .optional()?)
        })
    }

    /// Insert or overwrite a setting.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE
                 SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
                [key, value],
            )?;
            Ok(())
        })
    }

    /// Read a setting stored as JSON. A stored value that no longer
    /// deserializes is reported as [`DbError::Json`].
    pub fn get_json_setting<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DbError> {
        self.get_setting(key)?
            .map(|raw| serde_json::from_str(&raw).map_err(DbError::from))
            .transpose()
    }

    pub fn set_json_setting<T: Serialize>(&self, key: &str, value: &T) -> Result<(), DbError> {
        self.set_setting(key, &serde_json::to_string(value)?)
    }
}
