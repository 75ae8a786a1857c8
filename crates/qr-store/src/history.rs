//! Generation history, newest first.

use rusqlite::Row;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Database, DbError, StoredSettings, new_id};

/// Number of entries kept after each save.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: String,
    pub settings: StoredSettings,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// A history entry before it has been assigned an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: String,
    pub settings: StoredSettings,
    #[serde(default)]
    pub preview: Option<String>,
}

fn history_from_row(row: &Row<'_>) -> rusqlite::Result<(HistoryEntry, String)> {
    Ok((
        HistoryEntry {
            id: row.get(0)?,
            kind: row.get(1)?,
            payload: row.get(2)?,
            settings: StoredSettings::default(),
            timestamp: row.get(4)?,
            preview: row.get(5)?,
        },
        row.get(3)?,
    ))
}

fn insert_entry(conn: &rusqlite::Connection, entry: &HistoryEntry) -> Result<(), DbError> {
    conn.execute(
        "INSERT OR REPLACE INTO history (id, kind, payload, settings_json, timestamp, preview)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            entry.id,
            entry.kind,
            entry.payload,
            serde_json::to_string(&entry.settings)?,
            entry.timestamp,
            entry.preview,
        ],
    )?;
    Ok(())
}

impl Database {
    /// Record a generation. The oldest entries beyond [`HISTORY_LIMIT`] are dropped.
    pub fn save_history(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, DbError> {
        let entry = HistoryEntry {
            id: new_id(),
            kind: entry.kind,
            payload: entry.payload,
            settings: entry.settings,
            timestamp: chrono::Utc::now().timestamp_millis(),
            preview: entry.preview,
        };

        self.with_conn(|conn| {
            insert_entry(conn, &entry)?;
            let pruned = conn.execute(
                "DELETE FROM history WHERE seq NOT IN
                    (SELECT seq FROM history ORDER BY seq DESC LIMIT ?1)",
                [HISTORY_LIMIT as i64],
            )?;
            if pruned > 0 {
                debug!(pruned, "Pruned old history entries");
            }
            Ok(())
        })?;

        Ok(entry)
    }

    pub fn get_history(&self) -> Result<Vec<HistoryEntry>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, kind, payload, settings_json, timestamp, preview
                 FROM history ORDER BY seq DESC",
            )?;
            let rows = stmt
                .query_map([], history_from_row)?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(mut entry, settings_json)| {
                    entry.settings = serde_json::from_str(&settings_json)?;
                    Ok(entry)
                })
                .collect()
        })
    }

    pub fn delete_history(&self, id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM history WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn clear_history(&self) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM history", [])?;
            Ok(())
        })
    }

    /// Pretty-printed JSON array of the whole history, newest first.
    pub fn export_history(&self) -> Result<String, DbError> {
        let history = self.get_history()?;
        Ok(serde_json::to_string_pretty(&history)?)
    }

    /// Replace the history with a previously exported JSON array.
    ///
    /// The first element of the array becomes the newest entry. Anything
    /// other than an array is rejected and leaves the stored history as is.
    pub fn import_history(&self, json: &str) -> Result<usize, DbError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_array() {
            return Err(DbError::InvalidData(
                "history import must be a JSON array".into(),
            ));
        }
        let entries: Vec<HistoryEntry> = serde_json::from_value(value)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM history", [])?;
            for entry in entries.iter().rev() {
                insert_entry(&tx, entry)?;
            }
            tx.commit()?;
            Ok(())
        })?;

        info!(count = entries.len(), "Imported history");
        Ok(entries.len())
    }
}
