//! Database schema definitions and migrations.

use rusqlite::Connection;

use crate::DbError;
use crate::templates::seed_builtin_templates;

pub fn run_migrations(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)?;
    seed_builtin_templates(conn)?;
    Ok(())
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS history (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    kind TEXT NOT NULL,
    payload TEXT NOT NULL,
    settings_json TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    preview TEXT
);

CREATE TABLE IF NOT EXISTS templates (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    kind TEXT NOT NULL,
    default_data_json TEXT NOT NULL,
    settings_json TEXT NOT NULL,
    builtin BOOLEAN NOT NULL DEFAULT false
);
"#;
