//! Database connection and schema management
use std::fs;

use anyhow::{Error, Result};
use rusqlite::Connection as SyncConnection;
use tokio_rusqlite::Connection;

const DB_FILE_NAME: &str = "chat.sqlite";

/// Open the async connection to the chat database stored in the
/// directory `db_path`, creating the directory if needed.
pub async fn async_db(db_path: &str) -> Result<Connection, Error> {
    fs::create_dir_all(db_path)?;
    let path = format!("{}/{}", db_path.trim_end_matches('/'), DB_FILE_NAME);
    let db = Connection::open(path).await?;
    Ok(db)
}

/// Create all tables if they don't exist yet. Safe to run on every
/// startup.
pub fn initialize_db(conn: &SyncConnection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        r"
        BEGIN;
        CREATE TABLE IF NOT EXISTS message (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sender TEXT NOT NULL,
            text TEXT NOT NULL,
            feedback TEXT,
            parent_id INTEGER,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE INDEX IF NOT EXISTS message_sender_text_idx ON message(sender, text);
        CREATE TABLE IF NOT EXISTS upload (
            id TEXT PRIMARY KEY,
            file_name TEXT NOT NULL,
            size INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE INDEX IF NOT EXISTS upload_file_name_idx ON upload(file_name);
        COMMIT;
        ",
    )
}

fn column_names(conn: &SyncConnection, table: &str) -> Result<Vec<String>, rusqlite::Error> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .filter_map(Result::ok)
        .collect();
    Ok(names)
}

/// Upgrade a database created before feedback, reply linking and
/// uploads were tracked. The first `message` table only had `id`,
/// `sender`, and `text`.
pub fn migrate_db(conn: &SyncConnection) -> Result<(), rusqlite::Error> {
    let columns = column_names(conn, "message")?;

    // Nothing to migrate from, create everything from scratch
    if columns.is_empty() {
        return initialize_db(conn);
    }

    if !columns.iter().any(|c| c == "feedback") {
        conn.execute("ALTER TABLE message ADD COLUMN feedback TEXT", [])?;
    }
    if !columns.iter().any(|c| c == "parent_id") {
        conn.execute("ALTER TABLE message ADD COLUMN parent_id INTEGER", [])?;
    }
    if !columns.iter().any(|c| c == "created_at") {
        // SQLite won't add a column with a non-constant default so
        // existing rows get an empty timestamp
        conn.execute(
            "ALTER TABLE message ADD COLUMN created_at TEXT NOT NULL DEFAULT ''",
            [],
        )?;
    }

    initialize_db(conn)
}
