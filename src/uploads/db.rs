//! Database queries for upload metadata
use anyhow::{Error, Result};
use rusqlite::OptionalExtension;
use tokio_rusqlite::{Connection, params};

use super::Upload;

pub async fn insert_upload(
    db: &Connection,
    id: &str,
    file_name: &str,
    size: i64,
) -> Result<Upload, Error> {
    let id = id.to_owned();
    let file_name = file_name.to_owned();
    let upload = db
        .call(move |conn| {
            let upload = conn.query_row(
                r"
                INSERT INTO upload (id, file_name, size) VALUES (?, ?, ?)
                RETURNING id, file_name, size, created_at
                ",
                params![id, file_name, size],
                |row| {
                    Ok(Upload {
                        id: row.get(0)?,
                        file_name: row.get(1)?,
                        size: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )?;
            Ok(upload)
        })
        .await?;

    Ok(upload)
}

/// Find the most recent upload with the client supplied name.
pub async fn find_upload_by_name(
    db: &Connection,
    file_name: &str,
) -> Result<Option<Upload>, Error> {
    let file_name = file_name.to_owned();
    let upload = db
        .call(move |conn| {
            let upload = conn
                .query_row(
                    r"
                    SELECT id, file_name, size, created_at
                    FROM upload
                    WHERE file_name = ?
                    ORDER BY rowid DESC
                    LIMIT 1
                    ",
                    [file_name],
                    |row| {
                        Ok(Upload {
                            id: row.get(0)?,
                            file_name: row.get(1)?,
                            size: row.get(2)?,
                            created_at: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            Ok(upload)
        })
        .await?;

    Ok(upload)
}
