use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::db as uploads_db;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Upload {
    pub id: String,
    pub file_name: String,
    pub size: i64,
    pub created_at: String,
}

impl Upload {
    /// Location of the stored bytes inside the uploads directory.
    pub fn path(&self, uploads_dir: &str) -> PathBuf {
        Path::new(uploads_dir).join(&self.id)
    }
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No file provided")]
    MissingFile,

    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Reject names that could be interpreted as a path. The name is
/// never used to build a path but it is echoed back in URLs.
pub fn validate_file_name(file_name: &str) -> Result<(), UploadError> {
    let invalid = file_name.trim().is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(UploadError::InvalidFileName(file_name.to_string()));
    }
    Ok(())
}

/// Write `bytes` to the uploads directory and record it under the
/// client supplied `file_name`. Uploading the same name again keeps
/// both files but only the latest is served.
pub async fn store_upload(
    db: &Connection,
    uploads_dir: &str,
    file_name: &str,
    bytes: &[u8],
) -> Result<Upload, UploadError> {
    validate_file_name(file_name)?;

    let id = Uuid::new_v4().to_string();
    fs::create_dir_all(uploads_dir).await?;
    fs::write(Path::new(uploads_dir).join(&id), bytes).await?;

    let upload = uploads_db::insert_upload(db, &id, file_name, bytes.len() as i64).await?;
    tracing::info!(
        id = %upload.id,
        file_name = %upload.file_name,
        size = upload.size,
        "Stored upload"
    );

    Ok(upload)
}

pub async fn find_upload(db: &Connection, file_name: &str) -> Result<Option<Upload>, UploadError> {
    Ok(uploads_db::find_upload_by_name(db, file_name).await?)
}

/// Load the bytes of the latest upload named `file_name`.
pub async fn read_upload(
    db: &Connection,
    uploads_dir: &str,
    file_name: &str,
) -> Result<(Upload, Vec<u8>), UploadError> {
    let upload = find_upload(db, file_name)
        .await?
        .ok_or_else(|| UploadError::NotFound(file_name.to_string()))?;

    let bytes = match fs::read(upload.path(uploads_dir)).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Upload {} is recorded but missing on disk", upload.id);
            return Err(UploadError::NotFound(file_name.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    Ok((upload, bytes))
}
