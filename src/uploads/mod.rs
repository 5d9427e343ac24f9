//! Storage for files attached to chat messages.
//!
//! Files are written under a generated UUID key inside the uploads
//! directory. The name supplied by the client is only kept as
//! metadata so it never touches the filesystem path.
pub mod db;
mod storage;

pub use storage::{Upload, UploadError, find_upload, read_upload, store_upload, validate_file_name};
