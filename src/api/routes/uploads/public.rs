//! Public types for the uploads API
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
    pub url: String,
}

impl UploadResponse {
    pub fn new(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            url: format!("/uploads/{}", urlencoding::encode(filename)),
        }
    }
}
