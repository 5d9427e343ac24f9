use axum::extract::Multipart;

use crate::api::public::ApiError;
use crate::chat::{ChatInput, FileUpload};

/// Read the `message` and `file` fields of a multipart chat form.
/// Other fields are ignored.
pub async fn read_chat_form(mut multipart: Multipart) -> Result<ChatInput, ApiError> {
    let mut input = ChatInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "message" => {
                let text = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read message field: {}", e))
                })?;
                input.message = Some(text);
            }
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read file field: {}", e))
                })?;
                // Browsers send an empty, unnamed part when no file
                // was picked
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                input.file = Some(FileUpload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            other => {
                tracing::debug!("Ignoring unknown multipart field {}", other);
            }
        }
    }

    Ok(input)
}
