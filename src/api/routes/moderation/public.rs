//! Public types for the feedback and deletion API
use serde::{Deserialize, Serialize};

// Fields are optional so missing values are reported as a bad
// request rather than a deserialization error
#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub message: Option<String>,
    pub feedback: Option<String>,
}

#[derive(Deserialize)]
pub struct DeletePairRequest {
    pub bot_text: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
