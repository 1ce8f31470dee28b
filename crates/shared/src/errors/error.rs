use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    /// Largest quantity the caller may still hold, present on stock conflicts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_stock: Option<i32>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            available_stock: None,
        }
    }
}
