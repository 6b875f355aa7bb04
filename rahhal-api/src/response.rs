use axum::Json;
use serde::Serialize;

/// Uniform response envelope: every success body carries a machine-checkable
/// `status` field next to the payload.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            status: "success",
            message: None,
            data: Some(data),
        })
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            status: "success",
            message: Some(message.into()),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: "success",
            message: Some(message.into()),
            data: None,
        })
    }
}
