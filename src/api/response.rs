use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Standard API response wrapper for mutation acknowledgements.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            timestamp: Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    /// Success acknowledgement without a payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response() {
        let response = ApiResponse::success("created", serde_json::json!({"id": "BAT001"}));
        assert!(response.success);
        assert_eq!(response.message, "created");
        assert!(response.data.is_some());
    }

    #[test]
    fn test_message_only_skips_data_field() {
        let response = ApiResponse::message("Logged out successfully");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert!(value.get("data").is_none());
    }
}
