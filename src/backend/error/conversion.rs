/**
 * Error Conversion
 *
 * `BackendError` implements `IntoResponse` so handlers can return it directly.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "success": false,
 *   "error": "message not found",
 *   "status": 404
 * }
 * ```
 */

use axum::{
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("[Server] Request failed: {}", self);
        } else {
            tracing::debug!("[Server] Request rejected ({}): {}", status, self);
        }

        let body = serde_json::json!({
            "success": false,
            "error": self.client_message(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
