//! Batch send route

use application::{ItemResult, SendBatch, SendParams};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::{error::ApiError, middleware::ValidatedJson, state::AppState};

/// Body of `POST /v1/messages`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessagesRequest {
    /// Record per-item failures instead of aborting the batch
    #[serde(default, alias = "continueOnFail")]
    pub continue_on_fail: bool,
    #[validate(length(min = 1, max = 100, message = "must contain between 1 and 100 items"))]
    pub items: Vec<SendParams>,
}

impl From<SendMessagesRequest> for SendBatch {
    fn from(request: SendMessagesRequest) -> Self {
        Self {
            continue_on_fail: request.continue_on_fail,
            items: request.items,
        }
    }
}

/// Body returned for a processed batch
#[derive(Debug, Clone, Serialize)]
pub struct SendMessagesResponse {
    /// One entry per input item, in input order
    pub results: Vec<ItemResult>,
}

/// Send a batch of outbound items
///
/// An aborted batch returns the error of the failing item.
#[instrument(skip(state, request), fields(items = request.items.len()))]
pub async fn send_messages(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SendMessagesRequest>,
) -> Result<Json<SendMessagesResponse>, ApiError> {
    let Some(dispatch) = state.dispatch.as_ref() else {
        return Err(ApiError::ServiceUnavailable(
            "Outbound sends are disabled: WhatsApp credentials not configured".to_string(),
        ));
    };

    let results = dispatch.send(request.into()).await?;
    info!(results = results.len(), "Batch send completed");

    Ok(Json(SendMessagesResponse { results }))
}

#[cfg(test)]
mod tests {
    use domain::Operation;

    use super::*;

    #[test]
    fn request_accepts_camel_case_flag() {
        let request: SendMessagesRequest = serde_json::from_str(
            r#"{"continueOnFail": true, "items": [{"operation": "send_text", "phone_number": "15551234567", "text": "hi"}]}"#,
        )
        .unwrap();
        assert!(request.continue_on_fail);
        assert_eq!(request.items[0].operation, Operation::SendText);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn empty_batch_fails_validation() {
        let request: SendMessagesRequest = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn request_converts_into_batch() {
        let request = SendMessagesRequest {
            continue_on_fail: true,
            items: vec![SendParams::text("15551234567", "hi")],
        };
        let batch: SendBatch = request.into();
        assert!(batch.continue_on_fail);
        assert_eq!(batch.items.len(), 1);
    }
}
