use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A non-success HTTP response from one of the remote services.
#[derive(Clone, Debug, Serialize, Error)]
#[error("{status_code}: {message}")]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
}

impl ApiError {
    pub const BAD_REQUEST: u16 = 400;
    pub const CONFLICT: u16 = 409;

    /// Builds the error from a response body, preferring the message the
    /// server put in its JSON error envelope over the raw text.
    #[must_use]
    pub fn from_body(status_code: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            error_message: Option<String>,
            message: Option<String>,
            error: Option<String>,
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.error_message.or(body.message).or(body.error))
            .unwrap_or_else(|| body.trim().to_owned());

        Self {
            status_code,
            message,
        }
    }

    #[must_use]
    pub const fn is_bad_request(&self) -> bool {
        self.status_code == Self::BAD_REQUEST
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        self.status_code == Self::CONFLICT
    }
}
