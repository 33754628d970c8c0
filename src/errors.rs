use axum::http::StatusCode;
use thiserror::Error;

/// Failure of a single backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network unreachable, request aborted, or a body that did not decode.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx response, with the `error` field of the body when there was one.
    #[error("backend responded {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Application {
        status: reqwest::StatusCode,
        message: Option<String>,
    },
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Application { status, .. } if *status == reqwest::StatusCode::UNAUTHORIZED)
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Application { message, .. } => message.as_deref(),
            Self::Transport(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
