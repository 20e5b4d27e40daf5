use http::StatusCode;
use tillage_core::EngineError;

/// Server-level failures (binding, routing table construction).
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid route table: {0}")]
    Routing(#[from] matchit::InsertError),
}

/// A request-level failure, rendered as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let status = match &err {
            EngineError::InvalidItem(_) | EngineError::InvalidName => StatusCode::BAD_REQUEST,
            EngineError::PlayerNotFound(_) | EngineError::PlotNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            EngineError::NameTaken(_) => StatusCode::CONFLICT,
            EngineError::CorruptRecord(_) | EngineError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}
