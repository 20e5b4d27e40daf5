use crate::error::ApiError;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;

fn with_body(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut res = Response::new(Full::new(body.into()));
    *res.status_mut() = status;
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    res
}

/// Create a JSON response
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(bytes) => with_body(status, "application/json", bytes),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response");
            with_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "text/plain; charset=utf-8",
                "Failed to serialize response",
            )
        }
    }
}

/// Create a 200 JSON response
pub fn ok<T: Serialize>(body: &T) -> Response<Full<Bytes>> {
    json(StatusCode::OK, body)
}

/// Render an `ApiError` as `{"error": "..."}`
pub fn error(err: &ApiError) -> Response<Full<Bytes>> {
    json(err.status, &serde_json::json!({ "error": err.message }))
}
