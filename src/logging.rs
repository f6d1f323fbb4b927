//! Middleware for logging requests and responses.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of characters of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full text is logged at the `debug` level.
/// Credentials in the `Authorization` header are never logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(error) => {
            tracing::warn!("could not read request body: {error}");
            return (StatusCode::BAD_REQUEST, "could not read request body").into_response();
        }
    };

    let mut headers = parts.headers.clone();
    redact_authorization(&mut headers);
    log_request(&parts.method, &parts.uri, &headers, &body_text);

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_text = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

fn redact_authorization(headers: &mut HeaderMap) {
    if let Some(value) = headers.get_mut(AUTHORIZATION) {
        let scheme = value
            .to_str()
            .ok()
            .and_then(|text| text.split_once(' '))
            .map(|(scheme, _)| scheme.to_owned());

        let redacted = match scheme {
            Some(scheme) => format!("{scheme} ********"),
            None => "********".to_owned(),
        };

        if let Ok(redacted) = HeaderValue::from_str(&redacted) {
            *value = redacted;
        }
    }
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if it is
/// short enough to log in full.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_request(method: &Method, uri: &Uri, headers: &HeaderMap, body: &str) {
    match truncate(body) {
        Some(head) => {
            tracing::info!("Received request: {method} {uri} {headers:#?}\nbody: {head}...");
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!("Received request: {method} {uri} {headers:#?}\nbody: {body:?}"),
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    match truncate(body) {
        Some(head) => {
            tracing::info!("Sending response: {parts:#?}\nbody: {head}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {parts:#?}\nbody: {body:?}"),
    }
}
