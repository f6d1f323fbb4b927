use axum::{
    http::StatusCode,
    response::Response,
};

use crate::outcome::Outcome;

/// The fallback for routes that do not exist.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

/// A JSON 404 response in the shape of every other failure.
pub fn get_404_not_found_response() -> Response {
    Outcome::failure("the requested resource could not be found")
        .with_status(StatusCode::NOT_FOUND)
}
