//! Mapping pipeline errors to HTTP responses

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use super::page;
use crate::error::{Error, ParseError, ValidationError};

/// JSON body for failed API requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub details: String,
}

fn status_of(err: &Error) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_REQUEST)
}

/// Message shown to the client. Internal failures are logged, not exposed.
fn public_message(err: &Error, status: StatusCode) -> String {
    if status.is_server_error() {
        error!("Request failed: {}", err);
        "Internal error while rendering the preview".to_string()
    } else {
        debug!("Rejected request ({}): {}", status, err);
        err.to_string()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = status_of(&self);
        let message = public_message(&self, status);
        (status, Html(page::error(&message))).into_response()
    }
}

/// An [`Error`] answered with an [`ErrorDetails`] JSON body
#[derive(Debug)]
pub struct JsonError(pub Error);

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let status = status_of(&self.0);
        let details = public_message(&self.0, status);
        (status, Json(ErrorDetails { details })).into_response()
    }
}

impl From<Error> for JsonError {
    fn from(err: Error) -> Self {
        JsonError(err)
    }
}

impl From<ValidationError> for JsonError {
    fn from(err: ValidationError) -> Self {
        JsonError(err.into())
    }
}

impl From<ParseError> for JsonError {
    fn from(err: ParseError) -> Self {
        JsonError(err.into())
    }
}
