//! Request extractors whose rejections render as [`AppError`].
//!
//! axum's own `Json`, `Path` and `Query` reject with plain-text bodies.
//! These wrappers run the same extraction and convert the rejection so a
//! bad body, path segment or query string gets the usual
//! `{ error, code, fields }` envelope.

use axum::extract::path::ErrorKind;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use headhuntd_core::error::CoreError;
use headhuntd_core::validation::CODE_MALFORMED;

use crate::error::AppError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// URL path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

const JSON_DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// The JSON path serde reported for a data error, e.g. `status` or
/// `salary.currency`. Errors at the document root carry no path.
fn rejected_json_field(body_text: &str) -> Option<&str> {
    let detail = body_text.strip_prefix(JSON_DATA_ERROR_PREFIX)?;
    let (path, _) = detail.split_once(": ")?;
    let is_path = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    is_path.then_some(path)
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        match rejection {
            JsonRejection::JsonDataError(_) => {
                let field = rejected_json_field(&message).unwrap_or("body");
                CoreError::field(field, CODE_MALFORMED, message.clone()).into()
            }
            JsonRejection::JsonSyntaxError(_) | JsonRejection::MissingJsonContentType(_) => {
                CoreError::field("body", CODE_MALFORMED, message).into()
            }
            _ => AppError::BadRequest(message),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        let message = rejection.body_text();
        match rejection {
            PathRejection::FailedToDeserializePathParams(e) if e.status().is_client_error() => {
                let field = match e.kind() {
                    ErrorKind::ParseErrorAtKey { key, .. }
                    | ErrorKind::DeserializeError { key, .. }
                    | ErrorKind::InvalidUtf8InPathParam { key } => key.clone(),
                    _ => "path".to_string(),
                };
                CoreError::field(field, CODE_MALFORMED, message).into()
            }
            _ => AppError::InternalError(message),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        CoreError::field("query", CODE_MALFORMED, rejection.body_text()).into()
    }
}
