use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::{FromRequest, FromRequestParts};
use log::error;
use serde::Serialize;
use utoipa::{ToResponse, ToSchema};

use crate::domain;

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug, ToSchema, ToResponse)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[response(examples(
    ("Not Found" = (
        summary = "Todo could not be found (404, or 400 when updating)",
        value = json!({
            "error": "Todo not found",
            "details": "requested todo does not exist"
        })
    )),

    ("Internal Failure" = (
        summary = "Something unexpected went wrong inside the server (500)",
        value = json!({
            "error": "Failed to get todos",
            "details": "Could not access data to complete your request"
        })
    )),

    ("Invalid Input" = (
        summary = "Submitted todo failed validation (400)",
        value = json!({
            "error": "Failed to create todo",
            "details": "title: title must be at least 3 characters long"
        })
    )),

    ("Malformed JSON" = (
        summary = "Invalid JSON passed to server (400)",
        value = json!({
            "error": "Invalid JSON format",
            "details": "Failed to parse the request body as JSON: EOF while parsing an object at line 4 column 0"
        })
    )),

    ("Bad ID" = (
        summary = "Path ID was not a number (400)",
        value = json!({
            "error": "Invalid ID format",
            "details": "ID must be a number"
        })
    ))
))]
pub struct BasicErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl BasicErrorResponse {
    fn into_response_with(self, status: StatusCode) -> Response {
        (status, axum::Json(self)).into_response()
    }
}

/// Response type that wraps domain errors and turns them into [BasicErrorResponse]s. The
/// summary describes what the endpoint was attempting, e.g. "Failed to update todo".
pub struct DomainErrorResponse {
    summary: &'static str,
    cause: domain::Error,
    missing_status: StatusCode,
}

impl DomainErrorResponse {
    pub fn new(summary: &'static str, cause: domain::Error) -> Self {
        DomainErrorResponse {
            summary,
            cause,
            missing_status: StatusCode::NOT_FOUND,
        }
    }

    /// Overrides the status used when the targeted todo doesn't exist, which is 404 otherwise
    pub fn when_missing(mut self, status: StatusCode) -> Self {
        self.missing_status = status;
        self
    }
}

impl IntoResponse for DomainErrorResponse {
    fn into_response(self) -> Response {
        let (status, details) = match self.cause {
            domain::Error::Invalid(validation_errors) => {
                (StatusCode::BAD_REQUEST, validation_errors.to_string())
            }
            not_found @ domain::Error::DoesNotExist => {
                (self.missing_status, not_found.to_string())
            }
            domain::Error::RetrieveFailure { action, cause } => {
                error!("{}: failed to {action}: {cause:#}", self.summary);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not access data to complete your request".to_owned(),
                )
            }
        };

        BasicErrorResponse {
            error: self.summary.to_owned(),
            details: Some(details),
        }
        .into_response_with(status)
    }
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors
pub struct JsonErrorResponse {
    parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        JsonErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        BasicErrorResponse {
            error: "Invalid JSON format".into(),
            details: Some(self.parse_problem),
        }
        .into_response_with(StatusCode::BAD_REQUEST)
    }
}

/// Wrapper for [axum::extract::Path] which reports unparseable path parameters with our
/// data structure for API errors
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(IdErrorResponse))]
pub struct Path<T>(pub T);

/// Response type for path IDs which aren't base-10 integers
pub struct IdErrorResponse;

impl From<PathRejection> for IdErrorResponse {
    fn from(_: PathRejection) -> Self {
        IdErrorResponse
    }
}

impl IntoResponse for IdErrorResponse {
    fn into_response(self) -> Response {
        BasicErrorResponse {
            error: "Invalid ID format".into(),
            details: Some("ID must be a number".into()),
        }
        .into_response_with(StatusCode::BAD_REQUEST)
    }
}
