use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse};

use serde::Serialize;

/// Order endpoints: update and delete by id
pub mod orders;
/// Submission intake and listing
pub mod submissions;
/// UI flag endpoints
pub mod ui;

/// Body `code` for a successful request
pub const CODE_OK: u16 = 200;
/// Body `code` when the order id does not exist
pub const CODE_NOT_FOUND: u16 = 201;
/// Body `code` when the store failed an order operation
pub const CODE_STORE_FAILURE: u16 = 202;

/// JSON envelope shared by most endpoints: a numeric `code` next to the HTTP status,
/// a message, and optional `data` or `error` payloads
#[derive(Debug, Serialize)]
pub struct Reply<T = ()> {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Reply {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
            error: None,
        }
    }
}

impl<T> Reply<T> {
    pub fn with_data<D>(self, data: D) -> Reply<D> {
        Reply {
            code: self.code,
            message: self.message,
            data: Some(data),
            error: self.error,
        }
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

/// Body extraction failures (bad JSON, wrong content type) answer with the envelope and code 400
pub fn json_error(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let code = StatusCode::BAD_REQUEST;
    let response = HttpResponse::build(code).json(Reply::new(code.as_u16(), error.to_string()));

    InternalError::from_response(error, response).into()
}
