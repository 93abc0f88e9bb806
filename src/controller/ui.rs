use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpResponse, Responder, ResponseError};

use serde::Serialize;
use serde_json::Value;

use thiserror::Error;

use crate::domain::UiFlag;

use super::{Reply, CODE_OK};

#[derive(Debug, Serialize)]
struct UiStatus {
    #[serde(rename = "isUIEnabled")]
    is_ui_enabled: bool,
}

impl From<&UiFlag> for UiStatus {
    fn from(flag: &UiFlag) -> Self {
        Self {
            is_ui_enabled: flag.is_enabled(),
        }
    }
}

#[tracing::instrument(name = "Read UI status", skip(flag))]
#[get("/ui-status")]
async fn ui_status(flag: web::Data<UiFlag>) -> impl Responder {
    let status = UiStatus::from(flag.get_ref());

    HttpResponse::Ok().json(Reply::new(CODE_OK, "Status fetched").with_data(status))
}

/// Set the UI flag from a JSON body `{"enable": bool}`
#[tracing::instrument(name = "Toggle UI", skip(flag))]
#[post("/toggle-ui")]
async fn toggle(
    flag: web::Data<UiFlag>,
    body: web::Json<Value>,
) -> Result<impl Responder, UiError> {
    let enable = body
        .get("enable")
        .and_then(Value::as_bool)
        .ok_or(UiError::InvalidFlag)?;

    flag.set(enable);

    let status = UiStatus::from(flag.get_ref());

    Ok(HttpResponse::Ok().json(Reply::new(CODE_OK, "UI status updated").with_data(status)))
}

#[derive(Debug, Error)]
pub enum UiError {
    #[error("Invalid parameter, expected a boolean `enable`")]
    InvalidFlag,
}

impl ResponseError for UiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        let code = self.status_code();
        HttpResponse::build(code).json(Reply::new(code.as_u16(), self.to_string()))
    }
}

/// UI flag endpoints
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(ui_status).service(toggle);
}
