use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpResponse, Responder, ResponseError};

use serde::{Deserialize, Serialize};

use thiserror::Error;

use crate::domain::{now, paginate, PageRequest};
use crate::model::SubmissionFields;
use crate::repo::SubmissionStore;

use super::{Reply, CODE_OK};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitReply {
    message: &'static str,
    is_updated: bool,
}

/// Create a submission, or merge it into today's submission for the same phone
#[tracing::instrument(name = "Submit an order", skip(store))]
#[post("/submit")]
async fn submit(
    store: web::Data<dyn SubmissionStore>,
    body: web::Json<SubmissionFields>,
) -> Result<impl Responder, SubmitError> {
    let submission = store.merge_same_day(&body, now()).await?;

    let message = if submission.is_updated {
        "Order updated"
    } else {
        "Submission received"
    };

    Ok(HttpResponse::Ok().json(SubmitReply {
        message,
        is_updated: submission.is_updated,
    }))
}

/// Query string for the listing, both values optional
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    page: Option<u64>,
    limit: Option<u64>,
}

impl From<ListQuery> for PageRequest {
    fn from(query: ListQuery) -> Self {
        PageRequest::new(
            query.page.unwrap_or(PageRequest::DEFAULT_PAGE),
            query.limit.unwrap_or(PageRequest::DEFAULT_LIMIT),
        )
    }
}

/// Paginated listing grouped by day, newest first
#[tracing::instrument(name = "List submissions", skip(store))]
#[get("/submissions")]
async fn list(
    store: web::Data<dyn SubmissionStore>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, ListError> {
    let groups = store.grouped_by_day().await?;
    let page = paginate(groups, query.into_inner().into());

    Ok(HttpResponse::Ok().json(Reply::new(CODE_OK, "Request succeeded").with_data(page)))
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Submission failed")]
    Store(#[from] crate::Error),
}

impl ResponseError for SubmitError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        let Self::Store(source) = self;
        tracing::error!(error.cause_chain = ?source, "{}", self);

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string(),
            "error": source.to_string(),
        }))
    }
}

#[derive(Debug, Error)]
pub enum ListError {
    #[error("Failed to fetch submissions")]
    Store(#[from] crate::Error),
}

impl ResponseError for ListError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        let Self::Store(source) = self;
        tracing::error!(error.cause_chain = ?source, "{}", self);

        let code = self.status_code();
        let reply = Reply::new(code.as_u16(), self.to_string()).with_error(source);

        HttpResponse::build(code).json(reply)
    }
}

/// Submission endpoints
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(submit).service(list);
}
