use actix_web::http::StatusCode;
use actix_web::{delete, put, web, HttpResponse, Responder, ResponseError};

use bson::oid::ObjectId;

use thiserror::Error;

use crate::domain::now;
use crate::model::SubmissionFields;
use crate::repo::SubmissionStore;

use super::{Reply, CODE_NOT_FOUND, CODE_OK, CODE_STORE_FAILURE};

/// Overwrite an order's fields, marking it updated
#[tracing::instrument(name = "Update an order by id", skip(store))]
#[put("/update-order/{id}")]
async fn update(
    store: web::Data<dyn SubmissionStore>,
    path: web::Path<(String,)>,
    body: web::Json<SubmissionFields>,
) -> Result<impl Responder, OrderError> {
    let (id,) = path.into_inner();
    let id = parse_id(&id).map_err(OrderError::Update)?;

    let updated = store
        .update_by_id(id, &body, now())
        .await
        .map_err(OrderError::Update)?
        .ok_or(OrderError::NotFound)?;

    Ok(HttpResponse::Ok().json(Reply::new(CODE_OK, "Order updated").with_data(updated)))
}

#[tracing::instrument(name = "Delete an order by id", skip(store))]
#[delete("/delete-order/{id}")]
async fn remove(
    store: web::Data<dyn SubmissionStore>,
    path: web::Path<(String,)>,
) -> Result<impl Responder, OrderError> {
    let (id,) = path.into_inner();
    let id = parse_id(&id).map_err(OrderError::Delete)?;

    store
        .delete_by_id(id)
        .await
        .map_err(OrderError::Delete)?
        .ok_or(OrderError::NotFound)?;

    Ok(HttpResponse::Ok().json(Reply::new(CODE_OK, "Order deleted")))
}

fn parse_id(id: &str) -> crate::Result<ObjectId> {
    Ok(ObjectId::parse_str(id)?)
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found")]
    NotFound,

    #[error("Failed to update order")]
    Update(#[source] crate::Error),

    #[error("Failed to delete order")]
    Delete(#[source] crate::Error),
}

impl ResponseError for OrderError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Update(_) | Self::Delete(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let reply = match self {
            Self::NotFound => Reply::new(CODE_NOT_FOUND, self.to_string()),
            Self::Update(source) | Self::Delete(source) => {
                tracing::error!(error.cause_chain = ?source, "{}", self);
                Reply::new(CODE_STORE_FAILURE, self.to_string()).with_error(source)
            }
        };

        HttpResponse::build(self.status_code()).json(reply)
    }
}

/// Order endpoints
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(update).service(remove);
}
