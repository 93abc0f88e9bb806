use std::net::TcpListener;
use std::sync::Arc;

use actix_cors::Cors;

use actix_web::dev::Server;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use tracing_actix_web::TracingLogger;

use crate::controller::{json_error, orders, submissions, ui};
use crate::domain::UiFlag;
use crate::repo::SubmissionStore;

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().finish()
}

/// Run the application on a specified TCP listener
pub fn run(
    listener: TcpListener,
    store: Arc<dyn SubmissionStore>,
    ui_flag: UiFlag,
) -> anyhow::Result<Server> {
    // Wrap application data
    let store: web::Data<dyn SubmissionStore> = web::Data::from(store);
    let ui_flag = web::Data::new(ui_flag);

    // Start the server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(store.clone())
            .app_data(ui_flag.clone())
            .service(health_check)
            .configure(submissions::configure)
            .configure(orders::configure)
            .configure(ui::configure)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
