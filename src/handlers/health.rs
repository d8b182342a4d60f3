use actix_web::{HttpResponse, Result, web};
use serde_json::json;

use crate::config::DatabaseConfig;
use crate::database::ConnectionProvider;

/// Liveness of the service and its database, bounded by `health_check_timeout`.
pub async fn health(
    provider: web::Data<ConnectionProvider>,
    database: web::Data<DatabaseConfig>,
) -> Result<HttpResponse> {
    match provider.ping(database.health_check_timeout()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "status": "healthy" }))),
        Err(e) => {
            log::error!("Health check failed: {e}");
            Ok(HttpResponse::ServiceUnavailable().json(json!({ "status": "unhealthy" })))
        }
    }
}

pub fn health_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
