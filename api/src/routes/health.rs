//! GET /health

use actix_web::{web, HttpResponse};

use crate::app::AppState;

pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = match &state.database {
        Some(pool) => match pool.health_check().await {
            Ok(true) => "healthy",
            Ok(false) | Err(_) => "unhealthy",
        },
        None => "not_configured",
    };

    let body = serde_json::json!({
        "status": if database == "unhealthy" { "degraded" } else { "healthy" },
        "service": "tfa-api",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    if database == "unhealthy" {
        HttpResponse::ServiceUnavailable().json(body)
    } else {
        HttpResponse::Ok().json(body)
    }
}
