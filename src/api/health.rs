use crate::{SharedData, dto};
use crate::routing_utils::Json;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(health))]
/// Defines the OpenAPI documentation for the liveness endpoint
pub struct HealthApi;

/// Name reported by the liveness endpoint
const SERVICE_NAME: &str = "todo-api";

/// Creates a router with the "/health" liveness endpoint
pub fn health_routes() -> Router<Arc<SharedData>> {
    Router::new().route("/health", get(health))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = dto::HealthStatus),
    ),
)]
/// Reports that the service is alive. Does not touch the database.
async fn health() -> Json<dto::HealthStatus> {
    Json(dto::HealthStatus {
        status: "ok".to_owned(),
        service: SERVICE_NAME.to_owned(),
    })
}
