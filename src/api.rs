use crate::{SharedData, logging};
use axum::Router;
use std::sync::Arc;

pub mod health;
pub mod swagger_main;
pub mod todo;

#[cfg(test)]
pub mod test_util;

/// Assembles every route the service exposes, including API documentation, on top of [shared_data]
pub fn build_router(shared_data: Arc<SharedData>) -> Router {
    let router = Router::new()
        .nest("/api/v1", todo::todo_routes())
        .merge(health::health_routes())
        .merge(swagger_main::build_documentation())
        .with_state(shared_data);

    logging::attach_tracing_http(router)
}
