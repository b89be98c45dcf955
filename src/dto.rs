use crate::routing_utils::BasicErrorResponse;
use utoipa::OpenApi;

mod todo;

pub use todo::*;

/// Schemas shared across the API which don't get picked up automatically from route annotations
#[derive(OpenApi)]
#[openapi(components(
    schemas(NewTodo, UpdateTodo, Todo, MessageResponse, HealthStatus, BasicErrorResponse),
    responses(BasicErrorResponse)
))]
pub struct OpenApiSchemas;

/// Generic confirmation message returned by endpoints that don't produce an entity
#[derive(serde::Serialize, utoipa::ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, PartialEq, Eq, Debug))]
pub struct MessageResponse {
    #[schema(example = "Todo deleted successfully")]
    pub message: String,
}

/// Liveness report for the service
#[derive(serde::Serialize, utoipa::ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, PartialEq, Eq, Debug))]
pub struct HealthStatus {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "todo-api")]
    pub service: String,
}
