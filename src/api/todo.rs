use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::domain::todo::driving_ports::TodoPort;
use crate::external_connections::{ExternalConnectivity, TransactableExternalConnectivity};
use crate::persistence::db_todo_driven_ports::{DbTodoReader, DbTodoWriter};
use crate::routing_utils::{BasicErrorResponse, DomainErrorResponse, Json, Path};
use crate::{AppState, SharedData, domain, dto};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use log::info;
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(get_todos, get_todo, create_todo, update_todo, delete_todo))]
/// Defines the OpenAPI documentation for the todo API
pub struct TodoApi;
/// Constant used to group todo endpoints in OpenAPI documentation
pub const TODO_API_GROUP: &str = "Todos";

/// Adds routes under "/todos" to the application router
pub fn todo_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/todos",
            get(|State(app_state): AppState| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let todo_service = domain::todo::TodoService {};

                get_todos(&mut ext_cxn, &todo_service, &DbTodoReader).await
            })
            .post(
                |State(app_state): AppState, Json(new_todo): Json<dto::NewTodo>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    create_todo(new_todo, &mut ext_cxn, &todo_service, &DbTodoWriter).await
                },
            ),
        )
        .route(
            "/todos/:id",
            get(
                |State(app_state): AppState, Path(id): Path<i64>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    get_todo(id, &mut ext_cxn, &todo_service, &DbTodoReader).await
                },
            )
            .put(
                |State(app_state): AppState,
                 Path(id): Path<i64>,
                 Json(update): Json<dto::UpdateTodo>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    update_todo(
                        id,
                        update,
                        &mut ext_cxn,
                        &todo_service,
                        &DbTodoReader,
                        &DbTodoWriter,
                    )
                    .await
                },
            )
            .delete(
                |State(app_state): AppState, Path(id): Path<i64>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    delete_todo(
                        id,
                        &mut ext_cxn,
                        &todo_service,
                        &DbTodoReader,
                        &DbTodoWriter,
                    )
                    .await
                },
            ),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/todos",
    tag = TODO_API_GROUP,
    responses(
        (status = 200, description = "All todos, newest first", body = Vec<dto::Todo>),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Retrieves every todo in the system
async fn get_todos(
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_read: &impl TodoReader,
) -> Result<Json<Vec<dto::Todo>>, DomainErrorResponse> {
    info!("Requested todos");
    let todos = todo_service
        .all_todos(&mut *ext_cxn, todo_read)
        .await
        .map_err(|err| DomainErrorResponse::new("Failed to get todos", err))?;

    Ok(Json(todos.into_iter().map(dto::Todo::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/todos/{id}",
    tag = TODO_API_GROUP,
    params(("id" = i64, Path, description = "ID of the todo")),
    responses(
        (status = 200, description = "The requested todo", body = dto::Todo),
        (status = 400, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        // Storage failure, reported as "Failed to get todo"
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Retrieves a single todo
async fn get_todo(
    id: i64,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_read: &impl TodoReader,
) -> Result<Json<dto::Todo>, DomainErrorResponse> {
    info!("Requested todo {id}");
    let todo = todo_service
        .todo_by_id(id, &mut *ext_cxn, todo_read)
        .await
        .map_err(|err| {
            let summary = match err {
                domain::Error::DoesNotExist => "Todo not found",
                _ => "Failed to get todo",
            };
            DomainErrorResponse::new(summary, err)
        })?;

    Ok(Json(todo.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/todos",
    tag = TODO_API_GROUP,
    request_body = dto::NewTodo,
    responses(
        (status = 201, description = "Todo was created", body = dto::Todo),
        (status = 400, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Creates a new todo
async fn create_todo(
    new_todo: dto::NewTodo,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_write: &impl TodoWriter,
) -> Result<(StatusCode, Json<dto::Todo>), DomainErrorResponse> {
    info!("Attempt to create todo: {new_todo}");
    let draft = domain::todo::TodoDraft::from(new_todo);
    let created = todo_service
        .create_todo(&draft, &mut *ext_cxn, todo_write)
        .await
        .map_err(|err| DomainErrorResponse::new("Failed to create todo", err))?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/todos/{id}",
    tag = TODO_API_GROUP,
    params(("id" = i64, Path, description = "ID of the todo to replace")),
    request_body = dto::UpdateTodo,
    responses(
        (status = 200, description = "Todo was updated", body = dto::Todo),
        // Bad ID, malformed or invalid body, or no todo with that ID
        (status = 400, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Replaces the content of a todo
async fn update_todo(
    id: i64,
    update: dto::UpdateTodo,
    ext_cxn: &mut impl TransactableExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_read: &impl TodoReader,
    todo_write: &impl TodoWriter,
) -> Result<Json<dto::Todo>, DomainErrorResponse> {
    info!("Updating todo {id}");
    let draft = domain::todo::TodoDraft::from(update);
    let updated = todo_service
        .update_todo(id, &draft, &mut *ext_cxn, todo_read, todo_write)
        .await
        .map_err(|err| {
            DomainErrorResponse::new("Failed to update todo", err)
                .when_missing(StatusCode::BAD_REQUEST)
        })?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/todos/{id}",
    tag = TODO_API_GROUP,
    params(("id" = i64, Path, description = "ID of the todo to delete")),
    responses(
        (status = 200, description = "Todo was deleted", body = dto::MessageResponse),
        (status = 400, response = BasicErrorResponse),
        (status = 404, response = BasicErrorResponse),
        (status = 500, response = BasicErrorResponse),
    ),
)]
/// Deletes a todo
async fn delete_todo(
    id: i64,
    ext_cxn: &mut impl TransactableExternalConnectivity,
    todo_service: &impl TodoPort,
    todo_read: &impl TodoReader,
    todo_write: &impl TodoWriter,
) -> Result<Json<dto::MessageResponse>, DomainErrorResponse> {
    info!("Deleting todo {id}");
    todo_service
        .delete_todo(id, &mut *ext_cxn, todo_read, todo_write)
        .await
        .map_err(|err| DomainErrorResponse::new("Failed to delete todo", err))?;

    Ok(Json(dto::MessageResponse {
        message: "Todo deleted successfully".to_owned(),
    }))
}
