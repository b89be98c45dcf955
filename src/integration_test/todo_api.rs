use crate::api::test_util::deserialize_body;
use crate::dto;
use crate::integration_test::test_util::{TestDatabase, send_expecting, send_request};
use crate::routing_utils::BasicErrorResponse;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

async fn create(router: &axum::Router, body: serde_json::Value) -> dto::Todo {
    send_expecting(
        router,
        Method::POST,
        "/api/v1/todos",
        Some(body),
        StatusCode::CREATED,
    )
    .await
}

mod create_todo {
    use super::*;

    #[tokio::test]
    async fn happy_path() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();

        let created = create(
            &router,
            json!({ "title": "  Buy milk ", "description": "Semi-skimmed" }),
        )
        .await;
        assert!(created.id > 0);
        assert_eq!("Buy milk", created.title);
        assert_eq!(Some("Semi-skimmed".to_owned()), created.description);
        assert!(!created.completed);
        assert_eq!(created.created_at, created.updated_at);

        let fetched: dto::Todo = send_expecting(
            &router,
            Method::GET,
            &format!("/api/v1/todos/{}", created.id),
            None,
            StatusCode::OK,
        )
        .await;
        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn short_title_is_rejected() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();

        let error: BasicErrorResponse = send_expecting(
            &router,
            Method::POST,
            "/api/v1/todos",
            Some(json!({ "title": "ab" })),
            StatusCode::BAD_REQUEST,
        )
        .await;
        assert_eq!("Failed to create todo", error.error);

        let todos: Vec<dto::Todo> =
            send_expecting(&router, Method::GET, "/api/v1/todos", None, StatusCode::OK).await;
        assert!(todos.is_empty());
    }

    #[tokio::test]
    async fn missing_title_is_rejected() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();

        let error: BasicErrorResponse = send_expecting(
            &router,
            Method::POST,
            "/api/v1/todos",
            Some(json!({ "description": "No title here" })),
            StatusCode::BAD_REQUEST,
        )
        .await;
        assert!(
            error
                .details
                .is_some_and(|details| details.contains("title is required"))
        );
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/todos")
            .header("content-type", "application/json")
            .body(Body::from(r#"{ "title": "Buy milk""#))
            .expect("Could not build test request");
        let response = router
            .oneshot(request)
            .await
            .expect("Router failed to produce a response");
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        let error: BasicErrorResponse = deserialize_body(response.into_body()).await;
        assert_eq!("Invalid JSON format", error.error);
        assert!(error.details.is_some());
    }

    #[tokio::test]
    async fn empty_description_is_omitted() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();

        let response = send_request(
            &router,
            Method::POST,
            "/api/v1/todos",
            Some(json!({ "title": "Buy milk", "description": "   " })),
        )
        .await;
        assert_eq!(StatusCode::CREATED, response.status());

        let raw: serde_json::Value =
            deserialize_body(response.into_body()).await;
        assert!(raw.get("description").is_none());
    }
}

mod get_todos {
    use super::*;

    #[tokio::test]
    async fn newest_first() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();

        for title in ["Task A", "Task B", "Task C"] {
            create(&router, json!({ "title": title })).await;
        }

        let todos: Vec<dto::Todo> =
            send_expecting(&router, Method::GET, "/api/v1/todos", None, StatusCode::OK).await;
        let titles: Vec<&str> = todos.iter().map(|todo| todo.title.as_str()).collect();
        assert_eq!(vec!["Task C", "Task B", "Task A"], titles);
    }
}

mod get_todo {
    use super::*;

    #[tokio::test]
    async fn missing_todo_is_404() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();

        let error: BasicErrorResponse = send_expecting(
            &router,
            Method::GET,
            "/api/v1/todos/999999",
            None,
            StatusCode::NOT_FOUND,
        )
        .await;
        assert_eq!("Todo not found", error.error);
    }

    #[tokio::test]
    async fn non_positive_id_is_404() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();

        for uri in ["/api/v1/todos/0", "/api/v1/todos/-4"] {
            let response = send_request(&router, Method::GET, uri, None).await;
            assert_eq!(StatusCode::NOT_FOUND, response.status(), "for {uri}");
        }
    }

    #[tokio::test]
    async fn non_numeric_id_is_400() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();

        let error: BasicErrorResponse = send_expecting(
            &router,
            Method::GET,
            "/api/v1/todos/abc",
            None,
            StatusCode::BAD_REQUEST,
        )
        .await;
        assert_eq!("Invalid ID format", error.error);
        assert_eq!(Some("ID must be a number".to_owned()), error.details);
    }
}

mod update_todo {
    use super::*;

    #[tokio::test]
    async fn happy_path() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();
        let created = create(&router, json!({ "title": "Buy milk" })).await;

        let updated: dto::Todo = send_expecting(
            &router,
            Method::PUT,
            &format!("/api/v1/todos/{}", created.id),
            Some(json!({ "title": "Buy oat milk", "description": "Barista", "completed": true })),
            StatusCode::OK,
        )
        .await;

        assert_eq!(created.id, updated.id);
        assert_eq!("Buy oat milk", updated.title);
        assert_eq!(Some("Barista".to_owned()), updated.description);
        assert!(updated.completed);
        assert_eq!(created.created_at, updated.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn missing_todo_is_400() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();

        let error: BasicErrorResponse = send_expecting(
            &router,
            Method::PUT,
            "/api/v1/todos/999999",
            Some(json!({ "title": "Buy milk" })),
            StatusCode::BAD_REQUEST,
        )
        .await;
        assert_eq!("Failed to update todo", error.error);
    }

    #[tokio::test]
    async fn invalid_title_on_missing_todo_is_400() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();

        let response = send_request(
            &router,
            Method::PUT,
            "/api/v1/todos/999999",
            Some(json!({ "title": "ab" })),
        )
        .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
    }
}

mod delete_todo {
    use super::*;

    #[tokio::test]
    async fn deleted_todo_is_gone() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();
        let created = create(&router, json!({ "title": "Buy milk" })).await;
        let todo_uri = format!("/api/v1/todos/{}", created.id);

        let confirmation: dto::MessageResponse =
            send_expecting(&router, Method::DELETE, &todo_uri, None, StatusCode::OK).await;
        assert_eq!("Todo deleted successfully", confirmation.message);

        let response = send_request(&router, Method::GET, &todo_uri, None).await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());

        let response = send_request(&router, Method::DELETE, &todo_uri, None).await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());
    }

    #[tokio::test]
    async fn non_numeric_id_is_400() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();

        let response = send_request(&router, Method::DELETE, "/api/v1/todos/1.5", None).await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
    }
}

mod concurrent_writes {
    use super::*;

    #[tokio::test]
    async fn overlapping_writes_on_different_todos_all_succeed() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();
        let mut ids = Vec::new();
        for title in ["Task A", "Task B", "Task C", "Task D"] {
            ids.push(create(&router, json!({ "title": title })).await.id);
        }
        let uris: Vec<String> = ids.iter().map(|id| format!("/api/v1/todos/{id}")).collect();

        let (first_put, second_put, first_delete, second_delete) = tokio::join!(
            send_request(&router, Method::PUT, &uris[0], Some(json!({ "title": "Task A2" }))),
            send_request(&router, Method::PUT, &uris[1], Some(json!({ "title": "Task B2" }))),
            send_request(&router, Method::DELETE, &uris[2], None),
            send_request(&router, Method::DELETE, &uris[3], None),
        );

        assert_eq!(StatusCode::OK, first_put.status());
        assert_eq!(StatusCode::OK, second_put.status());
        assert_eq!(StatusCode::OK, first_delete.status());
        assert_eq!(StatusCode::OK, second_delete.status());

        let todos: Vec<dto::Todo> =
            send_expecting(&router, Method::GET, "/api/v1/todos", None, StatusCode::OK).await;
        let titles: Vec<&str> = todos.iter().map(|todo| todo.title.as_str()).collect();
        assert_eq!(vec!["Task B2", "Task A2"], titles);
    }

    #[tokio::test]
    async fn racing_deletes_of_one_todo_succeed_once() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();
        let created = create(&router, json!({ "title": "Buy milk" })).await;
        let todo_uri = format!("/api/v1/todos/{}", created.id);

        let (first, second) = tokio::join!(
            send_request(&router, Method::DELETE, &todo_uri, None),
            send_request(&router, Method::DELETE, &todo_uri, None),
        );

        let mut statuses = vec![first.status(), second.status()];
        statuses.sort();
        assert_eq!(vec![StatusCode::OK, StatusCode::NOT_FOUND], statuses);
    }

    #[tokio::test]
    async fn racing_update_and_delete_of_one_todo_never_fail_internally() {
        let test_db = TestDatabase::create().await;
        let router = test_db.router();
        let created = create(&router, json!({ "title": "Buy milk" })).await;
        let todo_uri = format!("/api/v1/todos/{}", created.id);

        let (update, delete) = tokio::join!(
            send_request(&router, Method::PUT, &todo_uri, Some(json!({ "title": "Buy oat milk" }))),
            send_request(&router, Method::DELETE, &todo_uri, None),
        );

        assert_eq!(StatusCode::OK, delete.status());
        // The update either lands before the delete or finds the todo already gone
        assert!(
            [StatusCode::OK, StatusCode::BAD_REQUEST].contains(&update.status()),
            "update got {}",
            update.status()
        );
        let response = send_request(&router, Method::GET, &todo_uri, None).await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let test_db = TestDatabase::create().await;
    let router = test_db.router();

    let health: dto::HealthStatus =
        send_expecting(&router, Method::GET, "/health", None, StatusCode::OK).await;
    assert_eq!("ok", health.status);
    assert_eq!("todo-api", health.service);
}

#[tokio::test]
async fn serves_openapi_document() {
    let test_db = TestDatabase::create().await;
    let router = test_db.router();

    let docs: serde_json::Value = send_expecting(
        &router,
        Method::GET,
        "/api-docs/openapi.json",
        None,
        StatusCode::OK,
    )
    .await;
    assert!(docs["paths"].get("/api/v1/todos/{id}").is_some());
}
