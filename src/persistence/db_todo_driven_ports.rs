use crate::domain;
use crate::domain::DrivenPortError;
use crate::domain::todo::{Todo, TodoContent};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, query, query_as};

pub struct DbTodoReader;

#[derive(FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    description: Option<String>,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TodoRow> for domain::todo::Todo {
    fn from(value: TodoRow) -> Self {
        Todo {
            id: value.id,
            title: value.title,
            description: value.description,
            completed: value.completed,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl domain::todo::driven_ports::TodoReader for DbTodoReader {
    async fn all_todos(&self, ext_cxn: &mut impl ExternalConnectivity) -> Result<Vec<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todos: Vec<Todo> = query_as::<_, TodoRow>(
            "SELECT id, title, description, completed, created_at, updated_at
            FROM todos
            ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(cxn.borrow_connection())
        .await
        .context("trying to fetch all todos")?
        .into_iter()
        .map(domain::todo::Todo::from)
        .collect();

        Ok(todos)
    }

    async fn todo_by_id(
        &self,
        id: i64,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Todo, DrivenPortError> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todo = query_as::<_, TodoRow>(
            "SELECT id, title, description, completed, created_at, updated_at
            FROM todos
            WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to fetch a todo by ID")?
        .ok_or(DrivenPortError::DoesNotExist)?;

        Ok(todo.into())
    }
}

pub struct DbTodoWriter;

impl domain::todo::driven_ports::TodoWriter for DbTodoWriter {
    async fn create_todo(
        &self,
        content: &TodoContent,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Todo, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;
        let now = Utc::now();

        let inserted = query_as::<_, TodoRow>(
            "INSERT INTO todos (title, description, completed, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, title, description, completed, created_at, updated_at",
        )
        .bind(&content.title)
        .bind(content.description.as_deref())
        .bind(content.completed)
        .bind(now)
        .bind(now)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new todo into the database")?;

        Ok(inserted.into())
    }

    async fn update_todo(
        &self,
        id: i64,
        content: &TodoContent,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Todo, DrivenPortError> {
        let mut cxn = ext_cxn.database_cxn().await?;

        // A wall clock stepping backwards must not put updated_at before created_at
        let updated = query_as::<_, TodoRow>(
            "UPDATE todos
            SET title = ?, description = ?, completed = ?, updated_at = max(created_at, ?)
            WHERE id = ?
            RETURNING id, title, description, completed, created_at, updated_at",
        )
        .bind(&content.title)
        .bind(content.description.as_deref())
        .bind(content.completed)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to update a todo in the database")?
        .ok_or(DrivenPortError::DoesNotExist)?;

        Ok(updated.into())
    }

    async fn delete_todo(
        &self,
        id: i64,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let delete_result = query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove a todo from the database")?;

        if delete_result.rows_affected() == 0 {
            return Err(DrivenPortError::DoesNotExist);
        }

        Ok(())
    }
}
