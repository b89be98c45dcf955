use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::domain::{DrivenPortError, Error};
use crate::external_connections::{
    ExternalConnectivity, TransactableExternalConnectivity, TransactionHandle,
};
use chrono::{DateTime, Utc};
use log::{error, info};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

const TITLE_MIN_CHARS: usize = 3;
const TITLE_MAX_CHARS: usize = 100;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Todo fields as a client submitted them, before normalization or validation
#[derive(Debug)]
#[cfg_attr(test, derive(Clone, PartialEq, Eq))]
pub struct TodoDraft {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Trimmed todo fields. Only handed to driven ports after passing validation.
#[derive(Debug, Validate)]
#[cfg_attr(test, derive(Clone, PartialEq, Eq))]
pub struct TodoContent {
    #[validate(custom = "validate_title")]
    pub title: String,
    #[validate(length(max = 500, message = "description must be at most 500 characters long"))]
    pub description: Option<String>,
    pub completed: bool,
}

impl From<&TodoDraft> for TodoContent {
    fn from(value: &TodoDraft) -> Self {
        TodoContent {
            title: value.title.trim().to_owned(),
            description: value
                .description
                .as_deref()
                .map(str::trim)
                .filter(|description| !description.is_empty())
                .map(str::to_owned),
            completed: value.completed,
        }
    }
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    let char_count = title.chars().count();
    let (code, message) = if title.is_empty() {
        ("required", "title is required")
    } else if char_count < TITLE_MIN_CHARS {
        ("length", "title must be at least 3 characters long")
    } else if char_count > TITLE_MAX_CHARS {
        ("length", "title must be at most 100 characters long")
    } else {
        return Ok(());
    };

    let mut title_error = ValidationError::new(code);
    title_error.message = Some(Cow::Borrowed(message));
    Err(title_error)
}

/// Normalizes a draft and checks it against the todo field rules
fn validated_content(draft: &TodoDraft) -> Result<TodoContent, Error> {
    let content = TodoContent::from(draft);
    content.validate()?;

    Ok(content)
}

pub mod driven_ports {
    use super::*;

    pub trait TodoReader {
        async fn all_todos(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Todo>, anyhow::Error>;
        async fn todo_by_id(
            &self,
            id: i64,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Todo, DrivenPortError>;
    }

    pub trait TodoWriter {
        async fn create_todo(
            &self,
            content: &TodoContent,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Todo, anyhow::Error>;

        async fn update_todo(
            &self,
            id: i64,
            content: &TodoContent,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Todo, DrivenPortError>;

        async fn delete_todo(
            &self,
            id: i64,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError>;
    }
}

pub mod driving_ports {
    use super::*;

    pub trait TodoPort {
        async fn all_todos(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Vec<Todo>, Error>;
        async fn todo_by_id(
            &self,
            id: i64,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Todo, Error>;
        async fn create_todo(
            &self,
            draft: &TodoDraft,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, Error>;
        async fn update_todo(
            &self,
            id: i64,
            draft: &TodoDraft,
            ext_cxn: &mut impl TransactableExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, Error>;
        async fn delete_todo(
            &self,
            id: i64,
            ext_cxn: &mut impl TransactableExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<(), Error>;
    }
}

pub struct TodoService {}

impl driving_ports::TodoPort for TodoService {
    async fn all_todos(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Vec<Todo>, Error> {
        let todos_result = todo_read.all_todos(&mut *ext_cxn).await;
        if let Err(ref port_err) = todos_result {
            error!("Todo fetch failure: {port_err:#}");
        }

        todos_result.map_err(|err| DrivenPortError::from(err).into_error_trying_to("fetch todos"))
    }

    async fn todo_by_id(
        &self,
        id: i64,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Todo, Error> {
        if id <= 0 {
            return Err(Error::DoesNotExist);
        }

        todo_read
            .todo_by_id(id, &mut *ext_cxn)
            .await
            .map_err(|err| err.into_error_trying_to("fetch a todo"))
    }

    async fn create_todo(
        &self,
        draft: &TodoDraft,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, Error> {
        let content = validated_content(draft)?;

        let created_todo = todo_write
            .create_todo(&content, &mut *ext_cxn)
            .await
            .map_err(|err| DrivenPortError::from(err).into_error_trying_to("create a todo"))?;
        info!("Created todo {}", created_todo.id);

        Ok(created_todo)
    }

    async fn update_todo(
        &self,
        id: i64,
        draft: &TodoDraft,
        ext_cxn: &mut impl TransactableExternalConnectivity,
        todo_read: &impl TodoReader,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, Error> {
        let content = validated_content(draft)?;
        if id <= 0 {
            return Err(Error::DoesNotExist);
        }

        let mut txn = ext_cxn.start_transaction().await.map_err(|err| {
            DrivenPortError::from(err).into_error_trying_to("start a transaction for an update")
        })?;
        todo_read
            .todo_by_id(id, &mut txn)
            .await
            .map_err(|err| err.into_error_trying_to("look up the todo being updated"))?;
        let updated_todo = todo_write
            .update_todo(id, &content, &mut txn)
            .await
            .map_err(|err| err.into_error_trying_to("update a todo"))?;
        txn.commit()
            .await
            .map_err(|err| DrivenPortError::from(err).into_error_trying_to("commit a todo update"))?;

        Ok(updated_todo)
    }

    async fn delete_todo(
        &self,
        id: i64,
        ext_cxn: &mut impl TransactableExternalConnectivity,
        todo_read: &impl TodoReader,
        todo_write: &impl TodoWriter,
    ) -> Result<(), Error> {
        if id <= 0 {
            return Err(Error::DoesNotExist);
        }

        let mut txn = ext_cxn.start_transaction().await.map_err(|err| {
            DrivenPortError::from(err).into_error_trying_to("start a transaction for a delete")
        })?;
        todo_read
            .todo_by_id(id, &mut txn)
            .await
            .map_err(|err| err.into_error_trying_to("look up the todo being deleted"))?;
        todo_write
            .delete_todo(id, &mut txn)
            .await
            .map_err(|err| err.into_error_trying_to("delete a todo"))?;
        txn.commit()
            .await
            .map_err(|err| DrivenPortError::from(err).into_error_trying_to("commit a todo delete"))?;
        info!("Deleted todo {id}");

        Ok(())
    }
}
