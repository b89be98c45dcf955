use crate::domain;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// DTO for a stored todo
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct Todo {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Buy milk")]
    pub title: String,
    #[schema(example = "Semi-skimmed, 2 liters")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::todo::Todo> for Todo {
    fn from(value: domain::todo::Todo) -> Self {
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

/// DTO for creating a new todo via the API. Whitespace around the title and description is
/// trimmed before validation.
#[derive(Deserialize, Display, ToSchema)]
#[display("{title}")]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTodo {
    /// Between 3 and 100 characters
    #[schema(example = "Buy milk")]
    #[serde(default)]
    pub title: String,
    /// At most 500 characters. Blank descriptions are dropped.
    #[schema(example = "Semi-skimmed, 2 liters")]
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl From<NewTodo> for domain::todo::TodoDraft {
    fn from(value: NewTodo) -> Self {
        domain::todo::TodoDraft {
            title: value.title,
            description: value.description,
            completed: value.completed,
        }
    }
}

/// DTO for replacing the content of an existing todo
#[derive(Deserialize, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdateTodo {
    #[schema(example = "Buy oat milk")]
    #[serde(default)]
    pub title: String,
    #[schema(example = "The barista one")]
    #[serde(default)]
    pub description: Option<String>,
    #[schema(example = true)]
    #[serde(default)]
    pub completed: bool,
}

impl From<UpdateTodo> for domain::todo::TodoDraft {
    fn from(value: UpdateTodo) -> Self {
        domain::todo::TodoDraft {
            title: value.title,
            description: value.description,
            completed: value.completed,
        }
    }
}
