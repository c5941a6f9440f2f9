//! In-memory stand-in for the todo backend.
//!
//! Implements the `/api/todos` contract the client consumes: list, create,
//! update (fields present in the body overwrite, `completedOn: null` clears)
//! and delete. Records are kept in insertion order.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub added_on: DateTime<Utc>,
    pub completed_on: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    pub description: String,
    pub added_on: Option<DateTime<Utc>>,
}

/// Every field is optional. `completed_on` distinguishes "absent" (`None`)
/// from an explicit `null` (`Some(None)`).
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub added_on: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "present")]
    pub completed_on: Option<Option<DateTime<Utc>>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

pub type Db = Arc<RwLock<Vec<Todo>>>;

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

pub fn app() -> Router {
    app_with_todos(Vec::new())
}

/// Router pre-loaded with `todos`.
pub fn app_with_todos(todos: Vec<Todo>) -> Router {
    let db: Db = Arc::new(RwLock::new(todos));
    Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/{id}", put(update_todo).delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock backend listening");
    }
    axum::serve(listener, app).await
}

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message })))
}

fn not_found() -> (StatusCode, Json<Value>) {
    failure(StatusCode::NOT_FOUND, "Todo not found")
}

async fn list_todos(State(db): State<Db>) -> Json<Vec<Todo>> {
    Json(db.read().await.clone())
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<CreateTodo>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    if input.title.is_empty() || input.description.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "title and description are required"));
    }
    let todo = Todo {
        id: Uuid::new_v4().simple().to_string(),
        title: input.title,
        description: input.description,
        added_on: input.added_on.unwrap_or_else(Utc::now),
        completed_on: None,
    };
    tracing::debug!(id = %todo.id, "created todo");
    db.write().await.push(todo.clone());
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTodo>,
) -> ApiResult<Json<Todo>> {
    let mut todos = db.write().await;
    let todo = todos.iter_mut().find(|t| t.id == id).ok_or_else(not_found)?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(description) = input.description {
        todo.description = description;
    }
    if let Some(added_on) = input.added_on {
        todo.added_on = added_on;
    }
    if let Some(completed_on) = input.completed_on {
        todo.completed_on = completed_on;
    }
    tracing::debug!(%id, completed = todo.completed_on.is_some(), "updated todo");
    Ok(Json(todo.clone()))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let mut todos = db.write().await;
    let index = todos.iter().position(|t| t.id == id).ok_or_else(not_found)?;
    todos.remove(index);
    tracing::debug!(%id, "deleted todo");
    Ok(Json(json!({ "message": "Todo deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn todo_serializes_camel_case() {
        let todo = Todo {
            id: "abc".to_string(),
            title: "Test".to_string(),
            description: "t".to_string(),
            added_on: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            completed_on: None,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["addedOn"], "2024-01-01T00:00:00Z");
        assert!(json["completedOn"].is_null());
    }

    #[test]
    fn create_todo_added_on_is_optional() {
        let input: CreateTodo = serde_json::from_str(r#"{"title":"T","description":"D"}"#).unwrap();
        assert!(input.added_on.is_none());
    }

    #[test]
    fn create_todo_rejects_missing_description() {
        let result: Result<CreateTodo, _> = serde_json::from_str(r#"{"title":"T"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_todo_all_fields_optional() {
        let input: UpdateTodo = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.title.is_none());
        assert!(input.completed_on.is_none());
    }

    #[test]
    fn update_todo_tells_null_from_absent() {
        let cleared: UpdateTodo = serde_json::from_str(r#"{"completedOn":null}"#).unwrap();
        assert_eq!(cleared.completed_on, Some(None));

        let set: UpdateTodo = serde_json::from_str(r#"{"completedOn":"2024-01-02T00:00:00.000Z"}"#).unwrap();
        assert_eq!(
            set.completed_on,
            Some(Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()))
        );
    }

    #[test]
    fn update_todo_ignores_id_in_full_record_body() {
        let input: UpdateTodo = serde_json::from_str(
            r#"{"id":"x","title":"T","description":"D","addedOn":"2024-01-01T00:00:00.000Z","completedOn":null}"#,
        )
        .unwrap();
        assert_eq!(input.title.as_deref(), Some("T"));
        assert_eq!(input.completed_on, Some(None));
    }
}
