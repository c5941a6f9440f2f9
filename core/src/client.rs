//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping the core
//! deterministic and free of I/O dependencies.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{NewTodo, Todo, TodoEdit, TodoId};

const TODOS_PATH: &str = "/api/todos";

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}{TODOS_PATH}", self.base_url)
    }

    fn item_url(&self, id: &TodoId) -> String {
        format!("{}{TODOS_PATH}/{id}", self.base_url)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.collection_url(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_todo(&self, input: &NewTodo) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Post, self.collection_url(), input)
    }

    /// PUT the edited text of `id`. The server keeps its stored `completedOn`.
    pub fn build_update_todo(&self, id: &TodoId, input: &TodoEdit) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Put, self.item_url(id), input)
    }

    /// PUT the whole record, `completedOn` included.
    pub fn build_replace_todo(&self, todo: &Todo) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Put, self.item_url(&todo.id), todo)
    }

    pub fn build_delete_todo(&self, id: &TodoId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response)
    }

    /// The confirmation body of a delete is not used.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

fn json_request<T: Serialize>(method: HttpMethod, path: String, input: &T) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    Ok(HttpRequest {
        method,
        path,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:3000")
    }

    fn todo() -> Todo {
        Todo {
            id: TodoId::new("abc123"),
            title: "Walk dog".to_string(),
            description: "Around the block".to_string(),
            added_on: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            completed_on: None,
        }
    }

    #[test]
    fn build_list_todos_produces_correct_request() {
        let req = client().build_list_todos();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/api/todos");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_create_todo_produces_correct_request() {
        let input = NewTodo {
            title: "Buy milk".to_string(),
            description: "Two litres".to_string(),
            added_on: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        };
        let req = client().build_create_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/todos");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Buy milk");
        assert_eq!(body["description"], "Two litres");
        assert_eq!(body["addedOn"], "2024-01-01T09:00:00.000Z");
        assert!(body.get("completedOn").is_none());
    }

    #[test]
    fn build_update_todo_targets_item_and_keeps_added_on() {
        let todo = todo();
        let edit = TodoEdit {
            title: "Walk cat".to_string(),
            description: todo.description.clone(),
            added_on: todo.added_on,
        };
        let req = client().build_update_todo(&todo.id, &edit).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/api/todos/abc123");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["title"], "Walk cat");
        assert_eq!(body["addedOn"], "2024-01-01T09:00:00.000Z");
        assert!(body.get("completedOn").is_none());
    }

    #[test]
    fn build_replace_todo_sends_full_record() {
        let todo = todo();
        let req = client().build_replace_todo(&todo).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/api/todos/abc123");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["id"], "abc123");
        assert!(body["completedOn"].is_null());
    }

    #[test]
    fn build_delete_todo_produces_correct_request() {
        let req = client().build_delete_todo(&TodoId::new("abc123"));
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/api/todos/abc123");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_list_todos_success() {
        let response = HttpResponse::new(
            200,
            r#"[{"id":"1","title":"Test","description":"t","addedOn":"2024-01-01T00:00:00.000Z","completedOn":null}]"#,
        );
        let todos = client().parse_list_todos(response).unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Test");
        assert!(todos[0].completed_on.is_none());
    }

    #[test]
    fn parse_create_todo_accepts_200_and_201() {
        let body = r#"{"id":"1","title":"New","description":"n","addedOn":"2024-01-01T00:00:00.000Z","completedOn":null}"#;
        for status in [200, 201] {
            let todo = client().parse_create_todo(HttpResponse::new(status, body)).unwrap();
            assert_eq!(todo.title, "New");
        }
    }

    #[test]
    fn parse_create_todo_wrong_status() {
        let err = client()
            .parse_create_todo(HttpResponse::new(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn parse_update_todo_success() {
        let response = HttpResponse::new(
            200,
            r#"{"id":"1","title":"Updated","description":"u","addedOn":"2024-01-01T00:00:00.000Z","completedOn":"2024-01-02T00:00:00.000Z"}"#,
        );
        let todo = client().parse_update_todo(response).unwrap();
        assert_eq!(todo.title, "Updated");
        assert!(todo.is_completed());
    }

    #[test]
    fn parse_update_todo_not_found() {
        let err = client().parse_update_todo(HttpResponse::new(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_delete_todo_ignores_confirmation_body() {
        let response = HttpResponse::new(200, r#"{"message":"Todo deleted"}"#);
        assert!(client().parse_delete_todo(response).is_ok());
        assert!(client().parse_delete_todo(HttpResponse::new(204, "")).is_ok());
    }

    #[test]
    fn parse_delete_todo_not_found() {
        let err = client().parse_delete_todo(HttpResponse::new(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:3000/");
        let req = client.build_list_todos();
        assert_eq!(req.path, "http://localhost:3000/api/todos");
    }

    #[test]
    fn parse_list_todos_bad_json() {
        let err = client()
            .parse_list_todos(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
