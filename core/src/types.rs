//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the mock backend's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates. Field
//! names on the wire are camelCase (`addedOn`, `completedOn`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::timestamp::{self, Timestamp};

/// Backend-assigned identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single todo item returned by the API.
///
/// `completed_on` is the only thing that decides whether the item is active
/// or completed. It is always serialized, as `null` when unset, so sending a
/// `Todo` back to the server is a full-record overwrite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(alias = "_id")]
    pub id: TodoId,
    pub title: String,
    pub description: String,
    #[serde(with = "timestamp")]
    pub added_on: Timestamp,
    #[serde(default, with = "timestamp::option")]
    pub completed_on: Option<Timestamp>,
}

impl Todo {
    pub fn status(&self) -> Status {
        if self.completed_on.is_some() {
            Status::Completed
        } else {
            Status::Active
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status() == Status::Completed
    }
}

/// Which of the two partitions a todo belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    Completed,
}

/// Request payload for creating a new todo. The server assigns the id and
/// leaves `completedOn` unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    #[serde(with = "timestamp")]
    pub added_on: Timestamp,
}

/// Request payload for editing the text of an existing todo. `completedOn` is
/// not part of the body, so the server keeps whatever it has stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoEdit {
    pub title: String,
    pub description: String,
    #[serde(with = "timestamp")]
    pub added_on: Timestamp,
}
