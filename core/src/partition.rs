//! Splitting the full collection into the two views.

use crate::types::{Status, Todo};

/// The two disjoint views derived from one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partitions {
    pub active: Vec<Todo>,
    pub completed: Vec<Todo>,
}

/// Split `todos` by `completedOn`, keeping the server's order within each
/// side.
pub fn partition(todos: Vec<Todo>) -> Partitions {
    let (completed, active) = todos
        .into_iter()
        .partition(|todo| todo.status() == Status::Completed);
    Partitions { active, completed }
}
