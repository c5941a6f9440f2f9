//! Error types for the todo client.
//!
//! # Design
//! `ApiError` covers a single request/response exchange: `NotFound` keeps its
//! own variant for diagnostics, every other non-2xx lands in `HttpError` with
//! the raw status and body. `ControllerError` is what controller operations
//! report; it never means the controller itself is in a bad state.

use thiserror::Error;

use crate::controller::ViewMode;
use crate::types::TodoId;

/// The host could not complete the HTTP round-trip (DNS, connect, TLS, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Errors returned by `TodoClient` parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404, the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A required draft field was empty. Raised before any request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title is required")]
    EmptyTitle,
    #[error("description is required")]
    EmptyDescription,
}

/// Errors reported by `TodoController` operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Request(#[from] ApiError),

    /// A completion toggle named an id the current view does not show.
    #[error("todo {id} is not in the {view} view")]
    NotInView { id: TodoId, view: ViewMode },
}

impl From<TransportError> for ControllerError {
    fn from(err: TransportError) -> Self {
        ControllerError::Request(ApiError::Transport(err))
    }
}
