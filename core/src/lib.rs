//! Client core for the todo list app.
//!
//! # Overview
//! Builds `HttpRequest` values and consumes `HttpResponse` values without
//! touching the network (host-does-IO pattern). On top of the stateless
//! request layer sits `TodoController`, which owns the active/completed
//! lists, the draft form and the busy flags, and turns every host outcome
//! into a state transition plus a user notification.
//!
//! # Design
//! - `TodoClient` is stateless, it holds only `base_url`.
//! - Each endpoint is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - `TodoController` mirrors that split with `begin_*` / `finish`; hosts
//!   that can block use `Transport` and the convenience drivers instead.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.
//! - DTOs are defined independently from the mock-backend crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod notify;
pub mod partition;
pub mod timestamp;
pub mod types;

pub use client::TodoClient;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ClientConfig;
pub use controller::{
    DeleteScope, Operation, Pending, PrimaryAction, Snapshot, Step, TodoController, Transition, ViewMode,
};
pub use error::{ApiError, ControllerError, TransportError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use notify::{Notification, NotificationLevel};
pub use partition::{partition, Partitions};
pub use timestamp::Timestamp;
pub use types::{NewTodo, Status, Todo, TodoEdit, TodoId};
