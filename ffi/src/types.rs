//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::collections::VecDeque;
use std::ffi::CString;
use std::os::raw::c_char;

use todo_client_core::timestamp;
use todo_client_core::{
    ApiError, ControllerError, HttpMethod, Notification, NotificationLevel, Pending, Todo, TodoController, ViewMode,
};

/// Opaque handle to a `TodoController`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiTodoController {
    pub(crate) inner: TodoController,
    pub(crate) notifications: VecDeque<Notification>,
}

impl FfiTodoController {
    pub(crate) fn new(inner: TodoController) -> Self {
        Self {
            inner,
            notifications: VecDeque::new(),
        }
    }

    /// Oldest notification not yet handed to C.
    pub(crate) fn next_notification(&mut self) -> Option<Notification> {
        self.notifications.extend(self.inner.drain_notifications());
        self.notifications.pop_front()
    }
}

/// Opaque handle to an outstanding request. Consumed by `todo_finish` /
/// `todo_finish_transport_error`, or released with `todo_pending_free`.
pub struct FfiPending {
    pub(crate) inner: Pending,
}

/// Allocate a C string, dropping interior NUL bytes rather than failing.
pub(crate) fn c_string(s: impl Into<String>) -> *mut c_char {
    let s: String = s.into();
    match CString::new(s) {
        Ok(c) => c.into_raw(),
        Err(e) => {
            let mut bytes = e.into_vec();
            bytes.retain(|b| *b != 0);
            CString::new(bytes).unwrap_or_default().into_raw()
        }
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Read from a pending operation with `todo_pending_request`. The C caller
/// executes the request and passes the response back through `todo_finish`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: todo_client_core::HttpRequest) -> *mut Self {
        let path = c_string(req.path);
        let body = match req.body {
            Some(b) => c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to `todo_finish`. The FFI layer reads but does not
/// free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Controller state
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FfiViewMode {
    Active = 0,
    Completed = 1,
}

impl From<FfiViewMode> for ViewMode {
    fn from(mode: FfiViewMode) -> Self {
        match mode {
            FfiViewMode::Active => ViewMode::Active,
            FfiViewMode::Completed => ViewMode::Completed,
        }
    }
}

impl From<ViewMode> for FfiViewMode {
    fn from(mode: ViewMode) -> Self {
        match mode {
            ViewMode::Active => FfiViewMode::Active,
            ViewMode::Completed => FfiViewMode::Completed,
        }
    }
}

/// A single todo item exposed to C. Timestamps are RFC 3339 strings;
/// `completed_on` is null for active items.
#[repr(C)]
pub struct FfiTodo {
    pub id: *mut c_char,
    pub title: *mut c_char,
    pub description: *mut c_char,
    pub added_on: *mut c_char,
    pub completed_on: *mut c_char,
}

impl FfiTodo {
    pub(crate) fn from_core(todo: &Todo) -> Self {
        FfiTodo {
            id: c_string(todo.id.as_str()),
            title: c_string(todo.title.as_str()),
            description: c_string(todo.description.as_str()),
            added_on: c_string(timestamp::format(&todo.added_on)),
            completed_on: match &todo.completed_on {
                Some(ts) => c_string(timestamp::format(ts)),
                None => std::ptr::null_mut(),
            },
        }
    }
}

/// A list of todo items exposed to C.
#[repr(C)]
pub struct FfiTodoList {
    pub items: *mut FfiTodo,
    pub len: u32,
}

impl FfiTodoList {
    pub(crate) fn from_core(todos: &[Todo]) -> *mut Self {
        let len = todos.len() as u32;
        let items = if todos.is_empty() {
            std::ptr::null_mut()
        } else {
            let items: Box<[FfiTodo]> = todos.iter().map(FfiTodo::from_core).collect();
            Box::into_raw(items) as *mut FfiTodo
        };
        Box::into_raw(Box::new(FfiTodoList { items, len }))
    }
}

#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FfiNotificationLevel {
    Success = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
}

impl From<NotificationLevel> for FfiNotificationLevel {
    fn from(level: NotificationLevel) -> Self {
        match level {
            NotificationLevel::Success => FfiNotificationLevel::Success,
            NotificationLevel::Info => FfiNotificationLevel::Info,
            NotificationLevel::Warning => FfiNotificationLevel::Warning,
            NotificationLevel::Error => FfiNotificationLevel::Error,
        }
    }
}

#[repr(C)]
pub struct FfiNotification {
    pub level: FfiNotificationLevel,
    pub message: *mut c_char,
}

impl FfiNotification {
    pub(crate) fn from_core(note: Notification) -> *mut Self {
        Box::into_raw(Box::new(FfiNotification {
            level: note.level.into(),
            message: c_string(note.message),
        }))
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned across the boundary.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Deserialization = 3,
    Serialization = 4,
    Panic = 5,
    NullArg = 6,
    Validation = 7,
    Transport = 8,
    NotInView = 9,
    InvalidUtf8 = 10,
}

/// Result envelope for every `todo_begin_*` and `todo_finish*` call.
///
/// `pending` is non-null when the host has a request to execute: the
/// operation's own request after a begin, or a follow-up refresh after a
/// finish. It is owned by the caller and is not released by
/// `todo_free_step_result`. An error and a follow-up can both be present
/// (a failed delete still reloads the list).
#[repr(C)]
pub struct FfiStepResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub pending: *mut FfiPending,
}

impl FfiStepResult {
    fn boxed(error_code: FfiErrorCode, error_message: *mut c_char, http_status: u16, pending: Option<Pending>) -> *mut Self {
        let pending = match pending {
            Some(inner) => Box::into_raw(Box::new(FfiPending { inner })),
            None => std::ptr::null_mut(),
        };
        Box::into_raw(Box::new(FfiStepResult {
            error_code,
            error_message,
            http_status,
            pending,
        }))
    }

    /// Build a result from a controller outcome and an optional request to run next.
    pub(crate) fn from_outcome(result: Result<(), ControllerError>, pending: Option<Pending>) -> *mut Self {
        match result {
            Ok(()) => Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 0, pending),
            Err(err) => {
                let (code, status) = classify(&err);
                Self::boxed(code, c_string(err.to_string()), status, pending)
            }
        }
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::NullArg, c_string(format!("null argument: {name}")), 0, None)
    }

    /// Build an error result for a string argument that is not UTF-8.
    pub(crate) fn invalid_utf8(name: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::InvalidUtf8, c_string(format!("argument is not UTF-8: {name}")), 0, None)
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, c_string(msg), 0, None)
    }
}

/// Map a controller error to its C error code and HTTP status (0 if none).
pub(crate) fn classify(err: &ControllerError) -> (FfiErrorCode, u16) {
    match err {
        ControllerError::Validation(_) => (FfiErrorCode::Validation, 0),
        ControllerError::NotInView { .. } => (FfiErrorCode::NotInView, 0),
        ControllerError::Request(api) => match api {
            ApiError::NotFound => (FfiErrorCode::NotFound, 404),
            ApiError::HttpError { status, .. } => (FfiErrorCode::Http, *status),
            ApiError::DeserializationError(_) => (FfiErrorCode::Deserialization, 0),
            ApiError::SerializationError(_) => (FfiErrorCode::Serialization, 0),
            ApiError::Transport(_) => (FfiErrorCode::Transport, 0),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn c_string_drops_interior_nul() {
        let ptr = c_string("a\0b");
        let s = unsafe { CString::from_raw(ptr) };
        assert_eq!(s.to_str().unwrap(), "ab");
    }

    #[test]
    fn classify_maps_http_status() {
        let err = ControllerError::Request(ApiError::HttpError {
            status: 503,
            body: String::new(),
        });
        assert_eq!(classify(&err), (FfiErrorCode::Http, 503));
    }

    #[test]
    fn todo_without_completion_has_null_completed_on() {
        let todo: Todo = serde_json::from_str(
            r#"{"id":"1","title":"A","description":"a","addedOn":"2024-01-01","completedOn":null}"#,
        )
        .unwrap();
        let ffi = FfiTodo::from_core(&todo);
        assert!(ffi.completed_on.is_null());
        let added = unsafe { CStr::from_ptr(ffi.added_on) }.to_str().unwrap();
        assert_eq!(added, "2024-01-01T00:00:00.000Z");
        unsafe {
            drop(CString::from_raw(ffi.id));
            drop(CString::from_raw(ffi.title));
            drop(CString::from_raw(ffi.description));
            drop(CString::from_raw(ffi.added_on));
        }
    }
}
