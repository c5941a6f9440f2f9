//! C-ABI wrapper around `todo-client-core`.
//!
//! # Overview
//! Exposes the todo list controller through `extern "C"` functions so a UI
//! shell written in any language with a C FFI can drive it: feed it user
//! input, execute the HTTP requests it asks for, hand back the responses and
//! render its lists and notifications.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Network operations follow the core's begin/finish split:
//!   `todo_begin_*` returns an `FfiStepResult` holding an `FfiPending`; the
//!   host reads its request with `todo_pending_request`, executes it, and
//!   calls `todo_finish` (or `todo_finish_transport_error`). A finish may
//!   hand back another pending request, the follow-up refresh.
//! - The C caller owns all returned pointers and must call the matching
//!   `todo_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use todo_client_core::{ClientConfig, HttpResponse, TodoClient, TodoController, TodoId, TransportError};

use types::*;

/// Borrow a C string argument. Fails with `NullArg` or `InvalidUtf8`.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Result<&'a str, FfiErrorCode> {
    if ptr.is_null() {
        return Err(FfiErrorCode::NullArg);
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| FfiErrorCode::InvalidUtf8)
}

/// Borrow an id argument, or build the matching error result.
unsafe fn id_arg(ptr: *const c_char) -> Result<TodoId, *mut FfiStepResult> {
    match unsafe { str_arg(ptr) } {
        Ok(id) => Ok(TodoId::from(id)),
        Err(FfiErrorCode::InvalidUtf8) => Err(FfiStepResult::invalid_utf8("id")),
        Err(_) => Err(FfiStepResult::null_arg("id")),
    }
}

// ---------------------------------------------------------------------------
// Controller lifecycle
// ---------------------------------------------------------------------------

/// Create a controller talking to `base_url`.
///
/// Returns null if `base_url` is null, not UTF-8, or if an internal panic
/// occurs. The caller must free the returned pointer with
/// `todo_controller_free`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_controller_new(base_url: *const c_char) -> *mut FfiTodoController {
    catch_unwind(|| {
        let Ok(url) = (unsafe { str_arg(base_url) }) else {
            return std::ptr::null_mut();
        };
        let controller = TodoController::new(TodoClient::new(url));
        Box::into_raw(Box::new(FfiTodoController::new(controller)))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a controller for the backend named by `TODO_API_URL`, or the
/// hosted default when it is unset.
#[unsafe(no_mangle)]
pub extern "C" fn todo_controller_new_from_env() -> *mut FfiTodoController {
    catch_unwind(|| {
        let client = TodoClient::from_config(&ClientConfig::from_env());
        Box::into_raw(Box::new(FfiTodoController::new(TodoController::new(client))))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a controller created by `todo_controller_new*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_controller_free(controller: *mut FfiTodoController) {
    if !controller.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(controller) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Local state transitions
// ---------------------------------------------------------------------------

/// Replace the draft title.
#[unsafe(no_mangle)]
pub extern "C" fn todo_set_draft_title(controller: *mut FfiTodoController, title: *const c_char) -> FfiErrorCode {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(ctrl) = (unsafe { controller.as_mut() }) else {
            return FfiErrorCode::NullArg;
        };
        match unsafe { str_arg(title) } {
            Ok(title) => {
                ctrl.inner.set_draft_title(title);
                FfiErrorCode::Ok
            }
            Err(code) => code,
        }
    }))
    .unwrap_or(FfiErrorCode::Panic)
}

/// Replace the draft description.
#[unsafe(no_mangle)]
pub extern "C" fn todo_set_draft_description(
    controller: *mut FfiTodoController,
    description: *const c_char,
) -> FfiErrorCode {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(ctrl) = (unsafe { controller.as_mut() }) else {
            return FfiErrorCode::NullArg;
        };
        match unsafe { str_arg(description) } {
            Ok(description) => {
                ctrl.inner.set_draft_description(description);
                FfiErrorCode::Ok
            }
            Err(code) => code,
        }
    }))
    .unwrap_or(FfiErrorCode::Panic)
}

/// Switch between the active and completed lists. No request is made.
#[unsafe(no_mangle)]
pub extern "C" fn todo_set_view_mode(controller: *mut FfiTodoController, mode: FfiViewMode) -> FfiErrorCode {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(ctrl) = (unsafe { controller.as_mut() }) else {
            return FfiErrorCode::NullArg;
        };
        ctrl.inner.set_view_mode(mode.into());
        FfiErrorCode::Ok
    }))
    .unwrap_or(FfiErrorCode::Panic)
}

/// Put the todo `id` from the current view into the form for editing.
///
/// Returns `NotInView` when the current view does not list `id`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_start_edit(controller: *mut FfiTodoController, id: *const c_char) -> FfiErrorCode {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(ctrl) = (unsafe { controller.as_mut() }) else {
            return FfiErrorCode::NullArg;
        };
        let id = match unsafe { str_arg(id) } {
            Ok(id) => id,
            Err(code) => return code,
        };
        let Some(todo) = ctrl.inner.visible().iter().find(|t| t.id.as_str() == id).cloned() else {
            return FfiErrorCode::NotInView;
        };
        ctrl.inner.start_edit(&todo);
        FfiErrorCode::Ok
    }))
    .unwrap_or(FfiErrorCode::Panic)
}

// ---------------------------------------------------------------------------
// Begin network operations
// ---------------------------------------------------------------------------

/// Start reloading the whole collection.
#[unsafe(no_mangle)]
pub extern "C" fn todo_begin_refresh(controller: *mut FfiTodoController) -> *mut FfiStepResult {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(ctrl) = (unsafe { controller.as_mut() }) else {
            return FfiStepResult::null_arg("controller");
        };
        let pending = ctrl.inner.begin_refresh();
        FfiStepResult::from_outcome(Ok(()), Some(pending))
    }))
    .unwrap_or_else(|_| FfiStepResult::panic("panic in todo_begin_refresh"))
}

/// Start creating a todo from the draft fields.
///
/// Returns `Validation` with no pending request when a draft field is empty.
#[unsafe(no_mangle)]
pub extern "C" fn todo_begin_create(controller: *mut FfiTodoController) -> *mut FfiStepResult {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(ctrl) = (unsafe { controller.as_mut() }) else {
            return FfiStepResult::null_arg("controller");
        };
        match ctrl.inner.begin_create() {
            Ok(pending) => FfiStepResult::from_outcome(Ok(()), Some(pending)),
            Err(e) => FfiStepResult::from_outcome(Err(e), None),
        }
    }))
    .unwrap_or_else(|_| FfiStepResult::panic("panic in todo_begin_create"))
}

/// Start saving the edit in progress. `pending` is null when nothing is
/// being edited.
#[unsafe(no_mangle)]
pub extern "C" fn todo_begin_commit_edit(controller: *mut FfiTodoController) -> *mut FfiStepResult {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(ctrl) = (unsafe { controller.as_mut() }) else {
            return FfiStepResult::null_arg("controller");
        };
        match ctrl.inner.begin_commit_edit() {
            Ok(pending) => FfiStepResult::from_outcome(Ok(()), pending),
            Err(e) => FfiStepResult::from_outcome(Err(e), None),
        }
    }))
    .unwrap_or_else(|_| FfiStepResult::panic("panic in todo_begin_commit_edit"))
}

/// Start the form's primary action: create in add mode, commit the edit in
/// update mode.
#[unsafe(no_mangle)]
pub extern "C" fn todo_begin_submit(controller: *mut FfiTodoController) -> *mut FfiStepResult {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(ctrl) = (unsafe { controller.as_mut() }) else {
            return FfiStepResult::null_arg("controller");
        };
        match ctrl.inner.begin_submit() {
            Ok(pending) => FfiStepResult::from_outcome(Ok(()), pending),
            Err(e) => FfiStepResult::from_outcome(Err(e), None),
        }
    }))
    .unwrap_or_else(|_| FfiStepResult::panic("panic in todo_begin_submit"))
}

/// Start moving `id` to the other list.
#[unsafe(no_mangle)]
pub extern "C" fn todo_begin_toggle_completion(
    controller: *mut FfiTodoController,
    id: *const c_char,
) -> *mut FfiStepResult {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(ctrl) = (unsafe { controller.as_mut() }) else {
            return FfiStepResult::null_arg("controller");
        };
        let id = match unsafe { id_arg(id) } {
            Ok(id) => id,
            Err(result) => return result,
        };
        match ctrl.inner.begin_toggle_completion(&id) {
            Ok(pending) => FfiStepResult::from_outcome(Ok(()), Some(pending)),
            Err(e) => FfiStepResult::from_outcome(Err(e), None),
        }
    }))
    .unwrap_or_else(|_| FfiStepResult::panic("panic in todo_begin_toggle_completion"))
}

/// Start deleting `id` from the active list.
#[unsafe(no_mangle)]
pub extern "C" fn todo_begin_delete_todo(controller: *mut FfiTodoController, id: *const c_char) -> *mut FfiStepResult {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(ctrl) = (unsafe { controller.as_mut() }) else {
            return FfiStepResult::null_arg("controller");
        };
        let id = match unsafe { id_arg(id) } {
            Ok(id) => id,
            Err(result) => return result,
        };
        let pending = ctrl.inner.begin_delete_todo(&id);
        FfiStepResult::from_outcome(Ok(()), Some(pending))
    }))
    .unwrap_or_else(|_| FfiStepResult::panic("panic in todo_begin_delete_todo"))
}

/// Start deleting `id` from the completed list.
#[unsafe(no_mangle)]
pub extern "C" fn todo_begin_delete_completed(
    controller: *mut FfiTodoController,
    id: *const c_char,
) -> *mut FfiStepResult {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(ctrl) = (unsafe { controller.as_mut() }) else {
            return FfiStepResult::null_arg("controller");
        };
        let id = match unsafe { id_arg(id) } {
            Ok(id) => id,
            Err(result) => return result,
        };
        let pending = ctrl.inner.begin_delete_completed(&id);
        FfiStepResult::from_outcome(Ok(()), Some(pending))
    }))
    .unwrap_or_else(|_| FfiStepResult::panic("panic in todo_begin_delete_completed"))
}

// ---------------------------------------------------------------------------
// Pending requests
// ---------------------------------------------------------------------------

/// Copy out the HTTP request a pending operation is waiting on.
///
/// Returns null if `pending` is null. The caller must free the returned
/// pointer with `todo_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_pending_request(pending: *const FfiPending) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(pending) = (unsafe { pending.as_ref() }) else {
            return std::ptr::null_mut();
        };
        FfiHttpRequest::from_core(pending.inner.request().clone())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Apply the response to `pending`. Consumes `pending` unless the result
/// is `NullArg`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_finish(
    controller: *mut FfiTodoController,
    pending: *mut FfiPending,
    response: *const FfiHttpResponse,
) -> *mut FfiStepResult {
    catch_unwind(AssertUnwindSafe(|| {
        if controller.is_null() {
            return FfiStepResult::null_arg("controller");
        }
        if pending.is_null() {
            return FfiStepResult::null_arg("pending");
        }
        if response.is_null() {
            return FfiStepResult::null_arg("response");
        }
        let ctrl = unsafe { &mut *controller };
        let pending = unsafe { Box::from_raw(pending) };
        let resp = ffi_response_to_core(unsafe { &*response });
        let step = ctrl.inner.finish(pending.inner, Ok(resp));
        FfiStepResult::from_outcome(step.result, step.follow_up)
    }))
    .unwrap_or_else(|_| FfiStepResult::panic("panic in todo_finish"))
}

/// Report that `pending` could not be executed at all (no HTTP response).
/// Consumes `pending` unless the result is `NullArg`. `message` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_finish_transport_error(
    controller: *mut FfiTodoController,
    pending: *mut FfiPending,
    message: *const c_char,
) -> *mut FfiStepResult {
    catch_unwind(AssertUnwindSafe(|| {
        if controller.is_null() {
            return FfiStepResult::null_arg("controller");
        }
        if pending.is_null() {
            return FfiStepResult::null_arg("pending");
        }
        let ctrl = unsafe { &mut *controller };
        let pending = unsafe { Box::from_raw(pending) };
        let message = unsafe { str_arg(message) }.unwrap_or("request failed");
        let step = ctrl.inner.finish(pending.inner, Err(TransportError::new(message)));
        FfiStepResult::from_outcome(step.result, step.follow_up)
    }))
    .unwrap_or_else(|_| FfiStepResult::panic("panic in todo_finish_transport_error"))
}

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body
/// reads as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }.to_string_lossy().into_owned()
    };
    HttpResponse::new(resp.status, body)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Snapshot of the active list. Free with `todo_free_todo_list`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_controller_active(controller: *const FfiTodoController) -> *mut FfiTodoList {
    catch_unwind(AssertUnwindSafe(|| match unsafe { controller.as_ref() } {
        Some(ctrl) => FfiTodoList::from_core(ctrl.inner.active()),
        None => std::ptr::null_mut(),
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Snapshot of the completed list. Free with `todo_free_todo_list`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_controller_completed(controller: *const FfiTodoController) -> *mut FfiTodoList {
    catch_unwind(AssertUnwindSafe(|| match unsafe { controller.as_ref() } {
        Some(ctrl) => FfiTodoList::from_core(ctrl.inner.completed()),
        None => std::ptr::null_mut(),
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Snapshot of whichever list the current view shows.
#[unsafe(no_mangle)]
pub extern "C" fn todo_controller_visible(controller: *const FfiTodoController) -> *mut FfiTodoList {
    catch_unwind(AssertUnwindSafe(|| match unsafe { controller.as_ref() } {
        Some(ctrl) => FfiTodoList::from_core(ctrl.inner.visible()),
        None => std::ptr::null_mut(),
    }))
    .unwrap_or(std::ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_controller_view_mode(controller: *const FfiTodoController) -> FfiViewMode {
    catch_unwind(AssertUnwindSafe(|| {
        unsafe { controller.as_ref() }.map_or(FfiViewMode::Active, |ctrl| ctrl.inner.view_mode().into())
    }))
    .unwrap_or(FfiViewMode::Active)
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_controller_is_submitting(controller: *const FfiTodoController) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        unsafe { controller.as_ref() }.is_some_and(|ctrl| ctrl.inner.is_submitting())
    }))
    .unwrap_or(false)
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_controller_is_toggling_completion(controller: *const FfiTodoController) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        unsafe { controller.as_ref() }.is_some_and(|ctrl| ctrl.inner.is_toggling_completion())
    }))
    .unwrap_or(false)
}

/// True while the list area should show a spinner.
#[unsafe(no_mangle)]
pub extern "C" fn todo_controller_is_list_busy(controller: *const FfiTodoController) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        unsafe { controller.as_ref() }.is_some_and(|ctrl| ctrl.inner.is_list_busy())
    }))
    .unwrap_or(false)
}

/// True while the form is in update mode.
#[unsafe(no_mangle)]
pub extern "C" fn todo_controller_is_editing(controller: *const FfiTodoController) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        unsafe { controller.as_ref() }.is_some_and(|ctrl| ctrl.inner.editing().is_some())
    }))
    .unwrap_or(false)
}

/// Current draft title. Free with `todo_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_controller_draft_title(controller: *const FfiTodoController) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| match unsafe { controller.as_ref() } {
        Some(ctrl) => c_string(ctrl.inner.draft_title()),
        None => std::ptr::null_mut(),
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Current draft description. Free with `todo_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_controller_draft_description(controller: *const FfiTodoController) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| match unsafe { controller.as_ref() } {
        Some(ctrl) => c_string(ctrl.inner.draft_description()),
        None => std::ptr::null_mut(),
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Whole controller state as a JSON document. Free with `todo_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_controller_state_json(controller: *const FfiTodoController) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(ctrl) = (unsafe { controller.as_ref() }) else {
            return std::ptr::null_mut();
        };
        match serde_json::to_string(&ctrl.inner.snapshot()) {
            Ok(json) => c_string(json),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Pop the oldest queued notification, or null when there is none.
/// Free with `todo_free_notification`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_next_notification(controller: *mut FfiTodoController) -> *mut FfiNotification {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(ctrl) = (unsafe { controller.as_mut() }) else {
            return std::ptr::null_mut();
        };
        match ctrl.next_notification() {
            Some(note) => FfiNotification::from_core(note),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `todo_pending_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiStepResult`. Does not free `pending`; finish it or release
/// it with `todo_pending_free`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_step_result(result: *mut FfiStepResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
    });
}

/// Drop a pending operation without finishing it. Its busy flag stays set
/// until another operation of the same kind finishes. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_pending_free(pending: *mut FfiPending) {
    if !pending.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(pending) });
        }));
    }
}

/// Free an `FfiTodoList` and every item in it. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_todo_list(list: *mut FfiTodoList) {
    if list.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let list = unsafe { Box::from_raw(list) };
        if !list.items.is_null() && list.len > 0 {
            let items = unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(list.items, list.len as usize)) };
            for item in items.iter() {
                free_ffi_todo_fields(item);
            }
        }
    });
}

/// Free an `FfiNotification`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_notification(note: *mut FfiNotification) {
    if note.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let note = unsafe { Box::from_raw(note) };
        free_c_string(note.message);
    });
}

/// Free the C-string fields of an `FfiTodo` (but not the struct itself).
fn free_ffi_todo_fields(todo: &FfiTodo) {
    free_c_string(todo.id);
    free_c_string(todo.title);
    free_c_string(todo.description);
    free_c_string(todo.added_on);
    free_c_string(todo.completed_on);
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
