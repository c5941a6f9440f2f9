//! The todo list controller: all client-side state plus the operations that
//! change it.
//!
//! # Design
//! Every network operation is split like the client's `build_*`/`parse_*`
//! pairs. A `begin_*` method validates input, raises the matching busy flag
//! and returns a [`Pending`] carrying the `HttpRequest`; [`TodoController::finish`]
//! takes the host's outcome for that request, applies the state transition,
//! clears the flag and queues a notification. Operations that reconcile by
//! re-fetching (edit, delete) hand back the refresh as a follow-up `Pending`.
//!
//! [`TodoController::run`] drives a `Pending` and its follow-ups through a
//! [`Transport`]; the convenience methods (`refresh`, `create`, ...) wrap
//! begin + run for hosts that do blocking I/O.
//!
//! The busy flags are advisory. Nothing stops a second `begin_*` while the
//! first is outstanding, and finishes apply in whatever order they arrive.
//! The only guard is that placing a record always removes its id from both
//! sequences first, so an id can never be listed twice.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::client::TodoClient;
use crate::clock::{Clock, SystemClock};
use crate::error::{ApiError, ControllerError, TransportError, ValidationError};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::notify::{self, Notification};
use crate::partition::{partition, Partitions};
use crate::types::{NewTodo, Status, Todo, TodoEdit, TodoId};

/// Which partition the list area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Active,
    Completed,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Active => f.write_str("active"),
            ViewMode::Completed => f.write_str("completed"),
        }
    }
}

/// What submitting the form does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Add,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Complete,
    Reopen,
}

/// Which list a delete was triggered from. Only the notification copy differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Refresh,
    Create,
    CommitEdit,
    ToggleCompletion { id: TodoId, transition: Transition },
    Delete { id: TodoId, scope: DeleteScope },
}

/// A request the controller is waiting on.
#[derive(Debug, Clone)]
pub struct Pending {
    operation: Operation,
    request: HttpRequest,
}

impl Pending {
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }
}

/// Outcome of [`TodoController::finish`].
#[derive(Debug)]
#[must_use]
pub struct Step {
    pub result: Result<(), ControllerError>,
    pub follow_up: Option<Pending>,
}

impl Step {
    fn done() -> Self {
        Self {
            result: Ok(()),
            follow_up: None,
        }
    }

    fn failed(err: impl Into<ControllerError>) -> Self {
        Self {
            result: Err(err.into()),
            follow_up: None,
        }
    }

    fn then(mut self, follow_up: Pending) -> Self {
        self.follow_up = Some(follow_up);
        self
    }
}

/// Serializable view of the controller state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub active: &'a [Todo],
    pub completed: &'a [Todo],
    pub draft_title: &'a str,
    pub draft_description: &'a str,
    pub editing: Option<&'a TodoId>,
    pub view_mode: ViewMode,
    pub is_submitting: bool,
    pub is_toggling_completion: bool,
}

pub struct TodoController {
    client: TodoClient,
    clock: Arc<dyn Clock>,
    active: Vec<Todo>,
    completed: Vec<Todo>,
    draft_title: String,
    draft_description: String,
    editing: Option<Todo>,
    view: ViewMode,
    submitting: bool,
    toggling: bool,
    notifications: Vec<Notification>,
}

impl fmt::Debug for TodoController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoController")
            .field("client", &self.client)
            .field("active", &self.active.len())
            .field("completed", &self.completed.len())
            .field("editing", &self.editing.as_ref().map(|t| &t.id))
            .field("view", &self.view)
            .field("submitting", &self.submitting)
            .field("toggling", &self.toggling)
            .finish_non_exhaustive()
    }
}

impl TodoController {
    pub fn new(client: TodoClient) -> Self {
        Self::with_clock(client, Arc::new(SystemClock))
    }

    pub fn with_clock(client: TodoClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            clock,
            active: Vec::new(),
            completed: Vec::new(),
            draft_title: String::new(),
            draft_description: String::new(),
            editing: None,
            view: ViewMode::default(),
            submitting: false,
            toggling: false,
            notifications: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    pub fn active(&self) -> &[Todo] {
        &self.active
    }

    pub fn completed(&self) -> &[Todo] {
        &self.completed
    }

    /// The sequence the current view mode shows.
    pub fn visible(&self) -> &[Todo] {
        match self.view {
            ViewMode::Active => &self.active,
            ViewMode::Completed => &self.completed,
        }
    }

    pub fn draft_title(&self) -> &str {
        &self.draft_title
    }

    pub fn draft_description(&self) -> &str {
        &self.draft_description
    }

    pub fn editing(&self) -> Option<&Todo> {
        self.editing.as_ref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_toggling_completion(&self) -> bool {
        self.toggling
    }

    /// The list area shows a spinner instead of items while a submission or
    /// a completion toggle is in flight.
    pub fn is_list_busy(&self) -> bool {
        self.submitting || self.toggling
    }

    pub fn primary_action(&self) -> PrimaryAction {
        if self.editing.is_some() {
            PrimaryAction::Update
        } else {
            PrimaryAction::Add
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Hand queued notifications to the host, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            active: &self.active,
            completed: &self.completed,
            draft_title: &self.draft_title,
            draft_description: &self.draft_description,
            editing: self.editing.as_ref().map(|t| &t.id),
            view_mode: self.view,
            is_submitting: self.submitting,
            is_toggling_completion: self.toggling,
        }
    }

    // -----------------------------------------------------------------------
    // Local transitions
    // -----------------------------------------------------------------------

    pub fn set_draft_title(&mut self, title: impl Into<String>) {
        self.draft_title = title.into();
    }

    pub fn set_draft_description(&mut self, description: impl Into<String>) {
        self.draft_description = description.into();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view = mode;
    }

    /// Load `todo` into the draft fields and switch the form to update mode.
    pub fn start_edit(&mut self, todo: &Todo) {
        debug!(id = %todo.id, "editing todo");
        self.draft_title = todo.title.clone();
        self.draft_description = todo.description.clone();
        self.editing = Some(todo.clone());
    }

    // -----------------------------------------------------------------------
    // Begin
    // -----------------------------------------------------------------------

    pub fn begin_refresh(&mut self) -> Pending {
        Pending {
            operation: Operation::Refresh,
            request: self.client.build_list_todos(),
        }
    }

    /// Submit the draft fields as a new todo.
    pub fn begin_create(&mut self) -> Result<Pending, ControllerError> {
        self.validate_drafts()?;
        let input = NewTodo {
            title: self.draft_title.clone(),
            description: self.draft_description.clone(),
            added_on: self.clock.now(),
        };
        let request = match self.client.build_create_todo(&input) {
            Ok(request) => request,
            Err(e) => return Err(self.report(notify::CREATE_FAILED, e)),
        };
        self.submitting = true;
        Ok(Pending {
            operation: Operation::Create,
            request,
        })
    }

    /// Submit the draft fields as the new text of the todo being edited.
    /// Returns `Ok(None)` when nothing is being edited.
    pub fn begin_commit_edit(&mut self) -> Result<Option<Pending>, ControllerError> {
        let Some((id, added_on)) = self.editing.as_ref().map(|t| (t.id.clone(), t.added_on)) else {
            return Ok(None);
        };
        self.validate_drafts()?;
        let edit = TodoEdit {
            title: self.draft_title.clone(),
            description: self.draft_description.clone(),
            added_on,
        };
        let request = match self.client.build_update_todo(&id, &edit) {
            Ok(request) => request,
            Err(e) => return Err(self.report(notify::UPDATE_FAILED, e)),
        };
        self.submitting = true;
        Ok(Some(Pending {
            operation: Operation::CommitEdit,
            request,
        }))
    }

    /// Flip `id` between active and completed. The id is looked up in the
    /// partition the current view shows.
    pub fn begin_toggle_completion(&mut self, id: &TodoId) -> Result<Pending, ControllerError> {
        let (source, transition) = match self.view {
            ViewMode::Active => (&self.active, Transition::Complete),
            ViewMode::Completed => (&self.completed, Transition::Reopen),
        };
        let Some(found) = source.iter().find(|t| &t.id == id) else {
            warn!(id = %id, view = %self.view, "toggle for todo not in view");
            self.notifications.push(Notification::error(notify::TOGGLE_FAILED));
            return Err(ControllerError::NotInView {
                id: id.clone(),
                view: self.view,
            });
        };

        let mut payload = found.clone();
        payload.completed_on = match transition {
            Transition::Complete => Some(self.clock.now()),
            Transition::Reopen => None,
        };
        let request = match self.client.build_replace_todo(&payload) {
            Ok(request) => request,
            Err(e) => return Err(self.report(notify::TOGGLE_FAILED, e)),
        };
        self.toggling = true;
        Ok(Pending {
            operation: Operation::ToggleCompletion {
                id: id.clone(),
                transition,
            },
            request,
        })
    }

    /// Start whatever the form's primary button does right now: a create in
    /// add mode, a commit of the edit in update mode.
    pub fn begin_submit(&mut self) -> Result<Option<Pending>, ControllerError> {
        match self.primary_action() {
            PrimaryAction::Add => self.begin_create().map(Some),
            PrimaryAction::Update => self.begin_commit_edit(),
        }
    }

    pub fn begin_delete_todo(&mut self, id: &TodoId) -> Pending {
        self.begin_delete(id, DeleteScope::Active)
    }

    pub fn begin_delete_completed(&mut self, id: &TodoId) -> Pending {
        self.begin_delete(id, DeleteScope::Completed)
    }

    fn begin_delete(&mut self, id: &TodoId, scope: DeleteScope) -> Pending {
        Pending {
            operation: Operation::Delete {
                id: id.clone(),
                scope,
            },
            request: self.client.build_delete_todo(id),
        }
    }

    // -----------------------------------------------------------------------
    // Finish
    // -----------------------------------------------------------------------

    /// Apply the host's outcome for `pending`.
    pub fn finish(&mut self, pending: Pending, outcome: Result<HttpResponse, TransportError>) -> Step {
        let Pending { operation, request } = pending;
        debug!(method = %request.method, path = %request.path, "request resolved");
        let outcome = outcome.map_err(ApiError::from);
        match operation {
            Operation::Refresh => self.finish_refresh(outcome),
            Operation::Create => self.finish_create(outcome),
            Operation::CommitEdit => self.finish_commit_edit(outcome),
            Operation::ToggleCompletion { id, transition } => self.finish_toggle(&id, transition, outcome),
            Operation::Delete { id, scope } => self.finish_delete(&id, scope, outcome),
        }
    }

    fn finish_refresh(&mut self, outcome: Result<HttpResponse, ApiError>) -> Step {
        match outcome.and_then(|resp| self.client.parse_list_todos(resp)) {
            Ok(todos) => {
                let Partitions { active, completed } = partition(todos);
                info!(active = active.len(), completed = completed.len(), "todos refreshed");
                self.active = active;
                self.completed = completed;
                Step::done()
            }
            Err(e) => Step::failed(self.report(notify::LOAD_FAILED, e)),
        }
    }

    fn finish_create(&mut self, outcome: Result<HttpResponse, ApiError>) -> Step {
        self.submitting = false;
        match outcome.and_then(|resp| self.client.parse_create_todo(resp)) {
            Ok(todo) => {
                info!(id = %todo.id, "todo created");
                self.place(todo);
                self.clear_drafts();
                self.editing = None;
                self.notifications.push(Notification::success(notify::CREATED));
                Step::done()
            }
            Err(e) => Step::failed(self.report(notify::CREATE_FAILED, e)),
        }
    }

    fn finish_commit_edit(&mut self, outcome: Result<HttpResponse, ApiError>) -> Step {
        self.submitting = false;
        self.editing = None;
        self.clear_drafts();
        let step = match outcome.and_then(|resp| self.client.parse_update_todo(resp)) {
            Ok(todo) => {
                info!(id = %todo.id, "todo updated");
                self.notifications.push(Notification::info(notify::UPDATED));
                Step::done()
            }
            Err(e) => Step::failed(self.report(notify::UPDATE_FAILED, e)),
        };
        step.then(self.begin_refresh())
    }

    fn finish_toggle(&mut self, id: &TodoId, transition: Transition, outcome: Result<HttpResponse, ApiError>) -> Step {
        self.toggling = false;
        match outcome.and_then(|resp| self.client.parse_update_todo(resp)) {
            Ok(todo) => {
                info!(id = %id, ?transition, "completion toggled");
                self.remove(id);
                self.place(todo);
                let note = match transition {
                    Transition::Complete => Notification::success(notify::COMPLETED),
                    Transition::Reopen => Notification::info(notify::REOPENED),
                };
                self.notifications.push(note);
                Step::done()
            }
            Err(e) => Step::failed(self.report(notify::TOGGLE_FAILED, e)),
        }
    }

    fn finish_delete(&mut self, id: &TodoId, scope: DeleteScope, outcome: Result<HttpResponse, ApiError>) -> Step {
        let (done, failed) = match scope {
            DeleteScope::Active => (notify::DELETED, notify::DELETE_FAILED),
            DeleteScope::Completed => (notify::COMPLETED_DELETED, notify::COMPLETED_DELETE_FAILED),
        };
        let step = match outcome.and_then(|resp| self.client.parse_delete_todo(resp)) {
            Ok(()) => {
                info!(id = %id, "todo deleted");
                self.notifications.push(Notification::success(done));
                Step::done()
            }
            Err(e) => Step::failed(self.report(failed, e)),
        };
        step.then(self.begin_refresh())
    }

    // -----------------------------------------------------------------------
    // Blocking drivers
    // -----------------------------------------------------------------------

    /// Execute `pending` and every follow-up it produces. Returns the first
    /// error encountered; follow-ups still run after a failure.
    pub fn run<T: Transport + ?Sized>(&mut self, transport: &mut T, pending: Pending) -> Result<(), ControllerError> {
        let mut first_error = None;
        let mut next = Some(pending);
        while let Some(pending) = next.take() {
            let outcome = transport.execute(pending.request());
            let step = self.finish(pending, outcome);
            if let Err(e) = step.result {
                first_error.get_or_insert(e);
            }
            next = step.follow_up;
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn refresh<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<(), ControllerError> {
        let pending = self.begin_refresh();
        self.run(transport, pending)
    }

    pub fn create<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<(), ControllerError> {
        self.set_draft_title(title);
        self.set_draft_description(description);
        let pending = self.begin_create()?;
        self.run(transport, pending)
    }

    pub fn commit_edit<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<(), ControllerError> {
        match self.begin_commit_edit()? {
            Some(pending) => self.run(transport, pending),
            None => Ok(()),
        }
    }

    pub fn submit<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<(), ControllerError> {
        match self.begin_submit()? {
            Some(pending) => self.run(transport, pending),
            None => Ok(()),
        }
    }

    pub fn toggle_completion<T: Transport + ?Sized>(&mut self, transport: &mut T, id: &TodoId) -> Result<(), ControllerError> {
        let pending = self.begin_toggle_completion(id)?;
        self.run(transport, pending)
    }

    pub fn delete_todo<T: Transport + ?Sized>(&mut self, transport: &mut T, id: &TodoId) -> Result<(), ControllerError> {
        let pending = self.begin_delete_todo(id);
        self.run(transport, pending)
    }

    pub fn delete_completed<T: Transport + ?Sized>(&mut self, transport: &mut T, id: &TodoId) -> Result<(), ControllerError> {
        let pending = self.begin_delete_completed(id);
        self.run(transport, pending)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn validate_drafts(&mut self) -> Result<(), ValidationError> {
        let result = if self.draft_title.is_empty() {
            Err(ValidationError::EmptyTitle)
        } else if self.draft_description.is_empty() {
            Err(ValidationError::EmptyDescription)
        } else {
            Ok(())
        };
        if let Err(e) = result {
            warn!(error = %e, "rejected submission");
            self.notifications.push(Notification::warning(notify::FILL_ALL_FIELDS));
        }
        result
    }

    /// Log a failed request and queue its notification.
    fn report(&mut self, message: &str, err: ApiError) -> ControllerError {
        error!(error = %err, "{}", message);
        self.notifications.push(Notification::error(message));
        ControllerError::Request(err)
    }

    fn remove(&mut self, id: &TodoId) {
        self.active.retain(|t| &t.id != id);
        self.completed.retain(|t| &t.id != id);
    }

    /// Append `todo` to the partition its `completedOn` selects.
    fn place(&mut self, todo: Todo) {
        self.remove(&todo.id);
        match todo.status() {
            Status::Active => self.active.push(todo),
            Status::Completed => self.completed.push(todo),
        }
    }

    fn clear_drafts(&mut self) {
        self.draft_title.clear();
        self.draft_description.clear();
    }
}
