//! State machine behind the item list and its create/edit dialog.
//!
//! All view state lives in one [`ItemListController`]. The lock around it is only
//! held for synchronous transitions, never across an api round trip, so a second
//! operation can observe `Submitting` while a create/update is still in flight.

use std::{fmt, sync::Arc};

use shared::domain::{DraftField, Item, ItemDraft, ItemId};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{api::ItemsApi, error::ItemsApiError};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit,
}

impl DialogMode {
    pub fn title(self) -> &'static str {
        match self {
            Self::Create => "Add Item",
            Self::Edit => "Edit Item",
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            Self::Create => "Add",
            Self::Edit => "Update",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftTarget {
    Create,
    Edit(ItemId),
}

impl DraftTarget {
    pub fn mode(&self) -> DialogMode {
        match self {
            Self::Create => DialogMode::Create,
            Self::Edit(_) => DialogMode::Edit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDraft {
    pub fields: ItemDraft,
    pub target: DraftTarget,
}

impl Default for FormDraft {
    fn default() -> Self {
        Self {
            fields: ItemDraft::default(),
            target: DraftTarget::Create,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load items",
            Self::Create => "add item",
            Self::Update => "update item",
            Self::Delete => "delete item",
        };
        f.write_str(name)
    }
}

/// Last failure, kept for the rendering layer until the next successful operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerError {
    pub operation: Operation,
    pub message: String,
}

impl ControllerError {
    fn from_api(operation: Operation, err: &ItemsApiError) -> Self {
        Self {
            operation,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to {}: {}", self.operation, self.message)
    }
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    ItemsLoaded { count: usize },
    DialogChanged { open: bool, mode: DialogMode },
    SubmitFinished { operation: Operation },
    ItemDeleted { id: ItemId },
    Failed(ControllerError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub items: Vec<Item>,
    pub phase: Phase,
    pub dialog_open: bool,
    pub draft: FormDraft,
    pub last_error: Option<ControllerError>,
}

impl ViewSnapshot {
    pub fn dialog_mode(&self) -> DialogMode {
        self.draft.target.mode()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved; the list was refreshed and the dialog closed.
    Saved,
    /// Saved, but the dialog had been closed or reopened meanwhile and was left alone.
    SavedAfterClose,
    Failed,
    AlreadySubmitting,
    DialogClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Failed,
}

struct ControllerState {
    items: Vec<Item>,
    phase: Phase,
    dialog_open: bool,
    draft: FormDraft,
    // Bumped on every open/close; a submit response only touches the dialog it was issued from.
    dialog_generation: u64,
    last_error: Option<ControllerError>,
}

impl ControllerState {
    fn open_dialog(&mut self, draft: FormDraft) {
        self.dialog_generation += 1;
        self.dialog_open = true;
        self.draft = draft;
        self.phase = Phase::Idle;
    }

    fn close_dialog(&mut self) {
        self.dialog_generation += 1;
        self.dialog_open = false;
        self.draft = FormDraft::default();
        self.phase = Phase::Idle;
    }
}

pub struct ItemListController {
    api: Arc<dyn ItemsApi>,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl ItemListController {
    pub fn new(api: Arc<dyn ItemsApi>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            api,
            inner: Mutex::new(ControllerState {
                items: Vec::new(),
                phase: Phase::Idle,
                dialog_open: false,
                draft: FormDraft::default(),
                dialog_generation: 0,
                last_error: None,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        let guard = self.inner.lock().await;
        ViewSnapshot {
            items: guard.items.clone(),
            phase: guard.phase,
            dialog_open: guard.dialog_open,
            draft: guard.draft.clone(),
            last_error: guard.last_error.clone(),
        }
    }

    /// Replaces the held items with the server's list. On failure the previous list stays.
    pub async fn load(&self) -> LoadOutcome {
        match self.api.list().await {
            Ok(items) => {
                let count = items.len();
                {
                    let mut guard = self.inner.lock().await;
                    guard.items = items;
                    guard.last_error = None;
                }
                info!(count, "loaded items");
                let _ = self.events.send(ControllerEvent::ItemsLoaded { count });
                LoadOutcome::Loaded(count)
            }
            Err(err) => {
                error!(error = %err, "failed to load items");
                self.record_failure(Operation::Load, &err).await;
                LoadOutcome::Failed
            }
        }
    }

    pub async fn open_create_dialog(&self) {
        self.inner.lock().await.open_dialog(FormDraft::default());
        self.emit_dialog_changed(true, DialogMode::Create);
    }

    pub async fn open_edit_dialog(&self, item: &Item) {
        self.inner.lock().await.open_dialog(FormDraft {
            fields: ItemDraft::from(item),
            target: DraftTarget::Edit(item.id.clone()),
        });
        self.emit_dialog_changed(true, DialogMode::Edit);
    }

    /// Opens the edit dialog for a held item. Returns `false` if no item has that id.
    pub async fn open_edit_dialog_by_id(&self, id: &ItemId) -> bool {
        let item = {
            let guard = self.inner.lock().await;
            guard.items.iter().find(|item| &item.id == id).cloned()
        };
        match item {
            Some(item) => {
                self.open_edit_dialog(&item).await;
                true
            }
            None => {
                warn!(%id, "no loaded item to edit");
                false
            }
        }
    }

    pub async fn update_draft_field(&self, field: DraftField, value: impl Into<String>) {
        self.inner.lock().await.draft.fields.set(field, value);
    }

    /// Closing does not abort an in-flight submit; its response is ignored by the dialog.
    pub async fn close_dialog(&self) {
        let mode = {
            let mut guard = self.inner.lock().await;
            let mode = guard.draft.target.mode();
            guard.close_dialog();
            mode
        };
        self.emit_dialog_changed(false, mode);
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (generation, draft) = {
            let mut guard = self.inner.lock().await;
            if !guard.dialog_open {
                debug!("submit ignored: dialog is closed");
                return SubmitOutcome::DialogClosed;
            }
            if guard.phase == Phase::Submitting {
                debug!("submit ignored: already submitting");
                return SubmitOutcome::AlreadySubmitting;
            }
            guard.phase = Phase::Submitting;
            (guard.dialog_generation, guard.draft.clone())
        };

        let (operation, result) = match &draft.target {
            DraftTarget::Create => (
                Operation::Create,
                self.api.create(&draft.fields).await.map(|item| {
                    info!(id = %item.id, "created item");
                }),
            ),
            DraftTarget::Edit(id) => (
                Operation::Update,
                self.api.update(id, &draft.fields).await.map(|_| {
                    info!(%id, "updated item");
                }),
            ),
        };

        if let Err(err) = result {
            error!(error = %err, %operation, "submit failed");
            {
                let mut guard = self.inner.lock().await;
                if guard.dialog_generation == generation {
                    guard.phase = Phase::Idle;
                }
            }
            self.record_failure(operation, &err).await;
            return SubmitOutcome::Failed;
        }

        // Re-read server state instead of patching the list locally.
        self.load().await;

        let still_current = {
            let mut guard = self.inner.lock().await;
            let still_current = guard.dialog_generation == generation;
            if still_current {
                guard.close_dialog();
            }
            still_current
        };

        let _ = self
            .events
            .send(ControllerEvent::SubmitFinished { operation });
        if still_current {
            self.emit_dialog_changed(false, draft.target.mode());
            SubmitOutcome::Saved
        } else {
            debug!(%operation, "submit finished after its dialog was closed");
            SubmitOutcome::SavedAfterClose
        }
    }

    /// Deletes on the server, then reloads. Nothing is removed locally before the server confirms.
    pub async fn delete(&self, id: &ItemId) -> DeleteOutcome {
        match self.api.delete(id).await {
            Ok(()) => {
                info!(%id, "deleted item");
                let _ = self
                    .events
                    .send(ControllerEvent::ItemDeleted { id: id.clone() });
                self.load().await;
                DeleteOutcome::Deleted
            }
            Err(err) => {
                error!(error = %err, %id, "failed to delete item");
                self.record_failure(Operation::Delete, &err).await;
                DeleteOutcome::Failed
            }
        }
    }

    async fn record_failure(&self, operation: Operation, err: &ItemsApiError) {
        let failure = ControllerError::from_api(operation, err);
        self.inner.lock().await.last_error = Some(failure.clone());
        let _ = self.events.send(ControllerEvent::Failed(failure));
    }

    fn emit_dialog_changed(&self, open: bool, mode: DialogMode) {
        let _ = self
            .events
            .send(ControllerEvent::DialogChanged { open, mode });
    }
}
