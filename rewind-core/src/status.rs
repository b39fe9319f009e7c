//! Host-visible history status and change notification.
//!
//! The engine keeps the last published [`HistoryStatus`]. After every operation
//! it computes a fresh one, diffs the two with [`HistoryStatus::changes_to`],
//! and hands each [`StatusChange`] to the registered listeners. A field that did
//! not change never produces a notification.

use serde::Serialize;
use tracing::trace;

/// Snapshot of everything a UI binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryStatus {
    pub undo_description: String,
    pub redo_description: String,
    pub undo_empty: bool,
    pub redo_empty: bool,
    pub is_dirty: bool,
}

impl Default for HistoryStatus {
    fn default() -> Self {
        Self {
            undo_description: String::new(),
            redo_description: String::new(),
            undo_empty: true,
            redo_empty: true,
            is_dirty: false,
        }
    }
}

/// One field of [`HistoryStatus`] that took a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    UndoDescription(String),
    RedoDescription(String),
    UndoEmpty(bool),
    RedoEmpty(bool),
    IsDirty(bool),
}

/// The commands a host gates on history state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Undo,
    Redo,
    Save,
}

impl StatusChange {
    /// The command whose enablement flips with this change, and its new state.
    pub fn command_enablement(&self) -> Option<(Command, bool)> {
        match *self {
            StatusChange::UndoEmpty(empty) => Some((Command::Undo, !empty)),
            StatusChange::RedoEmpty(empty) => Some((Command::Redo, !empty)),
            StatusChange::IsDirty(dirty) => Some((Command::Save, dirty)),
            StatusChange::UndoDescription(_) | StatusChange::RedoDescription(_) => None,
        }
    }
}

impl HistoryStatus {
    /// Changes needed to go from `self` to `next`, in field order.
    pub fn changes_to(&self, next: &HistoryStatus) -> Vec<StatusChange> {
        let mut changes = Vec::new();
        if self.undo_description != next.undo_description {
            changes.push(StatusChange::UndoDescription(next.undo_description.clone()));
        }
        if self.redo_description != next.redo_description {
            changes.push(StatusChange::RedoDescription(next.redo_description.clone()));
        }
        if self.undo_empty != next.undo_empty {
            changes.push(StatusChange::UndoEmpty(next.undo_empty));
        }
        if self.redo_empty != next.redo_empty {
            changes.push(StatusChange::RedoEmpty(next.redo_empty));
        }
        if self.is_dirty != next.is_dirty {
            changes.push(StatusChange::IsDirty(next.is_dirty));
        }
        changes
    }
}

/// Handle returned when registering a listener; pass it back to remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type StatusListener = Box<dyn FnMut(&StatusChange)>;
type CommandListener = Box<dyn FnMut(Command, bool)>;

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    status: Vec<(ListenerId, StatusListener)>,
    commands: Vec<(ListenerId, CommandListener)>,
}

impl Listeners {
    fn allocate_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn add_status(&mut self, listener: StatusListener) -> ListenerId {
        let id = self.allocate_id();
        self.status.push((id, listener));
        id
    }

    pub(crate) fn add_command(&mut self, listener: CommandListener) -> ListenerId {
        let id = self.allocate_id();
        self.commands.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.status.len() + self.commands.len();
        self.status.retain(|(listener_id, _)| *listener_id != id);
        self.commands.retain(|(listener_id, _)| *listener_id != id);
        before != self.status.len() + self.commands.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.status.len() + self.commands.len()
    }

    pub(crate) fn notify(&mut self, changes: &[StatusChange]) {
        for change in changes {
            trace!(?change, "publishing status change");
            for (_, listener) in self.status.iter_mut() {
                listener(change);
            }
            if let Some((command, enabled)) = change.command_enablement() {
                for (_, listener) in self.commands.iter_mut() {
                    listener(command, enabled);
                }
            }
        }
    }
}
