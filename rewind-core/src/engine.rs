//! Undo/redo history engine.
//!
//! [`HistoryEngine`] keeps a bounded undo stack and an unbounded redo stack of
//! [`Action`]s. When the undo stack exceeds its capacity the oldest entry is
//! dropped from the front. A newly executed action clears the redo stack.
//!
//! ```text
//! execute(A), execute(B), execute(C)   capacity 2
//!   undo: [B, C]   redo: []            A evicted
//! undo()
//!   undo: [B]      redo: [C]
//! redo()
//!   undo: [B, C]   redo: []
//! ```
//!
//! The engine is single-threaded: operations, listeners and save handlers are
//! plain closures and are never required to be `Send`.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, error, trace, warn};

use crate::action::{Action, ActionError};
use crate::config::{HistoryConfig, DEFAULT_MAX_HISTORY};
use crate::error::HistoryError;
use crate::save::SaveHandler;
use crate::status::{Command, HistoryStatus, ListenerId, Listeners, StatusChange};

/// Bounded undo/redo history with a dirty flag and change notification.
pub struct HistoryEngine {
    undo_stack: VecDeque<Action>,
    redo_stack: Vec<Action>,
    max_history: usize,
    is_dirty: bool,
    /// Last status published to listeners.
    status: HistoryStatus,
    listeners: Listeners,
    save_handler: Option<Box<dyn SaveHandler>>,
}

impl Default for HistoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryEngine {
    /// Creates an engine holding up to [`DEFAULT_MAX_HISTORY`] undo steps.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_HISTORY)
    }

    /// Creates an engine with the given undo depth. Negative values fall back
    /// to the default instead of being rejected.
    pub fn with_max_history(max_history: i64) -> Self {
        Self::from_config(&HistoryConfig::new(max_history))
    }

    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::with_capacity(config.capacity())
    }

    fn with_capacity(max_history: usize) -> Self {
        debug!(capacity = max_history, "creating history engine");
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_history,
            is_dirty: false,
            status: HistoryStatus::default(),
            listeners: Listeners::default(),
            save_handler: None,
        }
    }

    /// Installs the persistence step run by [`acknowledge_save`](Self::acknowledge_save).
    pub fn with_save_handler(mut self, handler: impl SaveHandler + 'static) -> Self {
        self.set_save_handler(handler);
        self
    }

    pub fn set_save_handler(&mut self, handler: impl SaveHandler + 'static) {
        self.save_handler = Some(Box::new(handler));
    }

    // --- Operations

    /// Clears the redo stack, runs the action's forward operation and pushes
    /// the action onto the undo stack.
    ///
    /// If the forward operation fails its error is returned and the action is
    /// dropped. The redo stack stays cleared.
    pub fn execute(&mut self, action: Action) -> Result<(), HistoryError> {
        self.discard_redo();
        let result = self
            .apply_and_push(action)
            .map_err(|(_, err)| HistoryError::from(err));
        self.refresh_status();
        result
    }

    /// Like [`execute`](Self::execute) but without running the forward
    /// operation, for effects the caller already applied (e.g. loading state).
    pub fn record(&mut self, action: Action) {
        self.discard_redo();
        self.push_undo(action);
        self.refresh_status();
    }

    /// Reverts the most recent action and moves it to the redo stack.
    ///
    /// Calling this with an empty undo stack is a usage error. If the reverse
    /// operation fails the action is dropped from history and the error is
    /// returned. The dirty flag is left as it was on that path.
    pub fn undo(&mut self) -> Result<(), HistoryError> {
        let Some(mut action) = self.undo_stack.pop_back() else {
            warn!("undo requested with an empty undo stack");
            return Err(HistoryError::NothingToUndo);
        };

        debug!(description = action.description(), "undoing action");
        if let Err(err) = action.run_reverse() {
            error!(
                description = action.description(),
                error = %err,
                "reverse operation failed, action dropped from history"
            );
            self.refresh_status();
            return Err(err.into());
        }

        self.redo_stack.push(action);
        self.is_dirty = true;
        self.refresh_status();
        Ok(())
    }

    /// Re-applies the most recently undone action.
    ///
    /// Only that one entry leaves the redo stack; the rest stay available.
    /// If the forward operation fails the action is put back on the redo stack.
    pub fn redo(&mut self) -> Result<(), HistoryError> {
        let Some(action) = self.redo_stack.pop() else {
            warn!("redo requested with an empty redo stack");
            return Err(HistoryError::NothingToRedo);
        };

        debug!(description = action.description(), "redoing action");
        let result = match self.apply_and_push(action) {
            Ok(()) => Ok(()),
            Err((action, err)) => {
                self.redo_stack.push(action);
                Err(err.into())
            }
        };
        self.refresh_status();
        result
    }

    /// Drops every undo and redo entry and marks the document clean.
    pub fn clear_history(&mut self) {
        debug!(
            undo_count = self.undo_stack.len(),
            redo_count = self.redo_stack.len(),
            "clearing history"
        );
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.is_dirty = false;
        self.refresh_status();
    }

    /// Runs the save handler, if any, then marks the document clean.
    ///
    /// On handler failure the dirty flag is left set and the error returned.
    /// Hosts normally gate this on [`can_save`](Self::can_save); it still runs
    /// when nothing is dirty.
    pub fn acknowledge_save(&mut self) -> Result<(), HistoryError> {
        if let Some(handler) = self.save_handler.as_mut() {
            if let Err(err) = handler.save() {
                error!(error = %err, "save handler failed, keeping dirty flag");
                return Err(HistoryError::Save(err));
            }
        }

        debug!("save acknowledged");
        self.is_dirty = false;
        self.refresh_status();
        Ok(())
    }

    // --- Guards

    pub fn can_undo(&self) -> bool {
        !self.status.undo_empty
    }

    pub fn can_redo(&self) -> bool {
        !self.status.redo_empty
    }

    pub fn can_save(&self) -> bool {
        self.status.is_dirty
    }

    /// Whether a host command is currently enabled.
    pub fn can_execute(&self, command: Command) -> bool {
        match command {
            Command::Undo => self.can_undo(),
            Command::Redo => self.can_redo(),
            Command::Save => self.can_save(),
        }
    }

    // --- Status

    pub fn status(&self) -> &HistoryStatus {
        &self.status
    }

    /// Label of the next action to undo, or `""`.
    pub fn undo_description(&self) -> &str {
        &self.status.undo_description
    }

    /// Label of the next action to redo, or `""`.
    pub fn redo_description(&self) -> &str {
        &self.status.redo_description
    }

    pub fn is_undo_empty(&self) -> bool {
        self.status.undo_empty
    }

    pub fn is_redo_empty(&self) -> bool {
        self.status.redo_empty
    }

    pub fn is_dirty(&self) -> bool {
        self.status.is_dirty
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Undo labels, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().rev().map(Action::description)
    }

    /// Redo labels, most recent first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.redo_stack.iter().rev().map(Action::description)
    }

    // --- Listeners

    /// Calls `listener` for every status field that changes value.
    pub fn on_status_change(
        &mut self,
        listener: impl FnMut(&StatusChange) + 'static,
    ) -> ListenerId {
        self.listeners.add_status(Box::new(listener))
    }

    /// Calls `listener` whenever a command's enablement flips.
    pub fn on_can_execute_changed(
        &mut self,
        listener: impl FnMut(Command, bool) + 'static,
    ) -> ListenerId {
        self.listeners.add_command(Box::new(listener))
    }

    /// Returns `false` if the id was unknown or already removed.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    // --- Internals

    fn discard_redo(&mut self) {
        if !self.redo_stack.is_empty() {
            trace!(count = self.redo_stack.len(), "discarding redo path");
            self.redo_stack.clear();
        }
    }

    /// Forward path shared by execute and redo. A failed action is handed
    /// back with its error so the caller decides where it goes.
    fn apply_and_push(&mut self, mut action: Action) -> Result<(), (Action, ActionError)> {
        if let Err(err) = action.run_forward() {
            error!(
                description = action.description(),
                error = %err,
                "forward operation failed"
            );
            return Err((action, err));
        }
        self.push_undo(action);
        Ok(())
    }

    fn push_undo(&mut self, action: Action) {
        trace!(description = action.description(), "pushing undo entry");
        self.undo_stack.push_back(action);
        if self.undo_stack.len() > self.max_history {
            if let Some(evicted) = self.undo_stack.pop_front() {
                debug!(
                    description = evicted.description(),
                    capacity = self.max_history,
                    "undo capacity exceeded, evicting oldest action"
                );
            }
        }
        self.is_dirty = true;
    }

    /// Recomputes derived status and notifies listeners of actual changes.
    fn refresh_status(&mut self) {
        let next = HistoryStatus {
            undo_description: self
                .undo_stack
                .back()
                .map(|a| a.description().to_string())
                .unwrap_or_default(),
            redo_description: self
                .redo_stack
                .last()
                .map(|a| a.description().to_string())
                .unwrap_or_default(),
            undo_empty: self.undo_stack.is_empty(),
            redo_empty: self.redo_stack.is_empty(),
            is_dirty: self.is_dirty,
        };

        let changes = self.status.changes_to(&next);
        self.status = next;
        if !changes.is_empty() {
            self.listeners.notify(&changes);
        }
    }
}

impl fmt::Debug for HistoryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryEngine")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_history", &self.max_history)
            .field("is_dirty", &self.is_dirty)
            .field("listeners", &self.listeners.len())
            .field("has_save_handler", &self.save_handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionError;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn add(counter: &Rc<Cell<i32>>, amount: i32) -> Action {
        let (fwd, rev) = (counter.clone(), counter.clone());
        Action::infallible(
            move || fwd.set(fwd.get() + amount),
            move || rev.set(rev.get() - amount),
        )
        .with_description(format!("Add {amount}"))
    }

    fn failing_forward() -> Action {
        Action::new(
            || Err(ActionError::InvalidState("always fails".into())),
            || Ok(()),
        )
        .with_description("Failing")
    }

    #[test]
    fn execute_applies_and_pushes() {
        let mut history = HistoryEngine::new();
        let counter = Rc::new(Cell::new(0));

        history.execute(add(&counter, 5)).unwrap();

        assert_eq!(counter.get(), 5);
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 0);
        assert_eq!(history.undo_description(), "Add 5");
        assert!(history.is_dirty());
    }

    #[test]
    fn undo_empty_returns_usage_error() {
        let mut history = HistoryEngine::new();
        let err = history.undo().unwrap_err();
        assert!(matches!(err, HistoryError::NothingToUndo));
        assert!(err.is_usage_error());
        assert!(!history.is_dirty());
    }

    #[test]
    fn redo_empty_returns_usage_error() {
        let mut history = HistoryEngine::new();
        let err = history.redo().unwrap_err();
        assert!(matches!(err, HistoryError::NothingToRedo));
        assert!(!history.is_dirty());
    }

    #[test]
    fn failed_execute_does_not_push_but_clears_redo() {
        let mut history = HistoryEngine::new();
        let counter = Rc::new(Cell::new(0));

        history.execute(add(&counter, 2)).unwrap();
        history.undo().unwrap();
        assert_eq!(history.redo_count(), 1);
        history.acknowledge_save().unwrap();

        let err = history.execute(failing_forward()).unwrap_err();
        assert_eq!(err.to_string(), "invalid state: always fails");
        assert!(matches!(
            err,
            HistoryError::Action(ActionError::InvalidState(_))
        ));
        assert_eq!(history.undo_count(), 0);
        assert_eq!(history.redo_count(), 0);
        assert!(history.is_redo_empty());
        assert!(!history.is_dirty());
    }

    #[test]
    fn failed_undo_drops_action() {
        let mut history = HistoryEngine::new();
        let action = Action::new(
            || Ok(()),
            || Err(ActionError::TargetNotFound("layer".into())),
        )
        .with_description("Broken undo");

        history.execute(action).unwrap();
        let err = history.undo().unwrap_err();

        assert_eq!(err.to_string(), "target not found: layer");
        assert_eq!(history.undo_count(), 0);
        assert_eq!(history.redo_count(), 0);
        assert_eq!(history.undo_description(), "");
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn failed_redo_keeps_action_on_redo_stack() {
        let mut history = HistoryEngine::new();
        let fail_next = Rc::new(Cell::new(false));
        let flag = fail_next.clone();
        let action = Action::new(
            move || {
                if flag.get() {
                    Err(anyhow::anyhow!("resource busy").into())
                } else {
                    Ok(())
                }
            },
            || Ok(()),
        )
        .with_description("Flaky");

        history.execute(action).unwrap();
        history.undo().unwrap();
        fail_next.set(true);

        let err = history.redo().unwrap_err();
        assert_eq!(err.to_string(), "resource busy");
        assert_eq!(history.redo_count(), 1);
        assert_eq!(history.redo_description(), "Flaky");
        assert_eq!(history.undo_count(), 0);

        fail_next.set(false);
        history.redo().unwrap();
        assert_eq!(history.undo_description(), "Flaky");
        assert!(history.is_redo_empty());
    }

    #[test]
    fn redo_keeps_remaining_entries() {
        let mut history = HistoryEngine::new();
        let counter = Rc::new(Cell::new(0));

        history.execute(add(&counter, 1)).unwrap();
        history.execute(add(&counter, 2)).unwrap();
        history.execute(add(&counter, 3)).unwrap();
        history.undo().unwrap();
        history.undo().unwrap();
        assert_eq!(counter.get(), 1);

        history.redo().unwrap();
        assert_eq!(counter.get(), 3);
        assert_eq!(history.redo_count(), 1);
        assert_eq!(history.redo_description(), "Add 3");
        assert_eq!(history.undo_description(), "Add 2");
    }

    #[test]
    fn descriptions_most_recent_first() {
        let mut history = HistoryEngine::new();
        let counter = Rc::new(Cell::new(0));

        assert_eq!(history.undo_descriptions().count(), 0);
        history.execute(add(&counter, 1)).unwrap();
        history.execute(add(&counter, 2)).unwrap();
        history.execute(add(&counter, 3)).unwrap();
        history.undo().unwrap();

        let undos: Vec<&str> = history.undo_descriptions().collect();
        assert_eq!(undos, vec!["Add 2", "Add 1"]);
        let redos: Vec<&str> = history.redo_descriptions().collect();
        assert_eq!(redos, vec!["Add 3"]);
    }

    #[test]
    fn empty_description_renders_empty() {
        let mut history = HistoryEngine::new();
        history.execute(Action::infallible(|| {}, || {})).unwrap();
        assert!(history.can_undo());
        assert_eq!(history.undo_description(), "");
    }

    #[test]
    fn listeners_fire_only_on_change() {
        let mut history = HistoryEngine::new();
        let counter = Rc::new(Cell::new(0));
        let changes = Rc::new(RefCell::new(Vec::new()));

        let sink = changes.clone();
        history.on_status_change(move |change| sink.borrow_mut().push(change.clone()));

        history.execute(add(&counter, 1)).unwrap();
        assert_eq!(
            *changes.borrow(),
            vec![
                StatusChange::UndoDescription("Add 1".into()),
                StatusChange::UndoEmpty(false),
                StatusChange::IsDirty(true),
            ]
        );

        changes.borrow_mut().clear();
        history.execute(add(&counter, 1)).unwrap();
        assert!(changes.borrow().is_empty());

        history.execute(add(&counter, 2)).unwrap();
        assert_eq!(
            *changes.borrow(),
            vec![StatusChange::UndoDescription("Add 2".into())]
        );
    }

    #[test]
    fn can_execute_changed_fires_on_flips() {
        let mut history = HistoryEngine::new();
        let counter = Rc::new(Cell::new(0));
        let flips = Rc::new(RefCell::new(Vec::new()));

        let sink = flips.clone();
        history.on_can_execute_changed(move |command, enabled| {
            sink.borrow_mut().push((command, enabled))
        });

        history.execute(add(&counter, 1)).unwrap();
        history.execute(add(&counter, 2)).unwrap();
        history.undo().unwrap();
        history.undo().unwrap();
        history.acknowledge_save().unwrap();

        assert_eq!(
            *flips.borrow(),
            vec![
                (Command::Undo, true),
                (Command::Save, true),
                (Command::Redo, true),
                (Command::Undo, false),
                (Command::Save, false),
            ]
        );
        assert!(history.can_execute(Command::Redo));
        assert!(!history.can_execute(Command::Undo));
        assert!(!history.can_execute(Command::Save));
    }

    #[test]
    fn removed_listener_stops_receiving() {
        let mut history = HistoryEngine::new();
        let counter = Rc::new(Cell::new(0));
        let calls = Rc::new(Cell::new(0));

        let sink = calls.clone();
        let id = history.on_status_change(move |_| sink.set(sink.get() + 1));
        history.execute(add(&counter, 1)).unwrap();
        let seen = calls.get();
        assert!(seen > 0);

        assert!(history.remove_listener(id));
        history.undo().unwrap();
        assert_eq!(calls.get(), seen);
    }

    #[test]
    fn save_handler_runs_before_clearing_dirty() {
        let saves = Rc::new(Cell::new(0));
        let sink = saves.clone();
        let mut history = HistoryEngine::new().with_save_handler(move || -> anyhow::Result<()> {
            sink.set(sink.get() + 1);
            Ok(())
        });
        let counter = Rc::new(Cell::new(0));

        history.execute(add(&counter, 1)).unwrap();
        assert!(history.can_save());
        history.acknowledge_save().unwrap();

        assert_eq!(saves.get(), 1);
        assert!(!history.is_dirty());
        assert!(!history.can_save());
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn status_snapshot_tracks_stacks() {
        let mut history = HistoryEngine::new();
        assert_eq!(*history.status(), HistoryStatus::default());

        let counter = Rc::new(Cell::new(0));
        history.execute(add(&counter, 1)).unwrap();
        history.execute(add(&counter, 2)).unwrap();
        history.undo().unwrap();

        let status = history.status().clone();
        assert_eq!(
            status,
            HistoryStatus {
                undo_description: "Add 1".into(),
                redo_description: "Add 2".into(),
                undo_empty: false,
                redo_empty: false,
                is_dirty: true,
            }
        );
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            serde_json::json!({
                "undo_description": "Add 1",
                "redo_description": "Add 2",
                "undo_empty": false,
                "redo_empty": false,
                "is_dirty": true,
            })
        );
    }

    #[test]
    fn failed_reverse_leaves_dirty_flag() {
        let mut history = HistoryEngine::new();
        let counter = Rc::new(Cell::new(0));
        history.execute(add(&counter, 1)).unwrap();
        history.acknowledge_save().unwrap();
        history.record(Action::new(
            || Ok(()),
            || Err(ActionError::TargetNotFound("layer 2".into())),
        ));
        history.acknowledge_save().unwrap();

        assert!(history.undo().is_err());
        assert!(!history.is_dirty());
        assert_eq!(history.undo_count(), 1);
        assert!(history.redo_descriptions().next().is_none());
    }

    #[test]
    fn failed_save_keeps_dirty() {
        let mut history = HistoryEngine::new();
        history.set_save_handler(|| -> anyhow::Result<()> {
            anyhow::bail!("read-only file system")
        });
        let counter = Rc::new(Cell::new(0));

        history.execute(add(&counter, 1)).unwrap();
        let err = history.acknowledge_save().unwrap_err();

        assert!(matches!(err, HistoryError::Save(_)));
        assert_eq!(err.to_string(), "save handler failed");
        assert!(history.is_dirty());
    }

    #[test]
    fn negative_capacity_uses_default() {
        let history = HistoryEngine::with_max_history(-5);
        assert_eq!(history.max_history(), DEFAULT_MAX_HISTORY);
        assert_eq!(HistoryEngine::default().max_history(), 100);
    }

    #[test]
    fn debug_impl() {
        let history = HistoryEngine::with_max_history(3);
        let debug = format!("{history:?}");
        assert!(debug.contains("HistoryEngine"));
        assert!(debug.contains("undo_count"));
        assert!(debug.contains("max_history: 3"));
    }
}
