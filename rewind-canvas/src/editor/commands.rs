// Menu/toolbar state for undo, redo and save.
// Kept current purely by history notifications; nothing polls the engine.

use std::cell::RefCell;
use std::rc::Rc;

use rewind_core::{Command, HistoryEngine, ListenerId, StatusChange};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBar {
    pub undo_enabled: bool,
    pub redo_enabled: bool,
    pub save_enabled: bool,
    pub undo_label: String,
    pub redo_label: String,
    listeners: Vec<ListenerId>,
}

fn menu_label(verb: &str, description: &str) -> String {
    if description.is_empty() {
        verb.to_string()
    } else {
        format!("{verb} {description}")
    }
}

impl CommandBar {
    /// Builds a bar mirroring `history` and subscribes it to future changes.
    pub fn attach(history: &mut HistoryEngine) -> Rc<RefCell<CommandBar>> {
        let bar = Rc::new(RefCell::new(CommandBar {
            undo_enabled: history.can_undo(),
            redo_enabled: history.can_redo(),
            save_enabled: history.can_save(),
            undo_label: menu_label("Undo", history.undo_description()),
            redo_label: menu_label("Redo", history.redo_description()),
            listeners: Vec::new(),
        }));

        let labels = bar.clone();
        let status_id = history.on_status_change(move |change| {
            labels.borrow_mut().apply_label_change(change);
        });
        let gates = bar.clone();
        let command_id = history.on_can_execute_changed(move |command, enabled| {
            gates.borrow_mut().set_enabled(command, enabled);
        });

        bar.borrow_mut().listeners = vec![status_id, command_id];
        bar
    }

    /// Stops following `history`. The bar keeps its last state.
    pub fn detach(&mut self, history: &mut HistoryEngine) {
        for id in self.listeners.drain(..) {
            history.remove_listener(id);
        }
    }

    pub fn is_enabled(&self, command: Command) -> bool {
        match command {
            Command::Undo => self.undo_enabled,
            Command::Redo => self.redo_enabled,
            Command::Save => self.save_enabled,
        }
    }

    fn set_enabled(&mut self, command: Command, enabled: bool) {
        trace!(?command, enabled, "command enablement changed");
        match command {
            Command::Undo => self.undo_enabled = enabled,
            Command::Redo => self.redo_enabled = enabled,
            Command::Save => self.save_enabled = enabled,
        }
    }

    fn apply_label_change(&mut self, change: &StatusChange) {
        match change {
            StatusChange::UndoDescription(description) => {
                self.undo_label = menu_label("Undo", description);
            }
            StatusChange::RedoDescription(description) => {
                self.redo_label = menu_label("Redo", description);
            }
            _ => {}
        }
    }
}
