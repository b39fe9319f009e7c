// Undo/redo history module for the editor.
//
// The canvas is shared between the editor and the actions recorded in the
// history engine, so it lives behind Rc<RefCell<_>>. Actions hold a pixel
// delta and apply or revert it against that shared canvas.

use std::cell::{Ref, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use egui::Color32;
use rewind_core::{Action, ActionError, HistoryConfig, HistoryEngine, HistoryError};
use rewind_session::{load_document, DocumentV1, JsonSaveHandler};
use tracing::{debug, info};

use crate::{Canvas, CanvasSnapshot, CommandBar, PixelDelta, Tool};

pub struct CanvasEditor {
    canvas: Rc<RefCell<Canvas>>,
    history: HistoryEngine,
    commands: Rc<RefCell<CommandBar>>,
    save_path: Option<PathBuf>,
}

// Build the undoable action for one delta. Borrow failures surface as errors
// instead of panics.
fn delta_action(canvas: &Rc<RefCell<Canvas>>, delta: PixelDelta, label: &str) -> Action {
    let delta = Rc::new(delta);
    let (fwd_canvas, rev_canvas) = (canvas.clone(), canvas.clone());
    let (fwd_delta, rev_delta) = (delta.clone(), delta);

    Action::new(
        move || {
            let mut canvas = fwd_canvas
                .try_borrow_mut()
                .map_err(|_| ActionError::InvalidState("canvas is borrowed".into()))?;
            fwd_delta.apply(&mut canvas);
            Ok(())
        },
        move || {
            let mut canvas = rev_canvas
                .try_borrow_mut()
                .map_err(|_| ActionError::InvalidState("canvas is borrowed".into()))?;
            rev_delta.revert(&mut canvas);
            Ok(())
        },
    )
    .with_description(label)
}

impl CanvasEditor {
    pub fn new(canvas: Canvas, config: &HistoryConfig) -> Self {
        let mut history = HistoryEngine::from_config(config);
        let commands = CommandBar::attach(&mut history);
        Self {
            canvas: Rc::new(RefCell::new(canvas)),
            history,
            commands,
            save_path: None,
        }
    }

    /// Saves go to `path` as a JSON document titled `title`.
    pub fn with_save_path(mut self, path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        let path = path.into();
        let canvas = self.canvas.clone();
        let handler = JsonSaveHandler::new(path.clone(), title, move || canvas.borrow().snapshot());
        self.history.set_save_handler(handler);
        self.save_path = Some(path);
        self
    }

    /// Opens a saved canvas. The loaded state is the baseline: history starts
    /// empty and clean, and saving writes back under the same document id.
    pub fn open(path: impl AsRef<Path>, config: &HistoryConfig) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let document: DocumentV1<CanvasSnapshot> = load_document(path)?;
        let canvas = Canvas::from_snapshot(document.content)?;
        info!(
            document_id = %document.document_id,
            width = canvas.width,
            height = canvas.height,
            "opened canvas"
        );

        let mut editor = Self::new(canvas, config);
        let snapshot_source = editor.canvas.clone();
        let handler = JsonSaveHandler::new(path.to_path_buf(), document.title, move || {
            snapshot_source.borrow().snapshot()
        })
        .with_document_id(document.document_id);
        editor.history.set_save_handler(handler);
        editor.save_path = Some(path.to_path_buf());
        Ok(editor)
    }

    pub fn canvas(&self) -> Ref<'_, Canvas> {
        self.canvas.borrow()
    }

    pub fn history(&self) -> &HistoryEngine {
        &self.history
    }

    pub fn commands(&self) -> Ref<'_, CommandBar> {
        self.commands.borrow()
    }

    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    /// Applies `tool` directly, then records what it changed. Strokes that
    /// change nothing are not recorded. Returns whether an entry was added.
    pub fn apply_tool(&mut self, tool: &dyn Tool, x: u32, y: u32) -> bool {
        let before = self.canvas.borrow().clone();
        tool.apply(&mut self.canvas.borrow_mut(), x, y);
        let delta = PixelDelta::between(&before, &self.canvas.borrow());

        if delta.is_empty() {
            debug!(tool = tool.name(), "stroke changed nothing, not recorded");
            return false;
        }

        debug!(tool = tool.name(), pixels = delta.len(), "recording stroke");
        let action = delta_action(&self.canvas, delta, tool.name());
        self.history.record(action);
        true
    }

    /// Fills the whole canvas through the history engine. Like strokes, a fill
    /// that changes nothing is not recorded; returns whether it was.
    pub fn fill_canvas(&mut self, color: Color32) -> Result<bool, HistoryError> {
        self.execute_whole_canvas("Fill canvas", |canvas| canvas.fill(color))
    }

    pub fn clear_canvas(&mut self) -> Result<bool, HistoryError> {
        self.execute_whole_canvas("Clear canvas", Canvas::clear)
    }

    fn execute_whole_canvas(
        &mut self,
        label: &str,
        edit: impl FnOnce(&mut Canvas),
    ) -> Result<bool, HistoryError> {
        let delta = {
            let canvas = self.canvas.borrow();
            let mut edited = canvas.clone();
            edit(&mut edited);
            PixelDelta::between(&canvas, &edited)
        };

        if delta.is_empty() {
            debug!(label, "edit changed nothing, not recorded");
            return Ok(false);
        }
        self.history.execute(delta_action(&self.canvas, delta, label))?;
        Ok(true)
    }

    pub fn undo(&mut self) -> Result<(), HistoryError> {
        self.history.undo()
    }

    pub fn redo(&mut self) -> Result<(), HistoryError> {
        self.history.redo()
    }

    /// Saves when there is something to save. Returns `false` when the save
    /// command was disabled.
    pub fn save(&mut self) -> Result<bool, HistoryError> {
        if !self.history.can_save() {
            debug!("save skipped, nothing dirty");
            return Ok(false);
        }
        self.history.acknowledge_save()?;
        Ok(true)
    }

    pub fn clear_history(&mut self) {
        self.history.clear_history();
    }
}
