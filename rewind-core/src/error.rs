//! Engine-level errors.

use thiserror::Error;

use crate::action::ActionError;

#[derive(Debug, Error)]
pub enum HistoryError {
    /// `undo` was called with an empty undo stack. Guard with `can_undo`.
    #[error("nothing to undo")]
    NothingToUndo,

    /// `redo` was called with an empty redo stack. Guard with `can_redo`.
    #[error("nothing to redo")]
    NothingToRedo,

    /// A forward or reverse operation failed; carries its error untouched.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// The injected save handler reported failure. The dirty flag is kept.
    #[error("save handler failed")]
    Save(#[source] anyhow::Error),
}

impl HistoryError {
    /// True for calls made without checking the matching `can_*` guard.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::NothingToUndo | Self::NothingToRedo)
    }
}
