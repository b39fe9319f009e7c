//! rewind-core: bounded undo/redo history for editable documents.
//!
//! Design rules:
//! - One engine per document; it owns the undo and redo stacks exclusively.
//! - The undo stack is bounded; overflow drops the oldest entry.
//! - A newly executed action always discards the redo path.
//! - Derived status is recomputed after every mutation and published to
//!   listeners only when a value actually changes.
//! - Persistence is the host's job; the engine only calls an injected handler.

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod save;
pub mod status;

pub use action::{Action, ActionError, ActionResult};
pub use config::{HistoryConfig, DEFAULT_MAX_HISTORY};
pub use engine::HistoryEngine;
pub use error::HistoryError;
pub use save::SaveHandler;
pub use status::{Command, HistoryStatus, ListenerId, StatusChange};
