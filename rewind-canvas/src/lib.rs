//! rewind-canvas: a pixel-canvas editor hosting the history engine.
//!
//! Every edit made through [`CanvasEditor`] becomes an undoable action.
//! Menu state lives in a [`CommandBar`] that is driven only by the engine's
//! change notifications.

pub mod editor;
pub mod logging;

pub use editor::{
    Brush, Canvas, CanvasEditor, CanvasError, CanvasSnapshot, CommandBar, Eraser, Fill,
    PixelChange, PixelDelta, Tool,
};
