// Editor module for the canvas host.

pub mod canvas;
pub mod commands;
pub mod delta;
pub mod history;
pub mod tools;

pub use canvas::{Canvas, CanvasError, CanvasSnapshot};
pub use commands::CommandBar;
pub use delta::{PixelChange, PixelDelta};
pub use history::CanvasEditor;
pub use tools::{Brush, Eraser, Fill, Tool};
