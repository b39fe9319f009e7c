// Per-pixel differences between two canvas states. One delta backs one undo entry.

use crate::Canvas;
use egui::Color32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelChange {
    pub index: usize,
    pub before: Color32,
    pub after: Color32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelDelta {
    changes: Vec<PixelChange>,
}

impl PixelDelta {
    /// Pixels that differ between two canvases of the same size.
    pub fn between(before: &Canvas, after: &Canvas) -> Self {
        debug_assert_eq!(before.pixels.len(), after.pixels.len());
        let changes = before
            .pixels
            .iter()
            .zip(after.pixels.iter())
            .enumerate()
            .filter(|(_, (old, new))| old != new)
            .map(|(index, (old, new))| PixelChange {
                index,
                before: *old,
                after: *new,
            })
            .collect();
        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &[PixelChange] {
        &self.changes
    }

    pub fn apply(&self, canvas: &mut Canvas) {
        for change in &self.changes {
            if let Some(pixel) = canvas.pixels.get_mut(change.index) {
                *pixel = change.after;
            }
        }
    }

    pub fn revert(&self, canvas: &mut Canvas) {
        for change in &self.changes {
            if let Some(pixel) = canvas.pixels.get_mut(change.index) {
                *pixel = change.before;
            }
        }
    }
}
