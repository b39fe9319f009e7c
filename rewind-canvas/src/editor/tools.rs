// Drawing tools for the canvas editor.

use crate::Canvas;
use egui::Color32;
use tracing::{debug, trace};

pub trait Tool {
    fn apply(&self, canvas: &mut Canvas, x: u32, y: u32);

    /// Label used for the undo entry this tool produces.
    fn name(&self) -> &str;
}

// Paint a size x size square centered on (x, y), clipped to the canvas.
fn stamp(canvas: &mut Canvas, x: u32, y: u32, size: u32, color: Color32) -> usize {
    let half = size as i64 / 2;
    let mut painted = 0;
    for dy in -half..=half {
        for dx in -half..=half {
            let (px, py) = (x as i64 + dx, y as i64 + dy);
            if px < 0 || py < 0 {
                continue;
            }
            if canvas.set_pixel(px as u32, py as u32, color) {
                painted += 1;
            }
        }
    }
    painted
}

#[derive(Debug, Clone)]
pub struct Brush {
    pub size: u32,
    pub color: Color32,
}

impl Brush {
    pub fn new(size: u32, color: Color32) -> Self {
        Self { size, color }
    }
}

impl Tool for Brush {
    fn apply(&self, canvas: &mut Canvas, x: u32, y: u32) {
        trace!("Applying Brush at ({}, {}) with size {}", x, y, self.size);
        let painted = stamp(canvas, x, y, self.size, self.color);
        debug!("Brush painted {} pixels", painted);
    }

    fn name(&self) -> &str {
        "Brush"
    }
}

#[derive(Debug, Clone)]
pub struct Eraser {
    pub size: u32,
    pub erase_color: Color32,
}

impl Eraser {
    pub fn new(size: u32) -> Self {
        Self::with_color(size, Color32::TRANSPARENT)
    }

    pub fn with_color(size: u32, color: Color32) -> Self {
        Self {
            size,
            erase_color: color,
        }
    }
}

impl Tool for Eraser {
    fn apply(&self, canvas: &mut Canvas, x: u32, y: u32) {
        trace!("Applying Eraser at ({}, {}) with size {}", x, y, self.size);
        let erased = stamp(canvas, x, y, self.size, self.erase_color);
        debug!("Eraser cleared {} pixels", erased);
    }

    fn name(&self) -> &str {
        "Eraser"
    }
}

#[derive(Debug, Clone)]
pub struct Fill {
    pub color: Color32,
}

impl Fill {
    pub fn new(color: Color32) -> Self {
        Self { color }
    }
}

impl Tool for Fill {
    // Iterative 4-way flood fill; an explicit stack keeps large regions off the call stack.
    fn apply(&self, canvas: &mut Canvas, x: u32, y: u32) {
        let Some(target) = canvas.get_pixel(x, y) else {
            debug!("Fill attempted at out-of-bounds position ({}, {})", x, y);
            return;
        };
        if target == self.color {
            debug!("Target color already matches fill color, skipping fill");
            return;
        }

        let mut pending = vec![(x, y)];
        let mut filled = 0usize;
        while let Some((px, py)) = pending.pop() {
            if canvas.get_pixel(px, py) != Some(target) {
                continue;
            }
            canvas.set_pixel(px, py, self.color);
            filled += 1;

            if px > 0 {
                pending.push((px - 1, py));
            }
            if py > 0 {
                pending.push((px, py - 1));
            }
            pending.push((px + 1, py));
            pending.push((px, py + 1));
        }
        debug!("Flood fill recolored {} pixels", filled);
    }

    fn name(&self) -> &str {
        "Fill"
    }
}
