// Pixel canvas edited through the history engine.
// Pixels are egui colors; snapshots store them as raw RGBA bytes for saving.

use egui::Color32;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color32>,
}

/// Serializable form of a canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSnapshot {
    pub width: u32,
    pub height: u32,
    /// Premultiplied RGBA, row-major.
    pub pixels: Vec<[u8; 4]>,
}

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("snapshot has {found} pixels, expected {expected} for {width}x{height}")]
    PixelCountMismatch {
        width: u32,
        height: u32,
        expected: usize,
        found: usize,
    },
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Color32) -> Self {
        info!(
            "Creating new canvas of size {}x{} with background color {:?}",
            width, height, background
        );

        let total_pixels = width as usize * height as usize;
        debug!("Total pixels to initialize: {}", total_pixels);

        Self {
            width,
            height,
            pixels: vec![background; total_pixels],
        }
    }

    // Check if coordinates are within canvas bounds
    fn is_valid_coordinate(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    // Convert 2d coordinates to 1d index
    fn coord_to_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color32> {
        if !self.is_valid_coordinate(x, y) {
            trace!("Requested pixel color at invalid coordinates ({}, {})", x, y);
            return None;
        }
        Some(self.pixels[self.coord_to_index(x, y)])
    }

    /// Returns `false` when the coordinates fall outside the canvas.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color32) -> bool {
        if !self.is_valid_coordinate(x, y) {
            trace!(
                "Attempted to set pixel color at invalid coordinates ({}, {})",
                x,
                y
            );
            return false;
        }

        let index = self.coord_to_index(x, y);
        self.pixels[index] = color;
        true
    }

    pub fn fill(&mut self, color: Color32) {
        debug!("Filling canvas {:?}", color);
        self.pixels.iter_mut().for_each(|pixel| *pixel = color);
    }

    pub fn clear(&mut self) {
        self.fill(Color32::WHITE);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn snapshot(&self) -> CanvasSnapshot {
        CanvasSnapshot {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|pixel| pixel.to_array()).collect(),
        }
    }

    pub fn from_snapshot(snapshot: CanvasSnapshot) -> Result<Self, CanvasError> {
        let expected = snapshot.width as usize * snapshot.height as usize;
        if snapshot.pixels.len() != expected {
            warn!(
                expected,
                found = snapshot.pixels.len(),
                "rejecting malformed canvas snapshot"
            );
            return Err(CanvasError::PixelCountMismatch {
                width: snapshot.width,
                height: snapshot.height,
                expected,
                found: snapshot.pixels.len(),
            });
        }

        Ok(Self {
            width: snapshot.width,
            height: snapshot.height,
            pixels: snapshot
                .pixels
                .into_iter()
                .map(|[r, g, b, a]| Color32::from_rgba_premultiplied(r, g, b, a))
                .collect(),
        })
    }
}

// Create a default canvas
impl Default for Canvas {
    fn default() -> Self {
        Canvas::new(512, 512, Color32::WHITE)
    }
}
