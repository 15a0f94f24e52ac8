//! Share-card rendering
//!
//! The pipeline is split the same way a browser paints a page: `card` lays the
//! article out into a list of [`paint::PaintCommand`]s, and `raster` executes
//! that list against an RGBA surface and encodes the result.

pub mod card;
pub mod layout;
pub mod paint;
pub mod raster;
pub mod text;

pub use card::{CardRenderer, CANVAS_HEIGHT, CANVAS_WIDTH};

use image::RgbaImage;
use sha2::{Digest, Sha256};

/// A finished share card.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    surface: RgbaImage,
}

impl RenderedImage {
    pub fn new(surface: RgbaImage) -> Self {
        Self { surface }
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    pub fn into_surface(self) -> RgbaImage {
        self.surface
    }

    /// Encode the card as PNG bytes.
    pub fn encode_png(&self) -> crate::Result<Vec<u8>> {
        raster::encode_png(&self.surface)
    }

    /// Hex SHA-256 of the raw RGBA pixels; stable across encoder versions.
    pub fn pixel_digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.surface.width().to_be_bytes());
        hasher.update(self.surface.height().to_be_bytes());
        hasher.update(self.surface.as_raw());
        hex::encode(hasher.finalize())
    }
}
