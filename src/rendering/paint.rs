/// Paint command set for the share card

use image::{Rgba, RgbaImage};
use std::sync::Arc;

use crate::rendering::layout::Rect;
use crate::rendering::text::Weight;

/// Opaque color from a 0xRRGGBB literal.
pub const fn rgb(hex: u32) -> Rgba<u8> {
    Rgba([(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 255])
}

/// Color from a 0xRRGGBB literal and an alpha byte.
pub const fn rgba(hex: u32, alpha: u8) -> Rgba<u8> {
    Rgba([(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, alpha])
}

/// Horizontal anchor of a text run relative to its `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// How a source image is mapped into its destination rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFit {
    /// Scale both axes to the rectangle
    Stretch,
    /// Uniform scale so the image covers the rectangle, centred and cropped
    Cover,
}

/// Soft drop shadow under a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Rgba<u8>,
    pub blur: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    Fill {
        color: Rgba<u8>,
    },
    /// Stroke centred on the rectangle's edges
    StrokeRect {
        rect: Rect,
        width: f32,
        color: Rgba<u8>,
    },
    RoundedRect {
        rect: Rect,
        radius: f32,
        color: Rgba<u8>,
    },
    HLine {
        x0: f32,
        x1: f32,
        y: f32,
        width: f32,
        color: Rgba<u8>,
    },
    Text {
        x: f32,
        baseline: f32,
        text: String,
        size: f32,
        weight: Weight,
        align: TextAlign,
        color: Rgba<u8>,
    },
    Image {
        rect: Rect,
        radius: f32,
        fit: ImageFit,
        shadow: Option<Shadow>,
        image: Arc<RgbaImage>,
    },
}

impl PaintCommand {
    /// Text content for text commands.
    pub fn text(&self) -> Option<&str> {
        match self {
            PaintCommand::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}
