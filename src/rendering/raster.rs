//! Rasterizer: executes paint commands against an RGBA surface and encodes PNG.

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, GrayImage, ImageEncoder, Luma, Rgba, RgbaImage};

use crate::rendering::layout::Rect;
use crate::rendering::paint::{ImageFit, PaintCommand, Shadow, TextAlign};
use crate::rendering::text::FontSet;
use crate::{Error, Result};

/// Source-over blend of `color`, scaled by `coverage`, onto `dst`.
pub fn blend_pixel(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let a = (color.0[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let inv = 1.0 - a;
    for c in 0..3 {
        dst.0[c] = (color.0[c] as f32 * a + dst.0[c] as f32 * inv).round() as u8;
    }
    let dst_a = dst.0[3] as f32 / 255.0;
    dst.0[3] = ((a + dst_a * inv) * 255.0).round() as u8;
}

/// Allocate a surface filled with `background`.
pub fn new_surface(width: u32, height: u32, background: Rgba<u8>) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(Error::Render(format!("invalid surface size {}x{}", width, height)));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or_else(|| Error::Render(format!("surface {}x{} is too large", width, height)))?;
    Ok(RgbaImage::from_pixel(width, height, background))
}

/// Execute `commands` in order on a fresh `width`×`height` surface.
pub fn rasterize(width: u32, height: u32, commands: &[PaintCommand], fonts: &FontSet) -> Result<RgbaImage> {
    let mut surface = new_surface(width, height, Rgba([0, 0, 0, 0]))?;
    for cmd in commands {
        paint(&mut surface, cmd, fonts);
    }
    Ok(surface)
}

/// Execute a single paint command.
pub fn paint(surface: &mut RgbaImage, cmd: &PaintCommand, fonts: &FontSet) {
    match cmd {
        PaintCommand::Fill { color } => {
            for px in surface.pixels_mut() {
                *px = *color;
            }
        }
        PaintCommand::StrokeRect { rect, width, color } => stroke_rect(surface, *rect, *width, *color),
        PaintCommand::RoundedRect { rect, radius, color } => fill_rounded_rect(surface, *rect, *radius, *color),
        PaintCommand::HLine { x0, x1, y, width, color } => {
            let rect = Rect::new(*x0, y - width / 2.0, x1 - x0, *width);
            fill_rect(surface, rect, *color);
        }
        PaintCommand::Text {
            x,
            baseline,
            text,
            size,
            weight,
            align,
            color,
        } => {
            let face = fonts.face(*weight);
            let left = match align {
                TextAlign::Left => *x,
                TextAlign::Center => x - face.measure(text, *size) / 2.0,
                TextAlign::Right => x - face.measure(text, *size),
            };
            face.draw(surface, text, left, *baseline, *size, *color);
        }
        PaintCommand::Image {
            rect,
            radius,
            fit,
            shadow,
            image,
        } => {
            if let Some(shadow) = shadow {
                draw_shadow(surface, *rect, *radius, *shadow);
            }
            draw_image(surface, image, *rect, *radius, *fit);
        }
    }
}

/// Fill the pixels whose centres fall inside `rect`.
pub fn fill_rect(surface: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    let Some((x0, y0, x1, y1)) = pixel_span(surface, rect) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            blend_pixel(surface.get_pixel_mut(x, y), color, 1.0);
        }
    }
}

fn stroke_rect(surface: &mut RgbaImage, rect: Rect, width: f32, color: Rgba<u8>) {
    let half = width / 2.0;
    let outer = Rect::new(rect.x - half, rect.y - half, rect.width + width, rect.height + width);
    fill_rect(surface, Rect::new(outer.x, outer.y, outer.width, width), color);
    fill_rect(surface, Rect::new(outer.x, rect.bottom() - half, outer.width, width), color);
    fill_rect(surface, Rect::new(outer.x, rect.y + half, width, rect.height - width), color);
    fill_rect(surface, Rect::new(rect.right() - half, rect.y + half, width, rect.height - width), color);
}

/// Anti-aliased coverage of the pixel centred at (`px`, `py`) by a rounded
/// rectangle.
pub fn rounded_coverage(px: f32, py: f32, rect: Rect, radius: f32) -> f32 {
    let radius = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
    let cx = rect.x + rect.width / 2.0;
    let cy = rect.y + rect.height / 2.0;
    let qx = (px - cx).abs() - (rect.width / 2.0 - radius);
    let qy = (py - cy).abs() - (rect.height / 2.0 - radius);
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    let inside = qx.max(qy).min(0.0);
    let distance = outside + inside - radius;
    (0.5 - distance).clamp(0.0, 1.0)
}

pub fn fill_rounded_rect(surface: &mut RgbaImage, rect: Rect, radius: f32, color: Rgba<u8>) {
    let Some((x0, y0, x1, y1)) = pixel_span(surface, grow(rect, 1.0)) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            let coverage = rounded_coverage(x as f32 + 0.5, y as f32 + 0.5, rect, radius);
            if coverage > 0.0 {
                blend_pixel(surface.get_pixel_mut(x, y), color, coverage);
            }
        }
    }
}

/// Draw a blurred copy of the rounded rectangle offset by the shadow offset.
pub fn draw_shadow(surface: &mut RgbaImage, rect: Rect, radius: f32, shadow: Shadow) {
    let sigma = (shadow.blur / 2.0).max(0.0);
    let pad = (sigma * 3.0).ceil();
    let mask_w = (rect.width + pad * 2.0).ceil() as u32;
    let mask_h = (rect.height + pad * 2.0).ceil() as u32;
    if mask_w == 0 || mask_h == 0 {
        return;
    }

    let local = Rect::new(pad, pad, rect.width, rect.height);
    let mut mask = GrayImage::new(mask_w, mask_h);
    for (x, y, px) in mask.enumerate_pixels_mut() {
        let coverage = rounded_coverage(x as f32 + 0.5, y as f32 + 0.5, local, radius);
        *px = Luma([(coverage * 255.0).round() as u8]);
    }
    if sigma > 0.0 {
        mask = imageops::blur(&mask, sigma);
    }

    let origin_x = (rect.x - pad + shadow.offset_x).round() as i64;
    let origin_y = (rect.y - pad + shadow.offset_y).round() as i64;
    for (x, y, m) in mask.enumerate_pixels() {
        let sx = origin_x + x as i64;
        let sy = origin_y + y as i64;
        if sx < 0 || sy < 0 || sx >= surface.width() as i64 || sy >= surface.height() as i64 {
            continue;
        }
        if m.0[0] > 0 {
            blend_pixel(surface.get_pixel_mut(sx as u32, sy as u32), shadow.color, m.0[0] as f32 / 255.0);
        }
    }
}

/// Composite `src` into `rect`, clipped to a rounded rectangle of `radius`.
pub fn draw_image(surface: &mut RgbaImage, src: &RgbaImage, rect: Rect, radius: f32, fit: ImageFit) {
    let dst_w = rect.width.round() as u32;
    let dst_h = rect.height.round() as u32;
    if dst_w == 0 || dst_h == 0 || src.width() == 0 || src.height() == 0 {
        return;
    }

    let fitted = match fit {
        ImageFit::Stretch => imageops::resize(src, dst_w, dst_h, FilterType::Triangle),
        ImageFit::Cover => cover_fit(src, dst_w, dst_h),
    };

    let ox = rect.x.round() as i64;
    let oy = rect.y.round() as i64;
    let local = Rect::new(0.0, 0.0, dst_w as f32, dst_h as f32);
    for (x, y, p) in fitted.enumerate_pixels() {
        let sx = ox + x as i64;
        let sy = oy + y as i64;
        if sx < 0 || sy < 0 || sx >= surface.width() as i64 || sy >= surface.height() as i64 {
            continue;
        }
        let coverage = if radius > 0.0 {
            rounded_coverage(x as f32 + 0.5, y as f32 + 0.5, local, radius)
        } else {
            1.0
        };
        if coverage > 0.0 {
            blend_pixel(surface.get_pixel_mut(sx as u32, sy as u32), *p, coverage);
        }
    }
}

/// Scale factor that makes an `src_w`×`src_h` image cover `dst_w`×`dst_h`.
pub fn cover_scale(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> f32 {
    (dst_w as f32 / src_w as f32).max(dst_h as f32 / src_h as f32)
}

/// Uniformly scale `src` to cover `dst_w`×`dst_h` and crop the centre.
///
/// The centred source region is cropped first and only that region is
/// resized, so the intermediate buffer never exceeds the destination size.
pub fn cover_fit(src: &RgbaImage, dst_w: u32, dst_h: u32) -> RgbaImage {
    let (crop_w, crop_h) = cover_crop(src.width(), src.height(), dst_w, dst_h);
    let left = (src.width() - crop_w) / 2;
    let top = (src.height() - crop_h) / 2;
    let cropped = imageops::crop_imm(src, left, top, crop_w, crop_h).to_image();
    imageops::resize(&cropped, dst_w, dst_h, FilterType::Triangle)
}

/// Size of the centred source region that scales onto `dst_w`×`dst_h`,
/// at least one pixel and never larger than the source.
pub fn cover_crop(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> (u32, u32) {
    let scale = cover_scale(src_w, src_h, dst_w, dst_h);
    let crop_w = ((dst_w as f32 / scale).round() as u32).clamp(1, src_w);
    let crop_h = ((dst_h as f32 / scale).round() as u32).clamp(1, src_h);
    (crop_w, crop_h)
}

/// Encode an RGBA surface as PNG.
pub fn encode_png(surface: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buf, CompressionType::Default, PngFilter::Adaptive);
    encoder
        .write_image(surface.as_raw(), surface.width(), surface.height(), ExtendedColorType::Rgba8)
        .map_err(|e| Error::Encode(e.to_string()))?;
    Ok(buf)
}

fn grow(rect: Rect, by: f32) -> Rect {
    Rect::new(rect.x - by, rect.y - by, rect.width + by * 2.0, rect.height + by * 2.0)
}

/// Pixel index range [x0, x1) × [y0, y1) of the pixels whose centres lie in
/// `rect`, clamped to the surface.
fn pixel_span(surface: &RgbaImage, rect: Rect) -> Option<(u32, u32, u32, u32)> {
    let x0 = (rect.x - 0.5).ceil().max(0.0);
    let y0 = (rect.y - 0.5).ceil().max(0.0);
    let x1 = (rect.right() - 0.5).ceil().min(surface.width() as f32);
    let y1 = (rect.bottom() - 0.5).ceil().min(surface.height() as f32);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
}
