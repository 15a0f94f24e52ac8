//! Font faces used to measure and draw card text.
//!
//! [`OutlineFace`] rasterizes real TrueType/OpenType outlines through
//! `rusttype`. [`BlockFace`] is a fixed-advance stand-in that needs no font
//! file: every character advances by a constant fraction of the font size and
//! visible characters are drawn as solid blocks. It keeps rendering available
//! on hosts without fonts and makes measurements exact in tests.
//! [`FaceChain`] strings faces together so that scripts the primary font
//! lacks (Devanagari, emoji) are drawn from a fallback font.

use image::{Rgba, RgbaImage};
use rusttype::{point, Font, Scale};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::rendering::raster::blend_pixel;
use crate::{Error, Result};

/// Font weight requested by a paint command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weight {
    Regular,
    Bold,
}

/// Something that can measure and draw a run of text at a pixel size.
pub trait FontFace: Send + Sync {
    /// Advance width of `text` at `size` pixels.
    fn measure(&self, text: &str, size: f32) -> f32;

    /// Draw `text` with its left edge at `x` and its alphabetic baseline at
    /// `baseline`.
    fn draw(&self, surface: &mut RgbaImage, text: &str, x: f32, baseline: f32, size: f32, color: Rgba<u8>);

    /// Whether the face has a real glyph for `c`.
    fn has_glyph(&self, _c: char) -> bool {
        true
    }
}

/// A face backed by font outlines.
pub struct OutlineFace {
    font: Font<'static>,
}

impl OutlineFace {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let font = Font::try_from_vec(bytes).ok_or_else(|| Error::Parse("invalid font data".into()))?;
        Ok(Self { font })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }
}

impl FontFace for OutlineFace {
    fn measure(&self, text: &str, size: f32) -> f32 {
        let scale = Scale::uniform(size);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    fn draw(&self, surface: &mut RgbaImage, text: &str, x: f32, baseline: f32, size: f32, color: Rgba<u8>) {
        let scale = Scale::uniform(size);
        let (w, h) = (surface.width() as i32, surface.height() as i32);
        for glyph in self.font.layout(text, scale, point(x, baseline)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px >= w || py >= h {
                    return;
                }
                blend_pixel(surface.get_pixel_mut(px as u32, py as u32), color, coverage);
            });
        }
    }

    fn has_glyph(&self, c: char) -> bool {
        // glyph 0 is .notdef
        self.font.glyph(c).id().0 != 0
    }
}

/// Fixed-advance face that draws characters as blocks.
#[derive(Debug, Clone, Copy)]
pub struct BlockFace {
    /// Advance per character as a fraction of the font size
    pub advance: f32,
}

impl BlockFace {
    pub const REGULAR: BlockFace = BlockFace { advance: 0.55 };
    pub const BOLD: BlockFace = BlockFace { advance: 0.6 };
}

impl FontFace for BlockFace {
    fn measure(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * self.advance * size
    }

    fn draw(&self, surface: &mut RgbaImage, text: &str, x: f32, baseline: f32, size: f32, color: Rgba<u8>) {
        let step = self.advance * size;
        let glyph_w = (step * 0.8).max(1.0);
        let top = baseline - size * 0.7;
        let (w, h) = (surface.width() as f32, surface.height() as f32);
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = x + i as f32 * step;
            let x0 = left.max(0.0).round() as u32;
            let x1 = (left + glyph_w).min(w).round() as u32;
            let y0 = top.max(0.0).round() as u32;
            let y1 = baseline.min(h).round() as u32;
            for py in y0..y1 {
                for px in x0..x1 {
                    blend_pixel(surface.get_pixel_mut(px, py), color, 1.0);
                }
            }
        }
    }
}

/// Ordered list of faces. Each character is drawn with the first face that
/// has a glyph for it, or with the primary face when none does. Whitespace
/// stays with the face of the run it sits in.
pub struct FaceChain {
    faces: Vec<Arc<dyn FontFace>>,
}

impl FaceChain {
    /// `None` when `faces` is empty.
    pub fn new(faces: Vec<Arc<dyn FontFace>>) -> Option<Self> {
        if faces.is_empty() {
            None
        } else {
            Some(Self { faces })
        }
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Index of the face that draws `c`.
    pub fn face_for(&self, c: char) -> usize {
        self.faces.iter().position(|f| f.has_glyph(c)).unwrap_or(0)
    }

    /// Split `text` into maximal runs drawn by the same face.
    pub fn runs<'a>(&self, text: &'a str) -> Vec<(usize, &'a str)> {
        let mut runs: Vec<(usize, &'a str)> = Vec::new();
        let mut start = 0;
        let mut current: Option<usize> = None;
        for (i, c) in text.char_indices() {
            let face = match current {
                Some(face) if c.is_whitespace() => face,
                _ => self.face_for(c),
            };
            match current {
                Some(prev) if prev != face => {
                    runs.push((prev, &text[start..i]));
                    start = i;
                }
                _ => {}
            }
            current = Some(face);
        }
        if let Some(face) = current {
            runs.push((face, &text[start..]));
        }
        runs
    }
}

impl FontFace for FaceChain {
    fn measure(&self, text: &str, size: f32) -> f32 {
        self.runs(text)
            .into_iter()
            .map(|(face, run)| self.faces[face].measure(run, size))
            .sum()
    }

    fn draw(&self, surface: &mut RgbaImage, text: &str, x: f32, baseline: f32, size: f32, color: Rgba<u8>) {
        let mut pen = x;
        for (face, run) in self.runs(text) {
            let face = &self.faces[face];
            face.draw(surface, run, pen, baseline, size, color);
            pen += face.measure(run, size);
        }
    }

    fn has_glyph(&self, c: char) -> bool {
        self.faces.iter().any(|f| f.has_glyph(c))
    }
}

const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

const DEVANAGARI_REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/noto/NotoSansDevanagari-Regular.ttf",
    "/usr/share/fonts/noto/NotoSansDevanagari-Regular.ttf",
    "/usr/share/fonts/google-noto/NotoSansDevanagari-Regular.ttf",
    "/usr/share/fonts/truetype/lohit-devanagari/Lohit-Devanagari.ttf",
    "/usr/share/fonts/lohit-devanagari/Lohit-Devanagari.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/System/Library/Fonts/Supplemental/DevanagariMT.ttc",
    "C:\\Windows\\Fonts\\Nirmala.ttf",
];

const DEVANAGARI_BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/noto/NotoSansDevanagari-Bold.ttf",
    "/usr/share/fonts/noto/NotoSansDevanagari-Bold.ttf",
    "/usr/share/fonts/google-noto/NotoSansDevanagari-Bold.ttf",
    "/usr/share/fonts/truetype/lohit-devanagari/Lohit-Devanagari.ttf",
    "/usr/share/fonts/lohit-devanagari/Lohit-Devanagari.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    "/System/Library/Fonts/Supplemental/DevanagariMT.ttc",
    "C:\\Windows\\Fonts\\NirmalaB.ttf",
];

// Monochrome outlines only; bitmap color emoji fonts have nothing to draw.
const SYMBOL_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/noto/NotoEmoji-Regular.ttf",
    "/usr/share/fonts/noto/NotoEmoji-Regular.ttf",
    "/usr/share/fonts/truetype/ancient-scripts/Symbola_hint.ttf",
    "/usr/share/fonts/TTF/Symbola.ttf",
    "C:\\Windows\\Fonts\\seguisym.ttf",
];

/// The regular and bold faces used by the card renderer.
#[derive(Clone)]
pub struct FontSet {
    regular: Arc<dyn FontFace>,
    bold: Arc<dyn FontFace>,
}

impl FontSet {
    pub fn new(regular: Arc<dyn FontFace>, bold: Arc<dyn FontFace>) -> Self {
        Self { regular, bold }
    }

    /// Block faces only; deterministic on every host.
    pub fn block() -> Self {
        Self::new(Arc::new(BlockFace::REGULAR), Arc::new(BlockFace::BOLD))
    }

    /// Load faces from explicit paths, falling back to well-known system
    /// fonts and finally to block faces. `fallbacks` are tried, in order,
    /// for characters the primary face lacks, ahead of the system
    /// Devanagari and symbol fonts.
    pub fn load(regular: Option<&Path>, bold: Option<&Path>, fallbacks: &[PathBuf]) -> Self {
        let regular_face = load_chain(regular, REGULAR_CANDIDATES, fallbacks, DEVANAGARI_REGULAR_CANDIDATES);
        let bold_face = load_chain(bold, BOLD_CANDIDATES, fallbacks, DEVANAGARI_BOLD_CANDIDATES);

        match (regular_face, bold_face) {
            (Some(r), Some(b)) => Self::new(r, b),
            (Some(r), None) => Self::new(r.clone(), r),
            (None, Some(b)) => Self::new(b.clone(), b),
            (None, None) => {
                log::warn!("no usable font found; drawing text with block glyphs");
                Self::block()
            }
        }
    }

    pub fn face(&self, weight: Weight) -> &dyn FontFace {
        match weight {
            Weight::Regular => self.regular.as_ref(),
            Weight::Bold => self.bold.as_ref(),
        }
    }

    pub fn measure(&self, weight: Weight, text: &str, size: f32) -> f32 {
        self.face(weight).measure(text, size)
    }
}

impl Default for FontSet {
    fn default() -> Self {
        Self::block()
    }
}

fn load_chain(
    explicit: Option<&Path>,
    primary: &[&str],
    fallbacks: &[PathBuf],
    script: &[&str],
) -> Option<Arc<dyn FontFace>> {
    let mut faces: Vec<Arc<dyn FontFace>> = Vec::new();
    faces.extend(load_face(explicit, primary));
    for path in fallbacks {
        match OutlineFace::from_path(path) {
            Ok(face) => faces.push(Arc::new(face)),
            Err(e) => log::warn!("failed to load fallback font {}: {}", path.display(), e),
        }
    }
    faces.extend(load_face(None, script));
    faces.extend(load_face(None, SYMBOL_CANDIDATES));

    match faces.len() {
        0 => None,
        1 => faces.pop(),
        _ => FaceChain::new(faces).map(|chain| Arc::new(chain) as Arc<dyn FontFace>),
    }
}

fn load_face(explicit: Option<&Path>, candidates: &[&str]) -> Option<Arc<dyn FontFace>> {
    if let Some(path) = explicit {
        match OutlineFace::from_path(path) {
            Ok(face) => return Some(Arc::new(face)),
            Err(e) => log::warn!("failed to load font {}: {}", path.display(), e),
        }
    }
    candidates
        .iter()
        .map(PathBuf::from)
        .filter(|p| p.is_file())
        .find_map(|p| match OutlineFace::from_path(&p) {
            Ok(face) => {
                log::debug!("using system font {}", p.display());
                Some(Arc::new(face) as Arc<dyn FontFace>)
            }
            Err(e) => {
                log::debug!("skipping font {}: {}", p.display(), e);
                None
            }
        })
}
