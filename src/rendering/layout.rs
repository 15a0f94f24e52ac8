/// Layout primitives for the share card: rectangles, wrapped lines, truncation

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// One committed line of wrapped text and the baseline it is drawn on.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutLine {
    pub text: String,
    pub baseline_y: f32,
}

/// Result of wrapping a block of text.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedBlock {
    pub lines: Vec<LayoutLine>,
    /// Baseline of the line after the last one (last baseline + line height)
    pub next_y: f32,
}

/// Greedy word wrap.
///
/// Words are appended to the current line while the measured candidate fits in
/// `max_width`. When a candidate overflows and the current line is non-empty the
/// current line is committed at the running baseline and the word starts a new
/// line. A single word wider than `max_width` is emitted alone, unclipped.
pub fn wrap_lines<M>(text: &str, max_width: f32, start_y: f32, line_height: f32, measure: M) -> WrappedBlock
where
    M: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut y = start_y;

    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", line, word)
        };

        if measure(&candidate) > max_width && !line.is_empty() {
            lines.push(LayoutLine {
                text: std::mem::take(&mut line),
                baseline_y: y,
            });
            line.push_str(word);
            y += line_height;
        } else {
            line = candidate;
        }
    }
    lines.push(LayoutLine { text: line, baseline_y: y });

    WrappedBlock {
        lines,
        next_y: y + line_height,
    }
}

pub const ELLIPSIS: &str = "...";

/// Cut `text` to `max_chars` characters, appending [`ELLIPSIS`] when anything
/// was removed. Shorter strings are returned untouched.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}
