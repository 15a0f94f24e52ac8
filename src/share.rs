//! Share dispatch: hand a rendered card to the native share sheet when the
//! platform can share files, otherwise save it as a download.

use chrono::{NaiveDate, Utc};
use std::path::PathBuf;
use std::sync::Arc;

use crate::article::ArticleRecord;
use crate::platform::{FileSaver, ShareOutcome, SharePayload, ShareSheet, SharedFile};
use crate::rendering::{CardRenderer, RenderedImage};
use crate::{Error, Result};

/// Name of the file attached to native shares
pub const SHARE_FILE_NAME: &str = "newsflash-story.png";
pub const DEFAULT_SHARE_TITLE: &str = "NewsFlash Story";
pub const SHARE_CAPTION: &str = "Check out this story from NewsFlash!";

const SLUG_MAX_CHARS: usize = 50;

/// Devanagari block, kept in slugs so localized titles stay readable
fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// Filename-safe slug of a title: ASCII alphanumerics and Devanagari are kept,
/// everything else becomes a single `-`; at most 50 characters, lowercased.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() || is_devanagari(c) {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug: String = slug.trim_matches('-').chars().take(SLUG_MAX_CHARS).collect();
    slug.trim_end_matches('-').to_lowercase()
}

/// `newsflash-<slug>-<YYYY-MM-DD>.png`; a blank title slugs to "story".
pub fn generate_filename(title: Option<&str>, date: NaiveDate) -> String {
    let slug = slugify(title.unwrap_or_default());
    let slug = if slug.is_empty() { "story".to_string() } else { slug };
    format!("newsflash-{}-{}.png", slug, date.format("%Y-%m-%d"))
}

/// Channel a card left through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareMethod {
    Share,
    Download,
}

impl ShareMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareMethod::Share => "share",
            ShareMethod::Download => "download",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShareReport {
    pub method: ShareMethod,
    pub outcome: ShareOutcome,
    /// Where a download was written
    pub path: Option<PathBuf>,
}

/// Picks the output channel for rendered cards.
pub struct ShareDispatcher {
    sheet: Arc<dyn ShareSheet>,
    saver: Arc<dyn FileSaver>,
    date: Option<NaiveDate>,
}

impl ShareDispatcher {
    pub fn new(sheet: Arc<dyn ShareSheet>, saver: Arc<dyn FileSaver>) -> Self {
        Self { sheet, saver, date: None }
    }

    /// Pin the date used in download filenames.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// The channel [`ShareDispatcher::dispatch`] will use on this platform.
    pub fn method(&self) -> ShareMethod {
        if self.sheet.can_share_files() {
            ShareMethod::Share
        } else {
            ShareMethod::Download
        }
    }

    /// Share through the native sheet. Fails with [`Error::ShareUnsupported`]
    /// when the platform cannot share files.
    pub async fn share_natively(&self, image: &RenderedImage, title: Option<&str>) -> Result<ShareOutcome> {
        if !self.sheet.can_share_files() {
            return Err(Error::ShareUnsupported);
        }
        let payload = SharePayload {
            files: vec![SharedFile {
                name: SHARE_FILE_NAME.to_string(),
                mime_type: "image/png".to_string(),
                bytes: image.encode_png()?,
            }],
            title: title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(DEFAULT_SHARE_TITLE)
                .to_string(),
            text: SHARE_CAPTION.to_string(),
        };
        let outcome = self.sheet.share(payload).await?;
        if outcome == ShareOutcome::Cancelled {
            log::info!("share cancelled by user");
        }
        Ok(outcome)
    }

    /// Save the card under a filename derived from `title`.
    pub async fn download(&self, image: &RenderedImage, title: Option<&str>) -> Result<PathBuf> {
        let date = self.date.unwrap_or_else(|| Utc::now().date_naive());
        let filename = generate_filename(title, date);
        let bytes = image.encode_png()?;
        let path = self.saver.save(&filename, &bytes).await?;
        log::info!("saved share card to {}", path.display());
        Ok(path)
    }

    /// Share natively when possible, otherwise download.
    pub async fn dispatch(&self, image: &RenderedImage, title: Option<&str>) -> Result<ShareReport> {
        match self.method() {
            ShareMethod::Share => {
                let outcome = self.share_natively(image, title).await?;
                Ok(ShareReport {
                    method: ShareMethod::Share,
                    outcome,
                    path: None,
                })
            }
            ShareMethod::Download => {
                let path = self.download(image, title).await?;
                Ok(ShareReport {
                    method: ShareMethod::Download,
                    outcome: ShareOutcome::Completed,
                    path: Some(path),
                })
            }
        }
    }

    /// Render `article` and dispatch the card in one step. The rendered card
    /// is returned alongside the report so callers can preview it.
    pub async fn handle_share_as_image(
        &self,
        renderer: &CardRenderer,
        article: &ArticleRecord,
        localized: bool,
    ) -> Result<(ShareReport, RenderedImage)> {
        let image = renderer.render_card(article, localized).await?;
        let title = article.display_title(localized);
        let report = self.dispatch(&image, Some(title)).await?;
        Ok((report, image))
    }
}
