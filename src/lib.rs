//! NewsFlash share toolkit
//!
//! Client-side core of the NewsFlash news reader. The centre piece is the
//! share-card renderer, which turns an article into a 1080×1920 PNG ready to
//! hand to a native share sheet or save as a download. Around it sit the
//! reader's smaller collaborators: social share links, bookmarks, push
//! notification bookkeeping and the news listing API.
//!
//! # Features
//!
//! - **http** (default): `reqwest`-backed news API, push backend and remote
//!   image loading. Without it only local assets can be loaded.
//!
//! # Example
//!
//! ```no_run
//! use newsflash::{ArticleRecord, CardRenderer, NewsflashConfig};
//!
//! # async fn run() -> newsflash::Result<()> {
//! let config = NewsflashConfig {
//!     logo: Some("assets/logo.png".to_string()),
//!     ..Default::default()
//! };
//! let renderer = CardRenderer::from_config(&config)?;
//! let article = ArticleRecord {
//!     title: "Budget 2025 announced".to_string(),
//!     category: Some("business".to_string()),
//!     ..Default::default()
//! };
//! let card = renderer.render_card(&article, false).await?;
//! std::fs::write("card.png", card.encode_png()?)?;
//! # Ok(())
//! # }
//! ```

use chrono::NaiveDate;
use std::path::PathBuf;

pub mod error;
pub use error::{Error, Result};

pub mod api;
pub mod article;
pub mod assets;
pub mod bookmarks;
pub mod links;
pub mod notifications;
pub mod platform;
pub mod rendering;
pub mod share;

pub use article::{ArticleId, ArticleRecord, ImageLocator};
pub use rendering::{CardRenderer, RenderedImage};
pub use share::{generate_filename, ShareDispatcher, ShareMethod, ShareReport};

/// Toolkit configuration
///
/// Defaults are conservative: a local API endpoint, a 30 second network
/// timeout, the bundled logo path and system fonts.
///
/// # Examples
///
/// ```
/// let cfg = newsflash::NewsflashConfig::default();
/// assert_eq!(cfg.timeout_ms, 30000);
/// assert!(cfg.user_agent.starts_with("NewsFlash"));
/// ```
#[derive(Debug, Clone)]
pub struct NewsflashConfig {
    /// Base URL of the news and push API
    pub api_url: String,
    /// User agent sent with HTTP requests and push subscriptions
    pub user_agent: String,
    /// Network timeout in milliseconds
    pub timeout_ms: u64,
    /// Logo location (path or URL); `None` always draws the text wordmark
    pub logo: Option<String>,
    /// Directory relative asset paths are resolved against
    pub asset_dir: Option<PathBuf>,
    /// TrueType/OpenType font for regular text
    pub regular_font: Option<PathBuf>,
    /// TrueType/OpenType font for bold text
    pub bold_font: Option<PathBuf>,
    /// Fonts tried, in order, for characters the regular and bold fonts lack
    pub fallback_fonts: Vec<PathBuf>,
    /// URL-safe base64 application server key for push subscriptions
    pub vapid_public_key: String,
    /// Fixed date for card footers and filenames
    pub date_override: Option<NaiveDate>,
}

impl Default for NewsflashConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            user_agent: concat!("NewsFlash/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_ms: 30000,
            logo: Some("logo/default.png".to_string()),
            asset_dir: None,
            regular_font: None,
            bold_font: None,
            fallback_fonts: Vec::new(),
            vapid_public_key: notifications::DEFAULT_VAPID_PUBLIC_KEY.to_string(),
            date_override: None,
        }
    }
}

impl NewsflashConfig {
    /// Check the settings that would otherwise fail late.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api_url)
            .map_err(|e| Error::Config(format!("invalid api_url {:?}: {}", self.api_url, e)))?;
        if self.timeout_ms == 0 {
            return Err(Error::Config("timeout_ms must be positive".into()));
        }
        notifications::decode_application_server_key(&self.vapid_public_key)?;
        Ok(())
    }
}
