//! Article records as served by the news API, and image locator resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default image the upstream provider attaches to articles without artwork.
///
/// Locators that resolve to this URL are treated as "no image". This couples
/// the resolver to a single provider's asset and breaks silently if they
/// rename it.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://www.thehindu.com/theme/images/og-image.png";

/// Article identifier; the API emits both numeric and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleId::Number(n) => write!(f, "{}", n),
            ArticleId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ArticleId {
    fn from(n: i64) -> Self {
        ArticleId::Number(n)
    }
}

impl From<&str> for ArticleId {
    fn from(s: &str) -> Self {
        ArticleId::Text(s.to_string())
    }
}

/// A single article. Field names follow the news API payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub article_id: Option<ArticleId>,
    #[serde(default)]
    pub title: String,
    /// Title in the secondary (Hindi) language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titlehindi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Summary in the secondary (Hindi) language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summaryhindi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Raw image locator, either a URL or a single-quoted JSON descriptor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_loc: Option<String>,
    /// Canonical article link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ArticleRecord {
    /// Title in the requested language. Falls back to the primary title when
    /// the localized one is missing.
    pub fn display_title(&self, localized: bool) -> &str {
        if localized {
            if let Some(t) = self.titlehindi.as_deref().filter(|t| !t.trim().is_empty()) {
                return t;
            }
        }
        &self.title
    }

    /// Summary in the requested language, if any. A localized card without
    /// a localized summary shows none rather than the primary-language text.
    pub fn display_summary(&self, localized: bool) -> Option<&str> {
        let summary = if localized {
            self.summaryhindi.as_deref()
        } else {
            self.summary.as_deref()
        };
        summary.filter(|s| !s.trim().is_empty())
    }

    /// Category label, "News" when absent.
    pub fn category_label(&self) -> &str {
        self.category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or("News")
    }

    /// Resolve the article's image locator to a fetchable URL.
    pub fn image_url(&self) -> Option<String> {
        self.image_loc
            .as_deref()
            .and_then(ImageLocator::classify)
            .and_then(|loc| loc.resolve())
    }
}

/// Shape of a raw `image_loc` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLocator {
    /// A bare URL
    RawUrl(String),
    /// JSON-ish text such as `{'identifier': 'http://x/y.png'}`
    EncodedDescriptor(String),
}

#[derive(Deserialize)]
struct Descriptor {
    identifier: Option<String>,
}

impl ImageLocator {
    /// Classify a raw locator. Blank input has no locator.
    pub fn classify(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('{') {
            Some(ImageLocator::EncodedDescriptor(trimmed.to_string()))
        } else {
            Some(ImageLocator::RawUrl(trimmed.to_string()))
        }
    }

    /// Parse the locator into a URL. Descriptors use single quotes, which are
    /// normalized to double quotes before JSON parsing.
    pub fn parse(&self) -> crate::Result<Option<String>> {
        let url = match self {
            ImageLocator::RawUrl(url) => Some(url.clone()),
            ImageLocator::EncodedDescriptor(text) => {
                let normalized = text.replace('\'', "\"");
                let descriptor: Descriptor = serde_json::from_str(&normalized)
                    .map_err(|e| crate::Error::Parse(format!("image locator: {}", e)))?;
                descriptor.identifier.filter(|u| !u.trim().is_empty())
            }
        };
        Ok(url.filter(|u| u != PLACEHOLDER_IMAGE_URL))
    }

    /// Like [`ImageLocator::parse`] but parse failures count as "no image".
    pub fn resolve(&self) -> Option<String> {
        match self.parse() {
            Ok(url) => url,
            Err(e) => {
                log::warn!("ignoring unparseable image locator: {}", e);
                None
            }
        }
    }
}

/// Resolve a raw `image_loc` string to a URL, or `None` for "no image".
pub fn resolve_image_url(raw: &str) -> Option<String> {
    ImageLocator::classify(raw).and_then(|loc| loc.resolve())
}
