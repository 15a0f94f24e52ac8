//! News listing API: routes, HTTP client, category list and infinite-scroll
//! pagination bookkeeping.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

use crate::article::{ArticleId, ArticleRecord};
use crate::{Error, Result};

/// Pseudo-category for the thirty top stories
pub const TOP30: &str = "top30";
/// Pseudo-category for the headline feed
pub const TOP_NEWS: &str = "top-news";
pub const DEFAULT_PER_PAGE: u32 = 6;
/// Look-back window, in days, for category summaries
const SUMMARY_DAYS: u32 = 2;

/// Build the listing URL for `category`.
///
/// `top30` and `top-news` have dedicated endpoints; anything else is a
/// category summary. A comma-separated category asks for several at once.
pub fn news_url(base: &str, category: &str, page: u32, per_page: u32) -> Result<Url> {
    let base = base.trim_end_matches('/');
    let path = match category {
        TOP30 => "top30",
        TOP_NEWS => "top",
        _ => "v1.1/summary",
    };
    let mut url = Url::parse(&format!("{}/{}", base, path))
        .map_err(|e| Error::Config(format!("invalid api url {:?}: {}", base, e)))?;
    {
        let mut q = url.query_pairs_mut();
        match category {
            TOP30 => {}
            TOP_NEWS => {
                q.append_pair("category", category);
            }
            _ => {
                for c in category.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                    q.append_pair("categories", c);
                }
                q.append_pair("day", &SUMMARY_DAYS.to_string());
            }
        }
        q.append_pair("page", &page.to_string());
        q.append_pair("per_page", &per_page.to_string());
    }
    Ok(url)
}

/// The news service.
#[async_trait]
pub trait NewsApi: Send + Sync {
    /// One page of articles for a category (1-based `page`).
    async fn fetch_news(&self, category: &str, page: u32, per_page: u32) -> Result<Vec<ArticleRecord>>;

    /// Raw category listing as the service returns it
    async fn categories(&self) -> Result<serde_json::Value>;

    async fn similar(&self, id: &ArticleId) -> Result<Vec<ArticleRecord>>;

    /// Similar articles from the newer recommender
    async fn similar_v2(&self, id: &ArticleId) -> Result<Vec<ArticleRecord>>;
}

#[cfg(feature = "http")]
pub struct HttpNewsApi {
    client: reqwest::Client,
    base_url: String,
}

#[cfg(feature = "http")]
impl HttpNewsApi {
    pub fn new(config: &crate::NewsflashConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        let base_url = config.api_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| Error::Config(format!("invalid api url {:?}: {}", base_url, e)))?;
        Ok(Self { client, base_url })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        log::debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            log::error!("Error fetching {}: HTTP {}", url, status);
            return Err(Error::Network(format!("{} returned HTTP {}", url, status)));
        }
        Ok(resp.json::<T>().await?)
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl NewsApi for HttpNewsApi {
    async fn fetch_news(&self, category: &str, page: u32, per_page: u32) -> Result<Vec<ArticleRecord>> {
        let url = news_url(&self.base_url, category, page, per_page)?;
        self.get_json(url.as_str()).await
    }

    async fn categories(&self) -> Result<serde_json::Value> {
        self.get_json(&format!("{}/categories", self.base_url)).await
    }

    async fn similar(&self, id: &ArticleId) -> Result<Vec<ArticleRecord>> {
        self.get_json(&format!("{}/similar/{}", self.base_url, id)).await
    }

    async fn similar_v2(&self, id: &ArticleId) -> Result<Vec<ArticleRecord>> {
        self.get_json(&format!("{}/v2/similar/{}", self.base_url, id)).await
    }
}

/// A menu group of upstream sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    /// Upstream section slugs folded into this group
    pub section: Vec<String>,
    pub label: String,
    pub labelhindi: String,
    /// Category slug passed to [`NewsApi::fetch_news`]
    pub url: String,
}

impl CategoryGroup {
    fn new(section: &[&str], label: &str, labelhindi: &str, url: &str) -> Self {
        Self {
            section: section.iter().map(|s| s.to_string()).collect(),
            label: label.to_string(),
            labelhindi: labelhindi.to_string(),
            url: url.to_string(),
        }
    }

    pub fn display_label(&self, localized: bool) -> &str {
        if localized {
            &self.labelhindi
        } else {
            &self.label
        }
    }
}

/// The fixed category menu.
pub fn category_groups() -> Vec<CategoryGroup> {
    vec![
        CategoryGroup::new(
            &["national", "elections", "assembly-elections"],
            "National & Politics",
            "राष्ट्रीय और राजनीति",
            "national-and-politics",
        ),
        CategoryGroup::new(&["international"], "International", "अंतर्राष्ट्रीय", "international"),
        CategoryGroup::new(
            &["business", "economy", "markets", "industry", "budget"],
            "Business & Economy",
            "व्यवसाय और अर्थव्यवस्था",
            "business-and-economy",
        ),
        CategoryGroup::new(
            &["science", "technology", "sci-tech", "energy-and-environment"],
            "Science & Technology",
            "विज्ञान और तकनीक",
            "science-and-technology",
        ),
        CategoryGroup::new(
            &[
                "sports",
                "cricket",
                "football",
                "tennis",
                "olympics",
                "athletics",
                "hockey",
                "motorsport",
                "races-other-sports",
            ],
            "Sports",
            "खेल",
            "sports",
        ),
        CategoryGroup::new(
            &[
                "entertainment",
                "movies",
                "music",
                "theatre-dance",
                "fashion-art",
                "life-and-style",
                "travel",
                "homes-and-gardens",
                "food-dining",
            ],
            "Entertainment & Lifestyle",
            "मनोरंजन और जीवन शैली",
            "entertainment-and-lifestyle",
        ),
        CategoryGroup::new(
            &["health", "society", "history-and-culture", "agriculture"],
            "Health & Society",
            "स्वास्थ्य और समाज",
            "health-and-society",
        ),
    ]
}

/// Infinite-scroll state for one category feed.
///
/// A load is started with [`PageCursor::begin`] and closed with either
/// [`PageCursor::finish`] or [`PageCursor::fail`]. While a load is in flight,
/// or after a short page, `begin` refuses.
#[derive(Debug, Clone)]
pub struct PageCursor {
    category: String,
    per_page: u32,
    next_page: u32,
    has_more: bool,
    loading: bool,
    seen: HashSet<ArticleId>,
}

impl PageCursor {
    pub fn new(category: impl Into<String>, per_page: u32) -> Self {
        Self {
            category: category.into(),
            per_page: per_page.max(1),
            next_page: 1,
            has_more: true,
            loading: false,
            seen: HashSet::new(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Switch category and start over from page 1.
    pub fn reset(&mut self, category: impl Into<String>) {
        *self = Self::new(category, self.per_page);
    }

    /// Claim the next page, or `None` if a load is running or the feed is
    /// exhausted.
    pub fn begin(&mut self) -> Option<u32> {
        if self.loading || !self.has_more {
            return None;
        }
        self.loading = true;
        Some(self.next_page)
    }

    /// Record a loaded page. Returns the articles not seen before; a page
    /// with fewer new articles than `per_page` ends the feed.
    pub fn finish(&mut self, items: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
        let fresh: Vec<ArticleRecord> = items
            .into_iter()
            .filter(|a| match &a.article_id {
                Some(id) => self.seen.insert(id.clone()),
                None => true,
            })
            .collect();
        if fresh.len() < self.per_page as usize {
            self.has_more = false;
        }
        self.next_page += 1;
        self.loading = false;
        fresh
    }

    /// Abandon the running load; the same page is claimed next time.
    pub fn fail(&mut self) {
        self.loading = false;
    }

    /// Fetch the next page from `api`. `Ok(None)` when no load was started.
    pub async fn load_next(&mut self, api: &dyn NewsApi) -> Result<Option<Vec<ArticleRecord>>> {
        let Some(page) = self.begin() else {
            return Ok(None);
        };
        match api.fetch_news(&self.category, page, self.per_page).await {
            Ok(items) => Ok(Some(self.finish(items))),
            Err(e) => {
                log::error!("Error loading news: {}", e);
                self.fail();
                Err(e)
            }
        }
    }
}
