//! Bookmarked articles kept as a JSON array in a key-value store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::article::{ArticleId, ArticleRecord};
use crate::platform::KeyValueStore;
use crate::{Error, Result};

/// Store key holding the bookmark list
pub const BOOKMARKS_KEY: &str = "newsflash_bookmarks";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkedArticle {
    #[serde(flatten)]
    pub article: ArticleRecord,
    pub bookmarked_at: DateTime<Utc>,
}

/// Bookmark book over an injected store.
///
/// Unreadable or corrupt stored data reads as an empty list; write failures
/// are returned to the caller.
pub struct Bookmarks<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Bookmarks<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All bookmarks, oldest first.
    pub fn list(&self) -> Vec<BookmarkedArticle> {
        let raw = match self.store.get(BOOKMARKS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::error!("Error reading bookmarks: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(e) => {
                log::error!("Error parsing bookmarks: {}", e);
                Vec::new()
            }
        }
    }

    pub fn ids(&self) -> Vec<ArticleId> {
        self.list()
            .into_iter()
            .filter_map(|b| b.article.article_id)
            .collect()
    }

    pub fn is_bookmarked(&self, id: &ArticleId) -> bool {
        self.list()
            .iter()
            .any(|b| b.article.article_id.as_ref() == Some(id))
    }

    /// Add the article, or remove it if already bookmarked. Returns whether
    /// the article is bookmarked afterwards.
    pub fn toggle(&self, article: &ArticleRecord) -> Result<bool> {
        let id = article
            .article_id
            .as_ref()
            .ok_or_else(|| Error::Storage("cannot bookmark an article without an id".into()))?;
        let mut list = self.list();
        let before = list.len();
        list.retain(|b| b.article.article_id.as_ref() != Some(id));
        let added = list.len() == before;
        if added {
            list.push(BookmarkedArticle {
                article: article.clone(),
                bookmarked_at: Utc::now(),
            });
        }
        self.write(&list)?;
        log::debug!("bookmark {} {}", id, if added { "added" } else { "removed" });
        Ok(added)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(BOOKMARKS_KEY)
    }

    pub fn count(&self) -> usize {
        self.list().len()
    }

    fn write(&self, list: &[BookmarkedArticle]) -> Result<()> {
        let raw = serde_json::to_string(list)?;
        self.store.set(BOOKMARKS_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    fn article(id: i64) -> ArticleRecord {
        ArticleRecord {
            article_id: Some(ArticleId::Number(id)),
            title: format!("Story {}", id),
            ..Default::default()
        }
    }

    #[test]
    fn toggle_adds_then_removes() {
        let book = Bookmarks::new(MemoryStore::new());
        assert!(book.toggle(&article(1)).unwrap());
        assert!(book.toggle(&article(2)).unwrap());
        assert!(book.is_bookmarked(&ArticleId::Number(1)));
        assert_eq!(book.ids(), vec![ArticleId::Number(1), ArticleId::Number(2)]);

        assert!(!book.toggle(&article(1)).unwrap());
        assert!(!book.is_bookmarked(&ArticleId::Number(1)));
        assert_eq!(book.count(), 1);

        book.clear().unwrap();
        assert_eq!(book.count(), 0);
    }

    #[test]
    fn corrupt_data_reads_as_empty() {
        let store = MemoryStore::new();
        store.set(BOOKMARKS_KEY, "not json").unwrap();
        let book = Bookmarks::new(store);
        assert!(book.list().is_empty());
        assert!(book.toggle(&article(7)).unwrap());
        assert_eq!(book.count(), 1);
    }

    #[test]
    fn stored_shape_is_flat() {
        let book = Bookmarks::new(MemoryStore::new());
        book.toggle(&article(3)).unwrap();
        let raw = book.store().get(BOOKMARKS_KEY).unwrap().unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v[0]["article_id"], 3);
        assert_eq!(v[0]["title"], "Story 3");
        assert!(v[0]["bookmarked_at"].is_string());
    }

    #[test]
    fn article_without_id_is_rejected() {
        let book = Bookmarks::new(MemoryStore::new());
        assert!(book.toggle(&ArticleRecord::default()).is_err());
    }
}
