//! Asset loading for the card renderer (logo and article images).
//!
//! Locations are either `http(s)://` URLs, fetched with `reqwest`, or
//! filesystem paths (optionally `file://`-prefixed) resolved against the
//! configured asset directory.

use async_trait::async_trait;
use image::RgbaImage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::{Error, NewsflashConfig, Result};

/// Fetches raw asset bytes by location.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>>;
}

/// Fetch and decode an image into RGBA pixels.
pub async fn load_image(loader: &dyn AssetLoader, location: &str) -> Result<RgbaImage> {
    let bytes = loader.fetch(location).await?;
    decode_image(location, &bytes)
}

/// Decode encoded image bytes (PNG, JPEG, GIF or WebP).
pub fn decode_image(location: &str, bytes: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(bytes).map_err(|e| Error::asset(location, e))?;
    if img.width() == 0 || img.height() == 0 {
        return Err(Error::asset(location, "image has no pixels"));
    }
    Ok(img.to_rgba8())
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Loader for remote URLs and local files.
pub struct DefaultAssetLoader {
    #[cfg(feature = "http")]
    client: reqwest::Client,
    base_dir: Option<PathBuf>,
}

impl DefaultAssetLoader {
    pub fn new(config: &NewsflashConfig) -> Result<Self> {
        #[cfg(feature = "http")]
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            #[cfg(feature = "http")]
            client,
            base_dir: config.asset_dir.clone(),
        })
    }

    fn resolve_path(&self, location: &str) -> PathBuf {
        let path = PathBuf::from(location.strip_prefix("file://").unwrap_or(location));
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }

    #[cfg(feature = "http")]
    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::asset(url, e))?
            .error_for_status()
            .map_err(|e| Error::asset(url, e))?;
        let bytes = resp.bytes().await.map_err(|e| Error::asset(url, e))?;
        Ok(bytes.to_vec())
    }

    #[cfg(not(feature = "http"))]
    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>> {
        Err(Error::asset(url, "remote assets require the `http` feature"))
    }
}

#[async_trait]
impl AssetLoader for DefaultAssetLoader {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        if is_remote(location) {
            log::debug!("fetching remote asset {}", location);
            return self.fetch_remote(location).await;
        }
        let path = self.resolve_path(location);
        log::debug!("reading asset {}", path.display());
        tokio::fs::read(&path).await.map_err(|e| Error::asset(location, e))
    }
}

/// Loader serving assets from memory; unknown locations fail to load.
#[derive(Default)]
pub struct MemoryAssetLoader {
    assets: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, location: impl Into<String>, bytes: Vec<u8>) {
        if let Ok(mut assets) = self.assets.write() {
            assets.insert(location.into(), bytes);
        }
    }

    pub fn with(self, location: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(location, bytes);
        self
    }
}

#[async_trait]
impl AssetLoader for MemoryAssetLoader {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let assets = self
            .assets
            .read()
            .map_err(|e| Error::asset(location, e.to_string()))?;
        assets
            .get(location)
            .cloned()
            .ok_or_else(|| Error::asset(location, "not found"))
    }
}
