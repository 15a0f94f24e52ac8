//! Native share surface and local file saving

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{Error, Result};

/// A file handed to the native share surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Everything the share surface receives: `{files, title, text}`.
#[derive(Debug, Clone, PartialEq)]
pub struct SharePayload {
    pub files: Vec<SharedFile>,
    pub title: String,
    pub text: String,
}

/// How a native share attempt ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Completed,
    /// The user dismissed the share sheet
    Cancelled,
}

/// Platform share sheet.
#[async_trait]
pub trait ShareSheet: Send + Sync {
    /// Capability probe: can files be shared natively on this platform?
    fn can_share_files(&self) -> bool;

    /// Present the share sheet. Dismissal is `Ok(ShareOutcome::Cancelled)`.
    async fn share(&self, payload: SharePayload) -> Result<ShareOutcome>;
}

/// Saves files to the device.
#[async_trait]
pub trait FileSaver: Send + Sync {
    /// Persist `bytes` under `filename`, returning where it landed.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Share sheet for platforms without native file sharing (desktop).
pub struct NoopShareSheet;

impl NoopShareSheet {
    pub fn new() -> Self {
        NoopShareSheet
    }
}

impl Default for NoopShareSheet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShareSheet for NoopShareSheet {
    fn can_share_files(&self) -> bool {
        false
    }

    async fn share(&self, _payload: SharePayload) -> Result<ShareOutcome> {
        Err(Error::ShareUnsupported)
    }
}

/// Share sheet that records payloads and replies with a scripted outcome.
/// Useful for headless runs and tests.
pub struct RecordingShareSheet {
    reply: Mutex<Result<ShareOutcome>>,
    shared: Mutex<Vec<SharePayload>>,
}

impl RecordingShareSheet {
    pub fn new(outcome: ShareOutcome) -> Self {
        Self {
            reply: Mutex::new(Ok(outcome)),
            shared: Mutex::new(Vec::new()),
        }
    }

    /// A sheet whose every share attempt fails with `reason`.
    pub fn failing(reason: &str) -> Self {
        Self {
            reply: Mutex::new(Err(Error::Share(reason.to_string()))),
            shared: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(&self) -> Vec<SharePayload> {
        self.shared.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ShareSheet for RecordingShareSheet {
    fn can_share_files(&self) -> bool {
        true
    }

    async fn share(&self, payload: SharePayload) -> Result<ShareOutcome> {
        if let Ok(mut shared) = self.shared.lock() {
            shared.push(payload);
        }
        let reply = self
            .reply
            .lock()
            .map_err(|e| Error::Share(e.to_string()))?;
        match &*reply {
            Ok(outcome) => Ok(*outcome),
            Err(e) => Err(Error::Share(e.to_string())),
        }
    }
}

/// Saves into a directory on disk (the "downloads" folder).
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl FileSaver for DirectorySaver {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::Save(format!("{}: {}", self.dir.display(), e)))?;
        let path = self.dir.join(filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::Save(format!("{}: {}", path.display(), e)))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> SharePayload {
        SharePayload {
            files: vec![],
            title: "t".into(),
            text: "x".into(),
        }
    }

    #[tokio::test]
    async fn noop_sheet_cannot_share() {
        let s = NoopShareSheet::new();
        assert!(!s.can_share_files());
        assert!(matches!(s.share(payload()).await, Err(Error::ShareUnsupported)));
    }

    #[tokio::test]
    async fn recording_sheet_replays_outcome() {
        let s = RecordingShareSheet::new(ShareOutcome::Cancelled);
        assert_eq!(s.share(payload()).await.unwrap(), ShareOutcome::Cancelled);
        assert_eq!(s.shared().len(), 1);

        let failing = RecordingShareSheet::failing("boom");
        assert!(matches!(failing.share(payload()).await, Err(Error::Share(_))));
    }

    #[tokio::test]
    async fn directory_saver_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let saver = DirectorySaver::new(tmp.path().join("downloads"));
        let path = saver.save("a.png", b"png").await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"png");
    }
}
