//! Platform API surface: share sheet, file saving, push notifications, storage
//!
//! Browser capabilities the application depends on are modelled as traits so
//! callers receive them explicitly instead of reaching for ambient globals.
//! Each trait ships with a noop implementation for platforms that lack the
//! capability and an in-memory one for headless runs and tests.

pub mod push;
pub mod share_sheet;
pub mod storage;

pub use push::{InMemoryPushManager, NoopPushManager, Permission, PushManager, PushSubscription, ServiceWorkerRegistration};
pub use share_sheet::{
    DirectorySaver, FileSaver, NoopShareSheet, RecordingShareSheet, SharePayload, ShareOutcome, ShareSheet, SharedFile,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

use std::sync::Arc;

/// Composite access to the platform primitives an application shell needs.
pub trait PlatformApi: Send + Sync {
    fn share_sheet(&self) -> Box<dyn ShareSheet>;
    fn push_manager(&self) -> Box<dyn PushManager>;
    fn storage(&self) -> Box<dyn KeyValueStore>;
}

/// Platform with no native sharing, no push and volatile storage. Every
/// [`PlatformApi::storage`] handle shares the same in-memory store.
pub struct NoopPlatform {
    storage: Arc<MemoryStore>,
}

impl NoopPlatform {
    pub fn new() -> Self {
        NoopPlatform {
            storage: Arc::new(MemoryStore::new()),
        }
    }
}

impl Default for NoopPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformApi for NoopPlatform {
    fn share_sheet(&self) -> Box<dyn ShareSheet> {
        Box::new(NoopShareSheet::new())
    }

    fn push_manager(&self) -> Box<dyn PushManager> {
        Box::new(NoopPushManager::new())
    }

    fn storage(&self) -> Box<dyn KeyValueStore> {
        Box::new(self.storage.clone())
    }
}
