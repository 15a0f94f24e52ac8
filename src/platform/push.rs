use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::{Error, Result};

/// Notification permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// The user has not decided yet
    Default,
    Granted,
    Denied,
    /// The platform has no service workers or push manager
    Unsupported,
}

/// Service worker registration metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceWorkerRegistration {
    pub scope: String,
    pub script_url: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A push subscription in its JSON wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(default)]
    pub expiration_time: Option<u64>,
    pub keys: SubscriptionKeys,
}

/// Service worker lifecycle and push subscription management.
#[async_trait]
pub trait PushManager: Send + Sync {
    /// Whether service workers and push are available at all
    fn is_supported(&self) -> bool;

    /// Current permission without prompting
    fn permission(&self) -> Permission;

    /// Prompt the user for permission
    async fn request_permission(&self) -> Result<Permission>;

    /// Register the worker script for a scope
    async fn register_service_worker(&self, script_url: &str, scope: &str) -> Result<ServiceWorkerRegistration>;

    /// The active subscription, if any
    async fn subscription(&self) -> Result<Option<PushSubscription>>;

    /// Subscribe with the application server (VAPID) key
    async fn subscribe(&self, application_server_key: &[u8]) -> Result<PushSubscription>;

    /// Drop the active subscription; `false` when there was none
    async fn unsubscribe(&self) -> Result<bool>;
}

/// Push manager for platforms without push support.
pub struct NoopPushManager;

impl NoopPushManager {
    pub fn new() -> Self {
        NoopPushManager
    }
}

impl Default for NoopPushManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushManager for NoopPushManager {
    fn is_supported(&self) -> bool {
        false
    }

    fn permission(&self) -> Permission {
        Permission::Unsupported
    }

    async fn request_permission(&self) -> Result<Permission> {
        Err(Error::Push("Push notifications are not supported in this browser".into()))
    }

    async fn register_service_worker(&self, _script_url: &str, _scope: &str) -> Result<ServiceWorkerRegistration> {
        Err(Error::Push("Service workers are not supported".into()))
    }

    async fn subscription(&self) -> Result<Option<PushSubscription>> {
        Ok(None)
    }

    async fn subscribe(&self, _application_server_key: &[u8]) -> Result<PushSubscription> {
        Err(Error::Push("Push notifications are not supported in this browser".into()))
    }

    async fn unsubscribe(&self) -> Result<bool> {
        Ok(false)
    }
}

#[derive(Default)]
struct PushState {
    permission: Option<Permission>,
    registrations: Vec<ServiceWorkerRegistration>,
    subscription: Option<PushSubscription>,
    issued: u64,
}

/// In-memory push manager whose permission prompt answers with a fixed
/// decision. Subscriptions get sequential endpoints under `endpoint_base`.
pub struct InMemoryPushManager {
    answer: Permission,
    endpoint_base: String,
    state: Mutex<PushState>,
}

impl InMemoryPushManager {
    pub fn new(answer: Permission) -> Self {
        Self {
            answer,
            endpoint_base: "https://push.example.invalid/send".to_string(),
            state: Mutex::new(PushState::default()),
        }
    }

    pub fn registrations(&self) -> Vec<ServiceWorkerRegistration> {
        self.state
            .lock()
            .map(|s| s.registrations.clone())
            .unwrap_or_default()
    }

    fn state(&self) -> Result<std::sync::MutexGuard<'_, PushState>> {
        self.state.lock().map_err(|e| Error::Push(e.to_string()))
    }
}

#[async_trait]
impl PushManager for InMemoryPushManager {
    fn is_supported(&self) -> bool {
        true
    }

    fn permission(&self) -> Permission {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.permission)
            .unwrap_or(Permission::Default)
    }

    async fn request_permission(&self) -> Result<Permission> {
        let mut state = self.state()?;
        state.permission = Some(self.answer);
        Ok(self.answer)
    }

    async fn register_service_worker(&self, script_url: &str, scope: &str) -> Result<ServiceWorkerRegistration> {
        let mut state = self.state()?;
        if let Some(existing) = state.registrations.iter().find(|r| r.scope == scope) {
            return Ok(existing.clone());
        }
        let reg = ServiceWorkerRegistration {
            scope: scope.to_string(),
            script_url: script_url.to_string(),
            id: format!("sw-{}", state.registrations.len() + 1),
        };
        state.registrations.push(reg.clone());
        Ok(reg)
    }

    async fn subscription(&self) -> Result<Option<PushSubscription>> {
        Ok(self.state()?.subscription.clone())
    }

    async fn subscribe(&self, application_server_key: &[u8]) -> Result<PushSubscription> {
        let mut state = self.state()?;
        if state.permission != Some(Permission::Granted) {
            return Err(Error::Push("permission not granted".into()));
        }
        if state.registrations.is_empty() {
            return Err(Error::Push("no active service worker".into()));
        }
        if application_server_key.is_empty() {
            return Err(Error::Push("missing application server key".into()));
        }
        if let Some(existing) = &state.subscription {
            return Ok(existing.clone());
        }
        state.issued += 1;
        let sub = PushSubscription {
            endpoint: format!("{}/{}", self.endpoint_base, state.issued),
            expiration_time: None,
            keys: SubscriptionKeys {
                p256dh: format!("p256dh-{}", state.issued),
                auth: format!("auth-{}", state.issued),
            },
        };
        state.subscription = Some(sub.clone());
        Ok(sub)
    }

    async fn unsubscribe(&self) -> Result<bool> {
        Ok(self.state()?.subscription.take().is_some())
    }
}
