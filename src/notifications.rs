//! Push notification orchestration.
//!
//! [`NotificationService`] strings together the platform [`PushManager`]
//! (permission, service worker, subscription) and a [`PushBackend`] that
//! stores subscriptions server side. Every step reports an explicit result;
//! nothing is retried behind the caller's back.

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::platform::{KeyValueStore, Permission, PushManager, PushSubscription};
use crate::{Error, Result};
#[cfg(feature = "http")]
use crate::NewsflashConfig;

/// Application server key the backend signs pushes with.
pub const DEFAULT_VAPID_PUBLIC_KEY: &str =
    "BFRU8Ki2Im_Qvl6mK17rKZLHeCi9UjMeyhH3R_1oaORf36XCY7K4b4qtBWLTmWCk07H_Is1NUOt-Dn0OMAKYjno";

pub const SERVICE_WORKER_SCRIPT: &str = "/service-worker.js";
pub const SERVICE_WORKER_SCOPE: &str = "/";

/// Store key for locally remembered preferences
pub const PREFERENCES_KEY: &str = "notification_preferences";

/// Decode a URL-safe base64 VAPID key into raw bytes. Padding and the
/// standard alphabet are tolerated.
pub fn decode_application_server_key(key: &str) -> Result<Vec<u8>> {
    let normalized: String = key
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| Error::Config(format!("invalid application server key: {}", e)))
}

fn default_frequency() -> String {
    "instant".to_string()
}

/// Which categories to be notified about, and how often.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default = "default_frequency")]
    pub frequency: String,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            frequency: default_frequency(),
        }
    }
}

impl NotificationPreferences {
    /// Add the category if missing, otherwise remove it.
    pub fn toggle_category(&mut self, category: &str) {
        if let Some(pos) = self.categories.iter().position(|c| c == category) {
            self.categories.remove(pos);
        } else {
            self.categories.push(category.to_string());
        }
    }

    /// Preferences remembered in `store`, or defaults when absent or unreadable.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(PREFERENCES_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("ignoring stored notification preferences: {}", e);
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                log::error!("Error reading notification preferences: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        store.set(PREFERENCES_KEY, &serde_json::to_string(self)?)
    }
}

/// Server side subscription registry.
#[async_trait]
pub trait PushBackend: Send + Sync {
    /// Register a subscription; returns the backend's JSON reply.
    async fn save_subscription(
        &self,
        subscription: &PushSubscription,
        prefs: &NotificationPreferences,
    ) -> Result<serde_json::Value>;

    async fn remove_subscription(&self, endpoint: &str) -> Result<()>;

    /// Ask the backend to push a test notification to `endpoint`.
    async fn send_test(&self, endpoint: &str) -> Result<()>;

    async fn update_preferences(&self, endpoint: &str, prefs: &NotificationPreferences) -> Result<()>;
}

/// JSON-over-HTTP push backend under `{api_url}/api/push/`.
#[cfg(feature = "http")]
pub struct HttpPushBackend {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

#[cfg(feature = "http")]
impl HttpPushBackend {
    pub fn new(config: &NewsflashConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/push/{}", self.base_url, path)
    }

    async fn send(&self, req: reqwest::RequestBuilder, what: &str) -> Result<reqwest::Response> {
        let resp = req.send().await?;
        if !resp.status().is_success() {
            log::error!("push backend rejected {}: HTTP {}", what, resp.status());
            return Err(Error::Push(format!("Failed to {}: HTTP {}", what, resp.status())));
        }
        Ok(resp)
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl PushBackend for HttpPushBackend {
    async fn save_subscription(
        &self,
        subscription: &PushSubscription,
        prefs: &NotificationPreferences,
    ) -> Result<serde_json::Value> {
        let body = serde_json::json!({
            "subscription": subscription,
            "user_agent": self.user_agent,
            "categories": prefs.categories,
            "frequency": prefs.frequency,
        });
        let req = self.client.post(self.url("subscribe")).json(&body);
        let resp = self.send(req, "save subscription to backend").await?;
        let data = resp.json::<serde_json::Value>().await?;
        log::info!("subscription saved to backend");
        Ok(data)
    }

    async fn remove_subscription(&self, endpoint: &str) -> Result<()> {
        let req = self
            .client
            .post(self.url("unsubscribe"))
            .json(&serde_json::json!({ "endpoint": endpoint }));
        self.send(req, "remove subscription from backend").await?;
        Ok(())
    }

    async fn send_test(&self, endpoint: &str) -> Result<()> {
        let req = self
            .client
            .post(self.url("test"))
            .json(&serde_json::json!({ "endpoint": endpoint }));
        self.send(req, "send test notification").await?;
        Ok(())
    }

    async fn update_preferences(&self, endpoint: &str, prefs: &NotificationPreferences) -> Result<()> {
        let body = serde_json::json!({
            "endpoint": endpoint,
            "categories": prefs.categories,
            "frequency": prefs.frequency,
        });
        let req = self.client.put(self.url("preferences")).json(&body);
        self.send(req, "update preferences").await?;
        Ok(())
    }
}

/// Result of [`NotificationService::enable`].
#[derive(Debug, Clone, PartialEq)]
pub enum EnableOutcome {
    Subscribed(PushSubscription),
    /// The user declined (or dismissed) the permission prompt
    Denied,
    /// The platform has no push support
    Unsupported,
    Failed(String),
}

pub struct NotificationService {
    manager: Arc<dyn PushManager>,
    backend: Arc<dyn PushBackend>,
    server_key: Vec<u8>,
}

impl NotificationService {
    pub fn new(manager: Arc<dyn PushManager>, backend: Arc<dyn PushBackend>, vapid_public_key: &str) -> Result<Self> {
        Ok(Self {
            manager,
            backend,
            server_key: decode_application_server_key(vapid_public_key)?,
        })
    }

    pub fn permission(&self) -> Permission {
        if !self.manager.is_supported() {
            return Permission::Unsupported;
        }
        self.manager.permission()
    }

    /// Granted and holding a live subscription.
    pub async fn is_enabled(&self) -> bool {
        if self.permission() != Permission::Granted {
            return false;
        }
        match self.manager.subscription().await {
            Ok(sub) => sub.is_some(),
            Err(e) => {
                log::error!("Error getting subscription: {}", e);
                false
            }
        }
    }

    /// Register the service worker, ask for permission, subscribe and
    /// register the subscription with the backend.
    pub async fn enable(&self, prefs: &NotificationPreferences) -> EnableOutcome {
        if !self.manager.is_supported() {
            return EnableOutcome::Unsupported;
        }
        if let Err(e) = self
            .manager
            .register_service_worker(SERVICE_WORKER_SCRIPT, SERVICE_WORKER_SCOPE)
            .await
        {
            log::error!("Service worker registration failed: {}", e);
            return EnableOutcome::Failed(e.to_string());
        }
        match self.manager.request_permission().await {
            Ok(Permission::Granted) => {}
            Ok(Permission::Unsupported) => return EnableOutcome::Unsupported,
            Ok(_) => return EnableOutcome::Denied,
            Err(e) => return EnableOutcome::Failed(e.to_string()),
        }
        let subscription = match self.manager.subscribe(&self.server_key).await {
            Ok(sub) => sub,
            Err(e) => {
                log::error!("Failed to subscribe to push: {}", e);
                return EnableOutcome::Failed(e.to_string());
            }
        };
        if let Err(e) = self.backend.save_subscription(&subscription, prefs).await {
            return EnableOutcome::Failed(e.to_string());
        }
        EnableOutcome::Subscribed(subscription)
    }

    /// Drop the subscription locally and on the backend. `false` when there
    /// was nothing to drop.
    pub async fn disable(&self) -> Result<bool> {
        let Some(sub) = self.manager.subscription().await? else {
            return Ok(false);
        };
        self.backend.remove_subscription(&sub.endpoint).await?;
        self.manager.unsubscribe().await
    }

    pub async fn send_test(&self) -> Result<()> {
        let sub = self.active_subscription().await?;
        self.backend.send_test(&sub.endpoint).await
    }

    pub async fn update_preferences(&self, prefs: &NotificationPreferences) -> Result<()> {
        let sub = self.active_subscription().await?;
        self.backend.update_preferences(&sub.endpoint, prefs).await
    }

    async fn active_subscription(&self) -> Result<PushSubscription> {
        self.manager
            .subscription()
            .await?
            .ok_or_else(|| Error::Push("No active subscription".into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A notification ready for display, built from a push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub url: String,
    /// Large image for rich notifications
    pub image: Option<String>,
    pub tag: String,
    pub require_interaction: bool,
    pub actions: Vec<NotificationAction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushData {
    title: Option<String>,
    body: Option<String>,
    icon: Option<String>,
    badge: Option<String>,
    url: Option<String>,
    image: Option<String>,
    tag: Option<String>,
    require_interaction: Option<bool>,
    actions: Option<Vec<NotificationAction>>,
}

fn or_default(value: Option<String>, default: &str) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

impl Default for NotificationPayload {
    fn default() -> Self {
        Self {
            title: "NewsFlash".into(),
            body: "You have a new notification".into(),
            icon: "/logo192.png".into(),
            badge: "/logo192.png".into(),
            url: "/".into(),
            image: None,
            tag: "newsflash-notification".into(),
            require_interaction: false,
            actions: Vec::new(),
        }
    }
}

impl NotificationPayload {
    /// Build from the raw push message body. Missing or empty fields take the
    /// defaults; an unparseable body yields the default notification.
    pub fn from_push_data(data: Option<&[u8]>) -> Self {
        let defaults = Self::default();
        let Some(bytes) = data else {
            return defaults;
        };
        let parsed: PushData = match serde_json::from_slice(bytes) {
            Ok(p) => p,
            Err(e) => {
                log::error!("Error parsing push data: {}", e);
                return defaults;
            }
        };
        Self {
            title: or_default(parsed.title, &defaults.title),
            body: or_default(parsed.body, &defaults.body),
            icon: or_default(parsed.icon, &defaults.icon),
            badge: or_default(parsed.badge, &defaults.badge),
            url: or_default(parsed.url, &defaults.url),
            image: parsed.image.filter(|i| !i.is_empty()),
            tag: or_default(parsed.tag, &defaults.tag),
            require_interaction: parsed.require_interaction.unwrap_or(false),
            actions: parsed.actions.unwrap_or_default(),
        }
    }

    /// URL to open when the notification is clicked. A click on an action
    /// button only navigates for the `open` action.
    pub fn click_target(&self, action: Option<&str>) -> Option<&str> {
        match action {
            None | Some("") | Some("open") => Some(&self.url),
            Some(_) => None,
        }
    }
}
