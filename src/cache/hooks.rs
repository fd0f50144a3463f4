// Push, notification and background sync hooks.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const APP_TITLE: &str = "MalgeunTube";
pub const NOTIFICATION_ICON: &str = "/static/icons/icon-192x192.png";
pub const NOTIFICATION_BADGE: &str = "/static/icons/icon-72x72.png";
pub const DEFAULT_TARGET: &str = "/";

/// Fields a push message may carry; all optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationSpec {
    pub title: String,
    pub body: String,
    pub icon: &'static str,
    pub badge: &'static str,
    /// Opened when the notification is clicked.
    pub url: String,
}

impl NotificationSpec {
    pub fn from_payload(payload: PushPayload) -> Self {
        Self {
            title: payload.title.unwrap_or_else(|| APP_TITLE.to_string()),
            body: payload.body.unwrap_or_default(),
            icon: NOTIFICATION_ICON,
            badge: NOTIFICATION_BADGE,
            url: notification_target(payload.url),
        }
    }

    /// Parse the JSON body of a push message.
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(Self::from_payload(serde_json::from_str(raw)?))
    }
}

/// Where a clicked notification should navigate.
pub fn notification_target(data: Option<String>) -> String {
    match data {
        Some(url) if !url.is_empty() => url,
        _ => DEFAULT_TARGET.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTask {
    WatchProgress,
}

impl SyncTask {
    pub const WATCH_PROGRESS_TAG: &'static str = "sync-watch-progress";

    /// `None` for tags this worker does not handle.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            Self::WATCH_PROGRESS_TAG => Some(SyncTask::WatchProgress),
            _ => None,
        }
    }

    pub async fn run(self) -> Result<()> {
        match self {
            // Progress is not queued offline yet, so there is nothing to send.
            SyncTask::WatchProgress => log::info!("syncing watch progress"),
        }
        Ok(())
    }
}
