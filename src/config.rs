//! Tunables for the gesture controller and the service worker cache.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Local storage key holding optional gesture overrides as JSON.
pub const GESTURE_CONFIG_KEY: &str = "tube_gesture_config";

/// Thresholds and sensitivities for touch gestures on the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Maximum gap between two taps of a double tap, in ms.
    pub double_tap_delay_ms: f64,
    /// Maximum distance between two taps of a double tap, in px.
    pub double_tap_slop_px: f64,
    /// Seconds skipped by a double tap on the left or right zone.
    pub seek_step_secs: f64,
    /// Movement needed before a drag locks into a swipe, in px.
    pub swipe_threshold_px: f64,
    /// Vertical travel mapping to the full 0..1 volume/brightness range.
    pub vertical_sensitivity_px: f64,
    /// Seconds of seek per 100 px of horizontal travel.
    pub horizontal_secs_per_100px: f64,
    /// Change in finger distance needed for a pinch to count, in px.
    pub pinch_threshold_px: f64,
    pub left_zone_ratio: f64,
    pub right_zone_ratio: f64,
    /// How long a double-tap zone flash stays visible.
    pub flash_ms: i32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            double_tap_delay_ms: 300.0,
            double_tap_slop_px: 50.0,
            seek_step_secs: 10.0,
            swipe_threshold_px: 30.0,
            vertical_sensitivity_px: 150.0,
            horizontal_secs_per_100px: 2.0,
            pinch_threshold_px: 50.0,
            left_zone_ratio: 0.33,
            right_zone_ratio: 0.67,
            flash_ms: 500,
        }
    }
}

impl GestureConfig {
    /// Parse a (possibly partial) JSON override; missing fields keep defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Defaults merged with any override saved in local storage.
    pub fn load() -> Self {
        let raw = web_sys::window()
            .and_then(|win| win.local_storage().ok().flatten())
            .and_then(|store| store.get_item(GESTURE_CONFIG_KEY).ok().flatten());
        match raw {
            Some(raw) => Self::from_json(&raw).unwrap_or_else(|e| {
                log::warn!("ignoring gesture overrides: {e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    #[must_use]
    pub const fn with_seek_step(mut self, secs: f64) -> Self {
        self.seek_step_secs = secs;
        self
    }

    #[must_use]
    pub const fn with_swipe_threshold(mut self, px: f64) -> Self {
        self.swipe_threshold_px = px;
        self
    }

    #[must_use]
    pub const fn with_pinch_threshold(mut self, px: f64) -> Self {
        self.pinch_threshold_px = px;
        self
    }
}

/// Cache names, precache list and URL rule table for the service worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Every partition this worker owns starts with this prefix.
    pub prefix: String,
    /// Bumped on deploy; partitions with an older version are purged.
    pub version: String,
    /// Fetched and stored in the static partition at install.
    pub static_assets: Vec<String>,
    /// Path prefixes served cache-first.
    pub static_paths: Vec<String>,
    /// Path prefixes served network-first.
    pub network_first_paths: Vec<String>,
    /// Absolute URL prefixes served stale-while-revalidate.
    pub image_origins: Vec<String>,
    /// Range requests whose path contains this marker bypass the worker.
    pub stream_marker: String,
    /// Navigations fall back to this cached document when offline.
    pub offline_document: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            prefix: "tube-".into(),
            version: "v1".into(),
            static_assets: owned(&[
                "/",
                "/static/css/style.css",
                "/static/js/main.js",
                "/static/manifest.json",
            ]),
            static_paths: owned(&[
                "/static/css/",
                "/static/js/",
                "/static/icons/",
                "/static/avatars/",
            ]),
            network_first_paths: owned(&["/api/", "/search", "/watch"]),
            image_origins: owned(&["https://img.youtube.com/", "https://i.ytimg.com/"]),
            stream_marker: "/watch".into(),
            offline_document: "/".into(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn with_static_assets(mut self, assets: Vec<String>) -> Self {
        self.static_assets = assets;
        self
    }

    pub fn static_cache_name(&self) -> String {
        format!("{}static-{}", self.prefix, self.version)
    }

    pub fn dynamic_cache_name(&self) -> String {
        format!("{}dynamic-{}", self.prefix, self.version)
    }

    /// True for partitions created by an older version of this worker.
    pub fn is_stale_cache(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
            && name != self.static_cache_name()
            && name != self.dynamic_cache_name()
    }
}
