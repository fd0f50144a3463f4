// URL classification for the service worker.

use std::cmp::Reverse;

use url::Url;

use super::Request;
use crate::config::CacheConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    StaticAsset,
    RemoteImage,
    NetworkFirst,
    /// Nothing matched; served network-first.
    DefaultNetworkFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CacheFirst,
    StaleWhileRevalidate,
    NetworkFirst,
}

impl RequestClass {
    pub fn strategy(self) -> Strategy {
        match self {
            RequestClass::StaticAsset => Strategy::CacheFirst,
            RequestClass::RemoteImage => Strategy::StaleWhileRevalidate,
            RequestClass::NetworkFirst | RequestClass::DefaultNetworkFirst => {
                Strategy::NetworkFirst
            }
        }
    }

    // Breaks ties between equally long patterns; lower wins.
    fn precedence(self) -> u8 {
        match self {
            RequestClass::StaticAsset => 0,
            RequestClass::RemoteImage => 1,
            RequestClass::NetworkFirst => 2,
            RequestClass::DefaultNetworkFirst => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Prefix of the URL path.
    Path(String),
    /// Prefix of the full URL, scheme and host included.
    Href(String),
}

impl Pattern {
    fn matches(&self, url: &Url) -> bool {
        match self {
            Pattern::Path(prefix) => url.path().starts_with(prefix.as_str()),
            Pattern::Href(prefix) => url.as_str().starts_with(prefix.as_str()),
        }
    }

    fn len(&self) -> usize {
        match self {
            Pattern::Path(p) | Pattern::Href(p) => p.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub pattern: Pattern,
    pub class: RequestClass,
}

fn path_rules(prefixes: &[String], class: RequestClass) -> impl Iterator<Item = Rule> + '_ {
    prefixes.iter().map(move |p| Rule {
        pattern: Pattern::Path(p.clone()),
        class,
    })
}

/// What the router should do with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    PassThrough,
    Serve(RequestClass),
}

#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
    stream_marker: String,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>, stream_marker: impl Into<String>) -> Self {
        Self {
            rules,
            stream_marker: stream_marker.into(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        let rules = path_rules(&config.static_paths, RequestClass::StaticAsset)
            .chain(path_rules(&config.network_first_paths, RequestClass::NetworkFirst))
            .chain(config.image_origins.iter().map(|p| Rule {
                pattern: Pattern::Href(p.clone()),
                class: RequestClass::RemoteImage,
            }))
            .collect();
        Self::new(rules, config.stream_marker.clone())
    }

    /// Longest matching pattern wins, then class precedence, so the answer
    /// does not depend on rule order.
    pub fn classify(&self, url: &Url) -> RequestClass {
        self.rules
            .iter()
            .filter(|rule| rule.pattern.matches(url))
            .max_by_key(|rule| (rule.pattern.len(), Reverse(rule.class.precedence())))
            .map_or(RequestClass::DefaultNetworkFirst, |rule| rule.class)
    }

    /// Partial media fetches and non-GET requests are left to the browser.
    pub fn route(&self, request: &Request) -> Route {
        let streaming = request.url.path().contains(self.stream_marker.as_str())
            && request.header("range").is_some();
        if streaming || !request.is_get() {
            Route::PassThrough
        } else {
            Route::Serve(self.classify(&request.url))
        }
    }
}
