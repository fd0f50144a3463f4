//! Offline caching for the service worker.
//!
//! Requests are classified by [`rules::RuleTable`] and served by
//! [`router::CacheRouter`] using cache-first, network-first or
//! stale-while-revalidate. Storage and network access go through the
//! [`CacheStorage`] and [`Fetcher`] traits so the policy runs the same on
//! the browser backends in [`worker`] and on [`memory::MemoryCacheStorage`].

pub mod hooks;
pub mod memory;
pub mod router;
pub mod rules;
pub mod worker;

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::LocalBoxFuture;
use url::Url;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// A top-level page load.
    Navigate,
    /// `no-cors`, as sent by plain `<img>` and `<video>` elements.
    NoCors,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub url: Url,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub mode: RequestMode,
}

impl Request {
    pub fn get(url: &str) -> Result<Self> {
        Ok(Self {
            url: Url::parse(url)?,
            method: "GET".into(),
            headers: Vec::new(),
            mode: RequestMode::Other,
        })
    }

    pub fn navigate(url: &str) -> Result<Self> {
        Ok(Self {
            mode: RequestMode::Navigate,
            ..Self::get(url)?
        })
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_string();
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    /// Storage key: the URL without its fragment.
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        url.into()
    }

    /// A GET for `path` on the same origin.
    pub fn sibling(&self, path: &str) -> Result<Self> {
        Ok(Self {
            url: self.url.join(path)?,
            method: "GET".into(),
            headers: Vec::new(),
            mode: RequestMode::Other,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: String::new(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// The synthetic answer served when neither network nor cache can help.
    pub fn offline() -> Self {
        Self {
            status: 503,
            status_text: "Service Unavailable".into(),
            headers: vec![("content-type".into(), "text/plain".into())],
            body: Bytes::from_static(b"Offline"),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// 2xx, the same test the Fetch API's `ok` applies.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Named cache partitions, modelled on the browser `CacheStorage` API.
#[async_trait(?Send)]
pub trait CacheStorage {
    /// Names of all partitions.
    async fn keys(&self) -> Result<Vec<String>>;
    /// Returns whether a partition by that name existed.
    async fn delete(&self, cache: &str) -> Result<bool>;
    /// Search every partition.
    async fn lookup(&self, request: &Request) -> Result<Option<Response>>;
    async fn lookup_in(&self, cache: &str, request: &Request) -> Result<Option<Response>>;
    /// Store under `request`, creating the partition if needed.
    async fn put(&self, cache: &str, request: &Request, response: Response) -> Result<()>;
}

#[async_trait(?Send)]
pub trait Fetcher {
    /// `Err` only when no response arrived at all; HTTP errors are `Ok`.
    async fn fetch(&self, request: &Request) -> Result<Response>;
}

/// Work left running after a response was handed back.
pub type Background = LocalBoxFuture<'static, ()>;

pub enum Routed {
    /// Not intercepted; the browser handles the request itself.
    PassThrough,
    Respond {
        response: Response,
        /// Set when a stale cached entry was served and is being refreshed.
        revalidate: Option<Background>,
    },
}

impl Routed {
    pub fn response(&self) -> Option<&Response> {
        match self {
            Routed::PassThrough => None,
            Routed::Respond { response, .. } => Some(response),
        }
    }
}

/// Service worker lifecycle, as plain calls instead of global event hooks.
#[async_trait(?Send)]
pub trait Interceptor {
    /// Pre-populate the static partition. Any failure aborts the install.
    async fn on_install(&self) -> Result<()>;
    /// Purge partitions from older versions; returns the deleted names.
    async fn on_activate(&self) -> Result<Vec<String>>;
    async fn route_request(&self, request: Request) -> Routed;
}
