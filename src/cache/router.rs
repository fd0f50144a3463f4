//! Caching strategies and the service worker lifecycle.

use std::rc::Rc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{join_all, try_join_all};
use url::Url;

use super::rules::{Route, RuleTable, Strategy};
use super::{
    Background, CacheStorage, Fetcher, Interceptor, Request, RequestMode, Response, Routed,
};
use crate::config::CacheConfig;
use crate::error::{Error, Result};

/// Only whole 2xx bodies are stored; partial content never is.
fn cacheable(request: &Request, response: &Response) -> bool {
    response.ok() && response.status != 206 && request.header("range").is_none()
}

/// Serves intercepted requests from a [`CacheStorage`] and a [`Fetcher`].
///
/// Requests share nothing but the storage, so any number may be in flight.
pub struct CacheRouter<C, F> {
    config: CacheConfig,
    rules: RuleTable,
    /// Base for the relative paths in the precache list.
    origin: Url,
    storage: Rc<C>,
    fetcher: Rc<F>,
    static_name: String,
    dynamic_name: String,
}

impl<C, F> CacheRouter<C, F>
where
    C: CacheStorage + 'static,
    F: Fetcher + 'static,
{
    pub fn new(config: CacheConfig, origin: Url, storage: Rc<C>, fetcher: Rc<F>) -> Self {
        Self {
            rules: RuleTable::from_config(&config),
            static_name: config.static_cache_name(),
            dynamic_name: config.dynamic_cache_name(),
            config,
            origin,
            storage,
            fetcher,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Decide synchronously whether a request is intercepted at all.
    pub fn plan(&self, request: &Request) -> Route {
        // A cross-origin no-cors fetch can only produce an opaque response,
        // which cannot be rebuilt or cached, so the browser keeps it.
        let cross_origin = request.url.origin() != self.origin.origin();
        if request.mode == RequestMode::NoCors && cross_origin {
            return Route::PassThrough;
        }
        self.rules.route(request)
    }

    /// Run `strategy` for an intercepted request.
    pub async fn serve(&self, strategy: Strategy, request: Request) -> Routed {
        log::debug!("{strategy:?} {}", request.url);
        match strategy {
            Strategy::CacheFirst => Routed::Respond {
                response: self.cache_first(&request).await,
                revalidate: None,
            },
            Strategy::NetworkFirst => Routed::Respond {
                response: self.network_first(&request).await,
                revalidate: None,
            },
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request).await,
        }
    }

    async fn cache_first(&self, request: &Request) -> Response {
        if let Some(hit) = self.cached(request).await {
            return hit;
        }
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.store(&self.static_name, request, &response).await;
                response
            }
            Err(e) => {
                log::error!("cache-first fetch failed: {e}");
                Response::offline()
            }
        }
    }

    async fn network_first(&self, request: &Request) -> Response {
        let err = match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.store(&self.dynamic_name, request, &response).await;
                return response;
            }
            Err(e) => e,
        };
        log::debug!("network-first falling back to cache: {err}");
        if let Some(hit) = self.cached(request).await {
            return hit;
        }
        if request.mode == RequestMode::Navigate {
            match request.sibling(&self.config.offline_document) {
                Ok(root) => {
                    if let Some(hit) = self.cached(&root).await {
                        return hit;
                    }
                }
                Err(e) => log::warn!("bad offline document path: {e}"),
            }
        }
        Response::offline()
    }

    async fn stale_while_revalidate(&self, request: Request) -> Routed {
        let hit = match self.storage.lookup_in(&self.dynamic_name, &request).await {
            Ok(hit) => hit,
            Err(e) => {
                log::warn!("cache lookup failed for {}: {e}", request.url);
                None
            }
        };
        if let Some(response) = hit {
            return Routed::Respond {
                response,
                revalidate: Some(self.revalidate(request)),
            };
        }
        let response = match self.fetcher.fetch(&request).await {
            Ok(response) => {
                self.store(&self.dynamic_name, &request, &response).await;
                response
            }
            Err(e) => {
                log::debug!("image fetch failed with nothing cached: {e}");
                Response::offline()
            }
        };
        Routed::Respond {
            response,
            revalidate: None,
        }
    }

    /// Refresh the dynamic partition; every failure is swallowed.
    fn revalidate(&self, request: Request) -> Background {
        let storage = self.storage.clone();
        let fetcher = self.fetcher.clone();
        let cache = self.dynamic_name.clone();
        async move {
            match fetcher.fetch(&request).await {
                Ok(response) if cacheable(&request, &response) => {
                    if let Err(e) = storage.put(&cache, &request, response).await {
                        log::debug!("revalidation store failed for {}: {e}", request.url);
                    }
                }
                Ok(response) => {
                    log::debug!("revalidation of {} got {}", request.url, response.status)
                }
                Err(e) => log::debug!("revalidation of {} failed: {e}", request.url),
            }
        }
        .boxed_local()
    }

    /// Cached entry from any partition; storage errors count as a miss.
    async fn cached(&self, request: &Request) -> Option<Response> {
        match self.storage.lookup(request).await {
            Ok(hit) => hit,
            Err(e) => {
                log::warn!("cache lookup failed for {}: {e}", request.url);
                None
            }
        }
    }

    /// Keep a copy of a successful response. A failed write never affects
    /// the response being served.
    async fn store(&self, cache: &str, request: &Request, response: &Response) {
        if !cacheable(request, response) {
            return;
        }
        if let Err(e) = self.storage.put(cache, request, response.clone()).await {
            log::warn!("could not cache {}: {e}", request.url);
        }
    }

    async fn precache_one(&self, request: &Request) -> Result<Response> {
        let response = self.fetcher.fetch(request).await?;
        if !response.ok() {
            return Err(Error::Precache {
                url: request.url.to_string(),
                status: response.status,
            });
        }
        Ok(response)
    }
}

#[async_trait(?Send)]
impl<C, F> Interceptor for CacheRouter<C, F>
where
    C: CacheStorage + 'static,
    F: Fetcher + 'static,
{
    async fn on_install(&self) -> Result<()> {
        log::info!("installing {}", self.static_name);
        let requests = self
            .config
            .static_assets
            .iter()
            .map(|path| -> Result<Request> {
                Request::get(self.origin.join(path)?.as_str())
            })
            .collect::<Result<Vec<_>>>()?;

        // Everything is fetched before anything is written, so a failed
        // install leaves no partial static partition behind.
        let fetches = requests.iter().map(|req| self.precache_one(req));
        let responses = try_join_all(fetches).await?;
        for (request, response) in requests.iter().zip(responses) {
            self.storage.put(&self.static_name, request, response).await?;
        }
        log::info!("precached {} assets", requests.len());
        Ok(())
    }

    async fn on_activate(&self) -> Result<Vec<String>> {
        let stale: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| self.config.is_stale_cache(name))
            .collect();
        let results = join_all(stale.iter().map(|name| self.storage.delete(name))).await;

        let mut deleted = Vec::with_capacity(stale.len());
        for (name, result) in stale.into_iter().zip(results) {
            if result? {
                log::info!("deleted old cache {name}");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    async fn route_request(&self, request: Request) -> Routed {
        match self.plan(&request) {
            Route::PassThrough => Routed::PassThrough,
            Route::Serve(class) => self.serve(class.strategy(), request).await,
        }
    }
}
