// Browser side of the service worker: the Cache API and fetch as
// `CacheStorage`/`Fetcher`, and the global event listeners.

use std::rc::Rc;

use async_trait::async_trait;
use js_sys::{Array, Uint8Array};
use log::LevelFilter;
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise, spawn_local};
use web_sys::{
    ExtendableEvent, FetchEvent, Headers, NotificationEvent, NotificationOptions, PushEvent,
    RequestInit, ResponseInit, ServiceWorkerGlobalScope, WorkerGlobalScope,
};

use super::hooks::{NotificationSpec, SyncTask, notification_target};
use super::router::CacheRouter;
use super::rules::Route;
use super::{CacheStorage, Fetcher, Interceptor, Request, RequestMode, Response, Routed};
use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::util::init_logging;

fn js_text(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn cache_err(value: JsValue) -> Error {
    Error::Cache(js_text(&value))
}

fn header_pairs(headers: &Headers) -> Vec<(String, String)> {
    let Ok(Some(entries)) = js_sys::try_iter(headers) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let pair: Array = entry.dyn_into().ok()?;
            Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
        })
        .collect()
}

pub fn from_web_request(req: &web_sys::Request) -> Result<Request> {
    Ok(Request {
        url: Url::parse(&req.url())?,
        method: req.method(),
        headers: header_pairs(&req.headers()),
        mode: match req.mode() {
            web_sys::RequestMode::Navigate => RequestMode::Navigate,
            web_sys::RequestMode::NoCors => RequestMode::NoCors,
            _ => RequestMode::Other,
        },
    })
}

pub async fn from_web_response(resp: web_sys::Response) -> Result<Response> {
    let buf = JsFuture::from(resp.array_buffer()?).await?;
    Ok(Response {
        status: resp.status(),
        status_text: resp.status_text(),
        headers: header_pairs(&resp.headers()),
        body: Uint8Array::new(&buf).to_vec().into(),
    })
}

pub fn to_web_response(resp: &Response) -> Result<web_sys::Response> {
    let headers = Headers::new()?;
    for (name, value) in &resp.headers {
        headers.append(name, value)?;
    }
    let init = ResponseInit::new();
    init.set_status(resp.status);
    init.set_status_text(&resp.status_text);
    init.set_headers(&headers);
    // Null-body statuses (204, 304) reject any body, even an empty one.
    let body = (!resp.body.is_empty()).then(|| Uint8Array::from(&resp.body[..]));
    let body = body.as_ref().map(|b| -> &js_sys::Object { b });
    Ok(web_sys::Response::new_with_opt_buffer_source_and_init(body, &init)?)
}

/// `CacheStorage` over the worker's `caches` object.
pub struct WebCacheStorage {
    caches: web_sys::CacheStorage,
}

impl WebCacheStorage {
    pub fn new(caches: web_sys::CacheStorage) -> Self {
        Self { caches }
    }

    async fn open(&self, cache: &str) -> Result<web_sys::Cache> {
        let opened = JsFuture::from(self.caches.open(cache)).await.map_err(cache_err)?;
        opened.dyn_into().map_err(cache_err)
    }

    async fn matched(found: JsValue) -> Result<Option<Response>> {
        if found.is_undefined() {
            return Ok(None);
        }
        let resp: web_sys::Response = found.dyn_into().map_err(cache_err)?;
        Ok(Some(from_web_response(resp).await?))
    }
}

#[async_trait(?Send)]
impl CacheStorage for WebCacheStorage {
    async fn keys(&self) -> Result<Vec<String>> {
        let names: Array = JsFuture::from(self.caches.keys())
            .await
            .map_err(cache_err)?
            .into();
        Ok(names.iter().filter_map(|n| n.as_string()).collect())
    }

    async fn delete(&self, cache: &str) -> Result<bool> {
        let existed = JsFuture::from(self.caches.delete(cache))
            .await
            .map_err(cache_err)?;
        Ok(existed.as_bool().unwrap_or(false))
    }

    async fn lookup(&self, request: &Request) -> Result<Option<Response>> {
        let found = JsFuture::from(self.caches.match_with_str(&request.cache_key()))
            .await
            .map_err(cache_err)?;
        Self::matched(found).await
    }

    async fn lookup_in(&self, cache: &str, request: &Request) -> Result<Option<Response>> {
        let cache = self.open(cache).await?;
        let found = JsFuture::from(cache.match_with_str(&request.cache_key()))
            .await
            .map_err(cache_err)?;
        Self::matched(found).await
    }

    async fn put(&self, cache: &str, request: &Request, response: Response) -> Result<()> {
        let cache = self.open(cache).await?;
        let resp = to_web_response(&response)?;
        JsFuture::from(cache.put_with_str(&request.cache_key(), &resp))
            .await
            .map_err(cache_err)?;
        Ok(())
    }
}

/// `Fetcher` over the worker's global `fetch`.
pub struct WorkerFetcher {
    scope: WorkerGlobalScope,
}

impl WorkerFetcher {
    pub fn new(scope: WorkerGlobalScope) -> Self {
        Self { scope }
    }
}

#[async_trait(?Send)]
impl Fetcher for WorkerFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let network = |reason: JsValue| Error::Network {
            url: request.url.to_string(),
            reason: js_text(&reason),
        };
        let headers = Headers::new()?;
        for (name, value) in &request.headers {
            headers.append(name, value)?;
        }
        let init = RequestInit::new();
        init.set_method(&request.method);
        init.set_headers(&headers);
        let pending = self.scope.fetch_with_str_and_init(request.url.as_str(), &init);
        let resp = JsFuture::from(pending)
            .await
            .map_err(network)?;
        from_web_response(resp.dyn_into().map_err(network)?).await
    }
}

type WorkerRouter = CacheRouter<WebCacheStorage, WorkerFetcher>;

fn on_install(
    router: Rc<WorkerRouter>,
    sw: ServiceWorkerGlobalScope,
) -> Closure<dyn FnMut(ExtendableEvent)> {
    Closure::wrap(Box::new(move |e: ExtendableEvent| {
        let router = router.clone();
        let sw = sw.clone();
        let work = future_to_promise(async move {
            if let Err(err) = router.on_install().await {
                log::error!("install failed: {err}");
                return Err(err.into());
            }
            JsFuture::from(sw.skip_waiting()?).await?;
            Ok(JsValue::UNDEFINED)
        });
        if let Err(err) = e.wait_until(&work) {
            log::warn!("install wait_until rejected: {err:?}");
        }
    }) as Box<dyn FnMut(_)>)
}

fn on_activate(
    router: Rc<WorkerRouter>,
    sw: ServiceWorkerGlobalScope,
) -> Closure<dyn FnMut(ExtendableEvent)> {
    Closure::wrap(Box::new(move |e: ExtendableEvent| {
        let router = router.clone();
        let sw = sw.clone();
        let work = future_to_promise(async move {
            if let Err(err) = router.on_activate().await {
                log::warn!("cleanup of old caches failed: {err}");
            }
            JsFuture::from(sw.clients().claim()).await?;
            Ok(JsValue::UNDEFINED)
        });
        if let Err(err) = e.wait_until(&work) {
            log::warn!("activate wait_until rejected: {err:?}");
        }
    }) as Box<dyn FnMut(_)>)
}

fn on_fetch(router: Rc<WorkerRouter>) -> Closure<dyn FnMut(FetchEvent)> {
    Closure::wrap(Box::new(move |e: FetchEvent| {
        let request = match from_web_request(&e.request()) {
            Ok(request) => request,
            Err(err) => {
                log::debug!("not intercepting: {err}");
                return;
            }
        };
        // Returning without respond_with leaves the request to the browser.
        let strategy = match router.plan(&request) {
            Route::PassThrough => return,
            Route::Serve(class) => class.strategy(),
        };
        let router = router.clone();
        let answer = future_to_promise(async move {
            match router.serve(strategy, request).await {
                Routed::Respond { response, revalidate } => {
                    if let Some(background) = revalidate {
                        spawn_local(background);
                    }
                    Ok(to_web_response(&response)?.into())
                }
                Routed::PassThrough => {
                    Err(JsValue::from_str("request was not intercepted"))
                }
            }
        });
        if let Err(err) = e.respond_with(&answer) {
            log::warn!("respond_with rejected: {err:?}");
        }
    }) as Box<dyn FnMut(_)>)
}

fn on_push(sw: ServiceWorkerGlobalScope) -> Closure<dyn FnMut(PushEvent)> {
    Closure::wrap(Box::new(move |e: PushEvent| {
        let Some(data) = e.data() else {
            return;
        };
        let spec = match NotificationSpec::parse(&data.text()) {
            Ok(spec) => spec,
            Err(err) => {
                log::warn!("ignoring push message: {err}");
                return;
            }
        };
        let opts = NotificationOptions::new();
        opts.set_body(&spec.body);
        opts.set_icon(spec.icon);
        opts.set_badge(spec.badge);
        opts.set_data(&JsValue::from_str(&spec.url));
        match sw.registration().show_notification_with_options(&spec.title, &opts) {
            Ok(shown) => {
                let _ = e.wait_until(&shown);
            }
            Err(err) => log::warn!("showNotification failed: {err:?}"),
        }
    }) as Box<dyn FnMut(_)>)
}

fn on_notification_click(
    sw: ServiceWorkerGlobalScope,
) -> Closure<dyn FnMut(NotificationEvent)> {
    Closure::wrap(Box::new(move |e: NotificationEvent| {
        let notification = e.notification();
        notification.close();
        let target = notification_target(notification.data().as_string());
        let _ = e.wait_until(&sw.clients().open_window(&target));
    }) as Box<dyn FnMut(_)>)
}

fn on_sync() -> Closure<dyn FnMut(ExtendableEvent)> {
    Closure::wrap(Box::new(move |e: ExtendableEvent| {
        let tag = js_sys::Reflect::get(&e, &JsValue::from_str("tag"))
            .ok()
            .and_then(|t| t.as_string());
        let Some(task) = tag.as_deref().and_then(SyncTask::from_tag) else {
            return;
        };
        let work = future_to_promise(async move {
            task.run().await?;
            Ok(JsValue::UNDEFINED)
        });
        let _ = e.wait_until(&work);
    }) as Box<dyn FnMut(_)>)
}

/// Entry point for the service worker script. Wires the cache router and the
/// push/sync hooks to the worker's global events.
#[wasm_bindgen]
pub fn register_service_worker() -> std::result::Result<(), JsValue> {
    init_logging(LevelFilter::Info);
    let sw: ServiceWorkerGlobalScope = js_sys::global().dyn_into()?;
    let origin = Url::parse(&sw.location().origin()).map_err(Error::from)?;
    let scope: &WorkerGlobalScope = &sw;
    let router = Rc::new(CacheRouter::new(
        CacheConfig::default(),
        origin,
        Rc::new(WebCacheStorage::new(scope.caches()?)),
        Rc::new(WorkerFetcher::new(scope.clone())),
    ));

    let install = on_install(router.clone(), sw.clone());
    let activate = on_activate(router.clone(), sw.clone());
    let fetch = on_fetch(router);
    let push = on_push(sw.clone());
    let click = on_notification_click(sw.clone());
    let sync = on_sync();

    sw.add_event_listener_with_callback("install", install.as_ref().unchecked_ref())?;
    sw.add_event_listener_with_callback("activate", activate.as_ref().unchecked_ref())?;
    sw.add_event_listener_with_callback("fetch", fetch.as_ref().unchecked_ref())?;
    sw.add_event_listener_with_callback("push", push.as_ref().unchecked_ref())?;
    sw.add_event_listener_with_callback("notificationclick", click.as_ref().unchecked_ref())?;
    sw.add_event_listener_with_callback("sync", sync.as_ref().unchecked_ref())?;

    // The worker lives as long as its listeners; they are never removed.
    install.forget();
    activate.forget();
    fetch.forget();
    push.forget();
    click.forget();
    sync.forget();
    log::info!("service worker registered for {}", sw.location().origin());
    Ok(())
}
