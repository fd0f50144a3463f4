//! Error types shared by the gesture layer and the service worker.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum Error {
    /// The network fetch itself failed (offline, DNS, CORS rejection).
    #[error("network request for {url} failed: {reason}")]
    Network { url: String, reason: String },

    /// A static asset answered with a non-success status during install.
    #[error("precache of {url} failed with status {status}")]
    Precache { url: String, status: u16 },

    /// The cache storage backend rejected an operation.
    #[error("cache storage error: {0}")]
    Cache(String),

    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Any other rejection coming back from a browser API.
    #[error("browser API error: {0}")]
    Js(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        let text = value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"));
        Error::Js(text)
    }
}

impl From<Error> for JsValue {
    fn from(err: Error) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
