//! Browser front end for a lightweight video site: touch gestures for the
//! player, offline caching for the service worker, and the page shell.

pub mod cache;
pub mod components;
pub mod config;
pub mod error;
pub mod gesture;
pub mod state;
pub mod util;

pub use error::{Error, Result};
