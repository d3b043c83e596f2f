//! Platform detection and host integration helpers.

use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Web,
    Desktop,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_arch = "wasm32") {
            Self::Web
        } else {
            Self::Desktop
        }
    }
}

/// Spawn a detached future on the UI executor.
pub fn spawn_future<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    dioxus::prelude::spawn(future);
}

/// Vertical scroll offset of the page, in CSS pixels.
#[cfg(target_arch = "wasm32")]
pub fn scroll_offset() -> f64 {
    web_sys::window()
        .and_then(|window| window.scroll_y().ok())
        .unwrap_or(0.0)
}

/// Desktop webviews host the dashboard in a fixed-height page; pulling is always allowed.
#[cfg(not(target_arch = "wasm32"))]
pub fn scroll_offset() -> f64 {
    0.0
}

/// Origin of the hosting page (e.g. `https://example.org`), if any.
#[cfg(target_arch = "wasm32")]
pub fn page_origin() -> Option<String> {
    web_sys::window().and_then(|window| window.location().origin().ok())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn page_origin() -> Option<String> {
    None
}
