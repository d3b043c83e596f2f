//! Shared UI crate for PEA Fund Navigator: snapshot loading, the presentation
//! engine and the Dioxus views used by the web and desktop shells.

use dioxus::prelude::*;

pub mod core;
pub mod dashboard;
pub mod i18n;
pub mod snapshot;
pub mod views;

pub mod components {
    // Localized dashboard header (components/app_header.rs)
    pub mod app_header;
    pub use app_header::AppHeader;
}

/// Shared theme, served as a bundled asset on the web.
pub const THEME_CSS: Asset = asset!("/assets/theme/main.css");

/// Same theme embedded in the binary for desktop builds.
pub const THEME_CSS_INLINE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/theme/main.css"
));

#[cfg(test)]
#[path = "tests/i18n_completeness.rs"]
mod i18n_completeness;
