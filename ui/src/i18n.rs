//! Localization for `pea-navigator-ui`.
//!
//! Wires `i18n-embed` (language selection and asset loading), `fluent`
//! (message formatting), `rust-embed` (compile-time embedding of the `.ftl`
//! files) and `i18n-embed-fl` (the compile-time checked `fl!` macro).
//!
//! Layout (relative to the crate root):
//! ```text
//! i18n.toml
//! i18n/
//!   en-US/pea-navigator-ui.ftl   (fallback/reference)
//!   th-TH/pea-navigator-ui.ftl
//! ```
//!
//! Call [`init`] once at start-up (it is idempotent), then use `t!`:
//! ```ignore
//! crate::i18n::init();
//! let title = crate::t!("app-title");
//! let age = crate::t!("age-hours", count = 3);
//! ```
//!
//! Desktop builds pick the OS locale list, web builds `navigator.languages`.
//! Placeables are not wrapped in Unicode isolation marks; every string here is
//! rendered into an element whose direction is already known.
use std::sync::Once;

use i18n_embed::fluent::FluentLanguageLoader;
use once_cell::sync::Lazy;
use rust_embed::Embed;
use unic_langid::LanguageIdentifier;

pub use i18n_embed_fl::fl;

/// Translation macro routed through the shared [`LOADER`].
///
/// ```ignore
/// t!("app-title")
/// t!("age-minutes", count = 5)
/// ```
#[macro_export]
macro_rules! t {
    ($key:literal) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key)
    };
    ($key:literal, $( $arg:ident = $value:expr ),+ $(,)?) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key, $( $arg = $value ),+ )
    };
}

/// Fluent domain; the fallback file is `i18n/en-US/{DOMAIN}.ftl`.
const DOMAIN: &str = "pea-navigator-ui";

pub const FALLBACK_LANGUAGE: &str = "en-US";

#[derive(Embed)]
#[folder = "i18n"]
struct Localizations;

pub static LOADER: Lazy<FluentLanguageLoader> = Lazy::new(|| {
    let fallback = LanguageIdentifier::from_bytes(FALLBACK_LANGUAGE.as_bytes()).unwrap_or_default();
    FluentLanguageLoader::new(DOMAIN, fallback)
});

static INIT: Once = Once::new();

pub fn init() {
    INIT.call_once(|| {
        let requested = requested_languages();
        if let Err(err) = i18n_embed::select(&*LOADER, &Localizations, &requested) {
            tracing::warn!("failed selecting languages ({err}); continuing with fallback");
        }
        // Only applies to bundles that are already loaded.
        LOADER.set_use_isolating(false);
    });
}

/// Switch language at runtime. Unparsable tags are ignored.
pub fn set_language(tag: &str) -> Result<(), i18n_embed::I18nEmbedError> {
    let Ok(lang) = tag.parse::<LanguageIdentifier>() else {
        return Ok(());
    };
    i18n_embed::select(&*LOADER, &Localizations, &[lang])?;
    LOADER.set_use_isolating(false);
    Ok(())
}

/// Embedded language tags, sorted.
pub fn available_languages() -> Vec<String> {
    let mut langs = Localizations::iter()
        .filter_map(|path| path.split('/').next().map(|s| s.to_string()))
        .collect::<Vec<_>>();
    langs.sort();
    langs.dedup();
    langs
}

/// Human name of a language tag for the switcher.
pub fn language_name(tag: &str) -> &str {
    match tag {
        "en-US" => "English",
        "th-TH" => "ไทย",
        other => other,
    }
}

/// Runs `f` with `tag` active. The loader is process-wide, so tests that
/// depend on the active language serialize through this.
#[cfg(test)]
pub(crate) fn with_language<R>(tag: &str, f: impl FnOnce() -> R) -> R {
    static LANGUAGE: std::sync::Mutex<()> = std::sync::Mutex::new(());
    let _guard = LANGUAGE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    init();
    set_language(tag).expect("embedded language");
    let result = f();
    let _ = set_language(FALLBACK_LANGUAGE);
    result
}

#[cfg(target_arch = "wasm32")]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::WebLanguageRequester::requested_languages()
}

#[cfg(not(target_arch = "wasm32"))]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::DesktopLanguageRequester::requested_languages()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::fl;

    #[test]
    fn both_locales_are_embedded() {
        let langs = available_languages();
        assert!(langs.iter().any(|l| l == "en-US"));
        assert!(langs.iter().any(|l| l == "th-TH"));
    }

    #[test]
    fn basic_lookup_works() {
        with_language("en-US", || {
            assert_eq!(fl!(&*LOADER, "app-title"), "PEA Fund Navigator");
        });
    }

    #[test]
    fn unknown_language_keeps_current_bundle() {
        with_language("en-US", || {
            let before = fl!(&*LOADER, "app-title");
            let _ = set_language("zz-ZZ");
            assert_eq!(before, fl!(&*LOADER, "app-title"));
        });
    }

    #[test]
    fn counts_are_interpolated() {
        with_language("en-US", || {
            assert_eq!(fl!(&*LOADER, "age-minutes", count = 1), "1 minute ago");
            assert_eq!(fl!(&*LOADER, "age-minutes", count = 12), "12 minutes ago");
        });
    }

    #[test]
    fn switching_language_keeps_placeables_unisolated() {
        let thai = with_language("th-TH", || fl!(&*LOADER, "age-hours", count = 2));
        assert_eq!(thai, "2 ชั่วโมงที่แล้ว");
    }
}
