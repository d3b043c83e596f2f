use crate::i18n;
use crate::t;
use dioxus::prelude::*;

/// Dashboard header: brand, locale switcher and the manual refresh button.
///
/// The language selector writes to the global language signal when the
/// platform provides one (`use_context_provider(|| lang_code)` in the
/// desktop/web `App`), so every localized string re-renders on change.
#[component]
pub fn AppHeader(refreshing: bool, on_refresh: EventHandler<()>) -> Element {
    i18n::init();

    let mut current_lang = use_signal(|| i18n::FALLBACK_LANGUAGE.to_string());
    let langs = use_signal(i18n::available_languages);
    let show_switcher = langs().len() > 1;
    let lang_code_ctx: Option<Signal<String>> = try_use_context::<Signal<String>>();
    // Reactive dependency on the global language code.
    let _lang_marker = lang_code_ctx.as_ref().map(|c| c()).unwrap_or_default();

    let on_change = move |evt: dioxus::events::FormEvent| {
        let val = evt.value();
        match i18n::set_language(&val) {
            Ok(()) => {
                current_lang.set(val.clone());
                if let Some(mut code) = lang_code_ctx {
                    code.set(val);
                }
            }
            Err(err) => tracing::warn!("language switch to {val} failed: {err}"),
        }
    };

    let icon_class = if refreshing {
        "app-header__refresh-icon app-header__refresh-icon--spinning"
    } else {
        "app-header__refresh-icon"
    };

    rsx! {
        header { class: "app-header",
            div { style: "display:none", "{_lang_marker}" }
            div { class: "app-header__brand",
                span { class: "app-header__mark", aria_hidden: "true", "🧭" }
                div {
                    h1 { class: "app-header__title", {t!("app-title")} }
                    p { class: "app-header__tagline", {t!("app-tagline")} }
                }
            }
            div { class: "app-header__actions",
                if show_switcher {
                    div { class: "app-header__locale",
                        label {
                            class: "visually-hidden",
                            r#for: "locale-select",
                            {t!("language-label")}
                        }
                        select {
                            id: "locale-select",
                            value: "{current_lang()}",
                            oninput: on_change,
                            { langs().iter().map(|code| {
                                let c = code.clone();
                                let name = i18n::language_name(&c).to_string();
                                rsx! {
                                    option { key: "{c}", value: "{c}", "{name}" }
                                }
                            })}
                        }
                    }
                }
                button {
                    r#type: "button",
                    class: "app-header__refresh",
                    aria_label: t!("refresh-label"),
                    title: t!("refresh-title"),
                    aria_busy: refreshing,
                    disabled: refreshing,
                    onclick: move |_| on_refresh.call(()),
                    svg {
                        class: "{icon_class}",
                        view_box: "0 0 24 24",
                        fill: "none",
                        stroke: "currentColor",
                        stroke_width: "2",
                        path {
                            stroke_linecap: "round",
                            stroke_linejoin: "round",
                            d: "M4 4v5h.582m15.356 2A8.001 8.001 0 004.582 9m0 0H9m11 11v-5h-.581m0 0a8.003 8.003 0 01-15.357-2m15.357 2H15",
                        }
                    }
                }
            }
        }
    }
}
