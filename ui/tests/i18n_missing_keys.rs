use std::collections::{BTreeSet, HashSet};

/// Every translated bundle must define at least the messages of the en-US
/// fallback, and no bundle may define a message twice.
///
/// Adding a locale:
/// 1. Create `ui/i18n/<locale>/pea-navigator-ui.ftl` with every en-US message.
/// 2. Register it in `LOCALES` below.
const EN_US: &str = include_str!("../i18n/en-US/pea-navigator-ui.ftl");
const TH_TH: &str = include_str!("../i18n/th-TH/pea-navigator-ui.ftl");

const LOCALES: &[(&str, &str)] = &[("th-TH", TH_TH)];

#[test]
fn all_locales_have_all_fallback_keys() {
    let fallback = message_keys(EN_US);
    assert!(!fallback.is_empty(), "en-US defines no messages");
    assert_unique(EN_US, "en-US");

    let mut failures = Vec::new();
    for (locale, src) in LOCALES {
        assert_unique(src, locale);
        let keys = message_keys(src);
        let missing: BTreeSet<_> = fallback.difference(&keys).cloned().collect();
        if !missing.is_empty() {
            failures.push(format!(
                "{locale} is missing {} message(s):\n  {}",
                missing.len(),
                missing.into_iter().collect::<Vec<_>>().join("\n  ")
            ));
        }
    }

    assert!(failures.is_empty(), "{}", failures.join("\n\n"));
}

#[test]
fn plural_messages_keep_their_selector_in_every_locale() {
    for key in ["age-minutes", "age-hours", "age-days"] {
        for (locale, src) in std::iter::once(&("en-US", EN_US)).chain(LOCALES) {
            let line = definition_line(src, key)
                .unwrap_or_else(|| panic!("{locale} does not define {key}"));
            assert!(line.contains("$count"), "{locale}: {key} does not use $count");
        }
    }
}

fn message_key(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('.') {
        return None;
    }
    let (left, _) = line.split_once('=')?;
    let key = left.trim();
    let plain = !key.is_empty()
        && !key.contains(char::is_whitespace)
        && !key.starts_with('[')
        && !key.starts_with('*');
    plain.then_some(key)
}

fn message_keys(src: &str) -> HashSet<String> {
    src.lines().filter_map(message_key).map(str::to_string).collect()
}

fn definition_line<'a>(src: &'a str, key: &str) -> Option<&'a str> {
    src.lines().find(|line| message_key(line) == Some(key))
}

fn assert_unique(src: &str, locale: &str) {
    let mut seen = HashSet::new();
    let dups: BTreeSet<_> = src
        .lines()
        .filter_map(message_key)
        .filter(|key| !seen.insert(*key))
        .collect();
    assert!(dups.is_empty(), "duplicate messages in {locale}: {dups:?}");
}
