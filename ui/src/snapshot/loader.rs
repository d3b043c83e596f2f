//! Retrieval of the published snapshot.
//!
//! `SnapshotLoader::load` performs exactly one uncached fetch through its
//! [`SnapshotSource`], parses and validates the document and derives the age
//! bucket. The timestamp is kept parsed and rendered in the active language
//! on demand, so a language switch needs no reload.
//! It never retries and never caches: a retry is simply another `load()`.

use async_trait::async_trait;
use time::{OffsetDateTime, UtcOffset};

use crate::core::config::DashboardConfig;
use crate::core::error::LoadError;

use super::model::Snapshot;
use super::staleness::{format_display, parse_timestamp, Staleness};

/// Transport capability: hands back the raw document body.
#[async_trait(?Send)]
pub trait SnapshotSource {
    async fn fetch(&self) -> Result<String, LoadError>;
}

/// Fetches the document over HTTP with caching disabled.
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSnapshotSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait(?Send)]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self) -> Result<String, LoadError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::CACHE_CONTROL, "no-store, no-cache")
            .header(reqwest::header::PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Network(format!(
                "failed to load snapshot: HTTP {}",
                status.as_u16()
            )));
        }

        Ok(response.text().await?)
    }
}

/// A validated snapshot plus what its timestamp resolved to at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSnapshot {
    pub snapshot: Snapshot,
    pub staleness: Option<Staleness>,
    /// `None` when the producer's timestamp could not be parsed.
    pub updated: Option<OffsetDateTime>,
    pub display_offset: UtcOffset,
}

impl LoadedSnapshot {
    pub fn staleness_label(&self) -> String {
        self.staleness.map(|s| s.label()).unwrap_or_default()
    }

    /// Update time in the active language; the raw text when unparsable.
    pub fn updated_display(&self) -> String {
        match self.updated {
            Some(updated) => format_display(updated, self.display_offset),
            None => self.snapshot.timestamp_source().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotLoader<S> {
    source: S,
    display_offset: UtcOffset,
}

impl SnapshotLoader<HttpSnapshotSource> {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(
            HttpSnapshotSource::new(config.snapshot_url.clone()),
            config.display_offset,
        )
    }
}

impl<S: SnapshotSource> SnapshotLoader<S> {
    pub fn new(source: S, display_offset: UtcOffset) -> Self {
        Self {
            source,
            display_offset,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn load(&self) -> Result<LoadedSnapshot, LoadError> {
        self.load_at(OffsetDateTime::now_utc()).await
    }

    /// `load` with an explicit "now" for the staleness bucket.
    pub async fn load_at(&self, now: OffsetDateTime) -> Result<LoadedSnapshot, LoadError> {
        let result = match self.source.fetch().await {
            Ok(body) => self.interpret(&body, now),
            Err(err) => Err(err),
        };

        match &result {
            Ok(loaded) => tracing::info!(
                updated = %loaded.snapshot.updated_at,
                staleness = ?loaded.staleness,
                "snapshot loaded"
            ),
            Err(err) => tracing::warn!(kind = err.kind(), "snapshot load failed: {err}"),
        }

        result
    }

    /// Parse, validate and derive. Exposed for callers that already hold the body.
    pub fn interpret(&self, body: &str, now: OffsetDateTime) -> Result<LoadedSnapshot, LoadError> {
        if body.trim().is_empty() {
            return Err(LoadError::Parse("empty document".to_string()));
        }

        let snapshot: Snapshot = serde_json::from_str(body)?;
        snapshot.validate()?;

        if snapshot.prediction.is_none() {
            return Err(LoadError::Empty(snapshot.error.clone()));
        }

        let updated = parse_timestamp(snapshot.timestamp_source(), self.display_offset);
        let staleness = updated.map(|updated| Staleness::between(updated, now));

        Ok(LoadedSnapshot {
            snapshot,
            staleness,
            updated,
            display_offset: self.display_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::model::fixtures;
    use futures::executor::block_on;
    use std::cell::Cell;
    use time::macros::{datetime, offset};

    struct StaticSource {
        body: Result<String, LoadError>,
        calls: Cell<usize>,
    }

    impl StaticSource {
        fn ok(body: impl Into<String>) -> Self {
            Self {
                body: Ok(body.into()),
                calls: Cell::new(0),
            }
        }

        fn failing(err: LoadError) -> Self {
            Self {
                body: Err(err),
                calls: Cell::new(0),
            }
        }
    }

    #[async_trait(?Send)]
    impl SnapshotSource for StaticSource {
        async fn fetch(&self) -> Result<String, LoadError> {
            self.calls.set(self.calls.get() + 1);
            self.body.clone()
        }
    }

    fn loader(source: StaticSource) -> SnapshotLoader<StaticSource> {
        SnapshotLoader::new(source, offset!(+7))
    }

    #[test]
    fn loads_and_derives_display_values() {
        let loader = loader(StaticSource::ok(fixtures::document().to_string()));
        let loaded = block_on(loader.load_at(datetime!(2026-10-18 11:30 +7))).unwrap();

        assert_eq!(loaded.staleness, Some(Staleness::Hours(2)));
        let shown = crate::i18n::with_language("en-US", || loaded.updated_display());
        assert_eq!(shown, "18 Oct 2026, 09:00");
        assert!(loaded.snapshot.prediction.is_some());
        assert_eq!(loader.source().calls.get(), 1);
    }

    #[test]
    fn update_time_is_rendered_in_the_language_active_at_display() {
        let loader = loader(StaticSource::ok(fixtures::document().to_string()));
        let loaded = crate::i18n::with_language("en-US", || {
            block_on(loader.load_at(datetime!(2026-10-18 11:30 +7))).unwrap()
        });

        let thai = crate::i18n::with_language("th-TH", || loaded.updated_display());
        assert_eq!(thai, "18 ต.ค. 2026 09:00 น.");
        let thai_age = crate::i18n::with_language("th-TH", || loaded.staleness_label());
        assert_eq!(thai_age, "2 ชั่วโมงที่แล้ว");
    }

    #[test]
    fn empty_body_is_a_parse_error() {
        let loader = loader(StaticSource::ok("   "));
        let err = block_on(loader.load()).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let loader = loader(StaticSource::ok("{\"updated_at\": 3"));
        assert!(matches!(block_on(loader.load()), Err(LoadError::Parse(_))));
    }

    #[test]
    fn wrong_shape_is_a_parse_error() {
        let loader = loader(StaticSource::ok(r#"{"prediction": {"prediction": "Sideways"}}"#));
        assert!(matches!(block_on(loader.load()), Err(LoadError::Parse(_))));
    }

    #[test]
    fn transport_failures_pass_through_untouched() {
        let loader = loader(StaticSource::failing(LoadError::Network("HTTP 404".into())));
        let err = block_on(loader.load()).unwrap_err();
        assert_eq!(err, LoadError::Network("HTTP 404".into()));
    }

    #[test]
    fn producer_error_document_is_an_empty_snapshot() {
        let body = serde_json::json!({
            "updated_at": "2026-10-18 06:00:00",
            "error": "market data unavailable",
            "prediction": null,
            "backtest": null,
            "model_info": { "type": "ML Ensemble", "ticker": "^SET50" }
        });
        let loader = loader(StaticSource::ok(body.to_string()));
        let err = block_on(loader.load()).unwrap_err();
        assert_eq!(err, LoadError::Empty(Some("market data unavailable".into())));
    }

    #[test]
    fn unparsable_timestamp_falls_back_to_raw_text() {
        let mut document = fixtures::document();
        document["updated_timestamp"] = serde_json::Value::Null;
        document["updated_at"] = "sometime today".into();
        let loader = loader(StaticSource::ok(document.to_string()));

        let loaded = block_on(loader.load()).unwrap();
        assert_eq!(loaded.staleness, None);
        assert_eq!(loaded.updated_display(), "sometime today");
        assert_eq!(loaded.staleness_label(), "");
    }

    #[test]
    fn each_load_fetches_again() {
        let loader = loader(StaticSource::ok(fixtures::document().to_string()));
        block_on(loader.load()).unwrap();
        block_on(loader.load()).unwrap();
        assert_eq!(loader.source().calls.get(), 2);
    }
}
