use thiserror::Error;

/// Everything that can go wrong while obtaining a snapshot.
///
/// `Display` is the English log form; views show [`LoadError::localized`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LoadError {
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed snapshot: {0}")]
    Parse(String),
    #[error("snapshot has no prediction{}", .0.as_deref().map(|m| format!(" ({m})")).unwrap_or_default())]
    Empty(Option<String>),
}

impl LoadError {
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::Network(_) => "network",
            LoadError::Parse(_) => "parse",
            LoadError::Empty(_) => "empty",
        }
    }

    /// User-facing message in the active language.
    pub fn localized(&self) -> String {
        match self {
            LoadError::Network(detail) => crate::t!("error-network", detail = detail.as_str()),
            LoadError::Parse(detail) => crate::t!("error-parse", detail = detail.as_str()),
            LoadError::Empty(Some(detail)) => {
                crate::t!("error-empty-reason", detail = detail.as_str())
            }
            LoadError::Empty(None) => crate::t!("error-empty"),
        }
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(value: serde_json::Error) -> Self {
        LoadError::Parse(value.to_string())
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(value: reqwest::Error) -> Self {
        LoadError::Network(value.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SeriesError {
    #[error("series {index} has {found} points, expected {expected}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_error_mentions_producer_message() {
        let err = LoadError::Empty(Some("yfinance timeout".into()));
        assert_eq!(
            err.to_string(),
            "snapshot has no prediction (yfinance timeout)"
        );
        assert_eq!(LoadError::Empty(None).to_string(), "snapshot has no prediction");
    }

    #[test]
    fn view_messages_follow_the_active_language() {
        let err = LoadError::Network("HTTP 503".into());
        let english = crate::i18n::with_language("en-US", || err.localized());
        assert_eq!(english, "Could not reach the data server (HTTP 503)");

        let thai = crate::i18n::with_language("th-TH", || err.localized());
        assert!(thai.starts_with("ไม่สามารถเชื่อมต่อ"), "{thai}");
        assert!(thai.ends_with("(HTTP 503)"), "{thai}");
        assert_eq!(err.to_string(), "network error: HTTP 503");
    }

    #[test]
    fn json_errors_are_parse_errors() {
        let err: LoadError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "parse");
    }
}
