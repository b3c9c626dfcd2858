use std::sync::Arc;
use thiserror::Error;

/// Boxed error shared between every awaiter of a failed operation.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by locale switching and translation fetching.
///
/// Missing keys are never errors; they are resolved by the translator's
/// fallback strategy. Only loading a locale payload can fail.
///
/// The enum is `Clone` so a single readiness outcome can be handed to every
/// caller awaiting it.
#[derive(Debug, Clone, Error)]
pub enum I18nError {
    /// Reading a locale file from disk failed
    #[error("failed to read translations for '{locale}' from {path}")]
    Io {
        locale: String,
        path: String,
        #[source]
        source: SharedError,
    },

    /// The HTTP request for a locale payload failed or returned an error status
    #[error("failed to fetch translations for '{locale}' from {url}: {message}")]
    Http {
        locale: String,
        url: String,
        /// Response status, `None` when no response was received
        status: Option<u16>,
        message: String,
    },

    /// The payload was not a flat JSON object of strings
    #[error("invalid translation payload for '{locale}'")]
    Parse {
        locale: String,
        #[source]
        source: SharedError,
    },

    /// A custom fetch strategy failed
    #[error("fetching translations for '{locale}' failed")]
    Fetch {
        locale: String,
        #[source]
        source: SharedError,
    },
}

impl I18nError {
    /// Wrap an arbitrary error raised by a user-supplied fetch strategy.
    pub fn fetch(locale: impl Into<String>, source: anyhow::Error) -> Self {
        let boxed: Box<dyn std::error::Error + Send + Sync + 'static> = source.into();
        Self::Fetch {
            locale: locale.into(),
            source: Arc::from(boxed),
        }
    }

    /// Transient HTTP failures: no response at all, or a 5xx status.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => status.map_or(true, |code| code >= 500),
            _ => false,
        }
    }

    /// The locale whose payload could not be loaded.
    pub fn locale(&self) -> &str {
        match self {
            Self::Io { locale, .. }
            | Self::Http { locale, .. }
            | Self::Parse { locale, .. }
            | Self::Fetch { locale, .. } => locale,
        }
    }
}

pub type Result<T, E = I18nError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_keeps_source_message() {
        let err = I18nError::fetch("es", anyhow::anyhow!("connection reset"));

        assert_eq!(err.locale(), "es");
        assert!(err.to_string().contains("'es'"));

        let source = std::error::Error::source(&err).expect("source should be kept");
        assert!(source.to_string().contains("connection reset"));
    }

    #[test]
    fn test_error_clone_shares_source() {
        let err = I18nError::Parse {
            locale: "fr".to_string(),
            source: Arc::new(std::io::Error::new(std::io::ErrorKind::InvalidData, "bad json")),
        };
        let cloned = err.clone();

        assert_eq!(err.to_string(), cloned.to_string());
        assert_eq!(cloned.locale(), "fr");
    }

    #[test]
    fn test_http_error_display() {
        let err = I18nError::Http {
            locale: "de".to_string(),
            url: "https://cdn.example.com/de.json".to_string(),
            status: Some(404),
            message: "status 404".to_string(),
        };

        let display = err.to_string();
        assert!(display.contains("de.json"));
        assert!(display.contains("404"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable_errors() {
        let http = |status| I18nError::Http {
            locale: "de".to_string(),
            url: "https://cdn.example.com/de.json".to_string(),
            status,
            message: "boom".to_string(),
        };

        assert!(http(None).is_retryable());
        assert!(http(Some(503)).is_retryable());
        assert!(!http(Some(400)).is_retryable());
        assert!(!I18nError::fetch("de", anyhow::anyhow!("custom")).is_retryable());
    }
}
