use crate::fetch::{DirFetcher, FetchLocaleFn, HttpFetcher, DEFAULT_ASSETS_DIR};
use crate::i18n::FALLBACK_LOCALE;
use crate::retry::RetryConfig;
use crate::store::I18nOptions;
use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // Negotiation
    pub available_locales: Vec<String>,
    pub default_locale: Option<String>,
    pub locale: Option<String>,
    pub locale_list: Option<Vec<String>>,

    // Locale payloads
    pub assets_url: Option<String>,
    pub assets_dir: String,
    pub fetch_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Negotiation
            available_locales: std::env::var("I18N_AVAILABLE_LOCALES")
                .ok()
                .map(|v| parse_list(&v))
                .filter(|list| !list.is_empty())
                .unwrap_or_else(|| vec![FALLBACK_LOCALE.to_string()]),
            default_locale: non_empty_var("I18N_DEFAULT_LOCALE"),
            locale: non_empty_var("I18N_LOCALE"),
            locale_list: non_empty_var("I18N_LOCALE_LIST")
                .map(|v| parse_list(&v))
                .filter(|list| !list.is_empty()),

            // Locale payloads
            assets_url: non_empty_var("I18N_ASSETS_URL"),
            assets_dir: std::env::var("I18N_ASSETS_DIR")
                .unwrap_or_else(|_| DEFAULT_ASSETS_DIR.to_string()),
            fetch_retries: match non_empty_var("I18N_FETCH_RETRIES") {
                Some(v) => v
                    .parse()
                    .with_context(|| format!("I18N_FETCH_RETRIES is not a number: '{}'", v))?,
                None => 1,
            },
        })
    }

    /// HTTP fetcher when `assets_url` is set, directory fetcher otherwise.
    pub fn fetch_locale(&self) -> FetchLocaleFn {
        match &self.assets_url {
            Some(url) => {
                let fetcher = HttpFetcher::new(url.clone());
                if self.fetch_retries > 1 {
                    fetcher
                        .with_retry(RetryConfig::locale_fetch().with_max_attempts(self.fetch_retries))
                        .into_fetch_fn()
                } else {
                    fetcher.into_fetch_fn()
                }
            }
            None => DirFetcher::new(&self.assets_dir).into_fetch_fn(),
        }
    }

    pub fn to_options(&self) -> I18nOptions {
        let mut options = I18nOptions::new()
            .with_available_locales(self.available_locales.iter().cloned())
            .with_fetch_locale(self.fetch_locale());

        if let Some(default_locale) = &self.default_locale {
            options = options.with_default_locale(default_locale.clone());
        }
        if let Some(locale) = &self.locale {
            options = options.with_locale(locale.clone());
        }
        if let Some(locale_list) = &self.locale_list {
            options = options.with_locale_list(locale_list.iter().cloned());
        }
        options
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split a comma separated list, dropping blanks.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
