//! Key resolution: pluralization, lookup, interpolation and missing-key fallback.

use super::interpolate::{interpolate_values, Interpolations};
use super::metrics::I18nMetrics;
use super::plural::{plural_for, PluralType};
use super::translations::TranslationMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// `(template, interpolations) -> rendered`
pub type InterpolateFn = Arc<dyn Fn(&str, &Interpolations) -> String + Send + Sync>;

/// `(locale, key, plural_type) -> plural key`
pub type KeyWithPluralFn = Arc<dyn Fn(&str, &str, &PluralType) -> String + Send + Sync>;

/// `(locale, count) -> plural_type`
pub type PluralForFn = Arc<dyn Fn(&str, f64) -> PluralType + Send + Sync>;

/// `(locale, key, translations)`, called for its side effect
pub type MissingKeyFn = Arc<dyn Fn(&str, &str, &TranslationMap) + Send + Sync>;

/// `(locale, key, translations) -> fallback text`
pub type TranslationForMissingKeyFn =
    Arc<dyn Fn(&str, &str, &TranslationMap) -> String + Send + Sync>;

/// The interchangeable strategies used by [`Translator`].
///
/// Every field has a default and can be replaced on its own.
#[derive(Clone)]
pub struct TranslatorOptions {
    /// Renders a template. Default: [`interpolate_values`].
    pub interpolate_values: InterpolateFn,

    /// Builds the key of a plural variant. Default: `"{key}.{plural_type}"`.
    pub key_with_plural: KeyWithPluralFn,

    /// Picks the plural category for a count. Default: [`plural_for`].
    pub plural_for: PluralForFn,

    /// Side-effect hook for missing keys (telemetry). Default: none.
    pub missing_key: Option<MissingKeyFn>,

    /// Text returned for a missing key. Default: `"***{key}***"`.
    pub translation_for_missing_key: TranslationForMissingKeyFn,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            interpolate_values: Arc::new(interpolate_values),
            key_with_plural: Arc::new(|_: &str, key: &str, plural_type: &PluralType| {
                format!("{}.{}", key, plural_type)
            }),
            plural_for: Arc::new(plural_for),
            missing_key: None,
            translation_for_missing_key: Arc::new(|_: &str, key: &str, _: &TranslationMap| {
                format!("***{}***", key)
            }),
        }
    }
}

impl TranslatorOptions {
    pub fn with_interpolate_values(
        mut self,
        f: impl Fn(&str, &Interpolations) -> String + Send + Sync + 'static,
    ) -> Self {
        self.interpolate_values = Arc::new(f);
        self
    }

    pub fn with_key_with_plural(
        mut self,
        f: impl Fn(&str, &str, &PluralType) -> String + Send + Sync + 'static,
    ) -> Self {
        self.key_with_plural = Arc::new(f);
        self
    }

    pub fn with_plural_for(
        mut self,
        f: impl Fn(&str, f64) -> PluralType + Send + Sync + 'static,
    ) -> Self {
        self.plural_for = Arc::new(f);
        self
    }

    pub fn with_missing_key(
        mut self,
        f: impl Fn(&str, &str, &TranslationMap) + Send + Sync + 'static,
    ) -> Self {
        self.missing_key = Some(Arc::new(f));
        self
    }

    pub fn with_translation_for_missing_key(
        mut self,
        f: impl Fn(&str, &str, &TranslationMap) -> String + Send + Sync + 'static,
    ) -> Self {
        self.translation_for_missing_key = Arc::new(f);
        self
    }
}

impl fmt::Debug for TranslatorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorOptions")
            .field("missing_key", &self.missing_key.is_some())
            .finish_non_exhaustive()
    }
}

/// Renders keys against one locale and one translation map snapshot.
///
/// The store builds a fresh translator per call, bound to whatever locale and
/// map are active at that moment. Locale-will-update handlers receive one
/// bound to the incoming locale and its freshly loaded map.
#[derive(Clone)]
pub struct Translator {
    locale: String,
    translations: Arc<TranslationMap>,
    options: Arc<TranslatorOptions>,
    metrics: Option<Arc<I18nMetrics>>,
}

impl Translator {
    pub fn new(
        locale: impl Into<String>,
        translations: Arc<TranslationMap>,
        options: Arc<TranslatorOptions>,
    ) -> Self {
        Self {
            locale: locale.into(),
            translations,
            options,
            metrics: None,
        }
    }

    /// Count missing keys in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<I18nMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn translations(&self) -> &TranslationMap {
        &self.translations
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.translations.contains_key(key)
    }

    pub fn translate(&self, key: &str) -> String {
        self.resolve(key, None, None)
    }

    pub fn translate_with(&self, key: &str, interpolations: &Interpolations) -> String {
        self.resolve(key, Some(interpolations), None)
    }

    pub fn translate_plural(&self, key: &str, count: impl Into<f64>) -> String {
        self.resolve(key, None, Some(count.into()))
    }

    pub fn translate_plural_with(
        &self,
        key: &str,
        interpolations: &Interpolations,
        count: impl Into<f64>,
    ) -> String {
        self.resolve(key, Some(interpolations), Some(count.into()))
    }

    /// Resolve `key` to rendered text.
    ///
    /// With a `count`, the key is first rewritten to its plural variant. A
    /// key missing from the map never fails: the missing-key hook runs and
    /// the configured fallback text is returned.
    pub fn resolve(
        &self,
        key: &str,
        interpolations: Option<&Interpolations>,
        count: Option<f64>,
    ) -> String {
        let options = &self.options;

        let key = match count {
            Some(n) => {
                let plural_type = (options.plural_for)(&self.locale, n);
                (options.key_with_plural)(&self.locale, key, &plural_type)
            }
            None => key.to_string(),
        };

        match self.translations.get(&key) {
            Some(template) => {
                let empty = Interpolations::new();
                (options.interpolate_values)(template, interpolations.unwrap_or(&empty))
            }
            None => {
                debug!("Missing translation for '{}' in locale '{}'", key, self.locale);
                if let Some(metrics) = &self.metrics {
                    metrics.record_missing_key();
                }
                if let Some(missing_key) = &options.missing_key {
                    missing_key(&self.locale, &key, &self.translations);
                }
                (options.translation_for_missing_key)(&self.locale, &key, &self.translations)
            }
        }
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("locale", &self.locale)
            .field("keys", &self.translations.len())
            .finish_non_exhaustive()
    }
}
