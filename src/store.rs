//! The i18n store: one locale cell, one active translation map and the
//! translator strategies, wired so that switching locale fetches the new
//! payload before the switch becomes visible.

use crate::error::Result;
use crate::fetch::{fetch_fn, DirFetcher, FetchLocaleFn};
use crate::i18n::{
    ambient_locale_list, best_locale, I18nMetrics, Interpolations, LocaleCell, PluralType,
    TranslationMap, Translations, Translator, TranslatorOptions, FALLBACK_LOCALE,
};
use crate::observable::Subscription;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Handler run after a new locale's translations are loaded but before the
/// locale is committed.
pub type LocaleWillUpdateFn = Arc<dyn Fn(&Translator) + Send + Sync>;

/// Construction options for [`I18nStore`]. Every field is optional.
#[derive(Clone)]
pub struct I18nOptions {
    available_locales: Vec<String>,
    default_locale: Option<String>,
    locale: Option<String>,
    locale_list: Option<Vec<String>>,
    translations: TranslationMap,
    fetch_locale: Option<FetchLocaleFn>,
    translator: TranslatorOptions,
}

impl Default for I18nOptions {
    fn default() -> Self {
        Self {
            available_locales: vec![FALLBACK_LOCALE.to_string()],
            default_locale: None,
            locale: None,
            locale_list: None,
            translations: TranslationMap::new(),
            fetch_locale: None,
            translator: TranslatorOptions::default(),
        }
    }
}

impl I18nOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_available_locales<I, S>(mut self, locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available_locales = locales.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = Some(locale.into());
        self
    }

    /// Start in `locale`, skipping negotiation entirely.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Ranked user preferences used for negotiation.
    pub fn with_locale_list<I, S>(mut self, locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locale_list = Some(locales.into_iter().map(Into::into).collect());
        self
    }

    /// Initial translations. A non-empty map makes the store ready without
    /// an initial fetch.
    pub fn with_translations(mut self, translations: impl Into<TranslationMap>) -> Self {
        self.translations = translations.into();
        self
    }

    pub fn with_fetch_locale(mut self, fetch_locale: FetchLocaleFn) -> Self {
        self.fetch_locale = Some(fetch_locale);
        self
    }

    /// Use an async closure as the fetch strategy.
    pub fn with_fetch<F, Fut>(self, f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<TranslationMap>> + Send + 'static,
    {
        self.with_fetch_locale(fetch_fn(f))
    }

    pub fn with_translator(mut self, translator: TranslatorOptions) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_interpolate_values(
        mut self,
        f: impl Fn(&str, &Interpolations) -> String + Send + Sync + 'static,
    ) -> Self {
        self.translator = self.translator.with_interpolate_values(f);
        self
    }

    pub fn with_key_with_plural(
        mut self,
        f: impl Fn(&str, &str, &PluralType) -> String + Send + Sync + 'static,
    ) -> Self {
        self.translator = self.translator.with_key_with_plural(f);
        self
    }

    pub fn with_plural_for(
        mut self,
        f: impl Fn(&str, f64) -> PluralType + Send + Sync + 'static,
    ) -> Self {
        self.translator = self.translator.with_plural_for(f);
        self
    }

    pub fn with_missing_key(
        mut self,
        f: impl Fn(&str, &str, &TranslationMap) + Send + Sync + 'static,
    ) -> Self {
        self.translator = self.translator.with_missing_key(f);
        self
    }

    pub fn with_translation_for_missing_key(
        mut self,
        f: impl Fn(&str, &str, &TranslationMap) -> String + Send + Sync + 'static,
    ) -> Self {
        self.translator = self.translator.with_translation_for_missing_key(f);
        self
    }

    /// Explicit default, else the first available locale, else [`FALLBACK_LOCALE`].
    pub fn default_locale(&self) -> String {
        self.default_locale
            .clone()
            .or_else(|| self.available_locales.first().cloned())
            .unwrap_or_else(|| FALLBACK_LOCALE.to_string())
    }

    /// Explicit locale, else the best match of the preference list.
    pub fn initial_locale(&self) -> String {
        if let Some(locale) = &self.locale {
            return locale.clone();
        }

        let default_locale = self.default_locale();
        match &self.locale_list {
            Some(list) => best_locale(list, &self.available_locales, &default_locale),
            None => best_locale(&ambient_locale_list(), &self.available_locales, &default_locale),
        }
    }
}

impl fmt::Debug for I18nOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("I18nOptions")
            .field("available_locales", &self.available_locales)
            .field("default_locale", &self.default_locale)
            .field("locale", &self.locale)
            .field("locale_list", &self.locale_list)
            .field("translations", &self.translations.len())
            .field("fetch_locale", &self.fetch_locale.is_some())
            .field("translator", &self.translator)
            .finish()
    }
}

struct Inner {
    locale: LocaleCell,
    translations: Arc<Translations>,
    options: Arc<TranslatorOptions>,
    will_update: Arc<RwLock<Vec<LocaleWillUpdateFn>>>,
    metrics: Arc<I18nMetrics>,
    available_locales: Vec<String>,
    needs_initial_fetch: bool,
    /// Set once any locale payload has been loaded by the pre-commit hook.
    loaded: Arc<AtomicBool>,
    ready: OnceCell<Result<()>>,
    _locale_changes: Subscription,
}

/// Locale state, translations and translator for one application.
///
/// Cloning yields another handle to the same store.
///
/// # Example
///
/// ```no_run
/// use i18n_store::{I18nOptions, I18nStore};
///
/// # async fn run() -> i18n_store::Result<()> {
/// let store = I18nStore::init(
///     I18nOptions::new()
///         .with_available_locales(["en", "es"])
///         .with_locale_list(["es-ES", "en"]),
/// )
/// .await?;
///
/// println!("{}", store.translate("WELCOME"));
/// store.locale().set("en").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct I18nStore {
    inner: Arc<Inner>,
}

impl I18nStore {
    /// Build a store.
    ///
    /// Unless `options` already carries translations, the initial fetch is
    /// started right away on the current tokio runtime (or on the first
    /// [`ready`](Self::ready) call when there is none).
    pub fn new(options: I18nOptions) -> Self {
        let default_locale = options.default_locale();
        let initial_locale = options.initial_locale();

        let I18nOptions {
            available_locales,
            translations,
            fetch_locale,
            translator,
            ..
        } = options;

        let needs_initial_fetch = translations.is_empty();
        let translations = Arc::new(Translations::new(translations));
        let options = Arc::new(translator);
        let will_update: Arc<RwLock<Vec<LocaleWillUpdateFn>>> = Arc::default();
        let metrics = Arc::new(I18nMetrics::default());
        let loaded = Arc::new(AtomicBool::new(false));
        let fetch_locale = fetch_locale.unwrap_or_else(|| DirFetcher::default().into_fetch_fn());

        let locale = LocaleCell::with_hook(initial_locale.clone(), {
            let translations = Arc::clone(&translations);
            let options = Arc::clone(&options);
            let will_update = Arc::clone(&will_update);
            let metrics = Arc::clone(&metrics);
            let loaded = Arc::clone(&loaded);

            move |locale: String| {
                let fetch = Arc::clone(&fetch_locale);
                let translations = Arc::clone(&translations);
                let options = Arc::clone(&options);
                let will_update = Arc::clone(&will_update);
                let metrics = Arc::clone(&metrics);
                let loaded = Arc::clone(&loaded);

                async move {
                    metrics.record_fetch();
                    let map = match fetch(locale.clone()).await {
                        Ok(map) => map,
                        Err(e) => {
                            metrics.record_fetch_failure();
                            warn!("Failed to load translations for '{}': {}", locale, e);
                            return Err(e);
                        }
                    };

                    debug!("Activating {} translations for '{}'", map.len(), locale);
                    translations.load(map);
                    loaded.store(true, Ordering::SeqCst);

                    let handlers = will_update
                        .read()
                        .unwrap_or_else(PoisonError::into_inner)
                        .clone();
                    if !handlers.is_empty() {
                        let translator = Translator::new(locale, translations.snapshot(), options)
                            .with_metrics(metrics);
                        for handler in handlers {
                            handler(&translator);
                        }
                    }
                    Ok(())
                }
            }
        });

        let _locale_changes = {
            let metrics = Arc::clone(&metrics);
            locale.on_change(move |_| metrics.record_locale_change())
        };

        info!(
            "Initialized i18n store: locale '{}', default '{}', available {:?}",
            initial_locale, default_locale, available_locales
        );

        let store = Self {
            inner: Arc::new(Inner {
                locale,
                translations,
                options,
                will_update,
                metrics,
                available_locales,
                needs_initial_fetch,
                loaded,
                ready: OnceCell::new(),
                _locale_changes,
            }),
        };

        if needs_initial_fetch {
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                let store = store.clone();
                runtime.spawn(async move {
                    let _ = store.ready().await;
                });
            }
        }
        store
    }

    /// Build a store and wait until its initial translations are available.
    pub async fn init(options: I18nOptions) -> Result<Self> {
        let store = Self::new(options);
        store.ready().await?;
        Ok(store)
    }

    /// Resolves once the initial translations are available.
    ///
    /// The initial fetch runs the pre-commit hook for the locale committed at
    /// that point, after any `set` already in flight, so it never reverts a
    /// switch. It is skipped if a switch has already loaded translations.
    /// Every call, from any handle, gets the same outcome.
    pub async fn ready(&self) -> Result<()> {
        let inner = &self.inner;
        inner
            .ready
            .get_or_init(|| async {
                if !inner.needs_initial_fetch {
                    debug!("Translations supplied at construction, skipping initial fetch");
                    return Ok(());
                }
                if inner.loaded.load(Ordering::SeqCst) {
                    debug!("Translations already loaded by a locale switch");
                    return Ok(());
                }
                inner.locale.refresh().await
            })
            .await
            .clone()
    }

    pub fn locale(&self) -> &LocaleCell {
        &self.inner.locale
    }

    pub fn available_locales(&self) -> &[String] {
        &self.inner.available_locales
    }

    /// A translator bound to the current locale and translations.
    pub fn translator(&self) -> Translator {
        Translator::new(
            self.inner.locale.get(),
            self.inner.translations.snapshot(),
            Arc::clone(&self.inner.options),
        )
        .with_metrics(Arc::clone(&self.inner.metrics))
    }

    pub fn translate(&self, key: &str) -> String {
        self.translator().translate(key)
    }

    pub fn translate_with(&self, key: &str, interpolations: &Interpolations) -> String {
        self.translator().translate_with(key, interpolations)
    }

    pub fn translate_plural(&self, key: &str, count: impl Into<f64>) -> String {
        self.translator().translate_plural(key, count)
    }

    pub fn translate_plural_with(
        &self,
        key: &str,
        interpolations: &Interpolations,
        count: impl Into<f64>,
    ) -> String {
        self.translator()
            .translate_plural_with(key, interpolations, count)
    }

    /// Replace every translation with `translations`.
    pub fn load_translations(&self, translations: impl Into<TranslationMap>) {
        self.inner.translations.load(translations.into());
    }

    /// Merge `translations` over the current ones.
    pub fn add_translations(&self, translations: impl Into<TranslationMap>) {
        self.inner.translations.add(&translations.into());
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.inner.translations.has(key)
    }

    /// Register a handler run on every locale switch, after the new
    /// translations are loaded and before the new locale is committed.
    ///
    /// The handler's [`Translator`] is bound to the incoming locale, while
    /// `locale().get()` still reports the outgoing one.
    pub fn on_locale_will_update(&self, handler: impl Fn(&Translator) + Send + Sync + 'static) {
        self.inner
            .will_update
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    pub fn metrics(&self) -> &I18nMetrics {
        &self.inner.metrics
    }
}

impl fmt::Debug for I18nStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("I18nStore")
            .field("locale", &self.inner.locale.get())
            .field("available_locales", &self.inner.available_locales)
            .field("translations", &self.inner.translations.snapshot().len())
            .finish_non_exhaustive()
    }
}
