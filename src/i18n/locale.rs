//! Reactive locale cell with an asynchronous pre-commit hook.
//!
//! Changing the locale is a two-phase operation: the proposed value is handed
//! to the pre-commit hook (where the store fetches translations), and only
//! once the hook succeeds is the value committed and observers notified.
//! Until then [`LocaleCell::get`] keeps returning the previous locale.

use crate::error::{I18nError, Result};
use crate::observable::{Observable, Subscription};
use futures::future::{self, BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

/// Locale used when neither an explicit nor an ambient locale is available.
pub const FALLBACK_LOCALE: &str = "en";

/// Async action run with the proposed locale before it is committed.
pub type PreCommitHook = Arc<dyn Fn(String) -> BoxFuture<'static, Result<()>> + Send + Sync>;

struct Inner {
    value: Observable<String>,
    before_update: PreCommitHook,
    /// Serializes overlapping `set` calls in arrival order.
    gate: Mutex<()>,
}

/// Holder of the active locale.
///
/// Cloning yields another handle to the same cell.
#[derive(Clone)]
pub struct LocaleCell {
    inner: Arc<Inner>,
}

impl LocaleCell {
    /// A cell whose pre-commit hook does nothing.
    pub fn new(initial: impl Into<String>) -> Self {
        Self::with_hook(initial, |_| future::ready(Ok::<_, I18nError>(())))
    }

    pub fn with_hook<F, Fut>(initial: impl Into<String>, before_update: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let before_update: PreCommitHook = Arc::new(move |locale| before_update(locale).boxed());
        Self {
            inner: Arc::new(Inner {
                value: Observable::new(initial.into()),
                before_update,
                gate: Mutex::new(()),
            }),
        }
    }

    /// A cell initialised from the system locale, or [`FALLBACK_LOCALE`].
    pub fn from_ambient<F, Fut>(before_update: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self::with_hook(ambient_locale(), before_update)
    }

    /// The committed locale.
    pub fn get(&self) -> String {
        self.inner.value.get()
    }

    /// Change the locale.
    ///
    /// Setting the current locale again is a no-op: the hook does not run and
    /// no observer fires. Otherwise the pre-commit hook runs first; if it
    /// fails the error is returned and the locale stays unchanged.
    ///
    /// Overlapping calls are applied one at a time in the order they were
    /// made, so the last call issued determines the final locale.
    pub async fn set(&self, locale: impl Into<String>) -> Result<()> {
        self.update(locale.into(), false).await
    }

    /// Run the pre-commit hook even if `locale` is already active.
    ///
    /// Observers are only notified if the committed value actually changes.
    pub async fn set_forced(&self, locale: impl Into<String>) -> Result<()> {
        self.update(locale.into(), true).await
    }

    /// Run the pre-commit hook for whatever locale is committed once the
    /// pending sets ahead of this call have finished.
    ///
    /// Never changes the locale, so no observer fires.
    pub async fn refresh(&self) -> Result<()> {
        let _gate = self.inner.gate.lock().await;
        let locale = self.get();
        debug!("Refreshing locale '{}'", locale);
        self.commit(locale).await
    }

    async fn update(&self, locale: String, force: bool) -> Result<()> {
        let _gate = self.inner.gate.lock().await;

        if !force && locale == self.get() {
            debug!("Locale already '{}', skipping update", locale);
            return Ok(());
        }

        self.commit(locale).await
    }

    /// Callers must hold the gate.
    async fn commit(&self, locale: String) -> Result<()> {
        (self.inner.before_update)(locale.clone()).await?;

        let previous = self.get();
        if self.inner.value.set(locale.clone()) {
            info!("Locale changed from '{}' to '{}'", previous, locale);
        }
        Ok(())
    }

    /// Register an observer called with each committed locale, in
    /// registration order, after the new value is visible through `get`.
    #[must_use = "dropping the subscription immediately unsubscribes"]
    pub fn on_change(&self, callback: impl Fn(&str) + Send + Sync + 'static) -> Subscription {
        self.inner.value.subscribe(move |locale: &String| callback(locale))
    }

    /// Receiver for async consumers; changes only on commit.
    pub fn watch(&self) -> watch::Receiver<String> {
        self.inner.value.watch()
    }
}

impl std::fmt::Debug for LocaleCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleCell")
            .field("value", &self.get())
            .finish_non_exhaustive()
    }
}

/// The operating system's preferred locale, or [`FALLBACK_LOCALE`].
pub fn ambient_locale() -> String {
    sys_locale::get_locale().unwrap_or_else(|| FALLBACK_LOCALE.to_string())
}

/// The operating system's ranked locale preferences, or `[FALLBACK_LOCALE]`.
pub fn ambient_locale_list() -> Vec<String> {
    let locales: Vec<String> = sys_locale::get_locales().collect();
    if locales.is_empty() {
        vec![FALLBACK_LOCALE.to_string()]
    } else {
        locales
    }
}
