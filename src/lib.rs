//! Locale negotiation, reactive locale switching and templated translations.
//!
//! An [`I18nStore`] owns the active locale and its translation map. Switching
//! locale fetches the new payload first and commits only once it is loaded,
//! so [`I18nStore::translate`] never renders a key against a half-switched
//! state.

pub mod config;
pub mod error;
pub mod fetch;
pub mod i18n;
pub mod observable;
pub mod retry;
pub mod store;

pub use error::{I18nError, Result};
pub use fetch::{fetch_fn, DirFetcher, FetchLocaleFn, HttpFetcher};
pub use i18n::{
    best_locale, interpolate_values, plural_for, Interpolations, LocaleCell, PluralType,
    TranslationMap, Translator, TranslatorOptions,
};
pub use observable::{Observable, Subscription};
pub use store::{I18nOptions, I18nStore, LocaleWillUpdateFn};
