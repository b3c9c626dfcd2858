//! Core i18n building blocks.
//!
//! # Architecture
//!
//! - `negotiate`: picks the best available locale from a ranked preference list
//! - `plural`: plural categories and the default per-language rules
//! - `translations`: key → template maps and the atomically swapped active map
//! - `interpolate`: default `{placeholder}` substitution
//! - `translator`: key resolution with pluralization and missing-key fallback
//! - `locale`: reactive locale cell with an async pre-commit hook
//! - `metrics`: per-store counters
//!
//! [`crate::store::I18nStore`] wires these together.

mod interpolate;
mod locale;
mod metrics;
mod negotiate;
mod plural;
mod translations;
mod translator;

pub use interpolate::{interpolate_values, Interpolations};
pub use locale::{ambient_locale, ambient_locale_list, LocaleCell, PreCommitHook, FALLBACK_LOCALE};
pub use metrics::{I18nMetrics, MetricsReport};
pub use negotiate::best_locale;
pub use plural::{plural_for, PluralType};
pub use translations::{TranslationMap, Translations};
pub use translator::{
    InterpolateFn, KeyWithPluralFn, MissingKeyFn, PluralForFn, TranslationForMissingKeyFn,
    Translator, TranslatorOptions,
};
