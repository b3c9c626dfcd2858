//! Locale negotiation: pick the best supported locale for a user.

/// Select the best locale from a ranked preference list.
///
/// Preferences are walked in order. A preference is accepted if it is
/// available verbatim, or, for tags longer than two characters, if its
/// two-character region-neutral prefix is available (`"es-ES"` → `"es"`).
/// Preference order wins over specificity: an earlier preference matched via
/// its prefix beats a later exact match.
///
/// Falls back to `default_locale` when nothing matches.
///
/// # Example
/// ```
/// use i18n_store::best_locale;
///
/// assert_eq!(best_locale(&["es-ES", "en"], &["en", "es"], "en"), "es");
/// assert_eq!(best_locale(&["pt"], &["es", "en"], "en"), "en");
/// ```
pub fn best_locale<P, A>(preferences: &[P], available: &[A], default_locale: &str) -> String
where
    P: AsRef<str>,
    A: AsRef<str>,
{
    let is_available = |candidate: &str| available.iter().any(|a| a.as_ref() == candidate);

    for preference in preferences {
        let locale = preference.as_ref();

        if is_available(locale) {
            return locale.to_string();
        }

        if locale.chars().count() == 2 {
            continue;
        }

        let region_neutral = region_neutral(locale);
        if is_available(region_neutral) {
            return region_neutral.to_string();
        }
    }

    default_locale.to_string()
}

/// The two-character language prefix of a tag, split on a char boundary.
fn region_neutral(locale: &str) -> &str {
    match locale.char_indices().nth(2) {
        Some((end, _)) => &locale[..end],
        None => locale,
    }
}
