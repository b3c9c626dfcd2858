//! Plural categories and the default plural rules.

use super::locale::FALLBACK_LOCALE;
use intl_pluralrules::{PluralCategory, PluralRuleType, PluralRules};
use std::fmt;
use tracing::debug;
use unic_langid::LanguageIdentifier;

/// Plural category used to select a plural-specific key variant.
///
/// The six CLDR categories are built in; `Custom` covers schemes that use
/// their own vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PluralType {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
    Custom(String),
}

impl PluralType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Zero => "zero",
            Self::One => "one",
            Self::Two => "two",
            Self::Few => "few",
            Self::Many => "many",
            Self::Other => "other",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for PluralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for PluralType {
    fn from(value: &str) -> Self {
        match value {
            "zero" => Self::Zero,
            "one" => Self::One,
            "two" => Self::Two,
            "few" => Self::Few,
            "many" => Self::Many,
            "other" => Self::Other,
            custom => Self::Custom(custom.to_string()),
        }
    }
}

impl From<PluralCategory> for PluralType {
    fn from(category: PluralCategory) -> Self {
        match category {
            PluralCategory::ZERO => Self::Zero,
            PluralCategory::ONE => Self::One,
            PluralCategory::TWO => Self::Two,
            PluralCategory::FEW => Self::Few,
            PluralCategory::MANY => Self::Many,
            PluralCategory::OTHER => Self::Other,
        }
    }
}

/// Default plural resolver: CLDR cardinal rules.
///
/// The full tag is tried first (`"pt-PT"` has its own rules), then its
/// language subtag (`"pt-BR"` uses `pt`). Languages without CLDR data use the
/// English one/other split.
pub fn plural_for(locale: &str, n: f64) -> PluralType {
    let Some(rules) = cardinal_rules(locale).or_else(|| {
        debug!("No plural rules for '{}', using English rules", locale);
        cardinal_rules(FALLBACK_LOCALE)
    }) else {
        return PluralType::Other;
    };

    rules
        .select(n.abs())
        .map(PluralType::from)
        .unwrap_or(PluralType::Other)
}

fn cardinal_rules(locale: &str) -> Option<PluralRules> {
    let tag = locale.replace('_', "-");
    let language = tag.split('-').next().unwrap_or_default();

    let rules = [tag.as_str(), language]
        .into_iter()
        .filter_map(|candidate| candidate.parse::<LanguageIdentifier>().ok())
        .find_map(|langid| PluralRules::create(langid, PluralRuleType::CARDINAL).ok());
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_type_display() {
        assert_eq!(PluralType::Zero.to_string(), "zero");
        assert_eq!(PluralType::Other.to_string(), "other");
        assert_eq!(PluralType::Custom("dual".to_string()).to_string(), "dual");
    }

    #[test]
    fn test_plural_type_from_str() {
        assert_eq!(PluralType::from("few"), PluralType::Few);
        assert_eq!(
            PluralType::from("paucal"),
            PluralType::Custom("paucal".to_string())
        );
    }

    #[test]
    fn test_english_rules() {
        assert_eq!(plural_for("en", 0.0), PluralType::Other);
        assert_eq!(plural_for("en", 1.0), PluralType::One);
        assert_eq!(plural_for("en", 2.0), PluralType::Other);
        assert_eq!(plural_for("en", 1.5), PluralType::Other);
    }

    #[test]
    fn test_region_is_ignored() {
        assert_eq!(plural_for("en-GB", 1.0), PluralType::One);
        assert_eq!(plural_for("pt_BR", 1.0), PluralType::One);
    }

    #[test]
    fn test_portuguese_zero_is_singular() {
        assert_eq!(plural_for("pt", 0.0), PluralType::One);
        assert_eq!(plural_for("pt", 1.0), PluralType::One);
        assert_eq!(plural_for("pt-BR", 0.0), PluralType::One);
        assert_eq!(plural_for("pt", 2.0), PluralType::Other);
    }

    #[test]
    fn test_regional_rules_take_precedence() {
        // European Portuguese only treats exactly 1 as singular
        assert_eq!(plural_for("pt-PT", 0.0), PluralType::Other);
        assert_eq!(plural_for("pt-PT", 1.0), PluralType::One);
    }

    #[test]
    fn test_croatian_rules() {
        assert_eq!(plural_for("hr", 1.0), PluralType::One);
        for n in 2..=4 {
            assert_eq!(plural_for("hr", n as f64), PluralType::Few);
        }
        assert_eq!(plural_for("hr", 5.0), PluralType::Other);
        assert_eq!(plural_for("sr", 22.0), PluralType::Few);
    }

    #[test]
    fn test_negative_counts_use_magnitude() {
        assert_eq!(plural_for("en", -1.0), PluralType::One);
    }

    #[test]
    fn test_french_zero_is_singular() {
        assert_eq!(plural_for("fr", 0.0), PluralType::One);
        assert_eq!(plural_for("fr", 1.5), PluralType::One);
        assert_eq!(plural_for("fr", 2.0), PluralType::Other);
    }

    #[test]
    fn test_russian_rules() {
        assert_eq!(plural_for("ru", 1.0), PluralType::One);
        assert_eq!(plural_for("ru", 21.0), PluralType::One);
        assert_eq!(plural_for("ru", 11.0), PluralType::Many);
        assert_eq!(plural_for("ru", 3.0), PluralType::Few);
        assert_eq!(plural_for("ru", 13.0), PluralType::Many);
        assert_eq!(plural_for("ru", 5.0), PluralType::Many);
        assert_eq!(plural_for("ru", 2.5), PluralType::Other);
    }

    #[test]
    fn test_polish_rules() {
        assert_eq!(plural_for("pl", 1.0), PluralType::One);
        assert_eq!(plural_for("pl", 22.0), PluralType::Few);
        assert_eq!(plural_for("pl", 21.0), PluralType::Many);
    }

    #[test]
    fn test_czech_rules() {
        assert_eq!(plural_for("cs", 1.0), PluralType::One);
        assert_eq!(plural_for("cs", 4.0), PluralType::Few);
        assert_eq!(plural_for("cs", 5.0), PluralType::Other);
        assert_eq!(plural_for("cs", 0.5), PluralType::Many);
    }

    #[test]
    fn test_arabic_rules() {
        assert_eq!(plural_for("ar", 0.0), PluralType::Zero);
        assert_eq!(plural_for("ar", 1.0), PluralType::One);
        assert_eq!(plural_for("ar", 2.0), PluralType::Two);
        assert_eq!(plural_for("ar", 5.0), PluralType::Few);
        assert_eq!(plural_for("ar", 50.0), PluralType::Many);
        assert_eq!(plural_for("ar", 100.0), PluralType::Other);
    }

    #[test]
    fn test_no_plural_languages() {
        assert_eq!(plural_for("ja", 1.0), PluralType::Other);
        assert_eq!(plural_for("zh-CN", 2.0), PluralType::Other);
    }

    #[test]
    fn test_unknown_language_uses_one_other() {
        assert_eq!(plural_for("xx", 1.0), PluralType::One);
        assert_eq!(plural_for("xx", 7.0), PluralType::Other);
    }
}
