//! Default `{placeholder}` interpolation.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Values substituted into `{identifier}` placeholders.
pub type Interpolations = HashMap<String, String>;

/// Placeholder: `{` + one or more chars that are neither `}` nor whitespace + `}`.
static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^}\s]+?)\}").expect("placeholder regex is valid"))
}

/// Substitute `{identifier}` placeholders in `template`.
///
/// - A placeholder whose `{` is preceded by `\` is escaped and left as is.
/// - Braces enclosing whitespace are never placeholders.
/// - Identifiers with no value in `interpolations` are left literal.
///
/// Once substitution is done the first remaining `\{` is unescaped.
///
/// ```
/// use i18n_store::{interpolate_values, Interpolations};
///
/// let values = Interpolations::from([("name".to_string(), "Sergio".to_string())]);
/// assert_eq!(interpolate_values("Hello, {name}", &values), "Hello, Sergio");
/// assert_eq!(interpolate_values(r"Hello, \{name}", &values), "Hello, {name}");
/// assert_eq!(interpolate_values("Hello, {my name}", &values), "Hello, {my name}");
/// ```
pub fn interpolate_values(template: &str, interpolations: &Interpolations) -> String {
    let substituted = placeholder().replace_all(template, |caps: &Captures<'_>| {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        let start = caps.get(0).map_or(0, |m| m.start());

        if template[..start].ends_with('\\') {
            return whole.to_string();
        }

        match interpolations.get(&caps[1]) {
            Some(value) => value.clone(),
            None => whole.to_string(),
        }
    });

    substituted.replacen("\\{", "{", 1)
}
