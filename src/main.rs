use anyhow::{bail, Context, Result};
use i18n_store::config::Config;
use i18n_store::{I18nStore, Interpolations};
use tracing::info;

fn print_usage() {
    println!(
        r#"Render one translation key with the configured locale payloads.

USAGE:
    i18n-store KEY [name=value ...] [--count N] [--locale LOCALE]

OPTIONS:
    --count N         Pluralize KEY for count N
    --locale LOCALE   Switch to LOCALE before rendering
    -h, --help        Show this message

ENVIRONMENT:
    I18N_AVAILABLE_LOCALES   Comma separated locales (default: en)
    I18N_DEFAULT_LOCALE      Fallback when negotiation finds no match
    I18N_LOCALE              Start in this locale, skipping negotiation
    I18N_LOCALE_LIST         Comma separated preferences (default: system locales)
    I18N_ASSETS_URL          Fetch {{locale}}.json over HTTP from this base URL
    I18N_ASSETS_DIR          Read {{locale}}.json from this directory (default: assets/locales)
    I18N_FETCH_RETRIES       Attempts per HTTP fetch (default: 1)

EXAMPLES:
    I18N_AVAILABLE_LOCALES=en,es i18n-store GREETING name=Sergio
    i18n-store CART.ITEMS count=3 --count 3 --locale es
"#
    );
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    key: String,
    interpolations: Interpolations,
    count: Option<f64>,
    locale: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--count" => {
                let value = iter.next().context("--count needs a value")?;
                parsed.count = Some(
                    value
                        .parse()
                        .with_context(|| format!("--count is not a number: '{}'", value))?,
                );
            }
            "--locale" => {
                parsed.locale = Some(iter.next().context("--locale needs a value")?.clone());
            }
            _ if parsed.key.is_empty() => parsed.key = arg.clone(),
            _ => {
                let (name, value) = arg
                    .split_once('=')
                    .with_context(|| format!("Expected name=value, got '{}'", arg))?;
                parsed
                    .interpolations
                    .insert(name.to_string(), value.to_string());
            }
        }
    }

    if parsed.key.is_empty() {
        bail!("Missing translation key");
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("i18n_store=info".parse()?),
        )
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    if raw.is_empty() || raw.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }
    let args = parse_args(&raw)?;

    let config = Config::from_env()?;
    let store = I18nStore::new(config.to_options());
    store
        .ready()
        .await
        .with_context(|| format!("Failed to load translations for '{}'", store.locale().get()))?;

    if let Some(locale) = &args.locale {
        store
            .locale()
            .set(locale.clone())
            .await
            .with_context(|| format!("Failed to switch locale to '{}'", locale))?;
    }

    info!("Rendering '{}' in '{}'", args.key, store.locale().get());

    let rendered = match args.count {
        Some(count) => store.translate_plural_with(&args.key, &args.interpolations, count),
        None => store.translate_with(&args.key, &args.interpolations),
    };
    println!("{}", rendered);

    info!("Metrics: {}", serde_json::to_string(&store.metrics().report())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_key_and_values() {
        let parsed = parse_args(&args(&["GREETING", "name=Sergio", "place=Madrid"])).unwrap();

        assert_eq!(parsed.key, "GREETING");
        assert_eq!(parsed.interpolations.get("name").map(String::as_str), Some("Sergio"));
        assert_eq!(parsed.interpolations.get("place").map(String::as_str), Some("Madrid"));
        assert_eq!(parsed.count, None);
    }

    #[test]
    fn test_parse_count_and_locale() {
        let parsed = parse_args(&args(&["--locale", "es", "ITEMS", "--count", "3"])).unwrap();

        assert_eq!(parsed.key, "ITEMS");
        assert_eq!(parsed.locale.as_deref(), Some("es"));
        assert_eq!(parsed.count, Some(3.0));
    }

    #[test]
    fn test_parse_rejects_missing_key() {
        assert!(parse_args(&args(&["--count", "2"])).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_value_pair() {
        let err = parse_args(&args(&["KEY", "oops"])).unwrap_err();
        assert!(err.to_string().contains("name=value"));
    }

    #[test]
    fn test_parse_rejects_bad_count() {
        assert!(parse_args(&args(&["KEY", "--count", "lots"])).is_err());
    }
}
