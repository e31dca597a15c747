//! Locale selection for generated text

use std::borrow::Cow;

pub const DEFAULT_LOCALE: &str = "en";

/// Map a language code such as `de` or `de-AT` onto an available catalog
pub fn resolve_locale(language: &str) -> String {
    let requested = language.trim().to_lowercase().replace('_', "-");
    let available = rust_i18n::available_locales!();

    if available.iter().any(|locale| *locale == requested) {
        return requested;
    }

    if let Some((primary, _)) = requested.split_once('-') {
        if available.iter().any(|locale| *locale == primary) {
            return primary.to_string();
        }
    }

    tracing::warn!(
        language = %language,
        fallback = DEFAULT_LOCALE,
        "no translations for language, falling back"
    );
    DEFAULT_LOCALE.to_string()
}

/// Pick the singular or plural sentence
pub fn plural<'a>(count: usize, one: Cow<'a, str>, other: Cow<'a, str>) -> String {
    if count == 1 {
        one.into_owned()
    } else {
        other.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_locales() {
        assert_eq!(resolve_locale("en"), "en");
        assert_eq!(resolve_locale("DE"), "de");
        assert_eq!(resolve_locale("de-AT"), "de");
        assert_eq!(resolve_locale("de_CH"), "de");
    }

    #[test]
    fn test_unknown_locale_falls_back_to_english() {
        assert_eq!(resolve_locale("tlh"), "en");
        assert_eq!(resolve_locale(""), "en");
    }

    #[test]
    fn test_plural_selection() {
        assert_eq!(plural(1, "one".into(), "many".into()), "one");
        assert_eq!(plural(0, "one".into(), "many".into()), "many");
        assert_eq!(plural(3, "one".into(), "many".into()), "many");
    }
}
