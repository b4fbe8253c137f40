//! User-facing messages
//!
//! English is the fallback; Russian is picked for ru/uk/be clients.

pub mod en;
pub mod ru;

pub const WELCOME: &str = "welcome";
pub const HELP: &str = "help";
pub const HISTORY_EMPTY: &str = "history_empty";
pub const HISTORY_TITLE: &str = "history_title";
pub const RATE_LIMIT_REACHED: &str = "rate_limit_reached";
pub const PROCESSING: &str = "processing";
pub const PROCESSING_BATCH: &str = "processing_batch";
pub const PROCESSING_ZIP: &str = "processing_zip";
pub const PROGRESS: &str = "progress";
pub const DONE_BATCH: &str = "done_batch";
pub const ZIP_DONE: &str = "zip_done";
pub const NOT_AN_IMAGE: &str = "not_an_image";
pub const NOT_A_ZIP: &str = "not_a_zip";
pub const ZIP_NO_IMAGES: &str = "zip_no_images";
pub const ERROR: &str = "error";
pub const INLINE_OPEN_BOT: &str = "inline_open_bot";

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    /// Map a Telegram `language_code` (IETF tag such as "en-US") to a locale
    pub fn from_language_code(code: Option<&str>) -> Self {
        let primary = code
            .and_then(|c| c.split(['-', '_']).next())
            .map(|c| c.to_ascii_lowercase());
        match primary.as_deref() {
            Some("ru") | Some("uk") | Some("be") => Locale::Ru,
            _ => Locale::En,
        }
    }
}

/// Get the raw message template
pub fn get_message(key: &str, locale: Locale) -> &'static str {
    let msg = match locale {
        Locale::En => en::get(key),
        Locale::Ru => ru::get(key),
    };
    if msg.is_empty() {
        en::get(key)
    } else {
        msg
    }
}

/// Get a message with `{name}` placeholders filled in
pub fn t(key: &str, locale: Locale, args: &[(&str, &str)]) -> String {
    let mut msg = get_message(key, locale).to_string();
    for (name, value) in args {
        msg = msg.replace(&format!("{{{}}}", name), value);
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KEYS: &[&str] = &[
        WELCOME,
        HELP,
        HISTORY_EMPTY,
        HISTORY_TITLE,
        RATE_LIMIT_REACHED,
        PROCESSING,
        PROCESSING_BATCH,
        PROCESSING_ZIP,
        PROGRESS,
        DONE_BATCH,
        ZIP_DONE,
        NOT_AN_IMAGE,
        NOT_A_ZIP,
        ZIP_NO_IMAGES,
        ERROR,
        INLINE_OPEN_BOT,
    ];

    #[test]
    fn test_every_key_translated() {
        for key in ALL_KEYS {
            assert!(!en::get(key).is_empty(), "missing en message: {}", key);
            assert!(!ru::get(key).is_empty(), "missing ru message: {}", key);
        }
    }

    #[test]
    fn test_locale_from_language_code() {
        assert_eq!(Locale::from_language_code(None), Locale::En);
        assert_eq!(Locale::from_language_code(Some("en-US")), Locale::En);
        assert_eq!(Locale::from_language_code(Some("ru")), Locale::Ru);
        assert_eq!(Locale::from_language_code(Some("UK")), Locale::Ru);
        assert_eq!(Locale::from_language_code(Some("de")), Locale::En);
    }

    #[test]
    fn test_placeholders_filled() {
        let msg = t(PROGRESS, Locale::En, &[("current", "2"), ("total", "5")]);
        assert_eq!(msg, "Processing 2/5...");
        assert!(!msg.contains('{'));
    }

    #[test]
    fn test_unknown_key_is_empty() {
        assert_eq!(t("no_such_key", Locale::Ru, &[]), "");
    }
}
