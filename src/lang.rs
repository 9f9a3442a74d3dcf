//! Supported target languages for translation.
//!
//! A static table of ISO-639-1 codes and display names, used by the CLI
//! `languages` command and by [`lookup`] / [`is_supported`] when a target
//! language is selected. The translation gateway accepts codes outside this
//! table; the table only drives display and a warn-level hint.

/// A selectable target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// ISO-639-1 code sent to the translation gateway.
    pub code: &'static str,
    /// English display name.
    pub name: &'static str,
}

/// Target language used before the user selects one.
pub const DEFAULT_TARGET: &str = "de";

/// Common languages offered for translation.
pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English" },
    Language { code: "es", name: "Spanish" },
    Language { code: "fr", name: "French" },
    Language { code: "de", name: "German" },
    Language { code: "it", name: "Italian" },
    Language { code: "ja", name: "Japanese" },
    Language { code: "ko", name: "Korean" },
    Language { code: "pt", name: "Portuguese" },
    Language { code: "ru", name: "Russian" },
    Language { code: "zh", name: "Chinese (Simplified)" },
    Language { code: "ar", name: "Arabic" },
    Language { code: "hi", name: "Hindi" },
    Language { code: "nl", name: "Dutch" },
    Language { code: "sv", name: "Swedish" },
    Language { code: "vi", name: "Vietnamese" },
    Language { code: "th", name: "Thai" },
    Language { code: "tr", name: "Turkish" },
    Language { code: "pl", name: "Polish" },
    Language { code: "uk", name: "Ukrainian" },
    Language { code: "id", name: "Indonesian" },
    Language { code: "fi", name: "Finnish" },
    Language { code: "da", name: "Danish" },
];

/// Find a supported language by its ISO-639-1 code.
pub fn lookup(code: &str) -> Option<&'static Language> {
    SUPPORTED_LANGUAGES.iter().find(|l| l.code == code)
}

/// Returns `true` when `code` is in the supported table.
pub fn is_supported(code: &str) -> bool {
    lookup(code).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_target_is_supported() {
        assert!(is_supported(DEFAULT_TARGET));
    }

    #[test]
    fn lookup_finds_german() {
        let l = lookup("de").expect("de in table");
        assert_eq!(l.name, "German");
    }

    #[test]
    fn lookup_rejects_unknown_code() {
        assert!(lookup("xx").is_none());
        assert!(!is_supported("xx"));
    }

    #[test]
    fn codes_are_unique() {
        for (i, a) in SUPPORTED_LANGUAGES.iter().enumerate() {
            for b in &SUPPORTED_LANGUAGES[i + 1..] {
                assert_ne!(a.code, b.code, "duplicate code {}", a.code);
            }
        }
    }
}
