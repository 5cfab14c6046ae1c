use serde::{Deserialize, Serialize};

/// Code used whenever a language name is not recognised
pub const DEFAULT_CODE: &str = "en";

/// Target languages offered in the UI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
    Turkish,
}

impl Language {
    /// All selectable languages, in display order
    pub const ALL: [Language; 7] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Turkish,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Italian => "Italian",
            Language::Portuguese => "Portuguese",
            Language::Turkish => "Turkish",
        }
    }

    /// Two-letter code understood by the translation backends
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Turkish => "tr",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|lang| lang.name() == name)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Map a human-readable language name to its code, falling back to English
pub fn code_for(name: &str) -> &'static str {
    Language::from_name(name)
        .map(|lang| lang.code())
        .unwrap_or(DEFAULT_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_for_known_names() {
        assert_eq!(code_for("English"), "en");
        assert_eq!(code_for("Spanish"), "es");
        assert_eq!(code_for("French"), "fr");
        assert_eq!(code_for("German"), "de");
        assert_eq!(code_for("Italian"), "it");
        assert_eq!(code_for("Portuguese"), "pt");
        assert_eq!(code_for("Turkish"), "tr");
    }

    #[test]
    fn test_code_for_falls_back_to_english() {
        assert_eq!(code_for(""), "en");
        assert_eq!(code_for("Klingon"), "en");
        assert_eq!(code_for("turkish"), "en"); // Names are matched exactly
    }

    #[test]
    fn test_every_language_has_two_letter_code() {
        for lang in Language::ALL {
            assert_eq!(lang.code().len(), 2);
            assert_eq!(Language::from_name(lang.name()), Some(lang));
        }
    }
}
