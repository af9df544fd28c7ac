//! Supported interface languages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An interface language of the site.
///
/// Deserializes from a code or numeric alias, given either as a string or
/// as an integer (environment overrides arrive parsed as numbers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "LanguageRepr")]
pub enum Language {
    Vn,
    En,
    Jp,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LanguageRepr {
    Code(String),
    Alias(u64),
}

impl TryFrom<LanguageRepr> for Language {
    type Error = ParseLanguageError;

    fn try_from(repr: LanguageRepr) -> Result<Self, Self::Error> {
        match repr {
            LanguageRepr::Code(code) => code.parse(),
            LanguageRepr::Alias(alias) => alias.to_string().parse(),
        }
    }
}

/// Supported languages in declaration order.
pub const SUPPORTED_LANGUAGES: [Language; 3] = [Language::Vn, Language::En, Language::Jp];

/// Language used when a path carries none.
pub const DEFAULT_LANGUAGE: Language = Language::Vn;

/// Returned when a string names no supported language.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language code: {input:?}")]
pub struct ParseLanguageError {
    pub input: String,
}

impl Language {
    /// URL segment for this language.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Vn => "vn",
            Language::En => "en",
            Language::Jp => "jp",
        }
    }

    /// Legacy numeric alias still accepted in URLs.
    pub fn numeric_alias(&self) -> &'static str {
        match self {
            Language::Vn => "1",
            Language::Jp => "2",
            Language::En => "3",
        }
    }

    /// BCP 47 tag used for `hreflang` and Open Graph locales.
    pub fn locale(&self) -> &'static str {
        match self {
            Language::Vn => "vi-VN",
            Language::En => "en-US",
            Language::Jp => "ja-JP",
        }
    }

    /// English display name.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Vn => "Vietnamese",
            Language::En => "English",
            Language::Jp => "Japanese",
        }
    }

    /// Name of the language in that language.
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::Vn => "Tiếng Việt",
            Language::En => "English",
            Language::Jp => "日本語",
        }
    }

    /// Match a single path segment against codes and numeric aliases.
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "vn" | "1" => Some(Language::Vn),
            "jp" | "2" => Some(Language::Jp),
            "en" | "3" => Some(Language::En),
            _ => None,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        DEFAULT_LANGUAGE
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_segment(s.trim()).ok_or_else(|| ParseLanguageError {
            input: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_languages_order() {
        let codes: Vec<_> = SUPPORTED_LANGUAGES.iter().map(Language::code).collect();
        assert_eq!(codes, ["vn", "en", "jp"]);
        assert_eq!(Language::default(), Language::Vn);
    }

    #[test]
    fn test_numeric_aliases() {
        assert_eq!(Language::from_segment("1"), Some(Language::Vn));
        assert_eq!(Language::from_segment("2"), Some(Language::Jp));
        assert_eq!(Language::from_segment("3"), Some(Language::En));
        assert_eq!(Language::from_segment("4"), None);
        for lang in SUPPORTED_LANGUAGES {
            assert_eq!(Language::from_segment(lang.numeric_alias()), Some(lang));
        }
    }

    #[test]
    fn test_locales() {
        assert_eq!(Language::Vn.locale(), "vi-VN");
        assert_eq!(Language::En.locale(), "en-US");
        assert_eq!(Language::Jp.locale(), "ja-JP");
        assert_eq!(Language::Jp.native_name(), "日本語");
    }

    #[test]
    fn test_parse() {
        assert_eq!("jp".parse::<Language>(), Ok(Language::Jp));
        assert_eq!(" en ".parse::<Language>(), Ok(Language::En));

        let err = "fr".parse::<Language>().unwrap_err();
        assert_eq!(err.input, "fr");
        assert!("".parse::<Language>().is_err());
        assert!("EN".parse::<Language>().is_err());
    }

    #[test]
    fn test_serde_accepts_aliases() {
        let lang: Language = serde_yaml::from_str("jp").unwrap();
        assert_eq!(lang, Language::Jp);
        let lang: Language = serde_yaml::from_str("'3'").unwrap();
        assert_eq!(lang, Language::En);
        assert_eq!(serde_yaml::to_string(&Language::Vn).unwrap().trim(), "vn");
    }

    #[test]
    fn test_serde_accepts_integer_alias() {
        let lang: Language = serde_yaml::from_str("3").unwrap();
        assert_eq!(lang, Language::En);
        let lang: Language = serde_json::from_value(serde_json::json!(2)).unwrap();
        assert_eq!(lang, Language::Jp);
        assert!(serde_yaml::from_str::<Language>("4").is_err());
        assert!(serde_yaml::from_str::<Language>("fr").is_err());
    }
}
