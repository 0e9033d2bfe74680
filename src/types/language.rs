//! Kiosk display languages

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ParseError;

/// Language of the string table and of the generated fact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Aze,
    Eng,
    Ru,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Aze, Language::Eng, Language::Ru];

    /// Short code shown in the header
    pub fn code(self) -> &'static str {
        match self {
            Language::Aze => "aze",
            Language::Eng => "eng",
            Language::Ru => "ru",
        }
    }

    /// English name of the language, as given to the fact generator
    pub fn natural_name(self) -> &'static str {
        match self {
            Language::Aze => "Azerbaijani",
            Language::Eng => "English",
            Language::Ru => "Russian",
        }
    }
}

impl FromStr for Language {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aze" | "az" => Ok(Language::Aze),
            "eng" | "en" => Ok(Language::Eng),
            "ru" | "rus" => Ok(Language::Ru),
            other => Err(ParseError::UnknownLanguage(other.to_string())),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code().to_uppercase())
    }
}
