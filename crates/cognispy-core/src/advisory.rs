//! Contract with the remote advisory-text collaborator.
//!
//! The core never talks to the network. After a stage is complete it hands out
//! an `AdvisoryRequest` tagged with a `RoundToken`; whoever fetches the text
//! returns it with the same token, and text for a round that has since ended
//! is discarded. A canned per-locale message is always available.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported message languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
        }
    }

    /// Language name used when asking for text
    pub fn language(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Ru => "Russian",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = AdvisoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ru" => Ok(Locale::Ru),
            other => Err(AdvisoryError::UnsupportedLocale(other.to_string())),
        }
    }
}

/// Identifies the round a request was made for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundToken(pub u64);

/// Everything the collaborator needs to write a congratulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    pub score: u32,
    pub stage_label: String,
    pub username: String,
    pub locale: Locale,
}

impl AdvisoryRequest {
    /// Prompt text for a remote language model
    pub fn prompt(&self) -> String {
        format!(
            "Write one warm, short sentence in {} congratulating {} on finishing \"{}\" \
             with a score of {}. Address them by name. Do not use emojis.",
            self.locale.language(),
            self.username,
            self.stage_label,
            self.score
        )
    }

    pub fn fallback(&self) -> String {
        fallback_message(&self.username, self.locale)
    }
}

/// Canned congratulation used whenever remote text is unavailable
pub fn fallback_message(username: &str, locale: Locale) -> String {
    match locale {
        Locale::En => format!("Great job, {}! Your focus is truly impressive.", username),
        Locale::Ru => format!("Отлично, {}! Ваша сосредоточенность впечатляет.", username),
    }
}

/// Failures of the advisory collaborator; always recovered with the fallback
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AdvisoryError {
    #[error("Advisory request timed out")]
    Timeout,

    #[error("Advisory service unavailable: {0}")]
    Unavailable(String),

    #[error("Advisory service returned an empty message")]
    Empty,

    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),
}
