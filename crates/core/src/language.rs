//! Languages

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::{customers::CustomerId, keyed::ShardedMap};

/// Languages the bot can talk in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Language {
    /// Vietnamese
    #[default]
    Vi,

    /// English
    En,
}

impl Language {
    /// Two-letter language code, as stored on the ledger.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Vi => "vi",
            Self::En => "en",
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.code())
    }
}

/// Unknown language code.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported language: {0}")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vi" | "vn" => Ok(Self::Vi),
            "en" => Ok(Self::En),
            _ => Err(UnsupportedLanguage(s.to_string())),
        }
    }
}

/// Source of the language used when a customer has not picked one.
#[automock]
#[async_trait]
pub trait LanguageResolver: Send + Sync {
    /// Language for customers without an explicit preference.
    async fn default_language(&self) -> Language;
}

/// Resolver that always answers with the same language.
#[derive(Copy, Clone, Debug, Default)]
pub struct FixedLanguage(pub Language);

#[async_trait]
impl LanguageResolver for FixedLanguage {
    async fn default_language(&self) -> Language {
        self.0
    }
}

/// Languages customers picked explicitly with `/lang`.
#[derive(Debug, Default)]
pub struct LanguagePreferences {
    overrides: ShardedMap<Language>,
}

impl LanguagePreferences {
    /// Creates an empty preference store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The customer's explicit choice, if any.
    pub fn get(&self, customer: CustomerId) -> Option<Language> {
        self.overrides.get(customer)
    }

    /// Records the customer's choice.
    pub fn set(&self, customer: CustomerId, language: Language) {
        self.overrides.insert(customer, language);
    }

    /// The customer's choice, or the resolver's default.
    pub async fn resolve(&self, customer: CustomerId, resolver: &dyn LanguageResolver) -> Language {
        match self.get(customer) {
            Some(language) => language,
            None => resolver.default_language().await,
        }
    }
}
