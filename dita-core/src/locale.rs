//! Translation strings and event phrasing.
//!
//! The matcher only produces structured [`ProcessedEvent`]s. Anything that
//! renders them is handed an [`EventFormatter`], normally a [`Locale`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::matcher::{Occurrence, ProcessedEvent};

/// Turns matched events into display text.
pub trait EventFormatter {
    fn format_event(&self, event: &ProcessedEvent) -> String;
    fn no_events(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Sq,
    En,
}

const SQ: &[(&str, &str)] = &[
    ("all", "të gjitha"),
    ("history", "histori"),
    ("literature", "literaturë"),
    ("state_holidays", "festa shteti"),
    ("back", "kthehu"),
    ("no_events", "Asnjë ngjarje e rëndësishme në këtë datë."),
    ("back_to_today", "Kthehu te Sot"),
    ("years_ago", "vjet më parë"),
    ("loading", "Duke ngarkuar..."),
];

const EN: &[(&str, &str)] = &[
    ("all", "all"),
    ("history", "history"),
    ("literature", "literature"),
    ("state_holidays", "state holidays"),
    ("back", "back"),
    ("no_events", "No significant events on this date."),
    ("back_to_today", "Back to Today"),
    ("years_ago", "years ago"),
    ("loading", "Loading..."),
];

#[derive(Debug, Clone)]
pub struct Locale {
    language: Language,
    strings: HashMap<&'static str, &'static str>,
}

impl Locale {
    pub fn new(language: Language) -> Self {
        let table = match language {
            Language::Sq => SQ,
            Language::En => EN,
        };
        Locale {
            language,
            strings: table.iter().copied().collect(),
        }
    }

    pub fn albanian() -> Self {
        Self::new(Language::Sq)
    }

    pub fn english() -> Self {
        Self::new(Language::En)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Translated string for `key`, or the key itself when missing.
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        self.strings.get(key).copied().unwrap_or(key)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl EventFormatter for Locale {
    fn format_event(&self, event: &ProcessedEvent) -> String {
        match event.occurrence {
            Occurrence::Dated {
                years_elapsed,
                year,
            } => format!(
                "{} {} ({}): {}",
                years_elapsed,
                self.t("years_ago"),
                year,
                event.text
            ),
            Occurrence::Annual => event.text.clone(),
        }
    }

    fn no_events(&self) -> String {
        self.t("no_events").to_string()
    }
}
