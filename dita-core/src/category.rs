//! Event category filter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DitaError;

/// Which source lists a lookup draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Historical,
    Literary,
    #[serde(alias = "state_holiday", alias = "state-holiday")]
    Holiday,
    /// Union of the three lists.
    #[default]
    All,
}

impl EventCategory {
    pub const ALL: [EventCategory; 4] = [
        EventCategory::All,
        EventCategory::Historical,
        EventCategory::Literary,
        EventCategory::Holiday,
    ];

    /// Whether events from `list` are part of this category.
    pub fn includes(self, list: EventCategory) -> bool {
        self == EventCategory::All || self == list
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Historical => "historical",
            EventCategory::Literary => "literary",
            EventCategory::Holiday => "holiday",
            EventCategory::All => "all",
        }
    }

    /// Key into the locale's translation table.
    pub fn label_key(&self) -> &'static str {
        match self {
            EventCategory::Historical => "history",
            EventCategory::Literary => "literature",
            EventCategory::Holiday => "state_holidays",
            EventCategory::All => "all",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = DitaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(EventCategory::All),
            "historical" | "history" | "histori" => Ok(EventCategory::Historical),
            "literary" | "literature" | "literatur" => Ok(EventCategory::Literary),
            "holiday" | "state-holiday" | "state_holiday" | "fest_e_shtetit" => {
                Ok(EventCategory::Holiday)
            }
            _ => Err(DitaError::InvalidCategory(s.to_string())),
        }
    }
}
