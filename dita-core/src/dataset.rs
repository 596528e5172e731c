//! The static event dataset.
//!
//! Three ordered lists of `{date, text}` records. The dataset is read-only:
//! lookups borrow it and never mutate it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::category::EventCategory;
use crate::error::{DitaError, DitaResult};
use crate::event_date::{EventDate, MonthDay};

static BUILTIN_DATASET: &str = include_str!("../data/events.toml");

/// A single dataset record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalEvent {
    /// `YYYY-MM-DD` or `MM-DD`.
    pub date: String,
    #[serde(alias = "event")]
    pub text: String,
}

impl HistoricalEvent {
    pub fn new(date: impl Into<String>, text: impl Into<String>) -> Self {
        HistoricalEvent {
            date: date.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, alias = "histori")]
    pub historical: Vec<HistoricalEvent>,
    #[serde(default, alias = "literatur")]
    pub literary: Vec<HistoricalEvent>,
    #[serde(default, alias = "fest_e_shtetit")]
    pub holiday: Vec<HistoricalEvent>,
}

impl Dataset {
    /// The dataset shipped with dita.
    pub fn builtin() -> DitaResult<Self> {
        toml::from_str(BUILTIN_DATASET).map_err(|e| DitaError::Dataset(e.to_string()))
    }

    /// Load a dataset file. `.json` files are read as JSON, anything else as TOML.
    pub fn load(path: &Path) -> DitaResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(content.as_bytes())
        } else {
            toml::from_str(&content)
                .map_err(|e| DitaError::Dataset(format!("{}: {e}", path.display())))
        }
    }

    pub fn from_json(bytes: &[u8]) -> DitaResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| DitaError::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> DitaResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| DitaError::Serialization(e.to_string()))
    }

    /// Source lists selected by `category`, in collection order.
    pub fn lists(
        &self,
        category: EventCategory,
    ) -> impl Iterator<Item = (EventCategory, &[HistoricalEvent])> {
        [
            (EventCategory::Historical, self.historical.as_slice()),
            (EventCategory::Literary, self.literary.as_slice()),
            (EventCategory::Holiday, self.holiday.as_slice()),
        ]
        .into_iter()
        .filter(move |(list, _)| category.includes(*list))
    }

    /// First state holiday recurring on `month_day`.
    pub fn holiday_on(&self, month_day: MonthDay) -> Option<&HistoricalEvent> {
        self.holiday.iter().find(|event| {
            matches!(EventDate::parse(&event.date), Ok(EventDate::Annual(md)) if md == month_day)
        })
    }

    pub fn len(&self) -> usize {
        self.historical.len() + self.literary.len() + self.holiday.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
