//! Foreground state: the selected date and category.
//!
//! All changes go through [`Store::dispatch`] with a typed [`StoreCommand`];
//! the store then re-runs the lookup for the new selection.

use chrono::{Days, NaiveDate};

use crate::category::EventCategory;
use crate::dataset::Dataset;
use crate::locale::EventFormatter;
use crate::matcher::{self, EventMatcher, ProcessedEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCommand {
    SetDate(NaiveDate),
    SetCategory(EventCategory),
    NextDay,
    PreviousDay,
    Today,
}

/// What the UI shows for the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub date: NaiveDate,
    pub category: EventCategory,
    pub events: Vec<ProcessedEvent>,
}

impl View {
    pub fn text(&self, formatter: &impl EventFormatter) -> String {
        matcher::render(&self.events, formatter)
    }

    pub fn is_today(&self, today: NaiveDate) -> bool {
        self.date == today
    }
}

pub struct Store {
    dataset: Dataset,
    today: NaiveDate,
    date: NaiveDate,
    category: EventCategory,
}

impl Store {
    pub fn new(dataset: Dataset, today: NaiveDate, category: EventCategory) -> Self {
        Store {
            dataset,
            today,
            date: today,
            category,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn category(&self) -> EventCategory {
        self.category
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn dispatch(&mut self, command: StoreCommand) -> View {
        match command {
            StoreCommand::SetDate(date) => self.date = date,
            StoreCommand::SetCategory(category) => self.category = category,
            // Saturate at the ends of the supported range.
            StoreCommand::NextDay => {
                self.date = self.date.checked_add_days(Days::new(1)).unwrap_or(self.date)
            }
            StoreCommand::PreviousDay => {
                self.date = self.date.checked_sub_days(Days::new(1)).unwrap_or(self.date)
            }
            StoreCommand::Today => self.date = self.today,
        }
        self.view()
    }

    pub fn view(&self) -> View {
        View {
            date: self.date,
            category: self.category,
            events: EventMatcher::new(&self.dataset).matches(self.date, self.category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 27).unwrap()
    }

    fn store() -> Store {
        Store::new(Dataset::builtin().unwrap(), today(), EventCategory::All)
    }

    #[test]
    fn test_navigation_moves_one_day() {
        let mut store = store();

        let view = store.dispatch(StoreCommand::NextDay);
        assert_eq!(view.date, NaiveDate::from_ymd_opt(2024, 11, 28).unwrap());
        assert!(view.events.iter().any(|e| e.text.contains("Flag Day")));

        store.dispatch(StoreCommand::PreviousDay);
        let view = store.dispatch(StoreCommand::PreviousDay);
        assert_eq!(view.date, NaiveDate::from_ymd_opt(2024, 11, 26).unwrap());
    }

    #[test]
    fn test_today_resets_date() {
        let mut store = store();
        store.dispatch(StoreCommand::SetDate(NaiveDate::from_ymd_opt(1999, 3, 24).unwrap()));
        let view = store.dispatch(StoreCommand::Today);
        assert!(view.is_today(today()));
    }

    #[test]
    fn test_set_category_filters_view() {
        let mut store = store();
        store.dispatch(StoreCommand::SetDate(NaiveDate::from_ymd_opt(2024, 11, 28).unwrap()));

        let view = store.dispatch(StoreCommand::SetCategory(EventCategory::Holiday));
        assert_eq!(view.category, EventCategory::Holiday);
        assert_eq!(view.text(&Locale::english()), "Flag Day and Independence Day (Albania)");
    }

    #[test]
    fn test_navigation_saturates_at_max_date() {
        let mut store = store();
        store.dispatch(StoreCommand::SetDate(NaiveDate::MAX));
        let view = store.dispatch(StoreCommand::NextDay);
        assert_eq!(view.date, NaiveDate::MAX);
    }
}
