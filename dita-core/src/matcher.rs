//! Date to event matching and ranking.
//!
//! [`EventMatcher::matches`] selects every record of the chosen categories
//! whose month-day equals the query date, drops dated records that have not
//! happened yet relative to the query year, and orders the result: dated
//! events first by years elapsed (oldest first), then annual events in
//! collection order. Output is structured; phrasing is left to an
//! [`EventFormatter`].

use std::cmp::Reverse;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::category::EventCategory;
use crate::dataset::{Dataset, HistoricalEvent};
use crate::event_date::{EventDate, MonthDay};
use crate::locale::EventFormatter;

/// How a matched event relates to the query date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Occurrence {
    Dated { years_elapsed: i32, year: i32 },
    Annual,
}

/// A matched event, built fresh for every lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedEvent {
    pub category: EventCategory,
    #[serde(flatten)]
    pub occurrence: Occurrence,
    pub text: String,
}

impl ProcessedEvent {
    pub fn is_dated(&self) -> bool {
        matches!(self.occurrence, Occurrence::Dated { .. })
    }

    /// Years elapsed for dated events, zero for annual ones.
    pub fn rank_key(&self) -> i32 {
        match self.occurrence {
            Occurrence::Dated { years_elapsed, .. } => years_elapsed,
            Occurrence::Annual => 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EventMatcher<'a> {
    dataset: &'a Dataset,
}

impl<'a> EventMatcher<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        EventMatcher { dataset }
    }

    /// Ranked events for `date` within `category`.
    pub fn matches(&self, date: NaiveDate, category: EventCategory) -> Vec<ProcessedEvent> {
        let month_day = MonthDay::of(&date);
        let year = date.year();

        let mut events: Vec<ProcessedEvent> = self
            .dataset
            .lists(category)
            .flat_map(|(list, records)| {
                records
                    .iter()
                    .filter_map(move |record| process(list, record, month_day, year))
            })
            .collect();

        // Stable: ties keep collection order.
        events.sort_by_key(|event| (!event.is_dated(), Reverse(event.rank_key())));
        events
    }

    /// Display text for `date`: formatted entries separated by a blank line,
    /// or the formatter's "no events" message.
    pub fn lookup(
        &self,
        date: NaiveDate,
        category: EventCategory,
        formatter: &impl EventFormatter,
    ) -> String {
        render(&self.matches(date, category), formatter)
    }
}

/// Join formatted events with a blank line.
pub fn render(events: &[ProcessedEvent], formatter: &impl EventFormatter) -> String {
    if events.is_empty() {
        return formatter.no_events();
    }

    events
        .iter()
        .map(|event| formatter.format_event(event))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn process(
    category: EventCategory,
    record: &HistoricalEvent,
    month_day: MonthDay,
    year: i32,
) -> Option<ProcessedEvent> {
    let date = match EventDate::parse(&record.date) {
        Ok(date) => date,
        Err(e) => {
            debug!(text = %record.text, "skipping record: {e}");
            return None;
        }
    };

    if date.month_day() != month_day {
        return None;
    }

    let occurrence = match date {
        EventDate::Full(event_date) if event_date.year() < year => Occurrence::Dated {
            years_elapsed: year - event_date.year(),
            year: event_date.year(),
        },
        // Has not happened yet relative to the query year.
        EventDate::Full(_) => return None,
        EventDate::Annual(_) => Occurrence::Annual,
    };

    Some(ProcessedEvent {
        category,
        occurrence,
        text: record.text.clone(),
    })
}
