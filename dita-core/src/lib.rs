//! Core types for dita.
//!
//! This crate is shared by the `dita` CLI and `dita-worker`:
//! - `dataset` and `matcher` for looking up events on a date
//! - `locale` for phrasing lookup results
//! - `cache` for the versioned on-disk cache
//! - `protocol` for CLI-worker messages

pub mod cache;
pub mod category;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod event_date;
pub mod locale;
pub mod matcher;
pub mod protocol;
pub mod store;

pub use category::EventCategory;
pub use dataset::{Dataset, HistoricalEvent};
pub use error::{DitaError, DitaResult};
pub use matcher::{EventMatcher, Occurrence, ProcessedEvent};
