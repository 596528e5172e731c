//! Terminal rendering of lookups.
//!
//! Phrasing comes from the configured [`Locale`]; this module only adds
//! colors around it.

use dita_core::locale::{EventFormatter, Locale};
use dita_core::matcher::{Occurrence, ProcessedEvent};
use dita_core::store::View;
use owo_colors::OwoColorize;

/// Wraps a locale, coloring the "N years ago (YYYY):" clause.
pub struct ColoredFormatter<'a> {
    locale: &'a Locale,
}

impl<'a> ColoredFormatter<'a> {
    pub fn new(locale: &'a Locale) -> Self {
        ColoredFormatter { locale }
    }
}

impl EventFormatter for ColoredFormatter<'_> {
    fn format_event(&self, event: &ProcessedEvent) -> String {
        match event.occurrence {
            Occurrence::Dated {
                years_elapsed,
                year,
            } => {
                let clause = format!(
                    "{} {} ({}):",
                    years_elapsed,
                    self.locale.t("years_ago"),
                    year
                );
                format!("{} {}", clause.bold(), event.text)
            }
            Occurrence::Annual => event.text.green().to_string(),
        }
    }

    fn no_events(&self) -> String {
        self.locale.no_events().dimmed().to_string()
    }
}

/// Header line: date and category label.
pub fn render_header(view: &View, locale: &Locale) -> String {
    let date = view.date.format("%a %-d %b %Y").to_string();
    let category = format!("[{}]", locale.t(view.category.label_key()));
    format!("📅 {} {}", date.bold(), category.dimmed())
}

pub fn render_view(view: &View, locale: &Locale) -> String {
    format!(
        "{}\n\n{}",
        render_header(view, locale),
        view.text(&ColoredFormatter::new(locale))
    )
}
