use anyhow::Result;
use chrono::NaiveDate;
use dialoguer::{Input, Select};
use dita_core::EventCategory;
use dita_core::config::DitaConfig;
use dita_core::locale::Locale;
use dita_core::store::{Store, StoreCommand};

use crate::commands::parse_date;
use crate::render::render_view;

enum Action {
    Previous,
    Next,
    Today,
    Category,
    PickDate,
    Quit,
}

/// Interactive day-by-day navigation.
pub fn run(config: &DitaConfig, date: NaiveDate, category: EventCategory) -> Result<()> {
    let locale = config.locale();
    let today = chrono::Local::now().date_naive();

    let mut store = Store::new(config.dataset()?, today, category);
    let mut view = store.dispatch(StoreCommand::SetDate(date));

    loop {
        println!("\n{}\n", render_view(&view, &locale));

        let mut actions = vec![("← previous day".to_string(), Action::Previous)];
        actions.push(("next day →".to_string(), Action::Next));
        if !view.is_today(store.today()) {
            actions.push((locale.t("back_to_today").to_string(), Action::Today));
        }
        actions.push(("category".to_string(), Action::Category));
        actions.push(("pick date".to_string(), Action::PickDate));
        actions.push(("quit".to_string(), Action::Quit));

        let labels: Vec<&str> = actions.iter().map(|(label, _)| label.as_str()).collect();
        let selection = Select::new().items(&labels).default(0).interact()?;

        let command = match actions[selection].1 {
            Action::Previous => StoreCommand::PreviousDay,
            Action::Next => StoreCommand::NextDay,
            Action::Today => StoreCommand::Today,
            Action::Category => StoreCommand::SetCategory(pick_category(&locale, store.category())?),
            Action::PickDate => StoreCommand::SetDate(pick_date(store.today())?),
            Action::Quit => return Ok(()),
        };
        view = store.dispatch(command);
    }
}

fn pick_category(locale: &Locale, current: EventCategory) -> Result<EventCategory> {
    let labels: Vec<&str> = EventCategory::ALL
        .iter()
        .map(|category| locale.t(category.label_key()))
        .collect();
    let default = EventCategory::ALL
        .iter()
        .position(|category| *category == current)
        .unwrap_or(0);

    let selection = Select::new()
        .items(&labels)
        .default(default)
        .interact()?;

    Ok(EventCategory::ALL[selection])
}

fn pick_date(today: NaiveDate) -> Result<NaiveDate> {
    let input: String = Input::new()
        .with_prompt("Date (YYYY-MM-DD)")
        .validate_with(|input: &String| -> Result<(), String> {
            parse_date(input, today)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()?;

    parse_date(&input, today)
}
