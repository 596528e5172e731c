use anyhow::Result;
use chrono::NaiveDate;
use dita_core::EventCategory;
use dita_core::config::DitaConfig;
use dita_core::store::Store;

use crate::render::render_view;

pub fn run(config: &DitaConfig, date: NaiveDate, category: EventCategory) -> Result<()> {
    let locale = config.locale();
    let store = Store::new(config.dataset()?, date, category);

    println!("{}", render_view(&store.view(), &locale));

    Ok(())
}
