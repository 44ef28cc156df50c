use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use lifelog_core::models::NewSleepEntry;
use lifelog_core::service::LifelogService;

use super::helpers::{parse_date, parse_list_flag, short_id};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_sleep_log(
    service: &LifelogService,
    bedtime: &str,
    wake_time: &str,
    duration: i64,
    quality: i64,
    date: Option<String>,
    notes: Option<String>,
    factors: Option<String>,
    json: bool,
) -> Result<()> {
    let entry = service.log_sleep(NewSleepEntry {
        date: parse_date(date)?,
        bedtime: bedtime.to_string(),
        wake_time: wake_time.to_string(),
        duration_minutes: duration,
        quality,
        notes,
        factors: parse_list_flag(factors),
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    let date = &entry.date;
    let hours = entry.duration_minutes / 60;
    let minutes = entry.duration_minutes % 60;
    let quality = entry.quality;
    println!("Logged {hours}h{minutes:02}m of sleep for {date} (quality {quality}/5)");
    Ok(())
}

pub(crate) fn cmd_sleep_list(service: &LifelogService, json: bool) -> Result<()> {
    let entries = service.list_sleep_entries()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        eprintln!("No sleep entries yet");
        return Ok(());
    }

    #[derive(Tabled)]
    struct SleepRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Duration")]
        duration: String,
        #[tabled(rename = "Quality")]
        quality: String,
        #[tabled(rename = "Factors")]
        factors: String,
    }

    let rows: Vec<SleepRow> = entries
        .iter()
        .map(|e| SleepRow {
            id: short_id(&e.id),
            date: e.date.clone(),
            duration: format!("{}h{:02}m", e.duration_minutes / 60, e.duration_minutes % 60),
            quality: format!("{}/5", e.quality),
            factors: e
                .factors
                .as_ref()
                .map_or_else(|| "-".to_string(), |f| f.join(", ")),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}
