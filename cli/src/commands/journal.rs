use anyhow::Result;
use tabled::{Table, Tabled, settings::Style};

use lifelog_core::models::NewJournalEntry;
use lifelog_core::service::LifelogService;

use super::helpers::{opt_display, parse_date, parse_list_flag, short_id, truncate};

pub(crate) fn cmd_journal_add(
    service: &LifelogService,
    content: &str,
    title: Option<String>,
    mood: Option<i64>,
    tags: Option<String>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let entry = service.add_journal_entry(NewJournalEntry {
        date: parse_date(date)?,
        title,
        content: content.to_string(),
        mood,
        tags: parse_list_flag(tags),
        is_scanned: false,
        original_image_uri: None,
        ocr_confidence: None,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    let date = &entry.date;
    let id = &entry.id;
    println!("Added journal entry for {date} ({id})");
    Ok(())
}

pub(crate) fn cmd_journal_list(service: &LifelogService, json: bool) -> Result<()> {
    let entries = service.list_journal_entries()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        eprintln!("No journal entries yet");
        return Ok(());
    }

    #[derive(Tabled)]
    struct EntryRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Mood")]
        mood: String,
        #[tabled(rename = "Tags")]
        tags: String,
    }

    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|e| EntryRow {
            id: short_id(&e.id),
            date: e.date.clone(),
            title: truncate(&opt_display(e.title.as_deref()), 30),
            mood: e.mood.map_or("-".into(), |m| format!("{m}/5")),
            tags: e
                .tags
                .as_ref()
                .map_or_else(|| "-".to_string(), |t| t.join(", ")),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_journal_tags(service: &LifelogService, json: bool) -> Result<()> {
    let tags = service.all_tags()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tags)?);
        return Ok(());
    }

    if tags.is_empty() {
        eprintln!("No tags yet");
        return Ok(());
    }

    for tag in &tags {
        println!("{tag}");
    }
    Ok(())
}
