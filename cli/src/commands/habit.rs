use anyhow::Result;
use chrono::{Local, Utc};
use serde_json::json;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use lifelog_core::models::{NewCompletion, NewHabit};
use lifelog_core::service::LifelogService;

use super::helpers::{opt_display, parse_date, require_rows, short_id, truncate};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_habit_add(
    service: &LifelogService,
    name: &str,
    description: Option<String>,
    icon: Option<String>,
    color: String,
    frequency: &str,
    target_days: Option<i64>,
    reminder: Option<String>,
    json: bool,
) -> Result<()> {
    let habit = service.create_habit(NewHabit {
        name: name.to_string(),
        description,
        icon,
        color,
        frequency: frequency.to_string(),
        target_days_per_week: target_days,
        reminder_time: reminder,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&habit)?);
        return Ok(());
    }

    let id = &habit.id;
    let name = &habit.name;
    println!("Added habit '{name}' ({id})");
    Ok(())
}

pub(crate) fn cmd_habit_list(service: &LifelogService, json: bool) -> Result<()> {
    let habits = service.list_habits()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&habits)?);
        return Ok(());
    }

    if habits.is_empty() {
        eprintln!("No habits yet. Add one with 'lifelog habit add <name>'");
        return Ok(());
    }

    #[derive(Tabled)]
    struct HabitRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Frequency")]
        frequency: String,
        #[tabled(rename = "Streak")]
        streak: i64,
        #[tabled(rename = "Reminder")]
        reminder: String,
    }

    let today = Local::now().date_naive();
    let mut rows = Vec::with_capacity(habits.len());
    for habit in &habits {
        rows.push(HabitRow {
            id: short_id(&habit.id),
            name: truncate(&habit.name, 30),
            frequency: habit.frequency.clone(),
            streak: service.habit_streak(&habit.id, today)?,
            reminder: opt_display(habit.reminder_time.as_deref()),
        });
    }

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_habit_done(
    service: &LifelogService,
    habit_id: &str,
    date: Option<String>,
    undo: bool,
    notes: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let completed = !undo;
    let completion = service.set_completion(&NewCompletion {
        habit_id: habit_id.to_string(),
        date,
        completed,
        completed_at: completed.then(|| Utc::now().to_rfc3339()),
        notes,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&completion)?);
        return Ok(());
    }

    let verb = if completed { "done" } else { "not done" };
    println!("Marked {habit_id} as {verb} for {date}");
    Ok(())
}

pub(crate) fn cmd_habit_streak(service: &LifelogService, habit_id: &str, json: bool) -> Result<()> {
    if service.get_habit(habit_id)?.is_none() {
        anyhow::bail!("No habit with id {habit_id}");
    }
    let today = Local::now().date_naive();
    let streak = service.habit_streak(habit_id, today)?;

    if json {
        println!("{}", json!({ "habitId": habit_id, "streak": streak }));
        return Ok(());
    }

    let days = if streak == 1 { "day" } else { "days" };
    println!("{streak} {days}");
    Ok(())
}

pub(crate) fn cmd_habit_delete(service: &LifelogService, habit_id: &str, json: bool) -> Result<()> {
    let deleted = service.delete_habit(habit_id)?;
    require_rows(usize::from(deleted), "habit", habit_id)?;

    if json {
        println!("{}", json!({ "deleted": habit_id }));
        return Ok(());
    }

    println!("Deleted habit {habit_id} and its completions");
    Ok(())
}
