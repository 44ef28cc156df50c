//! Snapshot and flat-file encoders. Both read through the repository
//! methods only; nothing here touches SQL.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::db::Database;
use crate::models::{
    ExerciseSession, Habit, HabitCompletion, JournalEntry, Meal, SleepEntry, serialize_list_field,
};

/// Bumped when the snapshot layout changes shape.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Everything in the store as one versioned document, one collection per
/// domain. Collection names are camelCase in the emitted JSON.
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub version: String,
    pub habits: Vec<Habit>,
    #[serde(rename = "habitCompletions")]
    pub habit_completions: Vec<HabitCompletion>,
    pub sleep: Vec<SleepEntry>,
    pub exercise: Vec<ExerciseSession>,
    pub meals: Vec<Meal>,
    pub journal: Vec<JournalEntry>,
}

pub fn export_snapshot(db: &Database) -> Result<Snapshot> {
    Ok(Snapshot {
        version: SNAPSHOT_VERSION.to_string(),
        habits: db.list_habits()?,
        habit_completions: db.list_completions()?,
        sleep: db.list_sleep_entries()?,
        exercise: db.list_exercise_sessions()?,
        meals: db.list_meals()?,
        journal: db.list_journal_entries()?,
    })
}

pub fn snapshot_json(db: &Database) -> Result<String> {
    let snapshot = export_snapshot(db)?;
    serde_json::to_string_pretty(&snapshot).context("Failed to encode snapshot")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportCategory {
    Habits,
    Sleep,
    Exercise,
    Nutrition,
    Journal,
}

impl ExportCategory {
    pub const ALL: [ExportCategory; 5] = [
        ExportCategory::Habits,
        ExportCategory::Sleep,
        ExportCategory::Exercise,
        ExportCategory::Nutrition,
        ExportCategory::Journal,
    ];

    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            ExportCategory::Habits => "habits.csv",
            ExportCategory::Sleep => "sleep.csv",
            ExportCategory::Exercise => "exercise.csv",
            ExportCategory::Nutrition => "nutrition.csv",
            ExportCategory::Journal => "journal.csv",
        }
    }

    fn headers(self) -> &'static [&'static str] {
        match self {
            ExportCategory::Habits => &[
                "id",
                "name",
                "description",
                "icon",
                "color",
                "frequency",
                "target_days_per_week",
                "reminder_time",
                "created_at",
                "updated_at",
            ],
            ExportCategory::Sleep => &[
                "id",
                "date",
                "bedtime",
                "wake_time",
                "duration_minutes",
                "quality",
                "notes",
                "factors",
                "created_at",
                "updated_at",
            ],
            ExportCategory::Exercise => &[
                "id",
                "date",
                "type",
                "duration_minutes",
                "intensity",
                "calories_burned",
                "avg_heart_rate",
                "distance_km",
                "notes",
                "created_at",
                "updated_at",
            ],
            ExportCategory::Nutrition => &[
                "id",
                "date",
                "meal_type",
                "name",
                "total_calories",
                "total_protein",
                "total_carbs",
                "total_fat",
                "total_fiber",
                "photo_uri",
                "ai_analysis",
                "created_at",
                "updated_at",
            ],
            ExportCategory::Journal => &[
                "id",
                "date",
                "title",
                "content",
                "mood",
                "tags",
                "is_scanned",
                "original_image_uri",
                "ocr_confidence",
                "created_at",
                "updated_at",
            ],
        }
    }
}

// Unset values become an empty quoted field, never the text "null" or
// "undefined".

fn opt_text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn opt_number<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn bool_text(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

/// List columns are written as their stored JSON text, so commas and
/// newlines inside the list stay within one quoted field.
fn list_text(value: Option<&[String]>) -> String {
    value.map(serialize_list_field).unwrap_or_default()
}

/// One category's records as RFC 4180 text: a fixed header row, every
/// field double-quoted, embedded quotes doubled.
pub fn export_csv(db: &Database, category: ExportCategory) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    writer.write_record(category.headers())?;

    match category {
        ExportCategory::Habits => {
            for habit in db.list_habits()? {
                writer.write_record(&[
                    habit.id,
                    habit.name,
                    opt_text(habit.description.as_deref()),
                    opt_text(habit.icon.as_deref()),
                    habit.color,
                    habit.frequency,
                    opt_number(habit.target_days_per_week),
                    opt_text(habit.reminder_time.as_deref()),
                    habit.created_at,
                    habit.updated_at,
                ])?;
            }
        }
        ExportCategory::Sleep => {
            for entry in db.list_sleep_entries()? {
                writer.write_record(&[
                    entry.id,
                    entry.date,
                    entry.bedtime,
                    entry.wake_time,
                    entry.duration_minutes.to_string(),
                    entry.quality.to_string(),
                    opt_text(entry.notes.as_deref()),
                    list_text(entry.factors.as_deref()),
                    entry.created_at,
                    entry.updated_at,
                ])?;
            }
        }
        ExportCategory::Exercise => {
            for session in db.list_exercise_sessions()? {
                writer.write_record(&[
                    session.id,
                    session.date,
                    session.exercise_type,
                    session.duration_minutes.to_string(),
                    session.intensity,
                    opt_number(session.calories_burned),
                    opt_number(session.avg_heart_rate),
                    opt_number(session.distance_km),
                    opt_text(session.notes.as_deref()),
                    session.created_at,
                    session.updated_at,
                ])?;
            }
        }
        ExportCategory::Nutrition => {
            for meal in db.list_meals()? {
                writer.write_record(&[
                    meal.id,
                    meal.date,
                    meal.meal_type,
                    opt_text(meal.name.as_deref()),
                    meal.total_calories.to_string(),
                    opt_number(meal.total_protein),
                    opt_number(meal.total_carbs),
                    opt_number(meal.total_fat),
                    opt_number(meal.total_fiber),
                    opt_text(meal.photo_uri.as_deref()),
                    opt_text(meal.ai_analysis.as_deref()),
                    meal.created_at,
                    meal.updated_at,
                ])?;
            }
        }
        ExportCategory::Journal => {
            for entry in db.list_journal_entries()? {
                writer.write_record(&[
                    entry.id,
                    entry.date,
                    opt_text(entry.title.as_deref()),
                    entry.content,
                    opt_number(entry.mood),
                    list_text(entry.tags.as_deref()),
                    bool_text(entry.is_scanned),
                    opt_text(entry.original_image_uri.as_deref()),
                    opt_number(entry.ocr_confidence),
                    entry.created_at,
                    entry.updated_at,
                ])?;
            }
        }
    }

    writer.flush()?;
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("Failed to finish CSV buffer: {err}"))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}
