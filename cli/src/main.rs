mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;

use crate::commands::{
    cmd_clear, cmd_exercise_list, cmd_exercise_log, cmd_export_csv, cmd_export_json,
    cmd_habit_add, cmd_habit_delete, cmd_habit_done, cmd_habit_list, cmd_habit_streak,
    cmd_journal_add, cmd_journal_list, cmd_journal_tags, cmd_meal_add_item, cmd_meal_items,
    cmd_meal_log, cmd_meal_remove_item, cmd_meal_totals, cmd_sleep_list, cmd_sleep_log,
};
use crate::config::Config;
use lifelog_core::db::Database;
use lifelog_core::service::LifelogService;

#[derive(Parser)]
#[command(
    name = "lifelog",
    version,
    about = "A personal, local-first health tracker",
    long_about = "Track habits, sleep, exercise, meals and journal entries in a single local database."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track recurring habits and their completions
    Habit {
        #[command(subcommand)]
        command: HabitCommands,
    },
    /// Log and review sleep
    Sleep {
        #[command(subcommand)]
        command: SleepCommands,
    },
    /// Log and review exercise sessions
    Exercise {
        #[command(subcommand)]
        command: ExerciseCommands,
    },
    /// Log meals and food items
    Meal {
        #[command(subcommand)]
        command: MealCommands,
    },
    /// Keep a daily journal
    Journal {
        #[command(subcommand)]
        command: JournalCommands,
    },
    /// Export all data as JSON or one category as CSV
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Delete all logged data (the schema is kept)
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum HabitCommands {
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        /// Description
        #[arg(long)]
        description: Option<String>,
        /// Icon name
        #[arg(long)]
        icon: Option<String>,
        /// Display color (hex)
        #[arg(long, default_value = "#4A90D9")]
        color: String,
        /// Frequency: daily, weekly, custom
        #[arg(short, long, default_value = "daily")]
        frequency: String,
        /// Target days per week (for weekly/custom habits)
        #[arg(long)]
        target_days: Option<i64>,
        /// Reminder time (HH:MM)
        #[arg(long)]
        reminder: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all habits with their current streaks
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a habit done (or not done) for a date
    Done {
        /// Habit ID
        habit_id: String,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Mark as not completed instead
        #[arg(long)]
        undo: bool,
        /// Optional notes
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the current streak for a habit
    Streak {
        /// Habit ID
        habit_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a habit and its completions
    Delete {
        /// Habit ID
        habit_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SleepCommands {
    /// Log a night of sleep
    Log {
        /// Bedtime (ISO-8601, e.g. 2026-02-17T23:00:00Z)
        bedtime: String,
        /// Wake time (ISO-8601)
        wake_time: String,
        /// Duration in minutes
        #[arg(short, long)]
        duration: i64,
        /// Quality rating 1-5
        #[arg(short, long)]
        quality: i64,
        /// Date the night belongs to (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Optional notes
        #[arg(long)]
        notes: Option<String>,
        /// Comma-separated factors (e.g. "caffeine,late screen")
        #[arg(long)]
        factors: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List sleep entries, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ExerciseCommands {
    /// Log an exercise session
    Log {
        /// Activity type (e.g. running, yoga)
        activity: String,
        /// Duration in minutes
        duration: i64,
        /// Intensity: low, moderate, high, very_high
        #[arg(short, long, default_value = "moderate")]
        intensity: String,
        /// Calories burned
        #[arg(long)]
        calories: Option<i64>,
        /// Average heart rate
        #[arg(long)]
        heart_rate: Option<i64>,
        /// Distance in kilometers
        #[arg(long)]
        distance: Option<f64>,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Optional notes
        #[arg(long)]
        notes: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List exercise sessions, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MealCommands {
    /// Log a meal
    Log {
        /// Meal type: breakfast, lunch, dinner, snack
        meal_type: String,
        /// Meal name
        #[arg(long)]
        name: Option<String>,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the food items of a meal
    Items {
        /// Meal ID
        meal_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a food item to a meal (meal totals update immediately)
    AddItem {
        /// Meal ID
        meal_id: String,
        /// Food name
        name: String,
        /// Quantity
        #[arg(short, long, default_value = "1")]
        quantity: f64,
        /// Unit (e.g. g, serving)
        #[arg(short, long, default_value = "serving")]
        unit: String,
        /// Calories
        #[arg(long)]
        calories: f64,
        /// Protein in grams
        #[arg(long)]
        protein: Option<f64>,
        /// Carbs in grams
        #[arg(long)]
        carbs: Option<f64>,
        /// Fat in grams
        #[arg(long)]
        fat: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a food item (meal totals update immediately)
    RemoveItem {
        /// Food item ID
        item_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show summed nutrition totals for a date
    Totals {
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum JournalCommands {
    /// Add a journal entry
    Add {
        /// Entry text
        content: String,
        /// Title
        #[arg(long)]
        title: Option<String>,
        /// Mood rating 1-5
        #[arg(long)]
        mood: Option<i64>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Date (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List journal entries, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every tag used across all entries
    Tags {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ExportCommands {
    /// Write a full JSON snapshot
    Json {
        /// Output file (default: stdout)
        #[arg(short, long, value_name = "PATH")]
        out: Option<std::path::PathBuf>,
    },
    /// Write one category as CSV
    Csv {
        /// Category: habits, sleep, exercise, nutrition, journal
        category: String,
        /// Output directory (default: current directory)
        #[arg(short, long, value_name = "DIR")]
        out: Option<std::path::PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let service = LifelogService::new(Database::open(&config.db_path)?);

    match cli.command {
        Commands::Habit { command } => match command {
            HabitCommands::Add {
                name,
                description,
                icon,
                color,
                frequency,
                target_days,
                reminder,
                json,
            } => cmd_habit_add(
                &service,
                &name,
                description,
                icon,
                color,
                &frequency,
                target_days,
                reminder,
                json,
            ),
            HabitCommands::List { json } => cmd_habit_list(&service, json),
            HabitCommands::Done {
                habit_id,
                date,
                undo,
                notes,
                json,
            } => cmd_habit_done(&service, &habit_id, date, undo, notes, json),
            HabitCommands::Streak { habit_id, json } => cmd_habit_streak(&service, &habit_id, json),
            HabitCommands::Delete { habit_id, json } => cmd_habit_delete(&service, &habit_id, json),
        },
        Commands::Sleep { command } => match command {
            SleepCommands::Log {
                bedtime,
                wake_time,
                duration,
                quality,
                date,
                notes,
                factors,
                json,
            } => cmd_sleep_log(
                &service, &bedtime, &wake_time, duration, quality, date, notes, factors, json,
            ),
            SleepCommands::List { json } => cmd_sleep_list(&service, json),
        },
        Commands::Exercise { command } => match command {
            ExerciseCommands::Log {
                activity,
                duration,
                intensity,
                calories,
                heart_rate,
                distance,
                date,
                notes,
                json,
            } => cmd_exercise_log(
                &service, &activity, duration, &intensity, calories, heart_rate, distance, date,
                notes, json,
            ),
            ExerciseCommands::List { json } => cmd_exercise_list(&service, json),
        },
        Commands::Meal { command } => match command {
            MealCommands::Log {
                meal_type,
                name,
                date,
                json,
            } => cmd_meal_log(&service, &meal_type, name, date, json),
            MealCommands::Items { meal_id, json } => cmd_meal_items(&service, &meal_id, json),
            MealCommands::AddItem {
                meal_id,
                name,
                quantity,
                unit,
                calories,
                protein,
                carbs,
                fat,
                json,
            } => cmd_meal_add_item(
                &service, &meal_id, &name, quantity, &unit, calories, protein, carbs, fat, json,
            ),
            MealCommands::RemoveItem { item_id, json } => {
                cmd_meal_remove_item(&service, &item_id, json)
            }
            MealCommands::Totals { date, json } => cmd_meal_totals(&service, date, json),
        },
        Commands::Journal { command } => match command {
            JournalCommands::Add {
                content,
                title,
                mood,
                tags,
                date,
                json,
            } => cmd_journal_add(&service, &content, title, mood, tags, date, json),
            JournalCommands::List { json } => cmd_journal_list(&service, json),
            JournalCommands::Tags { json } => cmd_journal_tags(&service, json),
        },
        Commands::Export { command } => match command {
            ExportCommands::Json { out } => cmd_export_json(&service, out.as_deref()),
            ExportCommands::Csv { category, out } => {
                cmd_export_csv(&service, &category, out.as_deref())
            }
        },
        Commands::Clear { yes } => cmd_clear(&service, yes),
    }
}
