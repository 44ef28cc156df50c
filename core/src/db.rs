use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, params};
use tracing::info;
use uuid::Uuid;

use crate::migrations;
use crate::models::{
    ExercisePatch, ExerciseSession, FoodItem, Habit, HabitCompletion, HabitPatch, JournalEntry,
    JournalPatch, Meal, MealPatch, NewCompletion, NewExerciseSession, NewFoodItem, NewHabit,
    NewJournalEntry, NewMeal, NewSleepEntry, NutritionTotals, SleepEntry, SleepPatch,
    parse_list_field, serialize_list_field,
};

/// Single opened connection to the embedded store. One handle per process;
/// pass it by reference to whoever needs it instead of stashing a global.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        // Cascades are declared in the schema; SQLite only honors them with
        // foreign keys switched on per connection.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::apply_pending(&conn)?;
        Ok(Database { conn })
    }

    /// Release the handle. A later `open` rebuilds it from scratch.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, err)| anyhow::Error::from(err))
    }

    pub fn applied_migrations(&self) -> Result<Vec<String>> {
        migrations::applied_migrations(&self.conn)
    }

    /// Truncate every domain table. The migration ledger is untouched and
    /// the handle stays open.
    pub fn clear_all_data(&self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM food_items;
             DELETE FROM meals;
             DELETE FROM habit_completions;
             DELETE FROM habits;
             DELETE FROM sleep_entries;
             DELETE FROM exercise_sessions;
             DELETE FROM journal_entries;",
        )?;
        info!("cleared all domain data");
        Ok(())
    }

    fn now() -> String {
        Utc::now().to_rfc3339()
    }

    fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn date_str(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    // --- Row mapping helpers ---

    fn habit_from_row(row: &rusqlite::Row) -> rusqlite::Result<Habit> {
        Ok(Habit {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            icon: row.get(3)?,
            color: row.get(4)?,
            frequency: row.get(5)?,
            target_days_per_week: row.get(6)?,
            reminder_time: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn completion_from_row(row: &rusqlite::Row) -> rusqlite::Result<HabitCompletion> {
        Ok(HabitCompletion {
            id: row.get(0)?,
            habit_id: row.get(1)?,
            date: row.get(2)?,
            completed: row.get(3)?,
            completed_at: row.get(4)?,
            notes: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn sleep_from_row(row: &rusqlite::Row) -> rusqlite::Result<SleepEntry> {
        let factors: Option<String> = row.get(7)?;
        Ok(SleepEntry {
            id: row.get(0)?,
            date: row.get(1)?,
            bedtime: row.get(2)?,
            wake_time: row.get(3)?,
            duration_minutes: row.get(4)?,
            quality: row.get(5)?,
            notes: row.get(6)?,
            factors: factors.as_deref().and_then(parse_list_field),
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn exercise_from_row(row: &rusqlite::Row) -> rusqlite::Result<ExerciseSession> {
        Ok(ExerciseSession {
            id: row.get(0)?,
            date: row.get(1)?,
            exercise_type: row.get(2)?,
            duration_minutes: row.get(3)?,
            intensity: row.get(4)?,
            calories_burned: row.get(5)?,
            notes: row.get(6)?,
            avg_heart_rate: row.get(7)?,
            distance_km: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn meal_from_row(row: &rusqlite::Row) -> rusqlite::Result<Meal> {
        Ok(Meal {
            id: row.get(0)?,
            date: row.get(1)?,
            meal_type: row.get(2)?,
            name: row.get(3)?,
            total_calories: row.get(4)?,
            total_protein: row.get(5)?,
            total_carbs: row.get(6)?,
            total_fat: row.get(7)?,
            total_fiber: row.get(8)?,
            photo_uri: row.get(9)?,
            ai_analysis: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }

    fn food_item_from_row(row: &rusqlite::Row) -> rusqlite::Result<FoodItem> {
        Ok(FoodItem {
            id: row.get(0)?,
            meal_id: row.get(1)?,
            name: row.get(2)?,
            quantity: row.get(3)?,
            unit: row.get(4)?,
            calories: row.get(5)?,
            protein: row.get(6)?,
            carbs: row.get(7)?,
            fat: row.get(8)?,
            is_ai_generated: row.get(9)?,
            confidence: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }

    fn journal_from_row(row: &rusqlite::Row) -> rusqlite::Result<JournalEntry> {
        let tags: Option<String> = row.get(5)?;
        Ok(JournalEntry {
            id: row.get(0)?,
            date: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            mood: row.get(4)?,
            tags: tags.as_deref().and_then(parse_list_field),
            is_scanned: row.get(6)?,
            original_image_uri: row.get(7)?,
            ocr_confidence: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    // --- Habits ---

    pub fn insert_habit(&self, habit: &NewHabit) -> Result<Habit> {
        let now = Self::now();
        let id = Self::new_id();
        self.conn.execute(
            "INSERT INTO habits (id, name, description, icon, color, frequency, target_days_per_week, reminder_time, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id,
                habit.name,
                habit.description,
                habit.icon,
                habit.color,
                habit.frequency,
                habit.target_days_per_week,
                habit.reminder_time,
                now,
                now,
            ],
        )?;
        Ok(Habit {
            id,
            name: habit.name.clone(),
            description: habit.description.clone(),
            icon: habit.icon.clone(),
            color: habit.color.clone(),
            frequency: habit.frequency.clone(),
            target_days_per_week: habit.target_days_per_week,
            reminder_time: habit.reminder_time.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub fn get_habit(&self, id: &str) -> Result<Option<Habit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, icon, color, frequency, target_days_per_week, reminder_time, created_at, updated_at
             FROM habits WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::habit_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list_habits(&self) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, icon, color, frequency, target_days_per_week, reminder_time, created_at, updated_at
             FROM habits ORDER BY created_at DESC",
        )?;
        let habits = stmt
            .query_map([], Self::habit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    /// Writes only the fields present in the patch; always refreshes
    /// `updated_at`. Returns rows affected — zero when the id is unknown.
    pub fn update_habit(&self, id: &str, patch: &HabitPatch) -> Result<usize> {
        let now = Self::now();
        let affected = self.conn.execute(
            "UPDATE habits SET updated_at = ?1 WHERE id = ?2",
            params![now, id],
        )?;
        if let Some(ref name) = patch.name {
            self.conn.execute(
                "UPDATE habits SET name = ?1 WHERE id = ?2",
                params![name, id],
            )?;
        }
        if let Some(ref description) = patch.description {
            self.conn.execute(
                "UPDATE habits SET description = ?1 WHERE id = ?2",
                params![description, id],
            )?;
        }
        if let Some(ref icon) = patch.icon {
            self.conn.execute(
                "UPDATE habits SET icon = ?1 WHERE id = ?2",
                params![icon, id],
            )?;
        }
        if let Some(ref color) = patch.color {
            self.conn.execute(
                "UPDATE habits SET color = ?1 WHERE id = ?2",
                params![color, id],
            )?;
        }
        if let Some(ref frequency) = patch.frequency {
            self.conn.execute(
                "UPDATE habits SET frequency = ?1 WHERE id = ?2",
                params![frequency, id],
            )?;
        }
        if let Some(ref target) = patch.target_days_per_week {
            self.conn.execute(
                "UPDATE habits SET target_days_per_week = ?1 WHERE id = ?2",
                params![target, id],
            )?;
        }
        if let Some(ref reminder_time) = patch.reminder_time {
            self.conn.execute(
                "UPDATE habits SET reminder_time = ?1 WHERE id = ?2",
                params![reminder_time, id],
            )?;
        }
        Ok(affected)
    }

    /// Completions go with the habit via the schema's cascade rule.
    pub fn delete_habit(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // --- Habit completions ---

    /// Keyed by the unique (habit_id, date) pair: a repeated call with the
    /// same key updates the existing row in place instead of duplicating it.
    pub fn upsert_completion(&self, completion: &NewCompletion) -> Result<HabitCompletion> {
        let now = Self::now();
        let id = Self::new_id();
        let date_str = Self::date_str(completion.date);
        self.conn.execute(
            "INSERT INTO habit_completions (id, habit_id, date, completed, completed_at, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             ON CONFLICT (habit_id, date) DO UPDATE SET
                completed = excluded.completed,
                completed_at = excluded.completed_at,
                notes = excluded.notes,
                updated_at = excluded.updated_at",
            params![
                id,
                completion.habit_id,
                date_str,
                completion.completed,
                completion.completed_at,
                completion.notes,
                now,
            ],
        )?;
        // The surviving row keeps its original id on conflict, so read back
        // by the natural key.
        self.get_completion(&completion.habit_id, completion.date)?
            .context("Completion row missing after upsert")
    }

    pub fn get_completion(
        &self,
        habit_id: &str,
        date: NaiveDate,
    ) -> Result<Option<HabitCompletion>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, date, completed, completed_at, notes, created_at, updated_at
             FROM habit_completions WHERE habit_id = ?1 AND date = ?2",
        )?;
        let mut rows = stmt.query(params![habit_id, Self::date_str(date)])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::completion_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn get_completions_for_habit(&self, habit_id: &str) -> Result<Vec<HabitCompletion>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, date, completed, completed_at, notes, created_at, updated_at
             FROM habit_completions WHERE habit_id = ?1 ORDER BY date DESC",
        )?;
        let completions = stmt
            .query_map(params![habit_id], Self::completion_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(completions)
    }

    /// Inclusive on both boundary dates, chronological order.
    pub fn get_completions_for_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HabitCompletion>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, date, completed, completed_at, notes, created_at, updated_at
             FROM habit_completions WHERE date >= ?1 AND date <= ?2 ORDER BY date",
        )?;
        let completions = stmt
            .query_map(
                params![Self::date_str(start), Self::date_str(end)],
                Self::completion_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(completions)
    }

    pub fn list_completions(&self) -> Result<Vec<HabitCompletion>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, date, completed, completed_at, notes, created_at, updated_at
             FROM habit_completions ORDER BY date DESC",
        )?;
        let completions = stmt
            .query_map([], Self::completion_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(completions)
    }

    /// Dates with a true completion at or before `upto`, newest first.
    /// Feeds the backward streak walk.
    pub fn get_completed_dates(&self, habit_id: &str, upto: NaiveDate) -> Result<Vec<NaiveDate>> {
        let mut stmt = self.conn.prepare(
            "SELECT date FROM habit_completions
             WHERE habit_id = ?1 AND completed = 1 AND date <= ?2
             ORDER BY date DESC",
        )?;
        let raw = stmt
            .query_map(params![habit_id, Self::date_str(upto)], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(raw
            .iter()
            .filter_map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .collect())
    }

    // --- Sleep entries ---

    pub fn insert_sleep_entry(&self, entry: &NewSleepEntry) -> Result<SleepEntry> {
        let now = Self::now();
        let id = Self::new_id();
        let date_str = Self::date_str(entry.date);
        let factors_raw = entry.factors.as_deref().map(serialize_list_field);
        self.conn
            .execute(
                "INSERT INTO sleep_entries (id, date, bedtime, wake_time, duration_minutes, quality, notes, factors, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    id,
                    date_str,
                    entry.bedtime,
                    entry.wake_time,
                    entry.duration_minutes,
                    entry.quality,
                    entry.notes,
                    factors_raw,
                    now,
                    now,
                ],
            )
            .with_context(|| format!("Failed to insert sleep entry for {date_str}"))?;
        Ok(SleepEntry {
            id,
            date: date_str,
            bedtime: entry.bedtime.clone(),
            wake_time: entry.wake_time.clone(),
            duration_minutes: entry.duration_minutes,
            quality: entry.quality,
            notes: entry.notes.clone(),
            factors: entry.factors.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub fn get_sleep_entry(&self, id: &str) -> Result<Option<SleepEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, bedtime, wake_time, duration_minutes, quality, notes, factors, created_at, updated_at
             FROM sleep_entries WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::sleep_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// One entry per calendar date (unique column), so a date lookup is a
    /// single optional row.
    pub fn get_sleep_entry_for_date(&self, date: NaiveDate) -> Result<Option<SleepEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, bedtime, wake_time, duration_minutes, quality, notes, factors, created_at, updated_at
             FROM sleep_entries WHERE date = ?1",
        )?;
        let mut rows = stmt.query(params![Self::date_str(date)])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::sleep_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list_sleep_entries(&self) -> Result<Vec<SleepEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, bedtime, wake_time, duration_minutes, quality, notes, factors, created_at, updated_at
             FROM sleep_entries ORDER BY date DESC",
        )?;
        let entries = stmt
            .query_map([], Self::sleep_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn get_sleep_entries_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SleepEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, bedtime, wake_time, duration_minutes, quality, notes, factors, created_at, updated_at
             FROM sleep_entries WHERE date >= ?1 AND date <= ?2 ORDER BY date",
        )?;
        let entries = stmt
            .query_map(
                params![Self::date_str(start), Self::date_str(end)],
                Self::sleep_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn update_sleep_entry(&self, id: &str, patch: &SleepPatch) -> Result<usize> {
        let now = Self::now();
        let affected = self.conn.execute(
            "UPDATE sleep_entries SET updated_at = ?1 WHERE id = ?2",
            params![now, id],
        )?;
        if let Some(ref bedtime) = patch.bedtime {
            self.conn.execute(
                "UPDATE sleep_entries SET bedtime = ?1 WHERE id = ?2",
                params![bedtime, id],
            )?;
        }
        if let Some(ref wake_time) = patch.wake_time {
            self.conn.execute(
                "UPDATE sleep_entries SET wake_time = ?1 WHERE id = ?2",
                params![wake_time, id],
            )?;
        }
        if let Some(duration_minutes) = patch.duration_minutes {
            self.conn.execute(
                "UPDATE sleep_entries SET duration_minutes = ?1 WHERE id = ?2",
                params![duration_minutes, id],
            )?;
        }
        if let Some(quality) = patch.quality {
            self.conn.execute(
                "UPDATE sleep_entries SET quality = ?1 WHERE id = ?2",
                params![quality, id],
            )?;
        }
        if let Some(ref notes) = patch.notes {
            self.conn.execute(
                "UPDATE sleep_entries SET notes = ?1 WHERE id = ?2",
                params![notes, id],
            )?;
        }
        if let Some(ref factors) = patch.factors {
            let raw = factors.as_deref().map(serialize_list_field);
            self.conn.execute(
                "UPDATE sleep_entries SET factors = ?1 WHERE id = ?2",
                params![raw, id],
            )?;
        }
        Ok(affected)
    }

    pub fn delete_sleep_entry(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM sleep_entries WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // --- Exercise sessions ---

    pub fn insert_exercise_session(
        &self,
        session: &NewExerciseSession,
    ) -> Result<ExerciseSession> {
        let now = Self::now();
        let id = Self::new_id();
        let date_str = Self::date_str(session.date);
        self.conn.execute(
            "INSERT INTO exercise_sessions (id, date, type, duration_minutes, intensity, calories_burned, notes, avg_heart_rate, distance_km, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                id,
                date_str,
                session.exercise_type,
                session.duration_minutes,
                session.intensity,
                session.calories_burned,
                session.notes,
                session.avg_heart_rate,
                session.distance_km,
                now,
                now,
            ],
        )?;
        Ok(ExerciseSession {
            id,
            date: date_str,
            exercise_type: session.exercise_type.clone(),
            duration_minutes: session.duration_minutes,
            intensity: session.intensity.clone(),
            calories_burned: session.calories_burned,
            notes: session.notes.clone(),
            avg_heart_rate: session.avg_heart_rate,
            distance_km: session.distance_km,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub fn get_exercise_session(&self, id: &str) -> Result<Option<ExerciseSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, type, duration_minutes, intensity, calories_burned, notes, avg_heart_rate, distance_km, created_at, updated_at
             FROM exercise_sessions WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::exercise_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list_exercise_sessions(&self) -> Result<Vec<ExerciseSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, type, duration_minutes, intensity, calories_burned, notes, avg_heart_rate, distance_km, created_at, updated_at
             FROM exercise_sessions ORDER BY date DESC, created_at DESC",
        )?;
        let sessions = stmt
            .query_map([], Self::exercise_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }

    /// Multiple sessions per date are allowed, returned in logging order.
    pub fn get_exercise_sessions_for_date(&self, date: NaiveDate) -> Result<Vec<ExerciseSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, type, duration_minutes, intensity, calories_burned, notes, avg_heart_rate, distance_km, created_at, updated_at
             FROM exercise_sessions WHERE date = ?1 ORDER BY created_at",
        )?;
        let sessions = stmt
            .query_map(params![Self::date_str(date)], Self::exercise_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }

    pub fn get_exercise_sessions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExerciseSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, type, duration_minutes, intensity, calories_burned, notes, avg_heart_rate, distance_km, created_at, updated_at
             FROM exercise_sessions WHERE date >= ?1 AND date <= ?2 ORDER BY date",
        )?;
        let sessions = stmt
            .query_map(
                params![Self::date_str(start), Self::date_str(end)],
                Self::exercise_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }

    pub fn update_exercise_session(&self, id: &str, patch: &ExercisePatch) -> Result<usize> {
        let now = Self::now();
        let affected = self.conn.execute(
            "UPDATE exercise_sessions SET updated_at = ?1 WHERE id = ?2",
            params![now, id],
        )?;
        if let Some(ref exercise_type) = patch.exercise_type {
            self.conn.execute(
                "UPDATE exercise_sessions SET type = ?1 WHERE id = ?2",
                params![exercise_type, id],
            )?;
        }
        if let Some(duration_minutes) = patch.duration_minutes {
            self.conn.execute(
                "UPDATE exercise_sessions SET duration_minutes = ?1 WHERE id = ?2",
                params![duration_minutes, id],
            )?;
        }
        if let Some(ref intensity) = patch.intensity {
            self.conn.execute(
                "UPDATE exercise_sessions SET intensity = ?1 WHERE id = ?2",
                params![intensity, id],
            )?;
        }
        if let Some(ref calories_burned) = patch.calories_burned {
            self.conn.execute(
                "UPDATE exercise_sessions SET calories_burned = ?1 WHERE id = ?2",
                params![calories_burned, id],
            )?;
        }
        if let Some(ref notes) = patch.notes {
            self.conn.execute(
                "UPDATE exercise_sessions SET notes = ?1 WHERE id = ?2",
                params![notes, id],
            )?;
        }
        if let Some(ref avg_heart_rate) = patch.avg_heart_rate {
            self.conn.execute(
                "UPDATE exercise_sessions SET avg_heart_rate = ?1 WHERE id = ?2",
                params![avg_heart_rate, id],
            )?;
        }
        if let Some(ref distance_km) = patch.distance_km {
            self.conn.execute(
                "UPDATE exercise_sessions SET distance_km = ?1 WHERE id = ?2",
                params![distance_km, id],
            )?;
        }
        Ok(affected)
    }

    pub fn delete_exercise_session(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM exercise_sessions WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // --- Meals ---

    pub fn insert_meal(&self, meal: &NewMeal) -> Result<Meal> {
        let now = Self::now();
        let id = Self::new_id();
        let date_str = Self::date_str(meal.date);
        self.conn.execute(
            "INSERT INTO meals (id, date, meal_type, name, total_calories, photo_uri, ai_analysis, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?8)",
            params![
                id,
                date_str,
                meal.meal_type,
                meal.name,
                meal.photo_uri,
                meal.ai_analysis,
                now,
                now,
            ],
        )?;
        Ok(Meal {
            id,
            date: date_str,
            meal_type: meal.meal_type.clone(),
            name: meal.name.clone(),
            total_calories: 0.0,
            total_protein: None,
            total_carbs: None,
            total_fat: None,
            total_fiber: None,
            photo_uri: meal.photo_uri.clone(),
            ai_analysis: meal.ai_analysis.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub fn get_meal(&self, id: &str) -> Result<Option<Meal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, meal_type, name, total_calories, total_protein, total_carbs, total_fat, total_fiber, photo_uri, ai_analysis, created_at, updated_at
             FROM meals WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::meal_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list_meals(&self) -> Result<Vec<Meal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, meal_type, name, total_calories, total_protein, total_carbs, total_fat, total_fiber, photo_uri, ai_analysis, created_at, updated_at
             FROM meals ORDER BY date DESC, created_at DESC",
        )?;
        let meals = stmt
            .query_map([], Self::meal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(meals)
    }

    pub fn get_meals_for_date(&self, date: NaiveDate) -> Result<Vec<Meal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, meal_type, name, total_calories, total_protein, total_carbs, total_fat, total_fiber, photo_uri, ai_analysis, created_at, updated_at
             FROM meals WHERE date = ?1 ORDER BY created_at",
        )?;
        let meals = stmt
            .query_map(params![Self::date_str(date)], Self::meal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(meals)
    }

    pub fn get_meals_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Meal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, meal_type, name, total_calories, total_protein, total_carbs, total_fat, total_fiber, photo_uri, ai_analysis, created_at, updated_at
             FROM meals WHERE date >= ?1 AND date <= ?2 ORDER BY date",
        )?;
        let meals = stmt
            .query_map(
                params![Self::date_str(start), Self::date_str(end)],
                Self::meal_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(meals)
    }

    pub fn update_meal(&self, id: &str, patch: &MealPatch) -> Result<usize> {
        let now = Self::now();
        let affected = self.conn.execute(
            "UPDATE meals SET updated_at = ?1 WHERE id = ?2",
            params![now, id],
        )?;
        if let Some(ref meal_type) = patch.meal_type {
            self.conn.execute(
                "UPDATE meals SET meal_type = ?1 WHERE id = ?2",
                params![meal_type, id],
            )?;
        }
        if let Some(ref name) = patch.name {
            self.conn.execute(
                "UPDATE meals SET name = ?1 WHERE id = ?2",
                params![name, id],
            )?;
        }
        if let Some(ref photo_uri) = patch.photo_uri {
            self.conn.execute(
                "UPDATE meals SET photo_uri = ?1 WHERE id = ?2",
                params![photo_uri, id],
            )?;
        }
        if let Some(ref ai_analysis) = patch.ai_analysis {
            self.conn.execute(
                "UPDATE meals SET ai_analysis = ?1 WHERE id = ?2",
                params![ai_analysis, id],
            )?;
        }
        Ok(affected)
    }

    /// Food items go with the meal via the schema's cascade rule.
    pub fn delete_meal(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM meals WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // --- Food items ---

    pub fn insert_food_item(&self, meal_id: &str, item: &NewFoodItem) -> Result<FoodItem> {
        let now = Self::now();
        let id = Self::new_id();
        self.conn.execute(
            "INSERT INTO food_items (id, meal_id, name, quantity, unit, calories, protein, carbs, fat, is_ai_generated, confidence, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                id,
                meal_id,
                item.name,
                item.quantity,
                item.unit,
                item.calories,
                item.protein,
                item.carbs,
                item.fat,
                item.is_ai_generated,
                item.confidence,
                now,
                now,
            ],
        )?;
        Ok(FoodItem {
            id,
            meal_id: meal_id.to_string(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
            calories: item.calories,
            protein: item.protein,
            carbs: item.carbs,
            fat: item.fat,
            is_ai_generated: item.is_ai_generated,
            confidence: item.confidence,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub fn get_food_item(&self, id: &str) -> Result<Option<FoodItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, meal_id, name, quantity, unit, calories, protein, carbs, fat, is_ai_generated, confidence, created_at, updated_at
             FROM food_items WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::food_item_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn get_food_items(&self, meal_id: &str) -> Result<Vec<FoodItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, meal_id, name, quantity, unit, calories, protein, carbs, fat, is_ai_generated, confidence, created_at, updated_at
             FROM food_items WHERE meal_id = ?1 ORDER BY created_at",
        )?;
        let items = stmt
            .query_map(params![meal_id], Self::food_item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn delete_food_item(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM food_items WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Rewrite a meal's derived totals as the sum over its current food
    /// items, missing macros counting as zero. Must run directly after any
    /// food-item insert or delete so the next meal read is consistent.
    pub fn recalculate_meal_totals(&self, meal_id: &str) -> Result<()> {
        let (calories, protein, carbs, fat): (f64, f64, f64, f64) = self.conn.query_row(
            "SELECT COALESCE(SUM(calories), 0),
                    COALESCE(SUM(COALESCE(protein, 0)), 0),
                    COALESCE(SUM(COALESCE(carbs, 0)), 0),
                    COALESCE(SUM(COALESCE(fat, 0)), 0)
             FROM food_items WHERE meal_id = ?1",
            params![meal_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;
        self.conn.execute(
            "UPDATE meals SET total_calories = ?1, total_protein = ?2, total_carbs = ?3, total_fat = ?4, updated_at = ?5
             WHERE id = ?6",
            params![calories, protein, carbs, fat, Self::now(), meal_id],
        )?;
        Ok(())
    }

    /// Sum of meal totals for one date. A date with no meals yields the
    /// all-zero totals, never an absent value.
    pub fn get_daily_totals(&self, date: NaiveDate) -> Result<NutritionTotals> {
        let totals = self.conn.query_row(
            "SELECT COALESCE(SUM(total_calories), 0),
                    COALESCE(SUM(COALESCE(total_protein, 0)), 0),
                    COALESCE(SUM(COALESCE(total_carbs, 0)), 0),
                    COALESCE(SUM(COALESCE(total_fat, 0)), 0)
             FROM meals WHERE date = ?1",
            params![Self::date_str(date)],
            |row| {
                Ok(NutritionTotals {
                    calories: row.get(0)?,
                    protein: row.get(1)?,
                    carbs: row.get(2)?,
                    fat: row.get(3)?,
                })
            },
        )?;
        Ok(totals)
    }

    // --- Journal entries ---

    pub fn insert_journal_entry(&self, entry: &NewJournalEntry) -> Result<JournalEntry> {
        let now = Self::now();
        let id = Self::new_id();
        let date_str = Self::date_str(entry.date);
        let tags_raw = entry.tags.as_deref().map(serialize_list_field);
        self.conn.execute(
            "INSERT INTO journal_entries (id, date, title, content, mood, tags, is_scanned, original_image_uri, ocr_confidence, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                id,
                date_str,
                entry.title,
                entry.content,
                entry.mood,
                tags_raw,
                entry.is_scanned,
                entry.original_image_uri,
                entry.ocr_confidence,
                now,
                now,
            ],
        )?;
        Ok(JournalEntry {
            id,
            date: date_str,
            title: entry.title.clone(),
            content: entry.content.clone(),
            mood: entry.mood,
            tags: entry.tags.clone(),
            is_scanned: entry.is_scanned,
            original_image_uri: entry.original_image_uri.clone(),
            ocr_confidence: entry.ocr_confidence,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub fn get_journal_entry(&self, id: &str) -> Result<Option<JournalEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, title, content, mood, tags, is_scanned, original_image_uri, ocr_confidence, created_at, updated_at
             FROM journal_entries WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::journal_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list_journal_entries(&self) -> Result<Vec<JournalEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, title, content, mood, tags, is_scanned, original_image_uri, ocr_confidence, created_at, updated_at
             FROM journal_entries ORDER BY date DESC, created_at DESC",
        )?;
        let entries = stmt
            .query_map([], Self::journal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn get_journal_entries_for_date(&self, date: NaiveDate) -> Result<Vec<JournalEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, title, content, mood, tags, is_scanned, original_image_uri, ocr_confidence, created_at, updated_at
             FROM journal_entries WHERE date = ?1 ORDER BY created_at",
        )?;
        let entries = stmt
            .query_map(params![Self::date_str(date)], Self::journal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn get_journal_entries_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<JournalEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, title, content, mood, tags, is_scanned, original_image_uri, ocr_confidence, created_at, updated_at
             FROM journal_entries WHERE date >= ?1 AND date <= ?2 ORDER BY date",
        )?;
        let entries = stmt
            .query_map(
                params![Self::date_str(start), Self::date_str(end)],
                Self::journal_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn update_journal_entry(&self, id: &str, patch: &JournalPatch) -> Result<usize> {
        let now = Self::now();
        let affected = self.conn.execute(
            "UPDATE journal_entries SET updated_at = ?1 WHERE id = ?2",
            params![now, id],
        )?;
        if let Some(ref title) = patch.title {
            self.conn.execute(
                "UPDATE journal_entries SET title = ?1 WHERE id = ?2",
                params![title, id],
            )?;
        }
        if let Some(ref content) = patch.content {
            self.conn.execute(
                "UPDATE journal_entries SET content = ?1 WHERE id = ?2",
                params![content, id],
            )?;
        }
        if let Some(ref mood) = patch.mood {
            self.conn.execute(
                "UPDATE journal_entries SET mood = ?1 WHERE id = ?2",
                params![mood, id],
            )?;
        }
        if let Some(ref tags) = patch.tags {
            let raw = tags.as_deref().map(serialize_list_field);
            self.conn.execute(
                "UPDATE journal_entries SET tags = ?1 WHERE id = ?2",
                params![raw, id],
            )?;
        }
        Ok(affected)
    }

    pub fn delete_journal_entry(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM journal_entries WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Union of parsed tag lists across all entries, de-duplicated and
    /// sorted ascending. Rows whose tag text fails to parse are skipped.
    pub fn get_all_tags(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT tags FROM journal_entries WHERE tags IS NOT NULL")?;
        let raw_lists = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut tags: std::collections::BTreeSet<String> = std::collections::BTreeSet::new();
        for raw in &raw_lists {
            if let Some(list) = parse_list_field(raw) {
                tags.extend(list);
            }
        }
        Ok(tags.into_iter().collect())
    }

    /// Insert a row with arbitrary stored tag text. Used by tests to
    /// simulate a legacy or corrupted column value.
    #[cfg(test)]
    fn insert_journal_entry_raw_tags(&self, date: &str, content: &str, tags: &str) -> Result<()> {
        let now = Self::now();
        self.conn.execute(
            "INSERT INTO journal_entries (id, date, content, tags, is_scanned, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
            params![Self::new_id(), date, content, tags, now],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_habit() -> NewHabit {
        NewHabit {
            name: "Morning run".to_string(),
            description: Some("5k before work".to_string()),
            icon: Some("runner".to_string()),
            color: "#FF5733".to_string(),
            frequency: "daily".to_string(),
            target_days_per_week: None,
            reminder_time: Some("06:30".to_string()),
        }
    }

    fn sample_sleep(day: &str) -> NewSleepEntry {
        NewSleepEntry {
            date: date(day),
            bedtime: format!("{day}T22:30:00Z"),
            wake_time: "2026-02-16T06:30:00Z".to_string(),
            duration_minutes: 480,
            quality: 4,
            notes: None,
            factors: Some(vec!["caffeine".to_string(), "late screen".to_string()]),
        }
    }

    fn sample_meal(day: &str) -> NewMeal {
        NewMeal {
            date: date(day),
            meal_type: "lunch".to_string(),
            name: Some("Chicken salad".to_string()),
            photo_uri: None,
            ai_analysis: None,
        }
    }

    fn sample_item(name: &str, calories: f64) -> NewFoodItem {
        NewFoodItem {
            name: name.to_string(),
            quantity: 1.0,
            unit: "serving".to_string(),
            calories,
            protein: Some(20.0),
            carbs: Some(10.0),
            fat: Some(5.0),
            is_ai_generated: false,
            confidence: None,
        }
    }

    fn sample_journal(day: &str, tags: Option<Vec<String>>) -> NewJournalEntry {
        NewJournalEntry {
            date: date(day),
            title: Some("Notes".to_string()),
            content: "Long day.".to_string(),
            mood: Some(3),
            tags,
            is_scanned: false,
            original_image_uri: None,
            ocr_confidence: None,
        }
    }

    // --- Habits ---

    #[test]
    fn test_insert_and_get_habit() {
        let db = Database::open_in_memory().unwrap();
        let habit = db.insert_habit(&sample_habit()).unwrap();

        assert!(!habit.id.is_empty());
        assert_eq!(habit.name, "Morning run");
        assert_eq!(habit.frequency, "daily");
        assert!(!habit.created_at.is_empty());

        let fetched = db.get_habit(&habit.id).unwrap().unwrap();
        assert_eq!(fetched.id, habit.id);
        assert_eq!(fetched.description.as_deref(), Some("5k before work"));
        assert_eq!(fetched.reminder_time.as_deref(), Some("06:30"));
    }

    #[test]
    fn test_get_habit_not_found_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_habit("missing").unwrap().is_none());
    }

    #[test]
    fn test_update_habit_partial_fields() {
        let db = Database::open_in_memory().unwrap();
        let habit = db.insert_habit(&sample_habit()).unwrap();

        let affected = db
            .update_habit(
                &habit.id,
                &HabitPatch {
                    name: Some("Evening run".to_string()),
                    description: Some(None),
                    ..HabitPatch::default()
                },
            )
            .unwrap();
        assert_eq!(affected, 1);

        let updated = db.get_habit(&habit.id).unwrap().unwrap();
        assert_eq!(updated.name, "Evening run");
        assert!(updated.description.is_none());
        // Untouched fields keep their values.
        assert_eq!(updated.color, "#FF5733");
        assert_eq!(updated.reminder_time.as_deref(), Some("06:30"));
    }

    #[test]
    fn test_update_unknown_habit_reports_zero_rows() {
        let db = Database::open_in_memory().unwrap();
        let affected = db
            .update_habit(
                "missing",
                &HabitPatch {
                    name: Some("x".to_string()),
                    ..HabitPatch::default()
                },
            )
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[test]
    fn test_delete_habit_cascades_completions() {
        let db = Database::open_in_memory().unwrap();
        let habit = db.insert_habit(&sample_habit()).unwrap();
        db.upsert_completion(&NewCompletion {
            habit_id: habit.id.clone(),
            date: date("2026-02-16"),
            completed: true,
            completed_at: None,
            notes: None,
        })
        .unwrap();

        assert!(db.delete_habit(&habit.id).unwrap());
        assert!(db.get_habit(&habit.id).unwrap().is_none());
        assert!(db.get_completions_for_habit(&habit.id).unwrap().is_empty());
    }

    #[test]
    fn test_habit_frequency_enforced_by_store() {
        let db = Database::open_in_memory().unwrap();
        let result = db.insert_habit(&NewHabit {
            frequency: "monthly".to_string(),
            ..sample_habit()
        });
        assert!(result.is_err());
    }

    // --- Completions ---

    #[test]
    fn test_upsert_completion_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        let habit = db.insert_habit(&sample_habit()).unwrap();

        let first = db
            .upsert_completion(&NewCompletion {
                habit_id: habit.id.clone(),
                date: date("2026-02-16"),
                completed: true,
                completed_at: Some("2026-02-16T07:00:00Z".to_string()),
                notes: None,
            })
            .unwrap();
        assert!(first.completed);

        let second = db
            .upsert_completion(&NewCompletion {
                habit_id: habit.id.clone(),
                date: date("2026-02-16"),
                completed: false,
                completed_at: None,
                notes: Some("skipped".to_string()),
            })
            .unwrap();

        // Same row updated in place: the id survives, the value is latest.
        assert_eq!(second.id, first.id);
        assert!(!second.completed);
        assert_eq!(second.notes.as_deref(), Some("skipped"));
        assert_eq!(db.get_completions_for_habit(&habit.id).unwrap().len(), 1);
    }

    #[test]
    fn test_completion_range_is_boundary_inclusive() {
        let db = Database::open_in_memory().unwrap();
        let habit = db.insert_habit(&sample_habit()).unwrap();
        for day in ["2026-02-14", "2026-02-15", "2026-02-18", "2026-02-19"] {
            db.upsert_completion(&NewCompletion {
                habit_id: habit.id.clone(),
                date: date(day),
                completed: true,
                completed_at: None,
                notes: None,
            })
            .unwrap();
        }

        let range = db
            .get_completions_for_date_range(date("2026-02-15"), date("2026-02-18"))
            .unwrap();
        let dates: Vec<&str> = range.iter().map(|c| c.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-02-15", "2026-02-18"]);
    }

    #[test]
    fn test_get_completed_dates_descending_and_filtered() {
        let db = Database::open_in_memory().unwrap();
        let habit = db.insert_habit(&sample_habit()).unwrap();
        for (day, completed) in [
            ("2026-02-14", true),
            ("2026-02-15", false),
            ("2026-02-16", true),
            ("2026-02-20", true), // after the cutoff
        ] {
            db.upsert_completion(&NewCompletion {
                habit_id: habit.id.clone(),
                date: date(day),
                completed,
                completed_at: None,
                notes: None,
            })
            .unwrap();
        }

        let dates = db
            .get_completed_dates(&habit.id, date("2026-02-18"))
            .unwrap();
        assert_eq!(dates, vec![date("2026-02-16"), date("2026-02-14")]);
    }

    // --- Sleep ---

    #[test]
    fn test_insert_sleep_entry_round_trips_factors() {
        let db = Database::open_in_memory().unwrap();
        let entry = db.insert_sleep_entry(&sample_sleep("2026-02-15")).unwrap();

        let fetched = db.get_sleep_entry(&entry.id).unwrap().unwrap();
        assert_eq!(fetched.duration_minutes, 480);
        assert_eq!(fetched.quality, 4);
        assert_eq!(
            fetched.factors,
            Some(vec!["caffeine".to_string(), "late screen".to_string()])
        );
    }

    #[test]
    fn test_sleep_date_is_unique() {
        let db = Database::open_in_memory().unwrap();
        db.insert_sleep_entry(&sample_sleep("2026-02-15")).unwrap();
        // Second entry for the same day violates the unique constraint.
        assert!(db.insert_sleep_entry(&sample_sleep("2026-02-15")).is_err());
    }

    #[test]
    fn test_get_sleep_entry_for_date() {
        let db = Database::open_in_memory().unwrap();
        db.insert_sleep_entry(&sample_sleep("2026-02-15")).unwrap();

        assert!(
            db.get_sleep_entry_for_date(date("2026-02-15"))
                .unwrap()
                .is_some()
        );
        assert!(
            db.get_sleep_entry_for_date(date("2026-02-16"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_sleep_range_inclusive_and_chronological() {
        let db = Database::open_in_memory().unwrap();
        for day in ["2026-02-18", "2026-02-15", "2026-02-14", "2026-02-16"] {
            db.insert_sleep_entry(&NewSleepEntry {
                factors: None,
                ..sample_sleep(day)
            })
            .unwrap();
        }

        let range = db
            .get_sleep_entries_in_range(date("2026-02-15"), date("2026-02-18"))
            .unwrap();
        let dates: Vec<&str> = range.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-02-15", "2026-02-16", "2026-02-18"]);

        // List view is newest first.
        let listed = db.list_sleep_entries().unwrap();
        assert_eq!(listed[0].date, "2026-02-18");
    }

    #[test]
    fn test_update_sleep_entry_clears_factors() {
        let db = Database::open_in_memory().unwrap();
        let entry = db.insert_sleep_entry(&sample_sleep("2026-02-15")).unwrap();

        db.update_sleep_entry(
            &entry.id,
            &SleepPatch {
                quality: Some(2),
                factors: Some(None),
                ..SleepPatch::default()
            },
        )
        .unwrap();

        let updated = db.get_sleep_entry(&entry.id).unwrap().unwrap();
        assert_eq!(updated.quality, 2);
        assert!(updated.factors.is_none());
    }

    #[test]
    fn test_malformed_factors_read_as_absent() {
        let db = Database::open_in_memory().unwrap();
        let entry = db.insert_sleep_entry(&sample_sleep("2026-02-15")).unwrap();
        db.conn
            .execute(
                "UPDATE sleep_entries SET factors = 'not-a-list' WHERE id = ?1",
                params![entry.id],
            )
            .unwrap();

        // A corrupted list column degrades to None instead of failing the read.
        let fetched = db.get_sleep_entry(&entry.id).unwrap().unwrap();
        assert!(fetched.factors.is_none());
        assert_eq!(fetched.duration_minutes, 480);
    }

    // --- Exercise ---

    #[test]
    fn test_multiple_exercise_sessions_per_date() {
        let db = Database::open_in_memory().unwrap();
        for (kind, minutes) in [("running", 30), ("yoga", 45)] {
            db.insert_exercise_session(&NewExerciseSession {
                date: date("2026-02-15"),
                exercise_type: kind.to_string(),
                duration_minutes: minutes,
                intensity: "moderate".to_string(),
                calories_burned: None,
                notes: None,
                avg_heart_rate: None,
                distance_km: None,
            })
            .unwrap();
        }

        let sessions = db
            .get_exercise_sessions_for_date(date("2026-02-15"))
            .unwrap();
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_exercise_intensity_enforced_by_store() {
        let db = Database::open_in_memory().unwrap();
        let result = db.insert_exercise_session(&NewExerciseSession {
            date: date("2026-02-15"),
            exercise_type: "running".to_string(),
            duration_minutes: 30,
            intensity: "extreme".to_string(),
            calories_burned: None,
            notes: None,
            avg_heart_rate: None,
            distance_km: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_exercise_range_is_boundary_inclusive() {
        let db = Database::open_in_memory().unwrap();
        for day in ["2026-02-14", "2026-02-15", "2026-02-18", "2026-02-19"] {
            db.insert_exercise_session(&NewExerciseSession {
                date: date(day),
                exercise_type: "running".to_string(),
                duration_minutes: 30,
                intensity: "moderate".to_string(),
                calories_burned: None,
                notes: None,
                avg_heart_rate: None,
                distance_km: None,
            })
            .unwrap();
        }

        let range = db
            .get_exercise_sessions_in_range(date("2026-02-15"), date("2026-02-18"))
            .unwrap();
        let dates: Vec<&str> = range.iter().map(|s| s.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-02-15", "2026-02-18"]);
    }

    #[test]
    fn test_update_exercise_session_metrics() {
        let db = Database::open_in_memory().unwrap();
        let session = db
            .insert_exercise_session(&NewExerciseSession {
                date: date("2026-02-15"),
                exercise_type: "running".to_string(),
                duration_minutes: 30,
                intensity: "moderate".to_string(),
                calories_burned: Some(250),
                notes: None,
                avg_heart_rate: None,
                distance_km: None,
            })
            .unwrap();

        db.update_exercise_session(
            &session.id,
            &ExercisePatch {
                intensity: Some("high".to_string()),
                distance_km: Some(Some(5.2)),
                calories_burned: Some(None),
                ..ExercisePatch::default()
            },
        )
        .unwrap();

        let updated = db.get_exercise_session(&session.id).unwrap().unwrap();
        assert_eq!(updated.intensity, "high");
        assert_eq!(updated.distance_km, Some(5.2));
        assert!(updated.calories_burned.is_none());
    }

    // --- Meals and food items ---

    #[test]
    fn test_new_meal_has_zero_totals() {
        let db = Database::open_in_memory().unwrap();
        let meal = db.insert_meal(&sample_meal("2026-02-15")).unwrap();
        assert!(meal.total_calories.abs() < f64::EPSILON);
        assert!(meal.total_protein.is_none());
    }

    #[test]
    fn test_recalculate_meal_totals_after_add_and_delete() {
        let db = Database::open_in_memory().unwrap();
        let meal = db.insert_meal(&sample_meal("2026-02-15")).unwrap();

        let item1 = db
            .insert_food_item(&meal.id, &sample_item("Chicken", 250.0))
            .unwrap();
        db.recalculate_meal_totals(&meal.id).unwrap();
        db.insert_food_item(&meal.id, &sample_item("Rice", 200.0))
            .unwrap();
        db.recalculate_meal_totals(&meal.id).unwrap();

        let fetched = db.get_meal(&meal.id).unwrap().unwrap();
        assert!((fetched.total_calories - 450.0).abs() < 0.01);
        assert!((fetched.total_protein.unwrap() - 40.0).abs() < 0.01);

        assert!(db.delete_food_item(&item1.id).unwrap());
        db.recalculate_meal_totals(&meal.id).unwrap();

        let after = db.get_meal(&meal.id).unwrap().unwrap();
        assert!((after.total_calories - 200.0).abs() < 0.01);
    }

    #[test]
    fn test_recalculate_treats_missing_macros_as_zero() {
        let db = Database::open_in_memory().unwrap();
        let meal = db.insert_meal(&sample_meal("2026-02-15")).unwrap();
        db.insert_food_item(
            &meal.id,
            &NewFoodItem {
                protein: None,
                carbs: None,
                fat: None,
                ..sample_item("Mystery bar", 180.0)
            },
        )
        .unwrap();
        db.recalculate_meal_totals(&meal.id).unwrap();

        let fetched = db.get_meal(&meal.id).unwrap().unwrap();
        assert!((fetched.total_calories - 180.0).abs() < 0.01);
        assert!(fetched.total_protein.unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn test_delete_meal_cascades_food_items() {
        let db = Database::open_in_memory().unwrap();
        let meal = db.insert_meal(&sample_meal("2026-02-15")).unwrap();
        let item = db
            .insert_food_item(&meal.id, &sample_item("Chicken", 250.0))
            .unwrap();

        assert!(db.delete_meal(&meal.id).unwrap());
        assert!(db.get_food_item(&item.id).unwrap().is_none());
    }

    #[test]
    fn test_daily_totals_default_to_zero() {
        let db = Database::open_in_memory().unwrap();
        let totals = db.get_daily_totals(date("2026-02-15")).unwrap();
        assert_eq!(totals, NutritionTotals::default());
    }

    #[test]
    fn test_daily_totals_sum_across_meals() {
        let db = Database::open_in_memory().unwrap();
        let lunch = db.insert_meal(&sample_meal("2026-02-15")).unwrap();
        db.insert_food_item(&lunch.id, &sample_item("Chicken", 250.0))
            .unwrap();
        db.recalculate_meal_totals(&lunch.id).unwrap();

        let dinner = db
            .insert_meal(&NewMeal {
                meal_type: "dinner".to_string(),
                ..sample_meal("2026-02-15")
            })
            .unwrap();
        db.insert_food_item(&dinner.id, &sample_item("Pasta", 600.0))
            .unwrap();
        db.recalculate_meal_totals(&dinner.id).unwrap();

        // A meal on another day must not leak in.
        let other = db.insert_meal(&sample_meal("2026-02-16")).unwrap();
        db.insert_food_item(&other.id, &sample_item("Toast", 120.0))
            .unwrap();
        db.recalculate_meal_totals(&other.id).unwrap();

        let totals = db.get_daily_totals(date("2026-02-15")).unwrap();
        assert!((totals.calories - 850.0).abs() < 0.01);
        assert!((totals.protein - 40.0).abs() < 0.01);
    }

    #[test]
    fn test_meal_range_is_boundary_inclusive() {
        let db = Database::open_in_memory().unwrap();
        for day in ["2026-02-14", "2026-02-15", "2026-02-18", "2026-02-19"] {
            db.insert_meal(&sample_meal(day)).unwrap();
        }

        let range = db
            .get_meals_in_range(date("2026-02-15"), date("2026-02-18"))
            .unwrap();
        let dates: Vec<&str> = range.iter().map(|m| m.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-02-15", "2026-02-18"]);
    }

    #[test]
    fn test_meal_type_enforced_by_store() {
        let db = Database::open_in_memory().unwrap();
        let result = db.insert_meal(&NewMeal {
            meal_type: "brunch".to_string(),
            ..sample_meal("2026-02-15")
        });
        assert!(result.is_err());
    }

    // --- Journal ---

    #[test]
    fn test_journal_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let entry = db
            .insert_journal_entry(&sample_journal(
                "2026-02-15",
                Some(vec!["work".to_string()]),
            ))
            .unwrap();

        let fetched = db.get_journal_entry(&entry.id).unwrap().unwrap();
        assert_eq!(fetched.content, "Long day.");
        assert_eq!(fetched.mood, Some(3));
        assert_eq!(fetched.tags, Some(vec!["work".to_string()]));
        assert!(!fetched.is_scanned);
    }

    #[test]
    fn test_get_all_tags_dedup_and_sorted() {
        let db = Database::open_in_memory().unwrap();
        db.insert_journal_entry(&sample_journal(
            "2026-02-14",
            Some(vec!["work".to_string(), "ideas".to_string()]),
        ))
        .unwrap();
        db.insert_journal_entry(&sample_journal(
            "2026-02-15",
            Some(vec!["ideas".to_string(), "personal".to_string()]),
        ))
        .unwrap();
        db.insert_journal_entry(&sample_journal("2026-02-16", None))
            .unwrap();

        let tags = db.get_all_tags().unwrap();
        assert_eq!(tags, vec!["ideas", "personal", "work"]);
    }

    #[test]
    fn test_get_all_tags_skips_malformed_rows() {
        let db = Database::open_in_memory().unwrap();
        db.insert_journal_entry(&sample_journal(
            "2026-02-14",
            Some(vec!["work".to_string()]),
        ))
        .unwrap();
        db.insert_journal_entry_raw_tags("2026-02-15", "corrupted", "{{{not json")
            .unwrap();

        let tags = db.get_all_tags().unwrap();
        assert_eq!(tags, vec!["work"]);
    }

    #[test]
    fn test_update_journal_entry_patch() {
        let db = Database::open_in_memory().unwrap();
        let entry = db
            .insert_journal_entry(&sample_journal(
                "2026-02-15",
                Some(vec!["work".to_string()]),
            ))
            .unwrap();

        db.update_journal_entry(
            &entry.id,
            &JournalPatch {
                content: Some("Better day.".to_string()),
                mood: Some(Some(5)),
                tags: Some(None),
                ..JournalPatch::default()
            },
        )
        .unwrap();

        let updated = db.get_journal_entry(&entry.id).unwrap().unwrap();
        assert_eq!(updated.content, "Better day.");
        assert_eq!(updated.mood, Some(5));
        assert!(updated.tags.is_none());
    }

    #[test]
    fn test_journal_range_is_boundary_inclusive() {
        let db = Database::open_in_memory().unwrap();
        for day in ["2026-02-14", "2026-02-15", "2026-02-18", "2026-02-19"] {
            db.insert_journal_entry(&sample_journal(day, None)).unwrap();
        }

        let range = db
            .get_journal_entries_in_range(date("2026-02-15"), date("2026-02-18"))
            .unwrap();
        let dates: Vec<&str> = range.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-02-15", "2026-02-18"]);
    }

    #[test]
    fn test_journal_list_newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.insert_journal_entry(&sample_journal("2026-02-14", None))
            .unwrap();
        db.insert_journal_entry(&sample_journal("2026-02-16", None))
            .unwrap();

        let listed = db.list_journal_entries().unwrap();
        assert_eq!(listed[0].date, "2026-02-16");
        assert_eq!(listed[1].date, "2026-02-14");
    }

    // --- Lifecycle ---

    #[test]
    fn test_clear_all_data_preserves_ledger() {
        let db = Database::open_in_memory().unwrap();
        let habit = db.insert_habit(&sample_habit()).unwrap();
        db.insert_sleep_entry(&sample_sleep("2026-02-15")).unwrap();
        db.insert_journal_entry(&sample_journal("2026-02-15", None))
            .unwrap();

        db.clear_all_data().unwrap();

        assert!(db.list_habits().unwrap().is_empty());
        assert!(db.list_sleep_entries().unwrap().is_empty());
        assert!(db.list_journal_entries().unwrap().is_empty());
        assert!(db.get_habit(&habit.id).unwrap().is_none());
        // The ledger is untouched, so the handle stays usable as-is.
        assert_eq!(
            db.applied_migrations().unwrap().len(),
            crate::migrations::MIGRATIONS.len()
        );
        db.insert_habit(&sample_habit()).unwrap();
    }

    #[test]
    fn test_close_releases_handle() {
        let db = Database::open_in_memory().unwrap();
        db.insert_habit(&sample_habit()).unwrap();
        db.close().unwrap();
    }
}
