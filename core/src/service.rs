use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};

use crate::db::Database;
use crate::models::{
    ExercisePatch, ExerciseSession, FoodItem, Habit, HabitCompletion, HabitPatch, JournalEntry,
    JournalPatch, Meal, MealPatch, NewCompletion, NewExerciseSession, NewFoodItem, NewHabit,
    NewJournalEntry, NewMeal, NewSleepEntry, NutritionTotals, SleepEntry, SleepPatch,
    validate_confidence, validate_frequency, validate_intensity, validate_meal_type,
    validate_rating,
};

/// Count of consecutive completed days walking backward from `today`.
///
/// `dates` must be completed-only, at or before `today`, newest first.
/// Today's own absence does not break a streak built from yesterday
/// backward: if the newest date is yesterday, the walk starts there.
#[must_use]
pub fn streak_from_dates(dates: &[NaiveDate], today: NaiveDate) -> i64 {
    let yesterday = today.pred_opt().unwrap_or(today);
    let mut streak = 0;
    let mut expected = today;
    for &date in dates {
        if date == expected {
            streak += 1;
        } else if streak == 0 && date == yesterday {
            streak = 1;
        } else {
            break;
        }
        expected = date.pred_opt().unwrap_or(date);
    }
    streak
}

/// Domain facade over the store: validates input, owns the two-step
/// food-item mutations, and exposes the derived views. Constructed with
/// an already-opened handle so tests can inject an in-memory one.
pub struct LifelogService {
    db: Database,
}

impl LifelogService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::new(Database::open(db_path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    #[must_use]
    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn close(self) -> Result<()> {
        self.db.close()
    }

    pub fn clear_all_data(&self) -> Result<()> {
        self.db.clear_all_data()
    }

    // --- Habits ---

    pub fn create_habit(&self, mut habit: NewHabit) -> Result<Habit> {
        habit.frequency = validate_frequency(&habit.frequency)?;
        self.db.insert_habit(&habit)
    }

    pub fn get_habit(&self, id: &str) -> Result<Option<Habit>> {
        self.db.get_habit(id)
    }

    pub fn list_habits(&self) -> Result<Vec<Habit>> {
        self.db.list_habits()
    }

    pub fn update_habit(&self, id: &str, patch: &HabitPatch) -> Result<usize> {
        let mut patch = patch.clone();
        if let Some(ref frequency) = patch.frequency {
            // Same normalization as the create path, so "Daily" updates too.
            patch.frequency = Some(validate_frequency(frequency)?);
        }
        self.db.update_habit(id, &patch)
    }

    pub fn delete_habit(&self, id: &str) -> Result<bool> {
        self.db.delete_habit(id)
    }

    pub fn set_completion(&self, completion: &NewCompletion) -> Result<HabitCompletion> {
        self.db.upsert_completion(completion)
    }

    pub fn get_completions_for_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HabitCompletion>> {
        self.db.get_completions_for_date_range(start, end)
    }

    /// Backward walk from `today` over the habit's completed dates.
    pub fn habit_streak(&self, habit_id: &str, today: NaiveDate) -> Result<i64> {
        let dates = self.db.get_completed_dates(habit_id, today)?;
        Ok(streak_from_dates(&dates, today))
    }

    /// Completed dates per habit in the inclusive 7-day window ending at
    /// `end`. Incomplete rows are excluded entirely, not kept as false.
    pub fn weekly_completions(
        &self,
        end: NaiveDate,
    ) -> Result<HashMap<String, HashSet<NaiveDate>>> {
        let start = end.checked_sub_days(Days::new(6)).unwrap_or(end);
        let completions = self.db.get_completions_for_date_range(start, end)?;

        let mut by_habit: HashMap<String, HashSet<NaiveDate>> = HashMap::new();
        for completion in completions {
            if !completion.completed {
                continue;
            }
            let Ok(date) = NaiveDate::parse_from_str(&completion.date, "%Y-%m-%d") else {
                continue;
            };
            by_habit.entry(completion.habit_id).or_default().insert(date);
        }
        Ok(by_habit)
    }

    // --- Sleep ---

    pub fn log_sleep(&self, mut entry: NewSleepEntry) -> Result<SleepEntry> {
        entry.quality = validate_rating("quality", entry.quality)?;
        self.db.insert_sleep_entry(&entry)
    }

    pub fn get_sleep_entry_for_date(&self, date: NaiveDate) -> Result<Option<SleepEntry>> {
        self.db.get_sleep_entry_for_date(date)
    }

    pub fn list_sleep_entries(&self) -> Result<Vec<SleepEntry>> {
        self.db.list_sleep_entries()
    }

    pub fn get_sleep_entries_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SleepEntry>> {
        self.db.get_sleep_entries_in_range(start, end)
    }

    pub fn update_sleep_entry(&self, id: &str, patch: &SleepPatch) -> Result<usize> {
        if let Some(quality) = patch.quality {
            validate_rating("quality", quality)?;
        }
        self.db.update_sleep_entry(id, patch)
    }

    pub fn delete_sleep_entry(&self, id: &str) -> Result<bool> {
        self.db.delete_sleep_entry(id)
    }

    // --- Exercise ---

    pub fn log_exercise(&self, mut session: NewExerciseSession) -> Result<ExerciseSession> {
        session.intensity = validate_intensity(&session.intensity)?;
        self.db.insert_exercise_session(&session)
    }

    pub fn list_exercise_sessions(&self) -> Result<Vec<ExerciseSession>> {
        self.db.list_exercise_sessions()
    }

    pub fn get_exercise_sessions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExerciseSession>> {
        self.db.get_exercise_sessions_in_range(start, end)
    }

    pub fn update_exercise_session(&self, id: &str, patch: &ExercisePatch) -> Result<usize> {
        let mut patch = patch.clone();
        if let Some(ref intensity) = patch.intensity {
            patch.intensity = Some(validate_intensity(intensity)?);
        }
        self.db.update_exercise_session(id, &patch)
    }

    pub fn delete_exercise_session(&self, id: &str) -> Result<bool> {
        self.db.delete_exercise_session(id)
    }

    // --- Nutrition ---

    pub fn log_meal(&self, mut meal: NewMeal) -> Result<Meal> {
        meal.meal_type = validate_meal_type(&meal.meal_type)?;
        self.db.insert_meal(&meal)
    }

    pub fn get_meal(&self, id: &str) -> Result<Option<Meal>> {
        self.db.get_meal(id)
    }

    pub fn get_meals_for_date(&self, date: NaiveDate) -> Result<Vec<Meal>> {
        self.db.get_meals_for_date(date)
    }

    pub fn get_meals_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Meal>> {
        self.db.get_meals_in_range(start, end)
    }

    pub fn update_meal(&self, id: &str, patch: &MealPatch) -> Result<usize> {
        let mut patch = patch.clone();
        if let Some(ref meal_type) = patch.meal_type {
            patch.meal_type = Some(validate_meal_type(meal_type)?);
        }
        self.db.update_meal(id, &patch)
    }

    pub fn delete_meal(&self, id: &str) -> Result<bool> {
        self.db.delete_meal(id)
    }

    pub fn get_food_items(&self, meal_id: &str) -> Result<Vec<FoodItem>> {
        self.db.get_food_items(meal_id)
    }

    /// Two-step write: insert the item, then immediately rewrite the meal's
    /// totals so the next meal read is consistent.
    pub fn add_food_item(&self, meal_id: &str, item: NewFoodItem) -> Result<FoodItem> {
        if let Some(confidence) = item.confidence {
            validate_confidence(confidence)?;
        }
        self.db
            .get_meal(meal_id)?
            .with_context(|| format!("No meal with id {meal_id}"))?;
        let inserted = self.db.insert_food_item(meal_id, &item)?;
        self.db.recalculate_meal_totals(meal_id)?;
        Ok(inserted)
    }

    /// Two-step delete mirroring [`Self::add_food_item`]. Returns false when
    /// the item does not exist; the meal is untouched in that case.
    pub fn delete_food_item(&self, item_id: &str) -> Result<bool> {
        let Some(item) = self.db.get_food_item(item_id)? else {
            return Ok(false);
        };
        let deleted = self.db.delete_food_item(item_id)?;
        self.db.recalculate_meal_totals(&item.meal_id)?;
        Ok(deleted)
    }

    pub fn daily_totals(&self, date: NaiveDate) -> Result<NutritionTotals> {
        self.db.get_daily_totals(date)
    }

    // --- Journal ---

    pub fn add_journal_entry(&self, entry: NewJournalEntry) -> Result<JournalEntry> {
        if let Some(mood) = entry.mood {
            validate_rating("mood", mood)?;
        }
        if let Some(confidence) = entry.ocr_confidence {
            validate_confidence(confidence)?;
        }
        self.db.insert_journal_entry(&entry)
    }

    pub fn list_journal_entries(&self) -> Result<Vec<JournalEntry>> {
        self.db.list_journal_entries()
    }

    pub fn get_journal_entries_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<JournalEntry>> {
        self.db.get_journal_entries_in_range(start, end)
    }

    pub fn update_journal_entry(&self, id: &str, patch: &JournalPatch) -> Result<usize> {
        if let Some(Some(mood)) = patch.mood {
            validate_rating("mood", mood)?;
        }
        self.db.update_journal_entry(id, patch)
    }

    pub fn delete_journal_entry(&self, id: &str) -> Result<bool> {
        self.db.delete_journal_entry(id)
    }

    pub fn all_tags(&self) -> Result<Vec<String>> {
        self.db.get_all_tags()
    }
}
