use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

pub const FREQUENCIES: [&str; 3] = ["daily", "weekly", "custom"];
pub const INTENSITIES: [&str; 4] = ["low", "moderate", "high", "very_high"];
pub const MEAL_TYPES: [&str; 4] = ["breakfast", "lunch", "dinner", "snack"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: String,
    pub frequency: String,
    pub target_days_per_week: Option<i64>,
    pub reminder_time: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewHabit {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: String,
    pub frequency: String,
    pub target_days_per_week: Option<i64>,
    pub reminder_time: Option<String>,
}

/// Partial update for a habit. `Some(..)` means "write this column";
/// a double `Option` distinguishes "set to NULL" from "leave alone"
/// for nullable columns.
#[derive(Debug, Clone, Default)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub color: Option<String>,
    pub frequency: Option<String>,
    pub target_days_per_week: Option<Option<i64>>,
    pub reminder_time: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitCompletion {
    pub id: String,
    pub habit_id: String,
    pub date: String,
    pub completed: bool,
    pub completed_at: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewCompletion {
    pub habit_id: String,
    pub date: chrono::NaiveDate,
    pub completed: bool,
    pub completed_at: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepEntry {
    pub id: String,
    pub date: String,
    pub bedtime: String,
    pub wake_time: String,
    pub duration_minutes: i64,
    pub quality: i64,
    pub notes: Option<String>,
    pub factors: Option<Vec<String>>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewSleepEntry {
    pub date: chrono::NaiveDate,
    pub bedtime: String,
    pub wake_time: String,
    pub duration_minutes: i64,
    pub quality: i64,
    pub notes: Option<String>,
    pub factors: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct SleepPatch {
    pub bedtime: Option<String>,
    pub wake_time: Option<String>,
    pub duration_minutes: Option<i64>,
    pub quality: Option<i64>,
    pub notes: Option<Option<String>>,
    pub factors: Option<Option<Vec<String>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseSession {
    pub id: String,
    pub date: String,
    pub exercise_type: String,
    pub duration_minutes: i64,
    pub intensity: String,
    pub calories_burned: Option<i64>,
    pub notes: Option<String>,
    pub avg_heart_rate: Option<i64>,
    pub distance_km: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewExerciseSession {
    pub date: chrono::NaiveDate,
    pub exercise_type: String,
    pub duration_minutes: i64,
    pub intensity: String,
    pub calories_burned: Option<i64>,
    pub notes: Option<String>,
    pub avg_heart_rate: Option<i64>,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ExercisePatch {
    pub exercise_type: Option<String>,
    pub duration_minutes: Option<i64>,
    pub intensity: Option<String>,
    pub calories_burned: Option<Option<i64>>,
    pub notes: Option<Option<String>>,
    pub avg_heart_rate: Option<Option<i64>>,
    pub distance_km: Option<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    pub date: String,
    pub meal_type: String,
    pub name: Option<String>,
    pub total_calories: f64,
    pub total_protein: Option<f64>,
    pub total_carbs: Option<f64>,
    pub total_fat: Option<f64>,
    pub total_fiber: Option<f64>,
    pub photo_uri: Option<String>,
    pub ai_analysis: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewMeal {
    pub date: chrono::NaiveDate,
    pub meal_type: String,
    pub name: Option<String>,
    pub photo_uri: Option<String>,
    pub ai_analysis: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MealPatch {
    pub meal_type: Option<String>,
    pub name: Option<Option<String>>,
    pub photo_uri: Option<Option<String>>,
    pub ai_analysis: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: String,
    pub meal_id: String,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub is_ai_generated: bool,
    pub confidence: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewFoodItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub is_ai_generated: bool,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub date: String,
    pub title: Option<String>,
    pub content: String,
    pub mood: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub is_scanned: bool,
    pub original_image_uri: Option<String>,
    pub ocr_confidence: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewJournalEntry {
    pub date: chrono::NaiveDate,
    pub title: Option<String>,
    pub content: String,
    pub mood: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub is_scanned: bool,
    pub original_image_uri: Option<String>,
    pub ocr_confidence: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct JournalPatch {
    pub title: Option<Option<String>>,
    pub content: Option<String>,
    pub mood: Option<Option<i64>>,
    pub tags: Option<Option<Vec<String>>>,
}

/// Summed nutrition for one calendar day. A day with no meals is the
/// all-zero value, never an absent one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

// --- Validation ---

pub fn validate_frequency(frequency: &str) -> Result<String> {
    let normalized = frequency.to_lowercase();
    if FREQUENCIES.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        bail!(
            "Invalid frequency '{frequency}'. Must be one of: {}",
            FREQUENCIES.join(", ")
        )
    }
}

pub fn validate_intensity(intensity: &str) -> Result<String> {
    let normalized = intensity.to_lowercase();
    if INTENSITIES.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        bail!(
            "Invalid intensity '{intensity}'. Must be one of: {}",
            INTENSITIES.join(", ")
        )
    }
}

pub fn validate_meal_type(meal_type: &str) -> Result<String> {
    let normalized = meal_type.to_lowercase();
    if MEAL_TYPES.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        bail!(
            "Invalid meal type '{meal_type}'. Must be one of: {}",
            MEAL_TYPES.join(", ")
        )
    }
}

/// Sleep quality and journal mood share the same 1–5 scale.
pub fn validate_rating(label: &str, value: i64) -> Result<i64> {
    if (1..=5).contains(&value) {
        Ok(value)
    } else {
        bail!("Invalid {label} {value}. Must be between 1 and 5")
    }
}

pub fn validate_confidence(value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        bail!("Invalid confidence {value}. Must be between 0.0 and 1.0")
    }
}

// --- List-valued columns ---

/// Encode a list-valued field (tags, sleep factors) to its stored text form.
#[must_use]
pub fn serialize_list_field(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a stored list field. Malformed text yields `None` — the field is
/// treated as absent rather than failing the whole row read.
#[must_use]
pub fn parse_list_field(raw: &str) -> Option<Vec<String>> {
    serde_json::from_str(raw).ok()
}
