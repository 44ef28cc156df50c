mod clear;
mod exercise;
mod export;
mod habit;
mod helpers;
mod journal;
mod meal;
mod sleep;

pub(crate) use clear::cmd_clear;
pub(crate) use exercise::{cmd_exercise_list, cmd_exercise_log};
pub(crate) use export::{cmd_export_csv, cmd_export_json};
pub(crate) use habit::{
    cmd_habit_add, cmd_habit_delete, cmd_habit_done, cmd_habit_list, cmd_habit_streak,
};
pub(crate) use journal::{cmd_journal_add, cmd_journal_list, cmd_journal_tags};
pub(crate) use meal::{
    cmd_meal_add_item, cmd_meal_items, cmd_meal_log, cmd_meal_remove_item, cmd_meal_totals,
};
pub(crate) use sleep::{cmd_sleep_list, cmd_sleep_log};
