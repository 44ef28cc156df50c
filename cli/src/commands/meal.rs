use anyhow::Result;
use serde_json::json;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use lifelog_core::models::{NewFoodItem, NewMeal};
use lifelog_core::service::LifelogService;

use super::helpers::{opt_display, parse_date, short_id, truncate};

pub(crate) fn cmd_meal_log(
    service: &LifelogService,
    meal_type: &str,
    name: Option<String>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let meal = service.log_meal(NewMeal {
        date: parse_date(date)?,
        meal_type: meal_type.to_string(),
        name,
        photo_uri: None,
        ai_analysis: None,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&meal)?);
        return Ok(());
    }

    let id = &meal.id;
    let meal_type = &meal.meal_type;
    let date = &meal.date;
    println!("Logged {meal_type} for {date} ({id})");
    println!("Add items with 'lifelog meal add-item {id} <name> --calories <kcal>'");
    Ok(())
}

pub(crate) fn cmd_meal_items(service: &LifelogService, meal_id: &str, json: bool) -> Result<()> {
    let items = service.get_food_items(meal_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        eprintln!("No food items on meal {meal_id}");
        return Ok(());
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Fat")]
        fat: String,
    }

    let rows: Vec<ItemRow> = items
        .iter()
        .map(|i| ItemRow {
            id: short_id(&i.id),
            name: truncate(&i.name, 30),
            quantity: format!("{} {}", i.quantity, i.unit),
            calories: format!("{:.0}", i.calories),
            protein: i.protein.map_or("-".into(), |v| format!("{v:.1}g")),
            carbs: i.carbs.map_or("-".into(), |v| format!("{v:.1}g")),
            fat: i.fat.map_or("-".into(), |v| format!("{v:.1}g")),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_meal_add_item(
    service: &LifelogService,
    meal_id: &str,
    name: &str,
    quantity: f64,
    unit: &str,
    calories: f64,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    json: bool,
) -> Result<()> {
    let item = service.add_food_item(
        meal_id,
        NewFoodItem {
            name: name.to_string(),
            quantity,
            unit: unit.to_string(),
            calories,
            protein,
            carbs,
            fat,
            is_ai_generated: false,
            confidence: None,
        },
    )?;
    let meal = service
        .get_meal(meal_id)?
        .map_or(0.0, |m| m.total_calories);

    if json {
        println!("{}", serde_json::to_string_pretty(&item)?);
        return Ok(());
    }

    let name = &item.name;
    let cal = item.calories;
    println!("Added {name} ({cal:.0} kcal). Meal total is now {meal:.0} kcal");
    Ok(())
}

pub(crate) fn cmd_meal_remove_item(
    service: &LifelogService,
    item_id: &str,
    json: bool,
) -> Result<()> {
    let removed = service.delete_food_item(item_id)?;
    if !removed {
        anyhow::bail!("No food item with id {item_id}");
    }

    if json {
        println!("{}", json!({ "deleted": item_id }));
        return Ok(());
    }

    println!("Removed food item {item_id}");
    Ok(())
}

pub(crate) fn cmd_meal_totals(
    service: &LifelogService,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let totals = service.daily_totals(date)?;
    let meals = service.get_meals_for_date(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&totals)?);
        return Ok(());
    }

    println!("=== {date} ===\n");
    for meal in &meals {
        let label = meal.meal_type.to_uppercase();
        let name = opt_display(meal.name.as_deref());
        let cal = meal.total_calories;
        println!("  {label}: {name} — {cal:.0} kcal");
    }
    if !meals.is_empty() {
        println!();
    }

    let cal = totals.calories;
    let p = totals.protein;
    let c = totals.carbs;
    let f = totals.fat;
    println!("  TOTAL: {cal:.0} kcal | P:{p:.0}g C:{c:.0}g F:{f:.0}g");
    Ok(())
}
