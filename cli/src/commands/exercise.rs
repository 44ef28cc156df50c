use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use lifelog_core::models::NewExerciseSession;
use lifelog_core::service::LifelogService;

use super::helpers::{parse_date, short_id, truncate};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_exercise_log(
    service: &LifelogService,
    activity: &str,
    duration: i64,
    intensity: &str,
    calories: Option<i64>,
    heart_rate: Option<i64>,
    distance: Option<f64>,
    date: Option<String>,
    notes: Option<String>,
    json: bool,
) -> Result<()> {
    let session = service.log_exercise(NewExerciseSession {
        date: parse_date(date)?,
        exercise_type: activity.to_string(),
        duration_minutes: duration,
        intensity: intensity.to_string(),
        calories_burned: calories,
        notes,
        avg_heart_rate: heart_rate,
        distance_km: distance,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    let kind = &session.exercise_type;
    let date = &session.date;
    let minutes = session.duration_minutes;
    println!("Logged {minutes}m of {kind} for {date}");
    Ok(())
}

pub(crate) fn cmd_exercise_list(service: &LifelogService, json: bool) -> Result<()> {
    let sessions = service.list_exercise_sessions()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        eprintln!("No exercise sessions yet");
        return Ok(());
    }

    #[derive(Tabled)]
    struct SessionRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Activity")]
        activity: String,
        #[tabled(rename = "Duration")]
        duration: String,
        #[tabled(rename = "Intensity")]
        intensity: String,
        #[tabled(rename = "Distance")]
        distance: String,
    }

    let rows: Vec<SessionRow> = sessions
        .iter()
        .map(|s| SessionRow {
            id: short_id(&s.id),
            date: s.date.clone(),
            activity: truncate(&s.exercise_type, 20),
            duration: format!("{}m", s.duration_minutes),
            intensity: s.intensity.clone(),
            distance: s
                .distance_km
                .map_or_else(|| "-".to_string(), |km| format!("{km:.1}km")),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}
