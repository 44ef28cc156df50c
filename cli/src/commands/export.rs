use anyhow::{Context, Result, bail};
use std::path::Path;

use lifelog_core::export::{ExportCategory, export_csv, snapshot_json};
use lifelog_core::service::LifelogService;

fn parse_category(s: &str) -> Result<ExportCategory> {
    match s.to_lowercase().as_str() {
        "habits" => Ok(ExportCategory::Habits),
        "sleep" => Ok(ExportCategory::Sleep),
        "exercise" => Ok(ExportCategory::Exercise),
        "nutrition" => Ok(ExportCategory::Nutrition),
        "journal" => Ok(ExportCategory::Journal),
        other => bail!(
            "Unknown category '{other}'. Use one of: habits, sleep, exercise, nutrition, journal"
        ),
    }
}

pub(crate) fn cmd_export_json(service: &LifelogService, out: Option<&Path>) -> Result<()> {
    let json = snapshot_json(service.db())?;

    match out {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            let path = path.display();
            eprintln!("Wrote snapshot to {path}");
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub(crate) fn cmd_export_csv(
    service: &LifelogService,
    category: &str,
    out: Option<&Path>,
) -> Result<()> {
    let category = parse_category(category)?;
    let csv = export_csv(service.db(), category)?;

    let dir = out.unwrap_or_else(|| Path::new("."));
    let path = dir.join(category.file_name());
    std::fs::write(&path, &csv).with_context(|| format!("Failed to write {}", path.display()))?;
    let path = path.display();
    eprintln!("Wrote {path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!(parse_category("habits").unwrap(), ExportCategory::Habits);
        assert_eq!(
            parse_category("Nutrition").unwrap(),
            ExportCategory::Nutrition
        );
        assert!(parse_category("weights").is_err());
    }

    #[test]
    fn test_export_csv_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = LifelogService::open_in_memory().unwrap();

        cmd_export_csv(&service, "habits", Some(dir.path())).unwrap();

        let content = std::fs::read_to_string(dir.path().join("habits.csv")).unwrap();
        assert!(content.starts_with("\"id\""));
    }

    #[test]
    fn test_export_json_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = LifelogService::open_in_memory().unwrap();
        let path = dir.path().join("snapshot.json");

        cmd_export_json(&service, Some(&path)).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value["habits"].is_array());
    }
}
