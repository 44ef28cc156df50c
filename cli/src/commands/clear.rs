use anyhow::Result;

use lifelog_core::service::LifelogService;

use super::helpers::confirm;

pub(crate) fn cmd_clear(service: &LifelogService, yes: bool) -> Result<()> {
    if !yes && !confirm("Delete ALL logged data? This cannot be undone")? {
        eprintln!("Aborted");
        return Ok(());
    }

    service.clear_all_data()?;
    println!("All data cleared");
    Ok(())
}
