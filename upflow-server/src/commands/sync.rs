//! Sync command - pull new settled transactions from Up Bank

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.sync_service()?.synchronize()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if let Some(error) = &result.error {
        anyhow::bail!("Sync failed: {}", error);
    }

    if result.new_count == 0 {
        output::warning("Already up to date");
    } else {
        output::success(&format!("Synced {} new transactions", result.new_count));
    }
    println!("  Pages fetched: {}", result.pages);
    println!("  Skipped: {} (already exists)", result.skipped);
    if result.stopped_early {
        println!("  {}", "Stopped at the latest stored transaction".dimmed());
    }

    Ok(())
}
