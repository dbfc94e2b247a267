//! Transactions command - one page of stored transactions

use anyhow::Result;

use super::get_context;
use crate::output;

pub fn run(skip: i64, take: i64, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let page = ctx.query_service.list_page(skip, take)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    if page.error {
        anyhow::bail!("{}", page.error_message.unwrap_or_default());
    }

    if page.rows.is_empty() {
        output::warning("No transactions. Run 'upflow sync' to pull them from Up Bank.");
        return Ok(());
    }

    println!("{}", output::transactions_table(&page.rows));
    println!(
        "Showing {}-{} of {}",
        skip + 1,
        skip + page.rows.len() as i64,
        page.total_count
    );

    Ok(())
}
