//! Status command - stored transactions and Up Bank reachability

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use upflow_core::adapters::up::UpClient;
use upflow_core::config::Config;
use upflow_core::StatusSummary;

use super::get_context;
use crate::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    #[serde(flatten)]
    summary: StatusSummary,
    database: String,
    up_reachable: Option<bool>,
    up_error: Option<String>,
}

/// `None` when no token is configured
fn ping_up(config: &Config) -> Option<std::result::Result<(), String>> {
    let token = config.up_api_token.as_deref()?;
    let outcome = UpClient::new_with_base_url(token, &config.up_base_url)
        .map_err(|e| e.to_string())
        .and_then(|client| client.ping().map_err(|e| e.to_string()));
    Some(outcome)
}

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let summary = ctx.status_service.status()?;
    let ping = ping_up(&ctx.config);

    let report = StatusReport {
        summary,
        database: ctx.config.database_path.display().to_string(),
        up_reachable: ping.as_ref().map(|p| p.is_ok()),
        up_error: ping.and_then(|p| p.err()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "UpFlow Status".bold());
    println!();

    let latest = report
        .summary
        .latest_settled_at
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut table = output::create_table();
    table.add_row(vec!["Transactions", &report.summary.transaction_count.to_string()]);
    table.add_row(vec!["Latest settled", &latest]);
    table.add_row(vec!["Database", &report.database]);
    println!("{}", table);
    println!();

    match (report.up_reachable, &report.up_error) {
        (None, _) => output::warning("No Up API token configured. Set UP_API_TOKEN to enable sync."),
        (Some(true), _) => output::success("Up Bank API reachable"),
        (Some(false), error) => output::error(&format!(
            "Up Bank API unreachable: {}",
            error.as_deref().unwrap_or("unknown error")
        )),
    }

    Ok(())
}
