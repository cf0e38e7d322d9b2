use anyhow::Context;
use api::{bootstrap::build_state, config::AppConfig, telemetry};
use reporting::{DirectoryExportSink, ExportSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing()?;
    let config = AppConfig::from_env()?;
    let owner = std::env::var("OWNER")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .context("OWNER must name the portfolio to export")?;

    let state = build_state(&config)?;
    let outcome = state
        .portfolio
        .get_snapshot(&owner)
        .await
        .with_context(|| format!("holdings for {owner} unavailable"))?;
    if let Some(error) = outcome.error() {
        tracing::warn!(%owner, %error, "exporting fallback holdings");
    }

    let artifact = state.portfolio.export(outcome.snapshot())?;
    let sink = DirectoryExportSink::new(config.export_dir.clone());
    let location = sink.deliver(&artifact).await?;
    tracing::info!(
        %owner,
        location = %location,
        holdings = outcome.snapshot().holdings().len(),
        skipped = outcome.snapshot().skipped_records(),
        "portfolio report written"
    );

    Ok(())
}
