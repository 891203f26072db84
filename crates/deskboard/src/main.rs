mod bootstrap;

use anyhow::Result;
use desk_core::error::DeskError;
use desk_core::settings::Settings;
use desk_data::cache::SnapshotCache;
use desk_insight::client::CompletionClient;
use desk_ui::app::{App, ViewMode};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before parsing so OPENAI_API_KEY reaches the env fallback.
    dotenv::dotenv().ok();

    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(
        &settings.log_level,
        settings.log_file.as_ref(),
        settings.debug,
    )?;

    tracing::info!("deskboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Formula: {}",
        settings.view,
        settings.theme,
        settings.pct_formula
    );

    let api_key = settings
        .api_key
        .clone()
        .ok_or_else(|| DeskError::MissingConfig("OPENAI_API_KEY".to_string()))?;

    let data_dir = bootstrap::resolve_data_dir(settings.data_dir.as_deref())?;
    tracing::info!("Data directory: {}", data_dir.display());

    let mut cache = SnapshotCache::new(&data_dir, settings.formula());
    if settings.no_cache {
        cache.set_bypass(true);
    }

    // Compute the first snapshot before the terminal goes raw so source
    // problems surface as plain errors.
    let snapshot = cache.refresh()?.clone();
    tracing::info!(
        "Initial snapshot: {} operators, {} records",
        snapshot.roster.len(),
        snapshot.metadata.records_normalized
    );

    let client = CompletionClient::new(&settings.endpoint, &api_key, &settings.model);

    let view_mode = match settings.view.as_str() {
        "chart" => ViewMode::Chart,
        "insight" => ViewMode::Insight,
        _ => ViewMode::Roster,
    };

    let app = App::new(&settings.theme, view_mode, cache, snapshot, client);
    app.run().await?;

    Ok(())
}
