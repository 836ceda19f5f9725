mod config;

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use stockbadge_core::clients::InvestingClient;
use stockbadge_core::{page, TickerEngine};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::BadgeRefreshConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting badge refresh service...");

    let config = BadgeRefreshConfig::from_env()?;
    if !config.site_dir.is_dir() {
        anyhow::bail!("SITE_DIR {} is not a directory", config.site_dir.display());
    }

    // One engine for the whole process: the instrument cache lives across
    // cycles, so a symbol is searched at most once per service lifetime.
    let engine = TickerEngine::new(InvestingClient::new());

    loop {
        info!("--- Starting badge refresh cycle ---");
        run_site_cycle(&engine, &config.site_dir).await;

        if config.run_once {
            break;
        }
        info!("Cycle complete. Sleeping {}s", config.refresh_interval_secs);
        tokio::time::sleep(Duration::from_secs(config.refresh_interval_secs)).await;
    }

    Ok(())
}

/// One pass over every HTML page of the site. Per-page failures are logged
/// and skipped; a cycle never aborts the service.
async fn run_site_cycle(engine: &TickerEngine<InvestingClient>, site_dir: &Path) {
    let mut pages = Vec::new();
    if let Err(e) = collect_html_files(site_dir, &mut pages) {
        error!("Failed to walk {}: {}", site_dir.display(), e);
        return;
    }
    info!("Found {} HTML files under {}", pages.len(), site_dir.display());

    for path in pages {
        if let Err(e) = refresh_page(engine, &path).await {
            warn!("Skipping {}: {}", path.display(), e);
        }
    }
}

async fn refresh_page(engine: &TickerEngine<InvestingClient>, path: &Path) -> Result<()> {
    let html = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let placeholders = page::scan(&html);
    if placeholders.is_empty() {
        return Ok(());
    }
    info!("{}: {} placeholders", path.display(), placeholders.len());

    let updates = engine.run_cycle(placeholders).await;
    if updates.is_empty() {
        return Ok(());
    }

    let rendered = page::apply_updates(&html, &updates);
    fs::write(path, rendered)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("{}: {} badges rendered", path.display(), updates.len());
    Ok(())
}

fn collect_html_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_html_files(&path, out)?;
        } else if matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("html" | "htm")
        ) {
            out.push(path);
        }
    }
    Ok(())
}
