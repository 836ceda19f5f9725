//! Configuration for the badge refresh service.

use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct BadgeRefreshConfig {
    /// Root directory of the rendered static site.
    pub site_dir: PathBuf,
    /// Period of the full resolve+render cycle.
    pub refresh_interval_secs: u64,
    /// Run one cycle and exit (cron-style invocation).
    pub run_once: bool,
}

impl BadgeRefreshConfig {
    pub fn from_env() -> Result<Self> {
        let refresh_interval_secs = parse_u64("BADGE_REFRESH_INTERVAL_SECS", 300)?;
        if refresh_interval_secs == 0 {
            return Err(anyhow!("BADGE_REFRESH_INTERVAL_SECS must be > 0"));
        }

        Ok(Self {
            site_dir: PathBuf::from(env::var("SITE_DIR").unwrap_or_else(|_| "public".to_string())),
            refresh_interval_secs,
            run_once: env::var("BADGE_REFRESH_ONCE")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .map_err(|_| anyhow!("BADGE_REFRESH_ONCE must be true or false"))?,
        })
    }
}

/// Parse environment variable as u64 with default fallback
fn parse_u64(var_name: &str, default: u64) -> Result<u64> {
    match env::var(var_name) {
        Ok(val) => val
            .parse()
            .map_err(|_| anyhow!("{} must be a valid u64", var_name)),
        Err(_) => Ok(default),
    }
}
