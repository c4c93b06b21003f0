//! Config command - show or change stored settings.

use anyhow::Result;
use portscope_core::{ConfigStore, ScanOptions};

pub async fn show(json: bool) -> Result<()> {
    let store = ConfigStore::new()?;
    let config = store.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let flags: Vec<&str> = config.scan_options().args();

    println!("Config file: {}", store.path().display());
    println!("Refresh interval: {} ms", config.refresh_interval_ms);
    println!("Scan timeout: {} ms", config.scan_timeout_ms);
    println!("Netstat: {}", config.netstat_path);
    if flags.is_empty() {
        println!("Extra flags: (none)");
    } else {
        println!("Extra flags: {}", flags.join(" "));
    }
    println!("Default filter field: {}", config.default_filter_field);
    Ok(())
}

pub async fn set_interval(ms: u64) -> Result<()> {
    ConfigStore::new()?.set_refresh_interval(ms).await?;
    println!("Refresh interval set to {} ms", ms);
    Ok(())
}

pub async fn set_flags(flags: &str) -> Result<()> {
    let options = ScanOptions::from_extra_args(flags)?;
    ConfigStore::new()?.set_scan_flags(&options).await?;
    println!("Extra flags set to: {}", options.args().join(" "));
    Ok(())
}
