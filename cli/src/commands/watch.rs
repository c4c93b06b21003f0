//! Watch command - re-scan periodically until interrupted.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use portscope_core::{ChannelSink, Event};
use serde_json::json;
use tracing::debug;

use super::{load_config, print_table, Engine, ViewArgs};

pub async fn run(view: ViewArgs, interval_ms: Option<u64>, json: bool) -> Result<()> {
    let config = load_config().await?;
    let period = interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.refresh_interval());

    let (sink, mut events) = ChannelSink::channel();
    let engine = view.engine(config, Arc::new(sink))?;
    let handle = engine.start_polling(period);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Some(Event::ScanCompleted { .. }) => render(&engine, json)?,
                Some(Event::ScanFailed { message }) => {
                    eprintln!("[{}] Error scanning connections: {}", timestamp(), message);
                }
                Some(other) => debug!(event = ?other, "Ignoring event"),
                None => break,
            },
        }
    }

    handle.shutdown().await;
    Ok(())
}

fn render(engine: &Engine, json: bool) -> Result<()> {
    let snapshot = engine.snapshot();
    let records = engine.view();

    if json {
        let frame = json!({
            "scannedAt": snapshot.scanned_at.map(|t| t.to_rfc3339()),
            "generation": snapshot.generation,
            "records": records,
        });
        println!("{}", serde_json::to_string(&frame)?);
        return Ok(());
    }

    println!(
        "\n[{}] {} of {} connections",
        timestamp(),
        records.len(),
        snapshot.records.len()
    );
    print_table(&records);
    Ok(())
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
