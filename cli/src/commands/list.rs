//! List command - scan once and show matching connections.

use std::sync::Arc;

use anyhow::{bail, Result};
use portscope_core::NullSink;

use super::{load_config, print_table, ViewArgs};

pub async fn run(view: ViewArgs, json: bool) -> Result<()> {
    let config = load_config().await?;
    let engine = view.engine(config, Arc::new(NullSink))?;

    engine.refresh().await;

    if let Some(error) = &engine.snapshot().error {
        bail!("Error scanning connections: {}", error);
    }

    let records = engine.view();

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        if engine.filter().is_active() {
            println!("No connections match the filter.");
        } else {
            println!("No connections found.");
        }
        return Ok(());
    }

    print_table(&records);

    let total = engine.records().len();
    if records.len() == total {
        println!("\nTotal: {} connections", total);
    } else {
        println!("\nShowing {} of {} connections", records.len(), total);
    }
    Ok(())
}
