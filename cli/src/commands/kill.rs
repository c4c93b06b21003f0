//! Kill command - two-phase termination of a connection's owning process.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{bail, Result};
use portscope_core::NullSink;
use serde_json::json;

use super::{load_config, ViewArgs};

pub async fn run(owner: String, json: bool) -> Result<()> {
    // Confirmation must come from a person at a terminal
    if !atty::is(atty::Stream::Stdin) {
        bail!("Refusing to kill without an interactive terminal: confirmation requires typing 'yes'");
    }

    let config = load_config().await?;
    let engine = ViewArgs::default().engine(config, Arc::new(NullSink))?;

    engine.refresh().await;
    if let Some(error) = &engine.snapshot().error {
        bail!("Error scanning connections: {}", error);
    }
    if !engine.records().iter().any(|record| record.owner() == owner) {
        bail!("No listed connection is owned by '{}'", owner);
    }

    // Phase one: open the confirmation
    let prompt = engine.request_termination(&owner)?;
    println!("Kill {}?", prompt.target);
    println!("{}", prompt.warning);
    print!("Type 'yes' to confirm: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    // Phase two: only an explicit "yes" reaches the terminator
    if answer.trim() != "yes" {
        engine.cancel_termination();
        println!("Cancelled.");
        return Ok(());
    }

    let pid = engine.confirm_termination()?;
    if json {
        println!("{}", json!({ "killed": pid, "owner": owner }));
    } else {
        println!("Killed process {}", pid);
    }
    Ok(())
}
