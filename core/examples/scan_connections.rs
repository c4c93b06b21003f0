//! Example: Scan once and display connections, owned sockets first.

use portscope_core::{NetstatScanner, PortScopeEngine, ScanOptions, SignalTerminator};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("Scanning connections...\n");

    let engine = PortScopeEngine::new(
        NetstatScanner::new(),
        SignalTerminator::new(),
        ScanOptions::default(),
    );
    engine.refresh().await;

    let snapshot = engine.snapshot();
    if let Some(error) = &snapshot.error {
        eprintln!("Error scanning connections: {}", error);
        return;
    }

    if snapshot.records.is_empty() {
        println!("No connections found.");
        return;
    }

    println!(
        "{:<6} {:<24} {:<24} {:<12} {}",
        "PROTO", "LOCAL", "FOREIGN", "STATE", "OWNER"
    );
    println!("{}", "-".repeat(90));

    for record in snapshot.records.iter() {
        let owner = match (record.owner_pid(), record.program_name()) {
            (Some(pid), Some(program)) => format!("{} ({})", program, pid),
            (Some(pid), None) => pid.to_string(),
            _ => "-".to_string(),
        };
        println!(
            "{:<6} {:<24} {:<24} {:<12} {}",
            record.protocol(),
            record.local_address(),
            record.foreign_address(),
            record.state(),
            owner
        );
    }

    println!("\nTotal: {} connections", snapshot.records.len());
}
