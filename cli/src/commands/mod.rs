//! CLI command implementations.

pub mod config;
pub mod kill;
pub mod list;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use portscope_core::ports::EventSink;
use portscope_core::{
    Config, ConfigStore, ConnectionRecord, Field, FilterSpec, NetstatScanner, PortScopeEngine,
    ScanOptions, SignalTerminator,
};

pub type Engine = PortScopeEngine<NetstatScanner, SignalTerminator>;

/// Options shared by `list` and `watch`.
#[derive(Args, Debug, Default)]
pub struct ViewArgs {
    /// Column to filter on: index 0-6 or a name (proto, local, foreign, state, owner, ...)
    #[arg(short, long)]
    pub field: Option<Field>,

    /// Case-insensitive substring to look for in the column
    #[arg(short, long)]
    pub query: Option<String>,

    /// Extra netstat flags, e.g. "ln" (allow-listed)
    #[arg(long)]
    pub flags: Option<String>,
}

impl ViewArgs {
    /// Build an engine from the stored config with this invocation's overrides.
    pub fn engine(&self, mut config: Config, sink: Arc<dyn EventSink>) -> Result<Engine> {
        if let Some(flags) = &self.flags {
            config.scan_flags = ScanOptions::from_extra_args(flags)?.flags().to_vec();
        }

        let engine = PortScopeEngine::from_config(&config, sink)?;
        let field = self.field.unwrap_or(config.default_filter_field);
        engine.set_filter(FilterSpec::on(field, self.query.clone().unwrap_or_default()));
        Ok(engine)
    }
}

pub async fn load_config() -> Result<Config> {
    Ok(ConfigStore::new()?.load().await?)
}

/// Print records as a table, in display order.
pub fn print_table(records: &[ConnectionRecord]) {
    println!(
        "{:<6} {:>6} {:>6} {:<24} {:<24} {:<12} {}",
        "PROTO", "RECV-Q", "SEND-Q", "LOCAL ADDRESS", "FOREIGN ADDRESS", "STATE", "PID/PROGRAM"
    );
    println!("{}", "-".repeat(100));

    for record in records {
        let [protocol, recv_queue, send_queue, local, foreign, state, owner] = record.fields();
        println!(
            "{:<6} {:>6} {:>6} {:<24} {:<24} {:<12} {}",
            protocol,
            recv_queue,
            send_queue,
            truncate(local, 24),
            truncate(foreign, 24),
            truncate(state, 12),
            owner
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 1).collect();
        format!("{}…", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("0.0.0.0:22", 24), "0.0.0.0:22");
        assert_eq!(truncate("[fe80::1]:5353", 8), "[fe80::…");
    }

    #[test]
    fn test_view_args_override_config() {
        let args = ViewArgs {
            field: Some(Field::State),
            query: Some("listen".to_string()),
            flags: Some("ln".to_string()),
        };
        let engine = args
            .engine(Config::default(), Arc::new(portscope_core::NullSink))
            .unwrap();
        assert_eq!(engine.filter(), FilterSpec::on(Field::State, "listen"));
        assert_eq!(engine.controller().options().args(), vec!["-l", "-n"]);
    }

    #[test]
    fn test_view_args_reject_unknown_flags() {
        let args = ViewArgs {
            flags: Some("e; rm -rf /".to_string()),
            ..ViewArgs::default()
        };
        assert!(args
            .engine(Config::default(), Arc::new(portscope_core::NullSink))
            .is_err());
    }
}
