//! PortScope CLI - List connections and kill the processes behind them
//!
//! A command-line tool for listing the host's network connections,
//! watching them refresh, and killing an owning process after confirmation.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ViewArgs;

#[derive(Parser)]
#[command(name = "portscope")]
#[command(author, version, about = "List network connections and kill their owning processes")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Log scan details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List connections once
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Re-scan periodically until Ctrl-C
    Watch {
        #[command(flatten)]
        view: ViewArgs,

        /// Refresh interval in milliseconds (defaults to the configured value)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Kill the process owning a connection, e.g. `portscope kill 1234/nginx`
    Kill {
        /// Owner token as shown in the PID/Program Name column
        owner: String,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set the refresh interval in milliseconds
    SetInterval { ms: u64 },
    /// Set the extra scan flags, e.g. "ln" or "listening numeric"
    SetFlags { flags: String },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::List { view }) => {
            commands::list::run(view, cli.json).await?;
        }
        Some(Commands::Watch { view, interval }) => {
            commands::watch::run(view, interval, cli.json).await?;
        }
        Some(Commands::Kill { owner }) => {
            commands::kill::run(owner, cli.json).await?;
        }
        Some(Commands::Config { action }) => match action {
            Some(ConfigAction::SetInterval { ms }) => commands::config::set_interval(ms).await?,
            Some(ConfigAction::SetFlags { flags }) => commands::config::set_flags(&flags).await?,
            None => commands::config::show(cli.json).await?,
        },
        None => {
            // Default: list connections
            commands::list::run(ViewArgs::default(), cli.json).await?;
        }
    }

    Ok(())
}
