//! CLI application for bank statement transaction extraction.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{batch, config, parse};

/// Environment variable that overrides the log filter, e.g. `vypiska_core=trace`.
const LOG_ENV: &str = "VYPISKA_LOG";

/// Bank statement parser - Extract transactions from statement PDFs
#[derive(Parser)]
#[command(name = "vypiska")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more about the extraction cascade (-v steps, -vv rows, -vvv layout)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a single statement
    Parse(parse::ParseArgs),

    /// Parse multiple statements
    Batch(batch::BatchArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(log_directive(cli.verbose, cli.quiet)));

    // stdout carries JSON/CSV output, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e))?;

    match cli.command {
        Commands::Parse(args) => parse::run(args, cli.config.as_deref()).await,
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}

/// Filter directive for the verbosity flags. Only this workspace's crates
/// get louder; dependencies stay at `warn`.
fn log_directive(verbose: u8, quiet: bool) -> String {
    if quiet {
        return "error".to_string();
    }
    let level = match verbose {
        0 => return "warn".to_string(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("warn,vypiska={level},vypiska_core={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directive() {
        assert_eq!(log_directive(0, false), "warn");
        assert_eq!(log_directive(0, true), "error");
        assert_eq!(log_directive(1, false), "warn,vypiska=info,vypiska_core=info");
        assert_eq!(log_directive(5, false), "warn,vypiska=trace,vypiska_core=trace");
    }

    #[test]
    fn test_verbosity_is_global() {
        let cli = Cli::try_parse_from(["vypiska", "config", "path", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(Cli::try_parse_from(["vypiska", "-q", "-v", "config", "path"]).is_err());
    }
}
