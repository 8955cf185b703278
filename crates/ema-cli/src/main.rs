mod audit;
mod extract;
mod source;
mod watch;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::source::PageArgs;

#[derive(Debug, Parser)]
#[command(name = "ema-cli")]
#[command(about = "Engagement audit command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the profile header found on a saved page as JSON
    Profile {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Collect the owner's posts from a saved page and print the snapshot
    Posts {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Watch a page file and report live post counts as it is rewritten
    Watch {
        #[command(flatten)]
        page: PageArgs,
        /// How often to check the file for changes, in milliseconds
        #[arg(long, default_value = "500")]
        poll_ms: u64,
    },
    /// Collect posts and run a profile audit on them
    Audit {
        #[command(flatten)]
        page: PageArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ema_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Profile { page } => extract::run_profile(&page)?,
        Commands::Posts { page } => extract::run_posts(&page, &config.collector)?,
        Commands::Watch { page, poll_ms } => {
            watch::run_watch(&page, &config.collector, poll_ms).await?;
        }
        Commands::Audit { page } => audit::run_audit(&page, &config).await?,
    }

    Ok(())
}

/// Writes `value` to stdout as pretty JSON.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
