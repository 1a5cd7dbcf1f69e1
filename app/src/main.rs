#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use clap::{Parser, Subcommand};
use command::{CommandStrategy, InitStrategy, RunInput, RunStrategy, VersionStrategy};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Telegram relay to a chat-completion model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot (default)
    Run {
        /// Bot token (overrides config and BOT_TOKEN)
        #[arg(short = 't', long)]
        token: Option<String>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,
    },
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

impl Commands {
    const fn default_run() -> Self {
        Self::Run {
            token: None,
            model: None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command.unwrap_or_else(Commands::default_run) {
        Commands::Run { token, model } => RunStrategy.execute(RunInput { token, model }).await,
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["parley"]).unwrap_or_else(|e| panic!("{e}"));
        assert!(cli.command.is_none());
        assert!(matches!(
            cli.command.unwrap_or_else(Commands::default_run),
            Commands::Run {
                token: None,
                model: None
            }
        ));
    }

    #[test]
    fn run_flags_override_token_and_model() {
        let cli = Cli::try_parse_from(["parley", "run", "-t", "123:abc", "--model", "gpt-4o"])
            .unwrap_or_else(|e| panic!("{e}"));

        match cli.command {
            Some(Commands::Run { token, model }) => {
                assert_eq!(token.as_deref(), Some("123:abc"));
                assert_eq!(model.as_deref(), Some("gpt-4o"));
            }
            _ => panic!("expected the run subcommand"),
        }
    }
}
