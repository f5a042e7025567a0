use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "quizflow", version, about = "Quizflow CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play today's quiz interactively
    Play {
        /// Resume an existing session instead of starting a new one
        #[arg(long)]
        resume: Option<String>,
    },
    /// Today's quiz metadata
    Today,
    /// Quiz metadata for a date
    Info {
        /// Date as YYYY-MM-DD
        date: String,
    },
    /// Results breakdown for a finished session
    Results {
        session_id: String,
    },
    /// Raw stored details of a past session
    Details {
        session_id: String,
    },
    /// Your past quiz sessions
    History,
    /// Leaderboard for today or a given date
    Leaderboard {
        /// Date as YYYY-MM-DD; today when omitted
        date: Option<String>,
    },
    /// Participation statistics for a date
    Stats {
        /// Date as YYYY-MM-DD
        date: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let cfg = Config::load_or_default();

    let result = match cli.command {
        Commands::Play { resume } => commands::play::run(&cfg, resume).await,
        Commands::Today => commands::quiz::today(&cfg).await,
        Commands::Info { date } => commands::quiz::info(&cfg, &date).await,
        Commands::Results { session_id } => commands::results::results(&cfg, &session_id).await,
        Commands::Details { session_id } => commands::results::details(&cfg, &session_id).await,
        Commands::History => commands::results::history(&cfg).await,
        Commands::Leaderboard { date } => {
            commands::quiz::leaderboard(&cfg, date.as_deref()).await
        }
        Commands::Stats { date } => commands::quiz::stats(&cfg, &date).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "quizflow",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
