mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "repobot", about = "GitHub repository automation agent CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the schedule and print the due-job report as JSON
    Check {
        /// Repository "owner/repo" (defaults to GITHUB_REPOSITORY)
        #[arg(short, long)]
        repository: Option<String>,
    },
    /// Run the schedule tool with JSON parameters
    Schedule {
        /// Tool parameters as JSON (e.g. '{"action": "list"}')
        params: String,

        /// Repository "owner/repo" (defaults to GITHUB_REPOSITORY)
        #[arg(short, long)]
        repository: Option<String>,
    },
    /// Run the projects tool with JSON parameters
    Projects {
        /// Tool parameters as JSON (e.g. '{"action": "get_progress"}')
        params: String,

        /// Default project node ID (defaults to REPOBOT_PROJECT_ID)
        #[arg(short, long)]
        project_id: Option<String>,
    },
    /// Print the assembled trigger-event context from GITHUB_CONTEXT
    Context {
        /// Print only the extracted user message
        #[arg(long)]
        message_only: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { repository } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::run_check(repository))?;
        }
        Commands::Schedule { params, repository } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::run_schedule(params, repository))?;
        }
        Commands::Projects { params, project_id } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(commands::run_projects(params, project_id))?;
        }
        Commands::Context { message_only } => {
            commands::run_context(message_only)?;
        }
    }

    Ok(())
}
