mod agent;
mod config;
mod error;
mod llm;
mod retrieval;
mod shell;
mod text;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use agent::{Assistant, Outcome};
use config::Config;

#[derive(Parser)]
#[command(
    name = "web-answer",
    about = "Answer questions from live web search results"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print per-request timing and token summary
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and exit
    Ask {
        /// The question to research
        question: String,

        /// Number of search results to analyze
        #[arg(short = 'n', long)]
        results: Option<usize>,

        /// Also print the raw context preview
        #[arg(long)]
        show_context: bool,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive prompt (default)
    Interactive,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = Config::from_env()?;
    let assistant = Assistant::new(config)?;

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Ask {
            question,
            results,
            show_context,
            json,
        } => {
            let count = assistant.config().result_count(results);
            let outcome = assistant.ask(&question, count, shell::print_phase).await;

            if json {
                if let Outcome::Answered(report) = &outcome {
                    let rendered = serde_json::to_string_pretty(report)
                        .context("Failed to serialize report")?;
                    println!("{rendered}");
                    return Ok(());
                }
            }

            let mut stdout = std::io::stdout();
            shell::render(&mut stdout, &outcome, show_context)?;
            if let (true, Outcome::Answered(report)) = (cli.verbose, &outcome) {
                eprintln!("{}", report.summary());
            }
        }
        Commands::Interactive => {
            shell::run_interactive(&assistant, cli.verbose).await?;
        }
    }

    Ok(())
}
