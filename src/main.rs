use anyhow::{Context, Result};
use clap::Parser;
use gemini_ask::config::{self, Settings};
use gemini_ask::{ConfigError, QueryError};

/// gemini-ask - ask Gemini AI from the terminal
#[derive(Parser)]
#[command(name = "gemini-ask")]
#[command(about = "Ask Gemini AI from the terminal")]
#[command(after_help = "Example: gemini-ask 'What is machine learning?'")]
#[command(version)]
struct Cli {
    /// Question to ask Gemini
    #[arg(value_name = "QUESTION")]
    question: String,

    /// Model to use [default: GEMINI_MODEL or gemini-2.5-flash]
    #[arg(short, long, value_name = "MODEL")]
    model: Option<String>,
}

const SEPARATOR_WIDTH: usize = 50;

fn main() {
    let cli = Cli::parse();

    config::load_dotenv();
    gemini_ask::init_tracing("warn");

    if let Err(e) = run(&cli) {
        eprintln!("{}: {e:#}", error_label(&e));
        if is_configuration_error(&e) {
            eprintln!("\nTip: Create a .env file with GEMINI_API_KEY=your_key");
        }
        std::process::exit(1);
    }
}

/// Label printed in front of an error on stderr.
fn error_label(error: &anyhow::Error) -> &'static str {
    if is_configuration_error(error) {
        "Configuration Error"
    } else if is_invalid_question(error) {
        "Invalid Question"
    } else {
        "Unexpected Error"
    }
}

/// Determines whether an error came from configuration rather than the request.
///
/// Configuration errors are a missing credential or unusable settings.
fn is_configuration_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause.downcast_ref::<ConfigError>().is_some()
            || cause
                .downcast_ref::<QueryError>()
                .is_some_and(QueryError::is_configuration)
    })
}

/// Determines whether an error came from an empty or oversized question.
fn is_invalid_question(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<QueryError>()
            .is_some_and(QueryError::is_invalid_input)
    })
}

/// Asks the question and prints the answer.
fn run(cli: &Cli) -> Result<()> {
    let settings = Settings::from_env(cli.model.clone())?;
    let client = settings.query_client()?;

    println!("\nAsking Gemini: {}\n", cli.question);

    let answer = client
        .ask(&cli.question)
        .context("Failed to ask question")?;

    println!("{answer}");
    println!("\n{}\n", "=".repeat(SEPARATOR_WIDTH));

    Ok(())
}
