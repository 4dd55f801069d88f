// CLI entrypoint for gemcommit.

use clap::Parser;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

use gemcommit::error::Error;
use gemcommit::git::Git;
use gemcommit::{config, llm, ui, workflow};

#[derive(Parser)]
#[command(
    name = "gemcommit",
    version,
    about = "Generate commit messages for staged changes with Google Gemini",
    long_about = "Reads the staged git diff, asks Google Gemini for candidate commit messages, \
                  lets you pick or edit one, and commits with it"
)]
struct Cli {
    /// Prompt for a Google AI API key, validate it and save it
    #[arg(long = "config")]
    config: bool,

    /// Gemini model to use (defaults to the built-in prompt's model)
    #[arg(short = 'm', long = "model")]
    model: Option<String>,

    /// Print the generated candidates without committing
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Error> {
    let config_path = config::config_path()?;

    if cli.config {
        return configure(&config_path);
    }

    let api_key = config::resolve_api_key(&config_path)?;

    let git = Git::current_dir();
    git.ensure_repository()?;

    let client = llm::Client::new(api_key, cli.model.as_deref())?;
    let candidates = workflow::collect_candidates(&git, &client)?;

    if cli.dry_run {
        for (index, candidate) in candidates.iter().enumerate() {
            println!("{}. {candidate}", index + 1);
        }
        return Ok(());
    }

    let commit_msg = ui::choose_message(candidates)?;

    git.commit(&commit_msg)?;

    println!("Successfully created commit with message: {commit_msg}");
    Ok(())
}

fn configure(config_path: &std::path::Path) -> Result<(), Error> {
    print!("Enter your Google AI API key: ");
    io::stdout().flush().map_err(Error::Input)?;

    let mut input = String::new();
    io::stdin().read_line(&mut input).map_err(Error::Input)?;

    config::set_api_key(config_path, &input)?;
    println!("API key configured successfully!");
    Ok(())
}
