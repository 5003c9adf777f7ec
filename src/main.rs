//! gitgen - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gitgen::config::{DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT_SECS};
use gitgen::generate::prepare_prompt;
use gitgen::{Config, DiffStrategy, GenerateError, TaskType, TracingObserver, generate};

/// Generate commit messages, code reviews and test cases from git diffs.
#[derive(Parser, Debug)]
#[command(name = "gitgen")]
#[command(about = "Generate commit messages, code reviews and test cases from git diffs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the diff as a commit message
    #[command(visible_alias = "commit")]
    CommitMessage(GenerateArgs),

    /// Review the changed code
    #[command(visible_alias = "review")]
    CodeReview(GenerateArgs),

    /// Write test cases covering the changes
    #[command(visible_alias = "test")]
    TestCase(GenerateArgs),
}

impl Command {
    fn into_parts(self) -> (TaskType, GenerateArgs) {
        match self {
            Command::CommitMessage(args) => (TaskType::CommitMessage, args),
            Command::CodeReview(args) => (TaskType::CodeReview, args),
            Command::TestCase(args) => (TaskType::TestCase, args),
        }
    }
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Old side of the diff (branch, tag, or commit hash)
    #[arg(short = 's', long)]
    source_ref: String,

    /// New side of the diff (defaults to the HEAD commit)
    #[arg(short = 'd', long)]
    destination_ref: Option<String>,

    /// Model platform: openai or ollama
    #[arg(short = 'p', long, env = "GITGEN_PLATFORM", default_value = "openai")]
    platform: String,

    /// API key for hosted platforms
    #[arg(short = 'k', long, env = "OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Model name (defaults per platform)
    #[arg(short = 'm', long, env = "GITGEN_MODEL")]
    model: Option<String>,

    /// Maximum tokens in the generated response
    #[arg(long, env = "GITGEN_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Request timeout in seconds
    #[arg(long = "timeout", env = "GITGEN_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Base URL override for the platform API
    #[arg(long, env = "GITGEN_ENDPOINT")]
    endpoint: Option<String>,

    /// How to compute the diff: cli (spawn git) or repository (read with libgit2)
    #[arg(long, default_value_t = DiffStrategy::Cli)]
    diff_strategy: DiffStrategy,

    /// Print the prompts without calling the model
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl GenerateArgs {
    fn into_config(self, workdir: PathBuf) -> Config {
        let mut config = Config::new(self.source_ref, self.platform)
            .with_destination(self.destination_ref.unwrap_or_default())
            .with_api_key(self.api_key)
            .with_model(self.model.unwrap_or_default())
            .with_max_tokens(self.max_tokens)
            .with_timeout_secs(self.timeout_secs)
            .with_diff_strategy(self.diff_strategy)
            .with_workdir(workdir);
        if let Some(endpoint) = self.endpoint {
            config = config.with_endpoint(endpoint);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (task, args) = cli.command.into_parts();

    init_tracing(args.verbose);

    let dry_run = args.dry_run;
    let workdir = std::env::current_dir().context("Failed to read current directory")?;
    let config = args.into_config(workdir);

    if dry_run {
        let provider = config.diff_strategy.provider(&config.workdir);
        let prompt = match prepare_prompt(task, &config, provider.as_ref(), &TracingObserver) {
            Err(GenerateError::NoChanges { .. }) => return report_no_changes(&config),
            other => other.context("Failed to build prompt")?,
        };
        println!("System Prompt:\n{}\n", prompt.system);
        println!("User Prompt:\n{}", prompt.user);
        return Ok(());
    }

    match generate(task, &config, &TracingObserver).await {
        Ok(content) => {
            println!("{}", content);
            Ok(())
        }
        Err(GenerateError::NoChanges { .. }) => report_no_changes(&config),
        Err(e) => Err(e).with_context(|| format!("Failed to generate {}", task)),
    }
}

fn report_no_changes(config: &Config) -> Result<()> {
    eprintln!(
        "No changes found between {} and {}. Nothing to generate.",
        config.source_ref,
        config.destination_or_head()
    );
    Ok(())
}

/// Log to stderr so stdout carries only generated content.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "gitgen=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
