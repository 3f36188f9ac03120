//! serp-export CLI
//!
//! Runs every keyword of a text file through the SpaceSerp API, shows the
//! combined organic results and writes them to a CSV file.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Password};
use std::io::Write;
use std::path::{Path, PathBuf};
use serp_export::{
    aggregator::{Aggregator, FailurePolicy},
    auth::{AuthState, Session},
    cache::CachedFetcher,
    config::Config,
    export,
    keywords,
    progress::ProgressReporter,
    run_keywords, troubleshooting_info,
    types::{Keyword, ResultFetcher},
    utils::debug,
    ProjectedTable, RunOutcome, SearchError,
};

const MAX_PASSWORD_ATTEMPTS: u32 = 3;

#[derive(Parser)]
#[command(name = "serp-export")]
#[command(about = "Bulk keyword search with CSV export of organic results")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every keyword in a file and export the results
    Run {
        /// Text file with one keyword per line
        keywords: PathBuf,

        /// CSV file to write (defaults to a timestamped name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Secrets file with api_key and password
        #[arg(long)]
        secrets: Option<PathBuf>,

        /// Gate password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Delay between keywords in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Request timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Fetch duplicate keywords again instead of reusing results
        #[arg(long)]
        no_cache: bool,

        /// Keep going when a keyword's request fails
        #[arg(long)]
        skip_failed: bool,

        /// Output format for the results shown on screen
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Enable debug output
        #[arg(short, long)]
        debug: bool,
    },
    /// Show the keywords parsed from a file
    Keywords {
        /// Text file with one keyword per line
        file: PathBuf,
    },
    /// Show the effective configuration with secrets masked
    Config {
        /// Secrets file with api_key and password
        #[arg(long)]
        secrets: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
    None,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let debug_enabled = matches!(cli.command, Commands::Run { debug: true, .. });
    init_logger(debug_enabled);

    let result = match cli.command {
        Commands::Run {
            keywords,
            output,
            secrets,
            password,
            delay_ms,
            timeout_ms,
            no_cache,
            skip_failed,
            format,
            debug,
        } => {
            let options = RunOptions {
                keywords,
                output,
                secrets,
                password,
                delay_ms,
                timeout_ms,
                no_cache,
                skip_failed,
                format,
                debug,
            };
            handle_run(options).await
        }
        Commands::Keywords { file } => handle_keywords(&file),
        Commands::Config { secrets } => handle_config(secrets.as_deref()),
    };

    if let Err(error) = &result {
        if let Some(search_error) = error.downcast_ref::<SearchError>() {
            eprintln!(
                "{} {}",
                "Troubleshooting:".bold().yellow(),
                troubleshooting_info(search_error)
            );
        }
    }
    result
}

fn init_logger(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

struct RunOptions {
    keywords: PathBuf,
    output: Option<PathBuf>,
    secrets: Option<PathBuf>,
    password: Option<String>,
    delay_ms: Option<u64>,
    timeout_ms: Option<u64>,
    no_cache: bool,
    skip_failed: bool,
    format: OutputFormat,
    debug: bool,
}

async fn handle_run(options: RunOptions) -> anyhow::Result<()> {
    let mut config = Config::load(options.secrets.as_deref())?;
    if let Some(delay_ms) = options.delay_ms {
        config.delay_ms = delay_ms;
    }
    if let Some(timeout_ms) = options.timeout_ms {
        config.timeout_ms = timeout_ms;
    }

    let session = authenticate(&config, options.password.as_deref())?;
    session.require_authenticated()?;

    let keywords = keywords::load_keywords(&options.keywords)
        .with_context(|| format!("Failed to load keywords from {}", options.keywords.display()))?;
    println!(
        "{} {}",
        "Number of keywords:".bold(),
        keywords.len().to_string().bold()
    );

    let mut provider = config.provider()?;
    if options.debug {
        provider = provider.with_debug(debug::debug_all());
    }
    let fetcher: Box<dyn ResultFetcher> = if options.no_cache {
        Box::new(provider)
    } else {
        Box::new(CachedFetcher::new(provider))
    };

    let policy = if options.skip_failed {
        FailurePolicy::Skip
    } else {
        FailurePolicy::Abort
    };
    let mut aggregator = Aggregator::new(fetcher)
        .with_rate_limiter(Box::new(config.rate_limiter()))
        .with_reporter(Box::new(TerminalReporter))
        .with_failure_policy(policy);

    let outcome = run_keywords(&mut aggregator, &keywords).await?;

    if let Some(report) = outcome.report() {
        if report.has_failures() {
            eprintln!(
                "{} {} of {} keywords failed",
                "Warning:".bold().yellow(),
                report.failures.len(),
                report.keywords_processed
            );
            for failure in &report.failures {
                eprintln!("  #{} {}: {}", failure.position, failure.keyword, failure.error);
            }
        }
    }

    let table = match outcome {
        RunOutcome::Table { table, .. } => table,
        other => {
            println!("{}", other.message().yellow());
            return Ok(());
        }
    };

    display_table(&table, &options.format)?;

    let output = options
        .output
        .unwrap_or_else(|| PathBuf::from(export::timestamped_file_name("search_results")));
    let written = export::export_to_path(&table, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "{} {} ({} rows)",
        "CSV written to".bold().green(),
        written.display(),
        table.len()
    );

    Ok(())
}

/// Run the password gate; a config without a password has no gate
fn authenticate(config: &Config, password: Option<&str>) -> anyhow::Result<Session> {
    let Some(gate) = config.gate()? else {
        log::info!("No gate password configured; skipping authentication");
        return Ok(Session::unguarded());
    };

    let mut session = Session::new();
    if let Some(password) = password {
        gate.submit(&mut session, password);
        return Ok(session);
    }

    let theme = ColorfulTheme::default();
    while session.attempts() < MAX_PASSWORD_ATTEMPTS {
        let attempt = Password::with_theme(&theme)
            .with_prompt("Password")
            .interact()
            .context("Cannot prompt for the gate password; pass it with --password")?;
        match gate.submit(&mut session, &attempt) {
            AuthState::Authenticated => break,
            _ => eprintln!("{}", "Password incorrect".red()),
        }
    }

    Ok(session)
}

fn handle_keywords(file: &Path) -> anyhow::Result<()> {
    let keywords = keywords::load_keywords(file)
        .with_context(|| format!("Failed to load keywords from {}", file.display()))?;

    if keywords.is_empty() {
        println!("{}", "No valid keywords found in the file.".yellow());
        return Ok(());
    }

    println!(
        "{} {}",
        "Number of keywords:".bold(),
        keywords.len().to_string().bold()
    );
    for (i, keyword) in keywords.iter().enumerate() {
        println!("{:>4}. {}", i + 1, keyword);
    }
    Ok(())
}

fn handle_config(secrets: Option<&Path>) -> anyhow::Result<()> {
    let config = Config::load(secrets)?;

    println!("{}", "Effective configuration:".bold().blue());
    for (key, value) in config.summary() {
        println!("  {:<12} {}", key.bold(), value);
    }
    Ok(())
}

fn display_table(table: &ProjectedTable, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::None => {}
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(table.rows())?);
        }
        OutputFormat::Csv => {
            print!("{}", export::to_csv_string(table)?);
        }
        OutputFormat::Table => {
            println!("{}", "Search Results".bold().blue());
            println!("{}", "─".repeat(80).dimmed());

            for row in table.rows() {
                println!(
                    "{} {} {}",
                    format!("[{}]", row.keyword).cyan(),
                    format!("#{}", row.position).bold(),
                    row.title.bold()
                );
                println!("   {}", row.link.blue().underline());
                if !row.domain.is_empty() {
                    println!("   {} (page {})", row.domain.green(), row.page);
                }
                if !row.description.is_empty() {
                    println!("   {}", truncate(&row.description, 200).italic());
                }
                println!();
            }

            println!("{} {}", "Total results:".bold(), table.len().to_string().bold());
        }
    }
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Prints `Keyword #i/N being run` lines to stderr
struct TerminalReporter;

impl ProgressReporter for TerminalReporter {
    fn keyword_started(&self, index: usize, total: usize, keyword: &Keyword) {
        eprintln!(
            "{} {}",
            format!("Keyword #{index}/{total} being run").dimmed(),
            keyword
        );
    }

    fn keyword_failed(&self, index: usize, total: usize, keyword: &Keyword, error: &SearchError) {
        eprintln!(
            "{} {}",
            format!("Keyword #{index}/{total} '{keyword}' failed:").red(),
            error
        );
    }
}
