//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use faqpilot_core::{AskConfig, DOCS_EXPORT_BASE, ExtractConfig, IndexConfig, ProgressReporter};
use faqpilot_llm::OpenAiClient;
use faqpilot_search::ElasticClient;
use faqpilot_shared::{config_file_path, init_config, load_config, resolve_api_key};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// faqpilot — answer course questions from indexed FAQ documents.
#[derive(Parser)]
#[command(
    name = "faqpilot",
    version,
    about = "Extract course FAQ documents, index them, and answer questions grounded in them.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch every configured course document and write the corpus file.
    Extract {
        /// Corpus output path (defaults to the configured documents path).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Provision the search index and write every corpus record into it.
    Index {
        /// Corpus input path (defaults to the configured documents path).
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Delete any existing index before provisioning.
        #[arg(long)]
        recreate: bool,
    },

    /// Answer a question grounded in the indexed FAQ records.
    Ask {
        /// The question to answer.
        question: String,

        /// Course to search (defaults to the configured course).
        #[arg(short, long)]
        course: Option<String>,

        /// How many retrieved records feed the answer context.
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = format!(
        "warn,faqpilot_cli={level},faqpilot_shared={level},faqpilot_extractor={level},\
         faqpilot_search={level},faqpilot_llm={level},faqpilot_core={level}"
    );

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Extract { output } => cmd_extract(output).await,
        Command::Index { input, recreate } => cmd_index(input, recreate).await,
        Command::Ask {
            question,
            course,
            top_k,
        } => cmd_ask(&question, course.as_deref(), top_k).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_extract(output: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;

    let output_path = output.unwrap_or_else(|| PathBuf::from(&config.defaults.documents_path));

    let extract_config = ExtractConfig {
        sources: config.sources,
        output_path,
        export_base_url: DOCS_EXPORT_BASE.to_string(),
    };

    info!(
        courses = extract_config.sources.len(),
        output = %extract_config.output_path.display(),
        "extracting course documents"
    );

    let reporter = CliProgress::new();
    let result = faqpilot_core::extract_corpus(&extract_config, &reporter).await?;
    reporter.finish();

    println!();
    println!("  Corpus written!");
    println!("  Courses: {}", result.course_count);
    println!("  Records: {}", result.record_count);
    if !result.failed_courses.is_empty() {
        println!("  Failed:  {}", result.failed_courses.join(", "));
    }
    println!("  Path:    {}", result.output_path.display());
    println!("  Time:    {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_index(input: Option<PathBuf>, recreate: bool) -> Result<()> {
    let config = load_config()?;

    let input_path = input.unwrap_or_else(|| PathBuf::from(&config.defaults.documents_path));

    let store = ElasticClient::new(config.search.url.clone(), config.search.index.clone())?;

    let index_config = IndexConfig {
        input_path,
        recreate,
    };

    info!(
        index = %config.search.index,
        url = %config.search.url,
        "indexing corpus"
    );

    let reporter = CliProgress::new();
    let result = faqpilot_core::index_corpus(&index_config, &store, &reporter).await?;
    reporter.finish();

    println!();
    println!("  Corpus indexed!");
    println!("  Index:   {}", store.index_name());
    println!("  Records: {}", result.record_count);
    println!("  Time:    {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_ask(question: &str, course: Option<&str>, top_k: Option<usize>) -> Result<()> {
    let config = load_config()?;
    let api_key = resolve_api_key(&config)?;

    let store = ElasticClient::new(config.search.url.clone(), config.search.index.clone())?;
    let provider = OpenAiClient::new(
        api_key,
        config.openai.base_url.clone(),
        config.openai.model.clone(),
    )?;

    let ask_config = AskConfig {
        question: question.to_string(),
        course: course
            .map(String::from)
            .unwrap_or_else(|| config.defaults.course.clone()),
        top_k: top_k.unwrap_or(config.defaults.top_k),
    };

    info!(
        course = %ask_config.course,
        model = %provider.model(),
        "answering question"
    );

    let reporter = CliProgress::new();
    let result = faqpilot_core::answer_question(&ask_config, &store, &provider, &reporter).await?;
    reporter.finish();

    println!();
    println!("{}", result.answer);
    println!();
    println!(
        "  ({} records from '{}' in {:.1}s)",
        result.retrieved.len(),
        ask_config.course,
        result.elapsed.as_secs_f64()
    );

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let path = config_file_path()?;

    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# defaults (no config file at {})", path.display());
    }

    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");

    match resolve_api_key(&config) {
        Ok(_) => println!("# OpenAI API key: set via {}", config.openai.api_key_env),
        Err(_) => println!(
            "# OpenAI API key: not set ({} is unset or empty)",
            config.openai.api_key_env
        ),
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using indicatif spinners/bars.
///
/// Extraction runs on the spinner; record indexing swaps it for a bounded bar
/// once the record total is known.
struct CliProgress {
    spinner: ProgressBar,
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self {
            spinner,
            bar: Mutex::new(None),
        }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
        if let Ok(guard) = self.bar.lock() {
            if let Some(bar) = guard.as_ref() {
                bar.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn course_done(&self, course: &str, records: usize, current: usize, total: usize) {
        self.spinner
            .set_message(format!("[{current}/{total}] {course}: {records} records"));
    }

    fn record_indexed(&self, current: usize, total: usize) {
        if let Ok(mut guard) = self.bar.lock() {
            let bar = guard.get_or_insert_with(|| {
                self.spinner.finish_and_clear();
                let bar = ProgressBar::new(total as u64);
                bar.set_style(
                    ProgressStyle::with_template("{bar:30.cyan/dim} {pos}/{len} records").unwrap(),
                );
                bar
            });
            bar.set_position(current as u64);
        }
    }
}
