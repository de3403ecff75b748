// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use lingosub::app_config::{Config, LogLevel};
use lingosub::providers::ollama::{preferred_model, Ollama};
use lingosub::translation::PersonaPreset;
use lingosub::{Controller, FileMode, JobEvent, OutputPlacement};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for FileMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliFileMode {
    Srt,
    PlainText,
}

impl From<CliFileMode> for FileMode {
    fn from(mode: CliFileMode) -> Self {
        match mode {
            CliFileMode::Srt => FileMode::Srt,
            CliFileMode::PlainText => FileMode::PlainText,
        }
    }
}

/// CLI Wrapper for PersonaPreset to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliPersonaPreset {
    General,
    Literature,
    Technical,
    Subtitle,
}

impl From<CliPersonaPreset> for PersonaPreset {
    fn from(preset: CliPersonaPreset) -> Self {
        match preset {
            CliPersonaPreset::General => PersonaPreset::General,
            CliPersonaPreset::Literature => PersonaPreset::Literature,
            CliPersonaPreset::Technical => PersonaPreset::Technical,
            CliPersonaPreset::Subtitle => PersonaPreset::Subtitle,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate SRT or plain-text documents (default command)
    Translate(TranslateArgs),

    /// List the models installed on the Ollama server
    Models(CommonArgs),

    /// Check that the Ollama server is reachable
    Check(CommonArgs),

    /// Generate shell completions for lingosub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every command that reads the configuration
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Ollama endpoint (e.g. http://localhost:11434)
    #[arg(long)]
    endpoint: Option<String>,
}

/// Options that override the translation settings of the config file
#[derive(Args, Debug, Clone)]
struct TranslateOptions {
    #[command(flatten)]
    common: CommonArgs,

    /// Output file (single input file only)
    #[arg(short, long, conflicts_with = "output_dir")]
    output: Option<PathBuf>,

    /// Output directory; relative paths under the input are kept
    #[arg(short = 'd', long)]
    output_dir: Option<PathBuf>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language name or code (e.g. 'English', 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language name or code (e.g. 'Traditional Chinese', 'ja')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Units per backend request (1-100)
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Document type to process
    #[arg(long, value_enum)]
    mode: Option<CliFileMode>,

    /// Built-in persona
    #[arg(long, value_enum)]
    preset: Option<CliPersonaPreset>,

    /// Free-text persona instruction; overrides the preset
    #[arg(long)]
    persona: Option<String>,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Input file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    #[command(flatten)]
    options: TranslateOptions,
}

/// lingosub - batch subtitle and text translation with a local LLM
#[derive(Parser, Debug)]
#[command(name = "lingosub")]
#[command(version)]
#[command(about = "Batch subtitle and plain-text translation with Ollama")]
#[command(long_about = "lingosub translates SRT subtitles and plain-text files with a local Ollama model,
batching lines per request and keeping timings, numbering and blank lines intact.

EXAMPLES:
    lingosub movie.srt                          # Translate using default config (writes movie_zh.srt)
    lingosub -t Japanese -b 10 movie.srt        # Japanese target, 10 subtitles per request
    lingosub --mode plain-text notes/           # Translate every .txt under notes/
    lingosub -d out/ season1/                   # Write results under out/, mirroring season1/
    lingosub models                             # List installed Ollama models
    lingosub check                              # Check the Ollama connection
    lingosub completions bash > lingosub.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    options: TranslateOptions,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with the most verbose level;
    // the effective level is lowered through max_level after loading the config
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "lingosub", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        Some(Commands::Models(common)) => run_models(common).await,
        Some(Commands::Check(common)) => run_check(common).await,
        None => {
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;
            run_translate(TranslateArgs {
                input_path,
                options: cli.options,
            })
            .await
        }
    }
}

/// Load the config file and apply the options every command shares
fn load_config(common: &CommonArgs) -> Result<Config> {
    if let Some(level) = &common.log_level {
        log::set_max_level(LogLevel::from(level.clone()).to_level_filter());
    }

    let mut config = Config::load_or_create(&common.config_path)?;

    if let Some(level) = &common.log_level {
        config.log_level = level.clone().into();
    }
    if let Some(endpoint) = &common.endpoint {
        config.ollama.endpoint = endpoint.clone();
    }

    log::set_max_level(config.log_level.to_level_filter());
    Ok(config)
}

fn apply_overrides(config: &mut Config, options: &TranslateOptions) {
    if let Some(model) = &options.model {
        config.translation.model = model.clone();
    }
    if let Some(source) = &options.source_language {
        config.source_language = source.clone();
    }
    if let Some(target) = &options.target_language {
        config.target_language = target.clone();
    }
    if let Some(batch_size) = options.batch_size {
        config.translation.batch_size = batch_size;
    }
    if let Some(mode) = &options.mode {
        config.file_mode = mode.clone().into();
    }
    if let Some(preset) = &options.preset {
        config.translation.persona_preset = preset.clone().into();
    }
    if let Some(persona) = &options.persona {
        config.translation.persona_instruction = Some(persona.clone());
    }
}

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░")
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    let mut config = load_config(&args.options.common)?;
    apply_overrides(&mut config, &args.options);
    config.validate().context("Configuration validation failed")?;

    let placement = match (&args.options.output, &args.options.output_dir) {
        (Some(file), _) => OutputPlacement::File(file.clone()),
        (None, Some(dir)) => OutputPlacement::Directory(dir.clone()),
        (None, None) => OutputPlacement::BesideInput,
    };

    info!(
        "Translating {} from {} to {} with model '{}' ({} per batch)",
        args.input_path.display(),
        config.source_language,
        config.target_language,
        config.translation.model,
        config.translation.batch_size
    );

    let provider = Ollama::from_config(&config.ollama).with_temperature(config.translation.temperature);
    let controller = Controller::with_config(config, provider)?;
    let mut handle = controller.spawn(args.input_path, placement);

    let cancel = handle.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current document");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let multi_progress = MultiProgress::new();
    let documents_pb = multi_progress.add(ProgressBar::new(0));
    documents_pb.set_style(bar_style(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}",
    ));
    let units_pb = multi_progress.add(ProgressBar::new(0));
    units_pb.set_style(bar_style("  [{bar:40.green/white}] {pos}/{len} units ({percent}%) {eta}"));

    while let Some(event) = handle.next_event().await {
        match event {
            JobEvent::JobProgress { completed, total } => {
                documents_pb.set_length(total as u64);
                documents_pb.set_position(completed as u64);
            }
            JobEvent::DocumentProgress { processed, total } => {
                units_pb.set_length(total as u64);
                units_pb.set_position(processed as u64);
            }
            JobEvent::Log(message) => documents_pb.set_message(message),
            JobEvent::Finished(_) => {
                units_pb.finish_and_clear();
                documents_pb.finish_with_message("done");
            }
        }
    }

    let summary = handle.join().await?;
    for (path, reason) in &summary.failed {
        error!("{}: {}", path.display(), reason);
    }
    if summary.cancelled {
        warn!("Job cancelled after {} of {} document(s)", summary.succeeded + summary.failed.len(), summary.total);
    }
    if !summary.failed.is_empty() {
        return Err(anyhow!("{} of {} document(s) failed", summary.failed.len(), summary.total));
    }

    info!("Success: {} document(s) translated", summary.succeeded);
    Ok(())
}

async fn run_models(common: CommonArgs) -> Result<()> {
    let config = load_config(&common)?;
    let ollama = Ollama::from_config(&config.ollama);
    let models = ollama
        .list_models()
        .await
        .with_context(|| format!("Failed to list models from {}", ollama.base_url()))?;

    let preferred = preferred_model(&models).map(|m| m.name.clone());
    for model in &models {
        let marker = if Some(&model.name) == preferred.as_ref() { "*" } else { " " };
        println!("{} {:<40} {:>8.1} GB", marker, model.name, model.size as f64 / 1e9);
    }
    if let Some(name) = preferred {
        info!("Suggested model: {}", name);
    }
    Ok(())
}

async fn run_check(common: CommonArgs) -> Result<()> {
    let config = load_config(&common)?;
    let ollama = Ollama::from_config(&config.ollama);
    let version = ollama
        .version()
        .await
        .with_context(|| format!("Ollama is not reachable at {}", ollama.base_url()))?;
    info!("Ollama {} is reachable at {}", version, ollama.base_url());
    Ok(())
}
