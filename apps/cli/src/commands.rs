//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use meetingprep_core::Generation;
use meetingprep_core::pipeline::{PrepareResult, ProgressReporter};
use meetingprep_shared::{
    AppConfig, CredentialOverrides, DerivedField, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES,
    MeetingInputs, init_config, load_config,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// MeetingPrep — research a company and draft an executive meeting brief.
#[derive(Parser)]
#[command(
    name = "meetingprep",
    version,
    about = "Research a company and draft an executive brief for an upcoming meeting.",
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

/// Output format for the prepared brief.
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// The executive brief, verbatim.
    Markdown,
    /// The full session state (inputs, search context, every step).
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Prepare an executive brief for a meeting.
    Prepare(PrepareArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Form fields and per-run overrides for `prepare`.
#[derive(Args, Debug)]
pub(crate) struct PrepareArgs {
    /// Company the meeting is with.
    #[arg(short, long)]
    pub company: String,

    /// Meeting objective.
    #[arg(long, default_value = "")]
    pub objective: String,

    /// Attendee and role, e.g. "Alice (CFO)". Repeat for each attendee.
    #[arg(short, long = "attendee")]
    pub attendees: Vec<String>,

    /// Read attendees from a file, one per line.
    #[arg(long, conflicts_with = "attendees")]
    pub attendees_file: Option<PathBuf>,

    /// Meeting duration in minutes (15-180). Defaults to the config value.
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(MIN_DURATION_MINUTES as i64..=MAX_DURATION_MINUTES as i64)
    )]
    pub duration: Option<u32>,

    /// Specific areas of focus or concerns.
    #[arg(short, long, default_value = "")]
    pub focus: String,

    /// Override the generation model for this run.
    #[arg(long)]
    pub model: Option<String>,

    /// Override the sampling temperature for this run.
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Search API key (overrides the environment).
    #[arg(long)]
    pub search_api_key: Option<String>,

    /// Generation API key (overrides the environment).
    #[arg(long)]
    pub generation_api_key: Option<String>,

    /// Write the output to a file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "markdown")]
    pub format: OutputFormat,
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

/// Initialize tracing based on CLI flags. Logs go to stderr so the brief
/// can be piped from stdout.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "meetingprep=info",
        1 => "meetingprep=debug",
        _ => "meetingprep=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
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
        Command::Prepare(args) => cmd_prepare(args).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// prepare
// ---------------------------------------------------------------------------

async fn cmd_prepare(args: PrepareArgs) -> Result<()> {
    let mut config = load_config()?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    let attendees = match &args.attendees_file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| eyre!("cannot read attendees file '{}': {e}", path.display()))?,
        None => args.attendees.join("\n"),
    };

    let inputs = MeetingInputs::new(
        args.company.clone(),
        args.objective.clone(),
        attendees,
        args.duration.unwrap_or(config.defaults.duration_minutes),
        args.focus.clone(),
    );

    let overrides = CredentialOverrides {
        search_api_key: args.search_api_key.clone(),
        generation_api_key: args.generation_api_key.clone(),
    };

    info!(
        company = %inputs.company_name,
        duration = inputs.meeting_duration,
        attendees = inputs.attendee_lines().count(),
        model = %config.generation.model,
        "preparing meeting brief"
    );

    let reporter = CliProgress::new();
    let result =
        match meetingprep_core::prepare_meeting(&config, &overrides, inputs, &reporter).await {
            Ok(result) => result,
            Err(e) => {
                reporter.spinner.finish_and_clear();
                return Err(e.into());
            }
        };

    let rendered = render(&result, &args.format)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, &rendered)
                .map_err(|e| eyre!("cannot write '{}': {e}", path.display()))?;
            eprintln!("  Brief written to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    eprintln!();
    eprintln!("  Session: {}", result.state.session_id());
    eprintln!("  Sources: {}", result.state.search_result_count());
    eprintln!(
        "  Tokens:  {} in / {} out",
        result.total_tokens_in, result.total_tokens_out
    );
    eprintln!("  Time:    {:.1}s", result.elapsed.as_secs_f64());

    Ok(())
}

/// Fold per-run flags into the loaded config.
fn apply_overrides(config: &mut AppConfig, args: &PrepareArgs) {
    if let Some(model) = &args.model {
        config.generation.model = model.clone();
    }
    if let Some(temperature) = args.temperature {
        config.generation.temperature = temperature;
    }
}

/// Produce the final document. Markdown is the brief exactly as generated.
fn render(result: &PrepareResult, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(result.brief().to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&result.state)?),
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

fn step_label(field: DerivedField) -> &'static str {
    match field {
        DerivedField::ContextAnalysis => "Analyzing meeting context",
        DerivedField::IndustryInsights => "Gathering industry insights",
        DerivedField::Strategy => "Formulating strategy",
        DerivedField::ExecutiveBrief => "Writing executive brief",
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn step_started(&self, field: DerivedField, current: usize, total: usize) {
        self.spinner
            .set_message(format!("[{current}/{total}] {}", step_label(field)));
    }

    fn step_finished(&self, _field: DerivedField, _generation: &Generation) {}

    fn done(&self, _result: &PrepareResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_prepare_flags() {
        let cli = Cli::try_parse_from([
            "meetingprep",
            "prepare",
            "--company",
            "Acme",
            "--objective",
            "Q3 review",
            "-a",
            "Alice (CFO)",
            "-a",
            "Bob (CTO)",
            "--duration",
            "45",
            "--focus",
            "budget",
            "--format",
            "json",
        ])
        .expect("parse");

        match cli.command {
            Command::Prepare(args) => {
                assert_eq!(args.company, "Acme");
                assert_eq!(args.attendees, vec!["Alice (CFO)", "Bob (CTO)"]);
                assert_eq!(args.duration, Some(45));
                assert_eq!(args.format, OutputFormat::Json);
            }
            _ => panic!("expected prepare"),
        }
    }

    #[test]
    fn rejects_duration_out_of_range() {
        for bad in ["10", "181"] {
            let result = Cli::try_parse_from([
                "meetingprep",
                "prepare",
                "--company",
                "Acme",
                "--duration",
                bad,
            ]);
            assert!(result.is_err(), "duration {bad} should be rejected");
        }
    }

    #[test]
    fn attendee_flags_conflict_with_file() {
        let result = Cli::try_parse_from([
            "meetingprep",
            "prepare",
            "--company",
            "Acme",
            "-a",
            "Alice",
            "--attendees-file",
            "people.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn overrides_replace_model_and_temperature() {
        let cli = Cli::try_parse_from([
            "meetingprep",
            "prepare",
            "--company",
            "Acme",
            "--model",
            "llama-3.3-70b-versatile",
            "--temperature",
            "0.7",
        ])
        .expect("parse");
        let Command::Prepare(args) = cli.command else {
            panic!("expected prepare");
        };

        let mut config = AppConfig::default();
        apply_overrides(&mut config, &args);
        assert_eq!(config.generation.model, "llama-3.3-70b-versatile");
        assert!((config.generation.temperature - 0.7).abs() < f32::EPSILON);
    }
}
