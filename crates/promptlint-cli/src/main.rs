use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use promptlint_core::{
    render_report, should_colorize, ColorOverrides, ConfigOverrides, FileRuleRepository,
    OpenAiValidator, OutputFormat, PromptValidator, RuleRepository, RuleSet, TerminalSignals,
    ValidatorConfig,
};
use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "promptlint",
    author,
    version,
    about = "Check an LLM prompt against style rules using a remote model"
)]
struct Cli {
    /// Read the prompt from this file instead of stdin
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// YAML rule file to use instead of the built-in rules
    #[arg(long, value_name = "FILE", global = true)]
    rules: Option<PathBuf>,

    /// Config file (TOML, YAML or JSON) with an `llm` table: api_key, endpoint, model
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = FormatArg::Human)]
    format: FormatArg,

    /// Force colored output even when stdout is not a terminal
    #[arg(long, global = true)]
    force_color: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the loaded rules
    ListRules {
        /// Emit rules as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Human,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Human => OutputFormat::Human,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    llm: ConfigOverrides,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let colorize = should_colorize(
        ColorOverrides {
            force_color: cli.force_color,
            no_color: cli.no_color,
        },
        &TerminalSignals::detect(),
    );
    colored::control::set_override(colorize);
    init_tracing(colorize);

    match run(cli, colorize).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}: {err:#}", "error".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, colorize: bool) -> Result<()> {
    info!("Starting promptlint v{}", env!("CARGO_PKG_VERSION"));

    let repo = match &cli.rules {
        Some(path) => FileRuleRepository::new(path),
        None => FileRuleRepository::builtin(),
    };
    let rules = repo
        .load_rules()
        .await
        .context("failed to load rules")?;
    info!("Loaded {} rules successfully", rules.len());

    if let Some(Commands::ListRules { json }) = cli.command {
        return list_rules(&rules, json);
    }

    let prompt = read_prompt(cli.file.as_deref()).await?;
    if prompt.trim().is_empty() {
        bail!("Empty input. Please provide a prompt to check.");
    }

    let overrides = load_config_file(cli.config.as_deref())?;
    let config = ValidatorConfig::from_env(&overrides).context("Error setting up LLM API")?;
    info!(?config, "Configuration completed");

    let validator = OpenAiValidator::new(&config).context("Error setting up LLM API")?;
    let issues = validator
        .validate(&prompt, &rules)
        .await
        .context("Error checking prompt with LLM API")?;

    info!("Generating final report");
    let report = render_report(&issues, cli.format.into(), colorize)?;
    println!("{report}");
    info!("Finished");
    Ok(())
}

async fn read_prompt(file: Option<&Path>) -> Result<String> {
    if let Some(path) = file {
        info!("Reading prompt from file: {}", path.display());
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read prompt file {}", path.display()));
    }
    if std::io::stdin().is_terminal() {
        bail!("No input provided. Please specify a file with --file or pipe data to stdin (see --help).");
    }
    info!("Reading prompt from stdin");
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("error reading from stdin")?;
    Ok(input)
}

fn load_config_file(path: Option<&Path>) -> Result<ConfigOverrides> {
    let Some(path) = path else {
        return Ok(ConfigOverrides::default());
    };
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .build()
        .with_context(|| format!("failed to load config file {}", path.display()))?;
    let file: FileConfig = settings
        .try_deserialize()
        .with_context(|| format!("invalid settings in config file {}", path.display()))?;
    Ok(file.llm)
}

fn list_rules(rules: &RuleSet, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rules)?);
        return Ok(());
    }

    println!("{} rule(s) loaded", rules.len());
    for (idx, rule) in rules.iter().enumerate() {
        println!(
            "{idx:>3}. {name:<24} {text}",
            idx = idx + 1,
            name = rule.name.bold(),
            text = rule.rule
        );
    }
    Ok(())
}

fn init_tracing(colorize: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,hyper=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(colorize)
        .with_target(false)
        .try_init();
}
