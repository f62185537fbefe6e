//! region-bench CLI
//!
//! # Output Formats
//!
//! - `text` (default): human-readable output
//! - `json`: machine-readable output for scripting
//!
//! Use `--format` / `-o` to pick one and `--quiet` / `-q` to suppress
//! informational messages.

pub mod commands;
pub mod utils;

use clap::{Arg, ArgMatches, Command};
use region_bench::config::BenchConfig;
use region_bench::logging::init_logging;
use utils::{CliError, CliResult};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}. Use 'text' or 'json'.", s)),
        }
    }
}

/// Global CLI options that apply to all commands
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub log_level: Option<String>,
    pub config_path: Option<String>,
}

impl GlobalOptions {
    /// Extract global options from argument matches
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let output_format = matches
            .get_one::<String>("format")
            .map(|s| s.parse().unwrap_or_default())
            .unwrap_or_default();

        GlobalOptions {
            output_format,
            quiet: matches.get_flag("quiet"),
            log_level: matches.get_one::<String>("log-level").cloned(),
            config_path: matches.get_one::<String>("config").cloned(),
        }
    }

    pub fn is_json(&self) -> bool {
        self.output_format == OutputFormat::Json
    }

    /// Whether informational text should be printed
    pub fn chatty(&self) -> bool {
        !self.is_json() && !self.quiet
    }

    /// Load the configuration file (if any), apply environment overrides and
    /// the `--log-level` flag, then install logging.
    pub fn load_config(&self) -> CliResult<BenchConfig> {
        let mut config = match &self.config_path {
            Some(path) => BenchConfig::from_file(path).map_err(CliError::from)?,
            None => BenchConfig::default(),
        };
        config.apply_env().map_err(CliError::from)?;
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        let level = config
            .logging
            .level
            .parse()
            .map_err(|_| format!("Unknown log level: {}", config.logging.level))?;
        init_logging(level, config.logging.json);
        Ok(config)
    }
}

/// Build the CLI command structure
pub fn build_cli() -> Command {
    Command::new("region-bench")
        .about("Region pre-split calculator and write throughput benchmark")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("format")
                .help("Output format: text (default) or json")
                .short('o')
                .long("format")
                .global(true)
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            Arg::new("quiet")
                .help("Suppress informational output (errors still shown)")
                .short('q')
                .long("quiet")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .help("Log level: trace, debug, info, warn, error")
                .long("log-level")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .help("JSON configuration file")
                .short('c')
                .long("config")
                .global(true),
        )
        .subcommand(commands::split::split_command())
        .subcommand(commands::bench::bench_command())
        .subcommand(commands::table::table_command())
}

/// Dispatch to appropriate command handler
pub fn run(matches: ArgMatches) -> CliResult<()> {
    match matches.subcommand() {
        Some(("split", sub)) => commands::split::run_split(sub),
        Some(("bench", sub)) => commands::bench::run_bench(sub),
        Some(("table", sub)) => commands::table::run_table(sub),
        _ => Err("Unknown command. Use --help for available commands.".into()),
    }
}
