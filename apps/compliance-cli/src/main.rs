//! fire-check
//!
//! Command-line stand-in for the modeling host: reads a rule document and an
//! element dump, runs the compliance engine and prints the report.
//!
//! Exit codes:
//!
//! - `0`: every evaluated pair is compliant
//! - `1`: at least one issue was reported
//! - `2`: the run could not start (missing or malformed input, bad config)

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use compliance_engine::reporter::{OutputFormat, Reporter};
use compliance_engine::{CheckerConfig, ParameterResolver, RuleSet, UnitTable};
use serde::Deserialize;
use shared_types::ElementRecord;
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};


const FATAL_EXIT: u8 = 2;

/// Command-line arguments for fire-check
#[derive(Parser, Debug)]
#[command(name = "fire-check")]
#[command(version, about = "Check building elements against fire-safety compliance rules")]
struct Args {
    /// Rule document (JSON with a top-level "rules" list)
    #[arg(short, long)]
    rules: PathBuf,

    /// Element dump exported by the modeling host
    #[arg(short, long, required_unless_present = "validate_only")]
    elements: Option<PathBuf>,

    /// Checker configuration (TOML); built-in bindings and units when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Console)]
    format: Format,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only load and validate the rule document
    #[arg(long)]
    validate_only: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Console,
    Json,
    JsonPretty,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Console => OutputFormat::Console,
            Format::Json => OutputFormat::Json,
            Format::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

/// Result of a run that got as far as producing output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Clean,
    IssuesFound,
}

impl Verdict {
    fn exit_code(self) -> ExitCode {
        match self {
            Verdict::Clean => ExitCode::SUCCESS,
            Verdict::IssuesFound => ExitCode::from(1),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // stdout carries the report, logs go to stderr
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::registry()
        .with(log_filter(rust_log.as_deref(), args.verbose))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&args) {
        Ok(verdict) => verdict.exit_code(),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(FATAL_EXIT)
        }
    }
}

/// RUST_LOG when set and valid, otherwise INFO (DEBUG with `--verbose`)
fn log_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(log_level.into()))
}

fn run(args: &Args) -> anyhow::Result<Verdict> {
    let config = match &args.config {
        Some(path) => CheckerConfig::from_file(path)?,
        None => CheckerConfig::default(),
    };

    let rules = RuleSet::load(&args.rules)?;

    if args.validate_only {
        let resolver = ParameterResolver::new(config.bindings.clone());
        print!("{}", describe_rules(&rules, &resolver, &config.units)?);
        return Ok(Verdict::Clean);
    }

    let elements_path = args
        .elements
        .as_deref()
        .context("--elements is required unless --validate-only is set")?;
    let elements = load_elements(elements_path)?;
    info!(
        elements = elements.len(),
        rules = rules.len(),
        "Checking elements"
    );

    let report = config.engine().check(&elements, &rules);
    let reporter = Reporter::new(args.format.into());
    match &args.output {
        Some(path) => {
            reporter
                .write_to_file(&report, path)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            info!(path = %path.display(), "Report written");
        }
        None => reporter.report(&report)?,
    }

    Ok(if report.has_issues() {
        Verdict::IssuesFound
    } else {
        Verdict::Clean
    })
}

/// Element dump with each entry left as raw JSON until it is converted
#[derive(Deserialize)]
struct RawElementDocument {
    elements: Vec<serde_json::Value>,
}

/// Read an element dump. Entries that do not form an element are logged and
/// skipped; only an unreadable file or a missing `elements` list is fatal.
fn load_elements(path: &Path) -> anyhow::Result<Vec<ElementRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read element file: {}", path.display()))?;
    let document: RawElementDocument = serde_json::from_str(&text)
        .with_context(|| format!("Malformed element file: {}", path.display()))?;

    let mut elements = Vec::with_capacity(document.elements.len());
    for (index, raw) in document.elements.into_iter().enumerate() {
        match serde_json::from_value::<ElementRecord>(raw) {
            Ok(element) => elements.push(element),
            Err(err) => warn!(index, error = %err, "Skipping malformed element"),
        }
    }
    Ok(elements)
}

/// One line per rule with its parsed condition and any binding or unit problem
fn describe_rules(
    rules: &RuleSet,
    resolver: &ParameterResolver,
    units: &UnitTable,
) -> anyhow::Result<String> {
    let mut output = String::new();
    writeln!(output, "Rule set OK: {} rules", rules.len())?;

    for compiled in rules {
        let rule = compiled.rule();
        write!(
            output,
            "  {}  {}  {}",
            rule.clause,
            rule.parameter,
            compiled.condition()
        )?;
        if !rule.unit.is_empty() {
            write!(output, "  [{}]", rule.unit)?;
        }
        if resolver.resolve(&rule.parameter).is_err() {
            write!(output, "  (no binding)")?;
        }
        if !units.is_known(&rule.unit) {
            write!(output, "  (unknown unit, compared unscaled)")?;
        }
        writeln!(output)?;
    }

    Ok(output)
}
