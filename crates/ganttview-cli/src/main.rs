//! ganttview CLI - Gantt chart layout for event data
//!
//! Command-line interface for checking, laying out and rendering event files.

mod diagnostics;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ganttview_core::{
    ChartConfig, DiagnosticEmitter, Layout, OverlapRule, Record, Renderer, Viewport,
};
use ganttview_layout::{build_layout, normalize, Grouping};
use ganttview_render::{HtmlRenderer, JsonRenderer, SvgRenderer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use diagnostics::{DiagnosticConfig, ExitCode, FileScope, JsonEmitter, TerminalEmitter};

#[derive(Parser)]
#[command(name = "ganttview")]
#[command(author, version, about = "Row-packed Gantt charts for event data", long_about = None)]
struct Cli {
    /// Verbose output (-v warnings, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize records and report diagnostics
    Check {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Compute the chart layout and print it as JSON
    Layout {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render the chart
    Render {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Svg)]
        format: OutputFormat,

        /// Page title for HTML output
        #[arg(long)]
        title: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Record file (.json, .ndjson, .jsonl or .csv)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Chart configuration file (TOML, or JSON by extension)
    #[arg(short, long, env = "GANTTVIEW_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    chart: ChartArgs,

    /// Surface width in pixels
    #[arg(long, default_value_t = Viewport::default().width)]
    width: f64,

    /// Surface height in pixels
    #[arg(long, default_value_t = Viewport::default().height)]
    height: f64,

    /// Diagnostic output format
    #[arg(long, value_enum, default_value_t = DiagnosticFormat::Text)]
    diagnostics: DiagnosticFormat,

    /// Treat warnings as errors
    #[arg(long)]
    strict: bool,

    /// Only print errors
    #[arg(short, long)]
    quiet: bool,
}

/// Chart options; each one overrides the configuration file
#[derive(Args)]
struct ChartArgs {
    #[arg(long)]
    start_field: Option<String>,
    #[arg(long)]
    end_field: Option<String>,
    #[arg(long)]
    duration_field: Option<String>,
    #[arg(long)]
    category_field: Option<String>,
    #[arg(long)]
    series_field: Option<String>,
    #[arg(long)]
    extras_field: Option<String>,
    #[arg(long)]
    drilldown_field: Option<String>,
    #[arg(long)]
    category_label: Option<String>,
    #[arg(long)]
    series_label: Option<String>,
    /// Hide the series legend
    #[arg(long)]
    no_legend: bool,
    /// Thin bars with tight spacing
    #[arg(long)]
    compact: bool,
    /// Horizontal overlap rule for row packing
    #[arg(long, value_enum)]
    packing: Option<Packing>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Packing {
    HalfOpen,
    Inclusive,
}

impl From<Packing> for OverlapRule {
    fn from(packing: Packing) -> Self {
        match packing {
            Packing::HalfOpen => OverlapRule::HalfOpen,
            Packing::Inclusive => OverlapRule::Inclusive,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Svg,
    Html,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DiagnosticFormat {
    Text,
    Json,
}

impl ChartArgs {
    /// Apply command-line overrides on top of a base configuration
    fn apply(&self, mut config: ChartConfig) -> ChartConfig {
        if let Some(name) = &self.start_field {
            config = config.start_field(name.as_str());
        }
        if let Some(name) = &self.end_field {
            config = config.end_field(name.as_str());
        }
        if let Some(name) = &self.duration_field {
            config = config.duration_field(name.as_str());
        }
        if let Some(name) = &self.category_field {
            config = config.category_field(name.as_str());
        }
        if let Some(name) = &self.series_field {
            config = config.series_field(name.as_str());
        }
        if let Some(name) = &self.extras_field {
            config = config.extras_field(name.as_str());
        }
        if let Some(name) = &self.drilldown_field {
            config = config.drilldown_field(name.as_str());
        }
        if let Some(label) = &self.category_label {
            config = config.category_label(label.as_str());
        }
        if let Some(label) = &self.series_label {
            config = config.series_label(label.as_str());
        }
        if self.no_legend {
            config = config.show_legend(false);
        }
        if self.compact {
            config = config.compact(true);
        }
        if let Some(packing) = self.packing {
            config = config.packing(packing.into());
        }
        config
    }
}

/// Diagnostic sink selected on the command line
enum Reporter {
    Terminal(TerminalEmitter<std::io::Stderr>),
    Json(JsonEmitter),
}

impl Reporter {
    fn new(format: DiagnosticFormat, config: DiagnosticConfig) -> Self {
        match format {
            DiagnosticFormat::Text => Reporter::Terminal(TerminalEmitter::new(std::io::stderr(), config)),
            DiagnosticFormat::Json => Reporter::Json(JsonEmitter::new(config)),
        }
    }

    fn emitter(&mut self) -> &mut dyn DiagnosticEmitter {
        match self {
            Reporter::Terminal(emitter) => emitter,
            Reporter::Json(emitter) => emitter,
        }
    }

    fn exit_code(&self) -> ExitCode {
        match self {
            Reporter::Terminal(emitter) => emitter.exit_code(),
            Reporter::Json(emitter) => emitter.exit_code(),
        }
    }

    /// JSON diagnostics, when selected
    fn json(&self) -> Option<serde_json::Value> {
        match self {
            Reporter::Terminal(_) => None,
            Reporter::Json(emitter) => Some(emitter.to_json_value()),
        }
    }

    /// Print collected JSON diagnostics to stderr
    fn flush(&self) -> Result<()> {
        if let Some(value) = self.json() {
            let mut stderr = std::io::stderr();
            writeln!(stderr, "{}", serde_json::to_string_pretty(&value)?)?;
        }
        Ok(())
    }
}

/// Everything a command needs after loading its inputs
struct Session {
    file: PathBuf,
    config: ChartConfig,
    records: Vec<Record>,
    viewport: Viewport,
    reporter: Reporter,
}

impl Session {
    fn open(input: &InputArgs) -> Result<Self> {
        let base = match &input.config {
            Some(path) => ganttview_input::load_config(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ChartConfig::new(),
        };
        let config = input.chart.apply(base);
        let records = ganttview_input::parse_file(&input.file)
            .with_context(|| format!("failed to read records from {}", input.file.display()))?;
        tracing::info!(
            file = %input.file.display(),
            records = records.len(),
            "loaded records"
        );

        let diagnostic_config = DiagnosticConfig {
            strict: input.strict,
            quiet: input.quiet,
        };

        Ok(Self {
            file: input.file.clone(),
            config,
            records,
            viewport: Viewport::new(input.width, input.height),
            reporter: Reporter::new(input.diagnostics, diagnostic_config),
        })
    }

    /// Normalize and lay out; `None` on a configuration error
    fn layout(&mut self) -> Option<(usize, Layout)> {
        let mut scope = FileScope::new(self.reporter.emitter(), &self.file);
        let tasks = normalize(&self.config, &self.records, &mut scope).ok()?;
        let layout = build_layout(
            &tasks,
            &self.config,
            self.viewport,
            &ganttview_core::ApproxTextMeasure::default(),
        );
        Some((tasks.len(), layout))
    }
}

fn main() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Commands::Check { input } => cmd_check(&input)?,
        Commands::Layout { input, output } => cmd_layout(&input, output.as_deref())?,
        Commands::Render {
            input,
            format,
            title,
            output,
        } => cmd_render(&input, format, title, output.as_deref())?,
    };

    Ok(code.into())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "error",
        1 => "warn",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn cmd_check(input: &InputArgs) -> Result<ExitCode> {
    let mut session = Session::open(input)?;
    let normalized = {
        let mut scope = FileScope::new(session.reporter.emitter(), &session.file);
        normalize(&session.config, &session.records, &mut scope).ok()
    };

    let summary = normalized.as_ref().map(|tasks| {
        let grouping = Grouping::from_tasks(tasks);
        serde_json::json!({
            "records": session.records.len(),
            "tasks": tasks.len(),
            "dropped": session.records.len() - tasks.len(),
            "categories": grouping.categories,
            "series": grouping.series,
        })
    });

    match session.reporter.json() {
        Some(diagnostics) => {
            let report = serde_json::json!({
                "file": session.file.display().to_string(),
                "summary": summary,
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        None => {
            if let Some(summary) = &summary {
                println!(
                    "{}: {} records, {} tasks, {} categories, {} series",
                    session.file.display(),
                    summary["records"],
                    summary["tasks"],
                    summary["categories"].as_array().map_or(0, Vec::len),
                    summary["series"].as_array().map_or(0, Vec::len),
                );
            }
        }
    }

    Ok(session.reporter.exit_code())
}

fn cmd_layout(input: &InputArgs, output: Option<&Path>) -> Result<ExitCode> {
    let mut session = Session::open(input)?;
    let Some((_, layout)) = session.layout() else {
        session.reporter.flush()?;
        return Ok(ExitCode::Failure);
    };

    let json = JsonRenderer::pretty().render(&layout)?;
    write_output(output, &json)?;
    session.reporter.flush()?;
    Ok(session.reporter.exit_code())
}

fn cmd_render(
    input: &InputArgs,
    format: OutputFormat,
    title: Option<String>,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let mut session = Session::open(input)?;
    let Some((tasks, layout)) = session.layout() else {
        session.reporter.flush()?;
        return Ok(ExitCode::Failure);
    };

    let rendered = match format {
        OutputFormat::Svg => SvgRenderer::new().render(&layout)?,
        OutputFormat::Html => {
            let title = title.unwrap_or_else(|| {
                session
                    .file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "Gantt Chart".to_string())
            });
            HtmlRenderer::new().title(title).render(&layout)?
        }
        OutputFormat::Json => JsonRenderer::pretty().render(&layout)?,
    };
    tracing::debug!(tasks, bytes = rendered.len(), "rendered chart");

    write_output(output, &rendered)?;
    session.reporter.flush()?;
    Ok(session.reporter.exit_code())
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", content)?;
            Ok(())
        }
    }
}
