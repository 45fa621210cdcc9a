//! Diagnostic output for the CLI
//!
//! Two sinks share one policy:
//! - `TerminalEmitter` writes rustc-style blocks to stderr
//! - `JsonEmitter` collects records for a machine-readable report
//!
//! `--strict` turns dropped-record warnings into errors, `--quiet` hides
//! everything that is not an error after that escalation.
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | no effective error was reported |
//! | 1 | at least one effective error was reported |
//!
//! `--quiet` never changes the exit code, only what is printed.

use std::io::Write;
use std::path::PathBuf;
use std::process;

use ganttview_core::{Diagnostic, DiagnosticEmitter, Severity};
use serde::Serialize;

// ============================================================================
// Exit Code
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}

// ============================================================================
// Policy
// ============================================================================

/// How `--strict` and `--quiet` shape what gets reported
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticConfig {
    pub strict: bool,
    pub quiet: bool,
}

impl DiagnosticConfig {
    pub fn effective_severity(&self, severity: Severity) -> Severity {
        match severity {
            Severity::Warning if self.strict => Severity::Error,
            s => s,
        }
    }

    fn shows(&self, effective: Severity) -> bool {
        !self.quiet || effective == Severity::Error
    }
}

/// Error and warning counts after escalation
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    errors: usize,
    warnings: usize,
}

impl Tally {
    fn record(&mut self, effective: Severity) {
        match effective {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => {}
        }
    }

    fn exit_code(self) -> ExitCode {
        if self.errors > 0 {
            ExitCode::Failure
        } else {
            ExitCode::Success
        }
    }
}

// ============================================================================
// Emitters
// ============================================================================

pub struct TerminalEmitter<W: Write> {
    writer: W,
    config: DiagnosticConfig,
    tally: Tally,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, config: DiagnosticConfig) -> Self {
        Self {
            writer,
            config,
            tally: Tally::default(),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        self.tally.exit_code()
    }

    fn write_block(&mut self, diagnostic: &Diagnostic, severity: Severity) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "{}[{}]: {}",
            severity.as_str(),
            diagnostic.code.as_str(),
            diagnostic.message
        )?;

        let location = match (&diagnostic.file, diagnostic.record) {
            (Some(file), Some(record)) => Some(format!("{} (record {})", file.display(), record)),
            (Some(file), None) => Some(file.display().to_string()),
            (None, Some(record)) => Some(format!("record {}", record)),
            (None, None) => None,
        };
        if let Some(location) = location {
            writeln!(self.writer, "  --> {}", location)?;
        }

        if !diagnostic.notes.is_empty() {
            writeln!(self.writer, "   |")?;
            for note in &diagnostic.notes {
                writeln!(self.writer, "   = {}", note)?;
            }
        }
        writeln!(self.writer)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        let severity = self.config.effective_severity(diagnostic.severity);
        self.tally.record(severity);
        if self.config.shows(severity) {
            // stderr may be closed
            let _ = self.write_block(&diagnostic, severity);
        }
    }
}

/// One entry of the JSON diagnostics report
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub code: &'static str,
    pub severity: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

pub struct JsonEmitter {
    entries: Vec<JsonDiagnostic>,
    config: DiagnosticConfig,
    tally: Tally,
}

impl JsonEmitter {
    pub fn new(config: DiagnosticConfig) -> Self {
        Self {
            entries: Vec::new(),
            config,
            tally: Tally::default(),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        self.tally.exit_code()
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(&self.entries).unwrap_or(serde_json::Value::Null)
    }
}

impl DiagnosticEmitter for JsonEmitter {
    fn emit(&mut self, diagnostic: Diagnostic) {
        let severity = self.config.effective_severity(diagnostic.severity);
        self.tally.record(severity);
        if !self.config.shows(severity) {
            return;
        }
        self.entries.push(JsonDiagnostic {
            code: diagnostic.code.as_str(),
            severity: severity.as_str(),
            message: diagnostic.message,
            file: diagnostic.file.map(|p| p.display().to_string()),
            record: diagnostic.record,
            notes: diagnostic.notes,
        });
    }
}

/// Attaches the input file to diagnostics that carry none
pub struct FileScope<'a> {
    inner: &'a mut dyn DiagnosticEmitter,
    file: PathBuf,
}

impl<'a> FileScope<'a> {
    pub fn new(inner: &'a mut dyn DiagnosticEmitter, file: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            file: file.into(),
        }
    }
}

impl DiagnosticEmitter for FileScope<'_> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        let diagnostic = match diagnostic.file {
            Some(_) => diagnostic,
            None => diagnostic.with_file(self.file.clone()),
        };
        self.inner.emit(diagnostic);
    }
}
