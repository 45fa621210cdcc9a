//! Diagnostics raised while turning records into a chart.
//!
//! Diagnostics never stop a layout pass on their own. Normalization drops
//! the offending record and reports why; the caller decides what to do
//! with the report (print it, fail in strict mode, ignore it).
//!
//! | Code | Default severity | Raised when |
//! |------|------------------|-------------|
//! | E001 | error | fewer than two time fields are configured |
//! | W001 | warning | a record cannot be resolved into a task |
//! | W002 | warning | no task survives normalization |
//! | I001 | info | an extras value is not valid JSON and is kept as text |

use serde::Serialize;
use std::path::PathBuf;

/// Diagnostic severity, most severe first
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// Stable diagnostic codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    E001InsufficientTimeFields,
    W001UnresolvableRecord,
    W002EmptyDataset,
    I001ExtrasAsText,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::E001InsufficientTimeFields => "E001",
            DiagnosticCode::W001UnresolvableRecord => "W001",
            DiagnosticCode::W002EmptyDataset => "W002",
            DiagnosticCode::I001ExtrasAsText => "I001",
        }
    }

    pub fn default_severity(self) -> Severity {
        match self {
            DiagnosticCode::E001InsufficientTimeFields => Severity::Error,
            DiagnosticCode::W001UnresolvableRecord | DiagnosticCode::W002EmptyDataset => {
                Severity::Warning
            }
            DiagnosticCode::I001ExtrasAsText => Severity::Info,
        }
    }
}

/// A single diagnostic message
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    /// Input file the records came from
    pub file: Option<PathBuf>,
    /// Zero-based index of the offending record
    pub record: Option<usize>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Create a diagnostic with the code's default severity
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            message: message.into(),
            file: None,
            record: None,
            notes: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_record(mut self, index: usize) -> Self {
        self.record = Some(index);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Sink for diagnostics
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// Emitter that keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct CollectingEmitter {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Number of diagnostics carrying `code`
    pub fn count(&self, code: DiagnosticCode) -> usize {
        self.diagnostics.iter().filter(|d| d.code == code).count()
    }
}

impl DiagnosticEmitter for CollectingEmitter {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Emitter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEmitter;

impl DiagnosticEmitter for NullEmitter {
    fn emit(&mut self, _diagnostic: Diagnostic) {}
}

impl<E: DiagnosticEmitter + ?Sized> DiagnosticEmitter for &mut E {
    fn emit(&mut self, diagnostic: Diagnostic) {
        (**self).emit(diagnostic);
    }
}
