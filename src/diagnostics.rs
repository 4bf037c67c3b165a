//! The narrow reporting interface the parser emits its diagnostics through.

use std::cell::RefCell;
use std::fmt;

/// How serious a diagnostic is. Ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
    /// Chatty, developer-facing output.
    Spew,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Spew => "spew",
        };
        f.write_str(name)
    }
}

/// One structured diagnostic: a formatted message plus where it was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub file: &'static str,
    pub line: u32,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, file: &'static str, line: u32) -> Self {
        Self {
            severity,
            message: message.into(),
            file,
            line,
        }
    }

    /// The message as a single output line, terminated by exactly one newline.
    pub fn line(&self) -> String {
        let mut line = self.message.clone();
        if !line.ends_with('\n') {
            line.push('\n');
        }
        line
    }

    /// Like [`Diagnostic::line`], prefixed with `file(line): `.
    pub fn annotated_line(&self) -> String {
        format!("{}({}): {}", self.file, self.line, self.line())
    }
}

/// Receives diagnostics. Filtering and output selection belong to the implementor.
pub trait Diagnostics {
    fn emit(&self, diagnostic: &Diagnostic);
}

impl<T: Diagnostics + ?Sized> Diagnostics for &T {
    fn emit(&self, diagnostic: &Diagnostic) {
        (**self).emit(diagnostic)
    }
}

/// Forwards every diagnostic to `tracing`. This is the processor's default port.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn emit(&self, diagnostic: &Diagnostic) {
        let file = diagnostic.file;
        let line = diagnostic.line;
        let message = diagnostic.message.trim_end();
        match diagnostic.severity {
            Severity::Error => tracing::error!(file, line, "{}", message),
            Severity::Warning => tracing::warn!(file, line, "{}", message),
            Severity::Info => tracing::info!(file, line, "{}", message),
            Severity::Spew => tracing::trace!(file, line, "{}", message),
        }
    }
}

/// Keeps every diagnostic it receives so callers can inspect them after a parse.
#[derive(Debug, Default)]
pub struct CollectedDiagnostics {
    entries: RefCell<Vec<Diagnostic>>,
}

impl CollectedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    /// Just the messages, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .map(|d| d.message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl Diagnostics for CollectedDiagnostics {
    fn emit(&self, diagnostic: &Diagnostic) {
        self.entries.borrow_mut().push(diagnostic.clone());
    }
}
