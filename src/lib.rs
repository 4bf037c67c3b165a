//! cmdline - typed command-line option processing.
//!
//! Register counters, flags, numeric and string options plus positional slots
//! against a [`CommandLine`], then parse an argument vector in one pass. Values
//! are written into caller-owned cells; problems are reported through a
//! [`Diagnostics`] port and counted rather than aborting the parse.

pub mod config;
pub mod diagnostics;
pub mod loader;
pub mod output;
pub mod parser;
pub mod registry;
pub mod values;

pub use config::{Config, ConfigError, OptionConfig};
pub use diagnostics::{CollectedDiagnostics, Diagnostic, Diagnostics, Severity, TracingDiagnostics};
pub use loader::{scan_float, scan_integer, LoadResult};
pub use output::{render_report, Report};
pub use parser::{CommandLine, ParseError, ParseOutcome};
pub use registry::{Binding, OptionKind};
pub use values::{Value, Values};
