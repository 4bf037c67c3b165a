//! The command-line processor and its parse loop.

use crate::diagnostics::{Diagnostic, Diagnostics, Severity, TracingDiagnostics};
use crate::registry::{Binding, Overflow, Positionals, Registry};
use std::cell::{Cell, RefCell};
use std::panic::Location;
use thiserror::Error;

/// Problems found while parsing. None of them stop the parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown option '{0}'.")]
    UnknownOption(String),

    #[error(
        "Command line option '{token}' requires {arity} parameters but only {available} are available."
    )]
    InsufficientParameters {
        token: String,
        arity: usize,
        available: usize,
    },

    #[error("'{literal}' is not a valid parameter to '-{option}'.")]
    InvalidNumericLiteral { literal: String, option: String },

    #[error("Argument '{0}' can't be handled.")]
    UnboundPositionalToken(String),
}

/// Result of one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Number of problems encountered.
    pub error_count: usize,
    /// Number of argv entries examined, program name included.
    pub processed: usize,
    /// Every problem, in the order it was found.
    pub errors: Vec<ParseError>,
}

impl ParseOutcome {
    pub fn is_success(&self) -> bool {
        self.error_count == 0
    }
}

/// Sends parse errors to the diagnostics port and remembers them.
pub(crate) struct Reporter<'d> {
    port: &'d dyn Diagnostics,
    errors: Vec<ParseError>,
}

impl<'d> Reporter<'d> {
    pub(crate) fn new(port: &'d dyn Diagnostics) -> Self {
        Self {
            port,
            errors: Vec::new(),
        }
    }

    #[track_caller]
    pub(crate) fn report(&mut self, error: ParseError) {
        let origin = Location::caller();
        self.port.emit(&Diagnostic::new(
            Severity::Error,
            error.to_string(),
            origin.file(),
            origin.line(),
        ));
        self.errors.push(error);
    }

    fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }
}

/// Registers options and positional slots, then binds an argument vector to them.
///
/// Bindings are borrowed from the caller for `'a` and zeroed when registered.
/// Parsing writes through them; the caller reads them afterwards.
///
/// ```
/// use std::cell::{Cell, RefCell};
/// use cmdline::CommandLine;
///
/// let verbose = Cell::new(0);
/// let input = RefCell::new(None);
/// let mut cl = CommandLine::new();
/// cl.add_counter("v", &verbose);
/// cl.add_positional(&input);
///
/// let outcome = cl.parse(["app", "-v", "in.txt", "-v"]);
/// assert!(outcome.is_success());
/// assert_eq!(verbose.get(), 2);
/// assert_eq!(input.borrow().as_deref(), Some("in.txt"));
/// ```
pub struct CommandLine<'a> {
    app_name: String,
    registry: Registry<'a>,
    positionals: Positionals<'a>,
    overflow: Overflow,
    diagnostics: Box<dyn Diagnostics + 'a>,
}

impl Default for CommandLine<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CommandLine<'a> {
    /// A processor that reports through `tracing`.
    pub fn new() -> Self {
        Self::with_diagnostics(TracingDiagnostics)
    }

    pub fn with_diagnostics(diagnostics: impl Diagnostics + 'a) -> Self {
        Self {
            app_name: String::new(),
            registry: Registry::default(),
            positionals: Positionals::default(),
            overflow: Overflow::default(),
            diagnostics: Box::new(diagnostics),
        }
    }

    pub fn add_option(&mut self, name: impl Into<String>, binding: Binding<'a>) {
        self.registry.register(name, binding);
    }

    pub fn add_counter(&mut self, name: impl Into<String>, value: &'a Cell<u32>) {
        self.add_option(name, Binding::Counter(value));
    }

    pub fn add_flag(&mut self, name: impl Into<String>, value: &'a Cell<bool>) {
        self.add_option(name, Binding::Flag(value));
    }

    pub fn add_integer(&mut self, name: impl Into<String>, value: &'a Cell<i64>) {
        self.add_option(name, Binding::Integer(value));
    }

    pub fn add_float(&mut self, name: impl Into<String>, value: &'a Cell<f64>) {
        self.add_option(name, Binding::Float(value));
    }

    pub fn add_string(&mut self, name: impl Into<String>, value: &'a RefCell<Option<String>>) {
        self.add_option(name, Binding::String(value));
    }

    /// Add the next positional slot.
    pub fn add_positional(&mut self, value: &'a RefCell<Option<String>>) {
        self.positionals.add(value);
    }

    /// Keep positional tokens that find no free slot instead of rejecting them.
    pub fn enable_overflow(&mut self) {
        self.overflow.enable();
    }

    /// Tokens captured by the latest parse. Empty before the first parse.
    pub fn overflow(&self) -> &[String] {
        self.overflow.entries()
    }

    /// `argv[0]` of the latest parse.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Parse `argv`, whose first element is the program name.
    ///
    /// Every token is examined even after errors; the outcome counts them.
    pub fn parse<I, S>(&mut self, argv: I) -> ParseOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        let Some((app_name, tokens)) = argv.split_first() else {
            self.app_name.clear();
            self.overflow.begin();
            return ParseOutcome::default();
        };

        self.app_name = app_name.clone();
        self.positionals.rewind();
        self.overflow.begin();

        tracing::debug!(app = %self.app_name, tokens = tokens.len(), "parsing command line");

        let dispatcher = Dispatcher {
            registry: &self.registry,
            positionals: &mut self.positionals,
            overflow: &mut self.overflow,
            reporter: Reporter::new(&*self.diagnostics),
            error_count: 0,
        };
        let (error_count, errors) = dispatcher.run(tokens);

        self.overflow.finish();

        ParseOutcome {
            error_count,
            processed: argv.len(),
            errors,
        }
    }
}

/// Parse-loop state for one invocation.
struct Dispatcher<'p, 'a> {
    registry: &'p Registry<'a>,
    positionals: &'p mut Positionals<'a>,
    overflow: &'p mut Overflow,
    reporter: Reporter<'p>,
    error_count: usize,
}

impl Dispatcher<'_, '_> {
    fn run(mut self, tokens: &[String]) -> (usize, Vec<ParseError>) {
        let mut index = 0;
        while index < tokens.len() {
            let token = &tokens[index];
            let rest = &tokens[index + 1..];
            index += match option_name(token) {
                Some(name) => self.dispatch_option(token, name, rest),
                None => {
                    self.dispatch_positional(token);
                    1
                }
            };
        }
        (self.error_count, self.reporter.into_errors())
    }

    /// Returns how many tokens to advance past, the option included.
    fn dispatch_option(&mut self, token: &str, name: &str, rest: &[String]) -> usize {
        let registry = self.registry;
        let Some(option) = registry.lookup(name) else {
            self.fail(ParseError::UnknownOption(token.to_string()));
            return 1;
        };

        let arity = option.kind().arity();
        if rest.len() < arity {
            self.fail(ParseError::InsufficientParameters {
                token: token.to_string(),
                arity,
                available: rest.len(),
            });
            return 1;
        }

        tracing::trace!(token, kind = ?option.kind(), "loading option");
        let result = option
            .binding
            .load(&option.name, &rest[..arity], &mut self.reporter);
        if !result.matched {
            self.error_count += 1;
        }
        1 + result.consumed
    }

    fn dispatch_positional(&mut self, token: &str) {
        if self.positionals.bind(token) {
            tracing::trace!(token, slot = self.positionals.filled(), "bound positional");
        } else if self.overflow.capture(token) {
            tracing::trace!(token, "captured overflow");
        } else {
            self.fail(ParseError::UnboundPositionalToken(token.to_string()));
        }
    }

    #[track_caller]
    fn fail(&mut self, error: ParseError) {
        self.reporter.report(error);
        self.error_count += 1;
    }
}

/// The option name, if `token` starts with an option prefix (`-` or `/`).
fn option_name(token: &str) -> Option<&str> {
    token.strip_prefix('-').or_else(|| token.strip_prefix('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectedDiagnostics;

    #[test]
    fn test_app_name_recorded() {
        let mut cl = CommandLine::new();
        assert_eq!(cl.app_name(), "");
        let outcome = cl.parse(["testapp"]);
        assert!(outcome.is_success());
        assert_eq!(outcome.processed, 1);
        assert_eq!(cl.app_name(), "testapp");
    }

    #[test]
    fn test_empty_argv() {
        let mut cl = CommandLine::new();
        let outcome = cl.parse(Vec::<String>::new());
        assert!(outcome.is_success());
        assert_eq!(outcome.processed, 0);
        assert_eq!(cl.app_name(), "");
    }

    #[test]
    fn test_program_name_is_not_parsed() {
        let diagnostics = CollectedDiagnostics::new();
        let mut cl = CommandLine::with_diagnostics(&diagnostics);
        let outcome = cl.parse(["-weird-name"]);
        assert!(outcome.is_success());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_counter_zero_when_absent() {
        let flag = Cell::new(5);
        let mut cl = CommandLine::new();
        cl.add_counter("flag", &flag);
        assert_eq!(flag.get(), 0);

        assert!(cl.parse(["appname"]).is_success());
        assert_eq!(flag.get(), 0);
    }

    #[test]
    fn test_counter_counts_occurrences() {
        let v = Cell::new(0);
        let mut cl = CommandLine::new();
        cl.add_counter("v", &v);
        assert!(cl.parse(["app", "-v", "-v", "/v"]).is_success());
        assert_eq!(v.get(), 3);
    }

    #[test]
    fn test_two_counters_independent() {
        let a = Cell::new(0);
        let b = Cell::new(0);
        let mut cl = CommandLine::new();
        cl.add_counter("a", &a);
        cl.add_counter("b", &b);

        cl.parse(["appName", "-b"]);
        assert_eq!((a.get(), b.get()), (0, 1));
    }

    #[test]
    fn test_aliases_share_counter() {
        let binary = Cell::new(0);
        let mut cl = CommandLine::new();
        cl.add_counter("b", &binary);
        cl.add_counter("bin", &binary);
        cl.add_counter("binary", &binary);

        assert!(cl.parse(["app", "-b", "-binary", "/bin"]).is_success());
        assert_eq!(binary.get(), 3);
    }

    #[test]
    fn test_integer_values() {
        let number = Cell::new(0);
        let mut cl = CommandLine::new();
        cl.add_integer("number", &number);

        assert!(cl.parse(["app", "-number", "42"]).is_success());
        assert_eq!(number.get(), 42);

        assert!(cl.parse(["app", "-number", "-867"]).is_success());
        assert_eq!(number.get(), -867);
    }

    #[test]
    fn test_integer_missing_parameter() {
        let diagnostics = CollectedDiagnostics::new();
        let number = Cell::new(0);
        let mut cl = CommandLine::with_diagnostics(&diagnostics);
        cl.add_integer("number", &number);

        let outcome = cl.parse(["app", "-number"]);
        assert!(!outcome.is_success());
        assert_eq!(number.get(), 0);
        assert_eq!(
            outcome.errors,
            vec![ParseError::InsufficientParameters {
                token: "-number".to_string(),
                arity: 1,
                available: 0,
            }]
        );
        assert_eq!(
            diagnostics.messages(),
            vec!["Command line option '-number' requires 1 parameters but only 0 are available."]
        );
    }

    #[test]
    fn test_integer_garbage_parameter_is_consumed() {
        let diagnostics = CollectedDiagnostics::new();
        let number = Cell::new(0);
        let mut cl = CommandLine::with_diagnostics(&diagnostics);
        cl.add_integer("number", &number);

        let outcome = cl.parse(["app", "-number", "-jim"]);
        assert!(!outcome.is_success());
        assert_eq!(outcome.error_count, 1);
        assert_eq!(number.get(), 0);
        assert_eq!(
            outcome.errors,
            vec![ParseError::InvalidNumericLiteral {
                literal: "-jim".to_string(),
                option: "number".to_string(),
            }]
        );
        assert_eq!(
            diagnostics.messages(),
            vec!["'-jim' is not a valid parameter to '-number'."]
        );
    }

    #[test]
    fn test_integer_partial_value_committed() {
        let number = Cell::new(0);
        let mut cl = CommandLine::with_diagnostics(CollectedDiagnostics::new());
        cl.add_integer("n", &number);

        let outcome = cl.parse(["app", "/n", "-25kg"]);
        assert_eq!(outcome.error_count, 1);
        assert_eq!(number.get(), -25);
    }

    #[test]
    fn test_float_partial_value_committed() {
        let diagnostics = CollectedDiagnostics::new();
        let ratio = Cell::new(0.0);
        let input = RefCell::new(None);
        let mut cl = CommandLine::with_diagnostics(&diagnostics);
        cl.add_float("r", &ratio);
        cl.add_positional(&input);

        let outcome = cl.parse(["app", "-r", "-1.5x", "file"]);
        assert_eq!(outcome.error_count, 1);
        assert_eq!(
            outcome.errors,
            vec![ParseError::InvalidNumericLiteral {
                literal: "-1.5x".to_string(),
                option: "r".to_string(),
            }]
        );
        assert!((ratio.get() + 1.5).abs() < 1e-9);
        assert_eq!(input.borrow().as_deref(), Some("file"));
        assert_eq!(
            diagnostics.messages(),
            vec!["'-1.5x' is not a valid parameter to '-r'."]
        );
    }

    #[test]
    fn test_float_value() {
        let ratio = Cell::new(1.0);
        let mut cl = CommandLine::new();
        cl.add_float("ratio", &ratio);
        assert_eq!(ratio.get(), 0.0);

        assert!(cl.parse(["app", "-ratio", "-2.5"]).is_success());
        assert!((ratio.get() + 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_string_options() {
        let s0 = RefCell::new(None);
        let s1 = RefCell::new(None);
        let mut cl = CommandLine::new();
        cl.add_string("s0", &s0);
        cl.add_string("s1", &s1);

        assert!(cl.parse(["app", "-s1", "tags"]).is_success());
        assert_eq!(*s0.borrow(), None);
        assert_eq!(s1.borrow().as_deref(), Some("tags"));
    }

    #[test]
    fn test_string_parameter_may_look_like_option() {
        let s = RefCell::new(None);
        let v = Cell::new(0);
        let mut cl = CommandLine::new();
        cl.add_string("s", &s);
        cl.add_counter("v", &v);

        assert!(cl.parse(["app", "-s", "-v"]).is_success());
        assert_eq!(s.borrow().as_deref(), Some("-v"));
        assert_eq!(v.get(), 0);
    }

    #[test]
    fn test_flag_option() {
        let quiet = Cell::new(true);
        let mut cl = CommandLine::new();
        cl.add_flag("quiet", &quiet);
        assert!(!quiet.get());
        assert!(cl.parse(["app", "/quiet"]).is_success());
        assert!(quiet.get());
    }

    #[test]
    fn test_unknown_option() {
        let diagnostics = CollectedDiagnostics::new();
        let mut cl = CommandLine::with_diagnostics(&diagnostics);
        let outcome = cl.parse(["app", "-nope", "/what"]);

        assert_eq!(outcome.error_count, 2);
        assert_eq!(
            diagnostics.messages(),
            vec!["Unknown option '-nope'.", "Unknown option '/what'."]
        );
    }

    #[test]
    fn test_lookup_strips_only_one_prefix() {
        let v = Cell::new(0);
        let mut cl = CommandLine::with_diagnostics(CollectedDiagnostics::new());
        cl.add_counter("v", &v);

        let outcome = cl.parse(["app", "--v"]);
        assert_eq!(outcome.errors, vec![ParseError::UnknownOption("--v".to_string())]);
        assert_eq!(v.get(), 0);
    }

    #[test]
    fn test_unknown_option_does_not_consume_next_token() {
        let input = RefCell::new(None);
        let mut cl = CommandLine::with_diagnostics(CollectedDiagnostics::new());
        cl.add_positional(&input);

        let outcome = cl.parse(["app", "-x", "file"]);
        assert_eq!(outcome.error_count, 1);
        assert_eq!(input.borrow().as_deref(), Some("file"));
    }

    #[test]
    fn test_positionals_ignore_option_placement() {
        let a = RefCell::new(None);
        let b = RefCell::new(None);
        let v = Cell::new(0);
        let mut cl = CommandLine::new();
        cl.add_positional(&a);
        cl.add_positional(&b);
        cl.add_counter("v", &v);

        assert!(cl.parse(["app", "-v", "first", "-v", "second"]).is_success());
        assert_eq!(a.borrow().as_deref(), Some("first"));
        assert_eq!(b.borrow().as_deref(), Some("second"));
        assert_eq!(v.get(), 2);
    }

    #[test]
    fn test_overflow_captures_extra_positionals() {
        let a = RefCell::new(None);
        let b = RefCell::new(None);
        let mut cl = CommandLine::new();
        cl.add_positional(&a);
        cl.add_positional(&b);
        cl.enable_overflow();

        let outcome = cl.parse(["app", "a-arg", "b-arg", "extra1", "extra2"]);
        assert!(outcome.is_success());
        assert_eq!(a.borrow().as_deref(), Some("a-arg"));
        assert_eq!(b.borrow().as_deref(), Some("b-arg"));
        assert_eq!(cl.overflow(), ["extra1", "extra2"]);
    }

    #[test]
    fn test_extra_positionals_rejected_without_overflow() {
        let diagnostics = CollectedDiagnostics::new();
        let a = RefCell::new(None);
        let b = RefCell::new(None);
        let mut cl = CommandLine::with_diagnostics(&diagnostics);
        cl.add_positional(&a);
        cl.add_positional(&b);

        let outcome = cl.parse(["app", "a-arg", "b-arg", "extra1", "extra2"]);
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.errors,
            vec![
                ParseError::UnboundPositionalToken("extra1".to_string()),
                ParseError::UnboundPositionalToken("extra2".to_string()),
            ]
        );
        assert_eq!(
            diagnostics.messages(),
            vec![
                "Argument 'extra1' can't be handled.",
                "Argument 'extra2' can't be handled."
            ]
        );
        assert!(cl.overflow().is_empty());
    }

    #[test]
    fn test_overflow_empty_before_parse() {
        let mut cl = CommandLine::new();
        cl.enable_overflow();
        cl.enable_overflow();
        assert!(cl.overflow().is_empty());
    }

    #[test]
    fn test_reparse_resets_overflow() {
        let mut cl = CommandLine::new();
        cl.enable_overflow();

        cl.parse(["app", "one", "two", "three"]);
        assert_eq!(cl.overflow().len(), 3);

        cl.parse(["app", "four"]);
        assert_eq!(cl.overflow(), ["four"]);
    }

    #[test]
    fn test_reparse_rebinds_positionals_from_first_slot() {
        let a = RefCell::new(None);
        let mut cl = CommandLine::new();
        cl.add_positional(&a);

        assert!(cl.parse(["app", "x"]).is_success());
        assert!(cl.parse(["app", "y"]).is_success());
        assert_eq!(a.borrow().as_deref(), Some("y"));
    }

    #[test]
    fn test_errors_accumulate_across_tokens() {
        let diagnostics = CollectedDiagnostics::new();
        let number = Cell::new(0);
        let v = Cell::new(0);
        let mut cl = CommandLine::with_diagnostics(&diagnostics);
        cl.add_integer("n", &number);
        cl.add_counter("v", &v);

        let outcome = cl.parse(["app", "-bogus", "-n", "4x", "stray", "-v", "-n"]);
        assert_eq!(outcome.error_count, 4);
        assert_eq!(outcome.errors.len(), 4);
        assert_eq!(outcome.processed, 7);
        assert_eq!(number.get(), 4);
        assert_eq!(v.get(), 1);
        assert_eq!(diagnostics.len(), 4);
        assert!(diagnostics
            .entries()
            .iter()
            .all(|d| d.severity == Severity::Error));
    }

    #[test]
    fn test_diagnostic_origin_points_into_crate() {
        let diagnostics = CollectedDiagnostics::new();
        let mut cl = CommandLine::with_diagnostics(&diagnostics);
        cl.parse(["app", "-x"]);

        let entry = &diagnostics.entries()[0];
        assert!(entry.file.ends_with("parser.rs"));
        assert!(entry.line > 0);
    }

    #[test]
    fn test_bare_prefix_is_unknown_option() {
        let mut cl = CommandLine::with_diagnostics(CollectedDiagnostics::new());
        let outcome = cl.parse(["app", "-", "/"]);
        assert_eq!(
            outcome.errors,
            vec![
                ParseError::UnknownOption("-".to_string()),
                ParseError::UnknownOption("/".to_string()),
            ]
        );
    }

    #[test]
    fn test_option_name() {
        assert_eq!(option_name("-abc"), Some("abc"));
        assert_eq!(option_name("/abc"), Some("abc"));
        assert_eq!(option_name("--abc"), Some("-abc"));
        assert_eq!(option_name("abc"), None);
        assert_eq!(option_name(""), None);
    }
}
