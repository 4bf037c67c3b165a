//! Typed value loaders: turn parameter tokens into values behind a binding.

use crate::parser::{ParseError, Reporter};
use crate::registry::Binding;

/// What a loader did with the tokens it was handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadResult {
    /// Parameter tokens consumed (not counting the option itself).
    pub consumed: usize,
    /// False when a parameter was malformed.
    pub matched: bool,
}

impl LoadResult {
    fn matched(consumed: usize) -> Self {
        Self {
            consumed,
            matched: true,
        }
    }
}

impl Binding<'_> {
    /// Load `params` (exactly `arity` tokens) into the binding.
    ///
    /// Numeric parameters with trailing garbage still store the value parsed
    /// from their numeric prefix, are still consumed, and are reported.
    pub(crate) fn load(&self, name: &str, params: &[String], reporter: &mut Reporter<'_>) -> LoadResult {
        match self {
            Binding::Counter(cell) => {
                cell.set(cell.get().saturating_add(1));
                LoadResult::matched(0)
            }
            Binding::Flag(cell) => {
                cell.set(true);
                LoadResult::matched(0)
            }
            Binding::Integer(cell) => {
                let Some(literal) = params.first() else {
                    return LoadResult::matched(0);
                };
                let (value, complete) = scan_integer(literal);
                cell.set(value);
                numeric_result(complete, name, literal, reporter)
            }
            Binding::Float(cell) => {
                let Some(literal) = params.first() else {
                    return LoadResult::matched(0);
                };
                let (value, complete) = scan_float(literal);
                cell.set(value);
                numeric_result(complete, name, literal, reporter)
            }
            Binding::String(cell) => {
                let Some(literal) = params.first() else {
                    return LoadResult::matched(0);
                };
                *cell.borrow_mut() = Some(literal.clone());
                LoadResult::matched(1)
            }
        }
    }
}

fn numeric_result(complete: bool, name: &str, literal: &str, reporter: &mut Reporter<'_>) -> LoadResult {
    if !complete {
        reporter.report(ParseError::InvalidNumericLiteral {
            literal: literal.to_string(),
            option: name.to_string(),
        });
    }
    LoadResult {
        consumed: 1,
        matched: complete,
    }
}

/// Byte cursor over a numeric literal.
struct Scanner<'s> {
    bytes: &'s [u8],
    pos: usize,
}

impl<'s> Scanner<'s> {
    fn new(literal: &'s str) -> Self {
        Self {
            bytes: literal.as_bytes(),
            pos: 0,
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn digit(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.pos)?;
        if byte.is_ascii_digit() {
            self.pos += 1;
            Some(byte - b'0')
        } else {
            None
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }
}

/// Parse an optional `-` followed by ASCII digits.
///
/// Returns the value of the numeric prefix and whether the whole literal was
/// consumed. Overflow wraps.
pub fn scan_integer(literal: &str) -> (i64, bool) {
    let mut scanner = Scanner::new(literal);
    let negative = scanner.eat(b'-');

    let mut value: i64 = 0;
    while let Some(d) = scanner.digit() {
        value = value.wrapping_mul(10).wrapping_add(i64::from(d));
    }

    let value = if negative { value.wrapping_neg() } else { value };
    (value, scanner.at_end())
}

/// Like [`scan_integer`], with an optional `.` and fractional digits.
pub fn scan_float(literal: &str) -> (f64, bool) {
    let mut scanner = Scanner::new(literal);
    let negative = scanner.eat(b'-');

    let mut value = 0.0_f64;
    while let Some(d) = scanner.digit() {
        value = value * 10.0 + f64::from(d);
    }

    if scanner.eat(b'.') {
        let mut scale = 0.1_f64;
        while let Some(d) = scanner.digit() {
            value += f64::from(d) * scale;
            scale /= 10.0;
        }
    }

    let value = if negative { -value } else { value };
    (value, scanner.at_end())
}
