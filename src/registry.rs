//! Option registry, positional slots and the overflow sink.
//!
//! Everything here is built before a parse and keeps its shape afterwards;
//! only the values behind the bindings change.

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};

/// The kind of an option, which fixes how many parameters it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Counts its occurrences (e.g. `-v -v`)
    Counter,
    /// Set to true when present
    Flag,
    /// Signed integer parameter
    Integer,
    /// Decimal parameter
    Float,
    /// Verbatim string parameter
    String,
}

impl OptionKind {
    /// Number of parameter tokens that follow the option name.
    pub fn arity(self) -> usize {
        match self {
            OptionKind::Counter | OptionKind::Flag => 0,
            OptionKind::Integer | OptionKind::Float | OptionKind::String => 1,
        }
    }
}

/// A caller-owned output location, tagged with the kind that writes it.
#[derive(Debug, Clone, Copy)]
pub enum Binding<'a> {
    Counter(&'a Cell<u32>),
    Flag(&'a Cell<bool>),
    Integer(&'a Cell<i64>),
    Float(&'a Cell<f64>),
    String(&'a RefCell<Option<String>>),
}

impl Binding<'_> {
    pub fn kind(&self) -> OptionKind {
        match self {
            Binding::Counter(_) => OptionKind::Counter,
            Binding::Flag(_) => OptionKind::Flag,
            Binding::Integer(_) => OptionKind::Integer,
            Binding::Float(_) => OptionKind::Float,
            Binding::String(_) => OptionKind::String,
        }
    }

    /// Write the kind's zero value.
    fn reset(&self) {
        match self {
            Binding::Counter(cell) => cell.set(0),
            Binding::Flag(cell) => cell.set(false),
            Binding::Integer(cell) => cell.set(0),
            Binding::Float(cell) => cell.set(0.0),
            Binding::String(cell) => *cell.borrow_mut() = None,
        }
    }
}

/// A registered option name and where its value goes.
#[derive(Debug)]
pub struct OptionSpec<'a> {
    pub name: String,
    pub binding: Binding<'a>,
}

impl OptionSpec<'_> {
    pub fn kind(&self) -> OptionKind {
        self.binding.kind()
    }
}

/// Registered options in registration order.
#[derive(Debug, Default)]
pub struct Registry<'a> {
    options: Vec<OptionSpec<'a>>,
}

impl<'a> Registry<'a> {
    /// Register `name` and zero its binding. Several names may share one binding.
    pub fn register(&mut self, name: impl Into<String>, binding: Binding<'a>) {
        binding.reset();
        self.options.push(OptionSpec {
            name: name.into(),
            binding,
        });
    }

    /// Exact, case-sensitive lookup. The latest registration of a name wins.
    pub fn lookup(&self, name: &str) -> Option<&OptionSpec<'a>> {
        self.options.iter().rev().find(|o| o.name == name)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Positional output slots, filled strictly in the order they were added.
#[derive(Debug, Default)]
pub struct Positionals<'a> {
    slots: Vec<&'a RefCell<Option<String>>>,
    cursor: usize,
}

impl<'a> Positionals<'a> {
    pub fn add(&mut self, slot: &'a RefCell<Option<String>>) {
        *slot.borrow_mut() = None;
        self.slots.push(slot);
    }

    pub(crate) fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Bind `token` to the next free slot. Returns false when every slot is taken.
    pub(crate) fn bind(&mut self, token: &str) -> bool {
        match self.slots.get(self.cursor) {
            Some(slot) => {
                *slot.borrow_mut() = Some(token.to_string());
                self.cursor += 1;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// How many slots the latest parse filled.
    pub fn filled(&self) -> usize {
        self.cursor
    }
}

/// Captures positional tokens left over once every slot is filled.
#[derive(Debug, Default)]
pub struct Overflow {
    enabled: bool,
    entries: Vec<String>,
}

impl Overflow {
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Fresh storage for a new parse; previous entries are dropped.
    pub(crate) fn begin(&mut self) {
        self.entries = Vec::new();
    }

    /// Returns false if capture is disabled.
    pub(crate) fn capture(&mut self, token: &str) -> bool {
        if self.enabled {
            self.entries.push(token.to_string());
        }
        self.enabled
    }

    pub(crate) fn finish(&mut self) {
        self.entries.shrink_to_fit();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
