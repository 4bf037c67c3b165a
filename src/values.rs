//! Owned storage for a config-driven command line.
//!
//! [`CommandLine`] only borrows its bindings. When the options come from a
//! [`Config`] rather than from code, [`Values`] owns one cell per option and
//! slot and wires them into a processor.

use crate::config::Config;
use crate::parser::CommandLine;
use crate::registry::{Binding, OptionKind};
use std::cell::{Cell, RefCell};

/// Storage for one option's value.
#[derive(Debug)]
pub enum Value {
    Counter(Cell<u32>),
    Flag(Cell<bool>),
    Integer(Cell<i64>),
    Float(Cell<f64>),
    String(RefCell<Option<String>>),
}

impl Value {
    pub fn new(kind: OptionKind) -> Self {
        match kind {
            OptionKind::Counter => Value::Counter(Cell::new(0)),
            OptionKind::Flag => Value::Flag(Cell::new(false)),
            OptionKind::Integer => Value::Integer(Cell::new(0)),
            OptionKind::Float => Value::Float(Cell::new(0.0)),
            OptionKind::String => Value::String(RefCell::new(None)),
        }
    }

    pub fn binding(&self) -> Binding<'_> {
        match self {
            Value::Counter(cell) => Binding::Counter(cell),
            Value::Flag(cell) => Binding::Flag(cell),
            Value::Integer(cell) => Binding::Integer(cell),
            Value::Float(cell) => Binding::Float(cell),
            Value::String(cell) => Binding::String(cell),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Counter(cell) => cell.get().into(),
            Value::Flag(cell) => cell.get().into(),
            Value::Integer(cell) => cell.get().into(),
            Value::Float(cell) => cell.get().into(),
            Value::String(cell) => cell.borrow().clone().into(),
        }
    }
}

/// Values for every option and positional slot named by a [`Config`].
#[derive(Debug)]
pub struct Values {
    options: Vec<(String, Vec<String>, Value)>,
    positionals: Vec<(String, RefCell<Option<String>>)>,
    overflow: bool,
}

impl Values {
    pub fn new(config: &Config) -> Self {
        let options = config
            .options
            .iter()
            .map(|o| (o.name.clone(), o.aliases.clone(), Value::new(o.kind)))
            .collect();
        let positionals = config
            .positionals
            .iter()
            .map(|name| (name.clone(), RefCell::new(None)))
            .collect();
        Self {
            options,
            positionals,
            overflow: config.overflow,
        }
    }

    /// Register every option (aliases included), slot and the overflow mode.
    pub fn register<'a>(&'a self, cl: &mut CommandLine<'a>) {
        for (name, aliases, value) in &self.options {
            cl.add_option(name.clone(), value.binding());
            for alias in aliases {
                cl.add_option(alias.clone(), value.binding());
            }
        }
        for (_, slot) in &self.positionals {
            cl.add_positional(slot);
        }
        if self.overflow {
            cl.enable_overflow();
        }
    }

    /// The value of an option by its primary name.
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, _, value)| value)
    }

    pub fn positional(&self, name: &str) -> Option<String> {
        self.positionals
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, slot)| slot.borrow().clone())
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.options
            .iter()
            .map(|(name, _, value)| (name.as_str(), value))
    }

    pub fn positionals(&self) -> impl Iterator<Item = (&str, Option<String>)> {
        self.positionals
            .iter()
            .map(|(name, slot)| (name.as_str(), slot.borrow().clone()))
    }
}
