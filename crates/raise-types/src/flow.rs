//! Flow signals: `return`, `break` and `continue` travelling as exception causes.

use std::fmt;

use thiserror::Error;

use crate::style;
use crate::{Pprint, Repr};

/// A non-local control transfer.
///
/// Flow signals are not errors. They ride the exception path so the
/// evaluator needs no second channel for unwinding, and are consumed by the
/// nearest loop (`Break`, `Continue`) or function (`Return`) boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    Return,
    Break,
    Continue,
}

impl Flow {
    /// All flow signals, in tag order.
    pub const ALL: [Flow; 3] = [Flow::Return, Flow::Break, Flow::Continue];

    /// The lowercase keyword.
    pub fn name(self) -> &'static str {
        match self {
            Flow::Return => "return",
            Flow::Break => "break",
            Flow::Continue => "continue",
        }
    }

    /// The numeric tag: 0 for return, 1 for break, 2 for continue.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Look up a flow signal by numeric tag.
    pub fn from_tag(tag: u8) -> Result<Flow, BadFlow> {
        Flow::ALL.get(usize::from(tag)).copied().ok_or(BadFlow(tag))
    }

    /// Look up a flow signal by keyword.
    pub fn from_name(name: &str) -> Option<Flow> {
        Flow::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::error::Error for Flow {}

impl Pprint for Flow {
    fn pprint(&self) -> String {
        style::paint(style::WARNING, self.name())
    }
}

impl Repr for Flow {
    fn repr(&self, _indent: usize) -> String {
        format!("?({})", self.name())
    }
}

/// A tag outside the three flow signals.
///
/// Only reachable when a tag comes from outside the type system (a
/// serialized frame, a foreign caller); never constructed by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("!(BAD FLOW: {0})")]
pub struct BadFlow(pub u8);
