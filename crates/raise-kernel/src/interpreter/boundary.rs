//! Where flow signals stop.
//!
//! A flow signal travels as an ordinary exception until it reaches the
//! construct that consumes it: `break` and `continue` stop at the nearest
//! loop, `return` at the nearest function. Whatever gets past every
//! boundary lands in [`top_level`].

use serde::{Deserialize, Serialize};

use raise_types::{Exception, Flow};

/// What a loop does after one iteration of its body.
#[derive(Debug, Clone)]
pub enum LoopFlow {
    /// Not a loop signal. Propagate it if it is a failure, else iterate.
    Next(Exception),
    Break,
    Continue,
}

/// Intercept `break` and `continue` at a loop body.
///
/// `return` is not a loop signal and passes through in [`LoopFlow::Next`].
pub fn loop_boundary(exc: Exception) -> LoopFlow {
    match exc.as_flow() {
        Some(Flow::Break) => LoopFlow::Break,
        Some(Flow::Continue) => LoopFlow::Continue,
        _ => LoopFlow::Next(exc),
    }
}

/// Intercept `return` at a function body.
///
/// `break` and `continue` that escape a function are not consumed here.
pub fn function_boundary(exc: Exception) -> Exception {
    if exc.as_flow() == Some(Flow::Return) {
        Exception::OK
    } else {
        exc
    }
}

/// What to do with a flow signal that escaped every boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapePolicy {
    /// Show it like any other failure, in the warning color.
    #[default]
    Report,
    /// Drop it.
    Absorb,
}

/// Decide whether an exception reaching the top level is shown.
///
/// Returns `None` for success and for escaped flow signals absorbed by
/// `policy`. Execution continues either way.
pub fn top_level(exc: Exception, policy: EscapePolicy) -> Option<Exception> {
    if exc.is_ok() {
        return None;
    }
    if let Some(flow) = exc.as_flow() {
        match policy {
            EscapePolicy::Report => {
                tracing::debug!(%flow, "flow signal escaped to top level");
            }
            EscapePolicy::Absorb => {
                tracing::debug!(%flow, "absorbing escaped flow signal");
                return None;
            }
        }
    }
    Some(exc)
}
