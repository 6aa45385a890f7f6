//! The exception value.
//!
//! An [`Exception`] is both a script value (`$ok`, `?(error ...)`, ...) and
//! the error type of evaluation. It wraps a [`Cause`] and the traceback
//! captured where the failure was raised. A missing cause means success.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::exit::ExternalCmdExit;
use crate::flow::Flow;
use crate::pipeline::PipelineError;
use crate::quote::quote;
use crate::source::{SourceContext, Traceback};
use crate::style;
use crate::{Pprint, Repr};

/// A failure raised outside this crate that may render itself richly.
///
/// Both capabilities default to absent, in which case the exception falls
/// back to the plain message.
pub trait ExternalCause: std::error::Error + Send + Sync + 'static {
    fn as_pprint(&self) -> Option<&dyn Pprint> {
        None
    }

    fn as_repr(&self) -> Option<&dyn Repr> {
        None
    }
}

/// What an exception is about.
#[derive(Debug, Clone, Error)]
pub enum Cause {
    /// A failure carrying only a message: builtin errors, `fail`, etc.
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Flow(#[from] Flow),
    #[error(transparent)]
    Exit(#[from] ExternalCmdExit),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    External(Arc<dyn ExternalCause>),
}

impl Cause {
    /// The cause's own colored rendering, if it has one.
    pub fn as_pprint(&self) -> Option<&dyn Pprint> {
        match self {
            Cause::Flow(flow) => Some(flow),
            Cause::External(ext) => ext.as_pprint(),
            Cause::Message(_) | Cause::Exit(_) | Cause::Pipeline(_) => None,
        }
    }

    /// The cause's own literal form, if it has one.
    pub fn as_repr(&self) -> Option<&dyn Repr> {
        match self {
            Cause::Flow(flow) => Some(flow),
            Cause::Pipeline(pe) => Some(pe),
            Cause::External(ext) => ext.as_repr(),
            Cause::Message(_) | Cause::Exit(_) => None,
        }
    }
}

/// Adapter for plain errors that have no rendering of their own.
#[derive(Debug)]
struct Opaque<E>(E);

impl<E: std::error::Error> fmt::Display for Opaque<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<E: std::error::Error + 'static> std::error::Error for Opaque<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl<E: std::error::Error + Send + Sync + 'static> ExternalCause for Opaque<E> {}

/// A failure (or, with no cause, success) plus its traceback.
///
/// Exceptions never change after construction; every "modifying" method
/// returns a new value. Clones share the cause and the traceback.
#[derive(Debug, Clone, Default)]
pub struct Exception {
    cause: Option<Arc<Cause>>,
    traceback: Traceback,
}

impl Exception {
    /// The success sentinel.
    pub const OK: Exception = Exception {
        cause: None,
        traceback: Traceback::EMPTY,
    };

    pub fn ok() -> Self {
        Self::OK
    }

    /// Wrap a cause with an empty traceback.
    pub fn new(cause: impl Into<Cause>) -> Self {
        Self {
            cause: Some(Arc::new(cause.into())),
            traceback: Traceback::EMPTY,
        }
    }

    /// A generic failure with a message.
    pub fn message(msg: impl Into<String>) -> Self {
        Self::new(Cause::Message(msg.into()))
    }

    /// Wrap any error. It renders through its `Display` only.
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::new(Cause::External(Arc::new(Opaque(err))))
    }

    /// Wrap a foreign cause that may provide its own rendering.
    pub fn from_external(cause: Arc<dyn ExternalCause>) -> Self {
        Self::new(Cause::External(cause))
    }

    /// Attach the traceback captured at the raise site.
    pub fn with_traceback(self, traceback: Traceback) -> Self {
        Self { traceback, ..self }
    }

    /// The same exception with one more outer frame, for unwinding.
    pub fn unwound_through(&self, frame: SourceContext) -> Self {
        Self {
            cause: self.cause.clone(),
            traceback: self.traceback.push_outer(frame),
        }
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_deref()
    }

    pub fn traceback(&self) -> &Traceback {
        &self.traceback
    }

    /// True if there is no failure. This is the script-level truth value.
    pub fn is_ok(&self) -> bool {
        self.cause.is_none()
    }

    /// The flow signal this exception carries, if any.
    pub fn as_flow(&self) -> Option<Flow> {
        match self.cause() {
            Some(Cause::Flow(flow)) => Some(*flow),
            _ => None,
        }
    }

    /// The header line: `Exception: <message>`, colored.
    pub fn pprint_header(&self) -> String {
        let Some(cause) = self.cause() else {
            return "ok".to_string();
        };
        let msg = match cause.as_pprint() {
            Some(p) => p.pprint(),
            None => style::paint(style::ERROR, &cause.to_string()),
        };
        format!("Exception: {msg}")
    }
}

impl Pprint for Exception {
    fn pprint(&self) -> String {
        if self.is_ok() {
            return "ok".to_string();
        }
        let mut out = self.pprint_header();
        out.push_str("\nTraceback:");
        for frame in &self.traceback {
            out.push_str("\n  ");
            out.push_str(&frame.pprint("    "));
        }
        out
    }
}

impl Repr for Exception {
    fn repr(&self, indent: usize) -> String {
        let Some(cause) = self.cause() else {
            return "$ok".to_string();
        };
        match cause.as_repr() {
            Some(r) => r.repr(indent),
            None => format!("?(error {})", quote(&cause.to_string())),
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cause() {
            Some(cause) => fmt::Display::fmt(cause, f),
            None => f.write_str("ok"),
        }
    }
}

impl std::error::Error for Exception {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause().map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl From<Cause> for Exception {
    fn from(cause: Cause) -> Self {
        Self::new(cause)
    }
}

impl From<Flow> for Exception {
    fn from(flow: Flow) -> Self {
        Self::new(flow)
    }
}

impl From<ExternalCmdExit> for Exception {
    fn from(exit: ExternalCmdExit) -> Self {
        Self::new(exit)
    }
}

impl From<PipelineError> for Exception {
    fn from(pe: PipelineError) -> Self {
        Self::new(pe)
    }
}
