//! Failures of pipelines, where several stages may fail at once.

use std::fmt;

use crate::exception::Exception;
use crate::Repr;

/// The per-stage outcomes of a pipeline that did not fully succeed.
///
/// `errors()[i]` belongs to the i-th stage as written, whatever order the
/// stages finished in. Stages that succeeded hold [`Exception::OK`].
///
/// Only [`aggregate`] builds one, so at least one slot is always a failure.
#[derive(Debug, Clone)]
pub struct PipelineError {
    errors: Vec<Exception>,
}

impl PipelineError {
    /// The stage outcomes, in stage order.
    pub fn errors(&self) -> &[Exception] {
        &self.errors
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, exc) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            if exc.is_ok() {
                f.write_str("<nil>")?;
            } else {
                write!(f, "{exc}")?;
            }
        }
        f.write_str(")")
    }
}

impl std::error::Error for PipelineError {}

impl Repr for PipelineError {
    fn repr(&self, indent: usize) -> String {
        const HEAD: &str = "?(multi-error";
        let elem_indent = indent + HEAD.len() + 1;
        let mut out = String::from(HEAD);
        for exc in &self.errors {
            if indent > 0 {
                out.push('\n');
                out.push_str(&" ".repeat(elem_indent));
            } else {
                out.push(' ');
            }
            out.push_str(&exc.repr(elem_indent));
        }
        out.push(')');
        out
    }
}

/// True if every stage succeeded. Vacuously true for no stages.
pub fn all_ok(excs: &[Exception]) -> bool {
    excs.iter().all(Exception::is_ok)
}

/// Fold the index-aligned stage outcomes of a finished pipeline.
///
/// Returns [`Exception::OK`] if all stages succeeded, otherwise a new
/// exception whose cause is a [`PipelineError`] holding `excs` as given.
/// Only call this once every stage has finished.
pub fn aggregate(excs: Vec<Exception>) -> Exception {
    if all_ok(&excs) {
        return Exception::OK;
    }
    Exception::new(PipelineError { errors: excs })
}
