//! Pure data types for raise: exceptions, flow signals and process exits.
//!
//! This crate is a leaf dependency with no async runtime, no parser, no I/O.
//! The evaluator raises and catches [`Exception`]s; the scheduler folds the
//! per-stage exceptions of a pipeline with [`aggregate`]; the process layer
//! feeds raw wait statuses to [`ExternalCmdExit::decode`].
//!
//! Every value here exposes the same observation surface to scripts:
//! truthiness ([`Exception::is_ok`]), its message (`Display`), a colored
//! rendering for terminals ([`Pprint`]) and its literal syntax ([`Repr`]).

pub mod exception;
pub mod exit;
pub mod flow;
pub mod pipeline;
pub mod quote;
pub mod source;
pub mod style;

pub use exception::{Cause, Exception, ExternalCause};
pub use exit::{signal_name, ExternalCmdExit, WaitStatus};
pub use flow::{BadFlow, Flow};
pub use pipeline::{aggregate, all_ok, PipelineError};
pub use quote::quote;
pub use source::{SourceContext, Traceback};

/// Values with a colored terminal rendering richer than their message.
pub trait Pprint {
    fn pprint(&self) -> String;
}

/// Values with a script-literal form.
///
/// `indent` is the column the literal starts at; multi-line forms align
/// their elements under it. Zero asks for a single line.
pub trait Repr {
    fn repr(&self, indent: usize) -> String;
}
