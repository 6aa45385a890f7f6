//! Evaluator-side handling of exceptions.
//!
//! The evaluator returns an [`Exception`](raise_types::Exception) from every
//! statement. Loops, function calls and the top level each decide what to
//! do with it through the helpers in [`boundary`].

pub mod boundary;

pub use boundary::{function_boundary, loop_boundary, top_level, EscapePolicy, LoopFlow};
