//! raise-kernel: running pipelines and handling what they raise.
//!
//! This crate provides:
//!
//! - **Lexer**: Tokenizes exception literals using logos
//! - **Literal**: Reads `$ok`, `?(error ...)`, `?(multi-error ...)` back into values
//! - **Scheduler**: Concurrent pipeline stages and their aggregate exception
//! - **Interpreter**: Loop, function and top-level boundaries for flow signals
//! - **Report**: Rendering exceptions that reach the top level
//! - **Config**: Report settings loaded from the user's config directory

pub mod config;
pub mod interpreter;
pub mod lexer;
pub mod literal;
pub mod report;
pub mod scheduler;

pub use config::{ColorChoice, ReportConfig};
pub use interpreter::{function_boundary, loop_boundary, top_level, EscapePolicy, LoopFlow};
pub use literal::{read_exception, LiteralError};
pub use report::Reporter;
pub use scheduler::{ExternalCommand, FnStage, PipelineRunner, PipelineStage, Stage, StageOutcome};
