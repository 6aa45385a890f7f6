//! Scheduler module for raise: concurrent pipeline stages.
//!
//! Every stage of a pipeline runs as its own tokio task. Each task turns
//! its outcome into an [`Exception`](raise_types::Exception) before it
//! finishes, so nothing is shared between stages while they run. The
//! runner then waits on every task in stage order and folds the slots
//! with [`aggregate`](raise_types::aggregate).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     PipelineRunner                       │
//! │  ┌─────────┐        ┌─────────┐        ┌─────────┐       │
//! │  │ stage 0 │        │ stage 1 │        │ stage 2 │       │
//! │  │ (spawn) │        │ (spawn) │        │ (spawn) │       │
//! │  └────┬────┘        └────┬────┘        └────┬────┘       │
//! │       ▼                  ▼                  ▼            │
//! │   slots[0]           slots[1]           slots[2]         │
//! │       └──────── join in order, aggregate ───┘            │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod pipeline;
mod stage;

pub use pipeline::{PipelineRunner, PipelineStage};
pub use stage::{ExternalCommand, FnStage, Stage, StageFuture, StageOutcome};
