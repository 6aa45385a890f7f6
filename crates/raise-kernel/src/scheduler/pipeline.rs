//! Pipeline execution for raise.
//!
//! Runs all stages of a pipeline concurrently and collects one exception
//! slot per stage, in the order the stages were written.

use tracing::Instrument;

use raise_types::{aggregate, Exception, Traceback};

use super::stage::Stage;

/// A stage plus the source frame of its command.
pub struct PipelineStage {
    pub stage: Box<dyn Stage>,
    pub context: Traceback,
}

impl PipelineStage {
    pub fn new(stage: impl Stage + 'static) -> Self {
        Self {
            stage: Box::new(stage),
            context: Traceback::EMPTY,
        }
    }

    /// Attach the traceback used for failures that carry none.
    pub fn with_context(mut self, context: Traceback) -> Self {
        self.context = context;
        self
    }
}

/// Runs pipelines by spawning one task per stage.
#[derive(Debug, Default, Clone, Copy)]
pub struct PipelineRunner;

impl PipelineRunner {
    pub fn new() -> Self {
        Self
    }

    /// Execute a pipeline and return its aggregate exception.
    ///
    /// Every stage runs to completion, whether or not its neighbours
    /// failed. Returns `$ok` only if every stage succeeded.
    pub async fn run(&self, stages: Vec<PipelineStage>) -> Exception {
        let span = tracing::debug_span!("pipeline", stages = stages.len());
        async move {
            let mut handles = Vec::with_capacity(stages.len());
            let mut contexts = Vec::with_capacity(stages.len());

            for (index, PipelineStage { stage, context }) in stages.into_iter().enumerate() {
                contexts.push(context.clone());
                let stage_span = tracing::debug_span!("stage", index, name = %stage.name());
                let handle = tokio::spawn(
                    async move {
                        let outcome = stage.run(index).await;
                        let exc = outcome.into_exception(stage.name(), &context);
                        tracing::debug!(index, ok = exc.is_ok(), "stage finished");
                        exc
                    }
                    .instrument(stage_span),
                );
                handles.push(handle);
            }

            // Join barrier: slot i waits for stage i, however they finish.
            let mut slots = Vec::with_capacity(handles.len());
            for (index, (handle, context)) in handles.into_iter().zip(contexts).enumerate() {
                match handle.await {
                    Ok(exc) => slots.push(exc),
                    Err(e) => {
                        tracing::warn!(index, "stage task failed: {e}");
                        slots.push(Exception::message(format!("stage panicked: {e}")).with_traceback(context));
                    }
                }
            }

            aggregate(slots)
        }
        .instrument(span)
        .await
    }
}
