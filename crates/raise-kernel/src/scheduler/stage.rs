//! Pipeline stages and their outcomes.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use raise_types::{quote, Exception, ExternalCmdExit, Traceback, WaitStatus};

/// How a single stage finished.
#[derive(Debug, Clone)]
pub enum StageOutcome {
    Success,
    /// An external process was reaped with this raw status.
    Status { status: WaitStatus, pid: u32 },
    /// The stage failed on its own terms.
    Failed(Exception),
}

impl StageOutcome {
    /// Turn the outcome into the stage's pipeline slot.
    ///
    /// Failures without a traceback of their own get `context`, the frame
    /// of the stage's command in the pipeline source.
    pub fn into_exception(self, name: &str, context: &Traceback) -> Exception {
        let exc = match self {
            StageOutcome::Success => return Exception::OK,
            StageOutcome::Status { status, pid } => match ExternalCmdExit::decode(name, status, pid) {
                Some(exit) => Exception::new(exit),
                None => return Exception::OK,
            },
            StageOutcome::Failed(exc) => exc,
        };
        if !exc.is_ok() && exc.traceback().is_empty() {
            exc.with_traceback(context.clone())
        } else {
            exc
        }
    }
}

/// One stage of a pipeline.
#[async_trait]
pub trait Stage: Send + Sync {
    /// The command name, used in exit messages.
    fn name(&self) -> &str;

    /// Run the stage to completion. `index` is its position in the pipeline.
    async fn run(&self, index: usize) -> StageOutcome;
}

/// An external program.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn failure(&self, err: std::io::Error) -> StageOutcome {
        StageOutcome::Failed(Exception::message(format!("{}: {err}", quote(&self.program))))
    }
}

#[async_trait]
impl Stage for ExternalCommand {
    fn name(&self) -> &str {
        &self.program
    }

    #[tracing::instrument(level = "debug", skip(self), fields(program = %self.program))]
    async fn run(&self, index: usize) -> StageOutcome {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(Stdio::null());
        cmd.kill_on_drop(true);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return self.failure(e),
        };
        // The pid is gone once the child is reaped.
        let pid = child.id().unwrap_or(0);
        tracing::debug!(pid, "spawned external command");

        match child.wait().await {
            Ok(status) => StageOutcome::Status {
                status: wait_status(status),
                pid,
            },
            Err(e) => self.failure(e),
        }
    }
}

#[cfg(unix)]
fn wait_status(status: std::process::ExitStatus) -> WaitStatus {
    WaitStatus::from(status)
}

#[cfg(not(unix))]
fn wait_status(status: std::process::ExitStatus) -> WaitStatus {
    WaitStatus::from_parts(status.code().unwrap_or(1), 0)
}

/// Boxed future returned by [`FnStage`] closures.
pub type StageFuture = Pin<Box<dyn Future<Output = StageOutcome> + Send>>;

/// A stage backed by an async closure: builtins and tests.
pub struct FnStage<F> {
    name: String,
    f: F,
}

impl<F> FnStage<F>
where
    F: Fn(usize) -> StageFuture + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

#[async_trait]
impl<F> Stage for FnStage<F>
where
    F: Fn(usize) -> StageFuture + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, index: usize) -> StageOutcome {
        (self.f)(index).await
    }
}
