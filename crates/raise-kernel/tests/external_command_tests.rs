//! Pipelines of real external commands.
//!
//! These rely on `true`, `false` and `sh` being on PATH.
#![cfg(unix)]

use raise_kernel::{ExternalCommand, PipelineRunner, PipelineStage};
use raise_types::{Cause, Exception, ExternalCmdExit};

fn cmd(program: &str, args: &[&str]) -> PipelineStage {
    PipelineStage::new(ExternalCommand::new(program, args.iter().copied()))
}

async fn run(stages: Vec<PipelineStage>) -> Exception {
    PipelineRunner::new().run(stages).await
}

fn slot_exits(exc: &Exception) -> Vec<Option<ExternalCmdExit>> {
    let Some(Cause::Pipeline(pe)) = exc.cause() else {
        panic!("expected a pipeline error, got {exc:?}");
    };
    pe.errors()
        .iter()
        .map(|e| match e.cause() {
            Some(Cause::Exit(exit)) => Some(exit.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn successful_pipeline_is_ok() {
    let exc = run(vec![cmd("true", &[]), cmd("true", &[])]).await;
    assert!(exc.is_ok(), "{exc}");
}

#[tokio::test]
async fn single_failing_command() {
    let exc = run(vec![cmd("false", &[])]).await;
    assert_eq!(exc.to_string(), "(false exited with 1)");
}

#[tokio::test]
async fn exit_code_is_decoded() {
    let exc = run(vec![cmd("true", &[]), cmd("sh", &["-c", "exit 3"])]).await;
    assert_eq!(exc.to_string(), "(<nil> | sh exited with 3)");

    let exits = slot_exits(&exc);
    assert!(exits[0].is_none());
    let exit = exits[1].as_ref().expect("exit in slot 1");
    assert_eq!(exit.exit_code(), 3);
    assert_eq!(exit.pid, 0);
}

#[tokio::test]
async fn signal_is_decoded() {
    let exc = run(vec![cmd("sh", &["-c", "kill -9 $$"])]).await;
    assert_eq!(exc.to_string(), "(sh killed by signal killed)");
    let exits = slot_exits(&exc);
    assert_eq!(exits[0].as_ref().map(ExternalCmdExit::exit_code), Some(137));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_failure_keeps_its_slot() {
    let exc = run(vec![
        cmd("sh", &["-c", "sleep 0.2; exit 4"]),
        cmd("false", &[]),
        cmd("true", &[]),
    ])
    .await;
    assert_eq!(exc.to_string(), "(sh exited with 4 | false exited with 1 | <nil>)");
}

#[tokio::test]
async fn missing_program_is_a_failure_not_a_panic() {
    let exc = run(vec![cmd("definitely_not_a_real_command_12345", &[]), cmd("true", &[])]).await;
    let Some(Cause::Pipeline(pe)) = exc.cause() else {
        panic!("expected a pipeline error");
    };
    assert!(pe.errors()[0]
        .to_string()
        .starts_with("definitely_not_a_real_command_12345: "));
    assert!(pe.errors()[1].is_ok());
}
