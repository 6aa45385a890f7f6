//! Integration tests for the raise REPL.
//!
//! These run lines through the REPL and check what gets reported.

use raise_kernel::{ColorChoice, EscapePolicy, ReportConfig};
use raise_repl::{Repl, Step};

fn repl() -> Repl {
    Repl::new(ReportConfig {
        color: ColorChoice::Never,
        ..ReportConfig::default()
    })
    .expect("Failed to create REPL")
}

fn output(repl: &mut Repl, line: &str) -> Option<String> {
    match repl.process_line(line).expect("process_line failed") {
        Step::Continue(out) => out,
        Step::Report(report) => Some(report),
        Step::Exit => panic!("unexpected exit on {line:?}"),
    }
}

#[test]
fn empty_line_does_nothing() {
    let mut repl = repl();
    assert_eq!(output(&mut repl, "   "), None);
}

#[test]
fn quit_exits() {
    let mut repl = repl();
    assert!(matches!(repl.process_line("/quit").unwrap(), Step::Exit));
}

#[test]
fn help_lists_meta_commands() {
    let mut repl = repl();
    let help = output(&mut repl, "/help").expect("help text");
    assert!(help.contains("/decode"));
    assert!(help.contains("/read"));
}

#[test]
fn unknown_meta_command() {
    let mut repl = repl();
    let out = output(&mut repl, "/frobnicate").expect("error text");
    assert!(out.starts_with("Error: unknown command /frobnicate"), "{out}");
}

#[test]
fn read_meta_command() {
    let mut repl = repl();
    assert_eq!(
        output(&mut repl, "/read ?(error 'bad thing')").as_deref(),
        Some("Exception: bad thing\nTraceback:\n?(error 'bad thing')")
    );
}

#[test]
fn fake_meta_command() {
    let mut repl = repl();
    assert_eq!(output(&mut repl, "/fake cat 0 9").as_deref(), Some("cat killed by signal killed"));
    let out = output(&mut repl, "/fake cat").expect("error text");
    assert!(out.contains("wrong number of arguments"), "{out}");
}

#[test]
fn failures_are_reports_and_meta_output_is_not() {
    let mut repl = repl();
    let step = repl.process_line("true | | true").unwrap();
    assert!(matches!(step, Step::Report(ref r) if r.starts_with("Exception: ")), "{step:?}");
    let step = repl.process_line("/fake cat 1").unwrap();
    assert!(matches!(step, Step::Continue(Some(_))), "{step:?}");
    let step = repl.process_line("/read ?(error x)").unwrap();
    assert!(matches!(step, Step::Continue(Some(_))), "{step:?}");
}

#[test]
fn empty_stage_is_reported_not_fatal() {
    let mut repl = repl();
    let out = output(&mut repl, "true | | true").expect("report");
    assert!(out.starts_with("Exception: empty pipeline stage"), "{out}");
    assert!(!repl.last().is_ok());
}

#[cfg(unix)]
mod pipelines {
    use super::*;

    #[test]
    fn success_is_silent() {
        let mut repl = repl();
        assert_eq!(output(&mut repl, "true | true"), None);
        assert!(repl.last().is_ok());
        assert_eq!(output(&mut repl, "/last").as_deref(), Some("$ok"));
    }

    #[test]
    fn failure_is_reported_at_the_line() {
        let mut repl = repl();
        let out = output(&mut repl, "true | false").expect("report");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            [
                "Exception: (<nil> | false exited with 1)",
                "Traceback:",
                "  [tty], line 1:",
                "    true | false",
            ]
        );
    }

    #[test]
    fn stage_frames_are_kept_in_the_slots() {
        let mut repl = repl();
        output(&mut repl, "true | sh -c false");
        let raise_types::Cause::Pipeline(pe) = repl.last().cause().expect("failure") else {
            panic!("expected a pipeline error");
        };
        let frame = pe.errors()[1].traceback().innermost().expect("stage frame");
        assert_eq!(&frame.source[frame.begin.unwrap()..frame.end], "sh -c false");
    }

    #[test]
    fn last_shows_literal() {
        let mut repl = repl();
        output(&mut repl, "false | true");
        assert_eq!(
            output(&mut repl, "/last").as_deref(),
            Some("?(multi-error ?(error 'false exited with 1') $ok)")
        );
    }

    #[test]
    fn loop_continues_after_failure() {
        let mut repl = repl();
        assert!(output(&mut repl, "false").is_some());
        assert_eq!(output(&mut repl, "true"), None);
        assert!(repl.last().is_ok());
    }

    #[test]
    fn missing_program_is_reported() {
        let mut repl = repl();
        let out = output(&mut repl, "definitely_not_a_real_command_12345").expect("report");
        assert!(out.starts_with("Exception: (definitely_not_a_real_command_12345: "), "{out}");
        assert!(out.contains("[tty], line 1:"), "{out}");
    }
}
