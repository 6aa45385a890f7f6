//! The one-shot commands and the pipeline syntax shared with the REPL.
//!
//! Pipelines are words separated by whitespace, with stages split on a
//! `|` word. There is no quoting: each stage is a program and its
//! arguments.

use std::ops::Range;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use raise_kernel::{read_exception, ExternalCommand, PipelineStage, Reporter};
use raise_types::{ExternalCmdExit, Pprint, Repr, SourceContext, Traceback, WaitStatus};

/// Decode a raw wait status the way the scheduler does.
pub fn decode(raw: &str, name: &str, pid: Option<&str>) -> Result<String> {
    let raw: i32 = raw
        .parse()
        .with_context(|| format!("invalid wait status: {raw}"))?;
    let pid = match pid {
        Some(pid) => pid.parse().with_context(|| format!("invalid pid: {pid}"))?,
        None => 0,
    };
    Ok(match ExternalCmdExit::decode(name, WaitStatus(raw), pid) {
        Some(exit) => exit.to_string(),
        None => "ok".to_string(),
    })
}

/// Describe a command that "exited" without running a process.
pub fn fake(name: &str, code: &str, signal: Option<&str>) -> Result<String> {
    let code: i32 = code
        .parse()
        .with_context(|| format!("invalid exit code: {code}"))?;
    let signal: i32 = match signal {
        Some(sig) => sig.parse().with_context(|| format!("invalid signal: {sig}"))?,
        None => 0,
    };
    Ok(ExternalCmdExit::fake(name, code, signal).to_string())
}

/// Read a literal and show it both ways: rendered, then as a literal.
pub fn read(literal: &str, reporter: &Reporter) -> Result<String> {
    let exc = read_exception(literal).with_context(|| format!("cannot read {literal:?}"))?;
    Ok(format!("{}\n{}", reporter.present(exc.pprint()), exc.repr(0)))
}

/// Build pipeline stages from command-line arguments.
///
/// Arguments are taken as words as-is, so an argument may contain spaces.
pub fn stages_from_args(args: &[String]) -> Result<Vec<PipelineStage>> {
    let mut source = String::new();
    let mut words = Vec::with_capacity(args.len());
    for arg in args {
        if !source.is_empty() {
            source.push(' ');
        }
        let start = source.len();
        source.push_str(arg);
        words.push((arg.clone(), start..source.len()));
    }
    build_stages("[args]", source.into(), words)
}

/// Build pipeline stages from one line of input.
pub fn stages_from_line(line: &str) -> Result<Vec<PipelineStage>> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, c) in line.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                words.push((line[s..i].to_string(), s..i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push((line[s..].to_string(), s..line.len()));
    }
    build_stages("[tty]", line.into(), words)
}

/// The frame of a whole input line, for what the pipeline as a whole raises.
pub fn line_frame(line: &str) -> Traceback {
    let begin = line.len() - line.trim_start().len();
    let end = line.trim_end().len();
    Traceback::from_frames([SourceContext::new("[tty]", line, begin, end.max(begin))])
}

/// Group words into stages on `|`. Each stage's traceback frame points at
/// its own words.
fn build_stages(
    name: &str,
    source: Arc<str>,
    words: Vec<(String, Range<usize>)>,
) -> Result<Vec<PipelineStage>> {
    let mut stages = Vec::new();
    let mut current: Vec<(String, Range<usize>)> = Vec::new();

    for (word, span) in words.into_iter().chain([("|".to_string(), 0..0)]) {
        if word != "|" {
            current.push((word, span));
            continue;
        }
        let (Some(first), Some(last)) = (current.first(), current.last()) else {
            bail!("empty pipeline stage");
        };
        let frame = SourceContext::new(name, source.clone(), first.1.start, last.1.end);
        let mut argv = current.drain(..).map(|(w, _)| w);
        if let Some(program) = argv.next() {
            let stage = ExternalCommand::new(program, argv);
            stages.push(PipelineStage::new(stage).with_context(Traceback::from_frames([frame])));
        }
    }

    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use raise_kernel::{ColorChoice, ReportConfig};
    use rstest::rstest;

    fn plain() -> Reporter {
        Reporter::new(ReportConfig {
            color: ColorChoice::Never,
            ..ReportConfig::default()
        })
    }

    #[cfg(unix)]
    #[rstest]
    #[case("0", None, "ok")]
    #[case("256", None, "cat exited with 1")]
    #[case("9", Some("42"), "cat killed by signal killed")]
    #[case("139", None, "cat killed by signal segmentation fault (core dumped)")]
    fn decode_statuses(#[case] raw: &str, #[case] pid: Option<&str>, #[case] expected: &str) {
        assert_eq!(decode(raw, "cat", pid).unwrap(), expected);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn decode_stopped_keeps_pid() {
        // SIGTSTP is 20 on Linux.
        let raw = ((20 << 8) | 0x7f).to_string();
        assert_eq!(
            decode(&raw, "vim", Some("42")).unwrap(),
            "vim stopped by signal stopped (pid=42)"
        );
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode("nope", "cat", None).is_err());
        assert!(decode("0", "cat", Some("-1")).is_err());
    }

    #[test]
    fn fake_exit() {
        assert_eq!(fake("f", "2", None).unwrap(), "f exited with 2");
        assert!(fake("f", "x", None).is_err());
    }

    #[test]
    fn fake_with_huge_code_does_not_overflow() {
        let out = fake("x", "8388607", Some("256")).unwrap();
        assert!(out.starts_with("x "), "{out}");
        assert!(fake("x", "-2147483648", Some("-1")).is_ok());
    }

    #[test]
    fn read_shows_both_forms() {
        let out = read("?(multi-error $ok ?(error x))", &plain()).unwrap();
        assert_eq!(out, "Exception: (<nil> | x)\nTraceback:\n?(multi-error $ok ?(error x))");
    }

    #[test]
    fn read_ok() {
        assert_eq!(read("$ok", &plain()).unwrap(), "ok\n$ok");
    }

    #[test]
    fn read_reports_bad_literal() {
        assert!(read("?(nope)", &plain()).is_err());
    }

    #[test]
    fn line_splits_on_pipes() {
        let stages = stages_from_line("ls -l | grep x |wc").unwrap();
        // "|wc" is one word, so it is not a separator.
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].stage.name(), "ls");
        assert_eq!(stages[1].stage.name(), "grep");
    }

    #[test]
    fn stage_frames_point_at_their_words() {
        let stages = stages_from_line("  true | sh -c x ").unwrap();
        let frame = stages[1].context.innermost().cloned().unwrap();
        assert_eq!(frame.name, "[tty]");
        assert_eq!(&frame.source[frame.begin.unwrap()..frame.end], "sh -c x");
    }

    #[test]
    fn args_keep_spaces() {
        let args: Vec<String> = ["sh", "-c", "exit 3", "|", "true"].map(String::from).to_vec();
        let stages = stages_from_args(&args).unwrap();
        assert_eq!(stages.len(), 2);
        let frame = stages[0].context.innermost().cloned().unwrap();
        assert_eq!(&frame.source[frame.begin.unwrap()..frame.end], "sh -c exit 3");
    }

    #[test]
    fn line_frame_covers_the_trimmed_line() {
        let tb = line_frame("  a | b  ");
        let frame = tb.innermost().unwrap();
        assert_eq!(&frame.source[frame.begin.unwrap()..frame.end], "a | b");
    }

    #[rstest]
    #[case("| true")]
    #[case("true |")]
    #[case("true | | false")]
    fn empty_stage_is_an_error(#[case] line: &str) {
        assert!(stages_from_line(line).is_err());
    }

    #[test]
    fn empty_line_has_no_stages() {
        assert!(stages_from_line("   ").err().unwrap().to_string().contains("empty"));
    }
}
