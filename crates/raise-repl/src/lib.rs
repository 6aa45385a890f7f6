//! raise REPL: run pipelines interactively and see what they raise.
//!
//! Each line is a pipeline of external commands. Whatever the pipeline
//! raises is reported and the loop carries on. It also handles:
//! - Meta-commands: `/help`, `/quit`, `/last`, `/read`, `/decode`, `/fake`
//! - Command history via rustyline

pub mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tokio::runtime::Runtime;

use raise_kernel::{PipelineRunner, ReportConfig, Reporter};
use raise_types::{Exception, Repr};

/// What the loop should do after a line.
#[derive(Debug)]
pub enum Step {
    /// Continue, showing the output if there is any.
    Continue(Option<String>),
    /// Continue after a pipeline failed. The report goes to stderr, the
    /// stream the reporter picks colors for.
    Report(String),
    Exit,
}

/// REPL state.
pub struct Repl {
    reporter: Reporter,
    runner: PipelineRunner,
    runtime: Runtime,
    last: Exception,
}

impl Repl {
    pub fn new(config: ReportConfig) -> Result<Self> {
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;
        Ok(Self {
            reporter: Reporter::new(config),
            runner: PipelineRunner::new(),
            runtime,
            last: Exception::OK,
        })
    }

    /// The exception raised by the last pipeline, `$ok` if it succeeded.
    pub fn last(&self) -> &Exception {
        &self.last
    }

    /// Process a single line of input.
    ///
    /// Pipeline failures come back as [`Step::Report`]; only an I/O-level
    /// problem with the REPL itself is an `Err`.
    pub fn process_line(&mut self, line: &str) -> Result<Step> {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return Ok(Step::Continue(None));
        }

        if let Some(meta) = trimmed.strip_prefix('/') {
            return Ok(self.handle_meta_command(meta));
        }

        let exc = match commands::stages_from_line(line) {
            Ok(stages) => self.runtime.block_on(self.runner.run(stages)),
            Err(e) => Exception::message(format!("{e:#}")),
        };
        let exc = if exc.is_ok() {
            exc
        } else {
            exc.with_traceback(commands::line_frame(line))
        };
        self.last = exc.clone();

        let mut out = Vec::new();
        if !self.reporter.report(&exc, &mut out) {
            return Ok(Step::Continue(None));
        }
        let text = String::from_utf8(out).context("report is not UTF-8")?;
        Ok(Step::Report(text.trim_end().to_string()))
    }

    fn handle_meta_command(&mut self, meta: &str) -> Step {
        let mut parts = meta.split_whitespace();
        let cmd = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        let output = match (cmd, args.as_slice()) {
            ("quit" | "exit" | "q", _) => return Step::Exit,
            ("help" | "h" | "?", _) => Ok(HELP.to_string()),
            ("last", _) => Ok(self.last.repr(0)),
            ("read", _) => {
                let literal = meta.strip_prefix(cmd).unwrap_or_default().trim();
                commands::read(literal, &self.reporter)
            }
            ("decode", [raw, name]) => commands::decode(raw, name, None),
            ("decode", [raw, name, pid]) => commands::decode(raw, name, Some(*pid)),
            ("fake", [name, code]) => commands::fake(name, code, None),
            ("fake", [name, code, sig]) => commands::fake(name, code, Some(*sig)),
            ("decode" | "fake", _) => Err(anyhow::anyhow!("wrong number of arguments to /{cmd}")),
            _ => Err(anyhow::anyhow!("unknown command /{cmd}, try /help")),
        };

        Step::Continue(Some(output.unwrap_or_else(|e| format!("Error: {e:#}"))))
    }
}

const HELP: &str = "\
Enter a pipeline to run it: cmd args | cmd args ...

Meta-commands:
  /help                       Show this help
  /quit                       Exit the REPL
  /last                       Show the last pipeline's exception as a literal
  /read <literal>             Read an exception literal and show it
  /decode <status> <name> [pid]
                              Decode a raw wait status
  /fake <name> <exit> [sig]   Show a synthetic command failure";

/// Run the REPL.
pub fn run(config: ReportConfig) -> Result<()> {
    println!("raise v{}", env!("CARGO_PKG_VERSION"));
    println!("Type /help for commands, /quit to exit.");

    let mut rl: Editor<(), DefaultHistory> = Editor::new().context("Failed to create editor")?;

    let history_path = directories::BaseDirs::new().map(|b| b.data_dir().join("raise").join("history.txt"));
    if let Some(ref path) = history_path {
        if let Err(e) = rl.load_history(path) {
            let is_not_found =
                matches!(&e, ReadlineError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound);
            if !is_not_found {
                tracing::warn!("Failed to load history: {}", e);
            }
        }
    }

    let mut repl = Repl::new(config)?;
    println!();

    loop {
        match rl.readline("raise> ") {
            Ok(line) => {
                if let Err(e) = rl.add_history_entry(line.as_str()) {
                    tracing::warn!("Failed to add history entry: {}", e);
                }

                match repl.process_line(&line)? {
                    Step::Continue(Some(output)) => println!("{output}"),
                    Step::Report(report) => eprintln!("{report}"),
                    Step::Continue(None) => {}
                    Step::Exit => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }

    save_history(&mut rl, &history_path);
    Ok(())
}

fn save_history(rl: &mut Editor<(), DefaultHistory>, path: &Option<PathBuf>) {
    let Some(path) = path else {
        return;
    };
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!("Failed to create history directory: {}", e);
            return;
        }
    }
    if let Err(e) = rl.save_history(path) {
        tracing::warn!("Failed to save history: {}", e);
    }
}
