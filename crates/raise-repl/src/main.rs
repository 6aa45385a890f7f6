//! raise CLI entry point.
//!
//! Usage:
//!   raise                                  # Interactive REPL
//!   raise run <cmd> [args] [| <cmd> ...]   # Run one pipeline
//!   raise decode <status> <name> [pid]     # Decode a raw wait status
//!   raise fake <name> <exit> [signal]      # Show a synthetic failure
//!   raise read <literal>                   # Read an exception literal
//!   raise <script>                         # Run a file of pipelines

use std::env;
use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use raise_kernel::{PipelineRunner, ReportConfig, Reporter};
use raise_repl::{commands, Repl, Step};

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        None => {
            raise_repl::run(ReportConfig::load()?)?;
            Ok(ExitCode::SUCCESS)
        }

        Some("--help" | "-h") => {
            print_help();
            Ok(ExitCode::SUCCESS)
        }

        Some("--version" | "-V") => {
            println!("raise {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }

        Some("decode") => {
            let raw = args.get(2).context("decode requires a wait status")?;
            let name = args.get(3).context("decode requires a command name")?;
            println!("{}", commands::decode(raw, name, args.get(4).map(String::as_str))?);
            Ok(ExitCode::SUCCESS)
        }

        Some("fake") => {
            let name = args.get(2).context("fake requires a command name")?;
            let code = args.get(3).context("fake requires an exit code")?;
            println!("{}", commands::fake(name, code, args.get(4).map(String::as_str))?);
            Ok(ExitCode::SUCCESS)
        }

        Some("read") => {
            let literal = args.get(2).context("read requires a literal")?;
            let reporter = Reporter::new(ReportConfig::load()?);
            println!("{}", commands::read(literal, &reporter)?);
            Ok(ExitCode::SUCCESS)
        }

        Some("run") => run_pipeline(&args[2..]),

        Some(path) if !path.starts_with('-') => run_script(path),

        Some(unknown) => {
            eprintln!("Unknown option: {unknown}");
            eprintln!("Run 'raise --help' for usage.");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_help() {
    println!(r#"raise v{}

Usage:
  raise                                  Interactive REPL
  raise run <cmd> [args] [| <cmd> ...]   Run one pipeline and report its failure
  raise decode <status> <name> [pid]     Decode a raw wait status
  raise fake <name> <exit> [signal]      Show a synthetic command failure
  raise read <literal>                   Read an exception literal
  raise <script>                         Run a file of pipelines, one per line

Options:
  -h, --help                             Show this help
  -V, --version                          Show version

Configuration:
  Report settings are read from the config directory (raise/report.toml).
  NO_COLOR turns color off. RUST_LOG controls logging.

Examples:
  raise run sh -c 'exit 3' '|' true
  raise decode 9 sleep
  raise read '?(multi-error $ok ?(error boom))'
"#, env!("CARGO_PKG_VERSION"));
}

/// Run a single pipeline given as arguments.
fn run_pipeline(args: &[String]) -> Result<ExitCode> {
    let stages = commands::stages_from_args(args)?;
    let reporter = Reporter::new(ReportConfig::load()?);

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let exc = rt.block_on(PipelineRunner::new().run(stages));

    reporter.report(&exc, &mut io::stderr());
    Ok(if exc.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Run a script file: one pipeline per line. Failures are reported and the
/// script continues.
fn run_script(path: &str) -> Result<ExitCode> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {path}"))?;

    let mut repl = Repl::new(ReportConfig::load()?)?;
    for line in source.lines() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        match repl.process_line(line)? {
            Step::Continue(Some(output)) => println!("{output}"),
            Step::Report(report) => eprintln!("{report}"),
            Step::Continue(None) => {}
            Step::Exit => break,
        }
    }

    Ok(if repl.last().is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
