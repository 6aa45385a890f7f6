//! Decoding how an external command ended.
//!
//! The process layer hands over the raw status word from `wait(2)`.
//! [`ExternalCmdExit::decode`] turns it into "no failure" for a clean exit,
//! and into a failure describing the exit code, signal, stop or trap for
//! everything else.

use std::fmt;

use crate::quote::quote;

const STATUS_MASK: i32 = 0x7f;
const CORE_FLAG: i32 = 0x80;
const STOPPED: i32 = 0x7f;
const CONTINUED: i32 = 0xffff;

#[cfg(unix)]
const SIGTRAP: i32 = nix::libc::SIGTRAP;
#[cfg(not(unix))]
const SIGTRAP: i32 = 5;

/// A raw `wait(2)` status word.
///
/// Bits 0-6 hold the terminating signal (0 when the process exited, 0x7f
/// when it is stopped), bit 7 the core dump flag, bits 8-15 the exit code
/// or stop signal, and the bits above that the ptrace event of a trap stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaitStatus(pub i32);

impl WaitStatus {
    /// Fabricate a status from an exit code and a signal number.
    ///
    /// A zero signal yields a normal exit with `code`; a non-zero signal
    /// yields a signaled status. Out-of-range values wrap instead of
    /// overflowing.
    pub fn from_parts(code: i32, signal: i32) -> Self {
        WaitStatus((code << 8).wrapping_add(signal))
    }

    pub fn exited(self) -> bool {
        self.0 & STATUS_MASK == 0
    }

    /// The exit code, if the process exited normally.
    pub fn exit_status(self) -> Option<i32> {
        self.exited().then_some((self.0 >> 8) & 0xff)
    }

    pub fn signaled(self) -> bool {
        let sig = self.0 & STATUS_MASK;
        sig != STOPPED && sig != 0
    }

    /// The terminating signal, if the process was killed by one.
    pub fn signal(self) -> Option<i32> {
        self.signaled().then_some(self.0 & STATUS_MASK)
    }

    pub fn core_dump(self) -> bool {
        self.signaled() && self.0 & CORE_FLAG != 0
    }

    pub fn stopped(self) -> bool {
        self.0 & 0xff == STOPPED
    }

    /// The signal that stopped the process, if it is stopped.
    pub fn stop_signal(self) -> Option<i32> {
        self.stopped().then_some((self.0 >> 8) & 0xff)
    }

    pub fn continued(self) -> bool {
        self.0 == CONTINUED
    }

    /// The ptrace event of a SIGTRAP stop.
    ///
    /// `None` for every status that is not a trap stop.
    pub fn trap_cause(self) -> Option<i32> {
        (self.stop_signal() == Some(SIGTRAP)).then_some(((self.0 as u32) >> 16) as i32)
    }
}

#[cfg(unix)]
impl From<std::process::ExitStatus> for WaitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;
        WaitStatus(status.into_raw())
    }
}

impl fmt::Display for WaitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The description of a signal number, e.g. `killed` for SIGKILL.
///
/// Numbers without a description render as `signal N`.
#[cfg(unix)]
pub fn signal_name(signo: i32) -> String {
    use nix::sys::signal::Signal;

    let desc = match Signal::try_from(signo) {
        Ok(Signal::SIGHUP) => "hangup",
        Ok(Signal::SIGINT) => "interrupt",
        Ok(Signal::SIGQUIT) => "quit",
        Ok(Signal::SIGILL) => "illegal instruction",
        Ok(Signal::SIGTRAP) => "trace/breakpoint trap",
        Ok(Signal::SIGABRT) => "aborted",
        Ok(Signal::SIGBUS) => "bus error",
        Ok(Signal::SIGFPE) => "floating point exception",
        Ok(Signal::SIGKILL) => "killed",
        Ok(Signal::SIGUSR1) => "user defined signal 1",
        Ok(Signal::SIGSEGV) => "segmentation fault",
        Ok(Signal::SIGUSR2) => "user defined signal 2",
        Ok(Signal::SIGPIPE) => "broken pipe",
        Ok(Signal::SIGALRM) => "alarm clock",
        Ok(Signal::SIGTERM) => "terminated",
        #[cfg(all(
            any(target_os = "linux", target_os = "android"),
            not(any(
                target_arch = "mips",
                target_arch = "mips32r6",
                target_arch = "mips64",
                target_arch = "mips64r6",
                target_arch = "sparc64"
            ))
        ))]
        Ok(Signal::SIGSTKFLT) => "stack fault",
        Ok(Signal::SIGCHLD) => "child exited",
        Ok(Signal::SIGCONT) => "continued",
        Ok(Signal::SIGSTOP) => "stopped (signal)",
        Ok(Signal::SIGTSTP) => "stopped",
        Ok(Signal::SIGTTIN) => "stopped (tty input)",
        Ok(Signal::SIGTTOU) => "stopped (tty output)",
        Ok(Signal::SIGURG) => "urgent I/O condition",
        Ok(Signal::SIGXCPU) => "CPU time limit exceeded",
        Ok(Signal::SIGXFSZ) => "file size limit exceeded",
        Ok(Signal::SIGVTALRM) => "virtual timer expired",
        Ok(Signal::SIGPROF) => "profiling timer expired",
        Ok(Signal::SIGWINCH) => "window changed",
        Ok(Signal::SIGIO) => "I/O possible",
        #[cfg(any(target_os = "linux", target_os = "android"))]
        Ok(Signal::SIGPWR) => "power failure",
        Ok(Signal::SIGSYS) => "bad system call",
        _ => return format!("signal {signo}"),
    };
    desc.to_string()
}

#[cfg(not(unix))]
pub fn signal_name(signo: i32) -> String {
    format!("signal {signo}")
}

/// An external command that did not exit cleanly.
///
/// `pid` is only kept for stopped processes, so a job-control layer can
/// resume them; it is 0 otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCmdExit {
    pub status: WaitStatus,
    pub cmd_name: String,
    pub pid: u32,
}

impl ExternalCmdExit {
    /// Decode a raw status. Returns `None` for a normal exit with code 0.
    pub fn decode(cmd_name: impl Into<String>, status: WaitStatus, pid: u32) -> Option<Self> {
        if status.exit_status() == Some(0) {
            return None;
        }
        let pid = if status.stopped() { pid } else { 0 };
        Some(Self {
            status,
            cmd_name: cmd_name.into(),
            pid,
        })
    }

    /// Build a failure for a command that never ran as a real process.
    ///
    /// Renders exactly like a decoded status with the same exit code and
    /// signal. Unlike [`ExternalCmdExit::decode`] this does not filter out
    /// success.
    pub fn fake(cmd_name: impl Into<String>, code: i32, signal: i32) -> Self {
        Self {
            status: WaitStatus::from_parts(code, signal),
            cmd_name: cmd_name.into(),
            pid: 0,
        }
    }

    /// The shell exit code for this status: the exit code itself, or 128
    /// plus the signal number for signaled and stopped processes.
    pub fn exit_code(&self) -> i64 {
        let ws = self.status;
        if let Some(code) = ws.exit_status() {
            i64::from(code)
        } else if let Some(sig) = ws.signal().or(ws.stop_signal()) {
            128 + i64::from(sig)
        } else {
            1
        }
    }
}

impl fmt::Display for ExternalCmdExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ws = self.status;
        let name = quote(&self.cmd_name);
        if let Some(code) = ws.exit_status() {
            write!(f, "{name} exited with {code}")
        } else if let Some(sig) = ws.signal() {
            write!(f, "{name} killed by signal {}", signal_name(sig))?;
            if ws.core_dump() {
                f.write_str(" (core dumped)")?;
            }
            Ok(())
        } else if let Some(sig) = ws.stop_signal() {
            write!(f, "{name} stopped by signal {} (pid={})", signal_name(sig), self.pid)?;
            if let Some(cause) = ws.trap_cause() {
                write!(f, " (trapped {cause})")?;
            }
            Ok(())
        } else {
            write!(f, "{name} has unknown WaitStatus {ws}")
        }
    }
}

impl std::error::Error for ExternalCmdExit {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use nix::libc;
    use rstest::rstest;

    fn stopped_by(sig: i32) -> WaitStatus {
        WaitStatus((sig << 8) | STOPPED)
    }

    #[test]
    fn clean_exit_is_not_a_failure() {
        assert_eq!(ExternalCmdExit::decode("ls", WaitStatus(0), 7), None);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(127)]
    #[case(255)]
    fn nonzero_exit(#[case] code: i32) {
        let exit = ExternalCmdExit::decode("make", WaitStatus(code << 8), 99).unwrap();
        assert_eq!(exit.to_string(), format!("make exited with {code}"));
        assert_eq!(exit.pid, 0);
        assert_eq!(exit.exit_code(), i64::from(code));
    }

    #[test]
    fn command_name_is_quoted() {
        let exit = ExternalCmdExit::decode("my cmd", WaitStatus(1 << 8), 0).unwrap();
        assert_eq!(exit.to_string(), "'my cmd' exited with 1");
    }

    #[test]
    fn killed_without_core() {
        let exit = ExternalCmdExit::decode("sleep", WaitStatus(libc::SIGKILL), 12).unwrap();
        assert_eq!(exit.to_string(), "sleep killed by signal killed");
        assert!(!exit.to_string().contains("core dumped"));
        assert_eq!(exit.pid, 0);
        assert_eq!(exit.exit_code(), 128 + i64::from(libc::SIGKILL));
    }

    #[test]
    fn killed_with_core() {
        let exit = ExternalCmdExit::decode("a.out", WaitStatus(libc::SIGSEGV | CORE_FLAG), 0).unwrap();
        assert_eq!(exit.to_string(), "a.out killed by signal segmentation fault (core dumped)");
    }

    #[test]
    fn stopped_keeps_pid() {
        let exit = ExternalCmdExit::decode("vim", stopped_by(libc::SIGTSTP), 4242).unwrap();
        assert_eq!(exit.pid, 4242);
        assert_eq!(exit.to_string(), "vim stopped by signal stopped (pid=4242)");
        assert!(!exit.to_string().contains("trapped"));
    }

    #[test]
    fn trap_stop_reports_cause() {
        let ws = WaitStatus((3 << 16) | (libc::SIGTRAP << 8) | STOPPED);
        assert_eq!(ws.trap_cause(), Some(3));
        let exit = ExternalCmdExit::decode("gdb", ws, 5).unwrap();
        assert_eq!(exit.to_string(), "gdb stopped by signal trace/breakpoint trap (pid=5) (trapped 3)");
    }

    #[test]
    fn non_trap_stop_has_no_cause() {
        assert_eq!(stopped_by(libc::SIGSTOP).trap_cause(), None);
        assert_eq!(WaitStatus(1 << 8).trap_cause(), None);
    }

    #[test]
    fn continued_falls_through_to_unknown() {
        let ws = WaitStatus(0xffff);
        assert!(ws.continued());
        assert!(!ws.exited() && !ws.signaled() && !ws.stopped());
        let exit = ExternalCmdExit::decode("job", ws, 0).unwrap();
        assert_eq!(exit.to_string(), "job has unknown WaitStatus 65535");
    }

    #[test]
    fn unknown_signal_number_still_renders() {
        let exit = ExternalCmdExit::decode("x", WaitStatus(0x7e), 0).unwrap();
        assert_eq!(exit.to_string(), "x killed by signal signal 126");
    }

    #[rstest]
    #[case(libc::SIGHUP, "hangup")]
    #[case(libc::SIGINT, "interrupt")]
    #[case(libc::SIGABRT, "aborted")]
    #[case(libc::SIGPIPE, "broken pipe")]
    #[case(libc::SIGTERM, "terminated")]
    #[case(libc::SIGSTOP, "stopped (signal)")]
    #[case(libc::SIGTTIN, "stopped (tty input)")]
    #[case(0, "signal 0")]
    #[case(-3, "signal -3")]
    fn signal_descriptions(#[case] signo: i32, #[case] desc: &str) {
        assert_eq!(signal_name(signo), desc);
    }

    #[rstest]
    #[case(0x7f_ffff, 256)]
    #[case(i32::MAX, i32::MAX)]
    #[case(i32::MIN, -1)]
    fn from_parts_wraps_instead_of_overflowing(#[case] code: i32, #[case] signal: i32) {
        let ws = WaitStatus::from_parts(code, signal);
        assert_eq!(ws.0, (code << 8).wrapping_add(signal));
        let exit = ExternalCmdExit::fake("x", code, signal);
        assert!(exit.to_string().starts_with("x "));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(3, 0)]
    #[case(0, libc::SIGTERM)]
    #[case(0, libc::SIGINT)]
    fn fake_matches_real_status(#[case] code: i32, #[case] signal: i32) {
        let fake = ExternalCmdExit::fake("cmd", code, signal);
        let real = ExternalCmdExit {
            status: WaitStatus(if signal == 0 { code << 8 } else { signal }),
            cmd_name: "cmd".into(),
            pid: 0,
        };
        assert_eq!(fake.to_string(), real.to_string());
    }

    #[test]
    fn fake_zero_is_not_filtered() {
        assert_eq!(ExternalCmdExit::fake("true", 0, 0).to_string(), "true exited with 0");
        assert_eq!(ExternalCmdExit::decode("true", WaitStatus::from_parts(0, 0), 0), None);
    }

    #[test]
    fn real_exit_status_converts() {
        use std::os::unix::process::ExitStatusExt;
        let status = std::process::ExitStatus::from_raw(2 << 8);
        assert_eq!(WaitStatus::from(status).exit_status(), Some(2));
    }
}
