//! The few SGR sequences the pretty-printers embed.

/// Red, bold: ordinary failures.
pub const ERROR: &str = "\x1b[31;1m";
/// Yellow, bold: control transfers.
pub const WARNING: &str = "\x1b[33;1m";
/// Bold, underlined: the culprit region of a traceback frame.
pub const CULPRIT: &str = "\x1b[1;4m";
/// Reset.
pub const RESET: &str = "\x1b[m";

/// Wrap `text` in `style` and a reset.
pub fn paint(style: &str, text: &str) -> String {
    format!("{style}{text}{RESET}")
}
