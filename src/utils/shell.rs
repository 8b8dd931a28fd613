//! Shell escaping and quoting utilities.

/// Escape a value for use inside single quotes.
/// Replaces `'` with `'\''` (end quote, escaped quote, start quote).
pub fn escape_single_quote_content(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Quote a path for shell execution (always quotes).
pub fn quote_path(path: &str) -> String {
    format!("'{}'", escape_single_quote_content(path))
}

/// Escape an entire command string for execution under another shell.
/// Use this when passing a complete command (with operators) to `bash -lc`.
/// Wraps the command in single quotes and escapes embedded quotes.
pub fn escape_command_for_shell(command: &str) -> String {
    format!("'{}'", escape_single_quote_content(command))
}

/// Wrap a command for execution under a remote login shell.
///
/// The command may contain arbitrary text, including single quotes; the
/// whole string is escaped before embedding, so `bash -lc` receives it as
/// a single argument verbatim.
pub fn bash_lc(command: &str) -> String {
    format!("bash -lc {}", escape_command_for_shell(command))
}
