//! Shell escaping for log output
//!
//! Everything here is cosmetic. Commands are always spawned from the raw argv;
//! escaped strings only ever end up in log lines.

/// Escape a single token so that a POSIX shell reads it back as one argument.
pub fn shell_escape(token: &str) -> String {
    shell_words::quote(token).into_owned()
}

/// Escape every token of a command and join them with single spaces.
pub fn escape_command<S: AsRef<str>>(argv: &[S]) -> String {
    shell_words::join(argv)
}
