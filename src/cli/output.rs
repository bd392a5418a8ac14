use std::io::Write;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Print a warning message.
pub fn warning(err: &mut dyn Write, msg: &str) {
    let _ = writeln!(err, "  {} {}", "⚠".yellow(), msg);
}

/// Print an error message.
pub fn error(err: &mut dyn Write, msg: &str) {
    let _ = writeln!(err, "  {} {}", "✗".red(), msg);
}

/// Start a spinner on stderr. It stays hidden when stderr is not a terminal.
pub fn spinner(msg: &str) -> ProgressBar {
    let sp = ProgressBar::new_spinner();
    sp.set_style(
        ProgressStyle::with_template("  {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    sp.set_message(msg.to_string());
    sp.enable_steady_tick(Duration::from_millis(80));
    sp
}

/// Stop a spinner and erase it, leaving stdout untouched.
pub fn finish_spinner(sp: ProgressBar) {
    sp.finish_and_clear();
}
