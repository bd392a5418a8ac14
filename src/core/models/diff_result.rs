/// Result of comparing two resolved configurations.
///
/// `lines` is a unified diff. The control lines (`---`, `+++` and `@@`)
/// end with their `\n` terminator while content lines carry none, so
/// printing every line followed by a newline leaves a blank line after
/// each control line.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffResult {
    pub left_name: String,
    pub right_name: String,
    pub lines: Vec<String>,
}

impl DiffResult {
    /// Returns true if there are no differences.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The diff as one text blob, lines joined by `\n`.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    /// Number of `+` and `-` content lines.
    pub fn changed_lines(&self) -> usize {
        // Control lines are the only ones ending in a newline.
        self.lines
            .iter()
            .filter(|l| !l.ends_with('\n') && (l.starts_with('+') || l.starts_with('-')))
            .count()
    }
}
