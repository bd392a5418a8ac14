use crate::core::errors::Result;
use crate::core::models::diff_result::DiffResult;
use crate::core::models::resolved_config::ResolvedConfig;
use crate::core::services::sequence_matcher::{SequenceMatcher, Tag};
use crate::core::traits::word_differ::WordDiffer;

/// Lines of context around each change.
pub const CONTEXT_LINES: usize = 3;

/// Terminator of the `---`, `+++` and `@@` control lines.
const LINE_TERM: &str = "\n";

/// Compares two resolved configurations line by line.
pub struct DiffService;

impl DiffService {
    /// Compute the unified diff between `left` and `right`.
    ///
    /// Headers name `left_name` and `right_name`; hunks carry
    /// `CONTEXT_LINES` lines of context. Identical inputs yield an empty
    /// result.
    pub fn diff(
        &self,
        left: &ResolvedConfig,
        left_name: &str,
        right: &ResolvedConfig,
        right_name: &str,
    ) -> DiffResult {
        let a = &left.lines;
        let b = &right.lines;
        let mut lines = Vec::new();

        for group in SequenceMatcher::new(a, b).grouped_opcodes(CONTEXT_LINES) {
            if lines.is_empty() {
                lines.push(format!("--- {left_name}{LINE_TERM}"));
                lines.push(format!("+++ {right_name}{LINE_TERM}"));
            }

            let (Some(first), Some(last)) = (group.first(), group.last()) else {
                continue;
            };
            lines.push(format!(
                "@@ -{} +{} @@{LINE_TERM}",
                format_range(first.a_start, last.a_end),
                format_range(first.b_start, last.b_end)
            ));

            for code in &group {
                if code.tag == Tag::Equal {
                    lines.extend(a[code.a_start..code.a_end].iter().map(|l| format!(" {l}")));
                    continue;
                }
                if matches!(code.tag, Tag::Replace | Tag::Delete) {
                    lines.extend(a[code.a_start..code.a_end].iter().map(|l| format!("-{l}")));
                }
                if matches!(code.tag, Tag::Replace | Tag::Insert) {
                    lines.extend(b[code.b_start..code.b_end].iter().map(|l| format!("+{l}")));
                }
            }
        }

        DiffResult {
            left_name: left_name.to_string(),
            right_name: right_name.to_string(),
            lines,
        }
    }

    /// Render `result` as an inline word diff through `differ`.
    pub fn word_diff(&self, result: &DiffResult, differ: &dyn WordDiffer) -> Result<String> {
        tracing::debug!(tool = differ.name(), lines = result.lines.len(), "running word diff");
        differ.word_diff(&result.to_text())
    }
}

/// Format a half-open line range as a unified diff hunk range.
///
/// Ranges are 1-based `start,length`; a single line is just `start`, and
/// an empty range points at the line before it.
fn format_range(start: usize, stop: usize) -> String {
    let length = stop - start;
    match length {
        1 => format!("{}", start + 1),
        0 => format!("{start},0"),
        _ => format!("{},{length}", start + 1),
    }
}
