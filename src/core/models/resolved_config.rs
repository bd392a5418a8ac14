/// A fully rendered device configuration, one entry per text line.
///
/// Lines carry no terminators. Both raw config files and rendered
/// templates are brought into this shape before they are compared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub lines: Vec<String>,
}

impl ResolvedConfig {
    /// Split the content of a raw config file into lines, dropping the
    /// newline that ends each one.
    pub fn from_file_content(content: &str) -> Self {
        let lines = content
            .split_inclusive('\n')
            .map(|line| line.trim_end_matches('\n').to_string())
            .collect();
        Self { lines }
    }

    /// Shape rendered template output: surrounding newlines are stripped
    /// and the rest is split on `\n`.
    pub fn from_rendered(rendered: &str) -> Self {
        let lines = rendered
            .trim_matches('\n')
            .split('\n')
            .map(str::to_string)
            .collect();
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
