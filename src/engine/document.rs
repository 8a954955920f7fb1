//! Document snapshot: the editor buffer as lines
//!
//! Fence state is computed once per snapshot. A line whose trimmed content
//! starts with the fence marker flips the state and is itself never scanned;
//! fences do not nest.

/// Immutable line snapshot of the editor buffer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    pub fn new(text: &str) -> Self {
        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        Self { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Line by 1-based number
    pub fn line(&self, line_number: usize) -> Option<&str> {
        line_number
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
    }

    /// Full text, lines joined with `\n`
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Lines outside fenced blocks as `(line_number, text)`, in order
    pub fn scannable_lines<'a>(
        &'a self,
        fence_marker: &'a str,
    ) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        let mut in_fence = false;
        self.lines.iter().enumerate().filter_map(move |(i, line)| {
            if line.trim().starts_with(fence_marker) {
                in_fence = !in_fence;
                return None;
            }
            if in_fence {
                None
            } else {
                Some((i + 1, line.as_str()))
            }
        })
    }
}
