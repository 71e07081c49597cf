//! Indentation-aware text buffer for exporters

const INDENT: &str = "  ";

/// Accumulates generated source text with tracked indentation. Exporters
/// build the whole file in memory; the driver owns the single write to
/// disk so output either lands completely or not at all.
#[derive(Debug, Default)]
pub struct IndentedWriter {
    buffer: String,
    depth: usize,
}

impl IndentedWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line at the current indentation
    pub fn push_line(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.depth {
                self.buffer.push_str(INDENT);
            }
            self.buffer.push_str(line);
        }
        self.buffer.push('\n');
    }

    pub fn blank_line(&mut self) {
        self.buffer.push('\n');
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Open a line-oriented block: emit `opening`, run `body` one level
    /// deeper, then emit `closing`.
    pub fn block(
        &mut self,
        opening: &str,
        closing: &str,
        body: impl FnOnce(&mut Self),
    ) {
        self.push_line(opening);
        self.indent();
        body(self);
        self.dedent();
        self.push_line(closing);
    }

    pub fn into_inner(self) -> String {
        self.buffer
    }
}
