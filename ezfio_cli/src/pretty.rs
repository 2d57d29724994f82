//! Pretty printing of values read by `get` commands.
//!
//! The layout follows Python's `pprint`: a sequence whose representation fits the remaining width is printed on
//! one line, otherwise one item per line with the first item on the line of the opening bracket.
//! Sequences nested deeper than the maximum depth print as `[...]`.

use ezfio::Nested;

/// Pretty printer options.
#[derive(Clone, Copy, Debug)]
pub struct PrettyPrinter {
    width: usize,
    indent: usize,
    depth: usize,
}

impl Default for PrettyPrinter {
    fn default() -> Self {
        Self {
            width: 60,
            indent: 4,
            depth: 3,
        }
    }
}

impl PrettyPrinter {
    /// Format `value`.
    #[must_use]
    pub fn format(&self, value: &Nested) -> String {
        let mut out = String::new();
        self.format_into(value, &mut out, 0, 0, 0);
        out
    }

    fn repr(&self, value: &Nested, level: usize) -> String {
        match value {
            Nested::Scalar(scalar) => scalar.repr(),
            Nested::List(items) if items.is_empty() => "[]".to_string(),
            Nested::List(_) if level >= self.depth => "[...]".to_string(),
            Nested::List(items) => {
                let items: Vec<_> = items
                    .iter()
                    .map(|item| self.repr(item, level + 1))
                    .collect();
                format!("[{}]", items.join(", "))
            }
        }
    }

    fn format_into(
        &self,
        value: &Nested,
        out: &mut String,
        column: usize,
        allowance: usize,
        level: usize,
    ) {
        let repr = self.repr(value, level);
        let max_width = self.width.saturating_sub(column + allowance);
        let wrap = repr.len() > max_width && level < self.depth;
        match value {
            Nested::List(items) if wrap && !items.is_empty() => {
                out.push('[');
                out.push_str(&" ".repeat(self.indent.saturating_sub(1)));
                let column = column + self.indent;
                let last = items.len() - 1;
                for (i, item) in items.iter().enumerate() {
                    if i == last {
                        self.format_into(item, out, column, allowance + 1, level + 1);
                    } else {
                        self.format_into(item, out, column, 1, level + 1);
                        out.push_str(",\n");
                        out.push_str(&" ".repeat(column));
                    }
                }
                out.push(']');
            }
            _ => out.push_str(&repr),
        }
    }
}
