//! Plain-text result tables
//!
//! Every cell is right-aligned to its column's widest value, with `+---+`
//! separators around the header and the body:
//!
//! ```text
//! +----------+------+---------+
//! | Resource |   TL | Quality |
//! +----------+------+---------+
//! |      Ore | TL32 |     249 |
//! | Minerals |  TL1 |       1 |
//! +----------+------+---------+
//! ```

use std::fmt::Write;

/// A table with a header row
#[derive(Debug, Clone, Default)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing trailing cells render empty
    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0);

        let mut widths = vec![0; columns];
        for row in std::iter::once(&self.header).chain(&self.rows) {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    /// Render the table, one line per row
    pub fn render(&self) -> String {
        let widths = self.widths();

        let mut separator = String::from("+");
        for width in &widths {
            separator.push_str(&"-".repeat(width + 2));
            separator.push('+');
        }

        let mut out = String::new();
        let _ = writeln!(out, "{}", separator);
        render_row(&mut out, &self.header, &widths);
        let _ = writeln!(out, "{}", separator);
        for row in &self.rows {
            render_row(&mut out, row, &widths);
        }
        let _ = writeln!(out, "{}", separator);
        out
    }
}

fn render_row(out: &mut String, row: &[String], widths: &[usize]) {
    out.push('|');
    for (index, width) in widths.iter().enumerate() {
        let cell = row.get(index).map(String::as_str).unwrap_or("");
        let _ = write!(out, " {:>width$} |", cell, width = width);
    }
    out.push('\n');
}
