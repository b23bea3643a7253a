#![forbid(unsafe_code)]

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    aligns: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let aligns = vec![Align::Left; headers.len()];
        Self {
            headers,
            aligns,
            rows: Vec::new(),
        }
    }

    /// Right-align a column (counts, ids). Out-of-range indices are ignored.
    #[must_use]
    pub fn align_right(mut self, column: usize) -> Self {
        if let Some(a) = self.aligns.get_mut(column) {
            *a = Align::Right;
        }
        self
    }

    pub fn row(&mut self, cols: impl IntoIterator<Item = impl Into<String>>) {
        self.rows.push(cols.into_iter().map(Into::into).collect());
    }

    pub fn print(&self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        self.write_to(&mut out)
    }

    pub fn print_csv(&self) -> io::Result<()> {
        self.write_csv_to(io::stdout().lock())
    }

    pub fn write_csv_to(&self, out: impl io::Write) -> io::Result<()> {
        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        let mut widths = vec![0usize; self.headers.len()];
        for (i, h) in self.headers.iter().enumerate() {
            widths[i] = widths[i].max(visible_width(h));
        }
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i >= widths.len() {
                    widths.push(0);
                }
                widths[i] = widths[i].max(visible_width(cell));
            }
        }

        writeln!(&mut out, "{}", self.format_row(&self.headers, &widths))?;
        for row in &self.rows {
            writeln!(&mut out, "{}", self.format_row(row, &widths))?;
        }
        Ok(())
    }

    fn format_row(&self, row: &[String], widths: &[usize]) -> String {
        let mut out = String::new();
        let last = row.len().saturating_sub(1);
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            let w = widths
                .get(i)
                .copied()
                .unwrap_or_else(|| visible_width(cell));
            let pad = w.saturating_sub(visible_width(cell));
            let align = self.aligns.get(i).copied().unwrap_or(Align::Left);
            match align {
                Align::Right => {
                    for _ in 0..pad {
                        out.push(' ');
                    }
                    out.push_str(cell);
                }
                Align::Left => {
                    out.push_str(cell);
                    // No trailing padding after the last column.
                    if i < last {
                        for _ in 0..pad {
                            out.push(' ');
                        }
                    }
                }
            }
        }
        out
    }
}

fn visible_width(s: &str) -> usize {
    // Cyrillic letters are single-width; char count is enough here.
    s.chars().count()
}
