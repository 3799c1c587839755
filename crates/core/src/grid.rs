//! Bordered text grids for tables and chart data.
//!
//! Cells are centered in fixed-width columns with one space of padding:
//!
//! ```text
//! +---------+---------+
//! | Field 1 | Field 2 |
//! +---------+---------+
//! |    A    |    B    |
//! |    1    |    2    |
//! +---------+---------+
//! ```

/// A row-major table rendered with a header line and ASCII borders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Grid {
    /// Create a grid with explicit column names.
    pub fn with_header(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
        }
    }

    /// Create a grid whose columns are named `Field 1`, `Field 2`, ...
    ///
    /// Every row is treated as data; the first row is not promoted to a header.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let header = (1..=columns).map(|i| format!("Field {}", i)).collect();
        let mut grid = Self::with_header(header);
        for row in rows {
            grid.add_row(row);
        }
        grid
    }

    /// Append a row. Short rows are padded with empty cells.
    pub fn add_row(&mut self, mut row: Vec<String>) {
        if row.len() > self.header.len() {
            let start = self.header.len() + 1;
            self.header
                .extend((start..=row.len()).map(|i| format!("Field {}", i)));
        }
        row.resize(self.header.len(), String::new());
        self.rows.push(row);
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Render the grid. A grid without columns renders as an empty string.
    pub fn render(&self) -> String {
        if self.header.is_empty() {
            return String::new();
        }

        let widths: Vec<usize> = (0..self.header.len())
            .map(|col| {
                std::iter::once(&self.header[col])
                    .chain(self.rows.iter().map(|r| &r[col]))
                    .flat_map(|cell| cell.lines())
                    .map(|line| line.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let rule = border(&widths);
        let mut out = Vec::new();
        out.push(rule.clone());
        out.extend(render_row(&self.header, &widths));
        out.push(rule.clone());
        for row in &self.rows {
            out.extend(render_row(row, &widths));
        }
        out.push(rule);

        out.join("\n")
    }
}

fn border(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for w in widths {
        line.push_str(&"-".repeat(w + 2));
        line.push('+');
    }
    line
}

/// Render one logical row, which spans several lines when a cell has line breaks.
fn render_row(cells: &[String], widths: &[usize]) -> Vec<String> {
    let split: Vec<Vec<&str>> = cells
        .iter()
        .map(|c| {
            let lines: Vec<&str> = c.lines().collect();
            if lines.is_empty() {
                vec![""]
            } else {
                lines
            }
        })
        .collect();
    let height = split.iter().map(Vec::len).max().unwrap_or(1);

    (0..height)
        .map(|i| {
            let mut line = String::from("|");
            for (col, w) in widths.iter().enumerate() {
                let text = split[col].get(i).copied().unwrap_or("");
                line.push(' ');
                line.push_str(&center(text, *w));
                line.push_str(" |");
            }
            line
        })
        .collect()
}

/// Center `text` in `width` columns, biasing the extra space to the right.
fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let total = width - len;
    let left = total / 2;
    let right = total - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_render_two_by_two() {
        let grid = Grid::from_rows(rows(&[&["A", "B"], &["1", "2"]]));
        let expected = "\
+---------+---------+
| Field 1 | Field 2 |
+---------+---------+
|    A    |    B    |
|    1    |    2    |
+---------+---------+";
        assert_eq!(grid.render(), expected);
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let grid = Grid::from_rows(rows(&[&["x"], &["y", "z", "w"]]));
        assert_eq!(grid.column_count(), 3);
        assert_eq!(grid.row_count(), 2);
        let rendered = grid.render();
        assert!(rendered.contains("Field 3"));
        assert!(rendered.lines().all(|l| l.len() == rendered.lines().next().unwrap().len()));
    }

    #[test]
    fn test_wide_cell_sets_column_width() {
        let mut grid = Grid::with_header(vec!["".to_string(), "Sales".to_string()]);
        grid.add_row(vec!["Q1 2024".to_string(), "4.3".to_string()]);
        let rendered = grid.render();
        assert!(rendered.starts_with("+---------+-------+"));
        assert!(rendered.contains("| Q1 2024 |  4.3  |"));
    }

    #[test]
    fn test_multiline_cell_spans_lines() {
        let grid = Grid::from_rows(rows(&[&["one\ntwo", "x"]]));
        let rendered = grid.render();
        assert!(rendered.contains("|   one   |    x    |"));
        assert!(rendered.contains("|   two   |         |"));
    }

    #[test]
    fn test_empty_grid() {
        assert_eq!(Grid::from_rows(Vec::new()).render(), "");
    }
}
