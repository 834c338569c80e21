//! Dataset profiles for `f1-etl explore`
//!
//! A profile shows the shape, the first rows, summary statistics for numeric
//! columns and the null count of every column.

use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use f1_etl_ingest::transform::coerce::present;
use f1_etl_ingest::transform::{FieldValue, NormalizedDataset, RawDataset};

/// Number of rows shown in the preview
pub const HEAD_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
struct Cell {
    text: String,
    number: Option<f64>,
    null: bool,
}

impl Cell {
    fn from_raw(value: &str) -> Self {
        match present(value) {
            None => Cell {
                text: value.to_string(),
                number: None,
                null: true,
            },
            Some(v) => Cell {
                text: v.to_string(),
                number: v.parse::<f64>().ok().filter(|n| n.is_finite()),
                null: false,
            },
        }
    }

    fn from_field(value: &FieldValue) -> Self {
        Cell {
            text: value.to_string(),
            number: match value {
                FieldValue::Int(n) => Some(f64::from(*n)),
                _ => None,
            },
            null: value.is_null(),
        }
    }
}

/// Summary statistics of one numeric column
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub title: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub head: Vec<Vec<String>>,
    pub numeric: Vec<NumericSummary>,
    /// `(column, null count)` in column order
    pub nulls: Vec<(String, usize)>,
}

impl Profile {
    pub fn of_raw(raw: &RawDataset) -> Self {
        let cells = raw
            .rows
            .iter()
            .map(|row| row.iter().map(|v| Cell::from_raw(v)).collect());
        Self::build(format!("{} (raw)", raw.dataset), raw.headers.clone(), cells)
    }

    pub fn of_normalized(normalized: &NormalizedDataset) -> Self {
        let dataset = normalized.dataset();
        let columns = dataset.columns().iter().map(|c| c.to_string()).collect();
        let cells = normalized
            .field_rows()
            .into_iter()
            .map(|row| row.iter().map(Cell::from_field).collect());
        Self::build(format!("{} (transformed)", dataset), columns, cells)
    }

    fn build(title: String, columns: Vec<String>, rows: impl Iterator<Item = Vec<Cell>>) -> Self {
        let width = columns.len();
        let mut head = Vec::new();
        let mut nulls = vec![0usize; width];
        let mut values: Vec<Vec<f64>> = vec![Vec::new(); width];
        let mut textual = vec![false; width];
        let mut count = 0;

        for row in rows {
            if head.len() < HEAD_ROWS {
                head.push(row.iter().map(|c| c.text.clone()).collect());
            }
            for (i, cell) in row.into_iter().enumerate().take(width) {
                if cell.null {
                    nulls[i] += 1;
                } else if let Some(n) = cell.number {
                    values[i].push(n);
                } else {
                    textual[i] = true;
                }
            }
            count += 1;
        }

        let numeric = columns
            .iter()
            .zip(values.iter().zip(textual))
            .filter(|(_, (v, textual))| !textual && !v.is_empty())
            .map(|(column, (v, _))| summarize(column, v))
            .collect();

        Profile {
            title,
            rows: count,
            nulls: columns.iter().cloned().zip(nulls).collect(),
            columns,
            head,
            numeric,
        }
    }

    pub fn render(&self) {
        println!();
        println!("{}", "═".repeat(60).blue());
        println!("{}", format!("  {}", self.title).bold());
        println!("{}", "═".repeat(60).blue());
        println!("Shape: {} rows x {} columns", self.rows, self.columns.len());

        println!();
        println!("{}", format!("First {} rows", self.head.len().min(HEAD_ROWS)).bold());
        println!("{}", self.head_table());

        println!();
        println!("{}", "Numeric columns".bold());
        if self.numeric.is_empty() {
            println!("  (none)");
        } else {
            println!("{}", self.describe_table());
        }

        println!();
        println!("{}", "Null values per column".bold());
        println!("{}", self.nulls_table());
    }

    fn head_table(&self) -> Table {
        let mut table = styled_table();
        table.set_header(self.columns.clone());
        for row in &self.head {
            table.add_row(row.clone());
        }
        table
    }

    fn describe_table(&self) -> Table {
        let mut table = styled_table();
        table.set_header(vec!["Column", "Count", "Mean", "Std", "Min", "Max"]);
        for s in &self.numeric {
            table.add_row(vec![
                s.column.clone(),
                s.count.to_string(),
                format!("{:.3}", s.mean),
                s.std.map(|v| format!("{:.3}", v)).unwrap_or_else(|| "-".to_string()),
                format!("{}", s.min),
                format!("{}", s.max),
            ]);
        }
        table
    }

    fn nulls_table(&self) -> Table {
        let mut table = styled_table();
        table.set_header(vec!["Column", "Nulls"]);
        for (column, nulls) in &self.nulls {
            table.add_row(vec![column.clone(), nulls.to_string()]);
        }
        table
    }
}

fn styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS);
    table
}

fn summarize(column: &str, values: &[f64]) -> NumericSummary {
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = (count > 1).then(|| {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    });
    NumericSummary {
        column: column.to_string(),
        count,
        mean,
        std,
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}
