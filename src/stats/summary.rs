//! Plain-text rendering of summary tables for the console report.

use super::calculator::DescribeTable;
use crate::data::{YearTotals, YEAR};
use std::fmt;

const INDEX_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.6}", v)
    }
}

impl fmt::Display for DescribeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index_width = INDEX_LABELS.iter().map(|l| l.len()).max().unwrap_or(0);

        let cells: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| c.rows().iter().map(|(_, v)| format_value(*v)).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&cells)
            .map(|(c, values)| {
                values
                    .iter()
                    .map(|v| v.len())
                    .chain(std::iter::once(c.column.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:width$}", "", width = index_width)?;
        for (c, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", c.column, width = width)?;
        }
        writeln!(f)?;

        for (row, label) in INDEX_LABELS.iter().enumerate() {
            write!(f, "{:<width$}", label, width = index_width)?;
            for (values, width) in cells.iter().zip(&widths) {
                write!(f, "  {:>width$}", values[row], width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for YearTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<(String, String)> = self
            .totals
            .iter()
            .map(|(year, total)| (year.to_string(), format_value(*total)))
            .collect();
        let year_width = values
            .iter()
            .map(|(y, _)| y.len())
            .chain(std::iter::once(YEAR.len()))
            .max()
            .unwrap_or(0);
        let value_width = values.iter().map(|(_, v)| v.len()).max().unwrap_or(0);

        writeln!(f, "{}", YEAR)?;
        for (year, total) in &values {
            writeln!(
                f,
                "{:<yw$}    {:>vw$}",
                year,
                total,
                yw = year_width,
                vw = value_width
            )?;
        }
        writeln!(f, "Name: {}, dtype: float64", self.value_column)
    }
}
