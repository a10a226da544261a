//! Data Processor Module
//! Handles row cleaning and the aggregations the report is built from.

use super::{INDUSTRY, METRIC_COLUMNS, ROBOTS_ADOPTED, YEAR};
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// A value column summed per year, ascending by year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearTotals {
    pub value_column: String,
    pub totals: Vec<(i64, f64)>,
}

impl YearTotals {
    pub fn get(&self, year: i64) -> Option<f64> {
        self.totals
            .iter()
            .find(|(y, _)| *y == year)
            .map(|(_, total)| *total)
    }

    /// Sum across all years.
    pub fn grand_total(&self) -> f64 {
        self.totals.iter().map(|(_, total)| total).sum()
    }
}

/// Year x Industry matrix of summed values.
///
/// Rows are years ascending, columns are industries sorted by name. A cell is
/// `None` when no record exists for that combination.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub value_column: String,
    pub years: Vec<i64>,
    pub industries: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    /// Sum of one year's row, absent cells counting as zero.
    pub fn row_sum(&self, row: usize) -> f64 {
        self.cells
            .get(row)
            .map(|cells| cells.iter().flatten().sum::<f64>())
            .unwrap_or(0.0)
    }

    /// One industry's column, absent cells as zero.
    pub fn column_values(&self, index: usize) -> Vec<f64> {
        self.cells
            .iter()
            .map(|row| row.get(index).copied().flatten().unwrap_or(0.0))
            .collect()
    }
}

/// Handles data cleaning and aggregation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Drop every record with a null in any metric column (row-wise).
    pub fn drop_incomplete_rows(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        let complete = METRIC_COLUMNS
            .iter()
            .map(|name| col(*name).is_not_null())
            .reduce(|acc, expr| acc.and(expr))
            .unwrap_or_else(|| lit(true));

        let cleaned = df.clone().lazy().filter(complete).collect()?;
        Ok(cleaned)
    }

    /// Distinct industries in first-occurrence order.
    pub fn industries(df: &DataFrame) -> Result<Vec<String>, ProcessorError> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for industry in Self::string_values(df, INDUSTRY)? {
            if seen.insert(industry.clone()) {
                ordered.push(industry);
            }
        }
        Ok(ordered)
    }

    /// Filter DataFrame for a single industry.
    pub fn filter_by_industry(
        df: &DataFrame,
        industry: &str,
    ) -> Result<DataFrame, ProcessorError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(col(INDUSTRY).eq(lit(industry)))
            .collect()?;
        Ok(filtered)
    }

    /// Sum `value_col` per year.
    pub fn sum_by_year(df: &DataFrame, value_col: &str) -> Result<YearTotals, ProcessorError> {
        let mut totals: BTreeMap<i64, f64> = BTreeMap::new();
        for (year, _, value) in Self::keyed_values(df, value_col)? {
            *totals.entry(year).or_insert(0.0) += value;
        }

        Ok(YearTotals {
            value_column: value_col.to_string(),
            totals: totals.into_iter().collect(),
        })
    }

    /// Total robots adopted per year.
    pub fn robots_by_year(df: &DataFrame) -> Result<YearTotals, ProcessorError> {
        Self::sum_by_year(df, ROBOTS_ADOPTED)
    }

    /// Pivot `value_col` into a Year x Industry table of sums.
    pub fn pivot_sum(df: &DataFrame, value_col: &str) -> Result<PivotTable, ProcessorError> {
        let mut sums: HashMap<(i64, String), f64> = HashMap::new();
        let mut years = BTreeSet::new();
        let mut industries = BTreeSet::new();

        for (year, industry, value) in Self::keyed_values(df, value_col)? {
            years.insert(year);
            industries.insert(industry.clone());
            *sums.entry((year, industry)).or_insert(0.0) += value;
        }

        let years: Vec<i64> = years.into_iter().collect();
        let industries: Vec<String> = industries.into_iter().collect();
        let cells = years
            .iter()
            .map(|year| {
                industries
                    .iter()
                    .map(|industry| sums.get(&(*year, industry.clone())).copied())
                    .collect()
            })
            .collect();

        Ok(PivotTable {
            value_column: value_col.to_string(),
            years,
            industries,
            cells,
        })
    }

    /// Mean of `value_col` per year for each industry.
    ///
    /// Industries keep first-occurrence order; each series is sorted by year.
    /// Repeated (industry, year) records collapse to their mean.
    pub fn mean_by_year_per_industry(
        df: &DataFrame,
        value_col: &str,
    ) -> Result<Vec<(String, Vec<(i64, f64)>)>, ProcessorError> {
        let order = Self::industries(df)?;
        let mut acc: HashMap<String, BTreeMap<i64, (f64, usize)>> = HashMap::new();

        for (year, industry, value) in Self::keyed_values(df, value_col)? {
            let slot = acc.entry(industry).or_default().entry(year).or_insert((0.0, 0));
            slot.0 += value;
            slot.1 += 1;
        }

        Ok(order
            .into_iter()
            .filter_map(|industry| {
                let by_year = acc.remove(&industry)?;
                let points = by_year
                    .into_iter()
                    .map(|(year, (sum, n))| (year, sum / n as f64))
                    .collect();
                Some((industry, points))
            })
            .collect())
    }

    /// Non-null values of a column as f64.
    pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<f64>, ProcessorError> {
        let column = df.column(name)?.cast(&DataType::Float64)?;
        let values = column.f64()?.into_iter().flatten().collect();
        Ok(values)
    }

    fn string_values(df: &DataFrame, name: &str) -> Result<Vec<String>, ProcessorError> {
        let column = df.column(name)?.cast(&DataType::String)?;
        let values = column
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect();
        Ok(values)
    }

    /// (year, industry, value) triples, skipping rows where the value is null.
    fn keyed_values(
        df: &DataFrame,
        value_col: &str,
    ) -> Result<Vec<(i64, String, f64)>, ProcessorError> {
        let years = df.column(YEAR)?.cast(&DataType::Int64)?;
        let values = df.column(value_col)?.cast(&DataType::Float64)?;
        let industries = Self::string_values(df, INDUSTRY)?;

        let triples = years
            .i64()?
            .into_iter()
            .zip(industries)
            .zip(values.f64()?.into_iter())
            .filter_map(|((year, industry), value)| Some((year?, industry, value?)))
            .collect();
        Ok(triples)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::{COST_SAVINGS, PRODUCTIVITY_GAIN};

    /// Build a typed frame the way the loader would produce it.
    pub(crate) fn frame(rows: &[(i64, &str, [Option<f64>; 5])]) -> DataFrame {
        let mut columns = vec![
            Column::new(
                YEAR.into(),
                rows.iter().map(|r| r.0).collect::<Vec<i64>>(),
            ),
            Column::new(
                INDUSTRY.into(),
                rows.iter().map(|r| r.1.to_string()).collect::<Vec<String>>(),
            ),
        ];
        for (i, name) in METRIC_COLUMNS.iter().enumerate() {
            columns.push(Column::new(
                (*name).into(),
                rows.iter().map(|r| r.2[i]).collect::<Vec<Option<f64>>>(),
            ));
        }
        DataFrame::new(columns).unwrap()
    }

    fn full(values: [f64; 5]) -> [Option<f64>; 5] {
        values.map(Some)
    }

    fn sample() -> DataFrame {
        frame(&[
            (2020, "Healthcare", full([40.0, 3.0, 1.0, 2.0, 20.0])),
            (2019, "Automotive", full([100.0, 5.0, 2.0, 10.0, 40.0])),
            (2019, "Healthcare", full([30.0, 2.0, 0.5, 1.0, 10.0])),
            (2020, "Automotive", full([150.0, 6.0, 3.0, 12.0, 50.0])),
            (2020, "Automotive", full([50.0, 8.0, 1.0, 4.0, 30.0])),
            (2021, "Logistics", full([70.0, 4.0, 2.5, 6.0, 25.0])),
        ])
    }

    #[test]
    fn test_drop_incomplete_rows_is_row_wise() {
        let df = frame(&[
            (2019, "Automotive", full([100.0, 5.0, 2.0, 10.0, 40.0])),
            (2019, "Automotive", [None, Some(4.0), Some(1.0), Some(5.0), Some(30.0)]),
            (2020, "Automotive", [Some(1.0), Some(4.0), Some(1.0), Some(5.0), None]),
            (2020, "Automotive", full([150.0, 6.0, 3.0, 12.0, 50.0])),
        ]);

        let cleaned = DataProcessor::drop_incomplete_rows(&df).unwrap();

        assert!(cleaned.height() <= df.height());
        assert_eq!(cleaned.height(), 2);
        for name in METRIC_COLUMNS {
            assert_eq!(cleaned.column(name).unwrap().null_count(), 0);
        }
    }

    #[test]
    fn test_drop_incomplete_rows_keeps_complete_frame() {
        let df = sample();
        let cleaned = DataProcessor::drop_incomplete_rows(&df).unwrap();
        assert_eq!(cleaned.height(), df.height());
    }

    #[test]
    fn test_industries_first_occurrence_order() {
        let industries = DataProcessor::industries(&sample()).unwrap();
        assert_eq!(industries, vec!["Healthcare", "Automotive", "Logistics"]);
    }

    #[test]
    fn test_robots_by_year_matches_restricted_sums() {
        let df = sample();
        let totals = DataProcessor::robots_by_year(&df).unwrap();

        assert_eq!(
            totals.totals,
            vec![(2019, 130.0), (2020, 240.0), (2021, 70.0)]
        );
        let all: f64 = DataProcessor::f64_values(&df, ROBOTS_ADOPTED)
            .unwrap()
            .iter()
            .sum();
        assert_eq!(totals.grand_total(), all);
        assert_eq!(totals.get(2020), Some(240.0));
        assert_eq!(totals.get(2030), None);
    }

    #[test]
    fn test_pivot_row_sums_equal_year_totals() {
        let df = sample();
        let pivot = DataProcessor::pivot_sum(&df, ROBOTS_ADOPTED).unwrap();
        let totals = DataProcessor::robots_by_year(&df).unwrap();

        assert_eq!(pivot.years, vec![2019, 2020, 2021]);
        assert_eq!(pivot.industries, vec!["Automotive", "Healthcare", "Logistics"]);
        assert_eq!(pivot.cells[1][0], Some(200.0));
        assert_eq!(pivot.cells[0][2], None);
        for (row, (year, total)) in totals.totals.iter().enumerate() {
            assert_eq!(pivot.years[row], *year);
            assert_eq!(pivot.row_sum(row), *total);
        }
        assert_eq!(pivot.column_values(2), vec![0.0, 0.0, 70.0]);
    }

    #[test]
    fn test_mean_by_year_per_industry() {
        let series =
            DataProcessor::mean_by_year_per_industry(&sample(), PRODUCTIVITY_GAIN).unwrap();

        let names: Vec<&str> = series.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Healthcare", "Automotive", "Logistics"]);
        assert_eq!(series[0].1, vec![(2019, 2.0), (2020, 3.0)]);
        assert_eq!(series[1].1, vec![(2019, 5.0), (2020, 7.0)]);
        assert_eq!(series[2].1, vec![(2021, 4.0)]);
    }

    #[test]
    fn test_filter_by_industry() {
        let subset = DataProcessor::filter_by_industry(&sample(), "Automotive").unwrap();
        assert_eq!(subset.height(), 3);
        let savings = DataProcessor::f64_values(&subset, COST_SAVINGS).unwrap();
        assert_eq!(savings, vec![2.0, 3.0, 1.0]);
    }
}
