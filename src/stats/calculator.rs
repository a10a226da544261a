//! Statistics Calculator Module
//! Handles descriptive statistics and the correlation matrix.

use crate::data::{DataProcessor, ProcessorError};
use polars::prelude::*;
use rayon::prelude::*;
use statrs::statistics::Statistics;

/// Descriptive statistics for a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Default for ColumnStats {
    fn default() -> Self {
        Self {
            column: String::new(),
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        }
    }
}

impl ColumnStats {
    /// Row labels in display order, paired with their values.
    pub fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.median),
            ("75%", self.q75),
            ("max", self.max),
        ]
    }
}

/// Descriptive statistics for a set of columns, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct DescribeTable {
    pub columns: Vec<ColumnStats>,
}

impl DescribeTable {
    pub fn column(&self, name: &str) -> Option<&ColumnStats> {
        self.columns.iter().find(|c| c.column == name)
    }
}

/// Pairwise Pearson correlation between numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(f64::NAN)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> ColumnStats {
        let n = values.len();
        if n == 0 {
            return ColumnStats {
                count: 0,
                ..ColumnStats::default()
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        // statrs returns NaN for the sample deviation of a single value
        let mean = values.iter().mean();
        let std = values.iter().std_dev();

        ColumnStats {
            column: String::new(),
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Describe each named column over its non-null values.
    pub fn describe(df: &DataFrame, columns: &[&str]) -> Result<DescribeTable, ProcessorError> {
        let columns = columns
            .par_iter()
            .map(|name| {
                let values = DataProcessor::f64_values(df, name)?;
                let mut stats = Self::compute_descriptive_stats(&values);
                stats.column = name.to_string();
                Ok(stats)
            })
            .collect::<Result<Vec<_>, ProcessorError>>()?;

        Ok(DescribeTable { columns })
    }

    /// Pearson correlation of two equally long samples.
    ///
    /// NaN when either side has no variance or fewer than two values.
    pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
        if xs.len() != ys.len() || xs.len() < 2 {
            return f64::NAN;
        }

        let sx = xs.iter().std_dev();
        let sy = ys.iter().std_dev();
        if sx == 0.0 || sy == 0.0 || sx.is_nan() || sy.is_nan() {
            return f64::NAN;
        }

        let r = xs.iter().covariance(ys.iter()) / (sx * sy);
        r.clamp(-1.0, 1.0)
    }

    /// Correlation matrix over the named columns.
    ///
    /// Columns are read as full-length f64 vectors, so the frame must not hold
    /// nulls in them (the cleaned record set satisfies this).
    pub fn correlation_matrix(
        df: &DataFrame,
        columns: &[&str],
    ) -> Result<CorrelationMatrix, ProcessorError> {
        let data = columns
            .iter()
            .map(|name| DataProcessor::f64_values(df, name))
            .collect::<Result<Vec<_>, _>>()?;

        let n = columns.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            let variance = data[i].iter().variance();
            values[i][i] = if variance > 0.0 { 1.0 } else { f64::NAN };
            for j in (i + 1)..n {
                let r = Self::pearson(&data[i], &data[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Ok(CorrelationMatrix {
            labels: columns.iter().map(|c| c.to_string()).collect(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{test_frame, NUMERIC_COLUMNS, ROBOTS_ADOPTED, YEAR};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_descriptive_stats_match_describe() {
        let stats = StatsCalculator::compute_descriptive_stats(&[4.0, 1.0, 3.0, 2.0]);

        assert_eq!(stats.count, 4);
        assert!(approx(stats.mean, 2.5));
        assert!(approx(stats.std, (5.0f64 / 3.0).sqrt()));
        assert_eq!(stats.min, 1.0);
        assert!(approx(stats.q25, 1.75));
        assert!(approx(stats.median, 2.5));
        assert!(approx(stats.q75, 3.25));
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn test_single_value_has_undefined_std() {
        let stats = StatsCalculator::compute_descriptive_stats(&[7.0]);
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 7.0);
        assert!(stats.std.is_nan());
        assert_eq!(stats.q25, 7.0);
    }

    #[test]
    fn test_empty_column() {
        let stats = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
        assert!(stats.max.is_nan());
    }

    #[test]
    fn test_describe_counts_non_null_per_column() {
        let df = test_frame(&[
            (2019, "Automotive", [Some(100.0), Some(5.0), Some(2.0), Some(10.0), Some(40.0)]),
            (2019, "Automotive", [None, Some(4.0), Some(1.0), Some(5.0), Some(30.0)]),
            (2020, "Automotive", [Some(150.0), Some(6.0), Some(3.0), Some(12.0), Some(50.0)]),
        ]);

        let table = StatsCalculator::describe(&df, &NUMERIC_COLUMNS).unwrap();

        let names: Vec<&str> = table.columns.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(names, NUMERIC_COLUMNS.to_vec());
        assert_eq!(table.column(YEAR).unwrap().count, 3);
        let robots = table.column(ROBOTS_ADOPTED).unwrap();
        assert_eq!(robots.count, 2);
        assert!(approx(robots.mean, 125.0));
    }

    #[test]
    fn test_pearson() {
        assert!(approx(StatsCalculator::pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]), 1.0));
        assert!(approx(StatsCalculator::pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), -1.0));
        assert!(StatsCalculator::pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).is_nan());
        assert!(StatsCalculator::pearson(&[1.0], &[2.0]).is_nan());
    }

    #[test]
    fn test_correlation_matrix_symmetric_unit_diagonal() {
        let df = test_frame(&[
            (2019, "Automotive", [Some(100.0), Some(5.0), Some(2.0), Some(10.0), Some(40.0)]),
            (2020, "Healthcare", [Some(80.0), Some(7.0), Some(2.5), Some(3.0), Some(45.0)]),
            (2021, "Automotive", [Some(150.0), Some(6.0), Some(3.0), Some(12.0), Some(50.0)]),
            (2022, "Logistics", [Some(120.0), Some(9.0), Some(4.5), Some(8.0), Some(20.0)]),
        ]);

        let matrix = StatsCalculator::correlation_matrix(&df, &NUMERIC_COLUMNS).unwrap();

        assert_eq!(matrix.len(), 6);
        for i in 0..matrix.len() {
            assert_eq!(matrix.get(i, i), 1.0);
            for j in 0..matrix.len() {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
                assert!(matrix.get(i, j).abs() <= 1.0);
            }
        }
    }

    #[test]
    fn test_correlation_with_constant_column() {
        let df = test_frame(&[
            (2019, "Automotive", [Some(100.0), Some(5.0), Some(2.0), Some(10.0), Some(40.0)]),
            (2019, "Automotive", [Some(120.0), Some(6.0), Some(2.0), Some(11.0), Some(40.0)]),
        ]);

        let matrix = StatsCalculator::correlation_matrix(&df, &NUMERIC_COLUMNS).unwrap();

        // Year is constant here
        assert!(matrix.get(0, 0).is_nan());
        assert!(matrix.get(0, 1).is_nan());
        assert!(approx(matrix.get(1, 2), 1.0));
    }
}
