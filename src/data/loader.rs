//! CSV Data Loader Module
//! Handles CSV file loading and column type coercion using Polars.

use super::{INDUSTRY, METRIC_COLUMNS, REQUIRED_COLUMNS, YEAR};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Invalid Year {value:?} in data row {row}")]
    InvalidYear { row: usize, value: String },
    #[error("No data loaded")]
    NoData,
}

/// Handles CSV file loading with Polars.
///
/// Every column is read as text first, then coerced: `Year` strictly,
/// `Industry` as-is and the metric columns leniently (unparseable cells
/// become nulls).
pub struct DataLoader {
    df: Option<DataFrame>,
    file_path: Option<PathBuf>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            file_path: None,
        }
    }

    /// Load a CSV file and coerce it into the typed record layout.
    pub fn load_csv(&mut self, file_path: &Path) -> Result<&DataFrame, LoaderError> {
        self.file_path = Some(file_path.to_path_buf());

        // Schema inference off: all columns arrive as strings
        let raw = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;

        let df = Self::coerce(&raw)?;
        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Coerce a raw text frame into `Year: Int64`, `Industry: String` and
    /// five nullable `Float64` metric columns. Extra columns are dropped.
    pub fn coerce(raw: &DataFrame) -> Result<DataFrame, LoaderError> {
        for name in REQUIRED_COLUMNS {
            if raw.column(name).is_err() {
                return Err(LoaderError::MissingColumn(name.to_string()));
            }
        }

        let year_text = Self::text_column(raw, YEAR)?;
        let mut years: Vec<i64> = Vec::with_capacity(raw.height());
        for (i, value) in year_text.into_iter().enumerate() {
            match value.and_then(parse_year) {
                Some(year) => years.push(year),
                None => {
                    return Err(LoaderError::InvalidYear {
                        row: i + 1,
                        value: value.unwrap_or_default().to_string(),
                    })
                }
            }
        }

        // A missing industry reads back as "nan", same as a string cast of a null
        let industries: Vec<String> = Self::text_column(raw, INDUSTRY)?
            .into_iter()
            .map(|v| v.unwrap_or("nan").to_string())
            .collect();

        let mut columns = vec![
            Column::new(YEAR.into(), years),
            Column::new(INDUSTRY.into(), industries),
        ];

        for name in METRIC_COLUMNS {
            let values: Vec<Option<f64>> = Self::text_column(raw, name)?
                .into_iter()
                .map(|v| v.and_then(parse_metric))
                .collect();
            columns.push(Column::new(name.into(), values));
        }

        Ok(DataFrame::new(columns)?)
    }

    fn text_column(raw: &DataFrame, name: &str) -> Result<StringChunked, LoaderError> {
        let column = raw
            .column(name)
            .map_err(|_| LoaderError::MissingColumn(name.to_string()))?;
        let text = column.cast(&DataType::String)?;
        Ok(text.str()?.clone())
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get file path.
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }
}

fn parse_year(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

/// NaN counts as missing; infinities are kept.
fn parse_metric(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PRODUCTIVITY_GAIN, ROBOTS_ADOPTED};
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str =
        "Year,Industry,Robots_Adopted,Productivity_Gain,Cost_Savings,Jobs_Displaced,Training_Hours";

    fn write_csv(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("robotics_data.csv");
        fs::write(&path, format!("{}\n{}", HEADER, body)).unwrap();
        path
    }

    #[test]
    fn test_load_coerces_types() {
        let tmp = tempdir().unwrap();
        let path = write_csv(
            tmp.path(),
            "2019,Automotive,100,5.0,2.0,10,40\n2020,Healthcare,150,6.5,3.0,12,50\n",
        );

        let mut loader = DataLoader::new();
        let df = loader.load_csv(&path).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.column(YEAR).unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column(INDUSTRY).unwrap().dtype(), &DataType::String);
        for name in METRIC_COLUMNS {
            assert_eq!(df.column(name).unwrap().dtype(), &DataType::Float64);
        }
        let gain: Vec<Option<f64>> = df
            .column(PRODUCTIVITY_GAIN)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(gain, vec![Some(5.0), Some(6.5)]);
        assert_eq!(loader.get_row_count(), 2);
        assert_eq!(loader.get_file_path(), Some(&path));
    }

    #[test]
    fn test_unparseable_metric_becomes_null() {
        let tmp = tempdir().unwrap();
        let path = write_csv(
            tmp.path(),
            "2019,Automotive,100,5.0,2.0,10,40\n2019,Automotive,bad,4.0,1.0,5,30\n2020,Automotive,NaN,,3.0,12,50\n",
        );

        let mut loader = DataLoader::new();
        let df = loader.load_csv(&path).unwrap();

        let robots: Vec<Option<f64>> = df
            .column(ROBOTS_ADOPTED)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(robots, vec![Some(100.0), None, None]);
        assert_eq!(df.column(PRODUCTIVITY_GAIN).unwrap().null_count(), 1);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("short.csv");
        fs::write(&path, "Year,Industry,Robots_Adopted\n2019,Automotive,100\n").unwrap();

        let err = DataLoader::new().load_csv(&path).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn(ref c) if c == "Productivity_Gain"));
    }

    #[test]
    fn test_invalid_year_is_fatal() {
        let tmp = tempdir().unwrap();
        let path = write_csv(
            tmp.path(),
            "2019,Automotive,100,5.0,2.0,10,40\nnext year,Automotive,150,6.0,3.0,12,50\n",
        );

        let err = DataLoader::new().load_csv(&path).unwrap_err();
        match err {
            LoaderError::InvalidYear { row, value } => {
                assert_eq!(row, 2);
                assert_eq!(value, "next year");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let tmp = tempdir().unwrap();
        let mut loader = DataLoader::new();
        assert!(loader.load_csv(&tmp.path().join("absent.csv")).is_err());
        assert_eq!(loader.get_row_count(), 0);
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!(parse_metric(" 4.5 "), Some(4.5));
        assert_eq!(parse_metric("1e3"), Some(1000.0));
        assert_eq!(parse_metric("n/a"), None);
        assert_eq!(parse_metric("nan"), None);
        assert_eq!(parse_metric("inf"), Some(f64::INFINITY));
    }
}
