use crate::core::figure::TrendFigure;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One article-day row of the input CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyViews {
    pub article: String,
    pub date: NaiveDate,
    pub views: u64,
}

/// Calendar month used as the aggregation period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Timestamp of the period: the first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyViews {
    pub month: YearMonth,
    pub views: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZeroViewMonth {
    pub month: YearMonth,
    pub zero_days: u64,
}

/// Descriptive statistics of the daily views column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub count: usize,
    pub articles: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<u64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<u64>,
}

/// Names of the CSV columns to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvColumns {
    pub date: String,
    pub views: String,
    pub article: Option<String>,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            views: "views".to_string(),
            article: Some("article".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    #[default]
    Png,
    Svg,
}

impl ChartFormat {
    pub const NAMES: [&'static str; 2] = ["png", "svg"];

    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Svg => "svg",
        }
    }
}

impl FromStr for ChartFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ChartFormat::Png),
            "svg" => Ok(ChartFormat::Svg),
            other => Err(format!(
                "unsupported chart format '{}', expected one of: {}",
                other,
                Self::NAMES.join(", ")
            )),
        }
    }
}

impl fmt::Display for ChartFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Everything computed by the transform phase, ready to be rendered.
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub summary: DatasetSummary,
    pub monthly: Vec<MonthlyViews>,
    pub zero_view_days: Vec<ZeroViewMonth>,
    pub full_trend: TrendFigure,
    pub excluding_outliers: Option<TrendFigure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_boundaries() {
        let dec = YearMonth::new(2013, 12).unwrap();
        assert_eq!(dec.next(), YearMonth::new(2014, 1).unwrap());
        assert_eq!(dec.first_day(), NaiveDate::from_ymd_opt(2013, 12, 1).unwrap());
        assert!(YearMonth::new(2013, 13).is_none());
        assert_eq!(dec.to_string(), "2013-12");
    }

    #[test]
    fn test_chart_format_parse() {
        assert_eq!("PNG".parse::<ChartFormat>().unwrap(), ChartFormat::Png);
        assert_eq!("svg".parse::<ChartFormat>().unwrap(), ChartFormat::Svg);
        assert!("gif".parse::<ChartFormat>().is_err());
        assert_eq!(ChartFormat::Svg.extension(), "svg");
    }
}
