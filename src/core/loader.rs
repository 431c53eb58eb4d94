use crate::core::{CsvColumns, DailyViews};
use crate::utils::error::{Result, TrendError};
use chrono::{NaiveDate, NaiveDateTime};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse the daily page-view CSV.
///
/// A header row is required. Columns are looked up by name, so extra columns
/// (such as the unnamed index column written by pandas) are ignored.
pub fn parse_daily_views(data: &[u8], columns: &CsvColumns) -> Result<Vec<DailyViews>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let find = |name: &str| headers.iter().position(|h| h == name);

    let date_idx = find(columns.date.as_str()).ok_or_else(|| TrendError::ParseError {
        line: 1,
        message: format!("missing date column '{}'", columns.date),
    })?;
    let views_idx = find(columns.views.as_str()).ok_or_else(|| TrendError::ParseError {
        line: 1,
        message: format!("missing views column '{}'", columns.views),
    })?;
    // 文章欄位可有可無
    let article_idx = columns.article.as_deref().and_then(find);
    if article_idx.is_none() {
        tracing::debug!("No article column found, rows will share an empty identifier");
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| TrendError::ParseError {
            line,
            message: format!("unparseable date '{}'", raw_date),
        })?;

        let raw_views = record.get(views_idx).unwrap_or_default();
        let views = parse_views(raw_views).ok_or_else(|| TrendError::ParseError {
            line,
            message: format!("views must be a non-negative integer, got '{}'", raw_views),
        })?;

        let article = article_idx
            .and_then(|idx| record.get(idx))
            .unwrap_or_default()
            .to_string();

        rows.push(DailyViews {
            article,
            date,
            views,
        });
    }

    tracing::debug!("Parsed {} daily rows", rows.len());
    Ok(rows)
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn parse_views(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(views) = raw.parse::<u64>() {
        return Some(views);
    }
    // pandas 在有缺值時會把整數欄位寫成浮點數 (例如 "12.0")
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}
