#[cfg(feature = "cli")]
pub mod cli;
pub mod storage;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use chrono::NaiveDate;

/// Day the PRISM programme was disclosed.
pub const DEFAULT_SPLIT_DATE: &str = "2013-06-06";
pub const DEFAULT_SPLIT_LABEL: &str = "Prism Disclosure, 6/6/2013";
/// Months after this day are treated as outliers in the second trend plot.
pub const DEFAULT_EXCLUDE_AFTER: &str = "2014-06-30";
pub const DEFAULT_TITLE: &str = "Pre and Post June 2013 Article View Trends";
pub const OUTLIERS_EXCLUDED_SUFFIX: &str = ", Outliers Excluded";
pub const INPUT_EXTENSIONS: [&str; 1] = ["csv"];

pub fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    crate::core::loader::parse_date(value)
        .ok_or_else(|| format!("invalid date '{}', expected YYYY-MM-DD", value))
}
