use crate::config::{
    parse_date_arg, DEFAULT_EXCLUDE_AFTER, DEFAULT_SPLIT_DATE, DEFAULT_SPLIT_LABEL, DEFAULT_TITLE,
    INPUT_EXTENSIONS,
};
use crate::core::{ChartFormat, ConfigProvider, CsvColumns};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "pageview-trends")]
#[command(about = "Monthly page-view trends before and after a disclosure date")]
pub struct CliConfig {
    /// CSV file with one row per article and day
    #[arg(long, default_value = "./data/terrorism_data.csv")]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "date")]
    pub date_column: String,

    #[arg(long, default_value = "views")]
    pub views_column: String,

    #[arg(long, default_value = "article")]
    pub article_column: String,

    #[arg(long, default_value = DEFAULT_SPLIT_DATE, value_parser = parse_date_arg)]
    pub split_date: NaiveDate,

    #[arg(long, help = "Fit a single trend over all months")]
    pub no_split: bool,

    #[arg(long, default_value = DEFAULT_SPLIT_LABEL)]
    pub split_label: String,

    #[arg(long, default_value = DEFAULT_EXCLUDE_AFTER, value_parser = parse_date_arg)]
    pub exclude_after: NaiveDate,

    #[arg(long, help = "Skip the plot restricted to months before --exclude-after")]
    pub keep_outliers: bool,

    #[arg(long, default_value = "png")]
    pub format: ChartFormat,

    #[arg(long, default_value = DEFAULT_TITLE)]
    pub title: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage between phases")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn columns(&self) -> CsvColumns {
        CsvColumns {
            date: self.date_column.clone(),
            views: self.views_column.clone(),
            article: Some(self.article_column.clone()).filter(|c| !c.trim().is_empty()),
        }
    }

    fn split_date(&self) -> Option<NaiveDate> {
        (!self.no_split).then_some(self.split_date)
    }

    fn split_label(&self) -> &str {
        &self.split_label
    }

    fn exclude_after(&self) -> Option<NaiveDate> {
        (!self.keep_outliers).then_some(self.exclude_after)
    }

    fn chart_format(&self) -> ChartFormat {
        self.format
    }

    fn title(&self) -> &str {
        &self.title
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_required("input", &self.input)?;
        validation::validate_required("output_path", &self.output_path)?;
        validation::validate_path("input", &self.input)?;
        validation::validate_file_extension("input", &self.input, &INPUT_EXTENSIONS)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_string("date_column", &self.date_column)?;
        validation::validate_non_empty_string("views_column", &self.views_column)?;
        validation::validate_non_empty_string("title", &self.title)?;
        validation::validate_date_order("exclude_after", self.split_date(), self.exclude_after())?;
        Ok(())
    }
}
