pub mod aggregate;
pub mod etl;
pub mod figure;
pub mod loader;
pub mod pipeline;
pub mod regression;

pub use crate::domain::model::{
    ChartFormat, CsvColumns, DailyViews, DatasetSummary, MonthlyViews, TrendReport, YearMonth,
    ZeroViewMonth,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
