use crate::domain::model::{ChartFormat, CsvColumns, DailyViews, TrendReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn columns(&self) -> CsvColumns;
    fn split_date(&self) -> Option<NaiveDate>;
    fn split_label(&self) -> &str;
    fn exclude_after(&self) -> Option<NaiveDate>;
    fn chart_format(&self) -> ChartFormat;
    fn title(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<DailyViews>>;
    async fn transform(&self, data: Vec<DailyViews>) -> Result<TrendReport>;
    async fn load(&self, report: TrendReport) -> Result<String>;
}
