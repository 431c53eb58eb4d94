use crate::adapters::chart;
use crate::config::OUTLIERS_EXCLUDED_SUFFIX;
use crate::core::figure::TrendFigure;
use crate::core::{aggregate, loader};
use crate::core::{ConfigProvider, DailyViews, Pipeline, Storage, TrendReport};
use crate::utils::error::{Result, TrendError};
use std::path::Path;

pub const TREND_ALL_FILE: &str = "trend_all";
pub const ZERO_VIEWS_FILE: &str = "zero_views";
pub const TREND_EXCLUDING_OUTLIERS_FILE: &str = "trend_excluding_outliers";
pub const REPORT_FILE: &str = "report.json";

pub struct TrendPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> TrendPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    fn chart_file(&self, stem: &str) -> String {
        self.output_file(&format!("{}.{}", stem, self.config.chart_format().extension()))
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for TrendPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<DailyViews>> {
        let input = self.config.input_path();
        tracing::debug!("Reading page views from: {}", input);

        let data = self.storage.read_file(input).await?;
        let rows = loader::parse_daily_views(&data, &self.config.columns())?;

        if rows.is_empty() {
            return Err(TrendError::ProcessingError {
                message: format!("'{}' contains no data rows", input),
            });
        }

        for row in rows.iter().take(5) {
            tracing::debug!("{} {} {}", row.article, row.date, row.views);
        }

        Ok(rows)
    }

    async fn transform(&self, data: Vec<DailyViews>) -> Result<TrendReport> {
        let summary = aggregate::describe(&data);
        tracing::info!(
            "📋 {} rows, {} articles, {} .. {}",
            summary.count,
            summary.articles,
            summary.first_date.map(|d| d.to_string()).unwrap_or_default(),
            summary.last_date.map(|d| d.to_string()).unwrap_or_default()
        );
        tracing::info!(
            "📋 views mean={:.2} std={:.2} min={} 25%={:.1} 50%={:.1} 75%={:.1} max={}",
            summary.mean.unwrap_or(f64::NAN),
            summary.std.unwrap_or(f64::NAN),
            summary.min.unwrap_or_default(),
            summary.q25.unwrap_or(f64::NAN),
            summary.median.unwrap_or(f64::NAN),
            summary.q75.unwrap_or(f64::NAN),
            summary.max.unwrap_or_default()
        );

        let monthly = aggregate::monthly_totals(&data)?;
        let zero_view_days = aggregate::zero_view_days(&data);

        let split = self
            .config
            .split_date()
            .map(|date| (date, self.config.split_label()));
        let title = self.config.title();

        let full_trend = TrendFigure::build(title, &monthly, split)?;
        log_fits(&full_trend);

        // 排除離群值：只保留截止日所在月份 (含) 之前的資料
        let excluding_outliers = match self.config.exclude_after() {
            Some(cutoff) => {
                let kept = aggregate::truncate_until(&monthly, cutoff);
                if kept.is_empty() {
                    tracing::warn!(
                        "⚠️ No months on or before {}, skipping the plot without outliers",
                        cutoff
                    );
                    None
                } else {
                    let figure = TrendFigure::build(
                        &format!("{}{}", title, OUTLIERS_EXCLUDED_SUFFIX),
                        &kept,
                        split,
                    )?;
                    log_fits(&figure);
                    Some(figure)
                }
            }
            None => None,
        };

        Ok(TrendReport {
            summary,
            monthly,
            zero_view_days,
            full_trend,
            excluding_outliers,
        })
    }

    async fn load(&self, report: TrendReport) -> Result<String> {
        let format = self.config.chart_format();

        let trend = chart::render_trend(&report.full_trend, format)?;
        self.storage
            .write_file(&self.chart_file(TREND_ALL_FILE), &trend)
            .await?;

        let zeros = chart::render_zero_views(&report.zero_view_days, format)?;
        self.storage
            .write_file(&self.chart_file(ZERO_VIEWS_FILE), &zeros)
            .await?;

        if let Some(figure) = &report.excluding_outliers {
            let trend = chart::render_trend(figure, format)?;
            self.storage
                .write_file(&self.chart_file(TREND_EXCLUDING_OUTLIERS_FILE), &trend)
                .await?;
        }

        let json = serde_json::to_vec_pretty(&report)?;
        self.storage
            .write_file(&self.output_file(REPORT_FILE), &json)
            .await?;

        tracing::debug!("All charts written as {}", format);
        Ok(self.config.output_path().to_string())
    }
}

fn log_fits(figure: &TrendFigure) {
    for (i, segment) in figure.segments.iter().enumerate() {
        if let Some(fit) = &segment.fit {
            tracing::info!(
                "📈 {} [segment {}]: {} months, slope {:.2} views/day, R² {:.3}",
                figure.title,
                i + 1,
                fit.n,
                fit.slope,
                fit.r_squared
            );
        }
    }
}
