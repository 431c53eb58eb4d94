use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives a [`Pipeline`] through extract, transform and load.
pub struct TrendEngine<P: Pipeline> {
    pipeline: P,
    monitor_enabled: bool,
}

impl<P: Pipeline> TrendEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor_enabled,
        }
    }

    pub async fn run(&self) -> Result<String> {
        let mut monitor = SystemMonitor::new(self.monitor_enabled);
        if self.monitor_enabled && !monitor.is_enabled() {
            tracing::warn!("⚠️ System monitoring requested but not available in this build");
        }
        tracing::info!("🚀 Starting page-view trend analysis");

        // Extract
        tracing::info!("📥 Extracting daily page views...");
        let rows = self.pipeline.extract().await?;
        tracing::info!("Extracted {} article-days", rows.len());
        monitor.log_stats("Extract");

        // Transform
        tracing::info!("🔄 Aggregating monthly totals...");
        let report = self.pipeline.transform(rows).await?;
        tracing::info!(
            "Aggregated {} months ({} with zero-view days)",
            report.monthly.len(),
            report.zero_view_days.iter().filter(|z| z.zero_days > 0).count()
        );
        monitor.log_stats("Transform");

        // Load
        tracing::info!("📈 Rendering charts...");
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Charts saved to: {}", output_path);
        monitor.log_stats("Load");

        monitor.log_final_stats();
        Ok(output_path)
    }
}
