use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::progress::RunMonitor;

pub struct CheckEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> CheckEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting commodity check...");

        tracing::info!("Fetching registry list...");
        let entries = self.pipeline.extract().await?;
        tracing::info!("Fetched {} registry entries", entries.len());
        self.monitor.log_stats("Extract");

        tracing::info!("Querying portal...");
        let outcome = self.pipeline.transform(entries).await?;
        tracing::info!("Classified {} cards", outcome.results.len());
        self.monitor.log_stats("Transform");

        tracing::info!("Writing results...");
        let output_path = self.pipeline.load(outcome).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
