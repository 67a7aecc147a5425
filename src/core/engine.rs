use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};

/// 一次執行的摘要
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub output_path: String,
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub transport_failures: usize,
    #[serde(serialize_with = "serialize_millis", rename = "elapsed_ms")]
    pub elapsed: Duration,
    pub started_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

pub struct ValidationEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> ValidationEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let start = Instant::now();
        tracing::info!("Starting email validation run");

        // Extract：空輸入在排程器啟動前就中止
        let addresses = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} addresses", addresses.len());
        self.monitor.log_stats("Extract");

        // Transform
        let result = self.pipeline.transform(addresses).await?;
        self.monitor.log_stats("Classify");

        let total = result.total();
        let valid = result.valid.len();
        let invalid = result.invalid.len();

        // Load
        let output_path = self.pipeline.load(result).await?;
        self.monitor.log_stats("Report");

        let transport_failures = self.pipeline.transport_failures();
        if transport_failures > 0 {
            tracing::warn!(
                "⚠️ {} addresses were marked invalid because the remote check failed",
                transport_failures
            );
        }

        Ok(RunSummary {
            output_path,
            total,
            valid,
            invalid,
            transport_failures,
            elapsed: start.elapsed(),
            started_at,
        })
    }
}
