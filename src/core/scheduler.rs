use crate::core::aggregator::ResultAggregator;
use crate::domain::model::{Address, AddressList, Progress, ValidationResult, Verdict};
use crate::domain::ports::{Classifier, ProgressSink};
use crate::domain::settings::{ThrottlePolicy, DEFAULT_BATCH_SIZE};
use crate::utils::error::{Result, ValidatorError};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 取消訊號，在每個批次邊界檢查
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    pub batch_size: usize,
    /// 單一批次內同時進行的分類數，1 代表完全循序
    pub concurrency: usize,
    pub throttle: ThrottlePolicy,
}

impl SchedulerOptions {
    pub fn new(batch_size: usize, concurrency: usize, throttle: ThrottlePolicy) -> Self {
        Self {
            batch_size: batch_size.max(1),
            concurrency: concurrency.max(1),
            throttle,
        }
    }
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, 1, ThrottlePolicy::none())
    }
}

/// 以固定大小的批次驅動分類，每批之後讓出執行權並發布進度
#[derive(Debug, Clone, Default)]
pub struct BatchScheduler {
    options: SchedulerOptions,
    cancel: CancelHandle,
}

impl BatchScheduler {
    pub fn new(options: SchedulerOptions) -> Self {
        Self {
            options,
            cancel: CancelHandle::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub async fn run<C, P>(
        &self,
        addresses: &AddressList,
        classifier: &C,
        progress: &P,
    ) -> Result<ValidationResult>
    where
        C: Classifier + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let total = addresses.len();
        if total == 0 {
            return Err(ValidatorError::EmptyInput);
        }

        tracing::info!(
            "🚀 Validating {} addresses in batches of {}",
            total,
            self.options.batch_size
        );

        let mut aggregator = ResultAggregator::new();
        let mut pending = addresses.iter();
        let mut batch_number = 0usize;

        while aggregator.processed() < total {
            self.ensure_active(aggregator.processed(), total)?;

            let batch: Vec<Address> = pending.by_ref().take(self.options.batch_size).collect();
            if batch.is_empty() {
                break;
            }
            batch_number += 1;

            let verdicts = self.classify_batch(&batch, classifier).await;
            for (address, verdict) in batch.into_iter().zip(verdicts) {
                aggregator.record(address, verdict);
            }

            if !self.options.throttle.per_batch.is_zero() {
                tokio::time::sleep(self.options.throttle.per_batch).await;
            }

            // 發布前再檢查一次，避免取消的執行仍送出 100
            self.ensure_active(aggregator.processed(), total)?;

            let current = Progress::from_counts(aggregator.processed(), total);
            tracing::debug!(
                "Batch {} done, {}/{} processed ({})",
                batch_number,
                aggregator.processed(),
                total,
                current
            );
            progress.publish(current);

            tokio::task::yield_now().await;
        }

        let result = aggregator.finish();
        tracing::info!(
            "✅ Validation complete: {} valid, {} invalid",
            result.valid.len(),
            result.invalid.len()
        );
        Ok(result)
    }

    async fn classify_batch<C>(&self, batch: &[Address], classifier: &C) -> Vec<Verdict>
    where
        C: Classifier + ?Sized,
    {
        let per_address = self.options.throttle.per_address;

        let pending: Vec<_> = batch
            .iter()
            .map(|address| async move {
                let verdict = classifier.classify(address).await;
                if !per_address.is_zero() {
                    tokio::time::sleep(per_address).await;
                }
                verdict
            })
            .collect();

        // buffered 保持輸入順序
        stream::iter(pending)
            .buffered(self.options.concurrency)
            .collect()
            .await
    }

    fn ensure_active(&self, processed: usize, total: usize) -> Result<()> {
        if self.cancel.is_cancelled() {
            tracing::warn!("🛑 Validation cancelled at {}/{}", processed, total);
            return Err(ValidatorError::Cancelled { processed, total });
        }
        Ok(())
    }
}
