use crate::domain::model::{Address, AddressList, Progress, ValidationResult, Verdict};
use crate::domain::settings::{StrategySettings, ThrottlePolicy};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_file(&self) -> &str;
    fn output_path(&self) -> &str;
    fn batch_size(&self) -> usize;
    fn concurrent_requests(&self) -> usize;
    fn throttle(&self) -> ThrottlePolicy;
    fn strategy(&self) -> StrategySettings;
}

/// 單一地址的分類能力，三種策略共用
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, address: &Address) -> Verdict;

    /// 被降級為 Invalid 的傳輸失敗次數
    fn transport_failures(&self) -> usize {
        0
    }
}

/// 進度事件的訂閱端
pub trait ProgressSink: Send + Sync {
    fn publish(&self, progress: Progress);
}

impl ProgressSink for () {
    fn publish(&self, _progress: Progress) {}
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<AddressList>;
    async fn transform(&self, addresses: AddressList) -> Result<ValidationResult>;
    async fn load(&self, result: ValidationResult) -> Result<String>;

    fn transport_failures(&self) -> usize {
        0
    }
}
