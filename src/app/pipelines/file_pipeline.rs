use crate::core::extractor::{decode_input, extract_addresses};
use crate::core::report::{format_report, REPORT_FILE_NAME};
use crate::core::scheduler::{BatchScheduler, CancelHandle, SchedulerOptions};
use crate::core::strategy::ValidationStrategy;
use crate::core::{
    AddressList, Classifier, ConfigProvider, Pipeline, ProgressSink, Storage, ValidationResult,
};
use crate::utils::error::Result;
use std::sync::Arc;

/// 讀取上傳的文字檔、分批驗證，並輸出 `validation-results.txt`
pub struct FilePipeline<S: Storage, C: ConfigProvider, K: Classifier = ValidationStrategy> {
    source: S,
    sink: S,
    config: C,
    classifier: K,
    scheduler: BatchScheduler,
    progress: Arc<dyn ProgressSink>,
}

impl<S: Storage, C: ConfigProvider> FilePipeline<S, C, ValidationStrategy> {
    /// 策略在此建立一次；遠端策略缺少憑證時直接失敗
    pub fn new(source: S, sink: S, config: C) -> Result<Self> {
        let strategy = ValidationStrategy::from_settings(&config.strategy())?;
        Ok(Self::with_classifier(source, sink, config, strategy))
    }
}

impl<S: Storage, C: ConfigProvider, K: Classifier> FilePipeline<S, C, K> {
    pub fn with_classifier(source: S, sink: S, config: C, classifier: K) -> Self {
        let options = SchedulerOptions::new(
            config.batch_size(),
            config.concurrent_requests(),
            config.throttle(),
        );

        Self {
            source,
            sink,
            config,
            classifier,
            scheduler: BatchScheduler::new(options),
            progress: Arc::new(()),
        }
    }

    pub fn with_progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Arc::new(progress);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.scheduler = self.scheduler.with_cancel(cancel);
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.scheduler.cancel_handle()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, K: Classifier> Pipeline for FilePipeline<S, C, K> {
    async fn extract(&self) -> Result<AddressList> {
        let input_file = self.config.input_file();
        tracing::debug!("Reading input file: {}", input_file);

        let bytes = self.source.read_file(input_file).await?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), input_file);

        extract_addresses(decode_input(&bytes))
    }

    async fn transform(&self, addresses: AddressList) -> Result<ValidationResult> {
        self.scheduler
            .run(&addresses, &self.classifier, self.progress.as_ref())
            .await
    }

    async fn load(&self, result: ValidationResult) -> Result<String> {
        let report = format_report(&result);
        let output_path = format!("{}/{}", self.config.output_path(), REPORT_FILE_NAME);

        tracing::debug!("Writing report ({} bytes) to storage", report.len());
        self.sink
            .write_file(REPORT_FILE_NAME, report.as_bytes())
            .await?;

        tracing::info!("💾 Results saved: {}", output_path);
        Ok(output_path)
    }

    fn transport_failures(&self) -> usize {
        self.classifier.transport_failures()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::progress::{progress_channel, LogProgress};
    use crate::core::Progress;
    use crate::domain::settings::{StrategyKind, StrategySettings, ThrottlePolicy};
    use crate::utils::error::ValidatorError;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, data: &str) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.as_bytes().to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|bytes| String::from_utf8_lossy(bytes).to_string())
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ValidatorError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        strategy: StrategySettings,
        batch_size: usize,
    }

    impl MockConfig {
        fn new(kind: StrategyKind) -> Self {
            Self {
                strategy: StrategySettings::new(kind),
                batch_size: 10,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_file(&self) -> &str {
            "emails.txt"
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn batch_size(&self) -> usize {
            self.batch_size
        }

        fn concurrent_requests(&self) -> usize {
            1
        }

        fn throttle(&self) -> ThrottlePolicy {
            ThrottlePolicy::none()
        }

        fn strategy(&self) -> StrategySettings {
            self.strategy.clone()
        }
    }

    #[tokio::test]
    async fn test_extract_reads_input_file() {
        let storage = MockStorage::new();
        storage.put("emails.txt", "a@b.com\n\n  \nbad\n").await;
        let pipeline =
            FilePipeline::new(storage.clone(), storage, MockConfig::new(StrategyKind::Basic))
                .unwrap();

        let addresses = pipeline.extract().await.unwrap();
        let collected: Vec<String> = addresses.iter().map(|a| a.into_inner()).collect();
        assert_eq!(collected, vec!["a@b.com", "bad"]);
    }

    #[tokio::test]
    async fn test_extract_empty_file_fails() {
        let storage = MockStorage::new();
        storage.put("emails.txt", "").await;
        let pipeline =
            FilePipeline::new(storage.clone(), storage, MockConfig::new(StrategyKind::Basic))
                .unwrap();

        assert!(matches!(
            pipeline.extract().await,
            Err(ValidatorError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_extract_missing_file_fails() {
        let storage = MockStorage::new();
        let pipeline =
            FilePipeline::new(storage.clone(), storage, MockConfig::new(StrategyKind::Basic))
                .unwrap();

        assert!(matches!(
            pipeline.extract().await,
            Err(ValidatorError::IoError(_))
        ));
    }

    #[test]
    fn test_remote_without_key_fails_before_processing() {
        let storage = MockStorage::new();
        let result = FilePipeline::new(storage.clone(), storage, MockConfig::new(StrategyKind::Remote));
        assert!(matches!(result, Err(ValidatorError::ConfigError { .. })));
    }

    #[tokio::test]
    async fn test_transform_publishes_progress() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new(StrategyKind::Strict);
        config.batch_size = 2;
        let (tx, mut rx) = progress_channel();
        let pipeline = FilePipeline::new(storage.clone(), storage, config)
            .unwrap()
            .with_progress(tx);

        let addresses = AddressList::from_text(".start@x.com\nok@x.com\nfine@y.org");
        let result = pipeline.transform(addresses).await.unwrap();
        drop(pipeline);

        assert_eq!(result.valid.len(), 2);
        assert_eq!(result.invalid.len(), 1);

        let mut received = Vec::new();
        while let Some(progress) = rx.recv().await {
            received.push(progress);
        }
        assert_eq!(received.last(), Some(&Progress::COMPLETE));
        assert_eq!(received.len(), 2);
    }

    #[tokio::test]
    async fn test_pipeline_runs_as_boxed_trait_object_on_spawned_task() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new(StrategyKind::Basic);
        config.batch_size = 2;
        let pipeline: Box<dyn Pipeline> = Box::new(
            FilePipeline::new(storage.clone(), storage, config)
                .unwrap()
                .with_progress(LogProgress),
        );

        let handle = tokio::spawn(async move {
            pipeline
                .transform(AddressList::from_text("a@b.com\nbad\nc@d.org"))
                .await
        });
        let result = handle.await.unwrap().unwrap();

        assert_eq!(result.valid.len(), 2);
        assert_eq!(result.invalid.len(), 1);
    }

    #[tokio::test]
    async fn test_load_writes_report() {
        let storage = MockStorage::new();
        let pipeline = FilePipeline::new(
            storage.clone(),
            storage.clone(),
            MockConfig::new(StrategyKind::Basic),
        )
        .unwrap();

        let result = ValidationResult {
            valid: vec![crate::core::Address::parse("user@example.com").unwrap()],
            invalid: vec![crate::core::Address::parse("not-an-email").unwrap()],
        };
        let output_path = pipeline.load(result).await.unwrap();

        assert_eq!(output_path, "test_output/validation-results.txt");
        let report = storage.get_file(REPORT_FILE_NAME).await.unwrap();
        assert_eq!(
            report,
            "Valid Emails:\nuser@example.com\n\nInvalid Emails:\nnot-an-email"
        );
    }

    #[tokio::test]
    async fn test_remote_failures_are_counted() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/check");
            then.status(503);
        });

        let mut config = MockConfig::new(StrategyKind::Remote);
        config.strategy.api_endpoint = server.url("/check");
        config.strategy.api_key = Some("key".to_string());

        let storage = MockStorage::new();
        let pipeline = FilePipeline::new(storage.clone(), storage, config).unwrap();

        let result = pipeline
            .transform(AddressList::from_text("a@b.com\nc@d.com"))
            .await
            .unwrap();

        api_mock.assert_hits(2);
        assert_eq!(result.invalid.len(), 2);
        assert_eq!(pipeline.transport_failures(), 2);
    }
}
