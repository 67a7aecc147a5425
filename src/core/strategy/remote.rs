use crate::domain::model::{Address, RemoteCheckOutcome, Verdict};
use crate::domain::ports::Classifier;
use crate::domain::settings::StrategySettings;
use crate::utils::error::{Result, ValidatorError};
use crate::utils::validation::{validate_strategy_settings, MISSING_API_KEY};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// 對外呼叫的准入控制：相鄰兩次請求至少間隔 `interval`
#[derive(Debug)]
pub struct AdmissionGate {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl AdmissionGate {
    pub fn per_second(requests_per_second: u32) -> Self {
        let rps = requests_per_second.max(1);
        Self {
            interval: Duration::from_secs(1) / rps,
            next_slot: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn admit(&self) {
        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();
        let slot = match *next_slot {
            Some(slot) if slot > now => {
                tokio::time::sleep_until(slot).await;
                slot
            }
            _ => now,
        };
        *next_slot = Some(slot + self.interval);
    }
}

/// 透過第三方驗證服務查詢可投遞性，每個地址一次 GET
pub struct RemoteDeliverability {
    client: Client,
    endpoint: String,
    api_key: String,
    gate: Option<AdmissionGate>,
    failures: AtomicUsize,
}

impl fmt::Debug for RemoteDeliverability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteDeliverability")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("gate", &self.gate)
            .field("failures", &self.failures)
            .finish()
    }
}

impl RemoteDeliverability {
    /// 沒有憑證時拒絕建立，不會退回本地策略
    pub fn new(settings: &StrategySettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ValidatorError::config(MISSING_API_KEY))?
            .to_string();

        validate_strategy_settings(settings)?;

        let client = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            client,
            endpoint: settings.api_endpoint.clone(),
            api_key,
            gate: settings.requests_per_second.map(AdmissionGate::per_second),
            failures: AtomicUsize::new(0),
        })
    }

    async fn lookup(&self, address: &Address) -> Result<RemoteCheckOutcome> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("api_key", self.api_key.as_str()), ("email", address.as_str())])
            .send()
            .await
            .map_err(redact)?;

        let status = response.status();
        tracing::debug!("Remote check for {} returned {}", address, status);

        if !status.is_success() {
            return Err(ValidatorError::RemoteTransport {
                address: address.to_string(),
                message: format!("unexpected status {}", status),
            });
        }

        let outcome = response
            .json::<RemoteCheckOutcome>()
            .await
            .map_err(redact)?;
        Ok(outcome)
    }
}

/// 請求 URL 帶有 api_key，錯誤訊息中不保留
fn redact(e: reqwest::Error) -> ValidatorError {
    ValidatorError::ApiError(e.without_url())
}

#[async_trait]
impl Classifier for RemoteDeliverability {
    async fn classify(&self, address: &Address) -> Verdict {
        if let Some(gate) = &self.gate {
            gate.admit().await;
        }

        match self.lookup(address).await {
            Ok(outcome) => outcome.verdict(),
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("⚠️ Remote check failed for {}, marking invalid: {}", address, e);
                Verdict::Invalid
            }
        }
    }

    fn transport_failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::StrategyKind;
    use httpmock::prelude::*;

    fn settings(endpoint: String, key: Option<&str>) -> StrategySettings {
        StrategySettings {
            kind: StrategyKind::Remote,
            api_endpoint: endpoint,
            api_key: key.map(str::to_string),
            timeout: Duration::from_secs(2),
            requests_per_second: None,
        }
    }

    fn address(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    #[test]
    fn test_missing_or_blank_key_is_configuration_error() {
        let err = RemoteDeliverability::new(&settings("https://api.example.com".into(), None))
            .unwrap_err();
        assert!(matches!(err, ValidatorError::ConfigError { .. }));

        let err = RemoteDeliverability::new(&settings("https://api.example.com".into(), Some("  ")))
            .unwrap_err();
        assert!(matches!(err, ValidatorError::ConfigError { .. }));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let err = RemoteDeliverability::new(&settings("not a url".into(), Some("key")))
            .unwrap_err();
        assert!(matches!(err, ValidatorError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_debug_redacts_key() {
        let remote =
            RemoteDeliverability::new(&settings("https://api.example.com".into(), Some("s3cret")))
                .unwrap();
        assert!(!format!("{:?}", remote).contains("s3cret"));
    }

    #[tokio::test]
    async fn test_deliverable_address_is_valid() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/")
                .query_param("api_key", "test-key")
                .query_param("email", "user@example.com");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "email": "user@example.com",
                    "deliverability": "DELIVERABLE",
                    "is_valid_format": {"value": true, "text": "TRUE"},
                    "is_mx_found": {"value": true, "text": "TRUE"},
                    "is_smtp_valid": {"value": true, "text": "TRUE"}
                }));
        });

        let remote =
            RemoteDeliverability::new(&settings(server.url("/v1/"), Some("test-key"))).unwrap();
        let verdict = remote.classify(&address("user@example.com")).await;

        api_mock.assert();
        assert_eq!(verdict, Verdict::Valid);
        assert_eq!(remote.transport_failures(), 0);
    }

    #[tokio::test]
    async fn test_undeliverable_address_is_invalid() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "is_valid_format": true,
                    "is_mx_found": true,
                    "is_smtp_valid": true,
                    "deliverability": "UNDELIVERABLE"
                }));
        });

        let remote =
            RemoteDeliverability::new(&settings(server.url("/v1/"), Some("key"))).unwrap();
        assert_eq!(remote.classify(&address("gone@example.com")).await, Verdict::Invalid);
        assert_eq!(remote.transport_failures(), 0);
    }

    #[tokio::test]
    async fn test_server_error_fails_safe() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/v1/");
            then.status(500);
        });

        let remote =
            RemoteDeliverability::new(&settings(server.url("/v1/"), Some("key"))).unwrap();
        assert_eq!(remote.classify(&address("user@example.com")).await, Verdict::Invalid);
        assert_eq!(remote.classify(&address("other@example.com")).await, Verdict::Invalid);

        api_mock.assert_hits(2);
        assert_eq!(remote.transport_failures(), 2);
    }

    #[tokio::test]
    async fn test_malformed_body_fails_safe() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/");
            then.status(200)
                .header("Content-Type", "application/json")
                .body("{not json");
        });

        let remote =
            RemoteDeliverability::new(&settings(server.url("/v1/"), Some("key"))).unwrap();
        assert_eq!(remote.classify(&address("user@example.com")).await, Verdict::Invalid);
        assert_eq!(remote.transport_failures(), 1);
    }

    #[tokio::test]
    async fn test_timeout_fails_safe() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/");
            then.status(200)
                .delay(Duration::from_millis(1500))
                .json_body(serde_json::json!({"is_valid_format": true}));
        });

        let mut config = settings(server.url("/v1/"), Some("key"));
        config.timeout = Duration::from_millis(200);
        let remote = RemoteDeliverability::new(&config).unwrap();

        assert_eq!(remote.classify(&address("slow@example.com")).await, Verdict::Invalid);
        assert_eq!(remote.transport_failures(), 1);
    }

    #[tokio::test]
    async fn test_connection_refused_fails_safe() {
        let remote = RemoteDeliverability::new(&settings(
            "http://127.0.0.1:9/v1/".to_string(),
            Some("key"),
        ))
        .unwrap();
        assert_eq!(remote.classify(&address("user@example.com")).await, Verdict::Invalid);
        assert_eq!(remote.transport_failures(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_does_not_echo_key() {
        let remote = RemoteDeliverability::new(&settings(
            "http://127.0.0.1:9/v1/".to_string(),
            Some("s3cret"),
        ))
        .unwrap();

        let err = remote.lookup(&address("user@example.com")).await.unwrap_err();
        assert!(matches!(err, ValidatorError::ApiError(_)));
        assert!(!err.to_string().contains("s3cret"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_admission_gate_spaces_requests() {
        let gate = AdmissionGate::per_second(4);
        assert_eq!(gate.interval(), Duration::from_millis(250));

        let start = Instant::now();
        for _ in 0..3 {
            gate.admit().await;
        }
        // 第一個立即放行，之後每個等待一個間隔
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(500), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(520), "{:?}", elapsed);
    }
}
