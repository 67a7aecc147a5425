use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_API_ENDPOINT: &str = "https://emailvalidation.abstractapi.com/v1/";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// 每次執行只選擇一次的驗證策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Basic,
    Strict,
    Remote,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Basic => "basic",
            Self::Strict => "strict",
            Self::Remote => "remote",
        };
        f.write_str(name)
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "strict" => Ok(Self::Strict),
            "remote" => Ok(Self::Remote),
            other => Err(format!(
                "unknown strategy '{}', expected basic, strict or remote",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategySettings {
    pub kind: StrategyKind,
    pub api_endpoint: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// 遠端策略的准入上限，`None` 表示不限制
    pub requests_per_second: Option<u32>,
}

impl StrategySettings {
    pub fn new(kind: StrategyKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            kind: StrategyKind::Basic,
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            requests_per_second: None,
        }
    }
}

/// 節流設定，與正確性無關，零延遲是合法的
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub per_address: Duration,
    pub per_batch: Duration,
}

impl ThrottlePolicy {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_millis(per_address_ms: u64, per_batch_ms: u64) -> Self {
        Self {
            per_address: Duration::from_millis(per_address_ms),
            per_batch: Duration::from_millis(per_batch_ms),
        }
    }
}
