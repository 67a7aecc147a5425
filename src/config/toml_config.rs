use crate::core::ConfigProvider;
use crate::domain::settings::{
    StrategyKind, StrategySettings, ThrottlePolicy, DEFAULT_API_ENDPOINT, DEFAULT_BATCH_SIZE,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::utils::error::{Result, ValidatorError};
use crate::utils::validation::{
    validate_input_file, validate_non_empty_string, validate_path, validate_positive_number,
    validate_required_field, validate_strategy_settings, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub run: RunConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default)]
    pub kind: StrategyKind,
    pub api_endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub requests_per_second: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThrottleConfig {
    pub batch_size: Option<usize>,
    pub concurrent_requests: Option<usize>,
    pub address_delay_ms: Option<u64>,
    pub batch_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content)
            .map_err(|e| ValidatorError::config(format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${EMAIL_VALIDATION_API_KEY})，找不到的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 未解析的 `${VAR}` 或空白值視為沒有提供
    fn resolved_api_key(&self) -> Option<String> {
        let key = self.strategy.api_key.as_deref()?.trim();
        if key.is_empty() {
            return None;
        }
        if ENV_PLACEHOLDER.is_match(key) {
            tracing::warn!("strategy.api_key placeholder was not resolved from the environment");
            return None;
        }
        Some(key.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("run.name", &self.run.name)?;
        let input_file = validate_required_field("input.file", &self.input.file)?;
        validate_input_file(input_file)?;
        validate_path("output.path", &self.output.path)?;
        validate_positive_number("throttle.batch_size", self.batch_size(), 1)?;
        validate_positive_number(
            "throttle.concurrent_requests",
            self.concurrent_requests(),
            1,
        )?;

        if let Some(format) = self.log_format() {
            if !["compact", "json"].contains(&format) {
                return Err(ValidatorError::InvalidConfigValueError {
                    field: "monitoring.log_format".to_string(),
                    value: format.to_string(),
                    reason: "Unsupported format. Valid formats: compact, json".to_string(),
                });
            }
        }

        validate_strategy_settings(&ConfigProvider::strategy(self))
    }

    pub fn batch_size(&self) -> usize {
        self.throttle.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    pub fn concurrent_requests(&self) -> usize {
        self.throttle.concurrent_requests.unwrap_or(1)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_format(&self) -> Option<&str> {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_file(&self) -> &str {
        self.input.file.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn batch_size(&self) -> usize {
        self.batch_size()
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests()
    }

    fn throttle(&self) -> ThrottlePolicy {
        ThrottlePolicy::from_millis(
            self.throttle.address_delay_ms.unwrap_or(0),
            self.throttle.batch_delay_ms.unwrap_or(0),
        )
    }

    fn strategy(&self) -> StrategySettings {
        StrategySettings {
            kind: self.strategy.kind,
            api_endpoint: self
                .strategy
                .api_endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
            api_key: self.resolved_api_key(),
            timeout: Duration::from_secs(
                self.strategy
                    .timeout_seconds
                    .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            ),
            requests_per_second: self.strategy.requests_per_second,
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
