pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use self::args::CliConfig;

#[cfg(feature = "cli")]
mod args {
    use crate::core::ConfigProvider;
    use crate::domain::settings::{
        StrategyKind, StrategySettings, ThrottlePolicy, DEFAULT_API_ENDPOINT,
    };
    use crate::utils::error::Result;
    use crate::utils::validation::{
        validate_input_file, validate_path, validate_positive_number, validate_strategy_settings,
        Validate,
    };
    use clap::Parser;
    use std::fmt;
    use std::time::Duration;

    #[derive(Clone, Parser)]
    #[command(name = "mailsieve")]
    #[command(about = "Split a list of email addresses into valid and invalid entries")]
    pub struct CliConfig {
        /// Plain-text file with one email address per line
        #[arg(short, long)]
        pub input: String,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        /// basic, strict or remote
        #[arg(long, default_value = "basic")]
        pub strategy: StrategyKind,

        #[arg(long, default_value = "10")]
        pub batch_size: usize,

        #[arg(long, default_value = "1")]
        pub concurrent_requests: usize,

        #[arg(long, default_value = "0")]
        pub address_delay_ms: u64,

        #[arg(long, default_value = "0")]
        pub batch_delay_ms: u64,

        #[arg(long, default_value = DEFAULT_API_ENDPOINT)]
        pub api_endpoint: String,

        #[arg(long, env = "EMAIL_VALIDATION_API_KEY", hide_env_values = true)]
        pub api_key: Option<String>,

        #[arg(long, default_value = "10")]
        pub timeout_seconds: u64,

        /// Upper bound on outbound lookups for the remote strategy
        #[arg(long)]
        pub requests_per_second: Option<u32>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,

        #[arg(long, help = "Print the run summary as JSON")]
        pub json: bool,
    }

    impl fmt::Debug for CliConfig {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("CliConfig")
                .field("input", &self.input)
                .field("output_path", &self.output_path)
                .field("strategy", &self.strategy)
                .field("batch_size", &self.batch_size)
                .field("concurrent_requests", &self.concurrent_requests)
                .field("address_delay_ms", &self.address_delay_ms)
                .field("batch_delay_ms", &self.batch_delay_ms)
                .field("api_endpoint", &self.api_endpoint)
                .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
                .field("timeout_seconds", &self.timeout_seconds)
                .field("requests_per_second", &self.requests_per_second)
                .finish()
        }
    }

    impl ConfigProvider for CliConfig {
        fn input_file(&self) -> &str {
            &self.input
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn batch_size(&self) -> usize {
            self.batch_size
        }

        fn concurrent_requests(&self) -> usize {
            self.concurrent_requests
        }

        fn throttle(&self) -> ThrottlePolicy {
            ThrottlePolicy::from_millis(self.address_delay_ms, self.batch_delay_ms)
        }

        fn strategy(&self) -> StrategySettings {
            StrategySettings {
                kind: self.strategy,
                api_endpoint: self.api_endpoint.clone(),
                api_key: self.api_key.clone(),
                timeout: Duration::from_secs(self.timeout_seconds),
                requests_per_second: self.requests_per_second,
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_input_file(&self.input)?;
            validate_path("output_path", &self.output_path)?;
            validate_positive_number("batch_size", self.batch_size, 1)?;
            validate_positive_number("concurrent_requests", self.concurrent_requests, 1)?;
            validate_strategy_settings(&self.strategy())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::utils::error::ValidatorError;

        fn parse(args: &[&str]) -> CliConfig {
            let mut argv = vec!["mailsieve"];
            argv.extend_from_slice(args);
            CliConfig::try_parse_from(argv).unwrap()
        }

        #[test]
        fn test_defaults() {
            let config = parse(&["--input", "emails.txt", "--api-key", "k"]);
            assert_eq!(config.strategy, StrategyKind::Basic);
            assert_eq!(config.batch_size(), 10);
            assert_eq!(config.concurrent_requests(), 1);
            assert_eq!(config.throttle(), ThrottlePolicy::none());
            assert_eq!(config.strategy().api_endpoint, DEFAULT_API_ENDPOINT);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_non_txt_input_rejected() {
            let config = parse(&["--input", "emails.csv"]);
            assert!(matches!(
                config.validate(),
                Err(ValidatorError::UnsupportedFile { .. })
            ));
        }

        #[test]
        fn test_remote_requires_key() {
            let mut config = parse(&["--input", "emails.txt", "--strategy", "remote"]);
            config.api_key = None;
            assert!(matches!(
                config.validate(),
                Err(ValidatorError::ConfigError { .. })
            ));

            config.api_key = Some("secret".to_string());
            assert!(config.validate().is_ok());
            assert!(!format!("{:?}", config).contains("secret"));
        }

        #[test]
        fn test_zero_batch_size_rejected() {
            let config = parse(&["--input", "emails.txt", "--batch-size", "0"]);
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_unknown_strategy_rejected_by_parser() {
            let result =
                CliConfig::try_parse_from(["mailsieve", "--input", "a.txt", "--strategy", "dns"]);
            assert!(result.is_err());
        }
    }
}
