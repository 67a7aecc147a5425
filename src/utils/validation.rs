use crate::domain::settings::{StrategyKind, StrategySettings};
use crate::utils::error::{Result, ValidatorError};
use std::path::Path;
use url::Url;

/// 純文字輸入檔允許的副檔名
pub const ALLOWED_INPUT_EXTENSIONS: &[&str] = &["txt"];

pub const MISSING_API_KEY: &str =
    "remote strategy requires an API key (set EMAIL_VALIDATION_API_KEY)";

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> ValidatorError {
    ValidatorError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

/// 檔案選擇端的把關：只接受 .txt 純文字檔
pub fn validate_input_file(path: &str) -> Result<()> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if ALLOWED_INPUT_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(ValidatorError::UnsupportedFile {
            path: path.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                ext,
                ALLOWED_INPUT_EXTENSIONS.join(", ")
            ),
        }),
        None => Err(ValidatorError::UnsupportedFile {
            path: path.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| ValidatorError::MissingConfigError {
            field: field_name.to_string(),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// 遠端策略在任何處理開始前必須具備憑證與合法端點
pub fn validate_strategy_settings(settings: &StrategySettings) -> Result<()> {
    if settings.kind != StrategyKind::Remote {
        return Ok(());
    }

    let has_key = settings
        .api_key
        .as_deref()
        .is_some_and(|key| !key.trim().is_empty());
    if !has_key {
        return Err(ValidatorError::config(MISSING_API_KEY));
    }

    validate_url("strategy.api_endpoint", &settings.api_endpoint)?;

    if settings.timeout.is_zero() {
        return Err(invalid(
            "strategy.timeout_seconds",
            0,
            "Remote lookups need a non-zero timeout",
        ));
    }

    if let Some(rps) = settings.requests_per_second {
        validate_range("strategy.requests_per_second", rps, 1, 1000)?;
    }

    Ok(())
}
