use super::basic::BASIC_PATTERN;
use crate::domain::model::{Address, Verdict};
use crate::domain::ports::Classifier;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

pub const MAX_ADDRESS_LENGTH: usize = 254;

// local-part: dot-atom 或 quoted-string
// domain: 多段 label 或 IP literal（IPv4 / 一般位址標籤）
static RFC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?i)^(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*"#,
        r#"|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")"#,
        r#"@(?:(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?"#,
        r#"|\[(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}"#,
        r#"(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?"#,
        r#"|[a-z0-9-]*[a-z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\])$"#,
    ))
    .expect("strict email pattern is valid")
});

/// 接近 RFC 5321/5322 的語法檢查。Basic 拒絕的地址在這裡一定也被拒絕
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictSyntax;

impl StrictSyntax {
    pub fn check(&self, address: &str) -> Verdict {
        if address.chars().count() > MAX_ADDRESS_LENGTH {
            return Verdict::Invalid;
        }
        if address.starts_with('.') || address.ends_with('.') {
            return Verdict::Invalid;
        }
        Verdict::from_bool(BASIC_PATTERN.is_match(address) && RFC_PATTERN.is_match(address))
    }
}

#[async_trait]
impl Classifier for StrictSyntax {
    async fn classify(&self, address: &Address) -> Verdict {
        self.check(address.as_str())
    }
}
