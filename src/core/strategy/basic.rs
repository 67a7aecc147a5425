use crate::domain::model::{Address, Verdict};
use crate::domain::ports::Classifier;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

/// `local@domain.tld`：不含空白與 `@` 的兩段，網域至少有一個 `.`
pub(crate) static BASIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("basic email pattern is valid")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicSyntax;

impl BasicSyntax {
    pub fn check(&self, address: &str) -> Verdict {
        Verdict::from_bool(BASIC_PATTERN.is_match(address))
    }
}

#[async_trait]
impl Classifier for BasicSyntax {
    async fn classify(&self, address: &Address) -> Verdict {
        self.check(address.as_str())
    }
}
