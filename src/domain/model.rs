use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 從一行輸入擷取出的候選地址（已修剪、非空，不去重）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// 修剪空白後若為空則回傳 `None`
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 原始文字的惰性地址序列，可重複走訪
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressList {
    text: String,
    len: usize,
}

impl AddressList {
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = text.lines().filter(|line| !line.trim().is_empty()).count();
        Self { text, len }
    }

    pub fn iter(&self) -> impl Iterator<Item = Address> + '_ {
        self.text.lines().filter_map(Address::parse)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Valid,
    Invalid,
}

impl Verdict {
    pub fn from_bool(valid: bool) -> Self {
        if valid {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

/// 一次執行的最終結果：兩個序列依輸入順序劃分全部地址
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: Vec<Address>,
    pub invalid: Vec<Address>,
}

impl ValidationResult {
    pub fn total(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }
}

/// 進度百分比 [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Progress(u8);

impl Progress {
    pub const COMPLETE: Progress = Progress(100);

    /// `round(processed / total * 100)`，未完成時上限為 99
    pub fn from_counts(processed: usize, total: usize) -> Self {
        if total == 0 || processed >= total {
            return Self::COMPLETE;
        }
        let percent = ((processed as f64 / total as f64) * 100.0).round() as u8;
        Self(percent.min(99))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    pub fn is_complete(self) -> bool {
        self.0 == 100
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// 遠端服務的布林欄位，可能是 `true` 或 `{ "value": true, "text": "TRUE" }`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoteFlag(pub bool);

impl<'de> Deserialize<'de> for RemoteFlag {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Plain(bool),
            Wrapped { value: Option<bool> },
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Plain(value)) => RemoteFlag(value),
            Some(Raw::Wrapped { value }) => RemoteFlag(value.unwrap_or(false)),
            None => RemoteFlag(false),
        })
    }
}

/// 遠端查詢回應，只用於推導 Verdict，不會保存
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteCheckOutcome {
    #[serde(default)]
    pub is_valid_format: RemoteFlag,
    #[serde(default)]
    pub is_mx_found: RemoteFlag,
    #[serde(default)]
    pub is_smtp_valid: RemoteFlag,
    #[serde(default)]
    pub deliverability: Option<String>,
}

impl RemoteCheckOutcome {
    pub fn verdict(&self) -> Verdict {
        let undeliverable = self
            .deliverability
            .as_deref()
            .is_some_and(|d| d.eq_ignore_ascii_case("UNDELIVERABLE"));

        Verdict::from_bool(
            self.is_valid_format.0
                && self.is_mx_found.0
                && self.is_smtp_valid.0
                && !undeliverable,
        )
    }
}
