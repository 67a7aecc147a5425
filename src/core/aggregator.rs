use crate::domain::model::{Address, ValidationResult, Verdict};

/// 依 Verdict 累積地址，保持各自序列內的輸入順序
#[derive(Debug, Default)]
pub struct ResultAggregator {
    result: ValidationResult,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, address: Address, verdict: Verdict) {
        match verdict {
            Verdict::Valid => self.result.valid.push(address),
            Verdict::Invalid => self.result.invalid.push(address),
        }
    }

    pub fn processed(&self) -> usize {
        self.result.total()
    }

    pub fn finish(self) -> ValidationResult {
        self.result
    }
}
