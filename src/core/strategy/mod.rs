pub mod basic;
pub mod remote;
pub mod strict;

pub use basic::BasicSyntax;
pub use remote::{AdmissionGate, RemoteDeliverability};
pub use strict::StrictSyntax;

use crate::domain::model::{Address, Verdict};
use crate::domain::ports::Classifier;
use crate::domain::settings::{StrategyKind, StrategySettings};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 每次執行選定一次的驗證策略，排程器只透過 `Classifier` 使用它
#[derive(Debug)]
pub enum ValidationStrategy {
    Basic(BasicSyntax),
    Strict(StrictSyntax),
    Remote(RemoteDeliverability),
}

impl ValidationStrategy {
    pub fn from_settings(settings: &StrategySettings) -> Result<Self> {
        let strategy = match settings.kind {
            StrategyKind::Basic => Self::Basic(BasicSyntax),
            StrategyKind::Strict => Self::Strict(StrictSyntax),
            StrategyKind::Remote => Self::Remote(RemoteDeliverability::new(settings)?),
        };
        tracing::debug!("Using {} validation strategy", strategy.kind());
        Ok(strategy)
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Basic(_) => StrategyKind::Basic,
            Self::Strict(_) => StrategyKind::Strict,
            Self::Remote(_) => StrategyKind::Remote,
        }
    }
}

#[async_trait]
impl Classifier for ValidationStrategy {
    async fn classify(&self, address: &Address) -> Verdict {
        match self {
            Self::Basic(basic) => basic.classify(address).await,
            Self::Strict(strict) => strict.classify(address).await,
            Self::Remote(remote) => remote.classify(address).await,
        }
    }

    fn transport_failures(&self) -> usize {
        match self {
            Self::Remote(remote) => remote.transport_failures(),
            _ => 0,
        }
    }
}
