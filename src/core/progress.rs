use crate::domain::model::Progress;
use crate::domain::ports::ProgressSink;
use tokio::sync::mpsc;

/// 進度事件流：呈現層持有接收端即可訂閱
pub fn progress_channel() -> (mpsc::UnboundedSender<Progress>, mpsc::UnboundedReceiver<Progress>) {
    mpsc::unbounded_channel()
}

impl ProgressSink for mpsc::UnboundedSender<Progress> {
    fn publish(&self, progress: Progress) {
        // 訂閱端已離開時直接忽略
        let _ = self.send(progress);
    }
}

/// 以日誌輸出進度
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn publish(&self, progress: Progress) {
        tracing::info!("⏳ Validating emails... {}", progress);
    }
}
