use log::{info, warn};
use std::sync::Arc;
use tokio::sync::watch;

/// 伺服器關閉訊號：Ctrl-C 或 /exit 都會觸發
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    /// 等待手動觸發
    pub async fn triggered(&self) {
        let mut receiver = self.sender.subscribe();
        // sender 由自身持有，不會在等待中被關閉
        let _ = receiver.wait_for(|triggered| *triggered).await;
    }

    /// 等待 Ctrl-C 或手動觸發，供 graceful shutdown 使用
    pub async fn wait(self) {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!("無法監聽中斷信號: {e}");
                    self.triggered().await;
                    return;
                }
                eprintln!("\n收到中斷信號，正在安全關閉...");
            }
            () = self.triggered() => info!("收到結束請求，正在關閉伺服器"),
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use]
pub fn setup_shutdown_signal() -> ShutdownSignal {
    ShutdownSignal::new()
}
