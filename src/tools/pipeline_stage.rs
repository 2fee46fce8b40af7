use log::{debug, warn};
use std::io;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, ChildStdout, Command};

/// 單一請求內的外部程序
///
/// 程序控制代碼與 pipe 只屬於一個請求。
/// 以 `kill_on_drop` 啟動，未經 [`PipelineStage::finish`] 就被丟棄時會強制結束
#[derive(Debug)]
pub struct PipelineStage {
    name: &'static str,
    child: Child,
}

impl PipelineStage {
    /// 啟動外部程序：stdout 為 pipe，stderr 直接輸出到伺服器終端
    pub fn spawn(name: &'static str, mut command: Command) -> io::Result<Self> {
        command
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        debug!("啟動 {name}: {:?}", command.as_std());
        let child = command.spawn()?;

        Ok(Self { name, child })
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// 取走 stdout；只能取一次
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// 不等待，查詢程序是否已結束
    pub fn try_status(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// 等待程序結束並回收
    pub async fn finish(mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait().await?;
        debug!("{} 結束: {status}", self.name);
        Ok(status)
    }

    /// 強制結束並回收，用於後續階段啟動失敗時
    pub async fn abort(mut self) {
        if let Err(e) = self.child.start_kill() {
            debug!("{} 已結束，無需中止: {e}", self.name);
        }
        if let Err(e) = self.child.wait().await {
            warn!("無法回收 {}: {e}", self.name);
        }
    }
}
