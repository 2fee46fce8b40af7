use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;

/// 前端要求執行的指令：參數陣列，或交給 `sh -c` 的字串
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExecCommand {
    Argv(Vec<String>),
    Shell(String),
}

#[derive(Debug, Deserialize)]
pub struct ExecRequest {
    pub cmd: ExecCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub failed: bool,
}

impl ExecCommand {
    /// 空的參數陣列回傳 `None`
    fn into_command(self) -> Option<Command> {
        match self {
            Self::Argv(argv) => {
                let (program, args) = argv.split_first()?;
                let mut cmd = Command::new(program);
                cmd.args(args);
                Some(cmd)
            }
            Self::Shell(script) => {
                let mut cmd = Command::new("sh");
                cmd.arg("-c").arg(script);
                Some(cmd)
            }
        }
    }
}

pub async fn exec(Json(request): Json<ExecRequest>) -> Response {
    match run_command(request.cmd).await {
        Some(result) => Json(result).into_response(),
        None => StatusCode::BAD_REQUEST.into_response(),
    }
}

/// 執行指令並收集輸出
///
/// 無法啟動時 `exitCode` 為 -1、`stderr` 為啟動錯誤；
/// 失敗但沒有 stderr 時以結束狀態補上
pub async fn run_command(command: ExecCommand) -> Option<ExecResult> {
    let mut cmd = command.into_command()?;
    cmd.stdin(Stdio::null()).kill_on_drop(true);
    debug!("執行指令: {:?}", cmd.as_std());

    let result = match cmd.output().await {
        Ok(output) => {
            let failed = !output.status.success();
            let mut stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            if failed && stderr.is_empty() {
                stderr = output.status.to_string();
            }
            ExecResult {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr,
                failed,
            }
        }
        Err(e) => {
            warn!("無法執行指令: {e}");
            ExecResult {
                exit_code: -1,
                stdout: String::new(),
                stderr: e.to_string(),
                failed: true,
            }
        }
    };

    Some(result)
}
