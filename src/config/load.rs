use crate::config::cli::Cli;
use crate::config::types::{AppConfig, ToolPaths};
use crate::tools::validate_directory_exists;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

/// 編譯時嵌入的預設前端設定
const DEFAULT_CONFIG_JS: &str = include_str!("../data/defaults.js");

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let configs = load_configs(cli.defaults, &cli.config_files)?;

        if let Some(assets) = &cli.assets {
            validate_directory_exists(assets)?;
        }

        Ok(Self {
            token: cli.token.unwrap_or_else(generate_token),
            configs,
            listen_addr: cli.listen,
            auto_launch: cli.auto_launch,
            auto_exit: cli.auto_exit,
            assets_dir: cli.assets,
            tools: ToolPaths {
                ffprobe: cli.ffprobe,
                ffmpeg: cli.ffmpeg,
                magick: cli.magick,
            },
            keyframe_strategy: cli.keyframe_strategy,
            max_concurrent_thumbnails: cli.max_concurrent_thumbnails,
            files: cli.files,
        })
    }
}

/// 讀取所有前端設定檔，依序接在預設設定之後
pub fn load_configs(use_defaults: bool, config_files: &[PathBuf]) -> Result<Vec<String>> {
    let mut configs = Vec::with_capacity(config_files.len() + 1);

    if use_defaults {
        configs.push(DEFAULT_CONFIG_JS.to_string());
    }

    for path in config_files {
        let content = fs::read_to_string(path)
            .with_context(|| format!("無法讀取設定檔: {}", path.display()))?;
        configs.push(content);
    }

    Ok(configs)
}

/// 隨機產生 32 個十六進位字元的權杖
#[must_use]
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}
