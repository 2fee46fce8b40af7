use super::frame_extractor::extract_frame;
use super::keyframe_selector::{KeyframeStrategy, select_timestamp};
use super::thumbnail_composer::{ComposerInput, compose};
use crate::component::media_library::MediaEntry;
use crate::config::ToolPaths;
use crate::error::{MediaError, Result};
use crate::tools::PipelineStage;
use bytes::{Bytes, BytesMut};
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use log::{debug, error, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::process::ChildStdout;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::io::ReaderStream;

const FIRST_CHUNK_CAPACITY: usize = 16 * 1024;

/// 合成階段的輸入來源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailPlan {
    /// 靜態圖片：原檔直接交給 magick
    DirectInput,
    /// 影片與動態圖片：探測 → 選時間點 → ffmpeg 擷取 → magick
    ExtractFrame,
}

/// 縮圖生成管線
///
/// 每個請求各自啟動 1 到 2 個外部程序，彼此不共用。
/// 流程：
/// A. 依快取的分類決定是否抽幀
/// B. 探測並選取時間點
/// C. ffmpeg 擷取單一畫面到 pipe
/// D. magick 合成並輸出 JPEG
/// E. 讀到第一段輸出後才回傳，其餘由呼叫端串流
#[derive(Debug, Clone)]
pub struct ThumbnailPipeline {
    tools: ToolPaths,
    strategy: KeyframeStrategy,
    limiter: Option<Arc<Semaphore>>,
}

impl ThumbnailPipeline {
    /// `max_concurrent` 為 0 時不限制同時進行的請求數
    #[must_use]
    pub fn new(tools: ToolPaths, strategy: KeyframeStrategy, max_concurrent: usize) -> Self {
        let limiter = (max_concurrent > 0).then(|| Arc::new(Semaphore::new(max_concurrent)));
        Self {
            tools,
            strategy,
            limiter,
        }
    }

    #[must_use]
    pub const fn plan(entry: &MediaEntry) -> ThumbnailPlan {
        if entry.category.is_time_based() {
            ThumbnailPlan::ExtractFrame
        } else {
            ThumbnailPlan::DirectInput
        }
    }

    /// 執行管線，回傳已確認有輸出的縮圖串流
    ///
    /// 任一階段失敗時，所有已啟動的程序都會被結束並回收後才回傳錯誤
    pub async fn render(&self, entry: &MediaEntry) -> Result<ThumbnailStream> {
        let permit = match &self.limiter {
            Some(limiter) => Arc::clone(limiter).acquire_owned().await.ok(),
            None => None,
        };

        let path = entry.path.as_path();
        let plan = Self::plan(entry);
        debug!("縮圖 {plan:?}: {}", path.display());

        let mut extractor = None;
        let input = match plan {
            ThumbnailPlan::DirectInput => ComposerInput::File(path),
            ThumbnailPlan::ExtractFrame => {
                let timestamp = select_timestamp(&self.tools.ffprobe, path, self.strategy).await?;
                let mut stage = extract_frame(&self.tools.ffmpeg, path, timestamp)?;
                let Some(stdout) = stage.take_stdout() else {
                    stage.abort().await;
                    return Err(MediaError::DecodeStart {
                        path: path.to_path_buf(),
                        source: io::Error::other("ffmpeg stdout 未建立"),
                    });
                };
                extractor = Some(stage);
                ComposerInput::Pipe(stdout)
            }
        };

        let mut composer = match compose(&self.tools.magick, path, input) {
            Ok(stage) => stage,
            Err(e) => {
                abort_stages(None, extractor).await;
                return Err(e);
            }
        };

        let Some(mut stdout) = composer.take_stdout() else {
            abort_stages(Some(composer), extractor).await;
            return Err(composite_error(path, "magick stdout 未建立".to_string()));
        };

        let mut first_chunk = BytesMut::with_capacity(FIRST_CHUNK_CAPACITY);
        match stdout.read_buf(&mut first_chunk).await {
            Ok(0) => {
                drop(stdout);
                return Err(empty_output_error(path, composer, extractor).await);
            }
            Ok(_) => {}
            Err(e) => {
                drop(stdout);
                abort_stages(Some(composer), extractor).await;
                return Err(composite_error(path, format!("無法讀取 magick 輸出: {e}")));
            }
        }

        tokio::spawn(reap_stages(path.to_path_buf(), composer, extractor, permit));

        Ok(ThumbnailStream {
            first_chunk: first_chunk.freeze(),
            stdout,
        })
    }
}

/// 已開始輸出的縮圖
///
/// 丟棄時會關閉 magick 的 stdout，兩個程序隨之結束並由背景工作回收
#[derive(Debug)]
pub struct ThumbnailStream {
    first_chunk: Bytes,
    stdout: ChildStdout,
}

impl ThumbnailStream {
    #[must_use]
    pub const fn first_chunk(&self) -> &Bytes {
        &self.first_chunk
    }

    /// 轉為逐段產生的位元組串流，不緩衝整張圖
    pub fn into_stream(self) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
        let Self {
            first_chunk,
            stdout,
        } = self;
        stream::once(future::ready(Ok::<_, io::Error>(first_chunk))).chain(ReaderStream::new(stdout))
    }
}

fn composite_error(path: &Path, reason: String) -> MediaError {
    MediaError::Composite {
        path: path.to_path_buf(),
        reason,
    }
}

/// magick 沒有任何輸出：回收兩個程序並判斷是哪一段失敗
///
/// magick 失敗時，ffmpeg 可能只是因為 pipe 被關閉才跟著失敗，
/// 只有 ffmpeg 自己先失敗才歸類為 `FrameDecode`
async fn empty_output_error(
    path: &Path,
    composer: PipelineStage,
    extractor: Option<PipelineStage>,
) -> MediaError {
    let Some(mut extractor) = extractor else {
        return composite_error(path, composer_failure_reason(composer.finish().await));
    };

    // magick 已關閉輸出；ffmpeg 仍在執行代表 magick 沒讀完輸入就結束
    let extractor_running = matches!(extractor.try_status(), Ok(None));
    let composer_status = composer.finish().await;
    let composer_failed = !composer_status.as_ref().is_ok_and(|status| status.success());

    if composer_failed && extractor_running {
        extractor.abort().await;
        return composite_error(path, composer_failure_reason(composer_status));
    }

    match extractor.finish().await {
        Ok(status) if !status.success() && !(composer_failed && is_broken_pipe(status)) => {
            return MediaError::FrameDecode {
                path: path.to_path_buf(),
                status,
            };
        }
        Ok(_) => {}
        Err(e) => warn!("無法回收 ffmpeg: {e}"),
    }

    composite_error(path, composer_failure_reason(composer_status))
}

fn composer_failure_reason(status: io::Result<ExitStatus>) -> String {
    match status {
        Ok(status) if !status.success() => status.to_string(),
        Ok(_) => "沒有輸出任何資料".to_string(),
        Err(e) => format!("無法回收 magick: {e}"),
    }
}

/// 寫入已關閉的 pipe 而結束：被 SIGPIPE 終止，或 shell 回報的 128 + SIGPIPE
#[cfg(unix)]
fn is_broken_pipe(status: ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;

    const SIGPIPE: i32 = 13;
    status.signal() == Some(SIGPIPE) || status.code() == Some(128 + SIGPIPE)
}

#[cfg(not(unix))]
fn is_broken_pipe(_status: ExitStatus) -> bool {
    false
}

async fn abort_stages(composer: Option<PipelineStage>, extractor: Option<PipelineStage>) {
    if let Some(composer) = composer {
        composer.abort().await;
    }
    if let Some(extractor) = extractor {
        extractor.abort().await;
    }
}

/// 串流開始後在背景回收程序；ffmpeg 必須在 magick 結束後才回收
async fn reap_stages(
    path: PathBuf,
    composer: PipelineStage,
    extractor: Option<PipelineStage>,
    permit: Option<OwnedSemaphorePermit>,
) {
    for stage in std::iter::once(composer).chain(extractor) {
        let name = stage.name();
        match stage.finish().await {
            Ok(status) if status.success() => {}
            Ok(status) => error!("{name} 異常結束 {}: {status}", path.display()),
            Err(e) => error!("無法回收 {name} {}: {e}", path.display()),
        }
    }

    drop(permit);
    debug!("縮圖程序已回收: {}", path.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::MediaCategory;

    fn entry(category: MediaCategory, mime: &str) -> MediaEntry {
        MediaEntry {
            display_name: "item".to_string(),
            path: PathBuf::from("/media/item"),
            mime_type: mime.to_string(),
            category,
        }
    }

    fn missing_tools() -> ToolPaths {
        ToolPaths {
            ffprobe: PathBuf::from("/nonexistent/bin/ffprobe"),
            ffmpeg: PathBuf::from("/nonexistent/bin/ffmpeg"),
            magick: PathBuf::from("/nonexistent/bin/magick"),
        }
    }

    #[test]
    fn test_plan_by_category() {
        assert_eq!(
            ThumbnailPipeline::plan(&entry(MediaCategory::Image, "image/png")),
            ThumbnailPlan::DirectInput
        );
        assert_eq!(
            ThumbnailPipeline::plan(&entry(MediaCategory::AnimatedImage, "image/gif")),
            ThumbnailPlan::ExtractFrame
        );
        assert_eq!(
            ThumbnailPipeline::plan(&entry(MediaCategory::Video, "video/mp4")),
            ThumbnailPlan::ExtractFrame
        );
    }

    #[test]
    fn test_limiter_only_when_bounded() {
        let unbounded = ThumbnailPipeline::new(missing_tools(), KeyframeStrategy::Quantile, 0);
        assert!(unbounded.limiter.is_none());

        let bounded = ThumbnailPipeline::new(missing_tools(), KeyframeStrategy::Quantile, 4);
        assert_eq!(bounded.limiter.unwrap().available_permits(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_is_broken_pipe() {
        use std::os::unix::process::ExitStatusExt;

        assert!(is_broken_pipe(ExitStatus::from_raw(13)));
        assert!(is_broken_pipe(ExitStatus::from_raw(141 << 8)));
        assert!(!is_broken_pipe(ExitStatus::from_raw(1 << 8)));
        assert!(!is_broken_pipe(ExitStatus::from_raw(9)));
    }

    #[tokio::test]
    async fn test_static_image_skips_probe() {
        // ffprobe 不存在；靜態圖片不應探測，失敗點是 magick
        let pipeline = ThumbnailPipeline::new(missing_tools(), KeyframeStrategy::Quantile, 0);
        let err = pipeline
            .render(&entry(MediaCategory::Image, "image/png"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Composite { .. }));
    }

    #[tokio::test]
    async fn test_video_fails_at_probe() {
        let pipeline = ThumbnailPipeline::new(missing_tools(), KeyframeStrategy::Quantile, 0);
        let err = pipeline
            .render(&entry(MediaCategory::Video, "video/mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Probe { .. }));
    }
}
