use crate::error::{MediaError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 內容嗅探最多讀取的位元組數
pub const SNIFF_LEN: usize = 512;

/// 無法辨識的二進位內容
pub const UNKNOWN_BINARY: &str = "application/octet-stream";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// 媒體分類，決定縮圖走哪一條路徑
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCategory {
    /// 靜態圖片：直接交給 magick
    Image,
    /// 動態圖片（GIF）：先抽幀
    AnimatedImage,
    /// 影片：先抽幀
    Video,
}

impl MediaCategory {
    /// 依 MIME 字串決定分類
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video/") {
            Self::Video
        } else if mime.starts_with("image/gif") {
            Self::AnimatedImage
        } else {
            Self::Image
        }
    }

    /// 是否需要先選取時間點再抽幀
    #[must_use]
    pub const fn is_time_based(self) -> bool {
        matches!(self, Self::Video | Self::AnimatedImage)
    }
}

/// 固定位移的魔術位元組
struct MagicPattern {
    offset: usize,
    bytes: &'static [u8],
}

impl MagicPattern {
    fn matches(&self, header: &[u8]) -> bool {
        header
            .get(self.offset..self.offset + self.bytes.len())
            .is_some_and(|slice| slice == self.bytes)
    }
}

/// 所有 pattern 都符合才算命中
struct Signature {
    patterns: &'static [MagicPattern],
    mime: &'static str,
}

const fn at(offset: usize, bytes: &'static [u8]) -> MagicPattern {
    MagicPattern { offset, bytes }
}

// 順序即優先權：較具體的簽章放前面
static SIGNATURES: &[Signature] = &[
    Signature { patterns: &[at(0, b"\x00\x00\x01\x00")], mime: "image/x-icon" },
    Signature { patterns: &[at(0, b"\x00\x00\x02\x00")], mime: "image/x-icon" },
    Signature { patterns: &[at(0, b"BM")], mime: "image/bmp" },
    Signature { patterns: &[at(0, b"GIF87a")], mime: "image/gif" },
    Signature { patterns: &[at(0, b"GIF89a")], mime: "image/gif" },
    Signature { patterns: &[at(0, b"RIFF"), at(8, b"WEBPVP")], mime: "image/webp" },
    Signature { patterns: &[at(0, b"\x89PNG\r\n\x1a\n")], mime: "image/png" },
    Signature { patterns: &[at(0, b"\xFF\xD8\xFF")], mime: "image/jpeg" },
    Signature { patterns: &[at(4, b"ftypavif")], mime: "image/avif" },
    Signature { patterns: &[at(4, b"ftypavis")], mime: "image/avif" },
    Signature { patterns: &[at(4, b"ftypheic")], mime: "image/heic" },
    Signature { patterns: &[at(4, b"ftypheix")], mime: "image/heic" },
    Signature { patterns: &[at(4, b"ftypmif1")], mime: "image/heif" },
    Signature { patterns: &[at(0, b"RIFF"), at(8, b"AVI ")], mime: "video/avi" },
    Signature { patterns: &[at(0, b"RIFF"), at(8, b"WAVE")], mime: "audio/wave" },
    Signature { patterns: &[at(0, b"\x00\x00\x01\xBA")], mime: "video/mpeg" },
    Signature { patterns: &[at(0, b"FLV\x01")], mime: "video/x-flv" },
    Signature { patterns: &[at(0, b"OggS\x00")], mime: "application/ogg" },
    Signature { patterns: &[at(0, b"ID3")], mime: "audio/mpeg" },
    Signature { patterns: &[at(0, b"%PDF-")], mime: "application/pdf" },
    Signature { patterns: &[at(0, b"PK\x03\x04")], mime: "application/zip" },
    Signature { patterns: &[at(0, b"\x1F\x8B\x08")], mime: "application/x-gzip" },
];

/// 讀取檔案開頭並判斷分類與 MIME
pub fn classify(path: &Path) -> Result<(MediaCategory, String)> {
    let header = read_header(path)?;
    let mime = detect_mime(&header);
    Ok((MediaCategory::from_mime(&mime), mime))
}

fn read_header(path: &Path) -> Result<Vec<u8>> {
    let unreadable = |source| MediaError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(unreadable)?;
    let mut header = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64)
        .read_to_end(&mut header)
        .map_err(unreadable)?;
    Ok(header)
}

/// 依內容判斷 MIME，不看副檔名
///
/// 一般嗅探結果為未知二進位、且第 4-8 位元組為 `ftyp` 時，
/// 視為 ISO base media 容器並改判為 `video/mp4`
#[must_use]
pub fn detect_mime(header: &[u8]) -> String {
    let header = &header[..header.len().min(SNIFF_LEN)];
    let sniffed = sniff(header);

    if sniffed == UNKNOWN_BINARY && header.get(4..8) == Some(b"ftyp".as_slice()) {
        return "video/mp4".to_string();
    }

    sniffed.to_string()
}

fn sniff(header: &[u8]) -> &'static str {
    if let Some(signature) = SIGNATURES
        .iter()
        .find(|sig| sig.patterns.iter().all(|p| p.matches(header)))
    {
        return signature.mime;
    }

    if let Some(mime) = sniff_matroska(header) {
        return mime;
    }

    if is_mp4_signature(header) {
        return "video/mp4";
    }

    if header.is_empty() || header.iter().any(|&b| is_binary_byte(b)) {
        UNKNOWN_BINARY
    } else {
        TEXT_PLAIN
    }
}

/// EBML 標頭；doctype 為 matroska 時回報 mkv，其餘視為 webm
fn sniff_matroska(header: &[u8]) -> Option<&'static str> {
    if !header.starts_with(b"\x1A\x45\xDF\xA3") {
        return None;
    }

    let is_matroska = header.windows(8).any(|w| w == b"matroska");
    Some(if is_matroska {
        "video/x-matroska"
    } else {
        "video/webm"
    })
}

/// ftyp box 的主品牌或相容品牌以 `mp4` 開頭
fn is_mp4_signature(header: &[u8]) -> bool {
    if header.len() < 12 {
        return false;
    }

    let box_size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    if box_size < 12 || header.len() < box_size || box_size % 4 != 0 {
        return false;
    }

    if &header[4..8] != b"ftyp" {
        return false;
    }

    if &header[8..11] == b"mp4" {
        return true;
    }

    // 跳過 minor version，逐一檢查相容品牌
    (16..box_size)
        .step_by(4)
        .any(|offset| header.get(offset..offset + 3) == Some(b"mp4".as_slice()))
}

const fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
