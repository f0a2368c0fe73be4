//! 로그 파싱 모듈 -- 원시 텍스트 라인을 [`LogRecord`](honeylens_core::types::LogRecord)로 변환
//!
//! 파싱은 순수 변환입니다. 입력 순서가 출력 순서가 되며, 각 라인은
//! 이웃 라인과 무관하게 처리됩니다.
//!
//! # 지원 형식
//! - dionaea 허니팟 텍스트 로그 ([`DionaeaLineParser`])

pub mod dionaea;

pub use dionaea::{DEFAULT_MESSAGE_MARKER, DionaeaLineParser};

use std::path::Path;

use serde::Serialize;

use honeylens_core::types::LogRecord;

use crate::error::AnalysisError;

/// 라인이 드롭된 이유
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineRejection {
    /// 최대 길이 초과
    #[error("line too long: {length} bytes (max: {max})")]
    TooLong { length: usize, max: usize },

    /// 타임스탬프 패턴 불일치
    #[error("missing timestamp")]
    MissingTimestamp,

    /// 서비스 토큰 없음
    #[error("missing service token")]
    MissingService,

    /// 메시지 마커 없음
    #[error("missing message marker")]
    MissingMessage,
}

/// 파일 하나의 파싱 통계
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileParseStats {
    /// 파일 경로
    pub path: String,
    /// 읽은 라인 수
    pub lines_read: usize,
    /// 생성된 레코드 수
    pub records: usize,
    /// 드롭된 라인 수
    pub dropped: usize,
    /// 드롭 사유별 수
    pub too_long: usize,
    pub missing_timestamp: usize,
    pub missing_service: usize,
    pub missing_message: usize,
}

impl FileParseStats {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    fn record_rejection(&mut self, rejection: &LineRejection) {
        self.dropped += 1;
        match rejection {
            LineRejection::TooLong { .. } => self.too_long += 1,
            LineRejection::MissingTimestamp => self.missing_timestamp += 1,
            LineRejection::MissingService => self.missing_service += 1,
            LineRejection::MissingMessage => self.missing_message += 1,
        }
    }
}

/// 파일 하나의 파싱 결과
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub records: Vec<LogRecord>,
    pub stats: FileParseStats,
}

/// 로그 파일 전체를 문자열로 읽습니다.
///
/// 유효하지 않은 UTF-8 바이트는 대체 문자로 변환됩니다.
pub(crate) fn read_log_file(path: &Path, max_file_size: u64) -> Result<String, AnalysisError> {
    let empty_or_missing = |reason: String| AnalysisError::EmptyOrMissingFile {
        path: path.display().to_string(),
        reason,
    };

    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            empty_or_missing("file not found".to_owned())
        } else {
            empty_or_missing(format!("failed to read file metadata: {e}"))
        }
    })?;

    if !metadata.is_file() {
        return Err(empty_or_missing("not a regular file".to_owned()));
    }

    if metadata.len() == 0 {
        return Err(empty_or_missing("file is empty".to_owned()));
    }

    if metadata.len() > max_file_size {
        return Err(empty_or_missing(format!(
            "file too large: {} bytes (max: {max_file_size})",
            metadata.len()
        )));
    }

    let bytes =
        std::fs::read(path).map_err(|e| empty_or_missing(format!("failed to read file: {e}")))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// `\n`, `\r\n`, 단독 `\r`를 모두 줄바꿈으로 보고 라인을 나눕니다.
///
/// [`str::lines`]와 같이 마지막 줄바꿈 뒤의 빈 라인은 만들지 않습니다.
pub(crate) fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(content);
    std::iter::from_fn(move || {
        let current = rest.take().filter(|r| !r.is_empty())?;
        match current.find(['\r', '\n']) {
            Some(idx) => {
                let brk = if current[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = Some(&current[idx + brk..]);
                Some(&current[..idx])
            }
            None => Some(current),
        }
    })
}
