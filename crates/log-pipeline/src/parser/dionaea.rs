//! dionaea 허니팟 로그 라인 파서
//!
//! # 라인 형식
//! ```text
//! [DDMMYYYY HH:MM:SS] <service> ... /dionaea/<message...>
//! ```
//! 라인 어디에든 ANSI 색상 이스케이프가 섞여 있을 수 있습니다.
//!
//! # 처리 순서
//! 1. ANSI 이스케이프 제거 (`ESC [` + `[0-9;]*` + 영문자 1개)
//! 2. 타임스탬프: `[` + 숫자 8개 + 공백 + `HH:MM:SS` + `]`의 첫 매칭, 대괄호 제거
//! 3. 서비스: `]` 뒤 공백 다음의 첫 단어 토큰
//! 4. 메시지: 구조 마커(`/dionaea/`)부터 라인 끝까지
//!
//! 세 패턴이 모두 매칭되어야 레코드가 생성됩니다. 하나라도 실패하면
//! 라인은 드롭됩니다 (원시 로그에서 흔한 잡음이므로 에러가 아닙니다).
//!
//! # 사용 예시
//! ```ignore
//! use honeylens_log_pipeline::parser::DionaeaLineParser;
//!
//! let parser = DionaeaLineParser::new()?;
//! let record = parser.parse_line("[01012024 10:00:00] httpd GET /dionaea/index")?;
//! assert_eq!(record.service, "httpd");
//! ```

use std::borrow::Cow;
use std::path::Path;

use regex::Regex;

use honeylens_core::metrics as names;
use honeylens_core::types::LogRecord;

use super::{FileParseStats, LineRejection, ParsedFile};
use crate::error::AnalysisError;

const ANSI_ESCAPE_PATTERN: &str = r"\x1b\[[0-9;]*[a-zA-Z]";
const TIMESTAMP_PATTERN: &str = r"\[(\d{8}\s+\d{2}:\d{2}:\d{2})\]";
const SERVICE_PATTERN: &str = r"\]\s+(\w+)";

/// 기본 구조 마커
pub const DEFAULT_MESSAGE_MARKER: &str = "/dionaea/";

/// 기본 최대 라인 길이 (바이트)
const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// dionaea 로그 라인 파서
///
/// 정규식은 생성 시 한 번 컴파일되며, 파싱 메서드는 모두 `&self`만 받으므로
/// 같은 파서를 여러 라인/파일에 재사용할 수 있습니다.
#[derive(Debug, Clone)]
pub struct DionaeaLineParser {
    ansi: Regex,
    timestamp: Regex,
    service: Regex,
    message: Regex,
    max_line_length: usize,
}

impl DionaeaLineParser {
    /// 기본 마커(`/dionaea/`)로 파서를 생성합니다.
    pub fn new() -> Result<Self, AnalysisError> {
        Self::with_marker(DEFAULT_MESSAGE_MARKER)
    }

    /// 사용자 지정 구조 마커로 파서를 생성합니다.
    ///
    /// 마커는 정규식이 아닌 리터럴로 취급됩니다.
    pub fn with_marker(marker: &str) -> Result<Self, AnalysisError> {
        if marker.is_empty() {
            return Err(AnalysisError::Config {
                field: "message_marker".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        Ok(Self {
            ansi: Regex::new(ANSI_ESCAPE_PATTERN)?,
            timestamp: Regex::new(TIMESTAMP_PATTERN)?,
            service: Regex::new(SERVICE_PATTERN)?,
            message: Regex::new(&format!("{}.*", regex::escape(marker)))?,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        })
    }

    /// 최대 라인 길이를 설정합니다.
    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }

    /// ANSI 이스케이프 시퀀스를 제거합니다. 없으면 원본을 빌려 반환합니다.
    pub fn strip_ansi<'a>(&self, line: &'a str) -> Cow<'a, str> {
        self.ansi.replace_all(line, "")
    }

    /// 한 라인을 파싱합니다.
    pub fn parse_line(&self, line: &str) -> Result<LogRecord, LineRejection> {
        if line.len() > self.max_line_length {
            return Err(LineRejection::TooLong {
                length: line.len(),
                max: self.max_line_length,
            });
        }

        let line = line.trim_end_matches(['\r', '\n']);
        let cleaned = self.strip_ansi(line);

        let timestamp = self
            .timestamp
            .captures(&cleaned)
            .and_then(|c| c.get(1))
            .ok_or(LineRejection::MissingTimestamp)?;
        let service = self
            .service
            .captures(&cleaned)
            .and_then(|c| c.get(1))
            .ok_or(LineRejection::MissingService)?;
        let message = self
            .message
            .find(&cleaned)
            .ok_or(LineRejection::MissingMessage)?;

        Ok(LogRecord::new(
            timestamp.as_str(),
            service.as_str(),
            message.as_str(),
        ))
    }

    /// 라인 목록을 순서대로 파싱합니다.
    ///
    /// 드롭된 라인은 `debug` 로그와 통계로만 남습니다.
    pub fn parse_lines<'a, I>(&self, source: &str, lines: I) -> ParsedFile
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut records = Vec::new();
        let mut stats = FileParseStats::new(source);

        for (idx, line) in lines.into_iter().enumerate() {
            let line_number = idx + 1;
            stats.lines_read += 1;

            match self.parse_line(line) {
                Ok(record) => records.push(record.with_origin(source, line_number)),
                Err(rejection) => {
                    stats.record_rejection(&rejection);
                    let err = AnalysisError::MalformedLine {
                        source_name: source.to_owned(),
                        line: line_number,
                        reason: rejection.to_string(),
                    };
                    tracing::debug!(error = %err, "dropping line");
                }
            }
        }

        stats.records = records.len();

        metrics::counter!(names::ANALYSIS_LINES_READ_TOTAL).increment(stats.lines_read as u64);
        metrics::counter!(names::ANALYSIS_LINES_DROPPED_TOTAL).increment(stats.dropped as u64);
        metrics::counter!(names::ANALYSIS_RECORDS_PARSED_TOTAL).increment(stats.records as u64);

        ParsedFile { records, stats }
    }

    /// 파일을 읽어 파싱합니다.
    ///
    /// # Errors
    /// 파일이 없거나, 비었거나, `max_file_size`를 넘거나, 읽을 수 없으면
    /// [`AnalysisError::EmptyOrMissingFile`]을 반환합니다.
    pub fn parse_file(
        &self,
        path: impl AsRef<Path>,
        max_file_size: u64,
    ) -> Result<ParsedFile, AnalysisError> {
        let path = path.as_ref();
        let content = super::read_log_file(path, max_file_size)?;
        let source = path.display().to_string();

        let parsed = self.parse_lines(&source, super::split_lines(&content));
        tracing::debug!(
            path = %source,
            lines = parsed.stats.lines_read,
            records = parsed.stats.records,
            dropped = parsed.stats.dropped,
            "parsed log file"
        );
        Ok(parsed)
    }
}
