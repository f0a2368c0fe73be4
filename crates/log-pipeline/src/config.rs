//! 분석 파이프라인 설정
//!
//! [`AnalysisConfig`]는 core의 [`AnalysisSection`](honeylens_core::config::AnalysisSection)을
//! 기반으로 파이프라인 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use honeylens_core::config::HoneylensConfig;
//! use honeylens_log_pipeline::config::AnalysisConfig;
//!
//! let core_config = HoneylensConfig::default();
//! let config = AnalysisConfig::from_core(&core_config.analysis);
//! ```

use serde::{Deserialize, Serialize};

use honeylens_core::config::{MAX_FILE_SIZE_LIMIT, MAX_LINE_LENGTH_LIMIT};

use crate::error::AnalysisError;

/// 분석 파이프라인 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// 입력 파일 최대 크기 (바이트)
    pub max_file_size: u64,
    /// 라인 최대 길이 (바이트)
    pub max_line_length: usize,
    /// 메시지 시작 구조 마커
    pub message_marker: String,
    /// 사용자 정의 YAML 레이블 규칙 경로
    pub rules_path: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::from_core(&honeylens_core::config::AnalysisSection::default())
    }
}

impl AnalysisConfig {
    /// core의 `AnalysisSection`에서 파이프라인 설정을 생성합니다.
    pub fn from_core(core: &honeylens_core::config::AnalysisSection) -> Self {
        Self {
            max_file_size: core.max_file_size,
            max_line_length: core.max_line_length,
            message_marker: core.message_marker.clone(),
            rules_path: core.rules_path.clone(),
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.max_file_size == 0 || self.max_file_size > MAX_FILE_SIZE_LIMIT {
            return Err(AnalysisError::Config {
                field: "max_file_size".to_owned(),
                reason: format!("must be 1-{MAX_FILE_SIZE_LIMIT}"),
            });
        }

        if self.max_line_length == 0 || self.max_line_length > MAX_LINE_LENGTH_LIMIT {
            return Err(AnalysisError::Config {
                field: "max_line_length".to_owned(),
                reason: format!("must be 1-{MAX_LINE_LENGTH_LIMIT}"),
            });
        }

        if self.message_marker.is_empty() {
            return Err(AnalysisError::Config {
                field: "message_marker".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.message_marker.contains(['\n', '\r']) {
            return Err(AnalysisError::Config {
                field: "message_marker".to_owned(),
                reason: "must not contain line breaks".to_owned(),
            });
        }

        if matches!(&self.rules_path, Some(path) if path.is_empty()) {
            return Err(AnalysisError::Config {
                field: "rules_path".to_owned(),
                reason: "must not be empty when set".to_owned(),
            });
        }

        Ok(())
    }
}

/// 분석 설정 빌더
#[derive(Default)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 파일 최대 크기를 설정합니다.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    /// 라인 최대 길이를 설정합니다.
    pub fn max_line_length(mut self, bytes: usize) -> Self {
        self.config.max_line_length = bytes;
        self
    }

    /// 메시지 마커를 설정합니다.
    pub fn message_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.message_marker = marker.into();
        self
    }

    /// 레이블 규칙 경로를 설정합니다.
    pub fn rules_path(mut self, path: impl Into<String>) -> Self {
        self.config.rules_path = Some(path.into());
        self
    }

    /// 설정을 검증하고 `AnalysisConfig`를 생성합니다.
    pub fn build(self) -> Result<AnalysisConfig, AnalysisError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        AnalysisConfig::default().validate().unwrap();
    }

    #[test]
    fn from_core_preserves_values() {
        let core = honeylens_core::config::AnalysisSection {
            max_file_size: 1024,
            max_line_length: 256,
            message_marker: "/honeypot/".to_owned(),
            rules_path: Some("/etc/honeylens/rules.yml".to_owned()),
        };
        let config = AnalysisConfig::from_core(&core);
        assert_eq!(config.max_file_size, 1024);
        assert_eq!(config.max_line_length, 256);
        assert_eq!(config.message_marker, "/honeypot/");
        assert_eq!(config.rules_path.as_deref(), Some("/etc/honeylens/rules.yml"));
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let config = AnalysisConfig {
            max_file_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            max_line_length: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_multiline_marker() {
        let config = AnalysisConfig {
            message_marker: "/dionaea/\n".to_owned(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_creates_valid_config() {
        let config = AnalysisConfigBuilder::new()
            .max_file_size(4096)
            .max_line_length(512)
            .rules_path("/custom/rules.yml")
            .build()
            .unwrap();
        assert_eq!(config.max_file_size, 4096);
        assert_eq!(config.max_line_length, 512);
        assert_eq!(config.message_marker, "/dionaea/");
        assert_eq!(config.rules_path.as_deref(), Some("/custom/rules.yml"));
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let result = AnalysisConfigBuilder::new().message_marker("").build();
        assert!(result.is_err());
    }
}
