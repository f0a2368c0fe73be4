//! 설정 관리 -- honeylens.toml 파싱 및 런타임 설정
//!
//! [`HoneylensConfig`]는 모든 섹션의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`HONEYLENS_ANALYSIS_MAX_FILE_SIZE=1048576` 형식)
//! 3. 설정 파일 (`honeylens.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), honeylens_core::error::HoneylensError> {
//! use honeylens_core::config::HoneylensConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = HoneylensConfig::load("honeylens.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = HoneylensConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, HoneylensError};

/// 파일 크기 상한 (4 GiB)
pub const MAX_FILE_SIZE_LIMIT: u64 = 4 * 1024 * 1024 * 1024;

/// 라인 길이 상한 (1 MiB)
pub const MAX_LINE_LENGTH_LIMIT: usize = 1024 * 1024;

/// Honeylens 통합 설정
///
/// `honeylens.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoneylensConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 분석 파이프라인 설정
    #[serde(default)]
    pub analysis: AnalysisSection,
    /// 사전 학습 아티팩트 경로
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
}

impl HoneylensConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, HoneylensError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값에서 시작하여 [`load`](Self::load)와 같은 처리를 합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, HoneylensError> {
        let path = path.as_ref();
        let mut config = match Self::from_file(path).await {
            Ok(config) => config,
            Err(HoneylensError::Config(ConfigError::FileNotFound { .. })) => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, HoneylensError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HoneylensError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                HoneylensError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, HoneylensError> {
        toml::from_str(toml_str).map_err(|e| {
            HoneylensError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `HONEYLENS_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "HONEYLENS_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "HONEYLENS_GENERAL_LOG_FORMAT");

        // Analysis
        override_u64(
            &mut self.analysis.max_file_size,
            "HONEYLENS_ANALYSIS_MAX_FILE_SIZE",
        );
        override_usize(
            &mut self.analysis.max_line_length,
            "HONEYLENS_ANALYSIS_MAX_LINE_LENGTH",
        );
        override_string(
            &mut self.analysis.message_marker,
            "HONEYLENS_ANALYSIS_MESSAGE_MARKER",
        );
        override_optional_string(&mut self.analysis.rules_path, "HONEYLENS_ANALYSIS_RULES_PATH");

        // Artifacts
        override_string(
            &mut self.artifacts.vectorizer_path,
            "HONEYLENS_ARTIFACTS_VECTORIZER_PATH",
        );
        override_string(&mut self.artifacts.model_path, "HONEYLENS_ARTIFACTS_MODEL_PATH");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), HoneylensError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.analysis.max_file_size == 0 || self.analysis.max_file_size > MAX_FILE_SIZE_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "analysis.max_file_size".to_owned(),
                reason: format!("must be 1-{MAX_FILE_SIZE_LIMIT}"),
            }
            .into());
        }

        if self.analysis.max_line_length == 0
            || self.analysis.max_line_length > MAX_LINE_LENGTH_LIMIT
        {
            return Err(ConfigError::InvalidValue {
                field: "analysis.max_line_length".to_owned(),
                reason: format!("must be 1-{MAX_LINE_LENGTH_LIMIT}"),
            }
            .into());
        }

        if self.analysis.message_marker.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "analysis.message_marker".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.artifacts.vectorizer_path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "artifacts.vectorizer_path".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.artifacts.model_path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "artifacts.model_path".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 분석 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// 입력 파일 최대 크기 (바이트)
    pub max_file_size: u64,
    /// 라인 최대 길이 (바이트), 초과 라인은 드롭
    pub max_line_length: usize,
    /// 메시지 시작을 나타내는 구조 마커
    pub message_marker: String,
    /// 사용자 정의 YAML 레이블 규칙 경로 (없으면 내장 캐스케이드)
    pub rules_path: Option<String>,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            max_file_size: 512 * 1024 * 1024, // 512MB
            max_line_length: 64 * 1024,       // 64KB
            message_marker: "/dionaea/".to_owned(),
            rules_path: None,
        }
    }
}

/// 사전 학습 아티팩트 경로
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// 카운트 벡터라이저 JSON 경로
    pub vectorizer_path: String,
    /// 선형 분류기 JSON 경로
    pub model_path: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            vectorizer_path: "vectorizer.json".to_owned(),
            model_path: "attack_model.json".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_optional_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = if val.is_empty() { None } else { Some(val) };
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
