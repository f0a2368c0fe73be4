//! 분석 파이프라인 에러 타입
//!
//! [`AnalysisError`]는 파싱, 레이블링, 인코딩/예측, 집계 중 발생하는 모든 에러를 표현합니다.
//! `From<AnalysisError> for HoneylensError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! # 전파 정책
//! - 라인 단위(`MalformedLine`), 파일 단위(`EmptyOrMissingFile`),
//!   날짜 집계 단위(`TimestampParse`) 에러는 그 자리에서 흡수되어 진단 정보로 남습니다.
//! - 아티팩트(`ArtifactLoad`)와 배치(`EncodePredict`) 에러는 호출자에게 전파됩니다.

use honeylens_core::error::{ArtifactError, ConfigError, HoneylensError, PipelineError};

/// 분석 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// 라인이 구조 패턴 중 하나 이상에 맞지 않음 (라인만 드롭)
    #[error("malformed line {line} in {source_name}: {reason}")]
    MalformedLine {
        /// 원본 파일 경로
        source_name: String,
        /// 라인 번호 (1부터)
        line: usize,
        /// 드롭 사유
        reason: String,
    },

    /// 입력 파일이 없거나, 비었거나, 읽을 수 없음 (해당 파일만 실패)
    #[error("empty or missing file {path}: {reason}")]
    EmptyOrMissingFile {
        /// 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 벡터라이저/분류기 로드 실패 (파이프라인 전체에 치명적)
    #[error("artifact load error: {path}: {reason}")]
    ArtifactLoad {
        /// 아티팩트 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 타임스탬프를 `DDMMYYYY HH:MM:SS`로 해석할 수 없음 (날짜 집계에서만 제외)
    #[error("timestamp parse error: '{timestamp}': {reason}")]
    TimestampParse {
        /// 원본 타임스탬프
        timestamp: String,
        /// 실패 사유
        reason: String,
    },

    /// 배치 인코딩/예측 실패 (현재 실행 중단)
    #[error(
        "{stage} failed on batch of {batch_size} records from [{}]: {reason}",
        sources.join(", ")
    )]
    EncodePredict {
        /// 실패한 단계 (encode, predict)
        stage: String,
        /// 배치 크기
        batch_size: usize,
        /// 배치에 레코드를 제공한 로그 파일 (입력 순서)
        sources: Vec<String>,
        /// 실패 사유
        reason: String,
    },

    /// 레이블 규칙 파일 로딩 실패
    #[error("rule load error: {path}: {reason}")]
    RuleLoad {
        /// 규칙 파일 경로
        path: String,
        /// 로딩 실패 사유
        reason: String,
    },

    /// 레이블 규칙 유효성 검증 실패
    #[error("rule validation error: rule '{rule_id}': {reason}")]
    RuleValidation {
        /// 문제가 된 규칙 ID
        rule_id: String,
        /// 검증 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<ArtifactError> for AnalysisError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::LoadFailed { path, reason } => Self::ArtifactLoad { path, reason },
            ArtifactError::Inference {
                stage,
                batch_size,
                reason,
            } => Self::EncodePredict {
                stage,
                batch_size,
                sources: Vec::new(),
                reason,
            },
        }
    }
}

impl AnalysisError {
    /// `EncodePredict`에 실패한 배치의 출처 파일을 붙입니다. 다른 변형은 그대로 둡니다.
    pub fn with_batch_sources(self, batch_sources: Vec<String>) -> Self {
        match self {
            Self::EncodePredict {
                stage,
                batch_size,
                reason,
                ..
            } => Self::EncodePredict {
                stage,
                batch_size,
                sources: batch_sources,
                reason,
            },
            other => other,
        }
    }
}

impl From<AnalysisError> for HoneylensError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::ArtifactLoad { path, reason } => {
                HoneylensError::Artifact(ArtifactError::LoadFailed { path, reason })
            }
            AnalysisError::EncodePredict {
                stage,
                batch_size,
                sources,
                reason,
            } => {
                let reason = if sources.is_empty() {
                    reason
                } else {
                    format!("{reason} (sources: {})", sources.join(", "))
                };
                HoneylensError::Artifact(ArtifactError::Inference {
                    stage,
                    batch_size,
                    reason,
                })
            }
            AnalysisError::Config { field, reason } => {
                HoneylensError::Config(ConfigError::InvalidValue { field, reason })
            }
            AnalysisError::Io(e) => HoneylensError::Io(e),
            other => HoneylensError::Pipeline(PipelineError::StageFailed {
                stage: "analysis".to_owned(),
                reason: other.to_string(),
            }),
        }
    }
}
