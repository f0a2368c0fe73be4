//! 에러 타입 -- 도메인별 에러 정의

/// Honeylens 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum HoneylensError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 사전 학습 아티팩트 에러
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 아티팩트(벡터라이저/분류기) 에러
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// 시작 시 로드 실패 (파일 없음, 손상, 스키마 불일치)
    #[error("failed to load artifact {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// 인코딩/예측 실패
    #[error("{stage} failed on batch of {batch_size}: {reason}")]
    Inference {
        stage: String,
        batch_size: usize,
        reason: String,
    },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 실행 중 단계 실패
    #[error("stage '{stage}' failed: {reason}")]
    StageFailed { stage: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_error_display_includes_path() {
        let err = ArtifactError::LoadFailed {
            path: "/opt/models/vectorizer.json".to_owned(),
            reason: "missing field `vocabulary`".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("vectorizer.json"));
        assert!(msg.contains("vocabulary"));
    }

    #[test]
    fn inference_error_display_includes_batch_size() {
        let err = ArtifactError::Inference {
            stage: "predict".to_owned(),
            batch_size: 42,
            reason: "width mismatch".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "predict failed on batch of 42: width mismatch"
        );
    }

    #[test]
    fn nested_errors_convert_into_top_level() {
        let err: HoneylensError = ConfigError::ParseFailed {
            reason: "bad toml".to_owned(),
        }
        .into();
        assert!(matches!(err, HoneylensError::Config(_)));

        let err: HoneylensError = PipelineError::StageFailed {
            stage: "analysis".to_owned(),
            reason: "row count mismatch".to_owned(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "pipeline error: stage 'analysis' failed: row count mismatch"
        );
    }
}
