//! 사전 학습 아티팩트 -- JSON 벡터라이저와 선형 분류기
//!
//! 두 아티팩트 모두 시작 시 한 번 로드되어 읽기 전용으로 공유됩니다.
//! 로드 실패(파일 없음, 손상, 스키마 불일치)는 [`AnalysisError::ArtifactLoad`]로,
//! 실행 중 실패(폭 불일치, 비유한 점수)는 [`ArtifactError::Inference`]로 보고됩니다.
//!
//! [`ArtifactError::Inference`]: honeylens_core::error::ArtifactError::Inference

pub mod classifier;
pub mod vectorizer;

pub use classifier::LinearClassifier;
pub use vectorizer::CountVectorizer;

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::AnalysisError;

/// 아티팩트 파일 최대 크기
const MAX_ARTIFACT_FILE_SIZE: u64 = 256 * 1024 * 1024; // 256MB

/// JSON 아티팩트 파일을 읽어 역직렬화합니다.
pub(crate) fn read_json_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, AnalysisError> {
    let load_failed = |reason: String| AnalysisError::ArtifactLoad {
        path: path.display().to_string(),
        reason,
    };

    let metadata =
        std::fs::metadata(path).map_err(|e| load_failed(format!("failed to read metadata: {e}")))?;

    if !metadata.is_file() {
        return Err(load_failed("not a regular file".to_owned()));
    }

    if metadata.len() > MAX_ARTIFACT_FILE_SIZE {
        return Err(load_failed(format!(
            "file too large: {} bytes (max: {MAX_ARTIFACT_FILE_SIZE})",
            metadata.len()
        )));
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| load_failed(format!("failed to read file: {e}")))?;

    serde_json::from_str(&content).map_err(|e| load_failed(format!("invalid artifact JSON: {e}")))
}
