//! 파이프라인 trait -- 사전 학습 아티팩트 확장 포인트 정의
//!
//! 벡터라이저와 분류기는 코어 입장에서 불투명한 예측 서비스입니다.
//! 시작 시 한 번 로드되어 `Arc<dyn ...>`로 파이프라인에 주입되고,
//! 이후에는 읽기 전용으로만 사용됩니다.

use crate::error::ArtifactError;
use crate::types::{AttackCategory, FeatureMatrix};

/// 메시지 문자열을 고정 폭 특징 벡터로 변환하는 trait
///
/// 어휘는 아티팩트 로드 시점에 고정됩니다. 보지 못한 토큰은 아무 신호도 주지 않습니다.
pub trait TextFeatureEncoder: Send + Sync {
    /// 인코더 이름 (로그/진단용)
    fn name(&self) -> &str;

    /// 출력 특징 벡터의 폭
    fn width(&self) -> usize;

    /// 메시지 배치를 인코딩합니다. 출력 행 순서는 입력 순서와 같습니다.
    fn encode(&self, messages: &[&str]) -> Result<FeatureMatrix, ArtifactError>;
}

/// 특징 행렬의 각 행에 공격 유형을 예측하는 trait
pub trait AttackClassifier: Send + Sync {
    /// 분류기 이름 (로그/진단용)
    fn name(&self) -> &str;

    /// 입력 행렬이 가져야 하는 폭
    fn expected_width(&self) -> usize;

    /// 행마다 정확히 하나의 유형을 순서대로 반환합니다.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<AttackCategory>, ArtifactError>;
}
