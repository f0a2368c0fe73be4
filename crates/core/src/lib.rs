//! Honeylens 공통 크레이트
//!
//! 허니팟 로그 분석 워크스페이스 전체가 공유하는 타입, trait, 에러, 설정을 정의합니다.
//!
//! - [`types`]: `LogRecord`, `LabeledRecord`, `AttackCategory`, `FeatureMatrix`
//! - [`pipeline`]: 사전 학습 아티팩트 확장 포인트 (`TextFeatureEncoder`, `AttackClassifier`)
//! - [`config`]: `honeylens.toml` 로딩 및 환경변수 오버라이드
//! - [`error`]: 최상위 에러 타입
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ArtifactError, ConfigError, HoneylensError, PipelineError};

// 설정
pub use config::HoneylensConfig;

// 파이프라인 trait
pub use pipeline::{AttackClassifier, TextFeatureEncoder};

// 도메인 타입
pub use types::{AttackCategory, FeatureMatrix, LabeledRecord, LogRecord, ShapeError};
