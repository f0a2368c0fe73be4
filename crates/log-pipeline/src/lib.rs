//! Honeylens 분석 파이프라인
//!
//! dionaea 허니팟 텍스트 로그를 구조화된 레코드로 추출하고, 두 가지 독립된
//! 경로(휴리스틱 규칙 캐스케이드와 사전 학습 분류기)로 공격 유형을 부여한 뒤
//! 결과를 집계합니다.
//!
//! # 모듈 구성
//!
//! - [`parser`]: dionaea 로그 라인 파서 (ANSI 제거, 타임스탬프/서비스/메시지 추출)
//! - [`rule`]: 휴리스틱 레이블러 (내장 캐스케이드 + YAML 규칙 세트)
//! - [`model`]: JSON 아티팩트 기반 카운트 벡터라이저와 선형 분류기
//! - [`aggregate`]: 유형별/날짜별 집계
//! - [`pipeline`]: 전체 파이프라인 오케스트레이션
//! - [`config`]: 파이프라인 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! files -> DionaeaLineParser -> HeuristicLabeler -> CountVectorizer -> LinearClassifier -> ResultAggregator
//!              |                      |                   |                  |
//!        ANSI strip + regex     ordered rules       vocabulary.json    attack_model.json
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod rule;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{
    AnalysisPipeline, AnalysisPipelineBuilder, AnalysisRun, FileFailure, HeuristicView,
    NoopProgress, ProgressSink, Stage,
};

// 설정
pub use config::{AnalysisConfig, AnalysisConfigBuilder};

// 에러
pub use error::AnalysisError;

// 파서
pub use parser::{DionaeaLineParser, FileParseStats, LineRejection, ParsedFile};

// 레이블러
pub use rule::{HeuristicLabeler, LabelRule, LabelRuleSet, RuleClause, RuleLoader, Verdict};

// 아티팩트
pub use model::{CountVectorizer, LinearClassifier};

// 집계
pub use aggregate::{
    AggregateReport, AgreementStats, CategoryCount, DateCategoryCount, ResultAggregator,
    TimestampAnomaly,
};
