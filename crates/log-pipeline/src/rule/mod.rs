//! 휴리스틱 레이블러 -- 키워드 캐스케이드로 공격 유형을 부여
//!
//! 각 [`LogRecord`]의 `service`와 `message`를 소문자로 바꾼 뒤 순서 있는
//! 규칙 목록을 앞에서부터 평가하고, 처음 매칭된 규칙의 유형을 부여합니다.
//! 아무 규칙도 매칭되지 않으면 fallback 유형(기본값 `Other Attack`)이 됩니다.
//! 레이블링은 전함수이며 실패하지 않습니다.
//!
//! # 규칙 형식
//! ```yaml
//! rules:
//!   - id: http_sql_injection
//!     category: sql_injection
//!     when:
//!       - service: [http]
//!         message: [http]
//!       - message: [sql, injection]
//! fallback: other_attack
//! ```
//! 조건절 내부는 OR, 조건절 사이는 AND입니다.
//!
//! # 아키텍처
//! - [`HeuristicLabeler`]: 규칙 평가 코디네이터
//! - [`builtin`]: 내장 캐스케이드
//! - [`loader`]: YAML 파일 로딩 및 유효성 검증
//! - [`types`]: 규칙 데이터 구조 정의

pub mod builtin;
pub mod loader;
pub mod types;

pub use builtin::builtin_rule_set;
pub use loader::RuleLoader;
pub use types::{LabelRule, LabelRuleSet, RuleClause};

use std::path::Path;

use honeylens_core::metrics as names;
use honeylens_core::types::{AttackCategory, LabeledRecord, LogRecord};

use crate::error::AnalysisError;

/// 레이블링 결과와 근거 규칙
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict<'a> {
    /// 부여된 유형
    pub category: AttackCategory,
    /// 매칭된 규칙 ID (`None`이면 fallback)
    pub rule_id: Option<&'a str>,
}

/// 휴리스틱 레이블러
///
/// 생성 후에는 불변이므로 여러 스레드에서 공유할 수 있습니다.
///
/// # 사용 예시
/// ```ignore
/// let labeler = HeuristicLabeler::new();
/// let category = labeler.label(&record);
/// ```
#[derive(Debug, Clone)]
pub struct HeuristicLabeler {
    rules: Vec<LabelRule>,
    fallback: AttackCategory,
}

impl Default for HeuristicLabeler {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicLabeler {
    /// 내장 캐스케이드로 레이블러를 생성합니다.
    pub fn new() -> Self {
        let set = builtin_rule_set();
        Self {
            rules: set.rules,
            fallback: set.fallback,
        }
    }

    /// 사용자 정의 규칙 세트로 레이블러를 생성합니다.
    ///
    /// 세트는 다시 검증되고 needle은 소문자로 정규화됩니다.
    pub fn from_rule_set(mut set: LabelRuleSet) -> Result<Self, AnalysisError> {
        RuleLoader::validate_set(&set, "(in-memory)")?;
        for rule in &mut set.rules {
            rule.normalize();
        }
        Ok(Self {
            rules: set.rules,
            fallback: set.fallback,
        })
    }

    /// YAML 규칙 파일로 레이블러를 생성합니다.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let set = RuleLoader::load_file(path)?;
        Ok(Self {
            rules: set.rules,
            fallback: set.fallback,
        })
    }

    /// 평가 순서대로 규칙 목록을 반환합니다.
    pub fn rules(&self) -> &[LabelRule] {
        &self.rules
    }

    /// fallback 유형을 반환합니다.
    pub fn fallback(&self) -> AttackCategory {
        self.fallback
    }

    /// 레코드 하나에 유형을 부여합니다.
    pub fn label(&self, record: &LogRecord) -> AttackCategory {
        self.explain(record).category
    }

    /// 유형과 함께 매칭된 규칙 ID를 반환합니다.
    pub fn explain(&self, record: &LogRecord) -> Verdict<'_> {
        self.explain_fields(&record.service, &record.message)
    }

    /// 원시 service/message 문자열로 평가합니다.
    pub fn explain_fields(&self, service: &str, message: &str) -> Verdict<'_> {
        let service_lc = service.to_lowercase();
        let message_lc = message.to_lowercase();

        self.rules
            .iter()
            .find(|rule| rule.matches(&service_lc, &message_lc))
            .map_or(
                Verdict {
                    category: self.fallback,
                    rule_id: None,
                },
                |rule| Verdict {
                    category: rule.category,
                    rule_id: Some(rule.id.as_str()),
                },
            )
    }

    /// 레코드 목록 전체에 유형을 부여합니다. 순서와 개수가 보존됩니다.
    pub fn label_all(&self, records: Vec<LogRecord>) -> Vec<LabeledRecord> {
        records
            .into_iter()
            .map(|record| {
                let category = self.label(&record);
                metrics::counter!(
                    names::ANALYSIS_HEURISTIC_LABELS_TOTAL,
                    names::LABEL_CATEGORY => category.label()
                )
                .increment(1);
                LabeledRecord::new(record, category)
            })
            .collect()
    }
}
