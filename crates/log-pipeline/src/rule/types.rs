//! 레이블 규칙 데이터 타입
//!
//! YAML 규칙 파일에서 역직렬화되는 구조체들을 정의합니다.

use serde::{Deserialize, Serialize};

use honeylens_core::types::AttackCategory;

use crate::error::AnalysisError;

/// 규칙 ID 최대 길이
const MAX_RULE_ID_LEN: usize = 128;

/// 규칙 조건절 -- 나열된 부분 문자열 중 하나라도 포함되면 참 (OR)
///
/// `service`와 `message` 목록은 같은 OR 그룹에 속합니다.
/// 예: `{service: [http], message: [http]}`는
/// "service 또는 message가 http를 포함"을 뜻합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleClause {
    /// 소문자 service에서 찾을 부분 문자열
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service: Vec<String>,
    /// 소문자 message에서 찾을 부분 문자열
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub message: Vec<String>,
}

impl RuleClause {
    /// service 쪽 조건만 가진 절
    pub fn service<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            service: needles.into_iter().map(Into::into).collect(),
            message: Vec::new(),
        }
    }

    /// message 쪽 조건만 가진 절
    pub fn message<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            service: Vec::new(),
            message: needles.into_iter().map(Into::into).collect(),
        }
    }

    /// service 조건을 추가합니다.
    pub fn or_service(mut self, needle: impl Into<String>) -> Self {
        self.service.push(needle.into());
        self
    }

    /// message 조건을 추가합니다.
    pub fn or_message(mut self, needle: impl Into<String>) -> Self {
        self.message.push(needle.into());
        self
    }

    /// 이미 소문자로 변환된 필드에 대해 평가합니다.
    pub fn matches(&self, service_lc: &str, message_lc: &str) -> bool {
        self.service.iter().any(|n| service_lc.contains(n.as_str()))
            || self.message.iter().any(|n| message_lc.contains(n.as_str()))
    }

    fn is_empty(&self) -> bool {
        self.service.is_empty() && self.message.is_empty()
    }

    fn normalize(&mut self) {
        for needle in self.service.iter_mut().chain(self.message.iter_mut()) {
            *needle = needle.to_lowercase();
        }
    }
}

/// 레이블 규칙 -- 모든 조건절이 참이면 `category`를 부여합니다 (AND)
///
/// # YAML 스키마
/// ```yaml
/// id: sql_injection
/// category: sql_injection
/// description: HTTP traffic carrying SQL keywords
/// when:
///   - service: [http]
///     message: [http]
///   - message: [sql, injection]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRule {
    /// 규칙 고유 ID
    pub id: String,
    /// 매칭 시 부여할 유형
    pub category: AttackCategory,
    /// 규칙 설명
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// 조건절 목록 (AND 결합)
    pub when: Vec<RuleClause>,
}

impl LabelRule {
    /// 새 규칙을 생성합니다.
    pub fn new(id: impl Into<String>, category: AttackCategory, when: Vec<RuleClause>) -> Self {
        Self {
            id: id.into(),
            category,
            description: String::new(),
            when,
        }
    }

    /// 설명을 지정합니다.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 이미 소문자로 변환된 필드에 대해 평가합니다.
    pub fn matches(&self, service_lc: &str, message_lc: &str) -> bool {
        self.when.iter().all(|c| c.matches(service_lc, message_lc))
    }

    /// 규칙의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.id.is_empty() {
            return Err(AnalysisError::RuleValidation {
                rule_id: "(empty)".to_owned(),
                reason: "rule id must not be empty".to_owned(),
            });
        }

        if self.id.len() > MAX_RULE_ID_LEN {
            return Err(AnalysisError::RuleValidation {
                rule_id: self.id.clone(),
                reason: format!("rule id must not exceed {MAX_RULE_ID_LEN} characters"),
            });
        }

        if self.when.is_empty() {
            return Err(AnalysisError::RuleValidation {
                rule_id: self.id.clone(),
                reason: "rule must have at least one clause".to_owned(),
            });
        }

        for (idx, clause) in self.when.iter().enumerate() {
            if clause.is_empty() {
                return Err(AnalysisError::RuleValidation {
                    rule_id: self.id.clone(),
                    reason: format!("clause {idx} has no service or message needles"),
                });
            }
            if clause
                .service
                .iter()
                .chain(clause.message.iter())
                .any(String::is_empty)
            {
                return Err(AnalysisError::RuleValidation {
                    rule_id: self.id.clone(),
                    reason: format!("clause {idx} contains an empty needle"),
                });
            }
        }

        Ok(())
    }

    /// 부분 문자열 비교가 대소문자를 무시하도록 needle을 소문자로 변환합니다.
    pub(crate) fn normalize(&mut self) {
        for clause in &mut self.when {
            clause.normalize();
        }
    }
}

/// 순서가 있는 규칙 목록과 기본 유형
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRuleSet {
    /// 우선순위 순 규칙 (앞쪽이 먼저 평가됨)
    pub rules: Vec<LabelRule>,
    /// 어떤 규칙도 매칭되지 않을 때의 유형
    #[serde(default = "default_fallback")]
    pub fallback: AttackCategory,
}

fn default_fallback() -> AttackCategory {
    AttackCategory::OtherAttack
}
