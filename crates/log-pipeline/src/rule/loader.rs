//! 규칙 파일 로더 -- YAML 레이블 규칙 세트를 디스크에서 로드합니다.
//!
//! 파일 하나가 순서 있는 규칙 세트 하나입니다. 파일 크기, 규칙 수,
//! 규칙 ID 중복을 검사하며 어느 하나라도 실패하면 세트 전체를 거부합니다.

use std::collections::HashSet;
use std::path::Path;

use crate::error::AnalysisError;

use super::types::LabelRuleSet;

/// 규칙 파일 최대 크기
const MAX_RULE_FILE_SIZE: u64 = 1024 * 1024; // 1MB
/// 세트당 최대 규칙 수
pub const MAX_RULES_COUNT: usize = 1_000;

/// 규칙 파일 로더
pub struct RuleLoader;

impl RuleLoader {
    /// 단일 YAML 파일에서 규칙 세트를 로드합니다.
    ///
    /// # Errors
    /// - 파일을 읽을 수 없거나 `MAX_RULE_FILE_SIZE`를 초과하는 경우
    /// - YAML 파싱 또는 규칙 검증에 실패한 경우
    pub fn load_file(path: impl AsRef<Path>) -> Result<LabelRuleSet, AnalysisError> {
        let path = path.as_ref();

        let metadata = std::fs::metadata(path).map_err(|e| AnalysisError::RuleLoad {
            path: path.display().to_string(),
            reason: format!("failed to read file metadata: {e}"),
        })?;

        if metadata.len() > MAX_RULE_FILE_SIZE {
            return Err(AnalysisError::RuleLoad {
                path: path.display().to_string(),
                reason: format!(
                    "file too large: {} bytes (max: {MAX_RULE_FILE_SIZE})",
                    metadata.len()
                ),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| AnalysisError::RuleLoad {
            path: path.display().to_string(),
            reason: format!("failed to read file: {e}"),
        })?;

        let set = Self::parse_yaml(&content, &path.display().to_string())?;

        tracing::info!(
            path = %path.display(),
            count = set.rules.len(),
            fallback = %set.fallback,
            "loaded label rules"
        );

        Ok(set)
    }

    /// YAML 문자열을 파싱하여 규칙 세트를 생성합니다.
    ///
    /// 반환된 세트의 needle은 모두 소문자로 정규화되어 있습니다.
    pub fn parse_yaml(yaml_str: &str, source: &str) -> Result<LabelRuleSet, AnalysisError> {
        let mut set: LabelRuleSet =
            serde_yaml::from_str(yaml_str).map_err(|e| AnalysisError::RuleLoad {
                path: source.to_owned(),
                reason: format!("YAML parse error: {e}"),
            })?;

        Self::validate_set(&set, source)?;

        for rule in &mut set.rules {
            rule.normalize();
        }

        Ok(set)
    }

    /// 규칙 세트 전체를 검증합니다.
    pub fn validate_set(set: &LabelRuleSet, source: &str) -> Result<(), AnalysisError> {
        if set.rules.len() > MAX_RULES_COUNT {
            return Err(AnalysisError::RuleLoad {
                path: source.to_owned(),
                reason: format!("too many rules: max {MAX_RULES_COUNT}"),
            });
        }

        let mut seen_ids = HashSet::new();
        for rule in &set.rules {
            rule.validate()?;
            if !seen_ids.insert(rule.id.as_str()) {
                return Err(AnalysisError::RuleValidation {
                    rule_id: rule.id.clone(),
                    reason: "duplicate rule id".to_owned(),
                });
            }
        }

        if set.rules.is_empty() {
            tracing::warn!(
                source,
                fallback = %set.fallback,
                "rule set has no rules, every record gets the fallback category"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use honeylens_core::types::AttackCategory;
    use std::io::Write;

    #[test]
    fn parse_valid_yaml() {
        let yaml = r#"
rules:
  - id: telnet
    category: other_attack
    description: Telnet probes
    when:
      - service: [Telnet]
  - id: smb_download
    category: malware_download
    when:
      - service: [smb]
      - message: [download, payload]
fallback: http_attack
"#;
        let set = RuleLoader::parse_yaml(yaml, "test.yml").unwrap();
        assert_eq!(set.rules.len(), 2);
        assert_eq!(set.rules[0].id, "telnet");
        assert_eq!(set.rules[0].when[0].service, vec!["telnet"]);
        assert_eq!(set.rules[1].category, AttackCategory::MalwareDownload);
        assert_eq!(set.rules[1].when.len(), 2);
        assert_eq!(set.fallback, AttackCategory::HttpAttack);
    }

    #[test]
    fn parse_invalid_yaml_returns_error() {
        let yaml = "not: [valid: yaml: {{{";
        let result = RuleLoader::parse_yaml(yaml, "bad.yml");
        assert!(matches!(result, Err(AnalysisError::RuleLoad { .. })));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let yaml = r#"
rules:
  - id: x
    category: port_scan
    when:
      - service: [x]
"#;
        assert!(RuleLoader::parse_yaml(yaml, "cat.yml").is_err());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let yaml = r#"
rules:
  - id: dup
    category: ftp_attack
    when:
      - service: [ftp]
  - id: dup
    category: ssh_attack
    when:
      - service: [ssh]
"#;
        let err = RuleLoader::parse_yaml(yaml, "dup.yml").unwrap_err();
        assert!(err.to_string().contains("duplicate rule id"));
    }

    #[test]
    fn empty_clause_is_rejected() {
        let yaml = r#"
rules:
  - id: empty
    category: ftp_attack
    when:
      - {}
"#;
        assert!(matches!(
            RuleLoader::parse_yaml(yaml, "empty.yml"),
            Err(AnalysisError::RuleValidation { .. })
        ));
    }

    #[test]
    fn too_many_rules_are_rejected() {
        let mut yaml = String::from("rules:\n");
        for i in 0..=MAX_RULES_COUNT {
            yaml.push_str(&format!(
                "  - id: r{i}\n    category: other_attack\n    when:\n      - service: [s{i}]\n"
            ));
        }
        let err = RuleLoader::parse_yaml(&yaml, "many.yml").unwrap_err();
        assert!(err.to_string().contains("too many rules"));
    }

    #[test]
    fn load_file_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "rules:\n  - id: dns\n    category: dns_attack\n    when:\n      - message: [dns]"
        )
        .unwrap();
        let set = RuleLoader::load_file(file.path()).unwrap();
        assert_eq!(set.rules.len(), 1);
        assert_eq!(set.fallback, AttackCategory::OtherAttack);
    }

    #[test]
    fn load_nonexistent_file_returns_error() {
        let result = RuleLoader::load_file("/nonexistent/path/rules.yml");
        assert!(matches!(result, Err(AnalysisError::RuleLoad { .. })));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let padding = vec![b'#'; (MAX_RULE_FILE_SIZE + 1) as usize];
        file.write_all(&padding).unwrap();
        let err = RuleLoader::load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("file too large"));
    }
}
