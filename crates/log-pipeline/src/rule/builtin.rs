//! 내장 휴리스틱 캐스케이드
//!
//! 순서가 곧 우선순위입니다. HTTP 분기는 SQL 인젝션, XSS, 일반 HTTP 순의
//! 세 규칙으로 펼쳐져 있으며, 이후 FTP, SIP/PPTP, SSH, DNS, log_sqlite,
//! 악성코드 다운로드 순으로 평가됩니다. 겹치는 키워드가 있어도 순서를 바꾸지
//! 않습니다 (예: "brute"와 "dns"가 함께 있으면 SSH).

use honeylens_core::types::AttackCategory;

use super::types::{LabelRule, LabelRuleSet, RuleClause};

fn http_clause() -> RuleClause {
    RuleClause::service(["http"]).or_message("http")
}

/// 내장 캐스케이드 규칙 세트
pub fn builtin_rule_set() -> LabelRuleSet {
    let rules = vec![
        LabelRule::new(
            "http_sql_injection",
            AttackCategory::SqlInjection,
            vec![http_clause(), RuleClause::message(["sql", "injection"])],
        )
        .with_description("HTTP traffic carrying SQL keywords"),
        LabelRule::new(
            "http_cross_site_scripting",
            AttackCategory::CrossSiteScripting,
            vec![http_clause(), RuleClause::message(["xss", "script"])],
        )
        .with_description("HTTP traffic carrying script payloads"),
        LabelRule::new("http", AttackCategory::HttpAttack, vec![http_clause()])
            .with_description("any other HTTP traffic"),
        LabelRule::new(
            "ftp",
            AttackCategory::FtpAttack,
            vec![RuleClause::service(["ftp"]).or_message("ftp")],
        )
        .with_description("FTP service activity"),
        LabelRule::new(
            "sip_pptp",
            AttackCategory::SipAttack,
            vec![RuleClause::service(["sip", "pptp"]).or_message("pptp")],
        )
        .with_description("SIP or PPTP signalling"),
        LabelRule::new(
            "ssh_brute",
            AttackCategory::SshAttack,
            vec![RuleClause::service(["ssh"]).or_message("brute")],
        )
        .with_description("SSH service or brute-force attempts"),
        LabelRule::new(
            "dns",
            AttackCategory::DnsAttack,
            vec![RuleClause::service(["dns"]).or_message("dns")],
        )
        .with_description("DNS service activity"),
        LabelRule::new(
            "log_sqlite",
            AttackCategory::LogSqliteAttack,
            vec![RuleClause::service(["log_sqlite"]).or_message("log_sqlite")],
        )
        .with_description("dionaea log_sqlite events"),
        LabelRule::new(
            "malware_download",
            AttackCategory::MalwareDownload,
            vec![RuleClause::message(["download", "malware"])],
        )
        .with_description("payload downloads"),
    ];

    LabelRuleSet {
        rules,
        fallback: AttackCategory::OtherAttack,
    }
}
