//! 통합 테스트 -- 파이프라인 전체 흐름 검증
//!
//! 로그 파일 읽기부터 집계 보고서까지, 실제 JSON 아티팩트를 디스크에서
//! 로드하여 전체 파이프라인을 검증합니다.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use honeylens_core::error::ArtifactError;
use honeylens_core::pipeline::{AttackClassifier, TextFeatureEncoder};
use honeylens_core::types::{AttackCategory, FeatureMatrix, LogRecord};
use honeylens_log_pipeline::{
    AnalysisConfigBuilder, AnalysisError, AnalysisPipeline, AnalysisPipelineBuilder,
    CountVectorizer, HeuristicLabeler, LinearClassifier, RuleLoader,
};

const VECTORIZER_JSON: &str = r#"{
    "vocabulary": {"sql": 0, "login": 1, "auth": 2, "fail": 3, "download": 4},
    "lowercase": true,
    "binary": false
}"#;

const MODEL_JSON: &str = r#"{
    "classes": ["SQL Injection", "SSH Attack", "Malware Download", "Other Attack"],
    "coefficients": [
        [3.0, 1.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 2.0, 2.0, 0.0],
        [0.0, 0.0, 0.0, 0.0, 3.0],
        [0.0, 0.0, 0.0, 0.0, 0.0]
    ],
    "intercepts": [0.0, 0.0, 0.0, 0.5]
}"#;

const SAMPLE_LOG: &str = "\
[01012024 10:00:00] http_server GET /dionaea/login?id=1 sql
[01012024 10:05:00] sshd brute force attempt /dionaea/auth/fail
\x1b[32m[02012024 08:00:00]\x1b[0m smbd /dionaea/download/payload.exe
random noise without structure
[02012024 09:00:00] smbd connection closed
[32012024 09:30:00] ftpd /dionaea/upload
";

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vectorizer.json"), VECTORIZER_JSON).unwrap();
        std::fs::write(dir.path().join("attack_model.json"), MODEL_JSON).unwrap();
        std::fs::write(dir.path().join("dionaea.log"), SAMPLE_LOG).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.path(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    fn pipeline(&self) -> AnalysisPipeline {
        AnalysisPipelineBuilder::new()
            .encoder(Arc::new(
                CountVectorizer::load(self.path("vectorizer.json")).unwrap(),
            ))
            .classifier(Arc::new(
                LinearClassifier::load(self.path("attack_model.json")).unwrap(),
            ))
            .build()
            .unwrap()
    }
}

/// 파싱 → 레이블 → 예측 → 집계 전체 흐름
#[test]
fn test_full_analysis_run() {
    let fixture = Fixture::new();
    let run = fixture
        .pipeline()
        .process_logs(&[fixture.path("dionaea.log")])
        .unwrap();

    assert_eq!(run.records.len(), 4);
    assert_eq!(run.dropped_lines(), 2);

    let heuristic: Vec<_> = run.records.iter().map(|r| r.heuristic_category).collect();
    assert_eq!(
        heuristic,
        vec![
            AttackCategory::SqlInjection,
            AttackCategory::SshAttack,
            AttackCategory::MalwareDownload,
            AttackCategory::FtpAttack,
        ]
    );

    let predicted: Vec<_> = run.records.iter().map(|r| r.predicted_category).collect();
    assert_eq!(
        predicted,
        vec![
            Some(AttackCategory::SqlInjection),
            Some(AttackCategory::SshAttack),
            Some(AttackCategory::MalwareDownload),
            Some(AttackCategory::OtherAttack),
        ]
    );

    // ANSI가 섞인 라인도 동일하게 파싱된다
    assert_eq!(run.records[2].record.timestamp, "02012024 08:00:00");

    let report = &run.report;
    let total: usize = report.counts_by_category.iter().map(|c| c.count).sum();
    assert_eq!(total, run.records.len());
    assert_eq!(report.agreement.with_prediction, 4);
    assert_eq!(report.agreement.agreeing, 3);

    // 32일은 날짜 집계에서만 빠진다
    assert_eq!(report.timestamp_anomalies.len(), 1);
    assert_eq!(report.count_for(AttackCategory::FtpAttack), 1);
    let dated: usize = report
        .counts_by_date_and_category
        .iter()
        .map(|c| c.count)
        .sum();
    assert_eq!(dated, 3);
}

/// 파일 단위 실패는 다른 파일 처리에 영향을 주지 않는다
#[test]
fn test_per_file_fault_isolation() {
    let fixture = Fixture::new();
    let empty = fixture.write("empty.log", b"");
    let missing = fixture.path("missing.log");

    let run = fixture
        .pipeline()
        .process_logs(&[empty.clone(), fixture.path("dionaea.log"), missing.clone()])
        .unwrap();

    assert_eq!(run.records.len(), 4);
    assert_eq!(run.file_stats.len(), 1);
    assert_eq!(run.file_failures.len(), 2);
    assert_eq!(run.file_failures[0].path, empty.display().to_string());
    assert_eq!(run.file_failures[0].reason, "file is empty");
    assert_eq!(run.file_failures[1].path, missing.display().to_string());
    assert_eq!(run.file_failures[1].reason, "file not found");
}

/// 같은 입력으로 두 번 실행하면 같은 결과가 나온다
#[test]
fn test_rerun_is_idempotent() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline();
    let paths = [fixture.path("dionaea.log")];

    let first = pipeline.process_logs(&paths).unwrap();
    let second = pipeline.process_logs(&paths).unwrap();

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.records, second.records);
    assert_eq!(first.report, second.report);
}

/// 모든 파일이 실패하면 빈 보고서가 나온다
#[test]
fn test_all_files_failed_yields_empty_report() {
    let fixture = Fixture::new();
    let run = fixture
        .pipeline()
        .process_logs(&[fixture.path("nope.log")])
        .unwrap();
    assert!(run.records.is_empty());
    assert!(run.report.counts_by_category.is_empty());
    assert_eq!(run.file_failures.len(), 1);
}

/// 인코딩 실패는 실행 전체를 중단한다
#[test]
fn test_encode_failure_aborts_run() {
    struct FailingEncoder;

    impl TextFeatureEncoder for FailingEncoder {
        fn name(&self) -> &str {
            "failing"
        }

        fn width(&self) -> usize {
            5
        }

        fn encode(&self, messages: &[&str]) -> Result<FeatureMatrix, ArtifactError> {
            Err(ArtifactError::Inference {
                stage: "encode".to_owned(),
                batch_size: messages.len(),
                reason: "vocabulary corrupted".to_owned(),
            })
        }
    }

    let fixture = Fixture::new();
    let pipeline = AnalysisPipelineBuilder::new()
        .encoder(Arc::new(FailingEncoder))
        .classifier(Arc::new(
            LinearClassifier::load(fixture.path("attack_model.json")).unwrap(),
        ))
        .build()
        .unwrap();

    let err = pipeline
        .process_logs(&[fixture.path("dionaea.log")])
        .unwrap_err();
    match err {
        AnalysisError::EncodePredict {
            stage,
            batch_size,
            sources,
            reason,
        } => {
            assert_eq!(stage, "encode");
            assert_eq!(batch_size, 4);
            assert_eq!(sources, vec![fixture.path("dionaea.log").display().to_string()]);
            assert!(reason.contains("vocabulary corrupted"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// 분류기가 보고한 폭과 다른 행렬을 받으면 예측 단계에서 중단한다
#[test]
fn test_runtime_width_mismatch_aborts_run() {
    struct LyingEncoder;

    impl TextFeatureEncoder for LyingEncoder {
        fn name(&self) -> &str {
            "lying"
        }

        fn width(&self) -> usize {
            5
        }

        fn encode(&self, messages: &[&str]) -> Result<FeatureMatrix, ArtifactError> {
            Ok(FeatureMatrix::zeros(messages.len(), 3))
        }
    }

    let fixture = Fixture::new();
    let pipeline = AnalysisPipelineBuilder::new()
        .encoder(Arc::new(LyingEncoder))
        .classifier(Arc::new(
            LinearClassifier::load(fixture.path("attack_model.json")).unwrap(),
        ))
        .build()
        .unwrap();

    let err = pipeline
        .process_logs(&[fixture.path("dionaea.log")])
        .unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::EncodePredict { ref stage, .. } if stage == "predict"
    ));
}

/// 손상된 아티팩트는 로드 시점에 거부된다
#[test]
fn test_corrupt_artifacts_fail_to_load() {
    let fixture = Fixture::new();
    let pickle = fixture.write("vectorizer.pkl", b"\x80\x04\x95\x00\x00");
    assert!(matches!(
        CountVectorizer::load(&pickle),
        Err(AnalysisError::ArtifactLoad { .. })
    ));

    let wrong_schema = fixture.write("model.json", br#"{"classes": ["SSH Attack"]}"#);
    assert!(matches!(
        LinearClassifier::load(&wrong_schema),
        Err(AnalysisError::ArtifactLoad { .. })
    ));
}

/// YAML 규칙 세트로 레이블러를 교체할 수 있다
#[test]
fn test_custom_rule_set_from_config() {
    let fixture = Fixture::new();
    let rules = fixture.write(
        "rules.yml",
        br#"
rules:
  - id: smb
    category: malware_download
    when:
      - service: [smb]
fallback: other_attack
"#,
    );

    let config = AnalysisConfigBuilder::new()
        .rules_path(rules.display().to_string())
        .build()
        .unwrap();
    let pipeline = AnalysisPipelineBuilder::new()
        .config(config)
        .encoder(Arc::new(
            CountVectorizer::load(fixture.path("vectorizer.json")).unwrap(),
        ))
        .classifier(Arc::new(
            LinearClassifier::load(fixture.path("attack_model.json")).unwrap(),
        ))
        .build()
        .unwrap();

    let view = pipeline.heuristic_view(&[fixture.path("dionaea.log")]);
    let heuristic: Vec<_> = view.records.iter().map(|r| r.heuristic_category).collect();
    assert_eq!(
        heuristic,
        vec![
            AttackCategory::OtherAttack,
            AttackCategory::OtherAttack,
            AttackCategory::MalwareDownload,
            AttackCategory::OtherAttack,
        ]
    );
}

/// 잘못된 규칙 경로는 빌드 시점에 실패한다
#[test]
fn test_missing_rules_file_fails_build() {
    let fixture = Fixture::new();
    let config = AnalysisConfigBuilder::new()
        .rules_path("/nonexistent/rules.yml")
        .build()
        .unwrap();
    let result = AnalysisPipelineBuilder::new()
        .config(config)
        .encoder(Arc::new(
            CountVectorizer::load(fixture.path("vectorizer.json")).unwrap(),
        ))
        .classifier(Arc::new(
            LinearClassifier::load(fixture.path("attack_model.json")).unwrap(),
        ))
        .build();
    assert!(matches!(result, Err(AnalysisError::RuleLoad { .. })));
}

/// 예측 뷰는 휴리스틱 레이블 없이 (레코드, 예측) 쌍을 반환한다
#[test]
fn test_prediction_view_on_parsed_records() {
    let fixture = Fixture::new();
    let records = vec![
        LogRecord::new("01012024 10:00:00", "sshd", "/dionaea/auth/fail"),
        LogRecord::new("01012024 10:00:01", "httpd", "/dionaea/login sql"),
    ];
    let pairs = fixture.pipeline().prediction_view(&records).unwrap();
    assert_eq!(
        pairs.iter().map(|(_, p)| *p).collect::<Vec<_>>(),
        vec![AttackCategory::SshAttack, AttackCategory::SqlInjection]
    );
}

/// 문서화된 우선순위 시나리오
#[test]
fn test_cascade_priority_scenarios() {
    let labeler = HeuristicLabeler::new();
    let cases = [
        ("httpd", "/dionaea/sql <script>", AttackCategory::SqlInjection),
        ("sshd", "/dionaea/malware.bin", AttackCategory::SshAttack),
        ("x", "/dionaea/dns brute", AttackCategory::SshAttack),
        ("smbd", "/dionaea/nothing", AttackCategory::OtherAttack),
    ];
    for (service, message, expected) in cases {
        let record = LogRecord::new("01012024 10:00:00", service, message);
        assert_eq!(labeler.label(&record), expected, "{service} {message}");
    }
}

/// 저장소에 포함된 예시 규칙 파일은 내장 캐스케이드와 같다
#[test]
fn test_bundled_rules_match_builtin_cascade() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../rules/default.yml");
    let set = RuleLoader::load_file(&path).unwrap();
    let from_file = HeuristicLabeler::from_rule_set(set).unwrap();
    let builtin = HeuristicLabeler::new();

    let ids: Vec<_> = from_file.rules().iter().map(|r| r.id.as_str()).collect();
    let builtin_ids: Vec<_> = builtin.rules().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, builtin_ids);
    assert_eq!(from_file.rules(), builtin.rules());
    assert_eq!(from_file.fallback(), builtin.fallback());
}
