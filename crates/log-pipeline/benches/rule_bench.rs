//! 휴리스틱 레이블러 벤치마크
//!
//! 캐스케이드 위치별 매칭 비용과 배치 레이블링 처리량을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use honeylens_core::types::{AttackCategory, LogRecord};
use honeylens_log_pipeline::rule::{HeuristicLabeler, LabelRule, LabelRuleSet, RuleClause};

fn record(service: &str, message: &str) -> LogRecord {
    LogRecord::new("01012024 10:00:00", service, message)
}

fn bench_cascade_position(c: &mut Criterion) {
    let labeler = HeuristicLabeler::new();

    let mut group = c.benchmark_group("cascade_position");
    group.throughput(Throughput::Elements(1));

    // 첫 규칙, 중간 규칙, fallback까지 모두 평가하는 경우
    let cases = [
        ("first_rule", record("httpd", "/dionaea/login?id=1 sql")),
        ("middle_rule", record("sshd", "/dionaea/auth/fail")),
        ("fallback", record("smbd", "/dionaea/share/ipc$")),
    ];

    for (name, r) in &cases {
        group.bench_function(*name, |b| b.iter(|| labeler.label(black_box(r))));
    }

    group.finish();
}

fn bench_label_all(c: &mut Criterion) {
    let labeler = HeuristicLabeler::new();
    let templates = [
        record("httpd", "/dionaea/login?id=1 sql"),
        record("ftpd", "/dionaea/upload/x.bin"),
        record("sshd", "/dionaea/auth/fail"),
        record("smbd", "/dionaea/download/payload.exe"),
        record("smbd", "/dionaea/share"),
    ];

    let mut group = c.benchmark_group("label_all");

    for size in [100, 1_000, 10_000] {
        let records: Vec<LogRecord> = templates.iter().cycle().take(size).cloned().collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| labeler.label_all(black_box(records.clone())))
        });
    }

    group.finish();
}

fn bench_rule_set_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_set_scaling");
    let miss = record("smbd", "/dionaea/share");

    for count in [10, 100, 1_000] {
        let rules = (0..count)
            .map(|i| {
                LabelRule::new(
                    format!("rule_{i}"),
                    AttackCategory::OtherAttack,
                    vec![RuleClause::service([format!("svc{i}")]).or_message(format!("kw{i}"))],
                )
            })
            .collect();
        let labeler = HeuristicLabeler::from_rule_set(LabelRuleSet {
            rules,
            fallback: AttackCategory::OtherAttack,
        })
        .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(count), &labeler, |b, labeler| {
            b.iter(|| labeler.label(black_box(&miss)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cascade_position,
    bench_label_all,
    bench_rule_set_scaling
);
criterion_main!(benches);
