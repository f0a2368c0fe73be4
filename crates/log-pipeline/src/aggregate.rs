//! 결과 집계 -- 레이블된 레코드를 유형별/날짜별 통계로 요약
//!
//! 집계는 입력을 변경하지 않으며 매번 처음부터 다시 계산됩니다.
//!
//! # 정렬 규칙
//! - 유형별 카운트: 개수 내림차순, 동률이면 [`AttackCategory`] 선언 순서
//! - 날짜x유형 카운트: 날짜 오름차순, 같은 날짜 안에서는 개수 내림차순
//!
//! 타임스탬프를 `DDMMYYYY HH:MM:SS`로 해석할 수 없는 레코드는 날짜 집계에서만
//! 제외되고 [`TimestampAnomaly`]로 기록됩니다. 유형별 카운트에는 포함됩니다.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use honeylens_core::metrics as names;
use honeylens_core::types::{AttackCategory, LabeledRecord};

use crate::error::AnalysisError;

/// 타임스탬프 형식
pub const TIMESTAMP_FORMAT: &str = "%d%m%Y %H:%M:%S";

/// 유형별 카운트
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: AttackCategory,
    pub count: usize,
}

/// 날짜x유형 카운트
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateCategoryCount {
    pub date: NaiveDate,
    pub category: AttackCategory,
    pub count: usize,
}

/// 휴리스틱 레이블과 예측 레이블의 일치 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgreementStats {
    /// 예측 레이블이 있는 레코드 수
    pub with_prediction: usize,
    /// 두 레이블이 같은 레코드 수
    pub agreeing: usize,
}

impl AgreementStats {
    /// 일치율. 예측이 하나도 없으면 `None`.
    pub fn rate(&self) -> Option<f64> {
        (self.with_prediction > 0).then(|| self.agreeing as f64 / self.with_prediction as f64)
    }
}

/// 날짜 집계에서 제외된 레코드
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimestampAnomaly {
    pub source: String,
    pub line_number: usize,
    pub timestamp: String,
    pub reason: String,
}

/// 집계 보고서
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateReport {
    /// 전체 레코드 수
    pub total_records: usize,
    pub counts_by_category: Vec<CategoryCount>,
    pub counts_by_date_and_category: Vec<DateCategoryCount>,
    /// 예측 레이블 기준 유형별 카운트 (예측된 레코드만)
    pub counts_by_predicted_category: Vec<CategoryCount>,
    pub agreement: AgreementStats,
    pub timestamp_anomalies: Vec<TimestampAnomaly>,
}

impl AggregateReport {
    /// 특정 유형의 휴리스틱 카운트. 없으면 0.
    pub fn count_for(&self, category: AttackCategory) -> usize {
        self.counts_by_category
            .iter()
            .find(|c| c.category == category)
            .map_or(0, |c| c.count)
    }
}

/// 결과 집계기
pub struct ResultAggregator;

impl ResultAggregator {
    /// 레코드 목록을 집계합니다.
    pub fn aggregate(records: &[LabeledRecord]) -> AggregateReport {
        let mut heuristic: BTreeMap<AttackCategory, usize> = BTreeMap::new();
        let mut predicted: BTreeMap<AttackCategory, usize> = BTreeMap::new();
        let mut by_date: BTreeMap<NaiveDate, BTreeMap<AttackCategory, usize>> = BTreeMap::new();
        let mut agreement = AgreementStats::default();
        let mut anomalies = Vec::new();

        for labeled in records {
            *heuristic.entry(labeled.heuristic_category).or_default() += 1;

            if let Some(category) = labeled.predicted_category {
                *predicted.entry(category).or_default() += 1;
                agreement.with_prediction += 1;
                if labeled.agrees() {
                    agreement.agreeing += 1;
                }
            }

            match Self::parse_date(&labeled.record.timestamp) {
                Ok(date) => {
                    *by_date
                        .entry(date)
                        .or_default()
                        .entry(labeled.heuristic_category)
                        .or_default() += 1;
                }
                Err(err) => {
                    tracing::debug!(
                        source = %labeled.record.source,
                        line = labeled.record.line_number,
                        error = %err,
                        "excluding record from date aggregate"
                    );
                    let reason = match err {
                        AnalysisError::TimestampParse { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    anomalies.push(TimestampAnomaly {
                        source: labeled.record.source.clone(),
                        line_number: labeled.record.line_number,
                        timestamp: labeled.record.timestamp.clone(),
                        reason,
                    });
                }
            }
        }

        if !anomalies.is_empty() {
            metrics::counter!(names::ANALYSIS_TIMESTAMP_ANOMALIES_TOTAL)
                .increment(anomalies.len() as u64);
        }

        let counts_by_date_and_category = by_date
            .into_iter()
            .flat_map(|(date, per_category)| {
                sorted_counts(per_category)
                    .into_iter()
                    .map(move |c| DateCategoryCount {
                        date,
                        category: c.category,
                        count: c.count,
                    })
            })
            .collect();

        AggregateReport {
            total_records: records.len(),
            counts_by_category: sorted_counts(heuristic),
            counts_by_date_and_category,
            counts_by_predicted_category: sorted_counts(predicted),
            agreement,
            timestamp_anomalies: anomalies,
        }
    }

    /// 타임스탬프를 달력 날짜로 해석합니다.
    pub fn parse_date(timestamp: &str) -> Result<NaiveDate, AnalysisError> {
        NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .map(|dt| dt.date())
            .map_err(|e| AnalysisError::TimestampParse {
                timestamp: timestamp.to_owned(),
                reason: e.to_string(),
            })
    }
}

/// 개수 내림차순, 동률이면 유형 선언 순서로 정렬합니다.
fn sorted_counts(counts: BTreeMap<AttackCategory, usize>) -> Vec<CategoryCount> {
    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    // BTreeMap 순회가 이미 유형 순서이므로 안정 정렬로 동률 순서가 유지된다
    out.sort_by_key(|c| Reverse(c.count));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use honeylens_core::types::LogRecord;

    fn labeled(ts: &str, category: AttackCategory) -> LabeledRecord {
        LabeledRecord::new(LogRecord::new(ts, "svc", "/dionaea/x"), category)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let report = ResultAggregator::aggregate(&[]);
        assert_eq!(report, AggregateReport::default());
        assert_eq!(report.agreement.rate(), None);
    }

    #[test]
    fn counts_by_category_sorted_descending_with_stable_ties() {
        let records = vec![
            labeled("01012024 10:00:00", AttackCategory::SshAttack),
            labeled("01012024 10:00:01", AttackCategory::FtpAttack),
            labeled("01012024 10:00:02", AttackCategory::SshAttack),
            labeled("01012024 10:00:03", AttackCategory::DnsAttack),
            labeled("01012024 10:00:04", AttackCategory::FtpAttack),
            labeled("01012024 10:00:05", AttackCategory::OtherAttack),
        ];
        let report = ResultAggregator::aggregate(&records);
        let order: Vec<_> = report
            .counts_by_category
            .iter()
            .map(|c| (c.category, c.count))
            .collect();
        assert_eq!(
            order,
            vec![
                (AttackCategory::FtpAttack, 2),
                (AttackCategory::SshAttack, 2),
                (AttackCategory::DnsAttack, 1),
                (AttackCategory::OtherAttack, 1),
            ]
        );
        assert_eq!(report.count_for(AttackCategory::SshAttack), 2);
        assert_eq!(report.count_for(AttackCategory::SqlInjection), 0);
    }

    #[test]
    fn date_groups_are_ascending_then_by_count() {
        let records = vec![
            labeled("02012024 09:00:00", AttackCategory::HttpAttack),
            labeled("01012024 10:00:00", AttackCategory::SshAttack),
            labeled("01012024 11:00:00", AttackCategory::FtpAttack),
            labeled("01012024 12:00:00", AttackCategory::FtpAttack),
        ];
        let report = ResultAggregator::aggregate(&records);
        assert_eq!(
            report.counts_by_date_and_category,
            vec![
                DateCategoryCount {
                    date: date(2024, 1, 1),
                    category: AttackCategory::FtpAttack,
                    count: 2
                },
                DateCategoryCount {
                    date: date(2024, 1, 1),
                    category: AttackCategory::SshAttack,
                    count: 1
                },
                DateCategoryCount {
                    date: date(2024, 1, 2),
                    category: AttackCategory::HttpAttack,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn invalid_timestamp_is_anomaly_but_still_counted() {
        let records = vec![
            labeled("32012024 10:00:00", AttackCategory::SshAttack),
            labeled("01012024 10:00:00", AttackCategory::SshAttack),
        ];
        let report = ResultAggregator::aggregate(&records);
        assert_eq!(report.count_for(AttackCategory::SshAttack), 2);
        assert_eq!(report.counts_by_date_and_category.len(), 1);
        assert_eq!(report.counts_by_date_and_category[0].count, 1);
        assert_eq!(report.timestamp_anomalies.len(), 1);
        assert_eq!(report.timestamp_anomalies[0].timestamp, "32012024 10:00:00");
    }

    #[test]
    fn extra_whitespace_between_date_and_time_is_accepted() {
        assert_eq!(
            ResultAggregator::parse_date("15062024   08:30:00").unwrap(),
            date(2024, 6, 15)
        );
    }

    #[test]
    fn predicted_counts_and_agreement() {
        let records = vec![
            labeled("01012024 10:00:00", AttackCategory::SshAttack)
                .with_prediction(AttackCategory::SshAttack),
            labeled("01012024 10:00:01", AttackCategory::HttpAttack)
                .with_prediction(AttackCategory::SqlInjection),
            labeled("01012024 10:00:02", AttackCategory::HttpAttack),
        ];
        let report = ResultAggregator::aggregate(&records);
        assert_eq!(report.agreement.with_prediction, 2);
        assert_eq!(report.agreement.agreeing, 1);
        assert_eq!(report.agreement.rate(), Some(0.5));
        let predicted_total: usize = report
            .counts_by_predicted_category
            .iter()
            .map(|c| c.count)
            .sum();
        assert_eq!(predicted_total, 2);
    }

    #[test]
    fn category_counts_conserve_record_count() {
        let records: Vec<_> = AttackCategory::ALL
            .iter()
            .cycle()
            .take(37)
            .enumerate()
            .map(|(i, &c)| labeled(&format!("{:02}012024 10:00:00", i % 28 + 1), c))
            .collect();
        let report = ResultAggregator::aggregate(&records);
        let total: usize = report.counts_by_category.iter().map(|c| c.count).sum();
        assert_eq!(total, records.len());
        assert_eq!(report.total_records, records.len());
        let dated: usize = report
            .counts_by_date_and_category
            .iter()
            .map(|c| c.count)
            .sum();
        assert_eq!(dated + report.timestamp_anomalies.len(), records.len());
    }
}
