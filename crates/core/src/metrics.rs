//! 메트릭 상수 및 설명 등록
//!
//! 메트릭 이름을 중앙에서 정의합니다. 파이프라인은 이 상수로
//! `metrics::counter!()` 매크로를 호출합니다. 레코더가 설치되지 않으면
//! 매크로 호출은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `honeylens_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 공격 유형 레이블 키
pub const LABEL_CATEGORY: &str = "category";

/// 파이프라인 단계 레이블 키 (parse, label, encode, predict, aggregate)
pub const LABEL_STAGE: &str = "stage";

// ─── Analysis 메트릭 ───────────────────────────────────────────────

/// 읽은 원시 라인 수 (counter)
pub const ANALYSIS_LINES_READ_TOTAL: &str = "honeylens_analysis_lines_read_total";

/// 구조 패턴 불일치로 드롭된 라인 수 (counter)
pub const ANALYSIS_LINES_DROPPED_TOTAL: &str = "honeylens_analysis_lines_dropped_total";

/// 파싱된 레코드 수 (counter)
pub const ANALYSIS_RECORDS_PARSED_TOTAL: &str = "honeylens_analysis_records_parsed_total";

/// 처리하지 못한 파일 수 (counter)
pub const ANALYSIS_FILES_FAILED_TOTAL: &str = "honeylens_analysis_files_failed_total";

/// 휴리스틱 레이블 수 (counter, label: category)
pub const ANALYSIS_HEURISTIC_LABELS_TOTAL: &str = "honeylens_analysis_heuristic_labels_total";

/// 분류기 예측 수 (counter)
pub const ANALYSIS_PREDICTIONS_TOTAL: &str = "honeylens_analysis_predictions_total";

/// 타임스탬프 파싱 이상 수 (counter)
pub const ANALYSIS_TIMESTAMP_ANOMALIES_TOTAL: &str =
    "honeylens_analysis_timestamp_anomalies_total";

/// 단계별 소요 시간 (histogram, 초, label: stage)
pub const ANALYSIS_STAGE_DURATION_SECONDS: &str = "honeylens_analysis_stage_duration_seconds";

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        ANALYSIS_LINES_READ_TOTAL,
        "Total number of raw log lines read from input files"
    );
    describe_counter!(
        ANALYSIS_LINES_DROPPED_TOTAL,
        "Total number of lines dropped because a structural pattern did not match"
    );
    describe_counter!(
        ANALYSIS_RECORDS_PARSED_TOTAL,
        "Total number of log records extracted"
    );
    describe_counter!(
        ANALYSIS_FILES_FAILED_TOTAL,
        "Total number of input files that were empty, missing or unreadable"
    );
    describe_counter!(
        ANALYSIS_HEURISTIC_LABELS_TOTAL,
        "Heuristic labels assigned per attack category"
    );
    describe_counter!(
        ANALYSIS_PREDICTIONS_TOTAL,
        "Total number of classifier predictions"
    );
    describe_counter!(
        ANALYSIS_TIMESTAMP_ANOMALIES_TOTAL,
        "Records excluded from the date aggregate because the timestamp did not parse"
    );
    describe_histogram!(
        ANALYSIS_STAGE_DURATION_SECONDS,
        "Time spent in each analysis stage in seconds"
    );
}
