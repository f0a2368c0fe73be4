//! 파이프라인 오케스트레이션 -- 파싱/레이블링/인코딩/예측/집계의 전체 흐름
//!
//! # 처리 순서
//! ```text
//! files -> DionaeaLineParser -> HeuristicLabeler -> TextFeatureEncoder
//!       -> AttackClassifier -> ResultAggregator -> AnalysisRun
//! ```
//! 배치 단위로 동작하며 스트리밍하지 않습니다. 실행 간에 상태를 이어받지
//! 않으므로 같은 입력으로 다시 실행하면 같은 결과가 나옵니다 (`run_id` 제외).
//!
//! # 실패 정책
//! - 파일 단위 실패는 `file_failures`에 기록하고 나머지 파일을 계속 처리합니다.
//! - 인코딩/예측 실패는 실행 전체를 중단합니다.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

use honeylens_core::metrics as names;
use honeylens_core::pipeline::{AttackClassifier, TextFeatureEncoder};
use honeylens_core::types::{AttackCategory, LabeledRecord, LogRecord};

use crate::aggregate::{AggregateReport, ResultAggregator};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::parser::{DionaeaLineParser, FileParseStats};
use crate::rule::HeuristicLabeler;

/// 파이프라인 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Parsed,
    Labeled,
    Encoded,
    Predicted,
    Aggregated,
}

impl Stage {
    /// 단계 완료 시점의 진행률 (%)
    pub fn percent(self) -> u8 {
        match self {
            Self::Parsed => 30,
            Self::Labeled => 50,
            Self::Encoded => 70,
            Self::Predicted => 90,
            Self::Aggregated => 100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parsed => "parse",
            Self::Labeled => "label",
            Self::Encoded => "encode",
            Self::Predicted => "predict",
            Self::Aggregated => "aggregate",
        }
    }
}

/// 단계 사이의 진행 상황을 받는 trait
pub trait ProgressSink: Send + Sync {
    fn report(&self, stage: Stage, percent: u8);
}

/// 아무것도 하지 않는 진행 상황 수신자
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _stage: Stage, _percent: u8) {}
}

/// 처리하지 못한 입력 파일
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub reason: String,
}

/// 파싱과 휴리스틱 레이블링까지의 결과
#[derive(Debug, Clone, Default)]
pub struct HeuristicView {
    pub records: Vec<LabeledRecord>,
    pub file_stats: Vec<FileParseStats>,
    pub file_failures: Vec<FileFailure>,
}

/// 한 번의 분석 실행 결과
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRun {
    pub run_id: Uuid,
    pub records: Vec<LabeledRecord>,
    pub report: AggregateReport,
    pub file_stats: Vec<FileParseStats>,
    pub file_failures: Vec<FileFailure>,
}

impl AnalysisRun {
    /// 전체 드롭 라인 수
    pub fn dropped_lines(&self) -> usize {
        self.file_stats.iter().map(|s| s.dropped).sum()
    }
}

/// 분석 파이프라인
///
/// 아티팩트는 빌드 시 한 번 주입되고 이후 읽기 전용으로 재사용됩니다.
///
/// # 사용 예시
/// ```ignore
/// use std::sync::Arc;
/// use honeylens_log_pipeline::{AnalysisPipelineBuilder, CountVectorizer, LinearClassifier};
///
/// let pipeline = AnalysisPipelineBuilder::new()
///     .encoder(Arc::new(CountVectorizer::load("vectorizer.json")?))
///     .classifier(Arc::new(LinearClassifier::load("attack_model.json")?))
///     .build()?;
///
/// let run = pipeline.process_logs(&["/var/log/dionaea/dionaea.log"])?;
/// ```
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    parser: DionaeaLineParser,
    labeler: HeuristicLabeler,
    encoder: Arc<dyn TextFeatureEncoder>,
    classifier: Arc<dyn AttackClassifier>,
    progress: Arc<dyn ProgressSink>,
}

impl AnalysisPipeline {
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn labeler(&self) -> &HeuristicLabeler {
        &self.labeler
    }

    /// 전체 분석을 실행합니다.
    ///
    /// # Errors
    /// 인코딩 또는 예측이 실패하면 [`AnalysisError::EncodePredict`]를 반환합니다.
    /// 파일 단위 실패는 에러가 아니며 `AnalysisRun::file_failures`에 기록됩니다.
    pub fn process_logs<P: AsRef<Path>>(&self, paths: &[P]) -> Result<AnalysisRun, AnalysisError> {
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, files = paths.len(), "starting analysis run");

        let view = self.heuristic_view(paths);
        let HeuristicView {
            records,
            file_stats,
            file_failures,
        } = view;

        let records = if records.is_empty() {
            tracing::info!(%run_id, "no records parsed, skipping encode and predict");
            self.advance(Stage::Encoded);
            self.advance(Stage::Predicted);
            records
        } else {
            let messages: Vec<&str> = records.iter().map(|r| r.record.message.as_str()).collect();
            let predictions = self.predict_messages(&messages).map_err(|e| {
                let sources = batch_sources(records.iter().map(|r| r.record.source.as_str()));
                tracing::error!(%run_id, sources = ?sources, error = %e, "batch failed, aborting run");
                e.with_batch_sources(sources)
            })?;
            records
                .into_iter()
                .zip(predictions)
                .map(|(record, predicted)| record.with_prediction(predicted))
                .collect()
        };

        let started = Instant::now();
        let report = ResultAggregator::aggregate(&records);
        self.finish_stage(Stage::Aggregated, started);

        tracing::info!(
            %run_id,
            records = report.total_records,
            categories = report.counts_by_category.len(),
            failed_files = file_failures.len(),
            timestamp_anomalies = report.timestamp_anomalies.len(),
            "analysis run complete"
        );

        Ok(AnalysisRun {
            run_id,
            records,
            report,
            file_stats,
            file_failures,
        })
    }

    /// 파싱과 휴리스틱 레이블링만 수행합니다.
    pub fn heuristic_view<P: AsRef<Path>>(&self, paths: &[P]) -> HeuristicView {
        let started = Instant::now();
        let mut parsed = Vec::new();
        let mut file_stats = Vec::with_capacity(paths.len());
        let mut file_failures = Vec::new();

        for path in paths {
            let path = path.as_ref();
            match self.parser.parse_file(path, self.config.max_file_size) {
                Ok(file) => {
                    parsed.extend(file.records);
                    file_stats.push(file.stats);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping log file");
                    metrics::counter!(names::ANALYSIS_FILES_FAILED_TOTAL).increment(1);
                    let reason = match e {
                        AnalysisError::EmptyOrMissingFile { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    file_failures.push(FileFailure {
                        path: path.display().to_string(),
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            records = parsed.len(),
            files = file_stats.len(),
            failed_files = file_failures.len(),
            "parse stage complete"
        );
        self.finish_stage(Stage::Parsed, started);

        let started = Instant::now();
        let records = self.labeler.label_all(parsed);
        tracing::info!(records = records.len(), "label stage complete");
        self.finish_stage(Stage::Labeled, started);

        HeuristicView {
            records,
            file_stats,
            file_failures,
        }
    }

    /// 이미 파싱된 레코드에 대해 인코딩과 예측만 수행합니다.
    ///
    /// 휴리스틱 레이블은 계산하지 않습니다.
    pub fn prediction_view(
        &self,
        records: &[LogRecord],
    ) -> Result<Vec<(LogRecord, AttackCategory)>, AnalysisError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let messages: Vec<&str> = records.iter().map(|r| r.message.as_str()).collect();
        let predictions = self.predict_messages(&messages).map_err(|e| {
            e.with_batch_sources(batch_sources(records.iter().map(|r| r.source.as_str())))
        })?;

        Ok(records.iter().cloned().zip(predictions).collect())
    }

    /// 메시지 배치를 인코딩하고 예측합니다. 출력 길이는 입력과 같습니다.
    fn predict_messages(&self, messages: &[&str]) -> Result<Vec<AttackCategory>, AnalysisError> {
        let batch_size = messages.len();

        let started = Instant::now();
        let features = self.encoder.encode(messages)?;
        if features.rows() != batch_size {
            return Err(AnalysisError::EncodePredict {
                stage: Stage::Encoded.as_str().to_owned(),
                batch_size,
                sources: Vec::new(),
                reason: format!(
                    "encoder '{}' returned {} rows",
                    self.encoder.name(),
                    features.rows()
                ),
            });
        }
        tracing::info!(
            encoder = self.encoder.name(),
            rows = features.rows(),
            width = features.width(),
            "encode stage complete"
        );
        self.finish_stage(Stage::Encoded, started);

        let started = Instant::now();
        let predictions = self.classifier.predict(&features)?;
        if predictions.len() != batch_size {
            return Err(AnalysisError::EncodePredict {
                stage: Stage::Predicted.as_str().to_owned(),
                batch_size,
                sources: Vec::new(),
                reason: format!(
                    "classifier '{}' returned {} predictions",
                    self.classifier.name(),
                    predictions.len()
                ),
            });
        }
        for category in &predictions {
            metrics::counter!(
                names::ANALYSIS_PREDICTIONS_TOTAL,
                names::LABEL_CATEGORY => category.label()
            )
            .increment(1);
        }
        tracing::info!(
            classifier = self.classifier.name(),
            predictions = predictions.len(),
            "predict stage complete"
        );
        self.finish_stage(Stage::Predicted, started);

        Ok(predictions)
    }

    fn finish_stage(&self, stage: Stage, started: Instant) {
        metrics::histogram!(
            names::ANALYSIS_STAGE_DURATION_SECONDS,
            names::LABEL_STAGE => stage.as_str()
        )
        .record(started.elapsed().as_secs_f64());
        self.advance(stage);
    }

    fn advance(&self, stage: Stage) {
        self.progress.report(stage, stage.percent());
    }
}

/// 분석 파이프라인 빌더
///
/// 인코더와 분류기는 필수입니다. 레이블러를 지정하지 않으면 설정의
/// `rules_path`에서 로드하고, 그것도 없으면 내장 캐스케이드를 사용합니다.
pub struct AnalysisPipelineBuilder {
    config: AnalysisConfig,
    encoder: Option<Arc<dyn TextFeatureEncoder>>,
    classifier: Option<Arc<dyn AttackClassifier>>,
    labeler: Option<HeuristicLabeler>,
    progress: Arc<dyn ProgressSink>,
}

impl AnalysisPipelineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
            encoder: None,
            classifier: None,
            labeler: None,
            progress: Arc::new(NoopProgress),
        }
    }

    /// 파이프라인 설정을 지정합니다.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// 특징 인코더를 지정합니다.
    pub fn encoder(mut self, encoder: Arc<dyn TextFeatureEncoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// 분류기를 지정합니다.
    pub fn classifier(mut self, classifier: Arc<dyn AttackClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// 휴리스틱 레이블러를 지정합니다.
    pub fn labeler(mut self, labeler: HeuristicLabeler) -> Self {
        self.labeler = Some(labeler);
        self
    }

    /// 진행 상황 수신자를 지정합니다.
    pub fn progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// 파이프라인을 빌드합니다.
    ///
    /// # Errors
    /// - 설정 검증 실패 또는 인코더/분류기 미지정: [`AnalysisError::Config`]
    /// - 인코더 폭과 분류기 입력 폭 불일치: [`AnalysisError::ArtifactLoad`]
    /// - 규칙 파일 로드 실패: [`AnalysisError::RuleLoad`]
    pub fn build(self) -> Result<AnalysisPipeline, AnalysisError> {
        self.config.validate()?;

        let encoder = self.encoder.ok_or_else(|| AnalysisError::Config {
            field: "encoder".to_owned(),
            reason: "no text feature encoder configured".to_owned(),
        })?;
        let classifier = self.classifier.ok_or_else(|| AnalysisError::Config {
            field: "classifier".to_owned(),
            reason: "no attack classifier configured".to_owned(),
        })?;

        if encoder.width() != classifier.expected_width() {
            return Err(AnalysisError::ArtifactLoad {
                path: classifier.name().to_owned(),
                reason: format!(
                    "classifier expects width {}, encoder '{}' produces {}",
                    classifier.expected_width(),
                    encoder.name(),
                    encoder.width()
                ),
            });
        }

        let labeler = match (self.labeler, &self.config.rules_path) {
            (Some(labeler), _) => labeler,
            (None, Some(path)) => HeuristicLabeler::from_file(path)?,
            (None, None) => HeuristicLabeler::new(),
        };

        let parser = DionaeaLineParser::with_marker(&self.config.message_marker)?
            .with_max_line_length(self.config.max_line_length);

        tracing::debug!(
            encoder = encoder.name(),
            classifier = classifier.name(),
            rules = labeler.rules().len(),
            "analysis pipeline built"
        );

        Ok(AnalysisPipeline {
            config: self.config,
            parser,
            labeler,
            encoder,
            classifier,
            progress: self.progress,
        })
    }
}

impl Default for AnalysisPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 배치에 레코드를 제공한 출처를 처음 등장한 순서대로 중복 없이 모읍니다.
fn batch_sources<'a>(sources: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for source in sources {
        if !unique.iter().any(|s| s == source) {
            unique.push(source.to_owned());
        }
    }
    unique
}
