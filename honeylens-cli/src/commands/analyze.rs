//! `honeylens analyze` command handler

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use honeylens_core::config::HoneylensConfig;
use honeylens_core::types::LabeledRecord;
use honeylens_log_pipeline::{
    AggregateReport, AnalysisConfig, AnalysisPipelineBuilder, AnalysisRun, CountVectorizer,
    FileFailure, FileParseStats, LinearClassifier, ProgressSink, Stage,
};

use crate::cli::AnalyzeArgs;
use crate::commands::resolve_labeler;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Forwards pipeline stage transitions to the tracing subscriber.
struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, stage: Stage, percent: u8) {
        info!(stage = stage.as_str(), percent, "analysis progress");
    }
}

/// Execute the `analyze` command.
pub async fn execute(
    args: AnalyzeArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = HoneylensConfig::load_or_default(config_path).await?;

    let vectorizer_path = args
        .vectorizer
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.artifacts.vectorizer_path));
    let model_path = args
        .model
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.artifacts.model_path));

    let files = args.files.clone();
    let rules = args.rules.clone();
    let analysis = AnalysisConfig::from_core(&config.analysis);

    // Pipeline is synchronous, keep it off the runtime thread.
    let run = tokio::task::spawn_blocking(move || {
        run_pipeline(
            analysis,
            &vectorizer_path,
            &model_path,
            rules.as_deref(),
            &files,
        )
    })
    .await
    .map_err(|e| CliError::Command(format!("analysis task failed: {}", e)))??;

    let all_failed = run.file_failures.len() == args.files.len();
    let report = AnalyzeReport::from_run(run, args.records);
    writer.render(&report)?;

    if all_failed {
        return Err(CliError::Command(format!(
            "none of the {} input files could be analyzed",
            args.files.len()
        )));
    }

    Ok(())
}

fn run_pipeline(
    analysis: AnalysisConfig,
    vectorizer_path: &Path,
    model_path: &Path,
    rules: Option<&Path>,
    files: &[PathBuf],
) -> Result<AnalysisRun, CliError> {
    info!(
        vectorizer = %vectorizer_path.display(),
        model = %model_path.display(),
        "loading artifacts"
    );
    let vectorizer = CountVectorizer::load(vectorizer_path)?;
    let classifier = LinearClassifier::load(model_path)?;
    let (labeler, rules_source) = resolve_labeler(rules, analysis.rules_path.as_deref())?;
    info!(rules = %rules_source, "label cascade resolved");

    let pipeline = AnalysisPipelineBuilder::new()
        .config(analysis)
        .encoder(Arc::new(vectorizer))
        .classifier(Arc::new(classifier))
        .labeler(labeler)
        .progress(Arc::new(TracingProgress))
        .build()?;

    Ok(pipeline.process_logs(files)?)
}

/// Output payload of `honeylens analyze`.
#[derive(Serialize)]
pub struct AnalyzeReport {
    pub run_id: String,
    pub report: AggregateReport,
    pub files: Vec<FileParseStats>,
    pub file_failures: Vec<FileFailure>,
    pub dropped_lines: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<LabeledRecord>>,
}

impl AnalyzeReport {
    fn from_run(run: AnalysisRun, include_records: bool) -> Self {
        let dropped_lines = run.dropped_lines();
        Self {
            run_id: run.run_id.to_string(),
            report: run.report,
            files: run.file_stats,
            file_failures: run.file_failures,
            dropped_lines,
            records: include_records.then_some(run.records),
        }
    }
}

impl Render for AnalyzeReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let report = &self.report;
        writeln!(w, "Analysis Run: {}", self.run_id.bold())?;
        writeln!(
            w,
            "  Records: {}  Dropped lines: {}  Failed files: {}",
            report.total_records.to_string().bold(),
            self.dropped_lines,
            self.file_failures.len()
        )?;
        writeln!(w)?;

        writeln!(w, "{}", "Attacks by category (heuristic)".bold())?;
        writeln!(w, "{:<24} {:>8}", "Category", "Count")?;
        writeln!(w, "{}", "-".repeat(33))?;
        for c in &report.counts_by_category {
            writeln!(w, "{:<24} {:>8}", c.category.label(), c.count)?;
        }
        writeln!(w)?;

        if !report.counts_by_date_and_category.is_empty() {
            writeln!(w, "{}", "Attacks by date".bold())?;
            writeln!(w, "{:<12} {:<24} {:>8}", "Date", "Category", "Count")?;
            writeln!(w, "{}", "-".repeat(46))?;
            for d in &report.counts_by_date_and_category {
                writeln!(
                    w,
                    "{:<12} {:<24} {:>8}",
                    d.date.format("%Y-%m-%d").to_string(),
                    d.category.label(),
                    d.count
                )?;
            }
            writeln!(w)?;
        }

        if !report.counts_by_predicted_category.is_empty() {
            writeln!(w, "{}", "Attacks by category (classifier)".bold())?;
            writeln!(w, "{:<24} {:>8}", "Category", "Count")?;
            writeln!(w, "{}", "-".repeat(33))?;
            for c in &report.counts_by_predicted_category {
                writeln!(w, "{:<24} {:>8}", c.category.label(), c.count)?;
            }
            writeln!(w)?;
        }

        match report.agreement.rate() {
            Some(rate) => writeln!(
                w,
                "Agreement: {}/{} ({:.1}%)",
                report.agreement.agreeing,
                report.agreement.with_prediction,
                rate * 100.0
            )?,
            None => writeln!(w, "Agreement: n/a")?,
        }

        if !self.file_failures.is_empty() {
            writeln!(w)?;
            writeln!(w, "{}", "Failed files".red().bold())?;
            for f in &self.file_failures {
                writeln!(w, "  {}: {}", f.path, f.reason.red())?;
            }
        }

        if !report.timestamp_anomalies.is_empty() {
            writeln!(w)?;
            writeln!(w, "{}", "Timestamp anomalies".yellow().bold())?;
            for a in &report.timestamp_anomalies {
                writeln!(
                    w,
                    "  {}:{} '{}': {}",
                    a.source, a.line_number, a.timestamp, a.reason
                )?;
            }
        }

        if let Some(records) = &self.records {
            writeln!(w)?;
            writeln!(w, "{}", "Records".bold())?;
            writeln!(
                w,
                "{:<20} {:<12} {:<24} {:<24} Message",
                "Timestamp", "Service", "Heuristic", "Predicted"
            )?;
            writeln!(w, "{}", "-".repeat(100))?;
            for r in records {
                let predicted = r.predicted_category.map(|c| c.label()).unwrap_or("-");
                writeln!(
                    w,
                    "{:<20} {:<12} {:<24} {:<24} {}",
                    r.record.timestamp,
                    r.record.service,
                    r.heuristic_category.label(),
                    predicted,
                    r.record.message
                )?;
            }
        }

        Ok(())
    }
}
