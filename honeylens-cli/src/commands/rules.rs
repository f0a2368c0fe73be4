//! `honeylens rules` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use honeylens_core::config::HoneylensConfig;
use honeylens_core::types::AttackCategory;
use honeylens_log_pipeline::{HeuristicLabeler, LabelRule, RuleLoader};

use crate::cli::{RulesAction, RulesArgs};
use crate::commands::resolve_labeler;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `rules` command.
pub async fn execute(
    args: RulesArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        RulesAction::List { rules } => {
            let config = HoneylensConfig::load_or_default(config_path).await?;
            let (labeler, source) =
                resolve_labeler(rules.as_deref(), config.analysis.rules_path.as_deref())?;
            info!(source = %source, rules = labeler.rules().len(), "listing label rules");
            writer.render(&RuleListReport::from_labeler(&labeler, source))
        }
        RulesAction::Check { path } => execute_check(&path, writer),
        RulesAction::Label {
            service,
            message,
            rules,
        } => {
            let config = HoneylensConfig::load_or_default(config_path).await?;
            let (labeler, source) =
                resolve_labeler(rules.as_deref(), config.analysis.rules_path.as_deref())?;
            writer.render(&LabelReport::evaluate(&labeler, source, service, message))
        }
    }
}

fn execute_check(path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %path.display(), "validating label rule set");

    let report = match RuleLoader::load_file(path) {
        Ok(set) => RuleCheckReport {
            path: path.display().to_string(),
            valid: true,
            rules: set.rules.len(),
            fallback: Some(set.fallback),
            errors: Vec::new(),
        },
        Err(e) => RuleCheckReport {
            path: path.display().to_string(),
            valid: false,
            rules: 0,
            fallback: None,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Rule(format!(
            "{} is not a valid rule set",
            report.path
        )));
    }

    Ok(())
}

#[derive(Serialize)]
pub struct RuleListReport {
    pub source: String,
    pub total: usize,
    pub rules: Vec<RuleEntry>,
    pub fallback: AttackCategory,
}

#[derive(Serialize)]
pub struct RuleEntry {
    pub priority: usize,
    pub id: String,
    pub category: AttackCategory,
    /// Clauses rendered as `service~(a|b) message~(c)`; clauses are AND'd.
    pub conditions: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl RuleListReport {
    fn from_labeler(labeler: &HeuristicLabeler, source: String) -> Self {
        let rules: Vec<RuleEntry> = labeler
            .rules()
            .iter()
            .enumerate()
            .map(|(idx, rule)| RuleEntry::from_rule(idx + 1, rule))
            .collect();
        Self {
            source,
            total: rules.len(),
            rules,
            fallback: labeler.fallback(),
        }
    }
}

impl RuleEntry {
    fn from_rule(priority: usize, rule: &LabelRule) -> Self {
        let conditions = rule
            .when
            .iter()
            .map(|clause| {
                let mut parts = Vec::new();
                if !clause.service.is_empty() {
                    parts.push(format!("service~({})", clause.service.join("|")));
                }
                if !clause.message.is_empty() {
                    parts.push(format!("message~({})", clause.message.join("|")));
                }
                parts.join(" or ")
            })
            .collect();
        Self {
            priority,
            id: rule.id.clone(),
            category: rule.category,
            conditions,
            description: rule.description.clone(),
        }
    }
}

impl Render for RuleListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Label Rules ({} total, source: {})",
            self.total.to_string().bold(),
            self.source
        )?;
        writeln!(w)?;
        writeln!(
            w,
            "{:<4} {:<28} {:<22} Conditions",
            "#", "ID", "Category"
        )?;
        writeln!(w, "{}", "-".repeat(90))?;

        for r in &self.rules {
            writeln!(
                w,
                "{:<4} {:<28} {:<22} {}",
                r.priority,
                r.id,
                r.category.label(),
                r.conditions.join(" and ")
            )?;
        }

        writeln!(w, "{}", "-".repeat(90))?;
        writeln!(w, "Fallback: {}", self.fallback.label().yellow())?;

        Ok(())
    }
}

#[derive(Serialize)]
pub struct RuleCheckReport {
    pub path: String,
    pub valid: bool,
    pub rules: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<AttackCategory>,
    pub errors: Vec<String>,
}

impl Render for RuleCheckReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Rule Check: {}", self.path.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
            writeln!(w, "  Rules: {}", self.rules)?;
            if let Some(fallback) = self.fallback {
                writeln!(w, "  Fallback: {}", fallback.label())?;
            }
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}

#[derive(Serialize)]
pub struct LabelReport {
    pub source: String,
    pub service: String,
    pub message: String,
    pub category: AttackCategory,
    /// `None` when no rule matched and the fallback applied.
    pub rule_id: Option<String>,
}

impl LabelReport {
    fn evaluate(
        labeler: &HeuristicLabeler,
        source: String,
        service: String,
        message: String,
    ) -> Self {
        let verdict = labeler.explain_fields(&service, &message);
        Self {
            category: verdict.category,
            rule_id: verdict.rule_id.map(str::to_owned),
            source,
            service,
            message,
        }
    }
}

impl Render for LabelReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Service:  {}", self.service)?;
        writeln!(w, "Message:  {}", self.message)?;
        writeln!(w, "Category: {}", self.category.label().bold())?;
        match &self.rule_id {
            Some(id) => writeln!(w, "Rule:     {} ({})", id, self.source)?,
            None => writeln!(w, "Rule:     {}", "(fallback)".yellow())?,
        }
        Ok(())
    }
}
