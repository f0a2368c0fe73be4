//! Command handlers -- one module per subcommand

pub mod analyze;
pub mod config;
pub mod rules;

use std::path::Path;

use honeylens_log_pipeline::HeuristicLabeler;

use crate::error::CliError;

/// Resolve the label cascade used by `analyze` and `rules`.
///
/// Precedence: explicit `--rules` path, then `analysis.rules_path`, then the built-in cascade.
pub(crate) fn resolve_labeler(
    explicit: Option<&Path>,
    configured: Option<&str>,
) -> Result<(HeuristicLabeler, String), CliError> {
    match (explicit, configured) {
        (Some(path), _) => Ok((
            HeuristicLabeler::from_file(path)?,
            path.display().to_string(),
        )),
        (None, Some(path)) => Ok((HeuristicLabeler::from_file(path)?, path.to_owned())),
        (None, None) => Ok((HeuristicLabeler::new(), "built-in".to_owned())),
    }
}
