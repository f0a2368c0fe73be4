//! 선형 다중 클래스 분류기
//!
//! # 아티팩트 형식
//! ```json
//! {
//!   "classes": ["SQL Injection", "SSH Attack", "Other Attack"],
//!   "coefficients": [[0.1, 2.0, ...], [...], [...]],
//!   "intercepts": [0.0, -0.5, 0.2]
//! }
//! ```
//! 행마다 `intercepts[c] + coefficients[c] · x`가 가장 큰 클래스를 고릅니다.
//! 동점이면 인덱스가 작은 클래스가 선택됩니다.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use honeylens_core::error::ArtifactError;
use honeylens_core::pipeline::AttackClassifier;
use honeylens_core::types::{AttackCategory, FeatureMatrix};

use crate::error::AnalysisError;

#[derive(Debug, Deserialize)]
struct ClassifierArtifact {
    classes: Vec<String>,
    coefficients: Vec<Vec<f32>>,
    intercepts: Vec<f32>,
}

/// 선형 분류기
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    classes: Vec<AttackCategory>,
    /// 클래스별 계수 (행 우선, `classes.len() * width`)
    weights: Vec<f32>,
    intercepts: Vec<f32>,
    width: usize,
}

impl LinearClassifier {
    /// JSON 아티팩트 파일에서 분류기를 로드합니다.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let artifact: ClassifierArtifact = super::read_json_artifact(path)?;
        let classifier = Self::from_artifact(artifact, &path.display().to_string())?;

        tracing::info!(
            path = %path.display(),
            classes = classifier.classes.len(),
            width = classifier.width,
            "loaded classifier"
        );

        Ok(classifier)
    }

    /// JSON 문자열에서 분류기를 생성합니다.
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let artifact: ClassifierArtifact =
            serde_json::from_str(json).map_err(|e| AnalysisError::ArtifactLoad {
                path: "(inline)".to_owned(),
                reason: format!("invalid artifact JSON: {e}"),
            })?;
        Self::from_artifact(artifact, "(inline)")
    }

    /// 분류 대상 유형 목록 (아티팩트 순서)
    pub fn classes(&self) -> &[AttackCategory] {
        &self.classes
    }

    fn from_artifact(artifact: ClassifierArtifact, source: &str) -> Result<Self, AnalysisError> {
        let invalid = |reason: String| AnalysisError::ArtifactLoad {
            path: source.to_owned(),
            reason,
        };

        let n_classes = artifact.classes.len();
        if n_classes < 2 {
            return Err(invalid(format!(
                "at least 2 classes required, found {n_classes}"
            )));
        }

        let mut classes = Vec::with_capacity(n_classes);
        let mut seen = HashSet::new();
        for label in &artifact.classes {
            let category: AttackCategory = label
                .parse()
                .map_err(|e| invalid(format!("class label: {e}")))?;
            if !seen.insert(category) {
                return Err(invalid(format!("duplicate class '{category}'")));
            }
            classes.push(category);
        }

        if artifact.coefficients.len() != n_classes {
            return Err(invalid(format!(
                "expected {n_classes} coefficient rows, found {}",
                artifact.coefficients.len()
            )));
        }

        if artifact.intercepts.len() != n_classes {
            return Err(invalid(format!(
                "expected {n_classes} intercepts, found {}",
                artifact.intercepts.len()
            )));
        }

        let width = artifact.coefficients[0].len();
        if width == 0 {
            return Err(invalid("coefficient rows must not be empty".to_owned()));
        }

        let mut weights = Vec::with_capacity(n_classes * width);
        for (idx, row) in artifact.coefficients.iter().enumerate() {
            if row.len() != width {
                return Err(invalid(format!(
                    "coefficient row {idx} has width {}, expected {width}",
                    row.len()
                )));
            }
            weights.extend_from_slice(row);
        }

        if !weights
            .iter()
            .chain(artifact.intercepts.iter())
            .all(|v| v.is_finite())
        {
            return Err(invalid("coefficients must be finite".to_owned()));
        }

        Ok(Self {
            classes,
            weights,
            intercepts: artifact.intercepts,
            width,
        })
    }

    fn score(&self, class: usize, row: &[f32]) -> f32 {
        let coef = &self.weights[class * self.width..(class + 1) * self.width];
        self.intercepts[class] + coef.iter().zip(row).map(|(w, x)| w * x).sum::<f32>()
    }
}

impl AttackClassifier for LinearClassifier {
    fn name(&self) -> &str {
        "linear_classifier"
    }

    fn expected_width(&self) -> usize {
        self.width
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<AttackCategory>, ArtifactError> {
        let batch_size = features.rows();
        let inference_error = |reason: String| ArtifactError::Inference {
            stage: "predict".to_owned(),
            batch_size,
            reason,
        };

        if features.width() != self.width {
            return Err(inference_error(format!(
                "feature width {} does not match classifier width {}",
                features.width(),
                self.width
            )));
        }

        let mut predictions = Vec::with_capacity(batch_size);
        for (row_idx, row) in features.iter_rows().enumerate() {
            let mut best = 0;
            let mut best_score = f32::NEG_INFINITY;
            for class in 0..self.classes.len() {
                let score = self.score(class, row);
                if !score.is_finite() {
                    return Err(inference_error(format!(
                        "non-finite score for row {row_idx}"
                    )));
                }
                if score > best_score {
                    best = class;
                    best_score = score;
                }
            }
            predictions.push(self.classes[best]);
        }

        if predictions.len() != batch_size {
            return Err(inference_error(format!(
                "produced {} predictions for {batch_size} rows",
                predictions.len()
            )));
        }

        Ok(predictions)
    }
}
