//! 카운트 벡터라이저
//!
//! # 아티팩트 형식
//! ```json
//! {
//!   "vocabulary": {"dionaea": 0, "login": 1, "sql": 2},
//!   "lowercase": true,
//!   "binary": false,
//!   "token_pattern": "(?u)\\b\\w\\w+\\b"
//! }
//! ```
//! 메시지를 `token_pattern`으로 토큰화하고, 어휘에 있는 토큰의 열을 1씩
//! 증가시킵니다 (`binary`면 1로 고정). 어휘에 없는 토큰은 무시됩니다.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use honeylens_core::error::ArtifactError;
use honeylens_core::pipeline::TextFeatureEncoder;
use honeylens_core::types::FeatureMatrix;

use crate::error::AnalysisError;

/// 기본 토큰 패턴 (2글자 이상 단어)
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

#[derive(Debug, Deserialize)]
struct VectorizerArtifact {
    vocabulary: HashMap<String, usize>,
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default)]
    binary: bool,
    #[serde(default = "default_token_pattern")]
    token_pattern: String,
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_owned()
}

/// 고정 어휘 카운트 벡터라이저
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    vocabulary: HashMap<String, usize>,
    tokenizer: Regex,
    lowercase: bool,
    binary: bool,
}

impl CountVectorizer {
    /// JSON 아티팩트 파일에서 벡터라이저를 로드합니다.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let artifact: VectorizerArtifact = super::read_json_artifact(path)?;
        let vectorizer = Self::from_artifact(artifact, &path.display().to_string())?;

        tracing::info!(
            path = %path.display(),
            width = vectorizer.width(),
            binary = vectorizer.binary,
            "loaded vectorizer"
        );

        Ok(vectorizer)
    }

    /// JSON 문자열에서 벡터라이저를 생성합니다.
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let artifact: VectorizerArtifact =
            serde_json::from_str(json).map_err(|e| AnalysisError::ArtifactLoad {
                path: "(inline)".to_owned(),
                reason: format!("invalid artifact JSON: {e}"),
            })?;
        Self::from_artifact(artifact, "(inline)")
    }

    /// 어휘와 기본 옵션으로 벡터라이저를 생성합니다.
    pub fn from_vocabulary<I, S>(tokens: I) -> Result<Self, AnalysisError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vocabulary = tokens
            .into_iter()
            .enumerate()
            .map(|(col, token)| (token.into(), col))
            .collect();
        Self::from_artifact(
            VectorizerArtifact {
                vocabulary,
                lowercase: true,
                binary: false,
                token_pattern: default_token_pattern(),
            },
            "(in-memory)",
        )
    }

    fn from_artifact(artifact: VectorizerArtifact, source: &str) -> Result<Self, AnalysisError> {
        let invalid = |reason: String| AnalysisError::ArtifactLoad {
            path: source.to_owned(),
            reason,
        };

        if artifact.vocabulary.is_empty() {
            return Err(invalid("vocabulary is empty".to_owned()));
        }

        let width = artifact.vocabulary.len();
        let mut seen = vec![false; width];
        for (token, &col) in &artifact.vocabulary {
            if col >= width {
                return Err(invalid(format!(
                    "column {col} of token '{token}' out of range (vocabulary size {width})"
                )));
            }
            if std::mem::replace(&mut seen[col], true) {
                return Err(invalid(format!("column {col} assigned to more than one token")));
            }
        }

        let tokenizer = Regex::new(&artifact.token_pattern)
            .map_err(|e| invalid(format!("invalid token_pattern: {e}")))?;

        Ok(Self {
            vocabulary: artifact.vocabulary,
            tokenizer,
            lowercase: artifact.lowercase,
            binary: artifact.binary,
        })
    }

    fn encode_into(&self, message: &str, row: &mut [f32]) {
        let text = if self.lowercase {
            std::borrow::Cow::Owned(message.to_lowercase())
        } else {
            std::borrow::Cow::Borrowed(message)
        };

        for token in self.tokenizer.find_iter(&text) {
            if let Some(&col) = self.vocabulary.get(token.as_str()) {
                if self.binary {
                    row[col] = 1.0;
                } else {
                    row[col] += 1.0;
                }
            }
        }
    }
}

impl TextFeatureEncoder for CountVectorizer {
    fn name(&self) -> &str {
        "count_vectorizer"
    }

    fn width(&self) -> usize {
        self.vocabulary.len()
    }

    fn encode(&self, messages: &[&str]) -> Result<FeatureMatrix, ArtifactError> {
        let mut matrix = FeatureMatrix::zeros(messages.len(), self.width());
        for (idx, message) in messages.iter().enumerate() {
            let row = matrix.row_mut(idx).ok_or_else(|| ArtifactError::Inference {
                stage: "encode".to_owned(),
                batch_size: messages.len(),
                reason: format!("row {idx} missing from feature matrix"),
            })?;
            self.encode_into(message, row);
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectorizer() -> CountVectorizer {
        CountVectorizer::from_json(
            r#"{"vocabulary": {"dionaea": 0, "login": 1, "sql": 2, "script": 3}}"#,
        )
        .unwrap()
    }

    #[test]
    fn counts_known_tokens() {
        let m = vectorizer()
            .encode(&["/dionaea/login?q=SQL sql", "/dionaea/index"])
            .unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.width(), 4);
        assert_eq!(m.row(0).unwrap(), &[1.0, 1.0, 2.0, 0.0]);
        assert_eq!(m.row(1).unwrap(), &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn unknown_tokens_contribute_nothing() {
        let m = vectorizer().encode(&["never seen tokens"]).unwrap();
        assert!(m.row(0).unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn single_char_tokens_are_ignored() {
        let v = CountVectorizer::from_vocabulary(["a", "ab"]).unwrap();
        let m = v.encode(&["a ab a ab"]).unwrap();
        assert_eq!(m.row(0).unwrap(), &[0.0, 2.0]);
    }

    #[test]
    fn binary_caps_counts_at_one() {
        let v = CountVectorizer::from_json(r#"{"vocabulary": {"sql": 0}, "binary": true}"#)
            .unwrap();
        let m = v.encode(&["sql sql sql"]).unwrap();
        assert_eq!(m.row(0).unwrap(), &[1.0]);
    }

    #[test]
    fn lowercase_false_is_case_sensitive() {
        let v = CountVectorizer::from_json(r#"{"vocabulary": {"SQL": 0}, "lowercase": false}"#)
            .unwrap();
        let m = v.encode(&["SQL sql"]).unwrap();
        assert_eq!(m.row(0).unwrap(), &[1.0]);
    }

    #[test]
    fn empty_batch_yields_empty_matrix() {
        let m = vectorizer().encode(&[]).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.width(), 4);
    }

    #[test]
    fn sparse_columns_are_rejected() {
        let err = CountVectorizer::from_json(r#"{"vocabulary": {"a": 0, "b": 5}}"#).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let err = CountVectorizer::from_json(r#"{"vocabulary": {"aa": 1, "bb": 1}}"#).unwrap_err();
        assert!(err.to_string().contains("more than one token"));
    }

    #[test]
    fn empty_vocabulary_is_rejected() {
        assert!(CountVectorizer::from_json(r#"{"vocabulary": {}}"#).is_err());
    }

    #[test]
    fn invalid_token_pattern_is_rejected() {
        let err =
            CountVectorizer::from_json(r#"{"vocabulary": {"aa": 0}, "token_pattern": "(["}"#)
                .unwrap_err();
        assert!(matches!(err, AnalysisError::ArtifactLoad { .. }));
    }

    #[test]
    fn load_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectorizer.json");
        std::fs::write(&path, r#"{"vocabulary": {"ftp": 0, "ssh": 1}}"#).unwrap();
        let v = CountVectorizer::load(&path).unwrap();
        assert_eq!(v.width(), 2);
        assert_eq!(v.name(), "count_vectorizer");
    }
}
