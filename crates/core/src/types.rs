//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 파서, 레이블러, 분류기, 집계기가 공유하는 데이터 구조를 정의합니다.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 공격 유형
///
/// 휴리스틱 레이블과 예측 레이블이 모두 이 닫힌 열거형 중 하나를 가집니다.
/// 선언 순서가 곧 휴리스틱 캐스케이드의 우선순위 순서이며,
/// 집계에서 동률일 때의 정렬 기준으로도 쓰입니다.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AttackCategory {
    SqlInjection,
    CrossSiteScripting,
    HttpAttack,
    FtpAttack,
    SipAttack,
    SshAttack,
    DnsAttack,
    LogSqliteAttack,
    MalwareDownload,
    /// 캐스케이드의 기본값
    OtherAttack,
}

impl AttackCategory {
    /// 모든 유형 (선언 순서)
    pub const ALL: [AttackCategory; 10] = [
        Self::SqlInjection,
        Self::CrossSiteScripting,
        Self::HttpAttack,
        Self::FtpAttack,
        Self::SipAttack,
        Self::SshAttack,
        Self::DnsAttack,
        Self::LogSqliteAttack,
        Self::MalwareDownload,
        Self::OtherAttack,
    ];

    /// 사람이 읽는 표시 이름 (예: `"SQL Injection"`)
    pub fn label(&self) -> &'static str {
        match self {
            Self::SqlInjection => "SQL Injection",
            Self::CrossSiteScripting => "Cross-Site Scripting",
            Self::HttpAttack => "HTTP Attack",
            Self::FtpAttack => "FTP Attack",
            Self::SipAttack => "SIP Attack",
            Self::SshAttack => "SSH Attack",
            Self::DnsAttack => "DNS Attack",
            Self::LogSqliteAttack => "Log_SQLite Attack",
            Self::MalwareDownload => "Malware Download",
            Self::OtherAttack => "Other Attack",
        }
    }

    /// 대소문자, 공백, `_`, `-`를 무시하고 비교하기 위한 정규화 키
    fn normalized_key(s: &str) -> String {
        s.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect()
    }
}

impl fmt::Display for AttackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 알 수 없는 공격 유형 이름
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown attack category: '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for AttackCategory {
    type Err = UnknownCategory;

    /// 표시 이름(`"SQL Injection"`), 변형 이름(`"SQLInjection"`),
    /// snake_case(`"sql_injection"`)를 모두 받아들입니다.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = Self::normalized_key(s);
        Self::ALL
            .iter()
            .copied()
            .find(|c| Self::normalized_key(c.label()) == key)
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

/// 파싱된 허니팟 로그 레코드
///
/// 세 가지 구조 패턴(타임스탬프, 서비스, 메시지)이 모두 매칭된 라인에서만 생성됩니다.
/// 생성 이후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// `DDMMYYYY HH:MM:SS` 형식의 원본 타임스탬프 (대괄호 제외)
    pub timestamp: String,
    /// 발생 서비스 토큰 (예: `httpd`, `sshd`)
    pub service: String,
    /// 구조 마커(`/dionaea/`)부터 라인 끝까지의 메시지
    pub message: String,
    /// 원본 파일 경로 (진단용)
    #[serde(default)]
    pub source: String,
    /// 원본 라인 번호 (1부터 시작, 진단용)
    #[serde(default)]
    pub line_number: usize,
}

impl LogRecord {
    /// 출처 정보 없이 레코드를 생성합니다.
    pub fn new(
        timestamp: impl Into<String>,
        service: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            service: service.into(),
            message: message.into(),
            source: String::new(),
            line_number: 0,
        }
    }

    /// 출처 정보를 붙입니다.
    pub fn with_origin(mut self, source: impl Into<String>, line_number: usize) -> Self {
        self.source = source.into();
        self.line_number = line_number;
        self
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.timestamp, self.service, self.message)
    }
}

/// 두 개의 독립 레이블이 붙은 레코드
///
/// `heuristic_category`는 규칙 캐스케이드 결과, `predicted_category`는
/// 통계 분류기 결과입니다. 두 값은 서로의 입력으로 쓰이지 않으며
/// 병합하지 않고 별도 필드로 유지합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledRecord {
    #[serde(flatten)]
    pub record: LogRecord,
    /// 규칙 기반 레이블 (항상 존재)
    pub heuristic_category: AttackCategory,
    /// 분류기 예측 레이블 (예측 단계 이후 존재)
    pub predicted_category: Option<AttackCategory>,
}

impl LabeledRecord {
    /// 휴리스틱 레이블만 붙은 레코드를 생성합니다.
    pub fn new(record: LogRecord, heuristic_category: AttackCategory) -> Self {
        Self {
            record,
            heuristic_category,
            predicted_category: None,
        }
    }

    /// 예측 레이블을 붙인 새 레코드를 반환합니다.
    pub fn with_prediction(mut self, predicted: AttackCategory) -> Self {
        self.predicted_category = Some(predicted);
        self
    }

    /// 두 레이블이 모두 존재하고 같은지 여부
    pub fn agrees(&self) -> bool {
        self.predicted_category == Some(self.heuristic_category)
    }
}

/// 행렬 형태 불일치
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("shape mismatch: expected {expected} values, got {actual}")]
pub struct ShapeError {
    pub expected: usize,
    pub actual: usize,
}

/// 행 우선(row-major) 밀집 특징 행렬
///
/// 모든 행은 생성 시 지정한 폭을 가집니다. 역직렬화도 `data.len() == rows * width`를
/// 검사하므로 형태가 깨진 행렬은 만들어지지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureMatrix")]
pub struct FeatureMatrix {
    width: usize,
    rows: usize,
    data: Vec<f32>,
}

/// 검사 전 역직렬화 형태
#[derive(Deserialize)]
struct RawFeatureMatrix {
    width: usize,
    rows: usize,
    data: Vec<f32>,
}

impl TryFrom<RawFeatureMatrix> for FeatureMatrix {
    type Error = ShapeError;

    fn try_from(raw: RawFeatureMatrix) -> Result<Self, Self::Error> {
        let expected = raw.rows.checked_mul(raw.width).ok_or(ShapeError {
            expected: usize::MAX,
            actual: raw.data.len(),
        })?;
        if raw.data.len() != expected {
            return Err(ShapeError {
                expected,
                actual: raw.data.len(),
            });
        }
        Ok(Self {
            width: raw.width,
            rows: raw.rows,
            data: raw.data,
        })
    }
}

impl FeatureMatrix {
    /// 빈 행렬을 생성합니다.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            rows: 0,
            data: Vec::new(),
        }
    }

    /// 모든 값이 0인 `rows x width` 행렬을 생성합니다.
    pub fn zeros(rows: usize, width: usize) -> Self {
        Self {
            width,
            rows,
            data: vec![0.0; rows * width],
        }
    }

    /// 행을 추가합니다.
    pub fn push_row(&mut self, row: &[f32]) -> Result<(), ShapeError> {
        if row.len() != self.width {
            return Err(ShapeError {
                expected: self.width,
                actual: row.len(),
            });
        }
        self.data.extend_from_slice(row);
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// `index`번째 행. 범위를 벗어나면 `None`.
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index.checked_mul(self.width)?;
        self.data.get(start..start.checked_add(self.width)?)
    }

    /// `index`번째 행의 가변 참조
    pub fn row_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index.checked_mul(self.width)?;
        let end = start.checked_add(self.width)?;
        self.data.get_mut(start..end)
    }

    /// 행 반복자
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        (0..self.rows).filter_map(move |i| self.row(i))
    }
}
