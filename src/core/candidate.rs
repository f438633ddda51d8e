/// Sequence candidate model
///
/// A [`Candidate`] is the immutable result of analyzing a list of paths. It is
/// built from an ordered list of [`Column`] classifications, which drive both
/// the composite and the FFMPEG pattern.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Marker rendered in the composite for a column that is neither constant nor continuous
pub const GARBLED_MARKER: &str = "[GARBLED]";

/// Wildcard rendered in the FFMPEG pattern for a garbled column
pub const FFMPEG_WILDCARD: &str = "*";

/// Direction of a continuous numeric column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "ascending",
            Direction::Descending => "descending",
        }
    }
}

/// Direction and signed step of a continuous column.
///
/// Displays as `ascending by 2` or `descending by -2`; the step keeps its sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Order {
    step: i128,
}

impl Order {
    /// Build an order from a non-zero step
    pub fn from_step(step: i128) -> Option<Self> {
        if step == 0 {
            None
        } else {
            Some(Self { step })
        }
    }

    pub fn direction(&self) -> Direction {
        if self.step > 0 {
            Direction::Ascending
        } else {
            Direction::Descending
        }
    }

    pub fn step(&self) -> i128 {
        self.step
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.direction().as_str(), self.step)
    }
}

/// Error returned when an order descriptor cannot be parsed
#[derive(Debug, thiserror::Error)]
#[error("Invalid order descriptor: {0:?}")]
pub struct InvalidOrder(String);

impl FromStr for Order {
    type Err = InvalidOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidOrder(s.to_string());

        let (direction, step) = s.split_once(" by ").ok_or_else(invalid)?;
        let step: i128 = step.trim().parse().map_err(|_| invalid())?;
        let order = Order::from_step(step).ok_or_else(invalid)?;

        let expected = match direction.trim() {
            "ascending" => Direction::Ascending,
            "descending" => Direction::Descending,
            _ => return Err(invalid()),
        };
        if order.direction() != expected {
            return Err(invalid());
        }

        Ok(order)
    }
}

impl From<Order> for String {
    fn from(order: Order) -> Self {
        order.to_string()
    }
}

impl TryFrom<String> for Order {
    type Error = InvalidOrder;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Classification of one token column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    /// Arithmetic progression with a constant non-zero step
    Continuous {
        first: String,
        last: String,
        order: Order,
    },
    /// Every row holds the same token
    Constant(String),
    /// Values differ without forming a progression
    Garbled,
}

impl Column {
    /// Render the column for the human-readable composite
    pub fn composite(&self) -> String {
        match self {
            Column::Continuous { first, last, .. } => format!("[{}-{}]", first, last),
            Column::Constant(literal) => literal.clone(),
            Column::Garbled => GARBLED_MARKER.to_string(),
        }
    }

    /// Render the column for the FFMPEG pattern.
    ///
    /// The placeholder width is the character count of the last value.
    pub fn ffmpeg(&self) -> String {
        match self {
            Column::Continuous { last, .. } => format!("%0{}d", last.chars().count()),
            Column::Constant(literal) => literal.clone(),
            Column::Garbled => FFMPEG_WILDCARD.to_string(),
        }
    }

    pub fn is_continuous(&self) -> bool {
        matches!(self, Column::Continuous { .. })
    }
}

/// Where a candidate's inputs came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateKind {
    /// An explicit list of paths
    SequentialCandidate,
    /// The children of one folder
    SequentialFolder,
}

impl CandidateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateKind::SequentialCandidate => "SequentialCandidate",
            CandidateKind::SequentialFolder => "SequentialFolder",
        }
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable classification of a list of paths.
///
/// Serializes with the field names `type`, `folder_path` (folders only),
/// `args`, `number_of_args`, `sequence`, `composite`, `ffmpeg_composite` and
/// `orders`. Deserialization rejects records whose counts, flags or folder
/// path disagree with each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CandidateRecord")]
pub struct Candidate {
    #[serde(rename = "type")]
    kind: CandidateKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_path: Option<String>,
    args: Vec<String>,
    number_of_args: usize,
    sequence: bool,
    composite: String,
    ffmpeg_composite: String,
    orders: Vec<Order>,
    #[serde(skip)]
    columns: Vec<Column>,
}

impl Candidate {
    /// Assemble a candidate from sorted inputs and their column classifications
    pub(crate) fn from_columns(args: Vec<String>, columns: Vec<Column>) -> Self {
        let composite = columns.iter().map(Column::composite).collect();
        let ffmpeg_composite = columns.iter().map(Column::ffmpeg).collect();
        let orders: Vec<Order> = columns
            .iter()
            .filter_map(|column| match column {
                Column::Continuous { order, .. } => Some(*order),
                _ => None,
            })
            .collect();

        Self {
            kind: CandidateKind::SequentialCandidate,
            folder_path: None,
            number_of_args: args.len(),
            args,
            sequence: columns.iter().any(Column::is_continuous),
            composite,
            ffmpeg_composite,
            orders,
            columns,
        }
    }

    /// Mark the candidate as sourced from a folder
    pub(crate) fn with_folder(mut self, folder_path: String) -> Self {
        self.kind = CandidateKind::SequentialFolder;
        self.folder_path = Some(folder_path);
        self
    }

    pub fn kind(&self) -> CandidateKind {
        self.kind
    }

    pub fn folder_path(&self) -> Option<&str> {
        self.folder_path.as_deref()
    }

    /// Inputs in code-point order
    pub fn inputs(&self) -> &[String] {
        &self.args
    }

    pub fn number_of_args(&self) -> usize {
        self.number_of_args
    }

    /// True when at least one column is continuous
    pub fn is_sequence(&self) -> bool {
        self.sequence
    }

    pub fn composite(&self) -> &str {
        &self.composite
    }

    pub fn ffmpeg_pattern(&self) -> &str {
        &self.ffmpeg_composite
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Column classifications in token order.
    ///
    /// Empty for candidates restored through deserialization.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Human-readable label of the source: the folder path or the composite
    pub fn source(&self) -> &str {
        self.folder_path.as_deref().unwrap_or(&self.composite)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.composite)
    }
}

// Columns are not serialized, so they take no part in equality.
impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.folder_path == other.folder_path
            && self.args == other.args
            && self.number_of_args == other.number_of_args
            && self.sequence == other.sequence
            && self.composite == other.composite
            && self.ffmpeg_composite == other.ffmpeg_composite
            && self.orders == other.orders
    }
}

impl Eq for Candidate {}

/// Serialized form of a candidate, checked before it becomes one
#[derive(Deserialize)]
struct CandidateRecord {
    #[serde(rename = "type")]
    kind: CandidateKind,
    #[serde(default)]
    folder_path: Option<String>,
    args: Vec<String>,
    number_of_args: usize,
    sequence: bool,
    composite: String,
    ffmpeg_composite: String,
    orders: Vec<Order>,
}

/// Error returned when a serialized candidate is inconsistent
#[derive(Debug, thiserror::Error)]
#[error("Inconsistent candidate: {0}")]
pub struct InvalidCandidate(&'static str);

impl TryFrom<CandidateRecord> for Candidate {
    type Error = InvalidCandidate;

    fn try_from(record: CandidateRecord) -> Result<Self, Self::Error> {
        if record.number_of_args != record.args.len() {
            return Err(InvalidCandidate("number_of_args does not match args"));
        }
        if record.sequence == record.orders.is_empty() {
            return Err(InvalidCandidate("sequence does not match orders"));
        }
        let is_folder = record.kind == CandidateKind::SequentialFolder;
        if is_folder != record.folder_path.is_some() {
            return Err(InvalidCandidate("folder_path does not match type"));
        }

        Ok(Self {
            kind: record.kind,
            folder_path: record.folder_path,
            args: record.args,
            number_of_args: record.number_of_args,
            sequence: record.sequence,
            composite: record.composite,
            ffmpeg_composite: record.ffmpeg_composite,
            orders: record.orders,
            columns: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn continuous(first: &str, last: &str, step: i128) -> Column {
        Column::Continuous {
            first: first.to_string(),
            last: last.to_string(),
            order: Order::from_step(step).unwrap(),
        }
    }

    #[test]
    fn test_order_display() {
        assert_eq!(Order::from_step(1).unwrap().to_string(), "ascending by 1");
        assert_eq!(Order::from_step(-2).unwrap().to_string(), "descending by -2");
        assert!(Order::from_step(0).is_none());
    }

    #[test]
    fn test_order_parse() {
        let order: Order = "descending by -3".parse().unwrap();
        assert_eq!(order.direction(), Direction::Descending);
        assert_eq!(order.step(), -3);

        assert!("ascending by -3".parse::<Order>().is_err());
        assert!("ascending by 0".parse::<Order>().is_err());
        assert!("sideways by 1".parse::<Order>().is_err());
        assert!("ascending".parse::<Order>().is_err());
    }

    #[test]
    fn test_column_rendering() {
        let column = continuous("001", "100", 1);
        assert_eq!(column.composite(), "[001-100]");
        assert_eq!(column.ffmpeg(), "%03d");

        let column = Column::Constant(".png".to_string());
        assert_eq!(column.composite(), ".png");
        assert_eq!(column.ffmpeg(), ".png");

        assert_eq!(Column::Garbled.composite(), "[GARBLED]");
        assert_eq!(Column::Garbled.ffmpeg(), "*");
    }

    #[test]
    fn test_from_columns_joins_in_order() {
        let candidate = Candidate::from_columns(
            vec!["a1.png".to_string(), "a2.png".to_string()],
            vec![
                Column::Constant("a".to_string()),
                continuous("1", "2", 1),
                Column::Constant(".png".to_string()),
            ],
        );

        assert_eq!(candidate.composite(), "a[1-2].png");
        assert_eq!(candidate.ffmpeg_pattern(), "a%01d.png");
        assert_eq!(candidate.number_of_args(), 2);
        assert!(candidate.is_sequence());
        assert_eq!(candidate.kind(), CandidateKind::SequentialCandidate);
        assert_eq!(candidate.to_string(), "a[1-2].png");
    }

    #[test]
    fn test_serialized_field_names() {
        let candidate = Candidate::from_columns(
            vec!["x1".to_string(), "x2".to_string()],
            vec![Column::Constant("x".to_string()), continuous("1", "2", 1)],
        )
        .with_folder("/tmp/shots".to_string());

        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["type"], "SequentialFolder");
        assert_eq!(value["folder_path"], "/tmp/shots");
        assert_eq!(value["number_of_args"], 2);
        assert_eq!(value["sequence"], true);
        assert_eq!(value["composite"], "x[1-2]");
        assert_eq!(value["ffmpeg_composite"], "x%01d");
        assert_eq!(value["orders"][0], "ascending by 1");
        assert!(value.get("columns").is_none());

        let restored: Candidate = serde_json::from_value(value).unwrap();
        assert_eq!(restored, candidate);
        assert!(restored.columns().is_empty());
    }

    #[test]
    fn test_inconsistent_records_are_rejected() {
        let candidate = Candidate::from_columns(
            vec!["x1".to_string(), "x2".to_string()],
            vec![Column::Constant("x".to_string()), continuous("1", "2", 1)],
        );
        let value = serde_json::to_value(&candidate).unwrap();

        let mut wrong_count = value.clone();
        wrong_count["number_of_args"] = 3.into();
        assert!(serde_json::from_value::<Candidate>(wrong_count).is_err());

        let mut wrong_flag = value.clone();
        wrong_flag["sequence"] = false.into();
        assert!(serde_json::from_value::<Candidate>(wrong_flag).is_err());

        let mut missing_folder = value.clone();
        missing_folder["type"] = "SequentialFolder".into();
        assert!(serde_json::from_value::<Candidate>(missing_folder).is_err());

        assert!(serde_json::from_value::<Candidate>(value).is_ok());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(CandidateKind::SequentialCandidate.to_string(), "SequentialCandidate");
        assert_eq!(CandidateKind::SequentialFolder.as_str(), "SequentialFolder");
    }

    #[test]
    fn test_list_candidate_omits_folder_path() {
        let candidate = Candidate::from_columns(
            vec!["a".to_string()],
            vec![Column::Constant("a".to_string())],
        );
        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["type"], "SequentialCandidate");
        assert!(value.get("folder_path").is_none());
    }
}
