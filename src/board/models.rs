use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{BoardError, ValidationErrors};

/// Identifier of a board column (a workflow status).
///
/// The backend sends column ids as strings in the board payload and as
/// integers everywhere else; both forms deserialize, and the id always
/// serializes as a string so it can key a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnId(pub i64);

impl ColumnId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ColumnId {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(ColumnId)
            .map_err(|_| BoardError::InvalidColumnId(s.to_string()))
    }
}

impl Serialize for ColumnId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

struct ColumnIdVisitor;

impl Visitor<'_> for ColumnIdVisitor {
    type Value = ColumnId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a column id as an integer or an integer string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ColumnId, E> {
        Ok(ColumnId(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ColumnId, E> {
        i64::try_from(v)
            .map(ColumnId)
            .map_err(|_| E::custom(format!("column id {} out of range", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ColumnId, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for ColumnId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ColumnIdVisitor)
    }
}

/// A person assigned to an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignee {
    pub id: i64,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Read-projection of a backend issue, as shown on a board card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Numeric issue id, used in every backend call.
    pub id: i64,
    /// Display key such as `PRJ-12`; unique on the board.
    #[serde(rename = "issueId")]
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub epic_name: Option<String>,
    #[serde(default)]
    pub epic_link_id: Option<i64>,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub issue_type_id: Option<i64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, rename = "avatarUrl")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub assignees: Vec<Assignee>,
}

impl Card {
    /// Minimal card, mostly useful for seeding boards.
    pub fn new(id: i64, key: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
            name: None,
            summary: Some(summary.into()),
            epic_name: None,
            epic_link_id: None,
            issue_type: None,
            issue_type_id: None,
            priority: None,
            points: None,
            role: None,
            avatar_url: None,
            assignees: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(rename = "columnId")]
    pub column_id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub items: Vec<Card>,
}

impl Column {
    pub fn new(column_id: ColumnId, title: impl Into<String>, items: Vec<Card>) -> Self {
        Self {
            column_id,
            title: title.into(),
            items,
        }
    }

    pub fn position_of(&self, card_key: &str) -> Option<usize> {
        self.items.iter().position(|c| c.key == card_key)
    }
}

/// Which board a client is looking at. The board is fetched by workflow,
/// and the workflow id doubles as the board id for column reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardKey {
    pub project_id: i64,
    pub workflow_id: i64,
}

impl BoardKey {
    pub fn new(project_id: i64, workflow_id: i64) -> Self {
        Self {
            project_id,
            workflow_id,
        }
    }

    pub fn board_id(&self) -> i64 {
        self.workflow_id
    }
}

// ── Wire schemas ──────────────────────────────────────────────────────

/// Response of the fetch-board-by-workflow call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoardResponse {
    #[serde(rename = "columnMap", default)]
    pub column_map: BTreeMap<ColumnId, Column>,
    #[serde(rename = "orderedColumnIds", default)]
    pub ordered_column_ids: Vec<ColumnId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderColumnsRequest {
    #[serde(rename = "orderedColumnIds")]
    pub ordered_column_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderCardsRequest {
    #[serde(rename = "orderedIssueIds")]
    pub ordered_issue_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCardRequest {
    #[serde(rename = "targetStatusId")]
    pub target_status_id: i64,
    #[serde(rename = "targetIndex")]
    pub target_index: usize,
}

/// Plain `{message}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ── Workflow statuses ─────────────────────────────────────────────────

/// Longest status name the backend accepts.
pub const MAX_STATUS_NAME_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    ToDo,
    InProgress,
    Done,
}

impl StatusCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToDo => "to_do",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

impl FromStr for StatusCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "to_do" => Ok(Self::ToDo),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(format!(
                "Invalid status category '{}'. Valid values: to_do, in_progress, done",
                s
            )),
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStatus {
    pub id: i64,
    pub workflow_id: i64,
    pub order_index: i64,
    pub status_name: String,
    pub status_category: Option<String>,
    pub is_initial_status: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWorkflowStatus {
    pub workflow_id: i64,
    pub status_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_category: Option<String>,
    #[serde(default)]
    pub is_initial_status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateWorkflowStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_initial_status: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
}

fn check_status_name(errors: &mut ValidationErrors, name: &str) {
    if name.trim().is_empty() {
        errors.push("status_name", "Status name is required");
    } else if name.chars().count() > MAX_STATUS_NAME_LEN {
        errors.push(
            "status_name",
            format!("Status name must be at most {} characters", MAX_STATUS_NAME_LEN),
        );
    }
}

fn check_status_category(errors: &mut ValidationErrors, category: &str) {
    if let Err(msg) = StatusCategory::from_str(category) {
        errors.push("status_category", msg);
    }
}

impl CreateWorkflowStatus {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_status_name(&mut errors, &self.status_name);
        match self.status_category.as_deref() {
            Some(category) => check_status_category(&mut errors, category),
            None => errors.push("status_category", "Status category is required"),
        }
        errors.into_result()
    }
}

impl UpdateWorkflowStatus {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.status_name {
            check_status_name(&mut errors, name);
        }
        if let Some(category) = &self.status_category {
            check_status_category(&mut errors, category);
        }
        errors.into_result()
    }

    pub fn is_empty(&self) -> bool {
        self.status_name.is_none()
            && self.status_category.is_none()
            && self.is_initial_status.is_none()
            && self.order_index.is_none()
    }
}
