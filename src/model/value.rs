use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::item::{Assignee, ItemContent, ParentRef};

/// Selected option of a single-select value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRef {
    pub name_with_owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A linked pull request or issue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Canonical value of one item for one field.
///
/// Every raw value normalizes to exactly one of these; `Missing` and
/// `Unknown` are the fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum NormalizedValue {
    /// Title synthesized from the item content; keeps the raw node and the
    /// content so renderers can reach sibling data (status color, link).
    Title {
        field_id: String,
        text: String,
        content: Box<ItemContent>,
        raw: Value,
    },
    Text {
        field_id: String,
        text: String,
    },
    Number {
        field_id: String,
        number: Option<f64>,
    },
    Date {
        field_id: String,
        date: String,
    },
    SingleSelect {
        field_id: String,
        option: SelectedOption,
    },
    Labels {
        field_id: String,
        labels: Vec<Label>,
    },
    Repository {
        field_id: String,
        repository: RepositoryRef,
    },
    PullRequest {
        field_id: String,
        pull_requests: Vec<LinkedItem>,
    },
    Issue {
        field_id: String,
        issues: Vec<LinkedItem>,
    },
    RequestedReviewers {
        field_id: String,
        reviewers: Vec<Assignee>,
    },
    Assignees {
        field_id: String,
        assignees: Vec<Assignee>,
    },
    Iteration {
        field_id: String,
        iteration_id: String,
        title: String,
        start_date: Option<String>,
        duration: Option<u32>,
    },
    Milestone {
        field_id: String,
        milestone: MilestoneRef,
    },
    SubIssuesProgress {
        field_id: String,
        total: u64,
        done: u64,
        percent: f64,
    },
    ParentIssue {
        field_id: String,
        parent: ParentRef,
    },
    Missing {
        field_id: String,
        field_name: String,
    },
    Unknown {
        field_id: Option<String>,
        field_name: Option<String>,
        raw: Value,
    },
}

impl NormalizedValue {
    /// The `type` tag of this variant
    pub fn kind(&self) -> &'static str {
        match self {
            NormalizedValue::Title { .. } => "title",
            NormalizedValue::Text { .. } => "text",
            NormalizedValue::Number { .. } => "number",
            NormalizedValue::Date { .. } => "date",
            NormalizedValue::SingleSelect { .. } => "single_select",
            NormalizedValue::Labels { .. } => "labels",
            NormalizedValue::Repository { .. } => "repository",
            NormalizedValue::PullRequest { .. } => "pull_request",
            NormalizedValue::Issue { .. } => "issue",
            NormalizedValue::RequestedReviewers { .. } => "requested_reviewers",
            NormalizedValue::Assignees { .. } => "assignees",
            NormalizedValue::Iteration { .. } => "iteration",
            NormalizedValue::Milestone { .. } => "milestone",
            NormalizedValue::SubIssuesProgress { .. } => "sub_issues_progress",
            NormalizedValue::ParentIssue { .. } => "parent_issue",
            NormalizedValue::Missing { .. } => "missing",
            NormalizedValue::Unknown { .. } => "unknown",
        }
    }

    /// The id of the field this value belongs to, when known
    pub fn field_id(&self) -> Option<&str> {
        match self {
            NormalizedValue::Title { field_id, .. }
            | NormalizedValue::Text { field_id, .. }
            | NormalizedValue::Number { field_id, .. }
            | NormalizedValue::Date { field_id, .. }
            | NormalizedValue::SingleSelect { field_id, .. }
            | NormalizedValue::Labels { field_id, .. }
            | NormalizedValue::Repository { field_id, .. }
            | NormalizedValue::PullRequest { field_id, .. }
            | NormalizedValue::Issue { field_id, .. }
            | NormalizedValue::RequestedReviewers { field_id, .. }
            | NormalizedValue::Assignees { field_id, .. }
            | NormalizedValue::Iteration { field_id, .. }
            | NormalizedValue::Milestone { field_id, .. }
            | NormalizedValue::SubIssuesProgress { field_id, .. }
            | NormalizedValue::ParentIssue { field_id, .. }
            | NormalizedValue::Missing { field_id, .. } => Some(field_id),
            NormalizedValue::Unknown { field_id, .. } => field_id.as_deref(),
        }
    }

    /// Whether this value counts as present for `has:` / `no:` qualifiers
    pub fn has_content(&self) -> bool {
        match self {
            NormalizedValue::Labels { labels, .. } => !labels.is_empty(),
            NormalizedValue::Text { text, .. } | NormalizedValue::Title { text, .. } => {
                !text.trim().is_empty()
            }
            NormalizedValue::Number { number, .. } => number.is_some(),
            NormalizedValue::Assignees { assignees, .. } => !assignees.is_empty(),
            NormalizedValue::RequestedReviewers { reviewers, .. } => !reviewers.is_empty(),
            NormalizedValue::PullRequest { pull_requests, .. } => !pull_requests.is_empty(),
            NormalizedValue::Issue { issues, .. } => !issues.is_empty(),
            NormalizedValue::Date { date, .. } => !date.is_empty(),
            NormalizedValue::SingleSelect { option, .. } => !option.name.is_empty(),
            NormalizedValue::Iteration { iteration_id, title, .. } => {
                !iteration_id.is_empty() || !title.is_empty()
            }
            NormalizedValue::Repository { repository, .. } => {
                !repository.name_with_owner.is_empty()
            }
            NormalizedValue::Milestone { milestone, .. } => !milestone.title.is_empty(),
            NormalizedValue::SubIssuesProgress { total, .. } => *total > 0,
            NormalizedValue::ParentIssue { parent, .. } => {
                parent.number.is_some() || parent.title.is_some()
            }
            NormalizedValue::Missing { .. } => false,
            NormalizedValue::Unknown { raw, .. } => !is_blank_json(raw),
        }
    }

    /// Numeric payload, for comparator and range qualifiers
    pub fn as_number(&self) -> Option<f64> {
        match self {
            NormalizedValue::Number { number, .. } => *number,
            _ => None,
        }
    }
}

/// A JSON value is blank when it is null, an empty array, or an empty object
pub fn is_blank_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}
