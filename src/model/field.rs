use chrono::{Days, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::normalize::color::resolve_option_color;

/// The kind of data a project field holds.
///
/// Unrecognized names are carried through as `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    Text,
    Number,
    Date,
    SingleSelect,
    Iteration,
    Assignees,
    Reviewers,
    Labels,
    Milestone,
    Repository,
    LinkedPullRequests,
    Tracks,
    ParentIssue,
    SubIssuesProgress,
    Title,
    Other(String),
}

impl DataType {
    /// Parse a data type name, case-insensitively
    pub fn parse(name: &str) -> DataType {
        let upper = name.trim().to_uppercase();
        match upper.as_str() {
            "TEXT" => DataType::Text,
            "NUMBER" => DataType::Number,
            "DATE" => DataType::Date,
            "SINGLE_SELECT" => DataType::SingleSelect,
            "ITERATION" => DataType::Iteration,
            "ASSIGNEES" => DataType::Assignees,
            "REVIEWERS" => DataType::Reviewers,
            "LABELS" => DataType::Labels,
            "MILESTONE" => DataType::Milestone,
            "REPOSITORY" => DataType::Repository,
            "LINKED_PULL_REQUESTS" => DataType::LinkedPullRequests,
            "TRACKS" | "TRACKED_BY" => DataType::Tracks,
            "PARENT_ISSUE" => DataType::ParentIssue,
            "SUB_ISSUES_PROGRESS" => DataType::SubIssuesProgress,
            "TITLE" => DataType::Title,
            _ => DataType::Other(upper),
        }
    }

    /// The canonical upper-case name
    pub fn as_str(&self) -> &str {
        match self {
            DataType::Text => "TEXT",
            DataType::Number => "NUMBER",
            DataType::Date => "DATE",
            DataType::SingleSelect => "SINGLE_SELECT",
            DataType::Iteration => "ITERATION",
            DataType::Assignees => "ASSIGNEES",
            DataType::Reviewers => "REVIEWERS",
            DataType::Labels => "LABELS",
            DataType::Milestone => "MILESTONE",
            DataType::Repository => "REPOSITORY",
            DataType::LinkedPullRequests => "LINKED_PULL_REQUESTS",
            DataType::Tracks => "TRACKS",
            DataType::ParentIssue => "PARENT_ISSUE",
            DataType::SubIssuesProgress => "SUB_ISSUES_PROGRESS",
            DataType::Title => "TITLE",
            DataType::Other(s) => s,
        }
    }
}

impl From<String> for DataType {
    fn from(s: String) -> Self {
        DataType::parse(&s)
    }
}

impl From<DataType> for String {
    fn from(dt: DataType) -> Self {
        dt.as_str().to_string()
    }
}

/// One selectable option of a single-select, label, milestone or repository field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw color token (hex or palette name), resolved on demand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl FieldOption {
    /// Canonical `#rrggbb` color for this option, if its token resolves
    pub fn hex_color(&self) -> Option<String> {
        self.color.as_deref().and_then(resolve_option_color)
    }
}

/// One iteration of an iteration field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Iteration {
    pub id: String,
    pub title: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// Length in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl Iteration {
    /// Last day (exclusive) of the iteration, when the start date parses
    pub fn end_date(&self) -> Option<NaiveDate> {
        let start = NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d").ok()?;
        start.checked_add_days(Days::new(u64::from(self.duration?)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfiguration {
    #[serde(default)]
    pub iterations: Vec<Iteration>,
}

/// Canonical description of one project field (a table column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub id: String,
    pub name: String,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    /// Per-repository option vocabularies, keyed by `owner/name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_options: Option<IndexMap<String, Vec<FieldOption>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<FieldConfiguration>,
}

impl FieldConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>, data_type: DataType) -> Self {
        FieldConfig {
            id: id.into(),
            name: name.into(),
            data_type,
            options: None,
            repo_options: None,
            configuration: None,
        }
    }

    /// Find an option by id or case-insensitive name.
    ///
    /// When `repo` is given, that repository's vocabulary is consulted first.
    pub fn find_option(&self, key: &str, repo: Option<&str>) -> Option<&FieldOption> {
        let matches = |o: &&FieldOption| o.id == key || names_match(&o.name, key);
        let from_repo = repo.and_then(|r| {
            self.repo_options
                .as_ref()?
                .iter()
                .find(|(k, _)| names_match(k, r))
                .and_then(|(_, opts)| opts.iter().find(matches))
        });
        from_repo.or_else(|| self.options.as_ref()?.iter().find(matches))
    }

    /// Find an iteration by id
    pub fn find_iteration(&self, id: &str) -> Option<&Iteration> {
        self.configuration
            .as_ref()?
            .iterations
            .iter()
            .find(|it| it.id == id)
    }

    /// Whether this field holds the item title
    pub fn is_title(&self) -> bool {
        self.data_type == DataType::Title || names_match(&self.name, "title")
    }
}

/// Compare two names ignoring surrounding whitespace and case.
///
/// Folds with full Unicode lowercasing so "Étape" and "étape" agree.
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
