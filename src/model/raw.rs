//! Serde shapes of the records delivered by the GitHub Projects GraphQL API.
//!
//! Every field is optional: the API omits whatever a query did not select,
//! and the normalizer decides what to fall back to.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A GraphQL connection, delivered either as `{ nodes: [...] }` or as a
/// bare array. Null nodes are tolerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Connection<T> {
    Nodes {
        #[serde(default)]
        nodes: Vec<Option<T>>,
    },
    List(Vec<Option<T>>),
}

impl<T> Connection<T> {
    /// Iterate the non-null nodes
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let nodes = match self {
            Connection::Nodes { nodes } => nodes,
            Connection::List(nodes) => nodes,
        };
        nodes.iter().flatten()
    }
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Connection::List(Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Field metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOption {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIteration {
    pub id: Option<String>,
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIterationConfiguration {
    pub iterations: Option<Vec<RawIteration>>,
    pub completed_iterations: Option<Vec<RawIteration>>,
}

/// Field metadata record (`ProjectV2Field`, `ProjectV2SingleSelectField`,
/// `ProjectV2IterationField`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    #[serde(rename = "__typename")]
    pub typename: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub data_type: Option<String>,
    pub options: Option<Vec<RawOption>>,
    pub repo_options: Option<IndexMap<String, Vec<RawOption>>>,
    pub configuration: Option<RawIterationConfiguration>,
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRepository {
    pub name_with_owner: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    pub id: Option<String>,
    pub login: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub url: Option<String>,
}

/// A linked issue or pull request node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLinked {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub state: Option<String>,
    pub merged: Option<bool>,
    pub repository: Option<RawRepository>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubIssuesSummary {
    pub total: Option<u64>,
    pub completed: Option<u64>,
    pub percent_completed: Option<f64>,
}

/// Item content (`Issue`, `PullRequest`, `DraftIssue`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContent {
    #[serde(rename = "__typename")]
    pub typename: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub number: Option<u64>,
    pub state: Option<String>,
    pub merged: Option<bool>,
    pub repository: Option<RawRepository>,
    pub assignees: Option<Connection<RawUser>>,
    pub parent: Option<RawLinked>,
    pub sub_issues_summary: Option<RawSubIssuesSummary>,
}

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// Back-reference from a value to its field's metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFieldRef {
    #[serde(rename = "__typename")]
    pub typename: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub data_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLabel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMilestone {
    pub id: Option<String>,
    pub title: Option<String>,
    pub due_on: Option<String>,
    pub url: Option<String>,
}

/// A value record for one (item, field) pair, discriminated by `__typename`.
///
/// Keys not modelled here are kept in `extra` so an unrecognized record can
/// be shown verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFieldValue {
    #[serde(rename = "__typename", skip_serializing_if = "Option::is_none")]
    pub typename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<RawFieldRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Single-select option name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<RawOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Connection<RawLabel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<RawRepository>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_requests: Option<Connection<RawLinked>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Connection<RawLinked>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Connection<RawUser>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewers: Option<Connection<RawUser>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<RawMilestone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_completed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<RawLinked>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A project item node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
    pub id: Option<String>,
    /// `ISSUE`, `PULL_REQUEST`, `DRAFT_ISSUE`
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub content: Option<RawContent>,
    /// Kept as JSON so one malformed value does not sink the whole item
    pub field_values: Option<Connection<Value>>,
}

/// The `projectV2` node: field metadata plus items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProject {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub fields: Connection<RawField>,
    #[serde(default)]
    pub items: Connection<RawItem>,
}
