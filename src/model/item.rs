use serde::{Deserialize, Serialize};

use super::value::NormalizedValue;

/// What kind of tracked work an item wraps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    #[default]
    Issue,
    PullRequest,
    DraftIssue,
}

impl ContentKind {
    /// Parse a content discriminator (`Issue`, `PULL_REQUEST`, `DraftIssue`, ...)
    pub fn parse(name: &str) -> Option<ContentKind> {
        let folded: String = name
            .chars()
            .filter(|c| *c != '_')
            .collect::<String>()
            .to_lowercase();
        match folded.as_str() {
            "issue" => Some(ContentKind::Issue),
            "pullrequest" => Some(ContentKind::PullRequest),
            "draftissue" => Some(ContentKind::DraftIssue),
            _ => None,
        }
    }

    /// The structural kind name, as matched by `type:` qualifiers
    pub fn name(self) -> &'static str {
        match self {
            ContentKind::Issue => "Issue",
            ContentKind::PullRequest => "PullRequest",
            ContentKind::DraftIssue => "DraftIssue",
        }
    }
}

/// Reduced reference to a parent issue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParentRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubIssuesSummary {
    pub total: u64,
    pub completed: u64,
    pub percent_completed: f64,
}

/// A user attached to an item (assignee or reviewer)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Snapshot of the issue, pull request or draft an item points at
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemContent {
    pub kind: ContentKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    /// Lifecycle state as delivered (`OPEN`, `CLOSED`, `MERGED`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<bool>,
    /// `owner/name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<Assignee>,
    /// Only retained for issues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
    /// Only retained for issues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_issues_summary: Option<SubIssuesSummary>,
}

impl ItemContent {
    pub fn new(kind: ContentKind, title: impl Into<String>) -> Self {
        ItemContent {
            kind,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Lifecycle token matched by `is:` qualifiers.
    ///
    /// Drafts without a delivered state report `draft`.
    pub fn state_token(&self) -> String {
        match (&self.state, self.kind) {
            (Some(state), _) => state.to_lowercase(),
            (None, ContentKind::DraftIssue) => "draft".to_string(),
            (None, _) => String::new(),
        }
    }
}

/// One row of tracked work plus its field values.
///
/// `field_values[i]` belongs to `fields[i]` of the page it was fetched with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub content: ItemContent,
    pub field_values: Vec<NormalizedValue>,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        content: ItemContent,
        field_values: Vec<NormalizedValue>,
    ) -> Self {
        Item {
            id: id.into(),
            content,
            field_values,
        }
    }

    /// Repository identifier: the content's repository, else the first
    /// repository field value
    pub fn repository(&self) -> Option<&str> {
        if let Some(repo) = self.content.repository.as_deref() {
            return Some(repo);
        }
        self.field_values.iter().find_map(|v| match v {
            NormalizedValue::Repository { repository, .. } => {
                Some(repository.name_with_owner.as_str())
            }
            _ => None,
        })
    }

    /// Assignees from the content and from any assignee field values
    pub fn assignees(&self) -> impl Iterator<Item = &Assignee> {
        let from_values = self.field_values.iter().flat_map(|v| match v {
            NormalizedValue::Assignees { assignees, .. } => assignees.as_slice(),
            _ => &[],
        });
        self.content.assignees.iter().chain(from_values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::RepositoryRef;

    #[test]
    fn test_content_kind_parse() {
        assert_eq!(ContentKind::parse("Issue"), Some(ContentKind::Issue));
        assert_eq!(ContentKind::parse("PULL_REQUEST"), Some(ContentKind::PullRequest));
        assert_eq!(ContentKind::parse("DraftIssue"), Some(ContentKind::DraftIssue));
        assert_eq!(ContentKind::parse("DRAFT_ISSUE"), Some(ContentKind::DraftIssue));
        assert_eq!(ContentKind::parse("Discussion"), None);
    }

    #[test]
    fn test_state_token() {
        let mut content = ItemContent::new(ContentKind::Issue, "x");
        assert_eq!(content.state_token(), "");
        content.state = Some("OPEN".into());
        assert_eq!(content.state_token(), "open");

        let draft = ItemContent::new(ContentKind::DraftIssue, "idea");
        assert_eq!(draft.state_token(), "draft");
    }

    #[test]
    fn test_repository_falls_back_to_field_value() {
        let item = Item::new(
            "1",
            ItemContent::new(ContentKind::DraftIssue, "t"),
            vec![NormalizedValue::Repository {
                field_id: "F".into(),
                repository: RepositoryRef {
                    name_with_owner: "acme/web".into(),
                    url: None,
                },
            }],
        );
        assert_eq!(item.repository(), Some("acme/web"));
    }

    #[test]
    fn test_assignees_chain_content_and_values() {
        let mut content = ItemContent::new(ContentKind::Issue, "t");
        content.assignees.push(Assignee {
            login: "octocat".into(),
            ..Default::default()
        });
        let item = Item::new(
            "1",
            content,
            vec![NormalizedValue::Assignees {
                field_id: "F".into(),
                assignees: vec![Assignee {
                    login: "hubot".into(),
                    ..Default::default()
                }],
            }],
        );
        let logins: Vec<_> = item.assignees().map(|a| a.login.as_str()).collect();
        assert_eq!(logins, vec!["octocat", "hubot"]);
    }
}
