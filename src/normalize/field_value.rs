use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::model::field::{DataType, FieldConfig, names_match};
use crate::model::item::{Assignee, ItemContent};
use crate::model::raw::{RawFieldValue, RawLinked, RawUser};
use crate::model::value::{
    Label, LinkedItem, MilestoneRef, NormalizedValue, RepositoryRef, SelectedOption,
};

use super::content::{normalize_user, parent_ref, percent_completed, repository_name};

/// The value kinds a raw record can be dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Text,
    Number,
    Date,
    SingleSelect,
    Labels,
    Repository,
    PullRequests,
    Issues,
    Users,
    Reviewers,
    Iteration,
    Milestone,
    SubIssuesProgress,
    ParentIssue,
}

fn kind_from_typename(typename: &str) -> Option<ValueKind> {
    let kind = match typename.strip_prefix("ProjectV2ItemField")? {
        "TextValue" => ValueKind::Text,
        "NumberValue" => ValueKind::Number,
        "DateValue" => ValueKind::Date,
        "SingleSelectValue" => ValueKind::SingleSelect,
        "LabelValue" => ValueKind::Labels,
        "RepositoryValue" => ValueKind::Repository,
        "PullRequestValue" => ValueKind::PullRequests,
        "IssueValue" | "TrackedByValue" | "TracksValue" => ValueKind::Issues,
        "UserValue" => ValueKind::Users,
        "ReviewerValue" => ValueKind::Reviewers,
        "IterationValue" => ValueKind::Iteration,
        "MilestoneValue" => ValueKind::Milestone,
        "SubIssuesProgressValue" => ValueKind::SubIssuesProgress,
        "ParentIssueValue" => ValueKind::ParentIssue,
        _ => return None,
    };
    Some(kind)
}

fn kind_from_data_type(data_type: &DataType) -> Option<ValueKind> {
    let kind = match data_type {
        DataType::Text | DataType::Title => ValueKind::Text,
        DataType::Number => ValueKind::Number,
        DataType::Date => ValueKind::Date,
        DataType::SingleSelect => ValueKind::SingleSelect,
        DataType::Labels => ValueKind::Labels,
        DataType::Repository => ValueKind::Repository,
        DataType::LinkedPullRequests => ValueKind::PullRequests,
        DataType::Tracks => ValueKind::Issues,
        DataType::Assignees => ValueKind::Users,
        DataType::Reviewers => ValueKind::Reviewers,
        DataType::Iteration => ValueKind::Iteration,
        DataType::Milestone => ValueKind::Milestone,
        DataType::SubIssuesProgress => ValueKind::SubIssuesProgress,
        DataType::ParentIssue => ValueKind::ParentIssue,
        DataType::Other(_) => return None,
    };
    Some(kind)
}

/// Field identity resolved from the value's back-reference, then the
/// supplied field config
struct FieldIdentity<'a> {
    id: &'a str,
    name: &'a str,
    data_type: Option<DataType>,
}

impl<'a> FieldIdentity<'a> {
    fn resolve(raw: &'a RawFieldValue, field: Option<&'a FieldConfig>) -> Self {
        let back_ref = raw.field.as_ref();
        FieldIdentity {
            id: back_ref
                .and_then(|f| f.id.as_deref())
                .or(field.map(|f| f.id.as_str()))
                .unwrap_or_default(),
            name: back_ref
                .and_then(|f| f.name.as_deref())
                .or(field.map(|f| f.name.as_str()))
                .unwrap_or_default(),
            data_type: back_ref
                .and_then(|f| f.data_type.as_deref())
                .map(DataType::parse)
                .or_else(|| field.map(|f| f.data_type.clone())),
        }
    }

    fn is_title(&self) -> bool {
        self.data_type == Some(DataType::Title) || names_match(self.name, "title")
    }
}

fn linked_item(raw: &RawLinked) -> LinkedItem {
    LinkedItem {
        number: raw.number,
        title: raw.title.clone().unwrap_or_default(),
        url: raw.url.clone(),
        state: raw.state.clone(),
        merged: raw.merged,
        repository: raw.repository.as_ref().and_then(repository_name),
    }
}

/// Reviewers may be teams, which carry a name but no login
fn reviewer(raw: &RawUser) -> Option<Assignee> {
    normalize_user(raw).or_else(|| {
        Some(Assignee {
            id: raw.id.clone(),
            login: raw.name.clone()?,
            name: raw.name.clone(),
            avatar_url: raw.avatar_url.clone(),
            url: raw.url.clone(),
        })
    })
}

fn raw_json(raw: &RawFieldValue) -> Value {
    serde_json::to_value(raw).unwrap_or(Value::Null)
}

/// Fill in a selected option from the field's vocabulary.
///
/// `repo` picks that repository's option list first when the field has one.
fn single_select(
    raw: &RawFieldValue,
    field: Option<&FieldConfig>,
    repo: Option<&str>,
) -> SelectedOption {
    let option_id = raw
        .option_id
        .clone()
        .or_else(|| raw.option.as_ref().and_then(|o| o.id.clone()));
    let looked_up = option_id
        .as_deref()
        .and_then(|id| field.and_then(|f| f.find_option(id, repo)));
    SelectedOption {
        id: option_id.clone().or_else(|| looked_up.map(|o| o.id.clone())),
        name: raw
            .name
            .clone()
            .or_else(|| raw.option.as_ref().and_then(|o| o.name.clone()))
            .or_else(|| looked_up.map(|o| o.name.clone()))
            .unwrap_or_default(),
        color: raw
            .color
            .clone()
            .or_else(|| raw.option.as_ref().and_then(|o| o.color.clone()))
            .or_else(|| looked_up.and_then(|o| o.color.clone())),
        description: raw
            .description
            .clone()
            .or_else(|| raw.option.as_ref().and_then(|o| o.description.clone()))
            .or_else(|| looked_up.and_then(|o| o.description.clone()))
            .filter(|d| !d.is_empty()),
    }
}

fn iteration(
    raw: &RawFieldValue,
    field: Option<&FieldConfig>,
    field_id: String,
) -> NormalizedValue {
    let iteration_id = raw.iteration_id.clone().unwrap_or_default();
    let looked_up = field.and_then(|f| f.find_iteration(&iteration_id));
    NormalizedValue::Iteration {
        field_id,
        title: raw
            .title
            .clone()
            .or_else(|| looked_up.map(|it| it.title.clone()))
            .unwrap_or_default(),
        start_date: raw
            .start_date
            .clone()
            .or_else(|| looked_up.map(|it| it.start_date.clone())),
        duration: raw.duration.or_else(|| looked_up.and_then(|it| it.duration)),
        iteration_id,
    }
}

/// Normalize one raw field value record.
///
/// `field` is the metadata of the column the value was fetched for and
/// `content` the owning item's snapshot; both are optional back-references.
/// Title fields always produce the `title` variant. Records whose
/// discriminator is not recognized produce `unknown`.
pub fn parse_field_value(
    raw: &RawFieldValue,
    field: Option<&FieldConfig>,
    content: Option<&ItemContent>,
) -> NormalizedValue {
    let identity = FieldIdentity::resolve(raw, field);
    let field_id = identity.id.to_string();

    if identity.is_title() || field.is_some_and(FieldConfig::is_title) {
        let text = raw
            .text
            .clone()
            .or_else(|| raw.title.clone())
            .or_else(|| content.map(|c| c.title.clone()))
            .unwrap_or_default();
        return NormalizedValue::Title {
            field_id,
            text,
            content: Box::new(content.cloned().unwrap_or_default()),
            raw: raw_json(raw),
        };
    }

    let kind = match raw.typename.as_deref() {
        Some(typename) => kind_from_typename(typename),
        None => identity.data_type.as_ref().and_then(kind_from_data_type),
    };
    let Some(kind) = kind else {
        debug!(typename = ?raw.typename, field = identity.name, "unrecognized field value");
        return NormalizedValue::Unknown {
            field_id: Some(field_id).filter(|id| !id.is_empty()),
            field_name: Some(identity.name.to_string()).filter(|n| !n.is_empty()),
            raw: raw_json(raw),
        };
    };

    match kind {
        ValueKind::Text => NormalizedValue::Text {
            field_id,
            text: raw.text.clone().unwrap_or_default(),
        },
        ValueKind::Number => NormalizedValue::Number {
            field_id,
            number: raw.number,
        },
        ValueKind::Date => NormalizedValue::Date {
            field_id,
            date: raw.date.clone().unwrap_or_default(),
        },
        ValueKind::SingleSelect => NormalizedValue::SingleSelect {
            field_id,
            option: single_select(raw, field, content.and_then(|c| c.repository.as_deref())),
        },
        ValueKind::Labels => NormalizedValue::Labels {
            field_id,
            labels: raw
                .labels
                .iter()
                .flat_map(|conn| conn.iter())
                .filter_map(|l| {
                    Some(Label {
                        id: l.id.clone(),
                        name: l.name.clone()?,
                        color: l.color.clone(),
                    })
                })
                .collect(),
        },
        ValueKind::Repository => NormalizedValue::Repository {
            field_id,
            repository: RepositoryRef {
                name_with_owner: raw
                    .repository
                    .as_ref()
                    .and_then(repository_name)
                    .unwrap_or_default(),
                url: raw.repository.as_ref().and_then(|r| r.url.clone()),
            },
        },
        ValueKind::PullRequests => NormalizedValue::PullRequest {
            field_id,
            pull_requests: raw
                .pull_requests
                .iter()
                .flat_map(|conn| conn.iter())
                .map(linked_item)
                .collect(),
        },
        ValueKind::Issues => NormalizedValue::Issue {
            field_id,
            issues: raw
                .issues
                .iter()
                .flat_map(|conn| conn.iter())
                .map(linked_item)
                .collect(),
        },
        ValueKind::Users => NormalizedValue::Assignees {
            field_id,
            assignees: raw
                .users
                .iter()
                .flat_map(|conn| conn.iter())
                .filter_map(normalize_user)
                .collect(),
        },
        ValueKind::Reviewers => NormalizedValue::RequestedReviewers {
            field_id,
            reviewers: raw
                .reviewers
                .iter()
                .flat_map(|conn| conn.iter())
                .filter_map(reviewer)
                .collect(),
        },
        ValueKind::Iteration => iteration(raw, field, field_id),
        ValueKind::Milestone => NormalizedValue::Milestone {
            field_id,
            milestone: MilestoneRef {
                id: raw.milestone.as_ref().and_then(|m| m.id.clone()),
                title: raw
                    .milestone
                    .as_ref()
                    .and_then(|m| m.title.clone())
                    .or_else(|| raw.title.clone())
                    .unwrap_or_default(),
                due_on: raw.milestone.as_ref().and_then(|m| m.due_on.clone()),
                url: raw.milestone.as_ref().and_then(|m| m.url.clone()),
            },
        },
        ValueKind::SubIssuesProgress => {
            let total = raw.total.unwrap_or(0);
            let done = raw.completed.unwrap_or(0);
            NormalizedValue::SubIssuesProgress {
                field_id,
                total,
                done,
                percent: percent_completed(total, done, raw.percent_completed),
            }
        }
        ValueKind::ParentIssue => NormalizedValue::ParentIssue {
            field_id,
            parent: raw.parent.as_ref().map(parent_ref).unwrap_or_default(),
        },
    }
}

/// Normalize a value record that is still JSON.
///
/// A record that does not deserialize becomes `unknown` with the JSON kept.
pub fn parse_field_value_json(
    value: &Value,
    field: Option<&FieldConfig>,
    content: Option<&ItemContent>,
) -> NormalizedValue {
    match RawFieldValue::deserialize(value) {
        Ok(raw) => parse_field_value(&raw, field, content),
        Err(e) => {
            debug!(error = %e, "undeserializable field value");
            NormalizedValue::Unknown {
                field_id: field.map(|f| f.id.clone()),
                field_name: field.map(|f| f.name.clone()),
                raw: value.clone(),
            }
        }
    }
}
