use crate::model::item::{Assignee, Item};
use crate::model::value::{LinkedItem, NormalizedValue};

/// Joins fragments of flattened text; never typed into a query
pub const SEPARATOR: char = '\0';

/// Render a number the way it is typed: `5`, not `5.0`
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn push_linked(items: &[LinkedItem], out: &mut Vec<String>) {
    for linked in items {
        out.push(linked.title.clone());
        if let Some(number) = linked.number {
            out.push(number.to_string());
        }
    }
}

fn push_users(users: &[Assignee], out: &mut Vec<String>) {
    for user in users {
        out.push(user.login.clone());
        if let Some(name) = &user.name {
            out.push(name.clone());
        }
    }
}

/// Searchable text fragments of one value, not yet lower-cased
pub fn value_fragments(value: &NormalizedValue, out: &mut Vec<String>) {
    match value {
        NormalizedValue::Title { text, .. } | NormalizedValue::Text { text, .. } => {
            out.push(text.clone())
        }
        NormalizedValue::Number { number, .. } => {
            if let Some(n) = number {
                out.push(format_number(*n));
            }
        }
        NormalizedValue::Date { date, .. } => out.push(date.clone()),
        NormalizedValue::SingleSelect { option, .. } => out.push(option.name.clone()),
        NormalizedValue::Labels { labels, .. } => {
            out.extend(labels.iter().map(|l| l.name.clone()));
        }
        NormalizedValue::Repository { repository, .. } => {
            out.push(repository.name_with_owner.clone())
        }
        NormalizedValue::PullRequest { pull_requests, .. } => push_linked(pull_requests, out),
        NormalizedValue::Issue { issues, .. } => push_linked(issues, out),
        NormalizedValue::Assignees { assignees, .. } => push_users(assignees, out),
        NormalizedValue::RequestedReviewers { reviewers, .. } => push_users(reviewers, out),
        NormalizedValue::Iteration { title, .. } => out.push(title.clone()),
        NormalizedValue::Milestone { milestone, .. } => out.push(milestone.title.clone()),
        NormalizedValue::SubIssuesProgress { total, done, .. } => {
            out.push(format!("{}/{}", done, total))
        }
        NormalizedValue::ParentIssue { parent, .. } => {
            if let Some(title) = &parent.title {
                out.push(title.clone());
            }
            if let Some(number) = parent.number {
                out.push(number.to_string());
            }
        }
        NormalizedValue::Missing { .. } => {}
        NormalizedValue::Unknown { raw, .. } => {
            if !raw.is_null() {
                out.push(raw.to_string());
            }
        }
    }
}

fn join_lower(fragments: &[String]) -> String {
    let mut joined = String::new();
    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 {
            joined.push(SEPARATOR);
        }
        joined.push_str(&fragment.to_lowercase());
    }
    joined
}

/// Lower-cased text of a single value, used by field qualifiers
pub fn value_text(value: &NormalizedValue) -> String {
    let mut fragments = Vec::new();
    value_fragments(value, &mut fragments);
    join_lower(&fragments)
}

/// Lower-cased text of a whole item: content title, number and url, then
/// every field value
pub fn flattened_text(item: &Item) -> String {
    let content = &item.content;
    let mut fragments = vec![content.title.clone()];
    if let Some(number) = content.number {
        fragments.push(number.to_string());
    }
    if let Some(url) = &content.url {
        fragments.push(url.clone());
    }
    for value in &item.field_values {
        value_fragments(value, &mut fragments);
    }
    join_lower(&fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::{ContentKind, ItemContent, ParentRef};
    use crate::model::value::{Label, SelectedOption};
    use serde_json::json;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn test_flattened_text_joins_lowercased_fragments() {
        let mut content = ItemContent::new(ContentKind::Issue, "Fix Login");
        content.number = Some(12);
        let item = Item::new(
            "1",
            content,
            vec![
                NormalizedValue::SingleSelect {
                    field_id: "S".into(),
                    option: SelectedOption {
                        name: "In Progress".into(),
                        ..Default::default()
                    },
                },
                NormalizedValue::Labels {
                    field_id: "L".into(),
                    labels: vec![
                        Label {
                            name: "Bug".into(),
                            ..Default::default()
                        },
                        Label {
                            name: "UI".into(),
                            ..Default::default()
                        },
                    ],
                },
                NormalizedValue::Number {
                    field_id: "N".into(),
                    number: Some(3.0),
                },
                NormalizedValue::Missing {
                    field_id: "M".into(),
                    field_name: "Due".into(),
                },
            ],
        );
        let text = flattened_text(&item);
        let parts: Vec<_> = text.split(SEPARATOR).collect();
        assert_eq!(parts, vec!["fix login", "12", "in progress", "bug", "ui", "3"]);
    }

    #[test]
    fn test_parent_and_unknown_fragments() {
        let parent = NormalizedValue::ParentIssue {
            field_id: "P".into(),
            parent: ParentRef {
                number: Some(7),
                title: Some("Epic".into()),
                ..Default::default()
            },
        };
        assert_eq!(value_text(&parent), "epic\u{0}7");

        let unknown = NormalizedValue::Unknown {
            field_id: None,
            field_name: None,
            raw: json!({"Mood": "Sunny"}),
        };
        assert!(value_text(&unknown).contains("sunny"));
    }

    #[test]
    fn test_linked_items_and_users() {
        let prs = NormalizedValue::PullRequest {
            field_id: "PR".into(),
            pull_requests: vec![LinkedItem {
                number: Some(4),
                title: "Refactor".into(),
                ..Default::default()
            }],
        };
        assert_eq!(value_text(&prs), "refactor\u{0}4");

        let users = NormalizedValue::Assignees {
            field_id: "A".into(),
            assignees: vec![Assignee {
                login: "octocat".into(),
                name: Some("Mona Lisa".into()),
                ..Default::default()
            }],
        };
        assert_eq!(value_text(&users), "octocat\u{0}mona lisa");
    }
}
