use std::collections::BTreeSet;

use tracing::trace;

use crate::model::field::{DataType, FieldConfig};
use crate::model::item::Item;
use crate::model::value::NormalizedValue;
use crate::normalize::page::field_index;

use super::query::{QualifierValue, Query};
use super::text::{flattened_text, value_text};

/// Per-item evaluation state. The flattened text is built on first use.
struct ItemView<'a> {
    item: &'a Item,
    fields: &'a [FieldConfig],
    text: Option<String>,
}

impl<'a> ItemView<'a> {
    fn new(item: &'a Item, fields: &'a [FieldConfig]) -> Self {
        ItemView {
            item,
            fields,
            text: None,
        }
    }

    fn text(&mut self) -> &str {
        let item = self.item;
        self.text.get_or_insert_with(|| flattened_text(item))
    }

    fn value_at(&self, index: usize) -> Option<&'a NormalizedValue> {
        self.item.field_values.get(index)
    }

    fn assignee_text(&self) -> String {
        let mut parts = Vec::new();
        for user in self.item.assignees() {
            parts.push(user.login.as_str());
            if let Some(name) = &user.name {
                parts.push(name.as_str());
            }
        }
        parts.join(" ").to_lowercase()
    }

    fn has_parent_titled(&self, qv: &QualifierValue) -> bool {
        self.item.field_values.iter().any(|value| match value {
            NormalizedValue::ParentIssue { parent, .. } => parent
                .title
                .as_deref()
                .is_some_and(|t| qv.pattern.found_in(&t.to_lowercase())),
            NormalizedValue::Issue { issues, .. } => issues
                .iter()
                .any(|issue| qv.pattern.found_in(&issue.title.to_lowercase())),
            _ => false,
        })
    }

    /// `has:` / `no:`. Falls back to a text search when the field is unknown.
    fn presence(&mut self, name: &str, qv: &QualifierValue) -> bool {
        match field_index(self.fields, &qv.value) {
            Some(index) => {
                let present = self.value_at(index).is_some_and(NormalizedValue::has_content);
                if name == "has" { present } else { !present }
            }
            None => qv.pattern.found_in(self.text()),
        }
    }

    /// A qualifier naming a field: numeric test when the value is numeric and
    /// the field holds numbers, otherwise exact (or wildcard) text match
    fn field_match(&self, index: usize, qv: &QualifierValue) -> bool {
        let Some(value) = self.value_at(index) else {
            return false;
        };
        let numeric_field = self
            .fields
            .get(index)
            .is_some_and(|f| f.data_type == DataType::Number)
            || matches!(value, NormalizedValue::Number { .. });
        if let Some(test) = qv.numeric.filter(|_| numeric_field) {
            return value.as_number().is_some_and(|n| test.test(n));
        }
        qv.pattern.equals(&value_text(value))
    }

    /// Whether one qualifier value holds for this item, before negation
    fn holds(&mut self, name: &str, qv: &QualifierValue) -> bool {
        match name {
            "type" => qv.pattern.found_in(&self.item.content.kind.name().to_lowercase()),
            "is" => qv.pattern.found_in(&self.item.content.state_token()),
            "repo" => self
                .item
                .repository()
                .is_some_and(|repo| qv.pattern.found_in(&repo.to_lowercase())),
            "assignee" | "assignees" => qv.pattern.found_in(&self.assignee_text()),
            "parent" => self.has_parent_titled(qv),
            "has" | "no" => self.presence(name, qv),
            _ => match field_index(self.fields, name) {
                Some(index) => self.field_match(index, qv),
                None => qv.pattern.found_in(self.text()),
            },
        }
    }
}

impl Query {
    /// Whether `item` satisfies every qualifier value and every free token
    pub fn matches(&self, item: &Item, fields: &[FieldConfig]) -> bool {
        let mut view = ItemView::new(item, fields);
        for (name, values) in self.qualifiers() {
            for qv in values {
                if view.holds(name, qv) == qv.negated {
                    return false;
                }
            }
        }
        self.free_tokens()
            .iter()
            .all(|token| token.found_in(view.text()))
    }
}

/// Ids of the items matching `query`.
///
/// A blank query matches every item. Inputs are only read.
pub fn compute_matches(query: &str, items: &[Item], fields: &[FieldConfig]) -> BTreeSet<String> {
    let parsed = Query::parse(query);
    if parsed.is_empty() {
        return items.iter().map(|item| item.id.clone()).collect();
    }
    let matched: BTreeSet<String> = items
        .iter()
        .filter(|item| parsed.matches(item, fields))
        .map(|item| item.id.clone())
        .collect();
    trace!(query, matched = matched.len(), total = items.len(), "filtered items");
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::{Assignee, ContentKind, ItemContent, ParentRef};
    use crate::model::value::{Label, SelectedOption};
    use pretty_assertions::assert_eq;

    fn ids(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn untyped(name: &str) -> FieldConfig {
        FieldConfig::new("", name, DataType::Other(String::new()))
    }

    fn text(text: &str) -> NormalizedValue {
        NormalizedValue::Text {
            field_id: String::new(),
            text: text.into(),
        }
    }

    fn number(n: f64) -> NormalizedValue {
        NormalizedValue::Number {
            field_id: String::new(),
            number: Some(n),
        }
    }

    fn select(name: &str) -> NormalizedValue {
        NormalizedValue::SingleSelect {
            field_id: String::new(),
            option: SelectedOption {
                name: name.into(),
                ..Default::default()
            },
        }
    }

    /// Two items and three untyped fields: Priority, Estimate, Type
    fn scenario() -> (Vec<Item>, Vec<FieldConfig>) {
        let mut open = ItemContent::new(ContentKind::Issue, "Fix bug");
        open.state = Some("OPEN".into());
        let mut closed = ItemContent::new(ContentKind::Issue, "Add feature");
        closed.state = Some("CLOSED".into());
        let items = vec![
            Item::new("1", open, vec![text("High priority"), number(5.0), select("Bug")]),
            Item::new(
                "2",
                closed,
                vec![text("Low priority"), number(10.0), select("Feature")],
            ),
        ];
        let fields = vec![untyped("Priority"), untyped("Estimate"), untyped("Type")];
        (items, fields)
    }

    #[test]
    fn test_scenario_state_qualifiers() {
        let (items, fields) = scenario();
        assert_eq!(compute_matches("is:open", &items, &fields), ids(&["1"]));
        assert_eq!(compute_matches("-is:open", &items, &fields), ids(&["2"]));
    }

    #[test]
    fn test_scenario_numeric_comparator() {
        let (items, fields) = scenario();
        assert_eq!(compute_matches("Estimate:>5", &items, &fields), ids(&["2"]));
        assert_eq!(compute_matches("Estimate:>=5", &items, &fields), ids(&["1", "2"]));
        assert_eq!(compute_matches("estimate:5", &items, &fields), ids(&["1"]));
    }

    #[test]
    fn test_scenario_field_named_like_reserved_qualifier() {
        let (items, fields) = scenario();
        assert_eq!(compute_matches("Type:Bug", &items, &fields), ids(&["1"]));
        // lower-case `type` is the structural kind qualifier
        assert_eq!(compute_matches("type:issue", &items, &fields), ids(&["1", "2"]));
    }

    #[test]
    fn test_empty_query_matches_all() {
        let (items, fields) = scenario();
        assert_eq!(compute_matches("", &items, &fields), ids(&["1", "2"]));
        assert_eq!(compute_matches("   ", &items, &fields), ids(&["1", "2"]));
    }

    #[test]
    fn test_free_token_substring() {
        let (items, fields) = scenario();
        assert_eq!(compute_matches("priority", &items, &fields), ids(&["1", "2"]));
        assert_eq!(compute_matches("HIGH", &items, &fields), ids(&["1"]));
        assert_eq!(compute_matches("high feature", &items, &fields), ids(&[]));
    }

    #[test]
    fn test_free_token_wildcard() {
        let (items, fields) = scenario();
        assert_eq!(compute_matches("f*ture", &items, &fields), ids(&["2"]));
        assert_eq!(compute_matches("fix*", &items, &fields), ids(&["1"]));
    }

    #[test]
    fn test_field_text_match_is_exact() {
        let (items, fields) = scenario();
        assert_eq!(compute_matches("Type:bu", &items, &fields), ids(&[]));
        assert_eq!(compute_matches("Type:bu*", &items, &fields), ids(&["1"]));
        assert_eq!(
            compute_matches(r#"Priority:"high priority""#, &items, &fields),
            ids(&["1"])
        );
    }

    #[test]
    fn test_numeric_range() {
        let (items, fields) = scenario();
        assert_eq!(compute_matches("Estimate:5..10", &items, &fields), ids(&["1", "2"]));
        assert_eq!(compute_matches("Estimate:6..10", &items, &fields), ids(&["2"]));
        assert_eq!(compute_matches("Estimate:10..6", &items, &fields), ids(&[]));
    }

    #[test]
    fn test_numeric_value_against_text_field_is_exact_text() {
        let (items, fields) = scenario();
        assert_eq!(compute_matches("Priority:>5", &items, &fields), ids(&[]));
    }

    #[test]
    fn test_comma_values_must_all_hold() {
        // Comma-separated values are ANDed, not alternatives
        let (items, fields) = scenario();
        assert_eq!(compute_matches("Type:bug,feature", &items, &fields), ids(&[]));
        assert_eq!(compute_matches("Type:bug Type:feature", &items, &fields), ids(&[]));
        assert_eq!(compute_matches("-Type:bug,feature", &items, &fields), ids(&[]));
        assert_eq!(compute_matches("-Type:bug,epic", &items, &fields), ids(&["2"]));
    }

    #[test]
    fn test_unknown_qualifier_falls_back_to_text() {
        let (items, fields) = scenario();
        assert_eq!(compute_matches("mood:feature", &items, &fields), ids(&["2"]));
        assert_eq!(compute_matches("-mood:feature", &items, &fields), ids(&["1"]));
    }

    fn rich_items() -> (Vec<Item>, Vec<FieldConfig>) {
        let mut issue = ItemContent::new(ContentKind::Issue, "Login fails");
        issue.state = Some("OPEN".into());
        issue.repository = Some("Acme/API".into());
        issue.assignees.push(Assignee {
            login: "octocat".into(),
            name: Some("Mona".into()),
            ..Default::default()
        });
        let mut pr = ItemContent::new(ContentKind::PullRequest, "Fix login");
        pr.state = Some("MERGED".into());
        pr.repository = Some("acme/web".into());
        let draft = ItemContent::new(ContentKind::DraftIssue, "Think about SSO");

        let fields = vec![
            FieldConfig::new("L", "Labels", DataType::Labels),
            FieldConfig::new("P", "Parent issue", DataType::ParentIssue),
            FieldConfig::new("E", "Estimate", DataType::Number),
        ];
        let labels = |names: &[&str]| NormalizedValue::Labels {
            field_id: "L".into(),
            labels: names
                .iter()
                .map(|n| Label {
                    name: n.to_string(),
                    ..Default::default()
                })
                .collect(),
        };
        let missing = |id: &str, name: &str| NormalizedValue::Missing {
            field_id: id.into(),
            field_name: name.into(),
        };
        let items = vec![
            Item::new(
                "issue",
                issue,
                vec![
                    labels(&["bug"]),
                    NormalizedValue::ParentIssue {
                        field_id: "P".into(),
                        parent: ParentRef {
                            number: Some(1),
                            title: Some("Auth Epic".into()),
                            ..Default::default()
                        },
                    },
                    NormalizedValue::Number {
                        field_id: "E".into(),
                        number: Some(3.0),
                    },
                ],
            ),
            Item::new(
                "pr",
                pr,
                vec![labels(&[]), missing("P", "Parent issue"), missing("E", "Estimate")],
            ),
            Item::new(
                "draft",
                draft,
                vec![
                    missing("L", "Labels"),
                    missing("P", "Parent issue"),
                    missing("E", "Estimate"),
                ],
            ),
        ];
        (items, fields)
    }

    #[test]
    fn test_type_and_is() {
        let (items, fields) = rich_items();
        assert_eq!(compute_matches("type:pull", &items, &fields), ids(&["pr"]));
        assert_eq!(compute_matches("type:issue", &items, &fields), ids(&["issue", "draft"]));
        assert_eq!(compute_matches("is:merged", &items, &fields), ids(&["pr"]));
        assert_eq!(compute_matches("is:draft", &items, &fields), ids(&["draft"]));
    }

    #[test]
    fn test_repo_and_assignee() {
        let (items, fields) = rich_items();
        assert_eq!(compute_matches("repo:acme/api", &items, &fields), ids(&["issue"]));
        assert_eq!(compute_matches("repo:acme", &items, &fields), ids(&["issue", "pr"]));
        assert_eq!(compute_matches("assignee:mona", &items, &fields), ids(&["issue"]));
        assert_eq!(compute_matches("assignees:octo", &items, &fields), ids(&["issue"]));
    }

    #[test]
    fn test_parent_qualifier() {
        let (items, fields) = rich_items();
        assert_eq!(compute_matches("parent:auth", &items, &fields), ids(&["issue"]));
        assert_eq!(compute_matches(r#"parent:"auth epic""#, &items, &fields), ids(&["issue"]));
        assert_eq!(compute_matches("parent:billing", &items, &fields), ids(&[]));
    }

    #[test]
    fn test_has_and_no() {
        let (items, fields) = rich_items();
        assert_eq!(compute_matches("has:labels", &items, &fields), ids(&["issue"]));
        assert_eq!(compute_matches("no:labels", &items, &fields), ids(&["pr", "draft"]));
        assert_eq!(compute_matches("has:estimate", &items, &fields), ids(&["issue"]));
        assert_eq!(
            compute_matches(r#"has:"parent issue""#, &items, &fields),
            ids(&["issue"])
        );
    }

    #[test]
    fn test_has_unknown_field_searches_text() {
        let (items, fields) = rich_items();
        assert_eq!(compute_matches("has:sso", &items, &fields), ids(&["draft"]));
    }

    #[test]
    fn test_non_ascii_field_names_resolve() {
        let fields = vec![FieldConfig::new("F1", "Étape", DataType::Text)];
        let items = vec![
            Item::new("1", ItemContent::new(ContentKind::Issue, "One"), vec![text("revue")]),
            Item::new("2", ItemContent::new(ContentKind::Issue, "Two"), vec![text("")]),
        ];
        assert_eq!(compute_matches("has:Étape", &items, &fields), ids(&["1"]));
        assert_eq!(compute_matches("no:Étape", &items, &fields), ids(&["2"]));
        assert_eq!(compute_matches("no:ÉTAPE", &items, &fields), ids(&["2"]));
        assert_eq!(compute_matches(r#""étape":revue"#, &items, &fields), ids(&["1"]));
        // exact match through the field, not the free-text fallback
        assert_eq!(compute_matches(r#""étape":rev"#, &items, &fields), ids(&[]));
    }

    #[test]
    fn test_numeric_on_missing_value_does_not_match() {
        let (items, fields) = rich_items();
        assert_eq!(compute_matches("Estimate:<10", &items, &fields), ids(&["issue"]));
        assert_eq!(compute_matches("-Estimate:<10", &items, &fields), ids(&["pr", "draft"]));
    }

    #[test]
    fn test_field_qualifier_by_id() {
        let (items, fields) = rich_items();
        assert_eq!(compute_matches("L:bug", &items, &fields), ids(&["issue"]));
    }

    #[test]
    fn test_wildcard_superset() {
        let (items, fields) = rich_items();
        for token in ["login", "fix", "sso", "bug", "zzz"] {
            let plain = compute_matches(token, &items, &fields);
            let wild = compute_matches(&format!("{}*", token), &items, &fields);
            assert!(plain.is_subset(&wild), "token {}", token);
        }
    }

    #[test]
    fn test_idempotent() {
        let (items, fields) = rich_items();
        let query = "type:issue -label:wontfix log*";
        let first = compute_matches(query, &items, &fields);
        let second = compute_matches(query, &items, &fields);
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_queries_never_panic() {
        let (items, fields) = rich_items();
        for query in [
            "\"",
            "::",
            "-:",
            "has:",
            "Estimate:>",
            "Estimate:1..",
            "*",
            "**",
            "((*",
            "\"unterminated:value",
            "name:\"\"",
            "-",
            "\u{0}",
            "é:ü",
        ] {
            let _ = compute_matches(query, &items, &fields);
        }
    }

    #[test]
    fn test_values_misaligned_with_fields() {
        let (items, _) = rich_items();
        let extra_fields = vec![
            FieldConfig::new("L", "Labels", DataType::Labels),
            FieldConfig::new("P", "Parent issue", DataType::ParentIssue),
            FieldConfig::new("E", "Estimate", DataType::Number),
            FieldConfig::new("Z", "Zone", DataType::Text),
        ];
        assert_eq!(compute_matches("Zone:north", &items, &extra_fields), ids(&[]));
        assert_eq!(
            compute_matches("no:zone", &items, &extra_fields),
            ids(&["issue", "pr", "draft"])
        );
    }
}
