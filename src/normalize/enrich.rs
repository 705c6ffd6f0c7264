use std::sync::LazyLock;

use regex::Regex;

use crate::model::field::{DataType, FieldConfig};
use crate::model::value::{NormalizedValue, is_blank_json};

use super::page::ItemBuilder;

/// "Sub-issues progress", tolerating "subissues" and "progres"
static SUB_ISSUES_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*sub-?issues\s+progress?\s*$").expect("sub-issues field regex must compile")
});

/// "Parent" or "Parent issue"
static PARENT_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*parent(\s+issue)?\s*$").expect("parent field regex must compile")
});

/// Counts of values synthesized by one backfill run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillStats {
    pub sub_issues: usize,
    pub parents: usize,
}

pub fn is_sub_issues_field(field: &FieldConfig) -> bool {
    SUB_ISSUES_FIELD.is_match(&field.name) || field.data_type.as_str().contains("SUB_ISSUES")
}

pub fn is_parent_field(field: &FieldConfig) -> bool {
    PARENT_FIELD.is_match(&field.name) || field.data_type == DataType::ParentIssue
}

/// Whether a slot may be overwritten by the backfill: nothing delivered,
/// an empty sequence payload, or a payload with no keys.
///
/// A delivered parent value is never blank, even with every field absent.
pub fn is_blank(value: Option<&NormalizedValue>) -> bool {
    let Some(value) = value else {
        return true;
    };
    match value {
        NormalizedValue::Missing { .. } => true,
        NormalizedValue::Unknown { raw, .. } => is_blank_json(raw),
        NormalizedValue::Labels { labels, .. } => labels.is_empty(),
        NormalizedValue::PullRequest { pull_requests, .. } => pull_requests.is_empty(),
        NormalizedValue::Issue { issues, .. } => issues.is_empty(),
        NormalizedValue::Assignees { assignees, .. } => assignees.is_empty(),
        NormalizedValue::RequestedReviewers { reviewers, .. } => reviewers.is_empty(),
        _ => false,
    }
}

/// Synthesize values for fields whose data lives on the item content.
///
/// For every sub-issues-progress field, items whose content carries a
/// sub-issues summary get a `sub_issues_progress` value; for every parent
/// field, items whose content carries a parent get a `parent_issue` value.
/// Only blank slots are overwritten. Runs once per page, before any item is
/// finished.
pub fn backfill(builders: &mut [ItemBuilder], fields: &[FieldConfig]) -> BackfillStats {
    let mut stats = BackfillStats::default();

    for (index, field) in fields.iter().enumerate() {
        if !is_sub_issues_field(field) {
            continue;
        }
        for builder in builders.iter_mut() {
            let Some(summary) = builder.content.sub_issues_summary else {
                continue;
            };
            if !is_blank(builder.slot(index)) {
                continue;
            }
            builder.set(
                index,
                NormalizedValue::SubIssuesProgress {
                    field_id: field.id.clone(),
                    total: summary.total,
                    done: summary.completed,
                    percent: summary.percent_completed,
                },
            );
            stats.sub_issues += 1;
        }
    }

    for (index, field) in fields.iter().enumerate() {
        if !is_parent_field(field) {
            continue;
        }
        for builder in builders.iter_mut() {
            let Some(parent) = builder.content.parent.clone() else {
                continue;
            };
            if !is_blank(builder.slot(index)) {
                continue;
            }
            builder.set(
                index,
                NormalizedValue::ParentIssue {
                    field_id: field.id.clone(),
                    parent,
                },
            );
            stats.parents += 1;
        }
    }

    stats
}
