use tracing::debug;

use crate::model::item::{Assignee, ContentKind, ItemContent, ParentRef, SubIssuesSummary};
use crate::model::raw::{RawContent, RawLinked, RawRepository, RawSubIssuesSummary, RawUser};

/// `owner/name` of a raw repository: `nameWithOwner`, else `name`
pub(crate) fn repository_name(raw: &RawRepository) -> Option<String> {
    raw.name_with_owner.clone().or_else(|| raw.name.clone())
}

/// Users without a login are dropped
pub(crate) fn normalize_user(raw: &RawUser) -> Option<Assignee> {
    Some(Assignee {
        id: raw.id.clone(),
        login: raw.login.clone()?,
        name: raw.name.clone(),
        avatar_url: raw.avatar_url.clone(),
        url: raw.url.clone(),
    })
}

pub(crate) fn parent_ref(raw: &RawLinked) -> ParentRef {
    ParentRef {
        number: raw.number,
        title: raw.title.clone(),
        url: raw.url.clone(),
        state: raw.state.clone(),
    }
}

/// Completion percentage: delivered value, else computed from the counts
pub(crate) fn percent_completed(total: u64, done: u64, delivered: Option<f64>) -> f64 {
    match delivered {
        Some(p) => p,
        None if total == 0 => 0.0,
        None => ((done as f64) * 100.0 / (total as f64)).round(),
    }
}

fn sub_issues_summary(raw: &RawSubIssuesSummary) -> SubIssuesSummary {
    let total = raw.total.unwrap_or(0);
    let completed = raw.completed.unwrap_or(0);
    SubIssuesSummary {
        total,
        completed,
        percent_completed: percent_completed(total, completed, raw.percent_completed),
    }
}

/// Build the content snapshot of an item.
///
/// The kind comes from the content's `__typename`, else the item's `type`.
/// Parent and sub-issue data are only kept for issues.
pub fn normalize_content(raw: Option<&RawContent>, item_type: Option<&str>) -> ItemContent {
    let typename = raw.and_then(|c| c.typename.as_deref());
    let kind = typename
        .and_then(ContentKind::parse)
        .or_else(|| item_type.and_then(ContentKind::parse))
        .unwrap_or_else(|| {
            debug!(?typename, ?item_type, "unrecognized content kind, treating as draft");
            ContentKind::DraftIssue
        });

    let Some(raw) = raw else {
        return ItemContent::new(kind, "");
    };

    let is_issue = kind == ContentKind::Issue;
    ItemContent {
        kind,
        title: raw.title.clone().unwrap_or_default(),
        url: raw.url.clone(),
        number: raw.number,
        state: raw.state.clone(),
        merged: raw.merged,
        repository: raw.repository.as_ref().and_then(repository_name),
        assignees: raw
            .assignees
            .iter()
            .flat_map(|conn| conn.iter())
            .filter_map(normalize_user)
            .collect(),
        parent: raw.parent.as_ref().filter(|_| is_issue).map(parent_ref),
        sub_issues_summary: raw
            .sub_issues_summary
            .as_ref()
            .filter(|_| is_issue)
            .map(sub_issues_summary),
    }
}
