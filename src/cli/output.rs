use serde::Serialize;

use crate::model::field::{DataType, FieldConfig, Iteration};
use crate::model::item::{Assignee, Item, ItemContent};
use crate::model::value::{LinkedItem, NormalizedValue};
use crate::ops::text::format_number;
use crate::util::unicode::{display_width, fit_to_width, truncate_to_width};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct FilterJson {
    pub query: String,
    pub total: usize,
    pub matched: usize,
    pub items: Vec<ItemRowJson>,
}

#[derive(Serialize)]
pub struct ItemRowJson {
    pub id: String,
    pub kind: &'static str,
    pub state: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub columns: Vec<ColumnJson>,
}

#[derive(Serialize)]
pub struct ColumnJson {
    pub field: String,
    pub value: String,
}

#[derive(Serialize)]
pub struct FieldJson<'a> {
    #[serde(flatten)]
    pub field: &'a FieldConfig,
    /// Option name to resolved `#hex` color
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<OptionColorJson>,
}

#[derive(Serialize)]
pub struct OptionColorJson {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Serialize)]
pub struct ItemDetailJson<'a> {
    pub id: &'a str,
    pub content: &'a ItemContent,
    pub values: Vec<FieldValueJson<'a>>,
}

#[derive(Serialize)]
pub struct FieldValueJson<'a> {
    pub field: &'a str,
    pub value: &'a NormalizedValue,
}

#[derive(Serialize)]
pub struct ColorJson {
    pub token: String,
    pub color: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn item_to_json(item: &Item, fields: &[FieldConfig], columns: &[usize]) -> ItemRowJson {
    ItemRowJson {
        id: item.id.clone(),
        kind: item.content.kind.name(),
        state: item.content.state_token(),
        title: item.content.title.clone(),
        number: item.content.number,
        repository: item.content.repository.clone(),
        url: item.content.url.clone(),
        columns: columns
            .iter()
            .filter_map(|&i| {
                Some(ColumnJson {
                    field: fields.get(i)?.name.clone(),
                    value: item.field_values.get(i).map(format_value).unwrap_or_default(),
                })
            })
            .collect(),
    }
}

pub fn field_to_json(field: &FieldConfig) -> FieldJson<'_> {
    let colors = field
        .options
        .iter()
        .flatten()
        .filter(|o| o.color.is_some())
        .map(|o| OptionColorJson {
            name: o.name.clone(),
            color: o.hex_color(),
        })
        .collect();
    FieldJson { field, colors }
}

/// The field a value belongs to: by its own field id, else by position
fn value_field<'a>(
    value: &NormalizedValue,
    index: usize,
    fields: &'a [FieldConfig],
) -> Option<&'a FieldConfig> {
    value
        .field_id()
        .and_then(|id| fields.iter().find(|f| f.id == id))
        .or_else(|| fields.get(index))
}

pub fn item_to_detail_json<'a>(item: &'a Item, fields: &'a [FieldConfig]) -> ItemDetailJson<'a> {
    ItemDetailJson {
        id: &item.id,
        content: &item.content,
        values: item
            .field_values
            .iter()
            .enumerate()
            .map(|(i, value)| FieldValueJson {
                field: value_field(value, i, fields).map_or("", |f| f.name.as_str()),
                value,
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn format_users(users: &[Assignee]) -> String {
    users
        .iter()
        .map(|u| u.login.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_linked(items: &[LinkedItem]) -> String {
    items
        .iter()
        .map(|l| match l.number {
            Some(n) => format!("#{}", n),
            None => l.title.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// One-cell rendering of a value
pub fn format_value(value: &NormalizedValue) -> String {
    match value {
        NormalizedValue::Title { text, .. } | NormalizedValue::Text { text, .. } => text.clone(),
        NormalizedValue::Number { number, .. } => number.map(format_number).unwrap_or_default(),
        NormalizedValue::Date { date, .. } => date.clone(),
        NormalizedValue::SingleSelect { option, .. } => option.name.clone(),
        NormalizedValue::Labels { labels, .. } => labels
            .iter()
            .map(|l| l.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        NormalizedValue::Repository { repository, .. } => repository.name_with_owner.clone(),
        NormalizedValue::PullRequest { pull_requests, .. } => format_linked(pull_requests),
        NormalizedValue::Issue { issues, .. } => format_linked(issues),
        NormalizedValue::Assignees { assignees, .. } => format_users(assignees),
        NormalizedValue::RequestedReviewers { reviewers, .. } => format_users(reviewers),
        NormalizedValue::Iteration { title, .. } => title.clone(),
        NormalizedValue::Milestone { milestone, .. } => milestone.title.clone(),
        NormalizedValue::SubIssuesProgress { total, done, percent, .. } => {
            format!("{}/{} ({}%)", done, total, format_number(*percent))
        }
        NormalizedValue::ParentIssue { parent, .. } => match (parent.number, &parent.title) {
            (Some(n), Some(title)) => format!("#{} {}", n, title),
            (Some(n), None) => format!("#{}", n),
            (None, Some(title)) => title.clone(),
            (None, None) => String::new(),
        },
        NormalizedValue::Missing { .. } => String::new(),
        NormalizedValue::Unknown { raw, .. } => {
            if raw.is_null() {
                String::new()
            } else {
                raw.to_string()
            }
        }
    }
}

/// Column positions to show: configured names in order, or every field
/// other than the title when none are configured. Unknown names are skipped.
pub fn select_columns(fields: &[FieldConfig], names: &[String]) -> Vec<usize> {
    if names.is_empty() {
        return fields
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_title())
            .map(|(i, _)| i)
            .collect();
    }
    names
        .iter()
        .filter_map(|name| crate::normalize::page::field_index(fields, name))
        .collect()
}

/// Render matching items as an aligned table
pub fn format_item_table(
    items: &[&Item],
    fields: &[FieldConfig],
    columns: &[usize],
    max_title_width: usize,
) -> Vec<String> {
    let mut header = vec![
        "ID".to_string(),
        "KIND".to_string(),
        "STATE".to_string(),
        "TITLE".to_string(),
    ];
    header.extend(columns.iter().filter_map(|&i| fields.get(i)).map(|f| f.name.to_uppercase()));

    let mut rows = vec![header];
    for item in items {
        let mut row = vec![
            item.id.clone(),
            item.content.kind.name().to_string(),
            item.content.state_token(),
            truncate_to_width(&item.content.title, max_title_width),
        ];
        row.extend(columns.iter().filter(|&&i| i < fields.len()).map(|&i| {
            item.field_values.get(i).map(format_value).unwrap_or_default()
        }));
        rows.push(row);
    }

    let width_count = rows[0].len();
    let widths: Vec<usize> = (0..width_count)
        .map(|c| rows.iter().map(|r| r.get(c).map_or(0, |s| display_width(s))).max().unwrap_or(0))
        .collect();

    rows.iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| fit_to_width(cell, w))
                .collect();
            cells.join("  ").trim_end().to_string()
        })
        .collect()
}

fn data_type_label(data_type: &DataType) -> String {
    data_type.as_str().to_lowercase()
}

/// One line per field: id, data type, name and option summary
pub fn format_field_lines(fields: &[FieldConfig]) -> Vec<String> {
    fields
        .iter()
        .map(|field| {
            let mut line = format!(
                "{}  {}  {}",
                field.id,
                data_type_label(&field.data_type),
                field.name
            );
            if let Some(options) = &field.options
                && !options.is_empty()
            {
                let names: Vec<String> = options
                    .iter()
                    .map(|o| match o.hex_color() {
                        Some(hex) => format!("{} {}", o.name, hex),
                        None => o.name.clone(),
                    })
                    .collect();
                line.push_str(&format!(" [{}]", names.join(", ")));
            }
            if let Some(config) = &field.configuration
                && !config.iterations.is_empty()
            {
                let spans: Vec<String> =
                    config.iterations.iter().map(format_iteration_span).collect();
                line.push_str(&format!(" [{}]", spans.join(", ")));
            }
            line
        })
        .collect()
}

/// Iteration title with its `start..end` dates when the end is computable
fn format_iteration_span(iteration: &Iteration) -> String {
    match iteration.end_date() {
        Some(end) => format!("{} {}..{}", iteration.title, iteration.start_date, end),
        None => iteration.title.clone(),
    }
}

/// Detailed view of one item
pub fn format_item_detail(item: &Item, fields: &[FieldConfig]) -> Vec<String> {
    let content = &item.content;
    let mut lines = Vec::new();
    let number = content.number.map(|n| format!(" #{}", n)).unwrap_or_default();
    lines.push(format!("{}{} {}", content.kind.name(), number, content.title));

    let state = content.state_token();
    if !state.is_empty() {
        lines.push(format!("  state: {}", state));
    }
    if let Some(repo) = &content.repository {
        lines.push(format!("  repo: {}", repo));
    }
    if let Some(url) = &content.url {
        lines.push(format!("  url: {}", url));
    }
    if !content.assignees.is_empty() {
        lines.push(format!("  assignees: {}", format_users(&content.assignees)));
    }

    for (i, value) in item.field_values.iter().enumerate() {
        let name = fields.get(i).map(|f| f.name.as_str()).unwrap_or("?");
        let text = format_value(value);
        if text.is_empty() {
            lines.push(format!("  {}: ({})", name, value.kind()));
        } else {
            lines.push(format!("  {}: {}", name, text));
        }
    }
    lines
}
