use indexmap::IndexMap;
use tracing::debug;

use crate::model::field::{DataType, FieldConfig, FieldConfiguration, FieldOption, Iteration};
use crate::model::raw::{RawField, RawIteration, RawOption};

/// Data type implied by a field metadata discriminator, when `dataType` is absent
fn data_type_from_typename(typename: &str) -> Option<DataType> {
    match typename {
        "ProjectV2SingleSelectField" => Some(DataType::SingleSelect),
        "ProjectV2IterationField" => Some(DataType::Iteration),
        _ => None,
    }
}

fn normalize_option(raw: &RawOption) -> FieldOption {
    let name = raw.name.clone().unwrap_or_default();
    FieldOption {
        id: raw.id.clone().unwrap_or_else(|| name.clone()),
        name,
        description: raw.description.clone().filter(|d| !d.is_empty()),
        color: raw.color.clone().filter(|c| !c.is_empty()),
    }
}

fn normalize_iteration(raw: &RawIteration) -> Option<Iteration> {
    Some(Iteration {
        id: raw.id.clone()?,
        title: raw.title.clone().unwrap_or_default(),
        start_date: raw.start_date.clone().unwrap_or_default(),
        duration: raw.duration,
    })
}

/// Convert a raw field metadata record into a `FieldConfig`.
///
/// Never fails: a missing or unrecognized data type is passed through as
/// `DataType::Other`.
pub fn normalize_field_config(raw: &RawField) -> FieldConfig {
    let typename = raw.typename.as_deref().unwrap_or_default();
    let data_type = match raw.data_type.as_deref() {
        Some(dt) => DataType::parse(dt),
        None => data_type_from_typename(typename).unwrap_or_else(|| {
            debug!(field = ?raw.id, typename, "field metadata without dataType");
            DataType::parse(typename)
        }),
    };

    let mut field = FieldConfig::new(
        raw.id.clone().unwrap_or_default(),
        raw.name.clone().unwrap_or_default(),
        data_type,
    );

    let carries_options = matches!(
        field.data_type,
        DataType::SingleSelect | DataType::Labels | DataType::Milestone | DataType::Repository
    ) || typename == "ProjectV2SingleSelectField";
    if carries_options {
        field.options = raw
            .options
            .as_ref()
            .map(|opts| opts.iter().map(normalize_option).collect());
        field.repo_options = raw.repo_options.as_ref().map(|by_repo| {
            by_repo
                .iter()
                .map(|(repo, opts)| (repo.clone(), opts.iter().map(normalize_option).collect()))
                .collect::<IndexMap<_, _>>()
        });
    }

    let is_iteration =
        field.data_type == DataType::Iteration || typename == "ProjectV2IterationField";
    if is_iteration && let Some(config) = &raw.configuration {
        // Completed iterations are listed after the active ones
        let iterations = config
            .iterations
            .iter()
            .chain(config.completed_iterations.iter())
            .flatten()
            .filter_map(normalize_iteration)
            .collect();
        field.configuration = Some(FieldConfiguration { iterations });
    }

    field
}
