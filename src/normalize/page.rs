use serde_json::Value;
use tracing::debug;

use crate::model::field::{FieldConfig, names_match};
use crate::model::item::{Item, ItemContent};
use crate::model::raw::{RawField, RawFieldRef, RawItem};
use crate::model::value::NormalizedValue;

use super::content::normalize_content;
use super::enrich::backfill;
use super::field_config::normalize_field_config;
use super::field_value::parse_field_value_json;

/// An item under construction: one slot per field, positionally aligned
/// with the page's field list. Slots stay `None` until a value arrives or
/// the backfill synthesizes one.
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    pub id: String,
    pub content: ItemContent,
    slots: Vec<Option<NormalizedValue>>,
}

impl ItemBuilder {
    pub fn new(id: impl Into<String>, content: ItemContent, width: usize) -> Self {
        ItemBuilder {
            id: id.into(),
            content,
            slots: vec![None; width],
        }
    }

    pub fn slot(&self, index: usize) -> Option<&NormalizedValue> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Place a value at `index`. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: NormalizedValue) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(value);
        }
    }

    /// Finish the item. Slots still empty become `missing`.
    pub fn build(self, fields: &[FieldConfig]) -> Item {
        let field_values = self
            .slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.unwrap_or_else(|| {
                    let field = fields.get(i);
                    NormalizedValue::Missing {
                        field_id: field.map(|f| f.id.clone()).unwrap_or_default(),
                        field_name: field.map(|f| f.name.clone()).unwrap_or_default(),
                    }
                })
            })
            .collect();
        Item {
            id: self.id,
            content: self.content,
            field_values,
        }
    }
}

/// Normalized field metadata plus the items fetched with it
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub fields: Vec<FieldConfig>,
    pub items: Vec<Item>,
}

impl Page {
    /// Position of a field by id or case-insensitive name
    pub fn field_index(&self, key: &str) -> Option<usize> {
        field_index(&self.fields, key)
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// Position of a field by id, then by case-insensitive name
pub fn field_index(fields: &[FieldConfig], key: &str) -> Option<usize> {
    fields
        .iter()
        .position(|f| f.id == key)
        .or_else(|| fields.iter().position(|f| names_match(&f.name, key)))
}

/// The slot a raw value belongs in: its back-referenced field id, then name
fn slot_for(value: &Value, fields: &[FieldConfig]) -> Option<usize> {
    let field_ref: RawFieldRef = serde_json::from_value(value.get("field")?.clone()).ok()?;
    field_ref
        .id
        .as_deref()
        .and_then(|id| fields.iter().position(|f| f.id == id))
        .or_else(|| {
            let name = field_ref.name.as_deref()?;
            fields.iter().position(|f| names_match(&f.name, name))
        })
}

fn builder_for(raw: &RawItem, position: usize, fields: &[FieldConfig]) -> ItemBuilder {
    let content = normalize_content(raw.content.as_ref(), raw.item_type.as_deref());
    let id = raw
        .id
        .clone()
        .unwrap_or_else(|| format!("item-{}", position));
    let mut builder = ItemBuilder::new(id, content, fields.len());

    for value in raw.field_values.iter().flat_map(|conn| conn.iter()) {
        let Some(index) = slot_for(value, fields) else {
            debug!(item = %builder.id, "field value for a field outside the page");
            continue;
        };
        let normalized = parse_field_value_json(value, fields.get(index), Some(&builder.content));
        builder.set(index, normalized);
    }

    // Title is derived from content even when the API sends no value for it
    for (index, field) in fields.iter().enumerate() {
        if field.is_title() && builder.slot(index).is_none() {
            let title = NormalizedValue::Title {
                field_id: field.id.clone(),
                text: builder.content.title.clone(),
                content: Box::new(builder.content.clone()),
                raw: Value::Null,
            };
            builder.set(index, title);
        }
    }

    builder
}

/// Normalize one fetched page.
///
/// Field metadata is normalized first; each item's values are placed in the
/// slot of the field they reference; the enrichment backfill runs once over
/// all items; then every item is finished into its immutable form.
pub fn normalize_page(raw_fields: &[RawField], raw_items: &[RawItem]) -> Page {
    let fields: Vec<FieldConfig> = raw_fields.iter().map(normalize_field_config).collect();

    let mut builders: Vec<ItemBuilder> = raw_items
        .iter()
        .enumerate()
        .map(|(i, raw)| builder_for(raw, i, &fields))
        .collect();

    let stats = backfill(&mut builders, &fields);
    debug!(
        fields = fields.len(),
        items = builders.len(),
        sub_issues = stats.sub_issues,
        parents = stats.parents,
        "normalized page"
    );

    let items = builders.into_iter().map(|b| b.build(&fields)).collect();
    Page { fields, items }
}
