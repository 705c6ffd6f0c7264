//! Conversion of raw GitHub Projects records into the canonical model.

pub mod color;
pub mod content;
pub mod enrich;
pub mod field_config;
pub mod field_value;
pub mod page;

pub use color::resolve_option_color;
pub use content::normalize_content;
pub use enrich::backfill;
pub use field_config::normalize_field_config;
pub use field_value::{parse_field_value, parse_field_value_json};
pub use page::{ItemBuilder, Page, field_index, normalize_page};
