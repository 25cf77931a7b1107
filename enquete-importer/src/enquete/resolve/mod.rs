//! Mapping resolution: catalogs, references, language variants and jobs

mod catalog;
mod normalize;
mod mapping;
mod jobs;

pub use catalog::{
    CLAMP_PREFIX, CONVERSION_PREFIX, DEFAULT_MAPPING, MappingCatalog, is_clamp_key,
    is_conversion_key, is_mapping_definition, is_section_key,
};
pub use normalize::{apply_value_conversions, normalize_mapping, parse_conversion};
pub use mapping::{resolve_language_variants, resolve_mapping, sanitize_reference};
pub use jobs::{JobSettings, required_headers, resolve_jobs};
