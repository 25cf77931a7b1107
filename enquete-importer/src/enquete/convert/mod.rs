//! Cell normalization, value converters and typed parsers

mod cell;
mod lookup;
mod width;
mod sjis;
mod parse;

pub use cell::{normalize_cell, normalize_str};
pub use lookup::{ENGLISH_TO_JAPANESE, Vocabularies, apply_conversion};
pub use width::{to_full_width_kana, to_half_width};
pub use sjis::sanitize_shift_jis;
pub use parse::{
    DefaultZone, ParseSettings, normalize_date_text, parse_date,
    parse_datetime, parse_integer,
};

/// Normalize a language discriminator for matching: trimmed, width-folded,
/// lowercased
pub fn normalize_discriminator(value: &str) -> String {
    to_half_width(value.trim()).trim().to_lowercase()
}
