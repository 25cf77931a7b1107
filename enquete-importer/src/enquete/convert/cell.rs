//! Raw cell normalization

use serde_json::Value;

/// Render a raw cell as a trimmed string.
///
/// Absent cells become `""`, the single "no value" marker used everywhere
/// downstream. Whole-valued floats render without a fractional part so that
/// a reader reporting `3.0` and one reporting `3` agree.
pub fn normalize_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
                    _ => n.to_string(),
                }
            }
        }
        other => other.to_string().trim().to_string(),
    }
}

/// Trim a string cell; the `&str` counterpart of [`normalize_cell`]
pub fn normalize_str(value: &str) -> String {
    value.trim().to_string()
}
