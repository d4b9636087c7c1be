//! Display helpers shared by the command layer.
use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

/// Render an API timestamp as `YYYY-MM-DD HH:MM:SS`.
///
/// Missing values render empty; values that do not parse are shown as given.
pub fn format_datetime(raw: Option<&str>) -> String {
    match raw {
        None | Some("") => String::new(),
        Some(raw) => match parse_datetime(raw) {
            Some(parsed) => parsed.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => raw.to_string(),
        },
    }
}

/// Elapsed time between two API timestamps as `HH:MM:SS`; empty when either
/// end is missing or unparsable.
pub fn format_duration(start: Option<&str>, end: Option<&str>) -> String {
    let (Some(start), Some(end)) = (start.and_then(parse_datetime), end.and_then(parse_datetime))
    else {
        return String::new();
    };
    let total = (end - start).num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// Quote names made only of digits so they cannot be read as ids in messages.
pub fn format_name(name: &str) -> String {
    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
        format!("\"{name}\"")
    } else {
        name.to_string()
    }
}

/// Text for one table or value cell.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

/// `"Yes"` / `"No"` for enabled-style flags.
pub fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// `"job_template_name"` -> `"Job Template Name"`.
pub fn field_label(field: &str) -> String {
    field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(crate::resource::capitalized)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn datetime_drops_fraction_and_zone() {
        assert_eq!(
            format_datetime(Some("2025-07-01T14:47:53.988589Z")),
            "2025-07-01 14:47:53"
        );
        assert_eq!(
            format_datetime(Some("2025-07-01T14:47:53")),
            "2025-07-01 14:47:53"
        );
        assert_eq!(format_datetime(None), "");
        assert_eq!(format_datetime(Some("yesterday")), "yesterday");
    }

    #[test]
    fn duration_is_zero_padded() {
        assert_eq!(
            format_duration(
                Some("2025-07-01T10:00:00Z"),
                Some("2025-07-01T11:02:03.5Z")
            ),
            "01:02:03"
        );
        assert_eq!(format_duration(Some("2025-07-01T10:00:00Z"), None), "");
    }

    #[test]
    fn numeric_names_are_quoted() {
        assert_eq!(format_name("123"), "\"123\"");
        assert_eq!(format_name("web-01"), "web-01");
    }

    #[test]
    fn cells_render_fixed_scalar_spellings() {
        assert_eq!(cell_text(&json!(null)), "None");
        assert_eq!(cell_text(&json!(true)), "True");
        assert_eq!(cell_text(&json!(12)), "12");
        assert_eq!(cell_text(&json!({"a": 1})), "{\"a\":1}");
    }

    #[test]
    fn field_labels_are_title_cased() {
        assert_eq!(field_label("job_template_name"), "Job Template Name");
        assert_eq!(field_label("id"), "Id");
    }
}
