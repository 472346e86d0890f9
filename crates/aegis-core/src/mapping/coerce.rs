//! Value coercion for mapped fields

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Number, Value};

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

pub(crate) fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

pub(crate) fn instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_instant(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

pub(crate) fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Parse an external timestamp.
///
/// Accepts RFC 3339, the ticketing system's `YYYY-MM-DD HH:MM:SS`, ISO
/// local times without an offset, and bare dates. Times without an offset
/// are taken as UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&parsed));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight))
}

/// Render a JSON value for comparison against a configured string.
///
/// Strings compare by content, whole numbers without a fraction, and every
/// other value by its JSON text (`true`, `2.5`, `null`).
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        other => other.to_string(),
    }
}

/// Whole-valued floats render without a fraction (`1.0` as `1`)
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use serde_json::json;

    #[test]
    fn test_parse_instant_formats() {
        let rfc = parse_instant("2024-03-01T10:15:00Z").unwrap();
        let servicenow = parse_instant("2024-03-01 10:15:00").unwrap();
        let local_iso = parse_instant("2024-03-01T10:15:00.000").unwrap();
        assert_eq!(rfc, servicenow);
        assert_eq!(rfc, local_iso);

        let offset = parse_instant("2024-03-01T12:15:00+02:00").unwrap();
        assert_eq!(offset, rfc);

        let date = parse_instant("2024-03-01").unwrap();
        assert_eq!(date.hour(), 0);
    }

    #[test]
    fn test_parse_instant_rejects_garbage() {
        assert_eq!(parse_instant(""), None);
        assert_eq!(parse_instant("next tuesday"), None);
        assert_eq!(parse_instant("2024-13-45 99:00:00"), None);
    }

    #[test]
    fn test_instant_from_epoch_millis() {
        let parsed = instant(&json!(1_709_288_100_000_i64)).unwrap();
        assert_eq!(parsed, parse_instant("2024-03-01T10:15:00Z").unwrap());
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(text(&json!("db01")), Some("db01".to_string()));
        assert_eq!(text(&json!(42)), Some("42".to_string()));
        assert_eq!(text(&json!("")), None);
        assert_eq!(text(&json!({"name": "x"})), None);
    }

    #[test]
    fn test_flag_coercion() {
        assert_eq!(flag(&json!(true)), Some(true));
        assert_eq!(flag(&json!(0)), Some(false));
        assert_eq!(flag(&json!("False")), Some(false));
        assert_eq!(flag(&json!("maybe")), None);
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&json!("none")), "none");
        assert_eq!(stringify(&json!(3)), "3");
        assert_eq!(stringify(&json!(1.0)), "1");
        assert_eq!(stringify(&json!(-2.0)), "-2");
        assert_eq!(stringify(&json!(2.5)), "2.5");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!(null)), "null");
    }
}
