//! External record normalization
//!
//! Turns arbitrarily-shaped external JSON into canonical records. A
//! [`FieldMapping`] names, for each canonical field, the dotted path where
//! the external system keeps that value; [`extract`] walks the path and each
//! [`Canonical`] type coerces what it finds, falling back to its documented
//! defaults.
//!
//! Mapping is total: any input object yields a fully-populated record, so
//! one malformed row never poisons a collection.
//!
//! # Example
//!
//! ```rust,ignore
//! use aegis_core::mapping::{map_collection, FieldMapping};
//! use aegis_core::Outage;
//!
//! let mapping = FieldMapping::new()
//!     .with("id", "sys_id")
//!     .with("systemName", "cmdb_ci.name");
//! let outages: Vec<Outage> = map_collection(&rows, &mapping, &());
//! ```

mod canonical;
mod coerce;

pub use canonical::TicketLinks;
pub use coerce::{parse_instant, stringify};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Canonical field name to dotted external path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(BTreeMap<String, String>);

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one field's path (builder pattern)
    pub fn with(mut self, field: impl Into<String>, path: impl Into<String>) -> Self {
        self.0.insert(field.into(), path.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, path: impl Into<String>) {
        self.0.insert(field.into(), path.into());
    }

    /// The external path configured for a canonical field
    pub fn path(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Every configured path, ordered by field name
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Walk a dotted path through nested objects.
///
/// Segments index objects by key and arrays by position. Returns `None` when
/// a segment is missing or the walk reaches a scalar before the path ends.
pub fn extract<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(item, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Typed, defaulting access to one external object through a mapping
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    item: &'a Value,
    mapping: &'a FieldMapping,
}

impl<'a> FieldReader<'a> {
    pub fn new(item: &'a Value, mapping: &'a FieldMapping) -> Self {
        Self { item, mapping }
    }

    /// The mapped value of a canonical field; `null` counts as absent
    pub fn value(&self, field: &str) -> Option<&'a Value> {
        self.mapping
            .path(field)
            .and_then(|path| self.raw(path))
    }

    /// The value at an unmapped external path; `null` counts as absent
    pub fn raw(&self, path: &str) -> Option<&'a Value> {
        extract(self.item, path).filter(|value| !value.is_null())
    }

    /// Non-empty text (strings, or numbers rendered as text)
    pub fn text(&self, field: &str) -> Option<String> {
        self.value(field).and_then(coerce::text)
    }

    pub fn instant(&self, field: &str) -> Option<chrono::DateTime<chrono::Utc>> {
        let value = self.value(field)?;
        let parsed = coerce::instant(value);
        if parsed.is_none() {
            tracing::debug!(field, value = %value, "Unparseable timestamp, using default");
        }
        parsed
    }

    pub fn flag(&self, field: &str) -> Option<bool> {
        self.value(field).and_then(coerce::flag)
    }

    /// Validate a value against a closed set, logging values that miss it
    pub fn member<T>(&self, field: &str, parse: impl Fn(&Value) -> Option<T>) -> Option<T> {
        let value = self.value(field)?;
        let parsed = parse(value);
        if parsed.is_none() {
            tracing::debug!(field, value = %value, "Unrecognized value, using default");
        }
        parsed
    }
}

/// A record type the mapper can produce
pub trait Canonical: Sized {
    /// Extra, non-mapped inputs the record needs (links, base URLs)
    type Context: ?Sized;

    /// Build a record, substituting defaults for anything absent
    fn from_fields(fields: &FieldReader<'_>, context: &Self::Context) -> Self;
}

/// Map one external object to a canonical record
pub fn map_record<T: Canonical>(item: &Value, mapping: &FieldMapping, context: &T::Context) -> T {
    T::from_fields(&FieldReader::new(item, mapping), context)
}

/// Map every external object, preserving order
pub fn map_collection<T: Canonical>(
    items: &[Value],
    mapping: &FieldMapping,
    context: &T::Context,
) -> Vec<T> {
    items
        .iter()
        .map(|item| map_record(item, mapping, context))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_nested() {
        let item = json!({"a": {"b": {"c": 5}}});
        assert_eq!(extract(&item, "a.b.c"), Some(&json!(5)));
    }

    #[test]
    fn test_extract_absent() {
        assert_eq!(extract(&json!({"a": {"b": {}}}), "a.b.c"), None);
        assert_eq!(extract(&json!({}), "a.b.c"), None);
        assert_eq!(extract(&json!({"a": 1}), "a.b"), None);
        assert_eq!(extract(&json!({"a": 1}), ""), None);
        assert_eq!(extract(&json!({"a": {"b": 1}}), "a..b"), None);
    }

    #[test]
    fn test_extract_array_index() {
        let item = json!({"results": [{"id": 1}, {"id": 2}]});
        assert_eq!(extract(&item, "results.1.id"), Some(&json!(2)));
        assert_eq!(extract(&item, "results.9.id"), None);
        assert_eq!(extract(&item, "results.x"), None);
    }

    #[test]
    fn test_reader_treats_null_as_absent() {
        let mapping = FieldMapping::new().with("name", "n");
        let item = json!({"n": null});
        let reader = FieldReader::new(&item, &mapping);
        assert_eq!(reader.value("name"), None);
        assert_eq!(reader.text("name"), None);
    }

    #[test]
    fn test_unmapped_field_is_absent() {
        let mapping = FieldMapping::new();
        let item = json!({"name": "x"});
        assert_eq!(FieldReader::new(&item, &mapping).text("name"), None);
    }

    #[test]
    fn test_mapping_serializes_as_plain_object() {
        let mapping = FieldMapping::new().with("systemName", "cmdb_ci.name");
        assert_eq!(
            serde_json::to_value(&mapping).unwrap(),
            json!({"systemName": "cmdb_ci.name"})
        );
    }
}
