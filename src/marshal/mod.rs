//! Marshaling Module
//!
//! Bidirectional mapping between a typed record and a flat
//! field-name -> string map. Each record type declares an explicit
//! schema descriptor (a static table of field specs) instead of relying
//! on runtime type introspection; the [`crate::field_record!`] macro
//! builds the table declaratively.
//!
//! Null-valued fields are omitted on write (sparse encoding) and left
//! at the type's zero value on reconstruction. A field whose stored
//! string cannot be coerced back aborts reconstruction of the whole
//! record.

mod record;


use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::MarshalError;

// == Field ==
/// A single named entry of a stored field map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name, unique within the map
    pub name: String,
    /// String-encoded scalar or JSON-encoded list
    pub value: String,
}

impl Field {
    /// Creates a new field-map entry.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// == Scalar Kind ==
/// Declared kind of a record field, used in coercion diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// UTF-8 text, stored verbatim
    Text,
    /// Signed or unsigned integer
    Integer,
    /// Floating-point number
    Float,
    /// `true` / `false`
    Boolean,
    /// RFC 3339 timestamp
    DateTime,
    /// Homogeneous list, JSON-encoded
    List,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Text => "text",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Boolean => "boolean",
            ScalarKind::DateTime => "datetime",
            ScalarKind::List => "list",
        };
        f.write_str(name)
    }
}

// == Field Spec ==
/// Schema descriptor for one field of a record type.
///
/// The encode fn returns `Ok(None)` for a null-valued field, which is
/// then omitted from the stored map entirely; there is no tombstone
/// distinguishing "absent" from "present but empty".
pub struct FieldSpec<T> {
    /// Exact, case-sensitive field name
    pub name: &'static str,
    /// Declared scalar kind
    pub kind: ScalarKind,
    /// Converts the field to its canonical string form, `None` if null
    pub encode: fn(&T) -> Result<Option<String>, MarshalError>,
    /// Parses a stored string back into the field
    pub decode: fn(&mut T, &str) -> Result<(), MarshalError>,
}

// == Field Record Trait ==
/// A record type storable as a field map.
///
/// `Default` supplies the zero-valued instance reconstruction starts
/// from; `FIELDS` is the static schema table walked by
/// [`to_fields`] / [`from_fields`].
pub trait FieldRecord: Default + 'static {
    /// Schema table, one spec per field.
    const FIELDS: &'static [FieldSpec<Self>];
}

// == To Fields ==
/// Converts a record into its sparse field-map representation.
///
/// Walks the record's schema table; fields whose encode fn reports a
/// null value are skipped.
pub fn to_fields<T: FieldRecord>(record: &T) -> Result<Vec<Field>, MarshalError> {
    let mut fields = Vec::with_capacity(T::FIELDS.len());

    for spec in T::FIELDS {
        if let Some(value) = (spec.encode)(record)? {
            fields.push(Field::new(spec.name, value));
        }
    }

    Ok(fields)
}

// == From Fields ==
/// Reconstructs a record from a stored field map.
///
/// Starts from the type's zero value; each schema entry whose name
/// exactly matches a stored field is coerced and assigned. Unmatched
/// schema entries keep the zero value; stored names matching no schema
/// entry are ignored. The first coercion failure aborts the whole
/// reconstruction.
pub fn from_fields<T: FieldRecord>(fields: &[Field]) -> Result<T, MarshalError> {
    let mut record = T::default();

    for spec in T::FIELDS {
        if let Some(field) = fields.iter().find(|f| f.name == spec.name) {
            (spec.decode)(&mut record, &field.value)?;
        }
    }

    Ok(record)
}

// == Coercion Helpers ==
/// Parses a stored scalar into any `FromStr` target type.
///
/// Covers integers, floats, booleans and `chrono::DateTime<Utc>`
/// (RFC 3339). Reports a [`MarshalError::TypeCoercion`] on parse
/// failure.
pub fn coerce<V: FromStr>(
    field: &'static str,
    kind: ScalarKind,
    raw: &str,
) -> Result<V, MarshalError> {
    raw.parse().map_err(|_| MarshalError::TypeCoercion {
        field,
        kind,
        raw: raw.to_string(),
    })
}

/// JSON-encodes a homogeneous list field.
pub fn encode_list<V: Serialize>(values: &[V]) -> Result<String, MarshalError> {
    Ok(serde_json::to_string(values)?)
}

/// Decodes a JSON-encoded list field, preserving element order.
pub fn coerce_list<V: DeserializeOwned>(
    field: &'static str,
    raw: &str,
) -> Result<Vec<V>, MarshalError> {
    serde_json::from_str(raw).map_err(|_| MarshalError::TypeCoercion {
        field,
        kind: ScalarKind::List,
        raw: raw.to_string(),
    })
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    use crate as sidecache;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Session {
        id: u64,
        label: String,
        score: f64,
        active: bool,
        note: Option<String>,
        tags: Vec<String>,
        opened_at: Option<DateTime<Utc>>,
    }

    sidecache::field_record! {
        Session {
            id: integer,
            label: text,
            score: float,
            active: boolean,
            note: optional_text,
            tags: list,
            opened_at: optional_datetime,
        }
    }

    fn sample() -> Session {
        Session {
            id: 42,
            label: "checkout".to_string(),
            score: 0.5,
            active: true,
            note: Some("first visit".to_string()),
            tags: vec!["a".to_string(), "b".to_string()],
            opened_at: Some(Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap()),
        }
    }

    #[test]
    fn test_roundtrip_full_record() {
        let original = sample();

        let fields = to_fields(&original).unwrap();
        let rebuilt: Session = from_fields(&fields).unwrap();

        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_null_fields_are_omitted() {
        let record = Session {
            note: None,
            opened_at: None,
            ..sample()
        };

        let fields = to_fields(&record).unwrap();

        assert!(fields.iter().all(|f| f.name != "note"));
        assert!(fields.iter().all(|f| f.name != "opened_at"));
    }

    #[test]
    fn test_sparse_reconstruction_uses_zero_values() {
        // Only two of seven fields stored
        let fields = vec![Field::new("id", "7"), Field::new("label", "sparse")];

        let rebuilt: Session = from_fields(&fields).unwrap();

        assert_eq!(rebuilt.id, 7);
        assert_eq!(rebuilt.label, "sparse");
        assert_eq!(rebuilt.score, 0.0);
        assert!(!rebuilt.active);
        assert!(rebuilt.note.is_none());
        assert!(rebuilt.tags.is_empty());
        assert!(rebuilt.opened_at.is_none());
    }

    #[test]
    fn test_unknown_stored_fields_are_ignored() {
        let fields = vec![Field::new("id", "3"), Field::new("legacy_column", "x")];

        let rebuilt: Session = from_fields(&fields).unwrap();

        assert_eq!(rebuilt.id, 3);
    }

    #[test]
    fn test_field_name_match_is_case_sensitive() {
        let fields = vec![Field::new("Id", "3")];

        let rebuilt: Session = from_fields(&fields).unwrap();

        // "Id" does not match "id"; the field keeps its zero value
        assert_eq!(rebuilt.id, 0);
    }

    #[test]
    fn test_bad_scalar_aborts_reconstruction() {
        let fields = vec![Field::new("id", "not-a-number"), Field::new("label", "x")];

        let result: Result<Session, _> = from_fields(&fields);

        match result {
            Err(MarshalError::TypeCoercion { field, kind, raw }) => {
                assert_eq!(field, "id");
                assert_eq!(kind, ScalarKind::Integer);
                assert_eq!(raw, "not-a-number");
            }
            other => panic!("expected TypeCoercion, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_list_field_roundtrip_preserves_order() {
        let record = Session {
            tags: vec!["a".to_string(), "b".to_string()],
            ..Session::default()
        };

        let fields = to_fields(&record).unwrap();
        let stored = fields.iter().find(|f| f.name == "tags").unwrap();
        assert_eq!(stored.value, r#"["a","b"]"#);

        let rebuilt: Session = from_fields(&fields).unwrap();
        assert_eq!(rebuilt.tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_datetime_stored_as_rfc3339() {
        let record = sample();

        let fields = to_fields(&record).unwrap();
        let stored = fields.iter().find(|f| f.name == "opened_at").unwrap();

        assert!(stored.value.starts_with("2024-05-17T09:30:00"));
    }

    #[test]
    fn test_coerce_reports_kind_and_raw() {
        let err = coerce::<i64>("age", ScalarKind::Integer, "??").unwrap_err();

        assert!(err.to_string().contains("age"));
        assert!(err.to_string().contains("integer"));
    }
}
