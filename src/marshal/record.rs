//! Record Schema Macro
//!
//! Builds the static schema table a [`FieldRecord`](super::FieldRecord)
//! type needs, one spec per field, from a declarative field: kind list.
//! The table is assembled at compile time; no runtime type
//! introspection is involved.
//!
//! Supported kinds: `text`, `optional_text`, `integer`,
//! `optional_integer`, `float`, `boolean`, `datetime`,
//! `optional_datetime`, `list`.

/// Implements [`FieldRecord`](crate::marshal::FieldRecord) for a struct
/// from a declarative field list.
///
/// # Example
/// ```
/// use chrono::{DateTime, Utc};
///
/// #[derive(Debug, Default)]
/// struct Profile {
///     id: u64,
///     name: String,
///     email: Option<String>,
///     tags: Vec<String>,
///     last_seen: Option<DateTime<Utc>>,
/// }
///
/// sidecache::field_record! {
///     Profile {
///         id: integer,
///         name: text,
///         email: optional_text,
///         tags: list,
///         last_seen: optional_datetime,
///     }
/// }
///
/// let fields = sidecache::to_fields(&Profile::default()).unwrap();
/// // null fields (email, last_seen) are omitted from the map
/// assert_eq!(fields.len(), 3);
/// ```
#[macro_export]
macro_rules! field_record {
    ($ty:ident { $($field:ident : $kind:tt),* $(,)? }) => {
        impl $crate::marshal::FieldRecord for $ty {
            const FIELDS: &'static [$crate::marshal::FieldSpec<Self>] = &[
                $($crate::field_record!(@spec $ty, $field, $kind)),*
            ];
        }
    };

    (@spec $ty:ident, $field:ident, text) => {
        $crate::marshal::FieldSpec {
            name: stringify!($field),
            kind: $crate::marshal::ScalarKind::Text,
            encode: |r: &$ty| Ok(Some(r.$field.clone())),
            decode: |r: &mut $ty, raw: &str| {
                r.$field = raw.to_string();
                Ok(())
            },
        }
    };

    (@spec $ty:ident, $field:ident, optional_text) => {
        $crate::marshal::FieldSpec {
            name: stringify!($field),
            kind: $crate::marshal::ScalarKind::Text,
            encode: |r: &$ty| Ok(r.$field.clone()),
            decode: |r: &mut $ty, raw: &str| {
                r.$field = Some(raw.to_string());
                Ok(())
            },
        }
    };

    (@spec $ty:ident, $field:ident, integer) => {
        $crate::marshal::FieldSpec {
            name: stringify!($field),
            kind: $crate::marshal::ScalarKind::Integer,
            encode: |r: &$ty| Ok(Some(r.$field.to_string())),
            decode: |r: &mut $ty, raw: &str| {
                r.$field = $crate::marshal::coerce(
                    stringify!($field),
                    $crate::marshal::ScalarKind::Integer,
                    raw,
                )?;
                Ok(())
            },
        }
    };

    (@spec $ty:ident, $field:ident, optional_integer) => {
        $crate::marshal::FieldSpec {
            name: stringify!($field),
            kind: $crate::marshal::ScalarKind::Integer,
            encode: |r: &$ty| Ok(r.$field.as_ref().map(|v| v.to_string())),
            decode: |r: &mut $ty, raw: &str| {
                r.$field = Some($crate::marshal::coerce(
                    stringify!($field),
                    $crate::marshal::ScalarKind::Integer,
                    raw,
                )?);
                Ok(())
            },
        }
    };

    (@spec $ty:ident, $field:ident, float) => {
        $crate::marshal::FieldSpec {
            name: stringify!($field),
            kind: $crate::marshal::ScalarKind::Float,
            encode: |r: &$ty| Ok(Some(r.$field.to_string())),
            decode: |r: &mut $ty, raw: &str| {
                r.$field = $crate::marshal::coerce(
                    stringify!($field),
                    $crate::marshal::ScalarKind::Float,
                    raw,
                )?;
                Ok(())
            },
        }
    };

    (@spec $ty:ident, $field:ident, boolean) => {
        $crate::marshal::FieldSpec {
            name: stringify!($field),
            kind: $crate::marshal::ScalarKind::Boolean,
            encode: |r: &$ty| Ok(Some(r.$field.to_string())),
            decode: |r: &mut $ty, raw: &str| {
                r.$field = $crate::marshal::coerce(
                    stringify!($field),
                    $crate::marshal::ScalarKind::Boolean,
                    raw,
                )?;
                Ok(())
            },
        }
    };

    (@spec $ty:ident, $field:ident, datetime) => {
        $crate::marshal::FieldSpec {
            name: stringify!($field),
            kind: $crate::marshal::ScalarKind::DateTime,
            encode: |r: &$ty| Ok(Some(r.$field.to_rfc3339())),
            decode: |r: &mut $ty, raw: &str| {
                r.$field = $crate::marshal::coerce(
                    stringify!($field),
                    $crate::marshal::ScalarKind::DateTime,
                    raw,
                )?;
                Ok(())
            },
        }
    };

    (@spec $ty:ident, $field:ident, optional_datetime) => {
        $crate::marshal::FieldSpec {
            name: stringify!($field),
            kind: $crate::marshal::ScalarKind::DateTime,
            encode: |r: &$ty| Ok(r.$field.as_ref().map(|v| v.to_rfc3339())),
            decode: |r: &mut $ty, raw: &str| {
                r.$field = Some($crate::marshal::coerce(
                    stringify!($field),
                    $crate::marshal::ScalarKind::DateTime,
                    raw,
                )?);
                Ok(())
            },
        }
    };

    (@spec $ty:ident, $field:ident, list) => {
        $crate::marshal::FieldSpec {
            name: stringify!($field),
            kind: $crate::marshal::ScalarKind::List,
            encode: |r: &$ty| $crate::marshal::encode_list(&r.$field).map(Some),
            decode: |r: &mut $ty, raw: &str| {
                r.$field = $crate::marshal::coerce_list(stringify!($field), raw)?;
                Ok(())
            },
        }
    };
}
