//! Cache Codec Module
//!
//! Fixes the wire representation of a cached type at compile time. A
//! type is either scalar (stored as one string) or a record (stored as
//! a field map); the choice is an associated const of [`CacheCodec`],
//! so readers and writers of a key agree on the representation through
//! the type they name at the call site rather than a runtime check.

use std::fmt;

use crate::error::MarshalError;
use crate::marshal::Field;

// == Representation ==
/// Wire representation of a cached type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repr {
    /// Single string payload
    Scalar,
    /// Field-name -> value map
    Record,
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repr::Scalar => f.write_str("scalar"),
            Repr::Record => f.write_str("record"),
        }
    }
}

// == Payload ==
/// An encoded cache value, ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Flat string payload
    Scalar(String),
    /// Field-map payload
    Fields(Vec<Field>),
}

// == Cache Codec Trait ==
/// Converts a typed value to and from its store payload.
///
/// `REPR` picks the store lane (`string_set`/`string_get` versus
/// `field_map_set`/`field_map_get_all`); `decode` receives whatever the
/// store returned for that lane, which is the empty payload when the
/// key is absent.
pub trait CacheCodec: Sized {
    /// Wire representation this type uses.
    const REPR: Repr;

    /// Encodes the value into a store payload.
    fn encode(&self) -> Result<Payload, MarshalError>;

    /// Decodes a store payload back into the value.
    fn decode(payload: Payload) -> Result<Self, MarshalError>;
}

// == Scalar Codec ==
impl CacheCodec for String {
    const REPR: Repr = Repr::Scalar;

    fn encode(&self) -> Result<Payload, MarshalError> {
        Ok(Payload::Scalar(self.clone()))
    }

    fn decode(payload: Payload) -> Result<Self, MarshalError> {
        match payload {
            Payload::Scalar(value) => Ok(value),
            Payload::Fields(_) => Err(MarshalError::ReprMismatch {
                expected: Repr::Scalar,
            }),
        }
    }
}

// == Record Codec Macro ==
/// Implements the record flavor of [`CacheCodec`] for a
/// [`FieldRecord`](crate::marshal::FieldRecord) type.
///
/// # Example
/// ```
/// use sidecache::codec::{CacheCodec, Repr};
///
/// #[derive(Debug, Default)]
/// struct Counter {
///     hits: u64,
/// }
///
/// sidecache::field_record! { Counter { hits: integer } }
/// sidecache::impl_record_codec!(Counter);
///
/// assert_eq!(Counter::REPR, Repr::Record);
/// ```
#[macro_export]
macro_rules! impl_record_codec {
    ($ty:ty) => {
        impl $crate::codec::CacheCodec for $ty {
            const REPR: $crate::codec::Repr = $crate::codec::Repr::Record;

            fn encode(
                &self,
            ) -> std::result::Result<$crate::codec::Payload, $crate::error::MarshalError> {
                $crate::marshal::to_fields(self).map($crate::codec::Payload::Fields)
            }

            fn decode(
                payload: $crate::codec::Payload,
            ) -> std::result::Result<Self, $crate::error::MarshalError> {
                match payload {
                    $crate::codec::Payload::Fields(fields) => {
                        $crate::marshal::from_fields(&fields)
                    }
                    $crate::codec::Payload::Scalar(_) => {
                        Err($crate::error::MarshalError::ReprMismatch {
                            expected: $crate::codec::Repr::Record,
                        })
                    }
                }
            }
        }
    };
}
