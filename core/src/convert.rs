//! Value conversion: one raw column [`Value`] into one destination scalar.
//!
//! [`FromValue`] has one method per raw value kind, each rejecting by
//! default; a type implements the methods that make sense for it. Numeric
//! conversions require exact representability — a narrowing that would lose
//! information is an error, never a silent truncation.
//!
//! Destination types outside the built-in set implement this trait
//! themselves (and register for struct-field use with
//! [`scalar_type!`](crate::scalar_type)); their rejections carry the
//! underlying cause back to the caller.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use thiserror::Error;

use crate::error::BoxError;
use crate::value::Value;

/// A conversion failure, before field-path context is attached.
///
/// The row materializer turns these into
/// [`AquiferError`](crate::error::AquiferError) values naming the offending
/// field and its declared type.
#[derive(Debug, Error)]
pub enum ValueError {
    /// NULL for a type that cannot represent absence
    #[error("unexpected null")]
    Null,

    /// The raw value's kind is incompatible with the destination type
    #[error("incompatible value of type {found}")]
    Mismatch { found: &'static str },

    /// A conversion capability refused the value
    #[error("{cause}")]
    Rejected { cause: BoxError },
}

impl ValueError {
    /// A kind-incompatibility error; `found` names the raw value's type.
    pub fn mismatch(found: &'static str) -> Self {
        ValueError::Mismatch { found }
    }

    /// A refusal with an underlying cause attached.
    pub fn rejected(cause: impl Into<BoxError>) -> Self {
        ValueError::Rejected {
            cause: cause.into(),
        }
    }
}

/// Converts raw column values into a destination scalar type.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be decoded from a result column",
    label = "this type does not implement FromValue",
    note = "implement FromValue for custom column types, then register them with aquifer::scalar_type!"
)]
pub trait FromValue: Sized + 'static {
    /// Convert from a 64-bit integer value.
    fn from_integer(_value: i64) -> Result<Self, ValueError> {
        Err(ValueError::mismatch("integer"))
    }

    /// Convert from a 64-bit float value.
    fn from_real(_value: f64) -> Result<Self, ValueError> {
        Err(ValueError::mismatch("real"))
    }

    /// Convert from a boolean value.
    fn from_bool(_value: bool) -> Result<Self, ValueError> {
        Err(ValueError::mismatch("bool"))
    }

    /// Convert from a text value.
    fn from_text(_value: &str) -> Result<Self, ValueError> {
        Err(ValueError::mismatch("text"))
    }

    /// Convert from binary data.
    fn from_blob(_value: &[u8]) -> Result<Self, ValueError> {
        Err(ValueError::mismatch("blob"))
    }

    /// Convert from a timestamp value.
    fn from_timestamp(_value: NaiveDateTime) -> Result<Self, ValueError> {
        Err(ValueError::mismatch("timestamp"))
    }

    /// Convert from NULL (default rejects).
    fn from_null() -> Result<Self, ValueError> {
        Err(ValueError::Null)
    }

    /// Dispatch on the raw value's kind.
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Integer(i) => Self::from_integer(*i),
            Value::Real(r) => Self::from_real(*r),
            Value::Bool(b) => Self::from_bool(*b),
            Value::Text(s) => Self::from_text(s),
            Value::Blob(b) => Self::from_blob(b),
            Value::Timestamp(t) => Self::from_timestamp(*t),
            Value::Null => Self::from_null(),
        }
    }
}

// =============================================================================
// Integer types — range-checked narrowing from i64
// =============================================================================

macro_rules! impl_from_value_int {
    (i64) => {
        impl FromValue for i64 {
            fn from_integer(value: i64) -> Result<Self, ValueError> {
                Ok(value)
            }
        }
    };
    ($($ty:ty),+ $(,)?) => { $(
        impl FromValue for $ty {
            fn from_integer(value: i64) -> Result<Self, ValueError> {
                value
                    .try_into()
                    .map_err(|_| ValueError::mismatch("integer"))
            }
        }
    )+ };
}

impl_from_value_int!(i64);
impl_from_value_int!(i8, i16, i32, isize, u8, u16, u32, u64, usize);

// =============================================================================
// Float types — exact representability, no silent precision loss
// =============================================================================

impl FromValue for f64 {
    fn from_integer(value: i64) -> Result<Self, ValueError> {
        // Integers above 2^53 are not exactly representable in an f64.
        let real = value as f64;
        if real as i64 == value {
            Ok(real)
        } else {
            Err(ValueError::mismatch("integer"))
        }
    }

    fn from_real(value: f64) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl FromValue for f32 {
    fn from_integer(value: i64) -> Result<Self, ValueError> {
        let real = value as f32;
        if real as i64 == value {
            Ok(real)
        } else {
            Err(ValueError::mismatch("integer"))
        }
    }

    fn from_real(value: f64) -> Result<Self, ValueError> {
        let narrowed = value as f32;
        if narrowed as f64 == value {
            Ok(narrowed)
        } else {
            Err(ValueError::mismatch("real"))
        }
    }
}

// =============================================================================
// bool, String, Vec<u8>
// =============================================================================

impl FromValue for bool {
    fn from_bool(value: bool) -> Result<Self, ValueError> {
        Ok(value)
    }

    // SQLite-style backends report booleans as 0/1 integers.
    fn from_integer(value: i64) -> Result<Self, ValueError> {
        match value {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(ValueError::mismatch("integer")),
        }
    }
}

impl FromValue for String {
    fn from_text(value: &str) -> Result<Self, ValueError> {
        Ok(value.to_string())
    }
}

impl FromValue for Vec<u8> {
    fn from_text(value: &str) -> Result<Self, ValueError> {
        Ok(value.as_bytes().to_vec())
    }

    fn from_blob(value: &[u8]) -> Result<Self, ValueError> {
        Ok(value.to_vec())
    }
}

// =============================================================================
// Temporal types
// =============================================================================

impl FromValue for NaiveDateTime {
    fn from_timestamp(value: NaiveDateTime) -> Result<Self, ValueError> {
        Ok(value)
    }

    fn from_text(value: &str) -> Result<Self, ValueError> {
        value.parse().map_err(ValueError::rejected)
    }
}

impl FromValue for DateTime<Utc> {
    // Backends that report timestamps without an offset are assumed UTC.
    fn from_timestamp(value: NaiveDateTime) -> Result<Self, ValueError> {
        Ok(value.and_utc())
    }

    fn from_text(value: &str) -> Result<Self, ValueError> {
        let naive: NaiveDateTime = value.parse().map_err(ValueError::rejected)?;
        Ok(naive.and_utc())
    }
}

impl FromValue for NaiveDate {
    fn from_timestamp(value: NaiveDateTime) -> Result<Self, ValueError> {
        Ok(value.date())
    }

    fn from_text(value: &str) -> Result<Self, ValueError> {
        value.parse().map_err(ValueError::rejected)
    }
}

impl FromValue for NaiveTime {
    fn from_timestamp(value: NaiveDateTime) -> Result<Self, ValueError> {
        Ok(value.time())
    }

    fn from_text(value: &str) -> Result<Self, ValueError> {
        value.parse().map_err(ValueError::rejected)
    }
}

// =============================================================================
// Option<T> — NULL-aware wrapper
// =============================================================================

impl<T: FromValue> FromValue for Option<T> {
    fn from_integer(value: i64) -> Result<Self, ValueError> {
        T::from_integer(value).map(Some)
    }

    fn from_real(value: f64) -> Result<Self, ValueError> {
        T::from_real(value).map(Some)
    }

    fn from_bool(value: bool) -> Result<Self, ValueError> {
        T::from_bool(value).map(Some)
    }

    fn from_text(value: &str) -> Result<Self, ValueError> {
        T::from_text(value).map(Some)
    }

    fn from_blob(value: &[u8]) -> Result<Self, ValueError> {
        T::from_blob(value).map(Some)
    }

    fn from_timestamp(value: NaiveDateTime) -> Result<Self, ValueError> {
        T::from_timestamp(value).map(Some)
    }

    fn from_null() -> Result<Self, ValueError> {
        Ok(None)
    }
}

// =============================================================================
// Feature-gated types
// =============================================================================

#[cfg(feature = "uuid")]
impl FromValue for uuid::Uuid {
    fn from_text(value: &str) -> Result<Self, ValueError> {
        uuid::Uuid::parse_str(value).map_err(ValueError::rejected)
    }

    fn from_blob(value: &[u8]) -> Result<Self, ValueError> {
        uuid::Uuid::from_slice(value).map_err(ValueError::rejected)
    }
}

#[cfg(feature = "serde")]
impl FromValue for serde_json::Value {
    fn from_text(value: &str) -> Result<Self, ValueError> {
        serde_json::from_str(value).map_err(ValueError::rejected)
    }
}
