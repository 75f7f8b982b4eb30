use thiserror::Error;

/// Boxed error type used for row-source failures and custom-conversion causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum AquiferError {
    /// The destination handed to a scan is not a shape the engine recognizes
    #[error("unsupported destination type: {type_name}")]
    UnsupportedDestination { type_name: String },

    /// A destination struct field has a type the engine cannot classify
    /// as scalar, nested object, or nested collection
    #[error("unsupported destination field `{field}` of type {type_name}")]
    UnsupportedField { field: String, type_name: String },

    /// A column value cannot be exactly converted into the bound field's type
    #[error("cannot convert {found} into field `{field}` of type {expected}")]
    TypeMismatch {
        found: &'static str,
        field: String,
        expected: &'static str,
    },

    /// NULL encountered for a field that cannot represent absence
    #[error("null value for field `{field}` of type {expected}")]
    UnexpectedNull {
        field: String,
        expected: &'static str,
    },

    /// A custom scalar conversion refused the raw value
    #[error("value rejected while scanning field `{field}`: {cause}")]
    Rejected { field: String, cause: BoxError },

    /// A converted scalar does not fit the element type of a slice destination
    #[error("cannot append {found} to {expected}")]
    SliceMismatch {
        found: &'static str,
        expected: &'static str,
    },

    /// The row source failed; its error is passed through unchanged
    #[error("{0}")]
    RowSource(BoxError),
}

/// Result type for scan operations
pub type Result<T> = std::result::Result<T, AquiferError>;
