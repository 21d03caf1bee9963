//! Error types for the binding conversion registry

use thiserror::Error;

use crate::binding::BindingKind;
use crate::typed_data::TypedDataKind;

/// Result type alias for binding conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for binding conversion
#[derive(Debug, Error)]
pub enum Error {
    /// Registry configuration error (duplicate converter registration)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No converter with a type check is registered for the binding
    #[error("bind type {binding} does not have a corresponding native type")]
    UnknownBinding {
        /// Binding that was looked up
        binding: BindingKind,
    },

    /// A binding token did not name any known binding kind
    #[error("unknown binding type '{0}'")]
    UnknownBindingToken(String),

    /// A JSON payload decoded to a list or object where a scalar was required
    #[error("unexpected data structure in expected scalar {context}")]
    UnexpectedStructure {
        /// Human-readable location of the value
        context: String,
    },

    /// The populated wire field cannot be decoded as a scalar
    #[error("unsupported type of {context}: {data_type}")]
    UnsupportedDataType {
        /// Human-readable location of the value
        context: String,
        /// Populated wire field
        data_type: TypedDataKind,
    },

    /// The decoded value is not one of the accepted types
    #[error("unexpected value type in {context}: {actual}, expected one of: {}", expected.join(", "))]
    TypeMismatch {
        /// Human-readable location of the value
        context: String,
        /// Type of the decoded value
        actual: String,
        /// Accepted type names
        expected: Vec<String>,
    },

    /// Coercion into the single requested type failed
    #[error("cannot convert value of {context} into {target}: {cause}")]
    Coercion {
        /// Human-readable location of the value
        context: String,
        /// Requested type name
        target: String,
        /// Underlying failure
        cause: String,
    },

    /// The `json` wire field did not hold valid JSON
    #[error("invalid JSON in {context}: {source}")]
    InvalidJson {
        /// Human-readable location of the value
        context: String,
        /// Parser error
        source: serde_json::Error,
    },

    /// No decoder handles this wire field for the binding
    #[error(
        "unable to decode incoming TypedData: unsupported combination of TypedData field '{data_type}' and expected binding type {binding}"
    )]
    UnsupportedIncoming {
        /// Populated wire field of the incoming value
        data_type: TypedDataKind,
        /// Binding the value was bound to
        binding: BindingKind,
    },

    /// No encoder handles this native value for the binding
    #[error("unable to encode outgoing TypedData: unsupported type \"{binding}\" for native type \"{native_type}\"")]
    UnsupportedOutgoing {
        /// Binding the value was bound to
        binding: BindingKind,
        /// Runtime type name of the native value
        native_type: String,
    },

    /// Returned by a converter to decline a specific input
    #[error("conversion not implemented for this value")]
    NotImplemented,

    /// Function binding manifest parsing or validation error
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this is one of the scalar decoding failures
    pub fn is_decoding_error(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedStructure { .. }
                | Error::UnsupportedDataType { .. }
                | Error::TypeMismatch { .. }
                | Error::Coercion { .. }
                | Error::InvalidJson { .. }
        )
    }
}
