//! Worker Bindings - typed-data conversion registry
//!
//! Every bound value crossing the boundary between the host process and
//! application code passes through this crate. The host sends values as
//! [`TypedData`], a tagged union with exactly one populated field; functions
//! work with [`NativeValue`]s. Which conversion applies is decided by the
//! [`BindingKind`] the value is bound to.
//!
//! # Architecture
//!
//! - [`registry`]: converters register a type check and optional decode and
//!   encode functions per binding kind, at most once each
//! - [`dispatch`]: `decode_incoming`, `encode_outgoing` and
//!   `check_bind_type_matches` look the converter up and normalize failures
//! - [`scalar`]: the shared scalar decoding and coercion rules converters use
//! - [`manifest`]: validates a function's declared bindings against the
//!   registry before dispatch
//!
//! Concrete converters for blob, HTTP, queue or timer payloads live with the
//! host integration layer and submit themselves with [`register_converter!`].
//!
//! # Example
//!
//! ```
//! use worker_bindings::{register_converter, BindingKind, NativeType, NativeValue, TypedData};
//!
//! fn check_type(ty: &NativeType) -> bool {
//!     *ty == NativeType::Str
//! }
//!
//! fn decode(data: &TypedData, _meta: Option<&worker_bindings::TriggerMetadata>)
//!     -> worker_bindings::Result<NativeValue>
//! {
//!     worker_bindings::scalar::decode_scalar(Some(data), worker_bindings::ScalarType::Str, "queue message")
//! }
//!
//! register_converter!(BindingKind::QueueTrigger, check_type: check_type, decode: decode);
//!
//! fn main() -> worker_bindings::Result<()> {
//!     worker_bindings::init()?;
//!     let value = worker_bindings::decode_incoming(
//!         BindingKind::QueueTrigger,
//!         &TypedData::from("hello"),
//!         None,
//!     )?;
//!     assert_eq!(value.as_str(), Some("hello"));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binding;
pub mod dispatch;
pub mod manifest;
pub mod native;
pub mod registry;
pub mod scalar;
pub mod typed_data;

// Error types
mod error;
pub use error::{Error, Result};

pub use binding::{BindingDirection, BindingKind};
pub use dispatch::{check_bind_type_matches, decode_incoming, encode_outgoing};
pub use manifest::{BindingDeclaration, FunctionManifest};
pub use native::{ExpectedType, NativeType, NativeValue, OpaqueValue, ScalarType};
pub use registry::{global_registry, ConverterRegistration, ConverterRegistry};
pub use typed_data::{RpcHttp, TriggerMetadata, TypedData, TypedDataKind};

#[doc(hidden)]
pub use inventory;

/// Initialize logging and the global converter registry
///
/// Call once at startup, after every converter crate is linked. Logging is
/// installed only if no global subscriber exists yet.
///
/// # Errors
///
/// Returns `Error::ConfigError` if two converters claim the same binding kind.
pub fn init() -> Result<&'static ConverterRegistry> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let registry = global_registry()?;
    tracing::info!(
        converters = registry.len(),
        "Worker bindings initialized"
    );
    Ok(registry)
}
