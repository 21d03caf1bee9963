//! Converter registry
//!
//! Each binding kind gets at most one converter: a type check plus optional
//! decode and encode functions. Registrations are plain function-pointer
//! records, so binding implementations can live in separate modules or crates
//! and submit themselves with [`register_converter!`](crate::register_converter)
//! without knowing about each other. The dispatch functions in
//! [`crate::dispatch`] only ever consult the three lookup tables kept here.
//!
//! # Example
//!
//! ```
//! use worker_bindings::registry::{ConverterRegistration, ConverterRegistry};
//! use worker_bindings::{BindingKind, NativeType, NativeValue, TypedData};
//!
//! fn is_str(ty: &NativeType) -> bool {
//!     *ty == NativeType::Str
//! }
//!
//! fn encode_str(value: &NativeValue) -> worker_bindings::Result<TypedData> {
//!     match value {
//!         NativeValue::Str(s) => Ok(TypedData::String(s.clone())),
//!         _ => Err(worker_bindings::Error::NotImplemented),
//!     }
//! }
//!
//! let registry = ConverterRegistry::new();
//! registry
//!     .register(ConverterRegistration::new(BindingKind::Queue, is_str).with_encode(encode_str))
//!     .unwrap();
//!
//! assert!(registry.has_encoder(BindingKind::Queue));
//! assert!(!registry.has_decoder(BindingKind::Queue));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::binding::BindingKind;
use crate::native::{NativeType, NativeValue};
use crate::typed_data::{TriggerMetadata, TypedData};
use crate::{Error, Result};

/// Answers whether a declared native type suits the binding
pub type CheckTypeFn = fn(&NativeType) -> bool;

/// Converts an incoming wire value into a native value.
///
/// Return [`Error::NotImplemented`] to decline a value the converter does
/// not handle.
pub type DecodeFn = fn(&TypedData, Option<&TriggerMetadata>) -> Result<NativeValue>;

/// Converts an outgoing native value into a wire value.
///
/// Return [`Error::NotImplemented`] to decline a value the converter does
/// not handle.
pub type EncodeFn = fn(&NativeValue) -> Result<TypedData>;

/// Capability set registered for one binding kind
#[derive(Clone, Copy)]
pub struct ConverterRegistration {
    /// Binding kind this converter serves
    pub binding: BindingKind,
    /// Native type check
    pub check_type: CheckTypeFn,
    /// Inbound conversion, if supported
    pub decode: Option<DecodeFn>,
    /// Outbound conversion, if supported
    pub encode: Option<EncodeFn>,
}

impl ConverterRegistration {
    /// Registration with only a type check
    pub const fn new(binding: BindingKind, check_type: CheckTypeFn) -> Self {
        Self {
            binding,
            check_type,
            decode: None,
            encode: None,
        }
    }

    /// Add inbound conversion
    pub const fn with_decode(self, decode: DecodeFn) -> Self {
        Self {
            decode: Some(decode),
            ..self
        }
    }

    /// Add outbound conversion
    pub const fn with_encode(self, encode: EncodeFn) -> Self {
        Self {
            encode: Some(encode),
            ..self
        }
    }
}

impl fmt::Debug for ConverterRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistration")
            .field("binding", &self.binding)
            .field("decode", &self.decode.is_some())
            .field("encode", &self.encode.is_some())
            .finish()
    }
}

inventory::collect!(ConverterRegistration);

#[derive(Default)]
struct ConverterTables {
    check_type: HashMap<BindingKind, CheckTypeFn>,
    decoders: HashMap<BindingKind, DecodeFn>,
    encoders: HashMap<BindingKind, EncodeFn>,
}

/// Lookup tables from binding kind to converter functions
///
/// Registration takes the write lock; lookups copy the function pointer out
/// under the read lock, so converters never run while the lock is held.
#[derive(Default)]
pub struct ConverterRegistry {
    tables: RwLock<ConverterTables>,
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables.read();
        let mut bindings: Vec<_> = tables.check_type.keys().collect();
        let mut decoders: Vec<_> = tables.decoders.keys().collect();
        let mut encoders: Vec<_> = tables.encoders.keys().collect();
        bindings.sort();
        decoders.sort();
        encoders.sort();
        f.debug_struct("ConverterRegistry")
            .field("bindings", &bindings)
            .field("decoders", &decoders)
            .field("encoders", &encoders)
            .finish()
    }
}

impl ConverterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a sequence of registrations
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` on the first binding kind registered twice.
    pub fn from_registrations<I>(registrations: I) -> Result<Self>
    where
        I: IntoIterator<Item = ConverterRegistration>,
    {
        let registry = Self::new();
        for registration in registrations {
            registry.register(registration)?;
        }
        Ok(registry)
    }

    /// Build a registry from every [`register_converter!`](crate::register_converter)
    /// submission linked into the process
    pub fn from_inventory() -> Result<Self> {
        Self::from_registrations(inventory::iter::<ConverterRegistration>.into_iter().copied())
    }

    /// Register a converter
    ///
    /// The type check is always installed. The decode and encode functions
    /// are installed only when present.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the binding kind already has a
    /// converter. The existing registration is left untouched.
    pub fn register(&self, registration: ConverterRegistration) -> Result<()> {
        let binding = registration.binding;
        let mut tables = self.tables.write();

        if tables.check_type.contains_key(&binding) {
            tracing::warn!(binding = %binding, "Rejected duplicate converter registration");
            return Err(Error::ConfigError(format!(
                "cannot register a converter for {} binding: another converter has already been registered",
                binding
            )));
        }

        tables.check_type.insert(binding, registration.check_type);
        if let Some(decode) = registration.decode {
            tables.decoders.insert(binding, decode);
        }
        if let Some(encode) = registration.encode {
            tables.encoders.insert(binding, encode);
        }

        tracing::debug!(
            binding = %binding,
            decode = registration.decode.is_some(),
            encode = registration.encode.is_some(),
            "Registered converter"
        );

        Ok(())
    }

    /// Type check registered for `binding`
    pub fn check_type_fn(&self, binding: BindingKind) -> Option<CheckTypeFn> {
        self.tables.read().check_type.get(&binding).copied()
    }

    /// Decoder registered for `binding`
    pub fn decoder(&self, binding: BindingKind) -> Option<DecodeFn> {
        self.tables.read().decoders.get(&binding).copied()
    }

    /// Encoder registered for `binding`
    pub fn encoder(&self, binding: BindingKind) -> Option<EncodeFn> {
        self.tables.read().encoders.get(&binding).copied()
    }

    /// Whether `binding` has a converter at all
    pub fn contains(&self, binding: BindingKind) -> bool {
        self.tables.read().check_type.contains_key(&binding)
    }

    /// Whether `binding` supports inbound conversion
    pub fn has_decoder(&self, binding: BindingKind) -> bool {
        self.tables.read().decoders.contains_key(&binding)
    }

    /// Whether `binding` supports outbound conversion
    pub fn has_encoder(&self, binding: BindingKind) -> bool {
        self.tables.read().encoders.contains_key(&binding)
    }

    /// Binding kinds with a converter, in declaration order
    pub fn registered_bindings(&self) -> Vec<BindingKind> {
        let mut bindings: Vec<_> = self.tables.read().check_type.keys().copied().collect();
        bindings.sort();
        bindings
    }

    /// Number of registered converters
    pub fn len(&self) -> usize {
        self.tables.read().check_type.len()
    }

    /// Whether no converter is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Global registry singleton; a failed build is kept so every caller sees it
static GLOBAL_REGISTRY: OnceLock<std::result::Result<ConverterRegistry, String>> = OnceLock::new();

/// Get the process-wide converter registry
///
/// Built on first access from every `register_converter!` submission. The
/// build result is cached: if two submissions claim the same binding kind,
/// this returns the same configuration error on every call.
///
/// # Example
///
/// ```
/// use worker_bindings::registry::global_registry;
///
/// let registry = global_registry().unwrap();
/// println!("Registered bindings: {:?}", registry.registered_bindings());
/// ```
pub fn global_registry() -> Result<&'static ConverterRegistry> {
    GLOBAL_REGISTRY
        .get_or_init(|| {
            let built = ConverterRegistry::from_inventory();
            match &built {
                Ok(registry) => tracing::debug!(
                    bindings = ?registry.registered_bindings(),
                    "Built global converter registry"
                ),
                Err(e) => tracing::error!("Failed to build global converter registry: {}", e),
            }
            built.map_err(|e| match e {
                Error::ConfigError(msg) => msg,
                other => other.to_string(),
            })
        })
        .as_ref()
        .map_err(|msg| Error::ConfigError(msg.clone()))
}

/// Submit a converter to the process-wide registry at link time
///
/// Accepts either a [`ConverterRegistration`] expression or the binding kind
/// followed by named capabilities.
///
/// ```ignore
/// use worker_bindings::{register_converter, BindingKind};
///
/// register_converter!(
///     BindingKind::QueueTrigger,
///     check_type: queue::check_type,
///     decode: queue::decode,
/// );
/// ```
#[macro_export]
macro_rules! register_converter {
    (
        $binding:expr,
        check_type: $check:expr
        $(, decode: $decode:expr)?
        $(, encode: $encode:expr)?
        $(,)?
    ) => {
        $crate::inventory::submit! {
            $crate::registry::ConverterRegistration::new($binding, $check)
                $(.with_decode($decode))?
                $(.with_encode($encode))?
        }
    };
    ($registration:expr $(,)?) => {
        $crate::inventory::submit! { $registration }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepts_str(ty: &NativeType) -> bool {
        *ty == NativeType::Str
    }

    fn accepts_anything(_ty: &NativeType) -> bool {
        true
    }

    fn decode_string(data: &TypedData, _meta: Option<&TriggerMetadata>) -> Result<NativeValue> {
        match data {
            TypedData::String(s) => Ok(NativeValue::Str(s.clone())),
            _ => Err(Error::NotImplemented),
        }
    }

    fn encode_string(value: &NativeValue) -> Result<TypedData> {
        match value {
            NativeValue::Str(s) => Ok(TypedData::String(s.clone())),
            _ => Err(Error::NotImplemented),
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = ConverterRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.registered_bindings().is_empty());
    }

    #[test]
    fn test_register_installs_capabilities() {
        let registry = ConverterRegistry::new();
        registry
            .register(
                ConverterRegistration::new(BindingKind::Queue, accepts_str)
                    .with_decode(decode_string)
                    .with_encode(encode_string),
            )
            .unwrap();

        assert!(registry.contains(BindingKind::Queue));
        assert!(registry.has_decoder(BindingKind::Queue));
        assert!(registry.has_encoder(BindingKind::Queue));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_capability_tables_are_independent() {
        let registry = ConverterRegistry::new();
        registry
            .register(ConverterRegistration::new(BindingKind::QueueTrigger, accepts_str).with_decode(decode_string))
            .unwrap();
        registry
            .register(ConverterRegistration::new(BindingKind::Http, accepts_anything).with_encode(encode_string))
            .unwrap();
        registry
            .register(ConverterRegistration::new(BindingKind::TimerTrigger, accepts_anything))
            .unwrap();

        assert!(registry.has_decoder(BindingKind::QueueTrigger));
        assert!(!registry.has_encoder(BindingKind::QueueTrigger));
        assert!(!registry.has_decoder(BindingKind::Http));
        assert!(registry.has_encoder(BindingKind::Http));
        assert!(registry.contains(BindingKind::TimerTrigger));
        assert!(!registry.has_decoder(BindingKind::TimerTrigger));
        assert!(!registry.has_encoder(BindingKind::TimerTrigger));

        assert_eq!(
            registry.registered_bindings(),
            vec![BindingKind::Http, BindingKind::TimerTrigger, BindingKind::QueueTrigger]
        );
    }

    #[test]
    fn test_register_duplicate_fails() {
        let registry = ConverterRegistry::new();
        registry
            .register(ConverterRegistration::new(BindingKind::Blob, accepts_str))
            .unwrap();

        let result = registry.register(
            ConverterRegistration::new(BindingKind::Blob, accepts_anything).with_decode(decode_string),
        );

        match result {
            Err(Error::ConfigError(msg)) => {
                assert_eq!(
                    msg,
                    "cannot register a converter for blob binding: another converter has already been registered"
                );
            }
            other => panic!("Expected ConfigError, got {:?}", other),
        }

        // The first registration survives untouched
        assert!(!registry.has_decoder(BindingKind::Blob));
        let check = registry.check_type_fn(BindingKind::Blob).unwrap();
        assert!(!check(&NativeType::Int));
    }

    #[test]
    fn test_register_duplicate_fails_regardless_of_capabilities() {
        let full = ConverterRegistration::new(BindingKind::Queue, accepts_str)
            .with_decode(decode_string)
            .with_encode(encode_string);
        let bare = ConverterRegistration::new(BindingKind::Queue, accepts_anything);

        assert!(ConverterRegistry::from_registrations([full, bare]).is_err());
        assert!(ConverterRegistry::from_registrations([bare, full]).is_err());
    }

    #[test]
    fn test_from_registrations_success() {
        let registry = ConverterRegistry::from_registrations([
            ConverterRegistration::new(BindingKind::Blob, accepts_str),
            ConverterRegistration::new(BindingKind::BlobTrigger, accepts_str).with_decode(decode_string),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_lookup_missing_binding() {
        let registry = ConverterRegistry::new();
        assert!(registry.check_type_fn(BindingKind::Http).is_none());
        assert!(registry.decoder(BindingKind::Http).is_none());
        assert!(registry.encoder(BindingKind::Http).is_none());
    }

    #[test]
    fn test_registration_debug_hides_pointers() {
        let registration = ConverterRegistration::new(BindingKind::Queue, accepts_str).with_encode(encode_string);
        let debug = format!("{:?}", registration);
        assert!(debug.contains("Queue"));
        assert!(debug.contains("encode: true"));
        assert!(debug.contains("decode: false"));
    }
}
