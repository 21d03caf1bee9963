//! Dispatch entry points
//!
//! Callers at the host boundary go through these functions rather than the
//! lookup tables. Both "no converter registered" and "converter declined this
//! value" surface as the same error per direction, naming the binding and the
//! wire field (inbound) or native type (outbound).

use crate::binding::BindingKind;
use crate::native::{NativeType, NativeValue};
use crate::registry::{global_registry, ConverterRegistry};
use crate::typed_data::{TriggerMetadata, TypedData};
use crate::{Error, Result};

impl ConverterRegistry {
    /// Whether `native_type` is acceptable for `binding`
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownBinding` if no converter is registered for
    /// `binding`.
    pub fn check_bind_type_matches(
        &self,
        binding: BindingKind,
        native_type: &NativeType,
    ) -> Result<bool> {
        let check = self
            .check_type_fn(binding)
            .ok_or(Error::UnknownBinding { binding })?;
        Ok(check(native_type))
    }

    /// Convert an incoming wire value for `binding` into a native value
    ///
    /// # Errors
    ///
    /// - `Error::UnsupportedIncoming` if `binding` has no decoder or its
    ///   decoder declined `data`
    /// - any other error the decoder returns, unchanged
    pub fn decode_incoming(
        &self,
        binding: BindingKind,
        data: &TypedData,
        trigger_metadata: Option<&TriggerMetadata>,
    ) -> Result<NativeValue> {
        let outcome = match self.decoder(binding) {
            Some(decode) => decode(data, trigger_metadata),
            None => Err(Error::NotImplemented),
        };

        match outcome {
            Err(Error::NotImplemented) => {
                let data_type = data.kind();
                tracing::warn!(
                    binding = %binding,
                    data_type = %data_type,
                    "No decoder accepted incoming value"
                );
                Err(Error::UnsupportedIncoming { data_type, binding })
            }
            other => other,
        }
    }

    /// Convert an outgoing native value for `binding` into a wire value
    ///
    /// # Errors
    ///
    /// - `Error::UnsupportedOutgoing` if `binding` has no encoder or its
    ///   encoder declined `value`
    /// - any other error the encoder returns, unchanged
    pub fn encode_outgoing(&self, binding: BindingKind, value: &NativeValue) -> Result<TypedData> {
        let outcome = match self.encoder(binding) {
            Some(encode) => encode(value),
            None => Err(Error::NotImplemented),
        };

        match outcome {
            Err(Error::NotImplemented) => {
                let native_type = value.type_name();
                tracing::warn!(
                    binding = %binding,
                    native_type,
                    "No encoder accepted outgoing value"
                );
                Err(Error::UnsupportedOutgoing {
                    binding,
                    native_type: native_type.to_string(),
                })
            }
            other => other,
        }
    }
}

/// [`ConverterRegistry::check_bind_type_matches`] on the global registry
pub fn check_bind_type_matches(binding: BindingKind, native_type: &NativeType) -> Result<bool> {
    global_registry()?.check_bind_type_matches(binding, native_type)
}

/// [`ConverterRegistry::decode_incoming`] on the global registry
pub fn decode_incoming(
    binding: BindingKind,
    data: &TypedData,
    trigger_metadata: Option<&TriggerMetadata>,
) -> Result<NativeValue> {
    global_registry()?.decode_incoming(binding, data, trigger_metadata)
}

/// [`ConverterRegistry::encode_outgoing`] on the global registry
pub fn encode_outgoing(binding: BindingKind, value: &NativeValue) -> Result<TypedData> {
    global_registry()?.encode_outgoing(binding, value)
}
