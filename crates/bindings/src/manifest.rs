//! Function binding manifest
//!
//! A function declares its bindings in a `function.json`-style document:
//!
//! ```json
//! {
//!   "bindings": [
//!     { "name": "msg", "type": "queueTrigger", "direction": "in", "queueName": "orders" },
//!     { "name": "$return", "type": "blob", "direction": "out" }
//!   ]
//! }
//! ```
//!
//! Fields other than `name`, `type` and `direction` belong to the host and
//! are ignored here. Validation checks the declarations against a
//! [`ConverterRegistry`] before any invocation is dispatched.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::binding::{BindingDirection, BindingKind};
use crate::native::NativeType;
use crate::registry::ConverterRegistry;
use crate::{Error, Result};

/// One declared binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDeclaration {
    /// Parameter name (`$return` for the return value)
    pub name: String,

    /// Binding kind token
    #[serde(rename = "type")]
    pub binding: BindingKind,

    /// Direction relative to the function
    pub direction: BindingDirection,
}

/// Parsed function binding manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionManifest {
    /// Declared bindings, in document order
    #[serde(default)]
    pub bindings: Vec<BindingDeclaration>,
}

impl FunctionManifest {
    /// Parse manifest from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidManifest(format!("Parse error: {}", e)))
    }

    /// The trigger binding, if one is declared
    pub fn trigger(&self) -> Option<&BindingDeclaration> {
        self.bindings.iter().find(|b| b.binding.is_trigger())
    }

    /// Look up a binding by name
    pub fn binding(&self, name: &str) -> Option<&BindingDeclaration> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// Validate the declarations against `registry`
    ///
    /// `params` maps binding names to the native type the function declares
    /// for them. Bindings without an entry skip the type check.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidManifest` for duplicate names, more than one trigger,
    ///   a direction the converter cannot serve, or a rejected parameter type
    /// - `Error::UnknownBinding` for a binding kind with no converter
    pub fn validate(
        &self,
        registry: &ConverterRegistry,
        params: &HashMap<String, NativeType>,
    ) -> Result<()> {
        let mut seen = HashSet::new();
        for decl in &self.bindings {
            if !seen.insert(decl.name.as_str()) {
                return Err(Error::InvalidManifest(format!(
                    "duplicate binding name '{}'",
                    decl.name
                )));
            }
        }

        let triggers: Vec<_> = self
            .bindings
            .iter()
            .filter(|b| b.binding.is_trigger())
            .map(|b| b.name.as_str())
            .collect();
        if triggers.len() > 1 {
            return Err(Error::InvalidManifest(format!(
                "more than one trigger binding declared: {}",
                triggers.join(", ")
            )));
        }

        for decl in &self.bindings {
            validate_declaration(decl, registry, params.get(&decl.name))?;
        }

        tracing::debug!(
            bindings = self.bindings.len(),
            trigger = ?self.trigger().map(|b| b.binding),
            "Validated function manifest"
        );

        Ok(())
    }
}

fn validate_declaration(
    decl: &BindingDeclaration,
    registry: &ConverterRegistry,
    param_type: Option<&NativeType>,
) -> Result<()> {
    if !registry.contains(decl.binding) {
        return Err(Error::UnknownBinding {
            binding: decl.binding,
        });
    }

    if decl.direction.is_inbound() && !registry.has_decoder(decl.binding) {
        return Err(Error::InvalidManifest(format!(
            "binding '{}' of type {} cannot be an input: no decoder registered",
            decl.name, decl.binding
        )));
    }

    if decl.direction.is_outbound() && !registry.has_encoder(decl.binding) {
        return Err(Error::InvalidManifest(format!(
            "binding '{}' of type {} cannot be an output: no encoder registered",
            decl.name, decl.binding
        )));
    }

    if let Some(ty) = param_type {
        if !registry.check_bind_type_matches(decl.binding, ty)? {
            return Err(Error::InvalidManifest(format!(
                "binding '{}' of type {} does not accept parameter type {}",
                decl.name, decl.binding, ty
            )));
        }
    }

    Ok(())
}
