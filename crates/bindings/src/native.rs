//! Native values on the application side of the boundary
//!
//! [`NativeValue`] is what decoders produce and encoders consume. Each value
//! knows its own [`NativeType`], which is also what converters receive when
//! asked whether a declared parameter type suits their binding.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::typed_data::RpcHttp;

/// Runtime type of a native value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    /// Absent value
    None,
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// UTF-8 string
    Str,
    /// Byte buffer
    Bytes,
    /// Structured JSON document
    Json,
    /// HTTP request or response
    Http,
    /// Converter-specific type, identified by name
    Opaque(&'static str),
}

impl NativeType {
    /// Name used in error messages
    pub const fn name(&self) -> &'static str {
        match self {
            NativeType::None => "none",
            NativeType::Bool => "bool",
            NativeType::Int => "int",
            NativeType::Float => "float",
            NativeType::Str => "str",
            NativeType::Bytes => "bytes",
            NativeType::Json => "json",
            NativeType::Http => "http",
            NativeType::Opaque(name) => *name,
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type-erased native value owned by a specific converter
#[derive(Clone)]
pub struct OpaqueValue {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl OpaqueValue {
    /// Wrap `value`, recording its Rust type name
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::named(std::any::type_name::<T>(), value)
    }

    /// Wrap `value` under an explicit type name
    pub fn named<T: Any + Send + Sync>(type_name: &'static str, value: T) -> Self {
        Self {
            type_name,
            value: Arc::new(value),
        }
    }

    /// Type name this value reports
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the inner value if it is a `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl PartialEq for OpaqueValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

/// Value on the application side of a binding
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NativeValue {
    /// No value
    #[default]
    None,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    Str(String),
    /// Bytes
    Bytes(Vec<u8>),
    /// Structured JSON document
    Json(serde_json::Value),
    /// HTTP request or response
    Http(RpcHttp),
    /// Converter-specific value
    Opaque(OpaqueValue),
}

impl NativeValue {
    /// Runtime type of this value
    pub fn native_type(&self) -> NativeType {
        match self {
            NativeValue::None => NativeType::None,
            NativeValue::Bool(_) => NativeType::Bool,
            NativeValue::Int(_) => NativeType::Int,
            NativeValue::Float(_) => NativeType::Float,
            NativeValue::Str(_) => NativeType::Str,
            NativeValue::Bytes(_) => NativeType::Bytes,
            NativeValue::Json(_) => NativeType::Json,
            NativeValue::Http(_) => NativeType::Http,
            NativeValue::Opaque(v) => NativeType::Opaque(v.type_name()),
        }
    }

    /// Runtime type name, as shown in error messages
    pub fn type_name(&self) -> &'static str {
        self.native_type().name()
    }

    /// Whether this is [`NativeValue::None`]
    pub fn is_none(&self) -> bool {
        matches!(self, NativeValue::None)
    }

    /// Integer payload, if this is an `Int`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NativeValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Float payload, if this is a `Float`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NativeValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// String payload, if this is a `Str`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NativeValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean payload, if this is a `Bool`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            NativeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for NativeValue {
    fn from(b: bool) -> Self {
        NativeValue::Bool(b)
    }
}

impl From<i64> for NativeValue {
    fn from(n: i64) -> Self {
        NativeValue::Int(n)
    }
}

impl From<f64> for NativeValue {
    fn from(n: f64) -> Self {
        NativeValue::Float(n)
    }
}

impl From<String> for NativeValue {
    fn from(s: String) -> Self {
        NativeValue::Str(s)
    }
}

impl From<&str> for NativeValue {
    fn from(s: &str) -> Self {
        NativeValue::Str(s.to_string())
    }
}

impl From<Vec<u8>> for NativeValue {
    fn from(bytes: Vec<u8>) -> Self {
        NativeValue::Bytes(bytes)
    }
}

impl From<serde_json::Value> for NativeValue {
    fn from(value: serde_json::Value) -> Self {
        NativeValue::Json(value)
    }
}

/// Scalar types the scalar decoder can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// Boolean
    Bool,
    /// Integer
    Int,
    /// Float
    Float,
    /// String
    Str,
}

impl ScalarType {
    /// Corresponding native type
    pub const fn native_type(&self) -> NativeType {
        match self {
            ScalarType::Bool => NativeType::Bool,
            ScalarType::Int => NativeType::Int,
            ScalarType::Float => NativeType::Float,
            ScalarType::Str => NativeType::Str,
        }
    }

    /// Name used in error messages
    pub const fn name(&self) -> &'static str {
        self.native_type().name()
    }

    /// Whether `value` already has this type
    pub fn matches(&self, value: &NativeValue) -> bool {
        value.native_type() == self.native_type()
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type(s) a scalar decode is allowed to produce
///
/// A single type permits coercion into it. A fixed set never coerces:
/// the decoded value must already be one of its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedType {
    /// Exactly this type, coercing when needed
    One(ScalarType),
    /// Any member of this set, without coercion
    AnyOf(Vec<ScalarType>),
}

impl ExpectedType {
    /// Fixed set of acceptable types
    pub fn any_of(types: impl IntoIterator<Item = ScalarType>) -> Self {
        ExpectedType::AnyOf(types.into_iter().collect())
    }
}

impl From<ScalarType> for ExpectedType {
    fn from(ty: ScalarType) -> Self {
        ExpectedType::One(ty)
    }
}

impl<const N: usize> From<[ScalarType; N]> for ExpectedType {
    fn from(types: [ScalarType; N]) -> Self {
        ExpectedType::AnyOf(types.to_vec())
    }
}
