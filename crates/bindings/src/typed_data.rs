//! Wire-level typed data envelope
//!
//! [`TypedData`] is the tagged union the host sends for every bound value.
//! Exactly one field is populated; the enum representation makes that hold
//! by construction. Serialized form follows the JSON mapping of a protobuf
//! `oneof`: a single-key object named after the populated field.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Trigger metadata accompanying a trigger invocation, keyed by field name
pub type TriggerMetadata = HashMap<String, TypedData>;

/// Typed data envelope exchanged with the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypedData {
    /// JSON document carried as text
    Json(String),
    /// Plain string
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Double(f64),
    /// HTTP request or response
    Http(RpcHttp),
    /// Stream contents
    Stream(Vec<u8>),
}

impl TypedData {
    /// Which field of the union is populated
    pub fn kind(&self) -> TypedDataKind {
        match self {
            TypedData::Json(_) => TypedDataKind::Json,
            TypedData::String(_) => TypedDataKind::String,
            TypedData::Bytes(_) => TypedDataKind::Bytes,
            TypedData::Int(_) => TypedDataKind::Int,
            TypedData::Double(_) => TypedDataKind::Double,
            TypedData::Http(_) => TypedDataKind::Http,
            TypedData::Stream(_) => TypedDataKind::Stream,
        }
    }

    /// Build a `json` value by serializing `value`
    pub fn json(value: &serde_json::Value) -> Self {
        TypedData::Json(value.to_string())
    }
}

impl From<&str> for TypedData {
    fn from(s: &str) -> Self {
        TypedData::String(s.to_string())
    }
}

impl From<String> for TypedData {
    fn from(s: String) -> Self {
        TypedData::String(s)
    }
}

impl From<i64> for TypedData {
    fn from(n: i64) -> Self {
        TypedData::Int(n)
    }
}

impl From<f64> for TypedData {
    fn from(n: f64) -> Self {
        TypedData::Double(n)
    }
}

impl From<Vec<u8>> for TypedData {
    fn from(bytes: Vec<u8>) -> Self {
        TypedData::Bytes(bytes)
    }
}

/// Discriminant of [`TypedData`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedDataKind {
    /// `json` field
    Json,
    /// `string` field
    String,
    /// `bytes` field
    Bytes,
    /// `int` field
    Int,
    /// `double` field
    Double,
    /// `http` field
    Http,
    /// `stream` field
    Stream,
}

impl TypedDataKind {
    /// Field name as it appears on the wire
    pub const fn as_str(&self) -> &'static str {
        match self {
            TypedDataKind::Json => "json",
            TypedDataKind::String => "string",
            TypedDataKind::Bytes => "bytes",
            TypedDataKind::Int => "int",
            TypedDataKind::Double => "double",
            TypedDataKind::Http => "http",
            TypedDataKind::Stream => "stream",
        }
    }
}

impl fmt::Display for TypedDataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP payload carried in the `http` field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcHttp {
    /// Request method (empty for responses)
    #[serde(default)]
    pub method: String,

    /// Request URL (empty for responses)
    #[serde(default)]
    pub url: String,

    /// Header map
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Route parameters
    #[serde(default)]
    pub params: HashMap<String, String>,

    /// Query string parameters
    #[serde(default)]
    pub query: HashMap<String, String>,

    /// Response status code, as text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,

    /// Body as its own typed value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Box<TypedData>>,
}
