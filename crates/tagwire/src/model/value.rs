// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic value container.

use super::type_ref::{ScalarKind, TypeRef};
use std::collections::HashMap;

/// A struct value together with its runtime type.
///
/// The runtime type may be a registered subtype of the member's declared
/// type; the codec uses it to pick the polymorphic encoding path.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    pub ty: TypeRef,
    pub fields: HashMap<String, Value>,
}

impl StructValue {
    pub fn new(ty: TypeRef) -> Self {
        Self {
            ty,
            fields: HashMap::new(),
        }
    }

    /// Set a field value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A dynamic value that can hold any serializable shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Scalars
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Nanoseconds since the Unix epoch.
    Timestamp(i64),
    /// Signed nanosecond span.
    Duration(i64),
    Uuid([u8; 16]),
    Uri(String),
    Decimal(String),

    // Composites
    Enum(i64),
    Struct(StructValue),
    Sequence(Vec<Value>),
    Map(Vec<(Value, Value)>),

    /// Absent optional.
    Null,
}

impl Value {
    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u32.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) | Self::Uri(v) | Self::Decimal(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as sequence.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as struct.
    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Self::Struct(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get struct field.
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.as_struct().and_then(|s| s.get(name))
    }

    /// Get enum value.
    pub fn enum_value(&self) -> Option<i64> {
        match self {
            Self::Enum(v) => Some(*v),
            _ => None,
        }
    }

    /// Default value a decoder substitutes for a member absent on the wire.
    ///
    /// Struct-typed members have no default; the codec reports those as
    /// missing instead.
    pub fn default_for(ty: &TypeRef) -> Option<Value> {
        let value = match ty {
            TypeRef::Scalar(kind) => match kind {
                ScalarKind::Bool => Self::Bool(false),
                ScalarKind::I8 => Self::I8(0),
                ScalarKind::I16 => Self::I16(0),
                ScalarKind::I32 => Self::I32(0),
                ScalarKind::I64 => Self::I64(0),
                ScalarKind::U8 => Self::U8(0),
                ScalarKind::U16 => Self::U16(0),
                ScalarKind::U32 => Self::U32(0),
                ScalarKind::U64 => Self::U64(0),
                ScalarKind::F32 => Self::F32(0.0),
                ScalarKind::F64 => Self::F64(0.0),
                ScalarKind::Str => Self::Str(String::new()),
                ScalarKind::Bytes => Self::Bytes(Vec::new()),
                ScalarKind::Timestamp => Self::Timestamp(0),
                ScalarKind::Duration => Self::Duration(0),
                ScalarKind::Uuid => Self::Uuid([0; 16]),
                ScalarKind::Uri => Self::Uri(String::new()),
                ScalarKind::Decimal => Self::Decimal("0".to_string()),
            },
            TypeRef::Enum(_) => Self::Enum(0),
            TypeRef::Optional(_) => Self::Null,
            TypeRef::Sequence(_) => Self::Sequence(Vec::new()),
            TypeRef::Map(_, _) => Self::Map(Vec::new()),
            TypeRef::Named(_) => return None,
        };
        Some(value)
    }
}

// Conversion traits
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Self::I8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::I16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::I64(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Self::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Self::U16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<StructValue> for Value {
    fn from(v: StructValue) -> Self {
        Self::Struct(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}
