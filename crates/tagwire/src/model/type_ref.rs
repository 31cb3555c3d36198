// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type identity.

use std::fmt;
use std::sync::Arc;

/// Scalar kinds the codec encodes without a registered layout.
///
/// Covers the primitive numerics plus the fixed allow-list of host types
/// (timestamps, durations, UUIDs, URIs, decimals) that serialize as single
/// wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Str,
    Bytes,
    /// Nanoseconds since the Unix epoch.
    Timestamp,
    /// Signed nanosecond span.
    Duration,
    Uuid,
    Uri,
    /// Arbitrary-precision decimal, carried as its canonical string form.
    Decimal,
}

impl ScalarKind {
    /// Canonical name used in qualified type names.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::F32 => "float32",
            Self::F64 => "float64",
            Self::Str => "string",
            Self::Bytes => "bytes",
            Self::Timestamp => "timestamp",
            Self::Duration => "duration",
            Self::Uuid => "uuid",
            Self::Uri => "uri",
            Self::Decimal => "decimal",
        }
    }

    /// Parse a canonical scalar name (plus a few common aliases).
    pub fn parse(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" => Self::Bool,
            "int8" | "sbyte" => Self::I8,
            "int16" | "short" => Self::I16,
            "int32" | "int" => Self::I32,
            "int64" | "long" => Self::I64,
            "uint8" | "byte" => Self::U8,
            "uint16" | "ushort" => Self::U16,
            "uint32" | "uint" => Self::U32,
            "uint64" | "ulong" => Self::U64,
            "float32" | "float" => Self::F32,
            "float64" | "double" => Self::F64,
            "string" => Self::Str,
            "bytes" => Self::Bytes,
            "timestamp" | "datetime" => Self::Timestamp,
            "duration" | "timespan" => Self::Duration,
            "uuid" | "guid" => Self::Uuid,
            "uri" => Self::Uri,
            "decimal" => Self::Decimal,
            _ => return None,
        };
        Some(kind)
    }
}

/// Stable, comparable, hashable identity of a runtime type.
///
/// `Named` and `Enum` identify custom types by fully-qualified name; closed
/// generic names use the `` Name`N[[arg],[arg]] `` grammar. The wrapper
/// variants describe container shapes the codec understands natively, so
/// only the innermost custom types ever need a registered layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Scalar(ScalarKind),
    /// Custom struct type, by fully-qualified name.
    Named(Arc<str>),
    /// Enumeration type, by fully-qualified name. Enum-ness is part of the
    /// identity so the codec can pick the varint encoding without a lookup.
    Enum(Arc<str>),
    Optional(Box<TypeRef>),
    Sequence(Box<TypeRef>),
    Map(Box<TypeRef>, Box<TypeRef>),
}

impl TypeRef {
    /// Create a named struct type reference.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::Named(name.into())
    }

    /// Create an enum type reference.
    pub fn enumeration(name: impl Into<Arc<str>>) -> Self {
        Self::Enum(name.into())
    }

    /// Create an optional wrapper.
    pub fn optional(inner: TypeRef) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Create a sequence wrapper.
    pub fn sequence(element: TypeRef) -> Self {
        Self::Sequence(Box::new(element))
    }

    /// Create a map wrapper.
    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// The qualified name of a `Named` or `Enum` reference.
    pub fn as_named(&self) -> Option<&str> {
        match self {
            Self::Named(name) | Self::Enum(name) => Some(name),
            _ => None,
        }
    }

    /// True for `Scalar` and any wrapper over scalars only.
    pub fn is_scalar_shape(&self) -> bool {
        match self {
            Self::Scalar(_) => true,
            Self::Named(_) | Self::Enum(_) => false,
            Self::Optional(inner) | Self::Sequence(inner) => inner.is_scalar_shape(),
            Self::Map(key, value) => key.is_scalar_shape() && value.is_scalar_shape(),
        }
    }

    /// Visit every `Named` reference inside this reference, unwrapping
    /// container shapes. Enum and scalar references carry no custom layout
    /// and are skipped.
    pub fn for_each_named<F: FnMut(&TypeRef)>(&self, f: &mut F) {
        match self {
            Self::Named(_) => f(self),
            Self::Scalar(_) | Self::Enum(_) => {}
            Self::Optional(inner) | Self::Sequence(inner) => inner.for_each_named(f),
            Self::Map(key, value) => {
                key.for_each_named(f);
                value.for_each_named(f);
            }
        }
    }

    /// Render the qualified name.
    pub fn qualified_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => f.write_str(kind.name()),
            Self::Named(name) | Self::Enum(name) => f.write_str(name),
            Self::Optional(inner) => write!(f, "optional<{}>", inner),
            Self::Sequence(element) => write!(f, "seq<{}>", element),
            Self::Map(key, value) => write!(f, "map<{},{}>", key, value),
        }
    }
}
