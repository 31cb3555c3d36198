// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tag-based binary codec.
//!
//! The schema core registers type layouts and subtype relations here; once a
//! type is registered, [`TagCodec`] can serialize and deserialize dynamic
//! values of it. Encoding is protobuf-style: each member is keyed by
//! `(tag << 3) | wire_type`, nested messages are length-delimited, and
//! polymorphic values travel inside a field keyed by their subtype tag.

mod tag_codec;
mod wire;

pub use tag_codec::TagCodec;
pub use wire::{zigzag_decode, zigzag_encode, WireReader, WireType, WireWriter};

use crate::model::TypeRef;
use std::fmt;

/// First tag number reserved for subtype links.
///
/// Member tags are derived from declared orders and capped below this value,
/// so member keys and subtype keys share one key space without collision.
pub const SUBTYPE_TAG_BASE: u32 = 500;

/// Highest wire tag a member may occupy.
pub const MAX_MEMBER_TAG: u32 = SUBTYPE_TAG_BASE - 1;

/// One member slot of a registered layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot {
    /// Wire tag (1-based, below [`SUBTYPE_TAG_BASE`]).
    pub tag: u32,
    /// Member name.
    pub name: String,
    /// Element type.
    pub element: TypeRef,
}

/// Ordered field layout of one type, as registered with the codec.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeLayout {
    pub fields: Vec<FieldSlot>,
}

impl TypeLayout {
    pub fn new(fields: Vec<FieldSlot>) -> Self {
        Self { fields }
    }

    pub fn slot_by_tag(&self, tag: u32) -> Option<&FieldSlot> {
        self.fields.iter().find(|slot| slot.tag == tag)
    }

    pub fn slot_by_name(&self, name: &str) -> Option<&FieldSlot> {
        self.fields.iter().find(|slot| slot.name == name)
    }
}

/// Registration interface the schema core requires from a codec.
///
/// All three operations are idempotent: repeating a call with the same
/// arguments has no effect beyond the first.
pub trait TypeCodec: Send + Sync {
    /// Register (or overwrite) the field layout of a type.
    fn define_type(&self, ty: TypeRef, layout: TypeLayout) -> CodecResult<()>;

    /// Register a base-to-derived subtype link under the given tag.
    fn define_subtype(&self, base: TypeRef, tag: u32, derived: TypeRef) -> CodecResult<()>;

    /// True if the type's layout is already registered.
    fn is_defined(&self, ty: &TypeRef) -> bool;
}

/// Codec failure modes.
#[derive(Debug, Clone)]
pub enum CodecError {
    /// Type has no registered layout and no subtype relations.
    UnknownType { name: String },
    /// A value's runtime type is abstract (registered only as a subtype
    /// anchor) and cannot be encoded directly.
    AbstractType { name: String },
    /// Subtype tag not registered under the base type.
    UnknownSubtypeTag { base: String, tag: u32 },
    /// A tag already maps to a different derived type under this base.
    SubtypeConflict { base: String, tag: u32 },
    /// Member tag not present in the type's layout.
    UnknownField { type_name: String, tag: u32 },
    /// A non-defaultable member was absent (on the wire or in the value).
    MissingField { type_name: String, field: String },
    /// Value shape does not match the declared element type.
    TypeMismatch { expected: String, found: String },
    /// A layout tag reached the subtype key space.
    TagOverflow { type_name: String, tag: u32 },
    /// Decoded value does not fit the declared scalar width.
    OutOfRange { ty: String, offset: usize },
    /// String payload was not valid UTF-8.
    InvalidUtf8 { offset: usize },
    /// Buffer ended mid-value.
    Truncated { offset: usize },
    /// Varint exceeded 64 bits.
    MalformedVarint { offset: usize },
    /// Field key had an unsupported wire type or a zero tag.
    InvalidKey { offset: usize, key: u64 },
    /// Input continued past the decoded value.
    TrailingBytes { offset: usize },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { name } => write!(f, "unknown type: {}", name),
            Self::AbstractType { name } => {
                write!(f, "abstract type cannot be encoded directly: {}", name)
            }
            Self::UnknownSubtypeTag { base, tag } => {
                write!(f, "unknown subtype tag {} under base {}", tag, base)
            }
            Self::SubtypeConflict { base, tag } => {
                write!(f, "subtype tag {} already taken under base {}", tag, base)
            }
            Self::UnknownField { type_name, tag } => {
                write!(f, "unknown field tag {} for type {}", tag, type_name)
            }
            Self::MissingField { type_name, field } => {
                write!(f, "missing field {}.{}", type_name, field)
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            Self::TagOverflow { type_name, tag } => {
                write!(f, "member tag {} of {} reaches subtype key space", tag, type_name)
            }
            Self::OutOfRange { ty, offset } => {
                write!(f, "value out of range for {} at offset {}", ty, offset)
            }
            Self::InvalidUtf8 { offset } => write!(f, "invalid UTF-8 at offset {}", offset),
            Self::Truncated { offset } => write!(f, "unexpected end of buffer at offset {}", offset),
            Self::MalformedVarint { offset } => write!(f, "malformed varint at offset {}", offset),
            Self::InvalidKey { offset, key } => {
                write!(f, "invalid field key {:#x} at offset {}", key, offset)
            }
            Self::TrailingBytes { offset } => {
                write!(f, "trailing bytes after value at offset {}", offset)
            }
        }
    }
}

impl std::error::Error for CodecError {}

pub type CodecResult<T> = Result<T, CodecError>;
