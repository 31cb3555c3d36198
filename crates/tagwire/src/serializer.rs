// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serializer front end.
//!
//! Owns the codec, the schema builder and the name resolver; the first time
//! a type is serialized or deserialized its schema is discovered and
//! registered on the spot.

use crate::codec::{CodecError, TagCodec, TypeCodec};
use crate::model::{TypeProvider, TypeRef, Value};
use crate::resolve::{ResolveError, TypeNameResolver};
use crate::schema::{SchemaBuilder, SchemaError};
use std::fmt;
use std::sync::Arc;

/// Top-level error type.
#[derive(Debug)]
pub enum Error {
    Schema(SchemaError),
    Codec(CodecError),
    Resolve(ResolveError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "schema error: {}", err),
            Self::Codec(err) => write!(f, "codec error: {}", err),
            Self::Resolve(err) => write!(f, "resolve error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<SchemaError> for Error {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

impl From<CodecError> for Error {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<ResolveError> for Error {
    fn from(value: ResolveError) -> Self {
        Self::Resolve(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Binary object serializer with first-use schema discovery.
pub struct ObjectSerializer {
    codec: Arc<TagCodec>,
    builder: SchemaBuilder,
    resolver: TypeNameResolver,
}

impl ObjectSerializer {
    pub fn new(provider: Arc<dyn TypeProvider>) -> Self {
        let codec = Arc::new(TagCodec::new());
        let builder = SchemaBuilder::new(
            Arc::clone(&provider),
            Arc::clone(&codec) as Arc<dyn TypeCodec>,
        );
        let resolver = TypeNameResolver::new(provider);
        Self {
            codec,
            builder,
            resolver,
        }
    }

    /// Make sure a type (and its whole graph) is registered with the codec.
    pub fn ensure_serializable(&self, ty: &TypeRef) -> Result<()> {
        self.builder.ensure(ty)?;
        Ok(())
    }

    /// Serialize a value of the declared type, building its schema first if
    /// this is the type's first use.
    pub fn serialize(&self, ty: &TypeRef, value: &Value) -> Result<Vec<u8>> {
        self.builder.ensure(ty)?;
        Ok(self.codec.serialize(ty, value)?)
    }

    /// Deserialize a value of the declared type.
    pub fn deserialize(&self, ty: &TypeRef, bytes: &[u8]) -> Result<Value> {
        self.builder.ensure(ty)?;
        Ok(self.codec.deserialize(ty, bytes)?)
    }

    /// Strict type name resolution.
    pub fn resolve_type_name(&self, name: &str) -> Result<TypeRef> {
        Ok(self.resolver.resolve(name)?)
    }

    /// Lenient type name resolution; unknown names yield `Ok(None)`.
    pub fn try_resolve_type_name(&self, name: &str) -> Result<Option<TypeRef>> {
        Ok(self.resolver.try_resolve(name)?)
    }

    /// The schema builder, for diagnostics (built set, subtype tags).
    pub fn schema(&self) -> &SchemaBuilder {
        &self.builder
    }

    /// The underlying codec.
    pub fn codec(&self) -> &TagCodec {
        &self.codec
    }
}
