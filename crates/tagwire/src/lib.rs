// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # tagwire - dynamic schemas for tag-based binary serialization
//!
//! Serializes arbitrary runtime-described object graphs to a compact
//! protobuf-style wire format. Given a root type known only at runtime,
//! `tagwire` discovers every type reachable from it (members, base chains,
//! declared subtypes, generic arguments), decides a stable, collision-free
//! tag layout for each discovered type, and registers it with the codec -
//! safely under concurrent first use from multiple threads.
//!
//! ## Quick Start
//!
//! ```rust
//! use tagwire::{InMemoryTypeProvider, ObjectSerializer, ScalarKind,
//!               StructValue, TypeInfoBuilder, TypeRef, Value};
//! use std::sync::Arc;
//!
//! let provider = Arc::new(InMemoryTypeProvider::new());
//! let sensor = provider.register(
//!     TypeInfoBuilder::new("demo.Sensor")
//!         .property("id", TypeRef::Scalar(ScalarKind::U32))
//!         .property("reading", TypeRef::Scalar(ScalarKind::F64))
//!         .build(),
//! );
//!
//! let serializer = ObjectSerializer::new(provider);
//!
//! let mut value = StructValue::new(sensor.clone());
//! value.set("id", 42u32).set("reading", 23.5f64);
//!
//! let bytes = serializer.serialize(&sensor, &Value::Struct(value.clone())).unwrap();
//! let back = serializer.deserialize(&sensor, &bytes).unwrap();
//! assert_eq!(back, Value::Struct(value));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------------+
//! |                        ObjectSerializer                            |
//! |        ensure-on-first-use  ->  serialize / deserialize            |
//! +--------------------------------------------------------------------+
//! |                          schema                                    |
//! |  classify | graph walk | built set | subtype ledger | builder      |
//! +--------------------------------------------------------------------+
//! |            model             |             codec                   |
//! |  TypeRef/TypeInfo/Provider   |  varint wire | layouts | subtypes   |
//! +--------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ObjectSerializer`] | Front end: first-use schema build plus codec calls |
//! | [`SchemaBuilder`] | Discovers and registers a type's whole graph |
//! | [`TypeProvider`] | Host metadata facility describing runtime types |
//! | [`TypeRef`] | Stable, hashable runtime type identity |
//! | [`Value`] | Dynamic value container the codec encodes and decodes |
//! | [`TypeNameResolver`] | Reconstructs types from serialized name strings |
//!
//! ## Modules Overview
//!
//! - [`model`] - type identity, metadata records, providers, dynamic values
//! - [`schema`] - graph discovery, layout classification, subtype ledger
//! - [`codec`] - tag-based binary wire format and registration tables
//! - [`resolve`] - qualified type name parsing and memoized resolution

/// Tag-based binary codec (wire primitives, layouts, subtype tables).
pub mod codec;
/// Runtime type model (identity, metadata, providers, dynamic values).
pub mod model;
/// Qualified type name resolution with a lock-free memo cache.
pub mod resolve;
/// Dynamic schema discovery and registration.
pub mod schema;
/// Serializer front end.
pub mod serializer;

pub use codec::{CodecError, TagCodec, TypeCodec, TypeLayout};
pub use model::{
    EnumVariant, InMemoryTypeProvider, MemberFlavor, MemberInfo, ScalarKind, StructValue,
    TypeInfo, TypeInfoBuilder, TypeProvider, TypeRef, TypeShape, Value,
};
pub use resolve::{ResolveError, TypeNameResolver};
pub use schema::{BuiltTypeSet, SchemaBuilder, SchemaError};
pub use serializer::{Error, ObjectSerializer, Result};
