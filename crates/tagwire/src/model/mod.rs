// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type model.
//!
//! Identity ([`TypeRef`]), metadata ([`TypeInfo`]/[`MemberInfo`]), the host
//! metadata facility ([`TypeProvider`]) and the dynamic [`Value`] container.
//! The schema core consumes this model; it never inspects live objects.
//!
//! # Example
//!
//! ```rust
//! use tagwire::{InMemoryTypeProvider, ScalarKind, TypeInfoBuilder, TypeRef};
//!
//! let provider = InMemoryTypeProvider::new();
//! let sensor = provider.register(
//!     TypeInfoBuilder::new("demo.Sensor")
//!         .property("id", TypeRef::Scalar(ScalarKind::U32))
//!         .property("reading", TypeRef::Scalar(ScalarKind::F64))
//!         .build(),
//! );
//! assert_eq!(sensor, TypeRef::named("demo.Sensor"));
//! ```

mod info;
mod provider;
mod type_ref;
mod value;

pub use info::{EnumVariant, MemberFlavor, MemberInfo, TypeInfo, TypeInfoBuilder, TypeShape};
pub use provider::{InMemoryTypeProvider, TypeProvider};
pub use type_ref::{ScalarKind, TypeRef};
pub use value::{StructValue, Value};
