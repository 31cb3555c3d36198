// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in classification and the monotonic built-type set.

use crate::model::TypeRef;
use dashmap::DashSet;

/// Set of types whose layouts the codec already holds.
///
/// Membership is monotonic: once a type is in, it never leaves and its layout
/// never changes. Reads are lock-free; insertion happens only inside the
/// schema builder's critical section.
#[derive(Debug, Default)]
pub struct BuiltTypeSet {
    inner: DashSet<TypeRef>,
}

impl BuiltTypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, ty: &TypeRef) -> bool {
        self.inner.contains(ty)
    }

    pub(crate) fn insert(&self, ty: TypeRef) -> bool {
        self.inner.insert(ty)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// True if the codec can already handle `ty` without a schema build.
///
/// Scalars and enums are always built in (enum-ness is part of the type
/// identity, so this stays a metadata-free check); container shapes are built
/// in when their element types are; named types are built in once present in
/// the built set. Side-effect-free and O(1) amortized — this runs on the hot
/// path before any lock.
pub fn is_builtin(ty: &TypeRef, built: &BuiltTypeSet) -> bool {
    match ty {
        TypeRef::Scalar(_) | TypeRef::Enum(_) => true,
        TypeRef::Optional(inner) | TypeRef::Sequence(inner) => is_builtin(inner, built),
        TypeRef::Map(key, value) => is_builtin(key, built) && is_builtin(value, built),
        TypeRef::Named(_) => built.contains(ty),
    }
}
