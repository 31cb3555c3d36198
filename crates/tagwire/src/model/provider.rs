// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host metadata facility: the `TypeProvider` trait and the in-memory,
//! registration-backed implementation.
//!
//! The schema core never inspects live objects; everything it learns about a
//! type comes through a `TypeProvider`. Hosts with code generation can back
//! the trait with generated tables; `InMemoryTypeProvider` covers tests and
//! hosts that register metadata at startup.

use super::info::TypeInfo;
use super::type_ref::TypeRef;
use dashmap::DashMap;
use std::sync::Arc;

/// Runtime type metadata source.
pub trait TypeProvider: Send + Sync {
    /// Metadata for a custom type, by fully-qualified name.
    ///
    /// Returns `None` for unknown names.
    fn describe(&self, name: &str) -> Option<Arc<TypeInfo>>;

    /// Resolve a simple (non-generic, non-scalar) qualified name to a type.
    fn find_type(&self, qualified_name: &str) -> Option<TypeRef>;

    /// Declared arity of an open generic type, by its `` Name`N `` form.
    fn generic_arity(&self, open_name: &str) -> Option<usize>;

    /// Close an open generic type over already-resolved arguments.
    fn close_generic(&self, open_name: &str, args: &[TypeRef]) -> Option<TypeRef>;
}

type TemplateFn = dyn Fn(&[TypeRef]) -> TypeInfo + Send + Sync;

struct GenericTemplate {
    arity: usize,
    instantiate: Arc<TemplateFn>,
}

/// Registration-backed [`TypeProvider`].
///
/// Closed generic types can be registered directly under their full closed
/// name, or produced on demand from a registered open-generic template.
#[derive(Default)]
pub struct InMemoryTypeProvider {
    types: DashMap<Arc<str>, Arc<TypeInfo>>,
    templates: DashMap<Arc<str>, GenericTemplate>,
    arities: DashMap<Arc<str>, usize>,
}

impl InMemoryTypeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type's metadata; returns its identity.
    ///
    /// Registering a closed generic name also records the open name's arity
    /// so the resolver can validate argument counts.
    pub fn register(&self, info: TypeInfo) -> TypeRef {
        let ty = info.type_ref();
        if let Some(open) = info.name.split_once("[[").map(|(open, _)| open) {
            self.arities
                .entry(Arc::<str>::from(open))
                .or_insert(info.generic_args.len());
        }
        self.types.insert(Arc::clone(&info.name), Arc::new(info));
        ty
    }

    /// Register an open-generic template.
    ///
    /// `instantiate` receives the resolved arguments and returns the closed
    /// type's metadata; the provider canonicalizes its name and recorded
    /// arguments before registering the instantiation.
    pub fn register_template<F>(&self, open_name: impl Into<Arc<str>>, arity: usize, instantiate: F)
    where
        F: Fn(&[TypeRef]) -> TypeInfo + Send + Sync + 'static,
    {
        let open_name = open_name.into();
        self.templates.insert(
            Arc::clone(&open_name),
            GenericTemplate {
                arity,
                instantiate: Arc::new(instantiate),
            },
        );
        self.arities.insert(open_name, arity);
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn closed_name(open_name: &str, args: &[TypeRef]) -> String {
        let rendered: Vec<String> = args.iter().map(|arg| arg.qualified_name()).collect();
        format!("{}[[{}]]", open_name, rendered.join("],["))
    }
}

impl TypeProvider for InMemoryTypeProvider {
    fn describe(&self, name: &str) -> Option<Arc<TypeInfo>> {
        self.types.get(name).map(|entry| Arc::clone(entry.value()))
    }

    fn find_type(&self, qualified_name: &str) -> Option<TypeRef> {
        self.types.get(qualified_name).map(|entry| entry.type_ref())
    }

    fn generic_arity(&self, open_name: &str) -> Option<usize> {
        if let Some(template) = self.templates.get(open_name) {
            return Some(template.arity);
        }
        self.arities.get(open_name).map(|entry| *entry.value())
    }

    fn close_generic(&self, open_name: &str, args: &[TypeRef]) -> Option<TypeRef> {
        let name = Self::closed_name(open_name, args);
        if let Some(existing) = self.types.get(name.as_str()) {
            return Some(existing.type_ref());
        }

        let template = self.templates.get(open_name)?;
        if template.arity != args.len() {
            return None;
        }
        let mut info = (template.instantiate)(args);
        info.name = Arc::<str>::from(name.as_str());
        info.generic_args = args.to_vec();
        drop(template);

        log::trace!("[provider] instantiated generic {}", name);
        Some(self.register(info))
    }
}
