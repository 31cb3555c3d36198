// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema building orchestrator.

use super::builtin::{is_builtin, BuiltTypeSet};
use super::classify::classify;
use super::graph::ReachableTypes;
use super::subtype::SubtypeLedger;
use super::{SchemaError, SchemaResult};
use crate::codec::TypeCodec;
use crate::model::{TypeInfo, TypeProvider, TypeRef};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Default)]
struct BuildState {
    ledger: SubtypeLedger,
}

/// Orchestrates schema discovery and codec registration.
///
/// `ensure` is callable concurrently from any thread and is safe to call
/// redundantly: the common case (type already built) is a lock-free set
/// lookup, and a single coarse lock serializes all graph building so layouts
/// and subtype tags are computed with a globally consistent view of what is
/// already registered.
pub struct SchemaBuilder {
    provider: Arc<dyn TypeProvider>,
    codec: Arc<dyn TypeCodec>,
    built: BuiltTypeSet,
    state: Mutex<BuildState>,
}

impl SchemaBuilder {
    pub fn new(provider: Arc<dyn TypeProvider>, codec: Arc<dyn TypeCodec>) -> Self {
        Self {
            provider,
            codec,
            built: BuiltTypeSet::new(),
            state: Mutex::new(BuildState::default()),
        }
    }

    /// Make sure `ty` (and everything reachable from it) is registered with
    /// the codec.
    ///
    /// Idempotent; never regresses an already-built type. On failure the
    /// failing type stays out of the built set so a retry re-attempts it,
    /// while types completed earlier in the same call remain built.
    pub fn ensure(&self, ty: &TypeRef) -> SchemaResult<()> {
        if is_builtin(ty, &self.built) {
            return Ok(());
        }

        let mut state = self.state.lock();
        // Another thread may have finished the build while we waited.
        if is_builtin(ty, &self.built) {
            return Ok(());
        }
        self.build_graph(ty, &mut state)
    }

    /// Lock-free view of whether a type is already serializable.
    pub fn is_built(&self, ty: &TypeRef) -> bool {
        is_builtin(ty, &self.built)
    }

    /// Number of custom types registered so far.
    pub fn built_count(&self) -> usize {
        self.built.len()
    }

    /// Tag assigned to a `(base, derived)` subtype link, if registered.
    pub fn subtype_tag(&self, base: &TypeRef, derived: &TypeRef) -> Option<u32> {
        self.state.lock().ledger.tag_of(base, derived)
    }

    /// Walk, sort and build everything reachable from `root`.
    ///
    /// The reachable set is materialized and sorted by qualified name before
    /// building, so independent processes with the same metadata loaded build
    /// in the same order and assign identical subtype tags.
    fn build_graph(&self, root: &TypeRef, state: &mut BuildState) -> SchemaResult<()> {
        let mut discovered = Vec::new();
        for item in ReachableTypes::new(self.provider.as_ref(), root) {
            discovered.push(item?);
        }
        discovered.sort_by(|a, b| a.name.cmp(&b.name));

        for info in &discovered {
            if self.built.contains(&info.type_ref()) {
                continue;
            }
            self.build_one(info, state)?;
        }
        Ok(())
    }

    fn build_one(&self, info: &Arc<TypeInfo>, state: &mut BuildState) -> SchemaResult<()> {
        let ty = info.type_ref();

        if self.codec.is_defined(&ty) {
            // Pre-existing registration: adopt it as built without touching
            // the codec again.
            self.built.insert(ty);
            return Ok(());
        }

        if !info.is_abstract && !info.is_enum() {
            let layout = classify(info)?;
            self.codec.define_type(ty.clone(), layout)?;
            log::debug!("[schema] defined layout for {}", ty);
        }

        self.register_base_chain(info, state)?;

        // Marked built only after the layout and base chain reached the
        // codec; generic arguments may re-enter build_graph under the held
        // lock, and the membership above is what terminates that recursion.
        self.built.insert(ty);

        for arg in &info.generic_args {
            self.ensure_locked(arg, state)?;
        }
        Ok(())
    }

    /// `ensure` for use inside the already-held critical section.
    fn ensure_locked(&self, ty: &TypeRef, state: &mut BuildState) -> SchemaResult<()> {
        if is_builtin(ty, &self.built) {
            return Ok(());
        }
        self.build_graph(ty, state)
    }

    /// Register every link of `info`'s base chain exactly once.
    ///
    /// A three-level hierarchy yields two links, one per parent-child pair.
    fn register_base_chain(&self, info: &Arc<TypeInfo>, state: &mut BuildState) -> SchemaResult<()> {
        let mut current = Arc::clone(info);
        let mut seen = HashSet::new();
        while let Some(base) = current.base.clone() {
            let derived = current.type_ref();
            if !seen.insert(derived.clone()) {
                // Cyclic base declaration; the walk above already visited
                // every participant, nothing more to register.
                break;
            }

            let assigned = state
                .ledger
                .register_if_absent(&base, &derived, |tag| {
                    self.codec.define_subtype(base.clone(), tag, derived.clone())
                })
                .map_err(SchemaError::from)?;
            if let Some(tag) = assigned {
                log::debug!("[schema] subtype {} --{}--> {}", base, tag, derived);
            }

            let base_name = match base.as_named() {
                Some(name) => name.to_string(),
                None => {
                    return Err(SchemaError::UnknownType {
                        name: base.to_string(),
                    })
                }
            };
            current = self
                .provider
                .describe(&base_name)
                .ok_or(SchemaError::UnknownType { name: base_name })?;
        }
        Ok(())
    }
}
