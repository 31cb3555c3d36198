// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Append-only subtype tag ledger.

use crate::codec::SUBTYPE_TAG_BASE;
use crate::model::TypeRef;
use std::collections::HashMap;

/// Per-base, insertion-ordered derived-type tag assignment.
///
/// The first derived type seen under a base gets tag [`SUBTYPE_TAG_BASE`],
/// the next one the tag after it, and so on. Entries are only ever appended,
/// never reordered or reassigned, so a tag identifies the same derived type
/// for the lifetime of the process.
#[derive(Debug, Default)]
pub struct SubtypeLedger {
    by_base: HashMap<TypeRef, Vec<(TypeRef, u32)>>,
}

impl SubtypeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a tag for `(base, derived)` on first sight.
    ///
    /// `notify` is invoked with the new tag before the entry is recorded;
    /// if it fails, the ledger is left unchanged so a retry re-attempts the
    /// notification with the same tag. Returns `Ok(None)` when the pair was
    /// already registered.
    pub fn register_if_absent<E>(
        &mut self,
        base: &TypeRef,
        derived: &TypeRef,
        notify: impl FnOnce(u32) -> Result<(), E>,
    ) -> Result<Option<u32>, E> {
        let entry = self.by_base.entry(base.clone()).or_default();
        if entry.iter().any(|(existing, _)| existing == derived) {
            return Ok(None);
        }
        let tag = SUBTYPE_TAG_BASE + entry.len() as u32;
        notify(tag)?;
        entry.push((derived.clone(), tag));
        Ok(Some(tag))
    }

    /// Tag assigned to `(base, derived)`, if registered.
    pub fn tag_of(&self, base: &TypeRef, derived: &TypeRef) -> Option<u32> {
        self.by_base.get(base)?.iter().find_map(|(ty, tag)| {
            if ty == derived {
                Some(*tag)
            } else {
                None
            }
        })
    }

    /// Number of derived types registered under a base.
    pub fn subtype_count(&self, base: &TypeRef) -> usize {
        self.by_base.get(base).map(Vec::len).unwrap_or(0)
    }
}
