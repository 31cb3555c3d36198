// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type graph traversal.

use super::classify::select_members;
use super::{SchemaError, SchemaResult};
use crate::model::{TypeInfo, TypeProvider, TypeRef};
use std::collections::HashSet;
use std::sync::Arc;

/// Lazy depth-first traversal of every custom type reachable from a root.
///
/// Reachability follows base types, declared known subtypes, generic
/// arguments and classified members' element types (unwrapped through
/// optional/sequence/map shapes). Each type is yielded at most once; the
/// visited set makes cyclic and self-referential graphs terminate. The
/// traversal uses an explicit stack, so deep graphs cannot overflow the call
/// stack.
///
/// Scalar and enum references never enter the graph; the codec handles them
/// without a layout.
pub struct ReachableTypes<'a> {
    provider: &'a dyn TypeProvider,
    stack: Vec<TypeRef>,
    visited: HashSet<TypeRef>,
}

impl<'a> ReachableTypes<'a> {
    pub fn new(provider: &'a dyn TypeProvider, root: &TypeRef) -> Self {
        let mut walker = Self {
            provider,
            stack: Vec::new(),
            visited: HashSet::new(),
        };
        walker.push_custom(root);
        walker
    }

    /// Push every unvisited `Named` reference inside `ty`.
    fn push_custom(&mut self, ty: &TypeRef) {
        let stack = &mut self.stack;
        let visited = &mut self.visited;
        ty.for_each_named(&mut |named| {
            if visited.insert(named.clone()) {
                stack.push(named.clone());
            }
        });
    }
}

impl<'a> Iterator for ReachableTypes<'a> {
    type Item = SchemaResult<Arc<TypeInfo>>;

    fn next(&mut self) -> Option<Self::Item> {
        let ty = self.stack.pop()?;
        let name = match ty.as_named() {
            Some(name) => name.to_string(),
            None => return Some(Err(SchemaError::UnknownType { name: ty.to_string() })),
        };
        let Some(info) = self.provider.describe(&name) else {
            return Some(Err(SchemaError::UnknownType { name }));
        };

        if let Some(base) = info.base.clone() {
            self.push_custom(&base);
        }
        for derived in info.known_subtypes.clone() {
            self.push_custom(&derived);
        }
        for arg in info.generic_args.clone() {
            self.push_custom(&arg);
        }
        for member in select_members(&info) {
            let element = member.element.clone();
            self.push_custom(&element);
        }
        Some(Ok(info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InMemoryTypeProvider, MemberInfo, ScalarKind, TypeInfoBuilder};

    fn names(provider: &InMemoryTypeProvider, root: &TypeRef) -> Vec<String> {
        let mut out: Vec<String> = ReachableTypes::new(provider, root)
            .map(|item| item.expect("known type").name.to_string())
            .collect();
        out.sort();
        out
    }

    #[test]
    fn test_member_elements_reachable() {
        let provider = InMemoryTypeProvider::new();
        provider.register(
            TypeInfoBuilder::new("demo.Inner")
                .property("v", TypeRef::Scalar(ScalarKind::I32))
                .build(),
        );
        let outer = provider.register(
            TypeInfoBuilder::new("demo.Outer")
                .property("inner", TypeRef::named("demo.Inner"))
                .property("items", TypeRef::sequence(TypeRef::named("demo.Inner")))
                .property("scalars", TypeRef::sequence(TypeRef::Scalar(ScalarKind::U8)))
                .build(),
        );

        assert_eq!(names(&provider, &outer), vec!["demo.Inner", "demo.Outer"]);
    }

    #[test]
    fn test_base_and_known_subtypes_reachable() {
        let provider = InMemoryTypeProvider::new();
        provider.register(
            TypeInfoBuilder::new("demo.Shape")
                .abstract_type()
                .known_subtype(TypeRef::named("demo.Circle"))
                .known_subtype(TypeRef::named("demo.Square"))
                .build(),
        );
        provider.register(
            TypeInfoBuilder::new("demo.Circle")
                .base(TypeRef::named("demo.Shape"))
                .property("radius", TypeRef::Scalar(ScalarKind::F64))
                .build(),
        );
        provider.register(
            TypeInfoBuilder::new("demo.Square")
                .base(TypeRef::named("demo.Shape"))
                .property("side", TypeRef::Scalar(ScalarKind::F64))
                .build(),
        );

        // Walking from a leaf reaches the base and, through it, the siblings.
        assert_eq!(
            names(&provider, &TypeRef::named("demo.Circle")),
            vec!["demo.Circle", "demo.Shape", "demo.Square"]
        );
    }

    #[test]
    fn test_self_referential_type_terminates() {
        let provider = InMemoryTypeProvider::new();
        let node = provider.register(
            TypeInfoBuilder::new("demo.Node")
                .property("value", TypeRef::Scalar(ScalarKind::I32))
                .property("parent", TypeRef::optional(TypeRef::named("demo.Node")))
                .build(),
        );
        assert_eq!(names(&provider, &node), vec!["demo.Node"]);
    }

    #[test]
    fn test_mutual_recursion_terminates() {
        let provider = InMemoryTypeProvider::new();
        let a = provider.register(
            TypeInfoBuilder::new("demo.A")
                .property("b", TypeRef::optional(TypeRef::named("demo.B")))
                .build(),
        );
        provider.register(
            TypeInfoBuilder::new("demo.B")
                .property("a", TypeRef::optional(TypeRef::named("demo.A")))
                .build(),
        );
        assert_eq!(names(&provider, &a), vec!["demo.A", "demo.B"]);
    }

    #[test]
    fn test_generic_arguments_reachable() {
        let provider = InMemoryTypeProvider::new();
        provider.register(
            TypeInfoBuilder::new("demo.Inner")
                .property("v", TypeRef::Scalar(ScalarKind::I32))
                .build(),
        );
        let wrapper = provider.register(
            TypeInfoBuilder::new("demo.Wrapper`1[[demo.Inner]]")
                .generic_arg(TypeRef::named("demo.Inner"))
                .property("value", TypeRef::named("demo.Inner"))
                .build(),
        );
        assert_eq!(
            names(&provider, &wrapper),
            vec!["demo.Inner", "demo.Wrapper`1[[demo.Inner]]"]
        );
    }

    #[test]
    fn test_unselected_members_not_walked() {
        let provider = InMemoryTypeProvider::new();
        let outer = provider.register(
            TypeInfoBuilder::new("demo.Outer")
                .member(MemberInfo::property("kept", TypeRef::Scalar(ScalarKind::I32)).opt_in())
                .member(MemberInfo::property("ghost", TypeRef::named("demo.Missing")))
                .build(),
        );
        // The opt-in marker excludes "ghost" from serialization, so its
        // element type is never visited and the missing metadata is no error.
        assert_eq!(names(&provider, &outer), vec!["demo.Outer"]);
    }

    #[test]
    fn test_unknown_type_surfaces_error() {
        let provider = InMemoryTypeProvider::new();
        let outer = provider.register(
            TypeInfoBuilder::new("demo.Outer")
                .property("ghost", TypeRef::named("demo.Missing"))
                .build(),
        );
        let results: Vec<_> = ReachableTypes::new(&provider, &outer).collect();
        assert!(results.iter().any(|r| matches!(
            r,
            Err(SchemaError::UnknownType { name }) if name == "demo.Missing"
        )));
    }
}
