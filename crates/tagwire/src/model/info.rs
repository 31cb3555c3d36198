// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type metadata records.
//!
//! `TypeInfo` is what the host's metadata facility hands the schema core for
//! each custom type: declared members, the base type, explicitly declared
//! known subtypes, and generic arguments. Records are read-only once built.

use super::type_ref::TypeRef;
use std::sync::Arc;

/// Whether a member is backed by a field or a property accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberFlavor {
    Field,
    Property,
}

/// One declared member of a type.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
    /// Member name.
    pub name: String,
    /// Element type of the member. Containers stay whole here; the codec
    /// understands container shapes natively.
    pub element: TypeRef,
    /// Explicit non-negative serialization order, if declared.
    pub order: Option<u32>,
    /// Field or property.
    pub flavor: MemberFlavor,
    /// Public visibility.
    pub public: bool,
    /// Carries the explicit "include in serialization" marker.
    pub opt_in: bool,
    /// Carries the explicit "exclude from serialization" marker.
    pub opt_out: bool,
}

impl MemberInfo {
    /// A public property member.
    pub fn property(name: impl Into<String>, element: TypeRef) -> Self {
        Self {
            name: name.into(),
            element,
            order: None,
            flavor: MemberFlavor::Property,
            public: true,
            opt_in: false,
            opt_out: false,
        }
    }

    /// A public field member.
    pub fn field(name: impl Into<String>, element: TypeRef) -> Self {
        Self {
            flavor: MemberFlavor::Field,
            ..Self::property(name, element)
        }
    }

    /// Set the explicit serialization order.
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    /// Mark with the explicit include marker.
    pub fn opt_in(mut self) -> Self {
        self.opt_in = true;
        self
    }

    /// Mark with the explicit exclude marker.
    pub fn opt_out(mut self) -> Self {
        self.opt_out = true;
        self
    }

    /// Make the member non-public.
    pub fn non_public(mut self) -> Self {
        self.public = false;
        self
    }
}

/// Enum variant (name plus numeric value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: String,
    pub value: i64,
}

impl EnumVariant {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Structural shape of a custom type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    Struct { members: Vec<MemberInfo> },
    Enum { variants: Vec<EnumVariant> },
}

/// Complete runtime metadata for one custom type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    /// Fully-qualified name. Closed generics use the
    /// `` Name`N[[arg],[arg]] `` grammar.
    pub name: Arc<str>,
    /// Abstract types contribute no layout of their own; they exist in the
    /// graph to anchor subtypes.
    pub is_abstract: bool,
    /// Base type, if any.
    pub base: Option<TypeRef>,
    /// Explicitly declared derived types that may appear polymorphically in
    /// this type's place.
    pub known_subtypes: Vec<TypeRef>,
    /// Generic arguments of a closed generic type (empty otherwise).
    pub generic_args: Vec<TypeRef>,
    /// Struct members or enum variants.
    pub shape: TypeShape,
}

impl TypeInfo {
    /// Metadata for an enumeration.
    pub fn enumeration(name: impl Into<Arc<str>>, variants: Vec<EnumVariant>) -> Self {
        Self {
            name: name.into(),
            is_abstract: false,
            base: None,
            known_subtypes: Vec::new(),
            generic_args: Vec::new(),
            shape: TypeShape::Enum { variants },
        }
    }

    /// The identity this metadata describes.
    pub fn type_ref(&self) -> TypeRef {
        match self.shape {
            TypeShape::Enum { .. } => TypeRef::Enum(Arc::clone(&self.name)),
            TypeShape::Struct { .. } => TypeRef::Named(Arc::clone(&self.name)),
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.shape, TypeShape::Enum { .. })
    }

    /// Declared members (empty for enums).
    pub fn members(&self) -> &[MemberInfo] {
        match &self.shape {
            TypeShape::Struct { members } => members,
            TypeShape::Enum { .. } => &[],
        }
    }

    /// Look up an enum variant by value.
    pub fn variant_by_value(&self, value: i64) -> Option<&EnumVariant> {
        match &self.shape {
            TypeShape::Enum { variants } => variants.iter().find(|v| v.value == value),
            TypeShape::Struct { .. } => None,
        }
    }
}

/// Fluent builder for struct `TypeInfo` records.
#[derive(Debug)]
pub struct TypeInfoBuilder {
    name: Arc<str>,
    is_abstract: bool,
    base: Option<TypeRef>,
    known_subtypes: Vec<TypeRef>,
    generic_args: Vec<TypeRef>,
    members: Vec<MemberInfo>,
}

impl TypeInfoBuilder {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            is_abstract: false,
            base: None,
            known_subtypes: Vec::new(),
            generic_args: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Add a fully-specified member.
    pub fn member(mut self, member: MemberInfo) -> Self {
        self.members.push(member);
        self
    }

    /// Shorthand for a plain public property.
    pub fn property(self, name: impl Into<String>, element: TypeRef) -> Self {
        self.member(MemberInfo::property(name, element))
    }

    /// Mark the type abstract.
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Set the base type.
    pub fn base(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    /// Declare a known derived type.
    pub fn known_subtype(mut self, derived: TypeRef) -> Self {
        self.known_subtypes.push(derived);
        self
    }

    /// Record a generic argument of a closed generic type.
    pub fn generic_arg(mut self, arg: TypeRef) -> Self {
        self.generic_args.push(arg);
        self
    }

    pub fn build(self) -> TypeInfo {
        TypeInfo {
            name: self.name,
            is_abstract: self.is_abstract,
            base: self.base,
            known_subtypes: self.known_subtypes,
            generic_args: self.generic_args,
            shape: TypeShape::Struct {
                members: self.members,
            },
        }
    }
}
