// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Qualified type name resolution.
//!
//! Reconstructs a [`TypeRef`] from a previously serialized fully-qualified
//! name, including nested closed generic names in the
//! `` Name`N[[arg1],[arg2]] `` grammar. Results are memoized in a map behind
//! an [`ArcSwap`]: lookups never block, and updates go through an optimistic
//! copy-on-write retry loop so concurrent inserts are never lost.

use crate::model::{ScalarKind, TypeProvider, TypeRef};
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name resolution failure modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No loaded type matches the name (strict mode only).
    Unresolvable { name: String },
    /// The name looks generic but does not match the bracket grammar.
    MalformedName { name: String },
    /// Parsed argument count does not match the declared arity.
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolvable { name } => write!(f, "cannot resolve type name: {}", name),
            Self::MalformedName { name } => write!(f, "malformed generic type name: {}", name),
            Self::ArityMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "generic arity mismatch for {}: expected {} arguments, found {}",
                name, expected, found
            ),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Resolves serialized type names back to [`TypeRef`]s.
///
/// Lookups consult the primary provider first, then any extra search
/// providers in order, so hosts can widen resolution beyond their main
/// metadata source.
pub struct TypeNameResolver {
    providers: Vec<Arc<dyn TypeProvider>>,
    cache: ArcSwap<HashMap<String, TypeRef>>,
}

impl TypeNameResolver {
    pub fn new(provider: Arc<dyn TypeProvider>) -> Self {
        Self::with_search_list(provider, Vec::new())
    }

    /// Resolver with an extra, ordered search list behind the primary
    /// provider.
    pub fn with_search_list(
        provider: Arc<dyn TypeProvider>,
        extra: Vec<Arc<dyn TypeProvider>>,
    ) -> Self {
        let mut providers = Vec::with_capacity(1 + extra.len());
        providers.push(provider);
        providers.extend(extra);
        Self {
            providers,
            cache: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// Strict resolution: an unknown name is an error.
    pub fn resolve(&self, name: &str) -> Result<TypeRef, ResolveError> {
        self.try_resolve(name)?.ok_or_else(|| ResolveError::Unresolvable {
            name: name.to_string(),
        })
    }

    /// Lenient resolution: an unknown name yields `Ok(None)`.
    ///
    /// Malformed generic names and arity mismatches are errors on both
    /// paths; there is no lenient reading of those.
    pub fn try_resolve(&self, name: &str) -> Result<Option<TypeRef>, ResolveError> {
        if let Some(hit) = self.cache.load().get(name) {
            return Ok(Some(hit.clone()));
        }

        let resolved = self.resolve_uncached(name)?;
        if let Some(ty) = &resolved {
            self.memoize(name, ty);
        }
        Ok(resolved)
    }

    /// Number of memoized names.
    pub fn cached_len(&self) -> usize {
        self.cache.load().len()
    }

    fn resolve_uncached(&self, name: &str) -> Result<Option<TypeRef>, ResolveError> {
        if let Some(parsed) = parse_generic(name)? {
            let mut args = Vec::with_capacity(parsed.args.len());
            for arg_name in &parsed.args {
                match self.try_resolve(arg_name)? {
                    Some(ty) => args.push(ty),
                    None => return Ok(None),
                }
            }
            if parsed.arity != args.len() {
                return Err(ResolveError::ArityMismatch {
                    name: name.to_string(),
                    expected: parsed.arity,
                    found: args.len(),
                });
            }
            let Some((provider, declared)) = self
                .providers
                .iter()
                .find_map(|p| p.generic_arity(&parsed.open).map(|arity| (p, arity)))
            else {
                return Ok(None);
            };
            if declared != args.len() {
                return Err(ResolveError::ArityMismatch {
                    name: name.to_string(),
                    expected: declared,
                    found: args.len(),
                });
            }
            return Ok(provider.close_generic(&parsed.open, &args));
        }

        if let Some(kind) = ScalarKind::parse(name) {
            return Ok(Some(TypeRef::Scalar(kind)));
        }
        Ok(self.providers.iter().find_map(|p| p.find_type(name)))
    }

    fn memoize(&self, name: &str, ty: &TypeRef) {
        // Copy-on-write: clone the current map, insert, swap; arc-swap
        // retries the closure if another thread swapped in between, so no
        // concurrent insert is lost.
        self.cache.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.insert(name.to_string(), ty.clone());
            next
        });
        log::trace!("[resolver] memoized {}", name);
    }
}

struct ParsedGeneric {
    open: String,
    arity: usize,
    args: Vec<String>,
}

/// Parse a closed generic name of the form `` Open`N[[a],[b]] ``.
///
/// Returns `Ok(None)` for names with no generic marker (and for bare open
/// generic names, which resolve like simple names). Nested argument names
/// are handled by bracket depth counting, not by splitting on commas.
fn parse_generic(name: &str) -> Result<Option<ParsedGeneric>, ResolveError> {
    let Some(tick) = name.find('`') else {
        return Ok(None);
    };
    let malformed = || ResolveError::MalformedName {
        name: name.to_string(),
    };

    let rest = &name[tick + 1..];
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return Err(malformed());
    }
    let arity: usize = rest[..digits_end].parse().map_err(|_| malformed())?;
    let open = name[..tick + 1 + digits_end].to_string();

    let remainder = &rest[digits_end..];
    if remainder.is_empty() {
        // Bare open generic name; nothing to close.
        return Ok(None);
    }
    if !remainder.starts_with("[[") || !remainder.ends_with("]]") || remainder.len() < 4 {
        return Err(malformed());
    }
    // Strip one outer bracket layer: "[[a],[b]]" -> "[a],[b]".
    let list = &remainder[1..remainder.len() - 1];
    let bytes = list.as_bytes();

    let mut args = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'[' {
            return Err(malformed());
        }
        let start = i;
        let mut depth = 0usize;
        let mut end = None;
        while i < bytes.len() {
            match bytes[i] {
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i);
                        break;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        let Some(end) = end else {
            return Err(malformed());
        };
        let arg = &list[start + 1..end];
        if arg.is_empty() {
            return Err(malformed());
        }
        args.push(arg.to_string());
        i = end + 1;
        if i < bytes.len() {
            if bytes[i] != b',' {
                return Err(malformed());
            }
            i += 1;
            if i == bytes.len() {
                return Err(malformed());
            }
        }
    }
    if args.is_empty() {
        return Err(malformed());
    }
    Ok(Some(ParsedGeneric { open, arity, args }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InMemoryTypeProvider, MemberInfo, TypeInfoBuilder};

    fn provider_with_generics() -> Arc<InMemoryTypeProvider> {
        let provider = Arc::new(InMemoryTypeProvider::new());
        provider.register(
            TypeInfoBuilder::new("demo.Inner")
                .property("v", TypeRef::Scalar(ScalarKind::I32))
                .build(),
        );
        provider.register_template("demo.List`1", 1, |args| {
            TypeInfoBuilder::new("placeholder")
                .member(MemberInfo::property(
                    "items",
                    TypeRef::sequence(args[0].clone()),
                ))
                .build()
        });
        provider.register_template("demo.Dictionary`2", 2, |args| {
            TypeInfoBuilder::new("placeholder")
                .member(MemberInfo::property(
                    "entries",
                    TypeRef::map(args[0].clone(), args[1].clone()),
                ))
                .build()
        });
        provider
    }

    #[test]
    fn test_simple_and_scalar_names() {
        let provider = provider_with_generics();
        let resolver = TypeNameResolver::new(provider);

        assert_eq!(
            resolver.resolve("demo.Inner").expect("simple name"),
            TypeRef::named("demo.Inner")
        );
        assert_eq!(
            resolver.resolve("string").expect("scalar name"),
            TypeRef::Scalar(ScalarKind::Str)
        );
        assert_eq!(
            resolver.resolve("int").expect("scalar alias"),
            TypeRef::Scalar(ScalarKind::I32)
        );
    }

    #[test]
    fn test_lenient_vs_strict_for_unknown_names() {
        let resolver = TypeNameResolver::new(provider_with_generics());
        assert_eq!(resolver.try_resolve("demo.Ghost").expect("lenient"), None);
        assert!(matches!(
            resolver.resolve("demo.Ghost"),
            Err(ResolveError::Unresolvable { .. })
        ));
    }

    #[test]
    fn test_closed_generic_resolution() {
        let resolver = TypeNameResolver::new(provider_with_generics());
        let ty = resolver
            .resolve("demo.List`1[[demo.Inner]]")
            .expect("closed generic");
        assert_eq!(ty, TypeRef::named("demo.List`1[[demo.Inner]]"));
    }

    #[test]
    fn test_nested_generic_two_levels_deep() {
        let resolver = TypeNameResolver::new(provider_with_generics());
        let ty = resolver
            .resolve("demo.Dictionary`2[[string],[demo.List`1[[int]]]]")
            .expect("nested generic");
        assert_eq!(
            ty,
            TypeRef::named("demo.Dictionary`2[[string],[demo.List`1[[int32]]]]")
        );
    }

    #[test]
    fn test_malformed_names_always_error() {
        let resolver = TypeNameResolver::new(provider_with_generics());
        for bad in [
            "demo.List`x[[int]]",
            "demo.List`1[int]",
            "demo.List`1[[int]",
            "demo.List`1[[int]]junk",
            "demo.List`1[[]]",
            "demo.List`1[[int],]",
        ] {
            assert!(
                matches!(
                    resolver.try_resolve(bad),
                    Err(ResolveError::MalformedName { .. })
                ),
                "expected malformed: {}",
                bad
            );
        }
    }

    #[test]
    fn test_arity_mismatch_is_hard_error() {
        let resolver = TypeNameResolver::new(provider_with_generics());
        let err = resolver
            .resolve("demo.Dictionary`2[[string]]")
            .expect_err("name arity disagrees with bracket count");
        assert!(matches!(
            err,
            ResolveError::ArityMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));

        let provider = provider_with_generics();
        // Host mistake: template arity disagrees with the name's suffix.
        provider.register_template("demo.Odd`3", 2, |args| {
            TypeInfoBuilder::new("placeholder")
                .member(MemberInfo::property("a", args[0].clone()))
                .build()
        });
        let resolver = TypeNameResolver::new(provider);
        let err = resolver
            .resolve("demo.Odd`3[[int],[int],[int]]")
            .expect_err("declared arity disagrees");
        assert!(matches!(
            err,
            ResolveError::ArityMismatch {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_unresolvable_argument_is_lenient() {
        let resolver = TypeNameResolver::new(provider_with_generics());
        assert_eq!(
            resolver
                .try_resolve("demo.List`1[[demo.Ghost]]")
                .expect("lenient"),
            None
        );
    }

    #[test]
    fn test_memoization() {
        let resolver = TypeNameResolver::new(provider_with_generics());
        assert_eq!(resolver.cached_len(), 0);
        resolver.resolve("demo.Inner").expect("resolve");
        assert_eq!(resolver.cached_len(), 1);
        // Arguments memoize independently of the outer name.
        resolver
            .resolve("demo.List`1[[demo.Inner]]")
            .expect("resolve generic");
        assert!(resolver.cached_len() >= 2);

        // A second resolution is served from the cache.
        assert_eq!(
            resolver.resolve("demo.Inner").expect("cached"),
            TypeRef::named("demo.Inner")
        );
    }

    #[test]
    fn test_extra_search_list_consulted_in_order() {
        let primary = Arc::new(InMemoryTypeProvider::new());
        primary.register(
            TypeInfoBuilder::new("demo.Local")
                .property("v", TypeRef::Scalar(ScalarKind::I32))
                .build(),
        );
        let extra = Arc::new(InMemoryTypeProvider::new());
        extra.register(
            TypeInfoBuilder::new("ext.Remote")
                .property("v", TypeRef::Scalar(ScalarKind::I32))
                .build(),
        );

        let resolver =
            TypeNameResolver::with_search_list(primary, vec![extra as Arc<dyn TypeProvider>]);
        assert_eq!(
            resolver.resolve("demo.Local").expect("primary"),
            TypeRef::named("demo.Local")
        );
        assert_eq!(
            resolver.resolve("ext.Remote").expect("fallback"),
            TypeRef::named("ext.Remote")
        );
    }

    #[test]
    fn test_open_generic_name_without_args_resolves_like_simple_name() {
        let resolver = TypeNameResolver::new(provider_with_generics());
        // No registered plain type under the open name, so lenient -> None.
        assert_eq!(resolver.try_resolve("demo.List`1").expect("lenient"), None);
    }
}
