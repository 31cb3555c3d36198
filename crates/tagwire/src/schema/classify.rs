// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Member classification: which members serialize, and under which tags.

use super::{SchemaError, SchemaResult};
use crate::codec::{FieldSlot, TypeLayout, MAX_MEMBER_TAG};
use crate::model::{MemberFlavor, MemberInfo, TypeInfo};
use std::collections::BTreeMap;

/// Select the members of a type that participate in serialization.
///
/// If any member carries the explicit include marker, only marked members
/// participate (fields and properties, any visibility). Otherwise all public
/// properties without the exclude marker participate.
///
/// Note the coupling this inherits from the marker rule: adding a single
/// include marker anywhere in a type silently switches the whole type from
/// "all public properties" to "marked members only". This is intentional and
/// covered by tests; review a type's full member list when adding markers.
pub fn select_members(info: &TypeInfo) -> Vec<&MemberInfo> {
    let members = info.members();
    let marked: Vec<&MemberInfo> = members
        .iter()
        .filter(|m| m.opt_in && !m.opt_out)
        .collect();
    if !marked.is_empty() {
        return marked;
    }
    members
        .iter()
        .filter(|m| m.public && m.flavor == MemberFlavor::Property && !m.opt_out)
        .collect()
}

/// Compute the deterministic tag layout of one type.
///
/// Members with an explicit order occupy tag `order + 1`; duplicate orders
/// are an error. Members without an order are appended after the highest
/// explicit tag, sorted by ordinal name comparison, so two processes scanning
/// the same metadata produce byte-identical layouts.
///
/// Abstract types produce an empty layout; they participate in the graph only
/// to anchor subtypes.
pub fn classify(info: &TypeInfo) -> SchemaResult<TypeLayout> {
    if info.is_abstract {
        return Ok(TypeLayout::default());
    }

    let selected = select_members(info);
    let mut ordered: BTreeMap<u32, &MemberInfo> = BTreeMap::new();
    let mut unordered: Vec<&MemberInfo> = Vec::new();
    for member in selected {
        match member.order {
            Some(order) => {
                if order >= MAX_MEMBER_TAG {
                    return Err(SchemaError::OrderOutOfRange {
                        type_name: info.name.to_string(),
                        member: member.name.clone(),
                        order,
                    });
                }
                if ordered.insert(order, member).is_some() {
                    return Err(SchemaError::OrderConflict {
                        type_name: info.name.to_string(),
                        order,
                    });
                }
            }
            None => unordered.push(member),
        }
    }
    unordered.sort_by(|a, b| a.name.cmp(&b.name));

    let mut fields = Vec::with_capacity(ordered.len() + unordered.len());
    for (order, member) in &ordered {
        fields.push(FieldSlot {
            tag: order + 1,
            name: member.name.clone(),
            element: member.element.clone(),
        });
    }
    let mut next_tag = ordered.keys().next_back().map(|o| o + 2).unwrap_or(1);
    for member in unordered {
        if next_tag > MAX_MEMBER_TAG {
            return Err(SchemaError::OrderOutOfRange {
                type_name: info.name.to_string(),
                member: member.name.clone(),
                order: next_tag - 1,
            });
        }
        fields.push(FieldSlot {
            tag: next_tag,
            name: member.name.clone(),
            element: member.element.clone(),
        });
        next_tag += 1;
    }
    Ok(TypeLayout::new(fields))
}
