// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concrete tag-based binary codec over dynamic values.
//!
//! Layout and subtype tables are concurrent maps so the serialize hot path
//! never takes a lock; registration goes through the [`TypeCodec`] trait and
//! is driven by the schema builder.

use super::wire::{WireReader, WireType, WireWriter};
use super::{CodecError, CodecResult, TypeCodec, TypeLayout, MAX_MEMBER_TAG, SUBTYPE_TAG_BASE};
use crate::model::{ScalarKind, StructValue, TypeRef, Value};
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Tag-based binary codec.
#[derive(Default)]
pub struct TagCodec {
    layouts: DashMap<TypeRef, Arc<TypeLayout>>,
    /// base -> (tag, derived), insertion-ordered.
    children: DashMap<TypeRef, Vec<(u32, TypeRef)>>,
    /// derived -> (base, tag).
    parents: DashMap<TypeRef, (TypeRef, u32)>,
}

impl TagCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered layouts.
    pub fn defined_count(&self) -> usize {
        self.layouts.len()
    }

    /// Serialize a value of the given declared type.
    pub fn serialize(&self, ty: &TypeRef, value: &Value) -> CodecResult<Vec<u8>> {
        let mut writer = WireWriter::new();
        match (ty, value) {
            (TypeRef::Named(_), Value::Struct(sv)) => {
                self.encode_struct_body(&mut writer, ty, sv)?;
            }
            (TypeRef::Named(_), other) => {
                return Err(CodecError::TypeMismatch {
                    expected: ty.to_string(),
                    found: value_kind(other).to_string(),
                });
            }
            _ => self.encode_elem(&mut writer, ty, value)?,
        }
        Ok(writer.into_bytes())
    }

    /// Deserialize a value of the given declared type.
    pub fn deserialize(&self, ty: &TypeRef, bytes: &[u8]) -> CodecResult<Value> {
        let mut reader = WireReader::new(bytes);
        let value = match ty {
            TypeRef::Named(_) => Value::Struct(self.decode_struct_body(&mut reader, ty)?),
            _ => self.decode_elem(&mut reader, ty)?,
        };
        if !reader.is_eof() {
            return Err(CodecError::TrailingBytes {
                offset: reader.offset(),
            });
        }
        Ok(value)
    }

    fn layout_of(&self, ty: &TypeRef) -> Option<Arc<TypeLayout>> {
        self.layouts.get(ty).map(|entry| Arc::clone(entry.value()))
    }

    fn is_known(&self, ty: &TypeRef) -> bool {
        self.layouts.contains_key(ty)
            || self.children.contains_key(ty)
            || self.parents.contains_key(ty)
    }

    /// Subtype links from `declared`'s immediate child down to `actual`.
    fn path_to(&self, declared: &TypeRef, actual: &TypeRef) -> CodecResult<Vec<(u32, TypeRef)>> {
        let mut links = Vec::new();
        let mut seen = HashSet::new();
        let mut current = actual.clone();
        while current != *declared {
            if !seen.insert(current.clone()) {
                return Err(CodecError::TypeMismatch {
                    expected: declared.to_string(),
                    found: actual.to_string(),
                });
            }
            let Some((base, tag)) = self.parents.get(&current).map(|e| e.value().clone()) else {
                return Err(CodecError::TypeMismatch {
                    expected: declared.to_string(),
                    found: actual.to_string(),
                });
            };
            links.push((tag, current));
            current = base;
        }
        links.reverse();
        Ok(links)
    }

    fn encode_struct_body(
        &self,
        writer: &mut WireWriter,
        level: &TypeRef,
        value: &StructValue,
    ) -> CodecResult<()> {
        match self.layout_of(level) {
            Some(layout) => self.encode_fields(writer, level, &layout, value)?,
            None => {
                if !self.is_known(level) {
                    return Err(CodecError::UnknownType {
                        name: level.to_string(),
                    });
                }
                if value.ty == *level {
                    return Err(CodecError::AbstractType {
                        name: level.to_string(),
                    });
                }
            }
        }

        if value.ty != *level {
            let links = self.path_to(level, &value.ty)?;
            if let Some((tag, child)) = links.into_iter().next() {
                let mut nested = WireWriter::new();
                self.encode_struct_body(&mut nested, &child, value)?;
                writer.write_key(tag, WireType::Len);
                writer.write_len_prefixed(nested.bytes());
            }
        }
        Ok(())
    }

    fn encode_fields(
        &self,
        writer: &mut WireWriter,
        level: &TypeRef,
        layout: &TypeLayout,
        value: &StructValue,
    ) -> CodecResult<()> {
        for slot in &layout.fields {
            let optional = matches!(slot.element, TypeRef::Optional(_));
            match value.fields.get(&slot.name) {
                None => {
                    if optional {
                        continue;
                    }
                    return Err(CodecError::MissingField {
                        type_name: level.to_string(),
                        field: slot.name.clone(),
                    });
                }
                Some(Value::Null) => {
                    if optional {
                        continue;
                    }
                    return Err(CodecError::TypeMismatch {
                        expected: slot.element.to_string(),
                        found: "null".to_string(),
                    });
                }
                Some(field_value) => {
                    writer.write_key(slot.tag, wire_type_for(&slot.element));
                    self.encode_field_payload(writer, &slot.element, field_value)?;
                }
            }
        }
        Ok(())
    }

    /// Field-context payload: present optionals unwrap to their inner type
    /// (absence is expressed by omitting the field key entirely).
    fn encode_field_payload(
        &self,
        writer: &mut WireWriter,
        ty: &TypeRef,
        value: &Value,
    ) -> CodecResult<()> {
        match ty {
            TypeRef::Optional(inner) => self.encode_field_payload(writer, inner, value),
            _ => self.encode_bare(writer, ty, value),
        }
    }

    /// Element context (sequence/map element, top-level non-struct root):
    /// optionals carry an explicit presence marker.
    fn encode_elem(&self, writer: &mut WireWriter, ty: &TypeRef, value: &Value) -> CodecResult<()> {
        if let TypeRef::Optional(inner) = ty {
            if value.is_null() {
                writer.write_varint(0);
                return Ok(());
            }
            writer.write_varint(1);
            return self.encode_elem(writer, inner, value);
        }
        self.encode_bare(writer, ty, value)
    }

    fn encode_bare(&self, writer: &mut WireWriter, ty: &TypeRef, value: &Value) -> CodecResult<()> {
        match (ty, value) {
            (TypeRef::Scalar(ScalarKind::Bool), Value::Bool(v)) => {
                writer.write_varint(u64::from(*v));
            }
            (TypeRef::Scalar(ScalarKind::I8), Value::I8(v)) => writer.write_zigzag(i64::from(*v)),
            (TypeRef::Scalar(ScalarKind::I16), Value::I16(v)) => writer.write_zigzag(i64::from(*v)),
            (TypeRef::Scalar(ScalarKind::I32), Value::I32(v)) => writer.write_zigzag(i64::from(*v)),
            (TypeRef::Scalar(ScalarKind::I64), Value::I64(v)) => writer.write_zigzag(*v),
            (TypeRef::Scalar(ScalarKind::U8), Value::U8(v)) => writer.write_varint(u64::from(*v)),
            (TypeRef::Scalar(ScalarKind::U16), Value::U16(v)) => writer.write_varint(u64::from(*v)),
            (TypeRef::Scalar(ScalarKind::U32), Value::U32(v)) => writer.write_varint(u64::from(*v)),
            (TypeRef::Scalar(ScalarKind::U64), Value::U64(v)) => writer.write_varint(*v),
            (TypeRef::Scalar(ScalarKind::F32), Value::F32(v)) => writer.write_fixed32(v.to_bits()),
            (TypeRef::Scalar(ScalarKind::F64), Value::F64(v)) => writer.write_fixed64(v.to_bits()),
            (TypeRef::Scalar(ScalarKind::Str), Value::Str(v)) => {
                writer.write_len_prefixed(v.as_bytes());
            }
            (TypeRef::Scalar(ScalarKind::Bytes), Value::Bytes(v)) => writer.write_len_prefixed(v),
            (TypeRef::Scalar(ScalarKind::Timestamp), Value::Timestamp(v)) => {
                writer.write_zigzag(*v);
            }
            (TypeRef::Scalar(ScalarKind::Duration), Value::Duration(v)) => writer.write_zigzag(*v),
            (TypeRef::Scalar(ScalarKind::Uuid), Value::Uuid(v)) => writer.write_len_prefixed(v),
            (TypeRef::Scalar(ScalarKind::Uri), Value::Uri(v)) => {
                writer.write_len_prefixed(v.as_bytes());
            }
            (TypeRef::Scalar(ScalarKind::Decimal), Value::Decimal(v)) => {
                writer.write_len_prefixed(v.as_bytes());
            }
            (TypeRef::Enum(_), Value::Enum(v)) => writer.write_zigzag(*v),
            (TypeRef::Named(_), Value::Struct(sv)) => {
                let mut nested = WireWriter::new();
                self.encode_struct_body(&mut nested, ty, sv)?;
                writer.write_len_prefixed(nested.bytes());
            }
            (TypeRef::Sequence(element), Value::Sequence(values)) => {
                let mut nested = WireWriter::new();
                nested.write_varint(values.len() as u64);
                for item in values {
                    self.encode_elem(&mut nested, element, item)?;
                }
                writer.write_len_prefixed(nested.bytes());
            }
            (TypeRef::Map(key_ty, value_ty), Value::Map(pairs)) => {
                let mut nested = WireWriter::new();
                nested.write_varint(pairs.len() as u64);
                for (key, val) in pairs {
                    self.encode_elem(&mut nested, key_ty, key)?;
                    self.encode_elem(&mut nested, value_ty, val)?;
                }
                writer.write_len_prefixed(nested.bytes());
            }
            (_, other) => {
                return Err(CodecError::TypeMismatch {
                    expected: ty.to_string(),
                    found: value_kind(other).to_string(),
                });
            }
        }
        Ok(())
    }

    fn decode_struct_body(
        &self,
        reader: &mut WireReader<'_>,
        declared: &TypeRef,
    ) -> CodecResult<StructValue> {
        let mut fields = HashMap::new();
        let actual = self.decode_level(reader, declared, &mut fields)?;
        Ok(StructValue { ty: actual, fields })
    }

    /// Decode one inheritance level; returns the deepest runtime type seen.
    fn decode_level(
        &self,
        reader: &mut WireReader<'_>,
        level: &TypeRef,
        fields: &mut HashMap<String, Value>,
    ) -> CodecResult<TypeRef> {
        let layout = self.layout_of(level);
        if layout.is_none() && !self.is_known(level) {
            return Err(CodecError::UnknownType {
                name: level.to_string(),
            });
        }

        let mut actual = level.clone();
        while !reader.is_eof() {
            let offset = reader.offset();
            let (tag, wire_type) = reader.read_key()?;
            if tag >= SUBTYPE_TAG_BASE {
                if wire_type != WireType::Len {
                    return Err(CodecError::InvalidKey {
                        offset,
                        key: ((tag as u64) << 3) | wire_type as u64,
                    });
                }
                let child = self
                    .children
                    .get(level)
                    .and_then(|entry| {
                        entry
                            .iter()
                            .find(|(child_tag, _)| *child_tag == tag)
                            .map(|(_, derived)| derived.clone())
                    })
                    .ok_or_else(|| CodecError::UnknownSubtypeTag {
                        base: level.to_string(),
                        tag,
                    })?;
                let payload = reader.read_len_prefixed()?;
                let mut nested = WireReader::new(payload);
                actual = self.decode_level(&mut nested, &child, fields)?;
            } else {
                let slot = layout
                    .as_ref()
                    .and_then(|l| l.slot_by_tag(tag))
                    .ok_or_else(|| CodecError::UnknownField {
                        type_name: level.to_string(),
                        tag,
                    })?;
                let expected = wire_type_for(&slot.element);
                if wire_type != expected {
                    return Err(CodecError::TypeMismatch {
                        expected: slot.element.to_string(),
                        found: format!("wire type {:?}", wire_type),
                    });
                }
                let value = self.decode_field_payload(reader, &slot.element)?;
                fields.insert(slot.name.clone(), value);
            }
        }

        if let Some(layout) = layout {
            for slot in &layout.fields {
                if fields.contains_key(&slot.name) {
                    continue;
                }
                match Value::default_for(&slot.element) {
                    Some(default) => {
                        fields.insert(slot.name.clone(), default);
                    }
                    None => {
                        return Err(CodecError::MissingField {
                            type_name: level.to_string(),
                            field: slot.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(actual)
    }

    fn decode_field_payload(
        &self,
        reader: &mut WireReader<'_>,
        ty: &TypeRef,
    ) -> CodecResult<Value> {
        match ty {
            TypeRef::Optional(inner) => self.decode_field_payload(reader, inner),
            _ => self.decode_bare(reader, ty),
        }
    }

    fn decode_elem(&self, reader: &mut WireReader<'_>, ty: &TypeRef) -> CodecResult<Value> {
        if let TypeRef::Optional(inner) = ty {
            let offset = reader.offset();
            return match reader.read_varint()? {
                0 => Ok(Value::Null),
                1 => self.decode_elem(reader, inner),
                _ => Err(CodecError::OutOfRange {
                    ty: ty.to_string(),
                    offset,
                }),
            };
        }
        self.decode_bare(reader, ty)
    }

    fn decode_bare(&self, reader: &mut WireReader<'_>, ty: &TypeRef) -> CodecResult<Value> {
        let offset = reader.offset();
        let out_of_range = |reader: &WireReader<'_>| CodecError::OutOfRange {
            ty: ty.to_string(),
            offset: reader.offset(),
        };
        let value = match ty {
            TypeRef::Scalar(kind) => match kind {
                ScalarKind::Bool => match reader.read_varint()? {
                    0 => Value::Bool(false),
                    1 => Value::Bool(true),
                    _ => return Err(out_of_range(reader)),
                },
                ScalarKind::I8 => {
                    let raw = reader.read_zigzag()?;
                    Value::I8(i8::try_from(raw).map_err(|_| out_of_range(reader))?)
                }
                ScalarKind::I16 => {
                    let raw = reader.read_zigzag()?;
                    Value::I16(i16::try_from(raw).map_err(|_| out_of_range(reader))?)
                }
                ScalarKind::I32 => {
                    let raw = reader.read_zigzag()?;
                    Value::I32(i32::try_from(raw).map_err(|_| out_of_range(reader))?)
                }
                ScalarKind::I64 => Value::I64(reader.read_zigzag()?),
                ScalarKind::U8 => {
                    let raw = reader.read_varint()?;
                    Value::U8(u8::try_from(raw).map_err(|_| out_of_range(reader))?)
                }
                ScalarKind::U16 => {
                    let raw = reader.read_varint()?;
                    Value::U16(u16::try_from(raw).map_err(|_| out_of_range(reader))?)
                }
                ScalarKind::U32 => {
                    let raw = reader.read_varint()?;
                    Value::U32(u32::try_from(raw).map_err(|_| out_of_range(reader))?)
                }
                ScalarKind::U64 => Value::U64(reader.read_varint()?),
                ScalarKind::F32 => Value::F32(f32::from_bits(reader.read_fixed32()?)),
                ScalarKind::F64 => Value::F64(f64::from_bits(reader.read_fixed64()?)),
                ScalarKind::Str => Value::Str(read_utf8(reader)?),
                ScalarKind::Bytes => Value::Bytes(reader.read_len_prefixed()?.to_vec()),
                ScalarKind::Timestamp => Value::Timestamp(reader.read_zigzag()?),
                ScalarKind::Duration => Value::Duration(reader.read_zigzag()?),
                ScalarKind::Uuid => {
                    let payload = reader.read_len_prefixed()?;
                    let bytes: [u8; 16] = payload.try_into().map_err(|_| CodecError::OutOfRange {
                        ty: ty.to_string(),
                        offset,
                    })?;
                    Value::Uuid(bytes)
                }
                ScalarKind::Uri => Value::Uri(read_utf8(reader)?),
                ScalarKind::Decimal => Value::Decimal(read_utf8(reader)?),
            },
            TypeRef::Enum(_) => Value::Enum(reader.read_zigzag()?),
            TypeRef::Named(_) => {
                let payload = reader.read_len_prefixed()?;
                let mut nested = WireReader::new(payload);
                Value::Struct(self.decode_struct_body(&mut nested, ty)?)
            }
            TypeRef::Sequence(element) => {
                let payload = reader.read_len_prefixed()?;
                let mut nested = WireReader::new(payload);
                let count = nested.read_varint()?;
                let mut values = Vec::new();
                for _ in 0..count {
                    values.push(self.decode_elem(&mut nested, element)?);
                }
                if !nested.is_eof() {
                    return Err(CodecError::TrailingBytes {
                        offset: nested.offset(),
                    });
                }
                Value::Sequence(values)
            }
            TypeRef::Map(key_ty, value_ty) => {
                let payload = reader.read_len_prefixed()?;
                let mut nested = WireReader::new(payload);
                let count = nested.read_varint()?;
                let mut pairs = Vec::new();
                for _ in 0..count {
                    let key = self.decode_elem(&mut nested, key_ty)?;
                    let value = self.decode_elem(&mut nested, value_ty)?;
                    pairs.push((key, value));
                }
                if !nested.is_eof() {
                    return Err(CodecError::TrailingBytes {
                        offset: nested.offset(),
                    });
                }
                Value::Map(pairs)
            }
            TypeRef::Optional(_) => {
                // Optionals are resolved by the field/element context above.
                return Err(CodecError::TypeMismatch {
                    expected: ty.to_string(),
                    found: "bare optional".to_string(),
                });
            }
        };
        Ok(value)
    }
}

impl TypeCodec for TagCodec {
    fn define_type(&self, ty: TypeRef, layout: TypeLayout) -> CodecResult<()> {
        for slot in &layout.fields {
            if slot.tag == 0 || slot.tag > MAX_MEMBER_TAG {
                return Err(CodecError::TagOverflow {
                    type_name: ty.to_string(),
                    tag: slot.tag,
                });
            }
        }
        log::trace!("[codec] define {} ({} fields)", ty, layout.fields.len());
        self.layouts.insert(ty, Arc::new(layout));
        Ok(())
    }

    fn define_subtype(&self, base: TypeRef, tag: u32, derived: TypeRef) -> CodecResult<()> {
        {
            let mut entry = self.children.entry(base.clone()).or_default();
            if let Some((_, existing)) = entry.iter().find(|(t, _)| *t == tag) {
                if *existing == derived {
                    return Ok(());
                }
                return Err(CodecError::SubtypeConflict {
                    base: base.to_string(),
                    tag,
                });
            }
            if entry.iter().any(|(_, d)| *d == derived) {
                return Err(CodecError::SubtypeConflict {
                    base: base.to_string(),
                    tag,
                });
            }
            entry.push((tag, derived.clone()));
        }
        log::trace!("[codec] subtype {} --{}--> {}", base, tag, derived);
        self.parents.insert(derived, (base, tag));
        Ok(())
    }

    fn is_defined(&self, ty: &TypeRef) -> bool {
        self.layouts.contains_key(ty)
    }
}

fn wire_type_for(ty: &TypeRef) -> WireType {
    match ty {
        TypeRef::Scalar(kind) => match kind {
            ScalarKind::F32 => WireType::Fixed32,
            ScalarKind::F64 => WireType::Fixed64,
            ScalarKind::Str
            | ScalarKind::Bytes
            | ScalarKind::Uuid
            | ScalarKind::Uri
            | ScalarKind::Decimal => WireType::Len,
            _ => WireType::Varint,
        },
        TypeRef::Enum(_) => WireType::Varint,
        TypeRef::Named(_) | TypeRef::Sequence(_) | TypeRef::Map(_, _) => WireType::Len,
        TypeRef::Optional(inner) => wire_type_for(inner),
    }
}

fn read_utf8(reader: &mut WireReader<'_>) -> CodecResult<String> {
    let offset = reader.offset();
    let payload = reader.read_len_prefixed()?;
    String::from_utf8(payload.to_vec()).map_err(|_| CodecError::InvalidUtf8 { offset })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "bool",
        Value::I8(_) => "int8",
        Value::I16(_) => "int16",
        Value::I32(_) => "int32",
        Value::I64(_) => "int64",
        Value::U8(_) => "uint8",
        Value::U16(_) => "uint16",
        Value::U32(_) => "uint32",
        Value::U64(_) => "uint64",
        Value::F32(_) => "float32",
        Value::F64(_) => "float64",
        Value::Str(_) => "string",
        Value::Bytes(_) => "bytes",
        Value::Timestamp(_) => "timestamp",
        Value::Duration(_) => "duration",
        Value::Uuid(_) => "uuid",
        Value::Uri(_) => "uri",
        Value::Decimal(_) => "decimal",
        Value::Enum(_) => "enum",
        Value::Struct(_) => "struct",
        Value::Sequence(_) => "sequence",
        Value::Map(_) => "map",
        Value::Null => "null",
    }
}
