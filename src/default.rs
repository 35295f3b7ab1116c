//! Default-value materialization, shared between the encoder (substituting
//! a default for a field the caller's datum omits) and the decoder
//! (filling in a reader field the writer didn't send).
//!
//! A dedicated traversal mirrors the schema recursion and is reused
//! wherever a default may appear: record fields, and the first branch of a
//! union.

use crate::{
    error::{bail_mismatch, Result},
    schema::{DefaultValue, Schema},
    value::Datum,
};

/// Produce a materialized `Datum` from a default declaration, recursing in
/// lockstep with `schema`. The default is assumed to already be
/// structurally valid against `schema` (an invariant of well-formed
/// schemas, not re-checked here).
pub fn materialize(schema: &Schema, default: &DefaultValue, path: &str) -> Result<Datum> {
    Ok(match (schema, default) {
        (Schema::Null, DefaultValue::Null) => Datum::Null,
        (Schema::Boolean, DefaultValue::Bool(b)) => Datum::Boolean(*b),
        (Schema::Int, DefaultValue::Int(n)) => Datum::Int(*n as i32),
        (Schema::Long, DefaultValue::Int(n)) => Datum::Long(*n),
        (Schema::Float, DefaultValue::Float(f)) => Datum::Float(*f as f32),
        (Schema::Float, DefaultValue::Int(n)) => Datum::Float(*n as f32),
        (Schema::Double, DefaultValue::Float(f)) => Datum::Double(*f),
        (Schema::Double, DefaultValue::Int(n)) => Datum::Double(*n as f64),
        (Schema::String, DefaultValue::String(s)) => Datum::String(s.clone()),
        (Schema::Bytes { .. }, DefaultValue::Bytes(b)) => Datum::Bytes(b.clone()),
        (Schema::Fixed { .. }, DefaultValue::Bytes(b)) => Datum::Fixed(b.clone()),
        (Schema::Enum { .. }, DefaultValue::String(s)) => Datum::enum_name(s.clone()),
        (Schema::Array(elem), DefaultValue::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(materialize(elem, item, &format!("{}[{}]", path, i))?);
            }
            Datum::Array(out)
        }
        (Schema::Map(value_schema), DefaultValue::Object(entries)) => {
            let mut out = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                out.push((key.clone(), materialize(value_schema, value, &format!("{}.{}", path, key))?));
            }
            Datum::Map(out)
        }
        // per spec: a union default applies to the first branch
        (Schema::Union(branches), default) => {
            let first = branches.first().ok_or_else(|| {
                crate::error::Error::mismatch(path, "union has no branches for a default")
            })?;
            Datum::union(0, materialize(first, default, path)?)
        }
        (Schema::Record { fields, .. }, DefaultValue::Object(entries))
        | (Schema::Error { fields, .. }, DefaultValue::Object(entries))
        | (Schema::Request { fields }, DefaultValue::Object(entries)) => {
            let mut out = Vec::with_capacity(fields.len());
            for field in fields {
                let value = match entries.iter().find(|(n, _)| n == &field.name) {
                    Some((_, v)) => materialize(&field.schema, v, &format!("{}.{}", path, field.name))?,
                    None => match &field.default {
                        Some(d) => materialize(&field.schema, d, &format!("{}.{}", path, field.name))?,
                        None => bail_mismatch!(path, "default for field {:?} is incomplete", field.name),
                    },
                };
                out.push((field.name.clone(), value));
            }
            Datum::Record(out)
        }
        (schema, _) => bail_mismatch!(
            path,
            "default value declaration does not match schema kind {}", schema.kind_str(),
        ),
    })
}
