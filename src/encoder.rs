//! Encoder (C5): schema-directed recursive datum writer.

use crate::{
    decimal,
    default,
    error::{bail_mismatch, Error, Result},
    schema::Schema,
    validator,
    value::{Datum, EnumDatum},
    varint,
};
use std::io::Write;
use tracing::trace;

/// Encodes a value to a `std::io::Write` conforming to a schema. Stateless
/// between calls; holds only a reference to the schema and the stream.
pub struct Encoder<'s, W> {
    schema: &'s Schema,
    write: W,
}

impl<'s, W: Write> Encoder<'s, W> {
    pub fn new(schema: &'s Schema, write: W) -> Self {
        Encoder { schema, write }
    }

    /// Validate `datum` against the writer's schema, then serialize it.
    pub fn encode(&mut self, datum: &Datum) -> Result<()> {
        validator::validate(self.schema, datum)?;
        trace!(kind = self.schema.kind_str(), "encoding datum");
        write_value(self.schema, datum, &mut self.write)
    }

    pub fn into_inner(self) -> W {
        self.write
    }
}

/// Pick the lowest-index branch whose validator accepts `datum`, per spec:
/// "the writer chooses the lowest-index branch accepting the datum".
fn select_branch<'a>(branches: &'a [Schema], datum: &Datum) -> Option<(usize, &'a Schema)> {
    branches.iter().enumerate().find(|(_, b)| validator::validate(b, datum).is_ok())
}

fn write_value<W: Write>(schema: &Schema, datum: &Datum, w: &mut W) -> Result<()> {
    match (schema, datum) {
        (Schema::Null, Datum::Null) => Ok(()),
        (Schema::Boolean, &Datum::Boolean(b)) => {
            w.write_all(&[b as u8]).map_err(Error::from)
        }
        (Schema::Int, &Datum::Int(n)) => varint::write_int(w, n),
        (Schema::Long, &Datum::Long(n)) => varint::write_long(w, n),
        (Schema::Long, &Datum::Int(n)) => varint::write_long(w, n as i64),
        (Schema::Float, &Datum::Float(f)) => w.write_all(&f.to_le_bytes()).map_err(Error::from),
        (Schema::Double, &Datum::Double(d)) => w.write_all(&d.to_le_bytes()).map_err(Error::from),
        (Schema::String, Datum::String(s)) => write_bytes(w, s.as_bytes()),
        (Schema::Bytes { decimal: None }, Datum::Bytes(b)) => write_bytes(w, b),
        (Schema::Bytes { decimal: Some(attrs) }, Datum::Decimal(d)) => {
            decimal::check_precision(d.unscaled, attrs.precision)?;
            write_bytes(w, &decimal::encode_unscaled(d.unscaled))
        }
        (Schema::Array(elem), Datum::Array(items)) => write_array_block(elem, items, w),
        (Schema::Map(value_schema), Datum::Map(entries)) => write_map_block(value_schema, entries, w),
        (Schema::Union(branches), datum) => {
            // accept either the bare value or a pre-tagged `Datum::Union`;
            // the tag itself is never trusted, the branch is always
            // reselected from the inner value.
            let inner = match datum {
                Datum::Union(u) => &u.value,
                other => other,
            };
            let (index, branch) = select_branch(branches, inner).ok_or_else(|| {
                Error::mismatch("$", format!("no union branch accepts a {} value", inner.kind_str()))
            })?;
            varint::write_long(w, index as i64)?;
            write_value(branch, inner, w)
        }
        (Schema::Enum { symbols, .. }, Datum::Enum(e)) => {
            let ord = match e {
                EnumDatum::Name(name) => symbols.iter().position(|s| s == name),
                EnumDatum::Ordinal(i) => Some(*i),
            }
            .ok_or_else(|| Error::mismatch("$", "enum symbol not found in schema"))?;
            varint::write_int(w, ord as i32)
        }
        (Schema::Fixed { size, decimal: None, .. }, Datum::Fixed(bytes)) => {
            debug_assert_eq!(bytes.len(), *size);
            w.write_all(bytes).map_err(Error::from)
        }
        (Schema::Fixed { size, decimal: Some(attrs), .. }, Datum::Decimal(d)) => {
            decimal::check_precision(d.unscaled, attrs.precision)?;
            let bytes = decimal::encode_unscaled_fixed(d.unscaled, *size)?;
            w.write_all(&bytes).map_err(Error::from)
        }
        (Schema::Record { fields, .. }, Datum::Record(values))
        | (Schema::Error { fields, .. }, Datum::Record(values))
        | (Schema::Request { fields }, Datum::Record(values)) => {
            for field in fields {
                match values.iter().find(|(n, _)| n == &field.name) {
                    Some((_, value)) => write_value(&field.schema, value, w)?,
                    None => {
                        let default = field.default.as_ref().ok_or_else(|| {
                            Error::MissingDefault { field: field.name.clone() }
                        })?;
                        let materialized = default::materialize(&field.schema, default, &field.name)?;
                        write_value(&field.schema, &materialized, w)?
                    }
                }
            }
            Ok(())
        }
        (schema, datum) => bail_mismatch!(
            "$",
            "a {} value is not writable as a {}", datum.kind_str(), schema.kind_str(),
        ),
    }
}

fn write_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> Result<()> {
    varint::write_long(w, bytes.len() as i64)?;
    w.write_all(bytes).map_err(Error::from)
}

/// Emit array items as a single positive-count block followed by the `0`
/// terminator (spec allows multiple blocks but requires the terminator;
/// this encoder always uses one block, and never uses the size-prefixed
/// negative-count form on write).
fn write_array_block<W: Write>(elem: &Schema, items: &[Datum], w: &mut W) -> Result<()> {
    if !items.is_empty() {
        varint::write_long(w, items.len() as i64)?;
        for item in items {
            write_value(elem, item, w)?;
        }
    }
    varint::write_long(w, 0)
}

fn write_map_block<W: Write>(value_schema: &Schema, entries: &[(String, Datum)], w: &mut W) -> Result<()> {
    if !entries.is_empty() {
        varint::write_long(w, entries.len() as i64)?;
        for (key, value) in entries {
            write_bytes(w, key.as_bytes())?;
            write_value(value_schema, value, w)?;
        }
    }
    varint::write_long(w, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    fn encode(schema: &Schema, datum: &Datum) -> Vec<u8> {
        let mut buf = Vec::new();
        Encoder::new(schema, &mut buf).encode(datum).unwrap();
        buf
    }

    #[test]
    fn test_s1_record_roundtrip_bytes() {
        let schema = Schema::Record {
            name: "R".into(),
            fields: vec![
                Field { name: "a".into(), schema: Schema::Int, default: None },
                Field { name: "b".into(), schema: Schema::String, default: None },
            ],
        };
        let datum = Datum::record([("a", Datum::Int(42)), ("b", Datum::String("hi".into()))]);
        let bytes = encode(&schema, &datum);
        assert_eq!(bytes, vec![0x54, 0x04, b'h', b'i']);
    }

    #[test]
    fn test_s3_blocked_array() {
        let schema = Schema::Array(Box::new(Schema::Int));
        let datum = Datum::Array(vec![Datum::Int(1), Datum::Int(2), Datum::Int(3)]);
        let bytes = encode(&schema, &datum);
        assert_eq!(bytes, vec![0x06, 0x02, 0x04, 0x06, 0x00]);
    }

    #[test]
    fn test_s5_decimal() {
        let schema = Schema::Bytes {
            decimal: Some(crate::schema::DecimalAttrs { precision: 5, scale: 2 }),
        };
        let datum = Datum::Decimal(crate::decimal::Decimal { unscaled: 123, scale: 2 });
        let bytes = encode(&schema, &datum);
        assert_eq!(bytes, vec![0x02, 0x7B]);
    }

    #[test]
    fn test_empty_array_is_just_terminator() {
        let schema = Schema::Array(Box::new(Schema::Int));
        let bytes = encode(&schema, &Datum::Array(vec![]));
        assert_eq!(bytes, vec![0x00]);
    }

    #[test]
    fn test_union_picks_lowest_index_accepting_branch() {
        // both Null and a hypothetical always-true branch could accept; here
        // only Long accepts a Long datum so it must pick index 1.
        let schema = Schema::Union(vec![Schema::Null, Schema::Long]);
        let bytes = encode(&schema, &Datum::union(1, Datum::Long(7)));
        // index 1 as a long => zigzag(1)=2=0x02, then value 7 => zigzag(7)=14=0x0E
        assert_eq!(bytes, vec![0x02, 0x0E]);
    }
}
