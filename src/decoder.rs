//! Decoder (C6): schema-resolved recursive datum reader.
//!
//! A decoder reads against two schemas at once: the writer's (what the
//! bytes were actually encoded with) and the reader's (what the caller
//! wants back). The two need not match field-for-field; [`resolution`]
//! gates what's allowed, and the recursive read itself absorbs reader
//! unions, applies numeric promotion, skips writer fields the reader
//! doesn't want, and fills reader fields the writer never sent from their
//! declared defaults.

use crate::{
    decimal,
    default,
    error::{bail_mismatch, Error, Result},
    resolution,
    schema::Schema,
    value::Datum,
    varint,
};
use std::io::{Read, Seek, SeekFrom};
use tracing::{debug, trace};

/// Reads values written against `writer_schema` back out shaped like
/// `reader_schema`. When the two are identical this is an ordinary decode;
/// when they differ, this performs schema resolution as it goes. Requires
/// `Seek` in addition to `Read`: the skip path (a reader field the writer
/// sent but the reader doesn't want) jumps over skippable blocks and
/// fixed-size payloads rather than reading them into memory.
pub struct Decoder<'s, R> {
    writer_schema: &'s Schema,
    reader_schema: &'s Schema,
    read: R,
}

impl<'s, R: Read + Seek> Decoder<'s, R> {
    pub fn new(writer_schema: &'s Schema, reader_schema: &'s Schema, read: R) -> Self {
        Decoder { writer_schema, reader_schema, read }
    }

    pub fn decode(&mut self) -> Result<Datum> {
        if !resolution::compatible(self.writer_schema, self.reader_schema) {
            return Err(Error::SchemaIncompatible {
                writer: self.writer_schema.kind_str().to_string(),
                reader: self.reader_schema.kind_str().to_string(),
            });
        }
        trace!(
            writer = self.writer_schema.kind_str(),
            reader = self.reader_schema.kind_str(),
            "decoding datum",
        );
        read_value(self.writer_schema, self.reader_schema, &mut self.read)
    }

    pub fn into_inner(self) -> R {
        self.read
    }
}

/// Reads one value shaped by `writer` off the stream, resolved into the
/// shape `reader` expects.
fn read_value<R: Read + Seek>(writer: &Schema, reader: &Schema, r: &mut R) -> Result<Datum> {
    // a writer union is always unwrapped first: read its index, then
    // recurse against the chosen branch as a concrete writer schema. Any
    // tagging of the resulting datum is the reader union's job below, not
    // this one's, so the writer's branch index itself is not retained.
    if let Schema::Union(writer_branches) = writer {
        let index = varint::read_long(r)? as usize;
        let branch = writer_branches.get(index).ok_or_else(|| {
            Error::mismatch("$", format!("union branch index {} out of range", index))
        })?;
        return read_value(branch, reader, r);
    }

    // a reader union the writer doesn't mirror: find the first reader
    // branch the (now concrete) writer schema resolves against, then
    // recurse with that branch as the new reader.
    if let Schema::Union(reader_branches) = reader {
        let (index, branch) = reader_branches
            .iter()
            .enumerate()
            .find(|(_, b)| resolution::compatible(writer, b))
            .ok_or_else(|| Error::SchemaIncompatible {
                writer: writer.kind_str().to_string(),
                reader: reader.kind_str().to_string(),
            })?;
        debug!(writer = writer.kind_str(), "absorbing writer value into reader union");
        let value = read_value(writer, branch, r)?;
        return Ok(Datum::union(index, value));
    }

    match writer {
        Schema::Null => Ok(Datum::Null),
        Schema::Boolean => {
            let mut buf = [0u8; 1];
            r.read_exact(&mut buf)?;
            Ok(Datum::Boolean(buf[0] == 1))
        }
        Schema::Int => {
            let n = varint::read_int(r)?;
            Ok(promote_int(n, reader))
        }
        Schema::Long => {
            let n = varint::read_long(r)?;
            Ok(promote_long(n, reader))
        }
        Schema::Float => {
            let mut buf = [0u8; 4];
            r.read_exact(&mut buf)?;
            Ok(promote_float(f32::from_le_bytes(buf), reader))
        }
        Schema::Double => {
            let mut buf = [0u8; 8];
            r.read_exact(&mut buf)?;
            Ok(Datum::Double(f64::from_le_bytes(buf)))
        }
        Schema::String => Ok(Datum::String(String::from_utf8(read_bytes(r)?).map_err(|e| {
            Error::mismatch("$", format!("string is not valid utf-8: {}", e))
        })?)),
        Schema::Bytes { decimal: None } => Ok(Datum::Bytes(read_bytes(r)?)),
        Schema::Bytes { decimal: Some(attrs) } => {
            let raw = read_bytes(r)?;
            let unscaled = decimal::decode_unscaled(&raw)?;
            Ok(Datum::Decimal(decimal::Decimal { unscaled, scale: attrs.scale }))
        }
        Schema::Array(writer_elem) => {
            let reader_elem = reader.element().unwrap_or(writer_elem);
            let mut items = Vec::new();
            read_blocked(r, |r| {
                items.push(read_value(writer_elem, reader_elem, r)?);
                Ok(())
            })?;
            Ok(Datum::Array(items))
        }
        Schema::Map(writer_value) => {
            let reader_value = reader.value_type().unwrap_or(writer_value);
            let mut entries = Vec::new();
            read_blocked(r, |r| {
                let key = String::from_utf8(read_bytes(r)?)
                    .map_err(|e| Error::mismatch("$", format!("map key is not valid utf-8: {}", e)))?;
                let value = read_value(writer_value, reader_value, r)?;
                entries.push((key, value));
                Ok(())
            })?;
            Ok(Datum::Map(entries))
        }
        // unions are unwrapped before this match is reached.
        Schema::Union(_) => unreachable!("writer union handled above"),
        Schema::Enum { symbols: writer_symbols, .. } => {
            let ord = varint::read_int(r)? as usize;
            let name = writer_symbols
                .get(ord)
                .ok_or_else(|| Error::mismatch("$", format!("enum ordinal {} out of range", ord)))?;
            if reader.kind() == crate::schema::SchemaKind::Enum && !reader.has_symbol(name) {
                bail_mismatch!("$", "reader enum has no symbol named {:?}", name);
            }
            Ok(Datum::enum_name(name.clone()))
        }
        Schema::Fixed { size, decimal: None, .. } => {
            let mut buf = vec![0u8; *size];
            r.read_exact(&mut buf)?;
            Ok(Datum::Fixed(buf))
        }
        Schema::Fixed { size, decimal: Some(attrs), .. } => {
            let mut buf = vec![0u8; *size];
            r.read_exact(&mut buf)?;
            let unscaled = decimal::decode_unscaled_fixed(&buf)?;
            Ok(Datum::Decimal(decimal::Decimal { unscaled, scale: attrs.scale }))
        }
        Schema::Record { fields: writer_fields, .. }
        | Schema::Error { fields: writer_fields, .. }
        | Schema::Request { fields: writer_fields } => {
            let reader_fields = reader.fields_by_name();
            let mut values = Vec::with_capacity(writer_fields.len().max(reader.fields().len()));
            let mut seen = std::collections::HashSet::new();
            for field in writer_fields {
                match reader_fields.get(field.name.as_str()) {
                    Some(reader_field) => {
                        let value = read_value(&field.schema, &reader_field.schema, r)?;
                        values.push((field.name.clone(), value));
                        seen.insert(field.name.as_str());
                    }
                    None => skip_value(&field.schema, r)?,
                }
            }
            for reader_field in reader.fields() {
                if seen.contains(reader_field.name.as_str()) {
                    continue;
                }
                let default = reader_field
                    .default
                    .as_ref()
                    .ok_or_else(|| Error::MissingDefault { field: reader_field.name.clone() })?;
                let value = default::materialize(&reader_field.schema, default, &reader_field.name)?;
                values.push((reader_field.name.clone(), value));
            }
            Ok(Datum::Record(values))
        }
    }
}

fn promote_int(n: i32, reader: &Schema) -> Datum {
    match reader {
        Schema::Long => Datum::Long(n as i64),
        Schema::Float => Datum::Float(n as f32),
        Schema::Double => Datum::Double(n as f64),
        _ => Datum::Int(n),
    }
}

fn promote_long(n: i64, reader: &Schema) -> Datum {
    match reader {
        Schema::Float => Datum::Float(n as f32),
        Schema::Double => Datum::Double(n as f64),
        _ => Datum::Long(n),
    }
}

fn promote_float(f: f32, reader: &Schema) -> Datum {
    match reader {
        Schema::Double => Datum::Double(f as f64),
        _ => Datum::Float(f),
    }
}

fn read_bytes<R: Read>(r: &mut R) -> Result<Vec<u8>> {
    let len = varint::read_long(r)?;
    let len = usize::try_from(len)
        .map_err(|_| Error::mismatch("$", format!("negative byte length {}", len)))?;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

/// Drive the blocked-container protocol: repeated `(count, items...)`
/// blocks terminated by a `0` count. A negative count is followed by the
/// block's byte size, which this reads past without needing it, since
/// `on_item` always consumes exactly one item's worth of bytes itself.
fn read_blocked<R: Read>(r: &mut R, mut on_item: impl FnMut(&mut R) -> Result<()>) -> Result<()> {
    loop {
        let count = varint::read_long(r)?;
        if count == 0 {
            return Ok(());
        }
        let count = if count < 0 {
            let _byte_size = varint::read_long(r)?;
            -count
        } else {
            count
        };
        for _ in 0..count {
            on_item(r)?;
        }
    }
}

fn seek_skip<R: Seek>(r: &mut R, nbytes: i64) -> Result<()> {
    r.seek(SeekFrom::Current(nbytes))?;
    Ok(())
}

/// Consume and discard a value of the given writer schema, for a field the
/// reader schema doesn't declare. Needs no knowledge of the reader: lengths
/// and block counts are self-describing from the writer schema alone.
/// Jumps over payloads with `Seek` rather than reading them into memory
/// wherever the wire format makes the byte length knowable up front — which
/// is exactly what the negative-count block form exists for.
pub fn skip_value<R: Read + Seek>(schema: &Schema, r: &mut R) -> Result<()> {
    match schema {
        Schema::Null => Ok(()),
        Schema::Boolean => seek_skip(r, 1),
        Schema::Int | Schema::Long => varint::read_long(r).map(|_| ()),
        Schema::Float => seek_skip(r, 4),
        Schema::Double => seek_skip(r, 8),
        Schema::String | Schema::Bytes { .. } => {
            let len = varint::read_long(r)?;
            seek_skip(r, len)
        }
        Schema::Array(elem) => skip_blocked(r, |r| skip_value(elem, r)),
        Schema::Map(value_schema) => skip_blocked(r, |r| {
            let len = varint::read_long(r)?;
            seek_skip(r, len)?;
            skip_value(value_schema, r)
        }),
        Schema::Union(branches) => {
            let index = varint::read_long(r)? as usize;
            let branch = branches
                .get(index)
                .ok_or_else(|| Error::mismatch("$", format!("union branch index {} out of range", index)))?;
            skip_value(branch, r)
        }
        Schema::Enum { .. } => varint::read_int(r).map(|_| ()),
        Schema::Fixed { size, .. } => seek_skip(r, *size as i64),
        Schema::Record { fields, .. } | Schema::Error { fields, .. } | Schema::Request { fields } => {
            for field in fields {
                skip_value(&field.schema, r)?;
            }
            Ok(())
        }
    }
}

/// Like [`read_blocked`], but skips a negative-count block's entire byte
/// span in one `seek` instead of discarding items one at a time.
fn skip_blocked<R: Read + Seek>(r: &mut R, mut skip_item: impl FnMut(&mut R) -> Result<()>) -> Result<()> {
    loop {
        let count = varint::read_long(r)?;
        if count == 0 {
            return Ok(());
        }
        if count < 0 {
            let byte_size = varint::read_long(r)?;
            seek_skip(r, byte_size)?;
        } else {
            for _ in 0..count {
                skip_item(r)?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;
    use crate::schema::{DefaultValue, Field};
    use std::io::Cursor;

    fn roundtrip_same_schema(schema: &Schema, datum: &Datum) -> Datum {
        let mut buf = Vec::new();
        Encoder::new(schema, &mut buf).encode(datum).unwrap();
        Decoder::new(schema, schema, Cursor::new(buf)).decode().unwrap()
    }

    #[test]
    fn test_s1_record_roundtrip() {
        let schema = Schema::Record {
            name: "R".into(),
            fields: vec![
                Field { name: "a".into(), schema: Schema::Int, default: None },
                Field { name: "b".into(), schema: Schema::String, default: None },
            ],
        };
        let datum = Datum::record([("a", Datum::Int(42)), ("b", Datum::String("hi".into()))]);
        assert_eq!(roundtrip_same_schema(&schema, &datum), datum);
    }

    #[test]
    fn test_s3_array_roundtrip() {
        let schema = Schema::Array(Box::new(Schema::Int));
        let datum = Datum::Array(vec![Datum::Int(1), Datum::Int(2), Datum::Int(3)]);
        assert_eq!(roundtrip_same_schema(&schema, &datum), datum);
    }

    #[test]
    fn test_s5_decimal_roundtrip() {
        let schema = Schema::Bytes {
            decimal: Some(crate::schema::DecimalAttrs { precision: 5, scale: 2 }),
        };
        let datum = Datum::Decimal(decimal::Decimal { unscaled: 123, scale: 2 });
        assert_eq!(roundtrip_same_schema(&schema, &datum), datum);
    }

    #[test]
    fn test_int_promotes_to_long_across_schemas() {
        let writer = Schema::Int;
        let reader = Schema::Long;
        let mut buf = Vec::new();
        Encoder::new(&writer, &mut buf).encode(&Datum::Int(7)).unwrap();
        let datum = Decoder::new(&writer, &reader, Cursor::new(buf)).decode().unwrap();
        assert_eq!(datum, Datum::Long(7));
    }

    #[test]
    fn test_reader_field_default_fills_missing_writer_field() {
        let writer = Schema::Record {
            name: "R".into(),
            fields: vec![Field { name: "a".into(), schema: Schema::Int, default: None }],
        };
        let reader = Schema::Record {
            name: "R".into(),
            fields: vec![
                Field { name: "a".into(), schema: Schema::Int, default: None },
                Field {
                    name: "b".into(),
                    schema: Schema::String,
                    default: Some(DefaultValue::String("x".into())),
                },
            ],
        };
        let mut buf = Vec::new();
        Encoder::new(&writer, &mut buf).encode(&Datum::record([("a", Datum::Int(1))])).unwrap();
        let datum = Decoder::new(&writer, &reader, Cursor::new(buf)).decode().unwrap();
        assert_eq!(
            datum,
            Datum::record([("a", Datum::Int(1)), ("b", Datum::String("x".into()))]),
        );
    }

    #[test]
    fn test_writer_field_absent_from_reader_is_skipped() {
        let writer = Schema::Record {
            name: "R".into(),
            fields: vec![
                Field { name: "a".into(), schema: Schema::Int, default: None },
                Field { name: "extra".into(), schema: Schema::String, default: None },
            ],
        };
        let reader = Schema::Record {
            name: "R".into(),
            fields: vec![Field { name: "a".into(), schema: Schema::Int, default: None }],
        };
        let mut buf = Vec::new();
        Encoder::new(&writer, &mut buf)
            .encode(&Datum::record([("a", Datum::Int(1)), ("extra", Datum::String("drop me".into()))]))
            .unwrap();
        let datum = Decoder::new(&writer, &reader, Cursor::new(buf)).decode().unwrap();
        assert_eq!(datum, Datum::record([("a", Datum::Int(1))]));
    }

    #[test]
    fn test_missing_default_is_an_error() {
        let writer = Schema::Record { name: "R".into(), fields: vec![] };
        let reader = Schema::Record {
            name: "R".into(),
            fields: vec![Field { name: "b".into(), schema: Schema::String, default: None }],
        };
        let buf: Vec<u8> = Vec::new();
        let result = Decoder::new(&writer, &reader, Cursor::new(buf)).decode();
        assert!(matches!(result, Err(Error::MissingDefault { field }) if field == "b"));
    }

    #[test]
    fn test_writer_not_union_reader_union_absorbs() {
        let writer = Schema::Long;
        let reader = Schema::Union(vec![Schema::Null, Schema::Long]);
        let mut buf = Vec::new();
        Encoder::new(&writer, &mut buf).encode(&Datum::Long(9)).unwrap();
        let datum = Decoder::new(&writer, &reader, Cursor::new(buf)).decode().unwrap();
        assert_eq!(datum, Datum::union(1, Datum::Long(9)));
    }

    #[test]
    fn test_incompatible_schemas_rejected() {
        let writer = Schema::String;
        let reader = Schema::Long;
        let buf: Vec<u8> = Vec::new();
        assert!(Decoder::new(&writer, &reader, Cursor::new(buf)).decode().is_err());
    }

    #[test]
    fn test_enum_ordinal_not_in_reader_is_an_error() {
        let writer = Schema::Enum { name: "Suit".into(), symbols: vec!["SPADES".into(), "HEARTS".into()] };
        let reader = Schema::Enum { name: "Suit".into(), symbols: vec!["SPADES".into()] };
        let mut buf = Vec::new();
        Encoder::new(&writer, &mut buf).encode(&Datum::enum_name("HEARTS")).unwrap();
        let result = Decoder::new(&writer, &reader, Cursor::new(buf)).decode();
        assert!(result.is_err());
    }
}
