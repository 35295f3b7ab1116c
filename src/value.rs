//! Dynamic representation of a value within the serialized data model,
//! analogous to `serde_json::Value`: a datum whose shape is dictated by a
//! schema rather than by a static Rust type.

use crate::decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Datum>),
    /// Insertion-ordered; the format gives no cross-block ordering guarantee
    /// beyond that.
    Map(Vec<(String, Datum)>),
    Union(Box<UnionDatum>),
    Enum(EnumDatum),
    /// Exactly `schema.size()` bytes.
    Fixed(Vec<u8>),
    Record(Vec<(String, Datum)>),
    Decimal(Decimal),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionDatum {
    pub branch_index: usize,
    pub value: Datum,
}

/// An enum symbol as supplied when building a datum to encode: either a
/// declared name or its ordinal, resolved against the writer's schema at
/// validate/encode time. Decoded datums always carry `Name`.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumDatum {
    Name(String),
    Ordinal(usize),
}

impl Datum {
    pub fn record(fields: impl IntoIterator<Item = (impl Into<String>, Datum)>) -> Self {
        Datum::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn map(fields: impl IntoIterator<Item = (impl Into<String>, Datum)>) -> Self {
        Datum::Map(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn union(branch_index: usize, value: Datum) -> Self {
        Datum::Union(Box::new(UnionDatum { branch_index, value }))
    }

    pub fn enum_name(name: impl Into<String>) -> Self {
        Datum::Enum(EnumDatum::Name(name.into()))
    }

    pub fn get_field(&self, name: &str) -> Option<&Datum> {
        match self {
            Datum::Record(fields) | Datum::Map(fields) =>
                fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Datum::Null => "null",
            Datum::Boolean(_) => "boolean",
            Datum::Int(_) => "int",
            Datum::Long(_) => "long",
            Datum::Float(_) => "float",
            Datum::Double(_) => "double",
            Datum::String(_) => "string",
            Datum::Bytes(_) => "bytes",
            Datum::Array(_) => "array",
            Datum::Map(_) => "map",
            Datum::Union(_) => "union",
            Datum::Enum(_) => "enum",
            Datum::Fixed(_) => "fixed",
            Datum::Record(_) => "record",
            Datum::Decimal(_) => "decimal",
        }
    }
}
