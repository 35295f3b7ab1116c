//! Data types for representing a schema.
//!
//! Schema parsing and general-purpose structural introspection are treated
//! as an external collaborator by this codec (see crate docs): this module
//! supplies a concrete, programmatically-constructed representation of that
//! interface (mirroring the teacher lineage's own `schema.rs`, a tagged
//! recursive enum), not a parser for any textual schema format.

use crate::value::Datum;
use std::collections::HashMap;

/// Description of how raw binary data encodes a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    /// UTF-8 string.
    String,
    /// Byte string, optionally refined by the `decimal` logical type.
    Bytes { decimal: Option<DecimalAttrs> },
    /// Homogenous variable-length sequence.
    Array(Box<Schema>),
    /// String-keyed homogenous mapping.
    Map(Box<Schema>),
    /// Tagged union of alternatives, resolved at read/write time.
    Union(Vec<Schema>),
    /// Tagged symbol out of a declared, ordered set.
    Enum { name: String, symbols: Vec<String> },
    /// Fixed-size byte sequence, optionally refined by `decimal`.
    Fixed { name: String, size: usize, decimal: Option<DecimalAttrs> },
    /// Named, ordered sequence of fields.
    Record { name: String, fields: Vec<Field> },
    /// Treated identically to `Record` everywhere in this codec.
    Error { name: String, fields: Vec<Field> },
    /// Treated identically to `Record`, except the schema matcher considers
    /// any two `Request` schemas compatible regardless of field shape (see
    /// DESIGN.md for why this permissiveness is kept).
    Request { fields: Vec<Field> },
}

/// `decimal` logical-type attributes attached to a `bytes` or `fixed`
/// schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalAttrs {
    pub precision: u32,
    pub scale: u32,
}

/// One field of a `record`/`error`/`request` schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
    pub default: Option<DefaultValue>,
}

/// A field or union-branch default, as declared in the schema (JSON-shaped,
/// the way Avro schemas declare them) rather than already materialized as a
/// `Datum` — materializing happens via `default::materialize`.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<DefaultValue>),
    Object(Vec<(String, DefaultValue)>),
}

/// The tag of a `Schema`, exposed as `Schema::kind()` per the external
/// Schema interface this codec consumes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SchemaKind {
    Null, Boolean, Int, Long, Float, Double, String, Bytes,
    Array, Map, Union, Enum, Fixed, Record, Error, Request,
}

impl Schema {
    pub fn kind(&self) -> SchemaKind {
        match self {
            Schema::Null => SchemaKind::Null,
            Schema::Boolean => SchemaKind::Boolean,
            Schema::Int => SchemaKind::Int,
            Schema::Long => SchemaKind::Long,
            Schema::Float => SchemaKind::Float,
            Schema::Double => SchemaKind::Double,
            Schema::String => SchemaKind::String,
            Schema::Bytes { .. } => SchemaKind::Bytes,
            Schema::Array(_) => SchemaKind::Array,
            Schema::Map(_) => SchemaKind::Map,
            Schema::Union(_) => SchemaKind::Union,
            Schema::Enum { .. } => SchemaKind::Enum,
            Schema::Fixed { .. } => SchemaKind::Fixed,
            Schema::Record { .. } => SchemaKind::Record,
            Schema::Error { .. } => SchemaKind::Error,
            Schema::Request { .. } => SchemaKind::Request,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self.kind() {
            SchemaKind::Null => "null",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Int => "int",
            SchemaKind::Long => "long",
            SchemaKind::Float => "float",
            SchemaKind::Double => "double",
            SchemaKind::String => "string",
            SchemaKind::Bytes => "bytes",
            SchemaKind::Array => "array",
            SchemaKind::Map => "map",
            SchemaKind::Union => "union",
            SchemaKind::Enum => "enum",
            SchemaKind::Fixed => "fixed",
            SchemaKind::Record => "record",
            SchemaKind::Error => "error",
            SchemaKind::Request => "request",
        }
    }

    /// Element schema of an `array`.
    pub fn element(&self) -> Option<&Schema> {
        match self {
            Schema::Array(inner) => Some(inner),
            _ => None,
        }
    }

    /// Value schema of a `map`.
    pub fn value_type(&self) -> Option<&Schema> {
        match self {
            Schema::Map(inner) => Some(inner),
            _ => None,
        }
    }

    /// Branches of a `union`, in declared order.
    pub fn branches(&self) -> &[Schema] {
        match self {
            Schema::Union(branches) => branches,
            _ => &[],
        }
    }

    pub fn branch_at(&self, i: usize) -> Option<&Schema> {
        self.branches().get(i)
    }

    /// Declared symbols of an `enum`, in ordinal order.
    pub fn symbols(&self) -> &[String] {
        match self {
            Schema::Enum { symbols, .. } => symbols,
            _ => &[],
        }
    }

    pub fn symbol_at(&self, i: usize) -> Option<&str> {
        self.symbols().get(i).map(String::as_str)
    }

    pub fn symbol_index(&self, name: &str) -> Option<usize> {
        self.symbols().iter().position(|s| s == name)
    }

    pub fn has_symbol(&self, name: &str) -> bool {
        self.symbol_index(name).is_some()
    }

    /// Byte length of a `fixed`.
    pub fn size(&self) -> Option<usize> {
        match self {
            Schema::Fixed { size, .. } => Some(*size),
            _ => None,
        }
    }

    /// Fields of a `record`/`error`/`request`, in declared (wire) order.
    pub fn fields(&self) -> &[Field] {
        match self {
            Schema::Record { fields, .. }
            | Schema::Error { fields, .. }
            | Schema::Request { fields } => fields,
            _ => &[],
        }
    }

    pub fn fields_by_name(&self) -> HashMap<&str, &Field> {
        self.fields().iter().map(|f| (f.name.as_str(), f)).collect()
    }

    /// The logical type name, if any (only `"decimal"` is recognized).
    pub fn logical_type(&self) -> Option<&str> {
        match self {
            Schema::Bytes { decimal: Some(_) } | Schema::Fixed { decimal: Some(_), .. } =>
                Some("decimal"),
            _ => None,
        }
    }

    pub fn decimal_attrs(&self) -> Option<DecimalAttrs> {
        match self {
            Schema::Bytes { decimal } => *decimal,
            Schema::Fixed { decimal, .. } => *decimal,
            _ => None,
        }
    }

    /// Extra (non-core) attributes of an annotated type: for `decimal`,
    /// `precision` and `scale`.
    pub fn extra_attrs(&self) -> Vec<(&'static str, String)> {
        match self.decimal_attrs() {
            Some(DecimalAttrs { precision, scale }) =>
                vec![("precision", precision.to_string()), ("scale", scale.to_string())],
            None => Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        if name == "name" {
            return self.fullname().map(String::from);
        }
        self.extra_attrs().into_iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Name used for structural comparison (named types only).
    pub fn fullname(&self) -> Option<&str> {
        match self {
            Schema::Enum { name, .. } | Schema::Fixed { name, .. }
            | Schema::Record { name, .. } | Schema::Error { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Convenience wrapper over the validator (C4), matching the external
    /// interface's `is_valid_datum`.
    pub fn is_valid_datum(&self, datum: &Datum) -> bool {
        crate::validator::validate(self, datum).is_ok()
    }
}
