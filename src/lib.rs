//! A binary codec built around the idea that a _schema_ — a specification
//! for what values are permitted and how they're encoded as raw bytes — is
//! a data structure manipulated programmatically at runtime, rather than a
//! Rust type derived at compile time. The wire format is modeled closely on
//! Apache Avro's binary encoding: zig-zag variable-length integers,
//! length-prefixed strings and byte strings, blocked array/map containers,
//! tagged unions, and a `decimal` logical type layered over `bytes`/`fixed`.
//!
//! Typical usage:
//!
//! - construct a [`Schema`] describing the shape of the data
//! - build a [`Datum`] conforming to it (or receive one by decoding)
//! - `Encoder::new(&schema, writer).encode(&datum)` to serialize
//! - `Decoder::new(&writer_schema, &reader_schema, reader).decode()` to
//!   deserialize, resolving the writer's schema against a possibly
//!   different reader's schema as it goes
//!
//! Schema parsing from a textual format and general-purpose schema
//! introspection beyond what [`Schema`] exposes directly are out of scope;
//! schemas are built programmatically.

pub mod decimal;
pub mod default;
pub mod error;
pub mod resolution;
pub mod schema;
pub mod stream;
pub mod validator;
pub mod value;
mod varint;

mod decoder;
mod encoder;

pub use crate::{
    decimal::Decimal,
    decoder::Decoder,
    default::materialize as materialize_default,
    encoder::Encoder,
    error::{Error, Result},
    resolution::compatible,
    schema::{DecimalAttrs, DefaultValue, Field, Schema, SchemaKind},
    stream::Stream,
    value::{Datum, EnumDatum, UnionDatum},
};
