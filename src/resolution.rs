//! Schema matcher (C7): structural compatibility plus numeric promotion.
//!
//! Compares names and type tags, not deep structural equivalence of nested
//! records — deeper mismatches surface as read failures when recursion
//! reaches them (spec note).

use crate::schema::{Schema, SchemaKind};

/// Returns true iff `writer` may be read with `reader` per the
/// compatibility matrix.
pub fn compatible(writer: &Schema, reader: &Schema) -> bool {
    use SchemaKind::*;
    if writer.kind() == Union || reader.kind() == Union {
        return true;
    }
    match (writer.kind(), reader.kind()) {
        (a, b) if a == b => match a {
            Array => compatible(writer.element().unwrap(), reader.element().unwrap()),
            Map => compatible(writer.value_type().unwrap(), reader.value_type().unwrap()),
            Enum => writer.fullname() == reader.fullname(),
            Fixed => writer.fullname() == reader.fullname() && writer.size() == reader.size(),
            Record | Error => writer.fullname() == reader.fullname(),
            Request => true,
            _ => true,
        },
        (Int, Long | Float | Double) => true,
        (Long, Float | Double) => true,
        (Float, Double) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    #[test]
    fn test_same_primitive_always_compatible() {
        assert!(compatible(&Schema::Int, &Schema::Int));
        assert!(compatible(&Schema::String, &Schema::String));
    }

    #[test]
    fn test_promotion_matrix() {
        assert!(compatible(&Schema::Int, &Schema::Long));
        assert!(compatible(&Schema::Int, &Schema::Float));
        assert!(compatible(&Schema::Int, &Schema::Double));
        assert!(compatible(&Schema::Long, &Schema::Float));
        assert!(compatible(&Schema::Long, &Schema::Double));
        assert!(compatible(&Schema::Float, &Schema::Double));
        assert!(!compatible(&Schema::Double, &Schema::Float));
        assert!(!compatible(&Schema::Long, &Schema::Int));
    }

    #[test]
    fn test_union_always_compatible_either_side() {
        assert!(compatible(&Schema::Union(vec![Schema::Null, Schema::Long]), &Schema::Long));
        assert!(compatible(&Schema::Int, &Schema::Union(vec![Schema::Null, Schema::Long])));
    }

    #[test]
    fn test_array_requires_compatible_elements() {
        let a = Schema::Array(Box::new(Schema::Int));
        let b = Schema::Array(Box::new(Schema::Long));
        let c = Schema::Array(Box::new(Schema::String));
        assert!(compatible(&a, &b));
        assert!(!compatible(&a, &c));
    }

    #[test]
    fn test_named_types_require_matching_fullname() {
        let a = Schema::Record { name: "A".into(), fields: vec![] };
        let b = Schema::Record { name: "B".into(), fields: vec![] };
        assert!(!compatible(&a, &b));
        assert!(compatible(&a, &a.clone()));
    }

    #[test]
    fn test_enum_requires_matching_fullname() {
        let a = Schema::Enum { name: "Suit".into(), symbols: vec!["SPADES".into()] };
        let b = Schema::Enum { name: "Suit".into(), symbols: vec!["SPADES".into(), "HEARTS".into()] };
        assert!(compatible(&a, &b));
    }

    #[test]
    fn test_fixed_requires_name_and_size() {
        let a = Schema::Fixed { name: "Md5".into(), size: 16, decimal: None };
        let b = Schema::Fixed { name: "Md5".into(), size: 8, decimal: None };
        assert!(!compatible(&a, &b));
    }

    #[test]
    fn test_request_always_compatible() {
        let a = Schema::Request { fields: vec![Field { name: "x".into(), schema: Schema::Int, default: None }] };
        let b = Schema::Request { fields: vec![] };
        assert!(compatible(&a, &b));
    }
}
