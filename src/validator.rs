//! Validator (C4): checks a datum against a schema. Holds no state of its
//! own; called on every write.

use crate::{
    error::{ensure_mismatch, Result},
    schema::Schema,
    value::Datum,
};

/// Returns `Ok(())` iff `datum` conforms to `schema`. `path` is a
/// dotted/bracketed breadcrumb (e.g. `"a.b[2]"`) used only to make a
/// `DatumTypeMismatch` actionable.
pub fn validate(schema: &Schema, datum: &Datum) -> Result<()> {
    validate_at(schema, datum, "$")
}

fn validate_at(schema: &Schema, datum: &Datum, path: &str) -> Result<()> {
    match (schema, datum) {
        (Schema::Null, Datum::Null) => Ok(()),
        (Schema::Boolean, Datum::Boolean(_)) => Ok(()),
        (Schema::Int, Datum::Int(_)) => Ok(()),
        // a long-typed field also accepts an in-range int-valued input
        (Schema::Long, Datum::Long(_)) => Ok(()),
        (Schema::Long, Datum::Int(_)) => Ok(()),
        (Schema::Float, Datum::Float(_)) => Ok(()),
        (Schema::Double, Datum::Double(_)) => Ok(()),
        (Schema::String, Datum::String(_)) => Ok(()),
        (Schema::Bytes { decimal: None }, Datum::Bytes(_)) => Ok(()),
        (Schema::Bytes { decimal: Some(attrs) }, Datum::Decimal(d)) => {
            ensure_mismatch!(
                d.scale == attrs.scale,
                path,
                "decimal scale {} does not match schema scale {}", d.scale, attrs.scale,
            );
            crate::decimal::check_precision(d.unscaled, attrs.precision)
                .map_err(|e| crate::error::Error::mismatch(path, e.to_string()))
        }
        (Schema::Array(elem), Datum::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                validate_at(elem, item, &format!("{}[{}]", path, i))?;
            }
            Ok(())
        }
        (Schema::Map(value_schema), Datum::Map(entries)) => {
            for (key, value) in entries {
                validate_at(value_schema, value, &format!("{}.{}", path, key))?;
            }
            Ok(())
        }
        (Schema::Union(branches), datum) => {
            // a caller may pass either the bare value or a pre-tagged
            // `Datum::Union` (as produced by decode); either is accepted,
            // and the tag itself is never trusted, only the inner value.
            let inner = match datum {
                Datum::Union(u) => &u.value,
                other => other,
            };
            ensure_mismatch!(
                branches.iter().any(|b| validate_at(b, inner, path).is_ok()),
                path,
                "no union branch accepts a {} value", inner.kind_str(),
            );
            Ok(())
        }
        (Schema::Enum { symbols, .. }, Datum::Enum(e)) => {
            let ok = match e {
                crate::value::EnumDatum::Name(name) => symbols.iter().any(|s| s == name),
                crate::value::EnumDatum::Ordinal(i) => *i < symbols.len(),
            };
            ensure_mismatch!(ok, path, "{:?} is not a declared enum symbol", e);
            Ok(())
        }
        (Schema::Fixed { size, decimal: None, .. }, Datum::Fixed(bytes)) => {
            ensure_mismatch!(
                bytes.len() == *size,
                path,
                "fixed value has {} bytes, schema declares {}", bytes.len(), size,
            );
            Ok(())
        }
        (Schema::Fixed { decimal: Some(attrs), .. }, Datum::Decimal(d)) => {
            ensure_mismatch!(
                d.scale == attrs.scale,
                path,
                "decimal scale {} does not match schema scale {}", d.scale, attrs.scale,
            );
            crate::decimal::check_precision(d.unscaled, attrs.precision)
                .map_err(|e| crate::error::Error::mismatch(path, e.to_string()))
        }
        (Schema::Record { fields, .. }, Datum::Record(values))
        | (Schema::Error { fields, .. }, Datum::Record(values))
        | (Schema::Request { fields }, Datum::Record(values)) => {
            for field in fields {
                let field_path = format!("{}.{}", path, field.name);
                match values.iter().find(|(n, _)| n == &field.name) {
                    Some((_, value)) => validate_at(&field.schema, value, &field_path)?,
                    None => ensure_mismatch!(
                        field.default.is_some(),
                        field_path,
                        "field {:?} is absent and has no default", field.name,
                    ),
                }
            }
            Ok(())
        }
        (schema, datum) => Err(crate::error::Error::mismatch(
            path,
            format!("a {} value is not a valid {}", datum.kind_str(), schema.kind_str()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    #[test]
    fn test_primitive_mismatch() {
        assert!(validate(&Schema::Int, &Datum::Boolean(true)).is_err());
        assert!(validate(&Schema::Int, &Datum::Int(5)).is_ok());
    }

    #[test]
    fn test_int_widens_into_long() {
        assert!(validate(&Schema::Long, &Datum::Int(5)).is_ok());
    }

    #[test]
    fn test_record_missing_field_without_default() {
        let schema = Schema::Record {
            name: "R".into(),
            fields: vec![Field { name: "a".into(), schema: Schema::Int, default: None }],
        };
        assert!(validate(&schema, &Datum::Record(vec![])).is_err());
    }

    #[test]
    fn test_record_missing_field_with_default_ok() {
        let schema = Schema::Record {
            name: "R".into(),
            fields: vec![Field {
                name: "a".into(),
                schema: Schema::Int,
                default: Some(crate::schema::DefaultValue::Int(0)),
            }],
        };
        assert!(validate(&schema, &Datum::Record(vec![])).is_ok());
    }

    #[test]
    fn test_union_requires_some_branch_to_accept() {
        let schema = Schema::Union(vec![Schema::Null, Schema::Long]);
        assert!(validate(&schema, &Datum::Long(5)).is_ok());
        assert!(validate(&schema, &Datum::String("x".into())).is_err());
    }

    #[test]
    fn test_fixed_size_exact() {
        let schema = Schema::Fixed { name: "F".into(), size: 3, decimal: None };
        assert!(validate(&schema, &Datum::Fixed(vec![1, 2, 3])).is_ok());
        assert!(validate(&schema, &Datum::Fixed(vec![1, 2])).is_err());
    }
}
