//! JSON Schema property → PostgreSQL column type translation.
//!
//! Pure logic, no I/O: union resolution, the primitive → SQL type
//! mapping, and nullability rendering.

use std::fmt;

use crate::error::{Result, TargetError};
use crate::protocol::{PropertyDescriptor, TypeDecl};

/// Outcome of resolving a declared type union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    /// One concrete type name.
    Single(String),
    /// One concrete type name plus a `"null"` member.
    NullableSingle(String),
    /// Zero or several concrete members: no relational type represents
    /// the union, so it degrades to a bounded string column.
    CollapsedToText { nullable: bool },
}

/// Resolve a type declaration to a concrete shape.
///
/// A `"null"` member marks the column nullable and is removed; what
/// remains determines the concrete type. Member names are not
/// validated here — a collapsed union never looks at them again, and a
/// single survivor is checked by [`column_type`].
pub fn resolve_union(decl: &TypeDecl) -> ResolvedType {
    match decl {
        TypeDecl::Single(name) => ResolvedType::Single(name.clone()),
        TypeDecl::Union(members) => {
            let nullable = members.iter().any(|m| m == "null");
            let concrete: Vec<&String> =
                members.iter().filter(|m| m.as_str() != "null").collect();
            match concrete.as_slice() {
                [only] if nullable => ResolvedType::NullableSingle((*only).clone()),
                [only] => ResolvedType::Single((*only).clone()),
                _ => ResolvedType::CollapsedToText { nullable },
            }
        }
    }
}

/// A resolved PostgreSQL column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PgType {
    Boolean,
    Integer,
    /// Auto-increment integer, used for the sole integer primary key.
    Serial,
    Decimal,
    Varchar(u32),
    Text,
    Timestamp,
    Date,
    Time,
    Jsonb,
}

impl fmt::Display for PgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PgType::Boolean => f.write_str("boolean"),
            PgType::Integer => f.write_str("integer"),
            PgType::Serial => f.write_str("SERIAL"),
            PgType::Decimal => f.write_str("decimal"),
            PgType::Varchar(n) => write!(f, "varchar({n})"),
            PgType::Text => f.write_str("text"),
            PgType::Timestamp => f.write_str("timestamp"),
            PgType::Date => f.write_str("date"),
            PgType::Time => f.write_str("time"),
            PgType::Jsonb => f.write_str("jsonb"),
        }
    }
}

/// Fully resolved column definition: SQL type plus nullability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType {
    pub pg_type: PgType,
    pub nullable: bool,
}

impl ColumnType {
    /// Render the DDL fragment that follows the column name.
    pub fn render(&self) -> String {
        // SERIAL already implies NOT NULL
        if self.nullable || self.pg_type == PgType::Serial {
            self.pg_type.to_string()
        } else {
            format!("{} NOT NULL", self.pg_type)
        }
    }
}

/// Translate one property descriptor into a column type.
///
/// `is_primary_key` is true for the first `key_properties` entry only;
/// it promotes integer columns to SERIAL.
pub fn column_type(descriptor: &PropertyDescriptor, is_primary_key: bool) -> Result<ColumnType> {
    let (name, nullable, collapsed) = match resolve_union(&descriptor.type_decl) {
        ResolvedType::Single(name) => (name, false, false),
        ResolvedType::NullableSingle(name) => (name, true, false),
        ResolvedType::CollapsedToText { nullable } => ("string".to_string(), nullable, true),
    };

    // A collapsed union becomes a bounded string: default the length
    // when the descriptor declares none.
    let max_length = if collapsed {
        descriptor.max_length.or(Some(255))
    } else {
        descriptor.max_length
    };

    let pg_type = match name.as_str() {
        "bool" | "boolean" => PgType::Boolean,
        "int" | "integer" if is_primary_key => PgType::Serial,
        "int" | "integer" => PgType::Integer,
        "float" | "number" => PgType::Decimal,
        "string" => string_type(max_length, descriptor.format.as_deref()),
        "object" => PgType::Jsonb,
        other => return Err(TargetError::UnsupportedType(other.to_string())),
    };

    Ok(ColumnType { pg_type, nullable })
}

/// Apply the string sizing rule. A recognized `format` wins over the
/// length-based choice; an unrecognized one is ignored.
fn string_type(max_length: Option<u32>, format: Option<&str>) -> PgType {
    match format {
        Some("date-time") => return PgType::Timestamp,
        Some("date") => return PgType::Date,
        Some("time") => return PgType::Time,
        Some("uid") => return PgType::Varchar(255),
        _ => {}
    }
    match max_length {
        Some(n) if n < 256 => PgType::Varchar(n),
        Some(_) => PgType::Text,
        None => PgType::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(decl: TypeDecl) -> PropertyDescriptor {
        PropertyDescriptor {
            type_decl: decl,
            max_length: None,
            format: None,
        }
    }

    fn union(members: &[&str]) -> TypeDecl {
        TypeDecl::Union(members.iter().map(ToString::to_string).collect())
    }

    // ── union resolution ─────────────────────────────────────────────

    #[test]
    fn single_name_resolves_as_is() {
        assert_eq!(
            resolve_union(&TypeDecl::Single("integer".into())),
            ResolvedType::Single("integer".into())
        );
    }

    #[test]
    fn null_member_marks_nullable_and_is_removed() {
        assert_eq!(
            resolve_union(&union(&["string", "null"])),
            ResolvedType::NullableSingle("string".into())
        );
        assert_eq!(
            resolve_union(&union(&["null", "integer"])),
            ResolvedType::NullableSingle("integer".into())
        );
    }

    #[test]
    fn multi_member_union_collapses() {
        assert_eq!(
            resolve_union(&union(&["integer", "string"])),
            ResolvedType::CollapsedToText { nullable: false }
        );
        assert_eq!(
            resolve_union(&union(&["integer", "object", "null"])),
            ResolvedType::CollapsedToText { nullable: true }
        );
    }

    #[test]
    fn null_only_union_collapses_nullable() {
        assert_eq!(
            resolve_union(&union(&["null"])),
            ResolvedType::CollapsedToText { nullable: true }
        );
    }

    // ── primitive mapping ────────────────────────────────────────────

    #[test]
    fn booleans_map_with_alias() {
        for name in ["boolean", "bool"] {
            let ct = column_type(&descriptor(TypeDecl::Single(name.into())), false).unwrap();
            assert_eq!(ct.pg_type, PgType::Boolean);
            assert!(!ct.nullable);
        }
    }

    #[test]
    fn integer_maps_plain_when_not_key() {
        let ct = column_type(&descriptor(TypeDecl::Single("integer".into())), false).unwrap();
        assert_eq!(ct.pg_type, PgType::Integer);
        assert_eq!(ct.render(), "integer NOT NULL");
    }

    #[test]
    fn integer_primary_key_becomes_serial() {
        for name in ["integer", "int"] {
            let ct = column_type(&descriptor(TypeDecl::Single(name.into())), true).unwrap();
            assert_eq!(ct.pg_type, PgType::Serial);
            assert_eq!(ct.render(), "SERIAL");
        }
    }

    #[test]
    fn nullable_integer_key_still_promotes() {
        let ct = column_type(&descriptor(union(&["integer", "null"])), true).unwrap();
        assert_eq!(ct.pg_type, PgType::Serial);
        assert_eq!(ct.render(), "SERIAL");
    }

    #[test]
    fn number_maps_to_decimal_with_alias() {
        for name in ["number", "float"] {
            let ct = column_type(&descriptor(TypeDecl::Single(name.into())), false).unwrap();
            assert_eq!(ct.pg_type, PgType::Decimal);
        }
    }

    #[test]
    fn object_maps_to_jsonb() {
        let ct = column_type(&descriptor(TypeDecl::Single("object".into())), false).unwrap();
        assert_eq!(ct.pg_type, PgType::Jsonb);
    }

    #[test]
    fn unknown_type_is_rejected_by_name() {
        let err = column_type(&descriptor(TypeDecl::Single("uuid5".into())), false).unwrap_err();
        match err {
            TargetError::UnsupportedType(name) => assert_eq!(name, "uuid5"),
            other => panic!("expected UnsupportedType, got: {other}"),
        }
    }

    #[test]
    fn union_survivor_is_still_validated() {
        let err = column_type(&descriptor(union(&["chaos", "null"])), false).unwrap_err();
        assert!(matches!(err, TargetError::UnsupportedType(_)), "got: {err}");
    }

    // ── string sizing ────────────────────────────────────────────────

    #[test]
    fn short_max_length_becomes_varchar() {
        let mut d = descriptor(TypeDecl::Single("string".into()));
        d.max_length = Some(100);
        let ct = column_type(&d, false).unwrap();
        assert_eq!(ct.pg_type, PgType::Varchar(100));
    }

    #[test]
    fn max_length_threshold_is_256() {
        let mut d = descriptor(TypeDecl::Single("string".into()));
        d.max_length = Some(255);
        assert_eq!(column_type(&d, false).unwrap().pg_type, PgType::Varchar(255));
        d.max_length = Some(256);
        assert_eq!(column_type(&d, false).unwrap().pg_type, PgType::Text);
    }

    #[test]
    fn bare_string_becomes_text() {
        let ct = column_type(&descriptor(TypeDecl::Single("string".into())), false).unwrap();
        assert_eq!(ct.pg_type, PgType::Text);
    }

    #[test]
    fn format_overrides_max_length() {
        let mut d = descriptor(TypeDecl::Single("string".into()));
        d.max_length = Some(50);
        d.format = Some("date-time".into());
        assert_eq!(column_type(&d, false).unwrap().pg_type, PgType::Timestamp);

        d.format = Some("date".into());
        assert_eq!(column_type(&d, false).unwrap().pg_type, PgType::Date);

        d.format = Some("time".into());
        assert_eq!(column_type(&d, false).unwrap().pg_type, PgType::Time);

        d.format = Some("uid".into());
        assert_eq!(column_type(&d, false).unwrap().pg_type, PgType::Varchar(255));
    }

    #[test]
    fn unrecognized_format_falls_back_to_length() {
        let mut d = descriptor(TypeDecl::Single("string".into()));
        d.format = Some("email".into());
        assert_eq!(column_type(&d, false).unwrap().pg_type, PgType::Text);
        d.max_length = Some(64);
        assert_eq!(column_type(&d, false).unwrap().pg_type, PgType::Varchar(64));
    }

    // ── union collapse sizing ────────────────────────────────────────

    #[test]
    fn collapsed_union_defaults_to_varchar_255() {
        let ct = column_type(&descriptor(union(&["integer", "string"])), false).unwrap();
        assert_eq!(ct.pg_type, PgType::Varchar(255));
        assert_eq!(ct.render(), "varchar(255) NOT NULL");
    }

    #[test]
    fn collapsed_union_keeps_declared_max_length() {
        let mut d = descriptor(union(&["integer", "string", "null"]));
        d.max_length = Some(300);
        let ct = column_type(&d, false).unwrap();
        assert_eq!(ct.pg_type, PgType::Text);
        assert!(ct.nullable);
        assert_eq!(ct.render(), "text");
    }

    // ── nullability rendering ────────────────────────────────────────

    #[test]
    fn nullable_column_omits_not_null() {
        let ct = column_type(&descriptor(union(&["string", "null"])), false).unwrap();
        assert!(ct.nullable);
        assert_eq!(ct.render(), "text");
    }

    #[test]
    fn non_nullable_column_renders_not_null() {
        let mut d = descriptor(TypeDecl::Single("string".into()));
        d.max_length = Some(100);
        assert_eq!(column_type(&d, false).unwrap().render(), "varchar(100) NOT NULL");
    }
}
