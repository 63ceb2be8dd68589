//! Destination error taxonomy.

/// Errors produced while parsing messages, translating schemas,
/// provisioning tables, and writing records.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// A record arrived before any schema message bound a stream.
    #[error("a schema must be defined before a record can be processed")]
    SchemaNotSet,

    /// A message or record value had a shape this target cannot use.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A property declared a JSON Schema type with no SQL mapping.
    #[error("unknown casting type of {0}")]
    UnsupportedType(String),

    /// A schema message is missing fields table provisioning needs.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Insert hit a primary-key uniqueness conflict (SQLSTATE 23505).
    /// Recoverable: the writer retries the record as an update.
    #[error("unique violation on {table}: {detail}")]
    UniqueViolation { table: String, detail: String },

    /// Failed to read or parse the connection config file.
    #[error("config error: {0}")]
    Config(String),

    /// Failed to establish the store connection, or it went away.
    #[error("connection failure: {0}")]
    Connection(String),

    /// Any other store-side execution failure.
    #[error("store error during {context}: {detail}")]
    Store { context: String, detail: String },
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, TargetError>;

impl TargetError {
    /// Wrap a store failure, routing closed-connection errors to the
    /// connection variant.
    pub(crate) fn store(context: impl Into<String>, error: &postgres::Error) -> Self {
        if error.is_closed() {
            TargetError::Connection(describe_db_error(error))
        } else {
            TargetError::Store {
                context: context.into(),
                detail: describe_db_error(error),
            }
        }
    }
}

/// Render a database error with its server-side context when available.
pub(crate) fn describe_db_error(error: &postgres::Error) -> String {
    if let Some(db_error) = error.as_db_error() {
        format!(
            "{} (sqlstate={} severity={} detail={})",
            db_error.message(),
            db_error.code().code(),
            db_error.severity(),
            db_error.detail().unwrap_or("n/a")
        )
    } else {
        error.to_string()
    }
}

/// True when the server reported a unique-constraint violation.
pub(crate) fn is_unique_violation(error: &postgres::Error) -> bool {
    error
        .as_db_error()
        .is_some_and(|db| db.code().code() == "23505")
}

/// Classify an insert execution failure, separating the recoverable
/// conflict case from everything else.
pub(crate) fn classify_insert_error(table: &str, error: &postgres::Error) -> TargetError {
    if is_unique_violation(error) {
        TargetError::UniqueViolation {
            table: table.to_string(),
            detail: describe_db_error(error),
        }
    } else {
        TargetError::store(format!("insert into {table}"), error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_not_set_displays_precondition() {
        let err = TargetError::SchemaNotSet;
        assert_eq!(
            err.to_string(),
            "a schema must be defined before a record can be processed"
        );
    }

    #[test]
    fn unsupported_type_names_offender() {
        let err = TargetError::UnsupportedType("uuid5".into());
        assert_eq!(err.to_string(), "unknown casting type of uuid5");
    }

    #[test]
    fn store_error_carries_context() {
        let err = TargetError::Store {
            context: "insert into public.users".into(),
            detail: "permission denied (sqlstate=42501 severity=ERROR detail=n/a)".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("insert into public.users"), "got: {msg}");
        assert!(msg.contains("42501"), "got: {msg}");
    }

    #[test]
    fn unique_violation_names_table() {
        let err = TargetError::UniqueViolation {
            table: "public.users".into(),
            detail: "duplicate key".into(),
        };
        assert!(err.to_string().contains("public.users"));
    }
}
