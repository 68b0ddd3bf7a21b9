//! Error types for statement generation and execution outcomes.
//!
//! Generation-time failures (`GenerationError`) abort generation for the
//! affected entity or statement and carry enough context (entity name,
//! offending SQL, offsets) to fix a dialect configuration or a hand-written
//! override. Execution-time conditions are represented by
//! [`OptimisticLockError`], which the executor surfaces through
//! [`check_affected_rows`].

use thiserror::Error;

use crate::dialect::SqlType;

/// Failures while generating statement text for an entity.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The dialect has no column-type entry for the requested type tag.
    #[error("no type mapping for {sql_type:?} (length {length:?}) in dialect `{dialect}`")]
    UnknownTypeMapping {
        sql_type: SqlType,
        length: Option<u64>,
        dialect: String,
    },

    /// The entity has no identifier property but an id-dependent statement
    /// was requested. The assembler treats this as "skip that statement";
    /// it only escapes to callers that ask for a by-id clause directly.
    #[error("entity `{entity}` has no identifier property")]
    MissingIdentifier { entity: String },

    /// CTE boundary parsing failed while rewriting a query into a count
    /// query. Never downgraded to a best-effort wrap: wrapping the CTE
    /// prologue in `COUNT(*)` would be syntactically wrong.
    #[error("failed to locate {expected} at offset {offset} in CTE query, SQL [{sql}]")]
    MalformedCte {
        offset: usize,
        expected: &'static str,
        sql: String,
    },

    /// A limit-handler rewrite was requested on a dialect whose handler
    /// reports `supports_limit() == false`.
    #[error("dialect `{dialect}` does not support limit clauses")]
    UnsupportedPagination { dialect: String },
}

/// An update or delete guarded by a version column affected zero rows.
///
/// Distinct from "row did not exist": the caller saw the row (it holds the
/// pre-update version value) but another writer got there first.
#[derive(Debug, Error)]
#[error("`{statement}` on `{entity}` affected no rows; the row was concurrently updated or removed")]
pub struct OptimisticLockError {
    pub entity: String,
    pub statement: String,
}

/// Maps an affected-row count from a version-guarded update or delete into
/// a typed result. Only meaningful for statements whose WHERE clause
/// includes the version predicate.
///
/// # Errors
///
/// Returns [`OptimisticLockError`] when `affected` is zero.
pub fn check_affected_rows(
    affected: u64,
    entity: &str,
    statement: &str,
) -> Result<u64, OptimisticLockError> {
    if affected == 0 {
        return Err(OptimisticLockError {
            entity: entity.to_string(),
            statement: statement.to_string(),
        });
    }
    Ok(affected)
}
