//! Database dialects.
//!
//! A [`Dialect`] bundles everything the generator needs to vary per
//! database: identifier quoting, the column type-name table and the
//! pagination strategy. Built-in constructors cover ANSI, H2, MySQL,
//! Oracle and DB2; anything else is a matter of building one by hand.

mod limits;
mod types;

use std::sync::Arc;

pub use limits::{
    LimitHandler, LimitOffsetHandler, NoLimitHandler, RowNumHandler, RowNumberOverHandler,
};
pub use types::{SqlType, TypeNames};

use crate::errors::GenerationError;

/// One database dialect, immutable once constructed.
#[derive(Debug, Clone)]
pub struct Dialect {
    name: String,
    open_quote: char,
    close_quote: char,
    supports_delete_alias: bool,
    type_names: TypeNames,
    limit: Arc<dyn LimitHandler>,
}

/// Type registrations every dialect starts from. Constructors override the
/// entries their database spells differently.
fn base_type_names() -> TypeNames {
    let mut names = TypeNames::default();
    names.put(SqlType::Bit, "bit");
    names.put(SqlType::Boolean, "boolean");
    names.put(SqlType::TinyInt, "tinyint");
    names.put(SqlType::SmallInt, "smallint");
    names.put(SqlType::Integer, "integer");
    names.put(SqlType::BigInt, "bigint");
    names.put(SqlType::Float, "float($p)");
    names.put(SqlType::Double, "double precision");
    names.put(SqlType::Real, "real");
    names.put(SqlType::Numeric, "numeric($p,$s)");
    names.put(SqlType::Decimal, "decimal($p,$s)");
    names.put(SqlType::Char, "char($l)");
    names.put(SqlType::VarChar, "varchar($l)");
    names.put(SqlType::LongVarChar, "varchar($l)");
    names.put(SqlType::NChar, "nchar($l)");
    names.put(SqlType::NVarChar, "nvarchar($l)");
    names.put(SqlType::LongNVarChar, "nvarchar($l)");
    names.put(SqlType::Date, "date");
    names.put(SqlType::Time, "time");
    names.put(SqlType::Timestamp, "timestamp");
    names.put(SqlType::Binary, "binary($l)");
    names.put(SqlType::VarBinary, "varbinary($l)");
    names.put(SqlType::LongVarBinary, "varbinary($l)");
    names.put(SqlType::Blob, "blob");
    names.put(SqlType::Clob, "clob");
    names.put(SqlType::NClob, "nclob");
    names
}

impl Dialect {
    /// Plain ANSI dialect: double-quote identifiers, no pagination.
    #[must_use]
    pub fn ansi() -> Self {
        Self {
            name: "ansi".to_string(),
            open_quote: '"',
            close_quote: '"',
            supports_delete_alias: false,
            type_names: base_type_names(),
            limit: Arc::new(NoLimitHandler),
        }
    }

    #[must_use]
    pub fn h2() -> Self {
        Self {
            name: "h2".to_string(),
            limit: Arc::new(LimitOffsetHandler),
            ..Self::ansi()
        }
    }

    #[must_use]
    pub fn mysql() -> Self {
        let mut type_names = base_type_names();
        type_names.put(SqlType::Boolean, "bit");
        type_names.put(SqlType::Numeric, "decimal($p,$s)");
        type_names.put(SqlType::Timestamp, "datetime");
        type_names.put(SqlType::LongVarChar, "longtext");
        type_names.put(SqlType::LongVarBinary, "longblob");
        type_names.put(SqlType::Blob, "longblob");
        type_names.put(SqlType::Clob, "longtext");
        Self {
            name: "mysql".to_string(),
            open_quote: '`',
            close_quote: '`',
            supports_delete_alias: true,
            type_names,
            limit: Arc::new(LimitOffsetHandler),
        }
    }

    #[must_use]
    pub fn oracle() -> Self {
        let mut type_names = base_type_names();
        type_names.put(SqlType::Bit, "number(1,0)");
        type_names.put(SqlType::Boolean, "number(1,0)");
        type_names.put(SqlType::TinyInt, "number(3,0)");
        type_names.put(SqlType::SmallInt, "number(5,0)");
        type_names.put(SqlType::Integer, "number(10,0)");
        type_names.put(SqlType::BigInt, "number(19,0)");
        type_names.put(SqlType::Numeric, "number($p,$s)");
        type_names.put(SqlType::Decimal, "number($p,$s)");
        type_names.put(SqlType::VarChar, "varchar2($l char)");
        type_names.put(SqlType::NVarChar, "nvarchar2($l)");
        type_names.put(SqlType::LongVarChar, "long");
        type_names.put(SqlType::Binary, "raw($l)");
        type_names.put(SqlType::VarBinary, "raw($l)");
        type_names.put(SqlType::LongVarBinary, "long raw");
        Self {
            name: "oracle".to_string(),
            type_names,
            limit: Arc::new(RowNumHandler),
            ..Self::ansi()
        }
    }

    #[must_use]
    pub fn db2() -> Self {
        let mut type_names = base_type_names();
        type_names.put(SqlType::Bit, "smallint");
        type_names.put(SqlType::Boolean, "smallint");
        type_names.put(SqlType::TinyInt, "smallint");
        type_names.put(SqlType::LongVarChar, "long varchar");
        type_names.put(SqlType::VarBinary, "varchar($l) for bit data");
        type_names.put_sized(SqlType::VarBinary, 254, "char($l) for bit data");
        type_names.put(SqlType::LongVarBinary, "long varchar for bit data");
        Self {
            name: "db2".to_string(),
            type_names,
            limit: Arc::new(RowNumberOverHandler),
            ..Self::ansi()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn supports_delete_alias(&self) -> bool {
        self.supports_delete_alias
    }

    #[must_use]
    pub fn limit_handler(&self) -> &dyn LimitHandler {
        self.limit.as_ref()
    }

    /// Quotes a name carrying the backtick request sentinel; plain names
    /// pass through untouched.
    #[must_use]
    pub fn quote(&self, name: &str) -> String {
        match name.strip_prefix('`') {
            Some(rest) => format!(
                "{}{}{}",
                self.open_quote,
                rest.strip_suffix('`').unwrap_or(rest),
                self.close_quote
            ),
            None => name.to_string(),
        }
    }

    /// Quotes an alias unconditionally. Table aliases are entity names and
    /// may collide with keywords, so they are always wrapped.
    #[must_use]
    pub fn quote_alias(&self, alias: &str) -> String {
        format!("{}{alias}{}", self.open_quote, self.close_quote)
    }

    /// The database type name for a tag without storage parameters.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::UnknownTypeMapping`] when the dialect has
    /// no entry for the tag.
    pub fn type_name(&self, sql_type: SqlType) -> Result<String, GenerationError> {
        self.type_names
            .get(sql_type)
            .map(str::to_string)
            .ok_or_else(|| GenerationError::UnknownTypeMapping {
                sql_type,
                length: None,
                dialect: self.name.clone(),
            })
    }

    /// The database type name for a tag with storage parameters, resolved
    /// through the capacity-weighted entries.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::UnknownTypeMapping`] when no entry can
    /// serve the request.
    pub fn type_name_sized(
        &self,
        sql_type: SqlType,
        length: u64,
        precision: u32,
        scale: u32,
    ) -> Result<String, GenerationError> {
        self.type_names
            .get_sized(sql_type, length, precision, scale)
            .ok_or_else(|| GenerationError::UnknownTypeMapping {
                sql_type,
                length: Some(length),
                dialect: self.name.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_quoting() {
        let dialect = Dialect::ansi();
        assert_eq!(dialect.quote("user_name"), "user_name");
        assert_eq!(dialect.quote("`order`"), "\"order\"");
        assert_eq!(dialect.quote_alias("User"), "\"User\"");

        let mysql = Dialect::mysql();
        assert_eq!(mysql.quote("`order`"), "`order`");
        assert_eq!(mysql.quote_alias("User"), "`User`");
    }

    #[test]
    fn type_lookup_varies_per_dialect() {
        assert_eq!(
            Dialect::ansi()
                .type_name_sized(SqlType::VarChar, 255, 0, 0)
                .unwrap(),
            "varchar(255)"
        );
        assert_eq!(
            Dialect::oracle()
                .type_name_sized(SqlType::VarChar, 255, 0, 0)
                .unwrap(),
            "varchar2(255 char)"
        );
        assert_eq!(
            Dialect::oracle().type_name(SqlType::BigInt).unwrap(),
            "number(19,0)"
        );
        assert_eq!(
            Dialect::db2()
                .type_name_sized(SqlType::VarBinary, 100, 0, 0)
                .unwrap(),
            "char(100) for bit data"
        );
    }

    #[test]
    fn pagination_support_follows_the_handler() {
        assert!(!Dialect::ansi().limit_handler().supports_limit());
        assert!(Dialect::h2().limit_handler().supports_limit());
        assert!(
            Dialect::oracle()
                .limit_handler()
                .bind_limit_parameters_in_reverse_order()
        );
    }
}
