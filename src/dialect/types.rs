//! Column type tags and the per-dialect type-name table.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Semantic column type tags, one per JDBC-style SQL type family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Bit,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Double,
    Real,
    Numeric,
    Decimal,
    Char,
    VarChar,
    LongVarChar,
    Clob,
    NChar,
    NVarChar,
    LongNVarChar,
    NClob,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
}

/// Maps a type tag (optionally weighted by storage capacity) to a database
/// type name. Capacity entries serve requests whose length fits; anything
/// larger falls back to the default entry. Templates substitute `$l`
/// (length), `$p` (precision) and `$s` (scale).
#[derive(Debug, Clone, Default)]
pub struct TypeNames {
    defaults: HashMap<SqlType, String>,
    weighted: HashMap<SqlType, BTreeMap<u64, String>>,
}

impl TypeNames {
    pub fn put(&mut self, sql_type: SqlType, name: &str) {
        self.defaults.insert(sql_type, name.to_string());
    }

    pub fn put_sized(&mut self, sql_type: SqlType, capacity: u64, name: &str) {
        self.weighted
            .entry(sql_type)
            .or_default()
            .insert(capacity, name.to_string());
    }

    pub fn get(&self, sql_type: SqlType) -> Option<&str> {
        self.defaults.get(&sql_type).map(String::as_str)
    }

    /// Resolves the name for a type with storage parameters: the smallest
    /// capacity entry that can hold `length` wins, otherwise the default.
    pub fn get_sized(
        &self,
        sql_type: SqlType,
        length: u64,
        precision: u32,
        scale: u32,
    ) -> Option<String> {
        let template = self
            .weighted
            .get(&sql_type)
            .and_then(|by_capacity| {
                by_capacity
                    .range(length..)
                    .next()
                    .map(|(_, name)| name.as_str())
            })
            .or_else(|| self.get(sql_type))?;
        Some(substitute(template, length, precision, scale))
    }
}

fn substitute(template: &str, length: u64, precision: u32, scale: u32) -> String {
    template
        .replace("$s", &scale.to_string())
        .replace("$l", &length.to_string())
        .replace("$p", &precision.to_string())
}
