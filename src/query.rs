//! Count-query rewriting and raw-SQL pagination.
//!
//! The rewriter turns an arbitrary page-producing query into a total-count
//! query. A leading `WITH` prologue must stay ahead of the `COUNT(*)`
//! wrapper verbatim, so the parser walks the CTE fragments (name, optional
//! column list, `AS ( ... )` body, optional comma) to find where the final
//! `SELECT` begins. This is deliberately not a SQL parser; it only
//! understands the prologue structure, with quote-aware bracket counting
//! for the parenthesized bodies.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::dialect::Dialect;
use crate::errors::GenerationError;
use crate::paging::PageRequest;

static WITH_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*with\s+").unwrap());
static EXPRESSION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[A-Za-z0-9_]+").unwrap());
static AS_KEYWORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s*as\s*").unwrap());
static FRAGMENT_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*,").unwrap());

fn malformed(offset: usize, expected: &'static str, sql: &str) -> GenerationError {
    GenerationError::MalformedCte {
        offset,
        expected,
        sql: sql.to_string(),
    }
}

/// Rewrites a query into its total-row-count form.
///
/// Without a CTE prologue the whole query is wrapped; with one, only the
/// trailing `SELECT` is wrapped and the prologue is preserved unchanged.
/// A trailing semicolon is dropped first.
///
/// # Errors
///
/// Returns [`GenerationError::MalformedCte`] when the prologue does not
/// parse. A best-effort wrap is never attempted: wrapping the prologue
/// inside `COUNT(*)` would be syntactically wrong.
pub fn create_count_query(sql: &str) -> Result<String, GenerationError> {
    let sql = sql.trim().trim_end_matches(';').trim_end();
    let boundary = locate_query_start(sql)?;
    if boundary == 0 {
        return Ok(format!("SELECT COUNT(*) FROM ( {sql} ) AS total"));
    }
    let prologue = sql[..boundary].trim_end();
    let tail = sql[boundary..].trim();
    debug!(boundary, "preserving CTE prologue in count query");
    Ok(format!(
        "{prologue} SELECT COUNT(*) FROM ( {tail} ) AS total"
    ))
}

/// Byte offset where the final `SELECT` begins: 0 when there is no CTE
/// prologue, otherwise just past the last fragment's closing parenthesis.
fn locate_query_start(sql: &str) -> Result<usize, GenerationError> {
    let Some(keyword) = WITH_KEYWORD.find(sql) else {
        return Ok(0);
    };
    let mut pos = keyword.end();
    loop {
        let name = EXPRESSION_NAME
            .find(&sql[pos..])
            .ok_or_else(|| malformed(pos, "CTE expression name", sql))?;
        pos += name.end();

        // Optional column-name list before AS.
        if next_non_space(sql, pos) == Some('(') {
            pos = advance_inner(sql, pos)?;
        }

        let as_keyword = AS_KEYWORD
            .find(&sql[pos..])
            .ok_or_else(|| malformed(pos, "AS keyword", sql))?;
        pos += as_keyword.end();

        pos = advance_inner(sql, pos)?;

        match FRAGMENT_COMMA.find(&sql[pos..]) {
            Some(comma) => pos += comma.end(),
            None => return Ok(pos),
        }
    }
}

fn next_non_space(sql: &str, pos: usize) -> Option<char> {
    sql[pos..].chars().find(|c| !c.is_whitespace())
}

/// Advances over one parenthesized section starting at or after `pos`,
/// returning the offset just past its closing parenthesis. Depth counting
/// ignores parentheses inside string literals; a `'` toggles the in-string
/// state.
fn advance_inner(sql: &str, pos: usize) -> Result<usize, GenerationError> {
    let mut depth = 0u32;
    let mut in_string = false;
    let mut seen_open = false;
    for (index, ch) in sql[pos..].char_indices() {
        if !seen_open && !ch.is_whitespace() && ch != '(' {
            return Err(malformed(pos + index, "opening parenthesis", sql));
        }
        match ch {
            '\'' => in_string = !in_string,
            '(' if !in_string => {
                depth += 1;
                seen_open = true;
            }
            ')' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Ok(pos + index + 1);
                }
            }
            _ => {}
        }
    }
    Err(malformed(sql.len(), "closing parenthesis", sql))
}

/// Applies a dialect's pagination to raw, pre-rendered SQL.
///
/// Covers the call sites that hold a single flattened string instead of
/// statement fragments, such as hand-authored native queries.
#[derive(Debug, Clone)]
pub struct PagedQuery<'a> {
    dialect: &'a Dialect,
    page: PageRequest,
}

impl<'a> PagedQuery<'a> {
    #[must_use]
    pub fn new(dialect: &'a Dialect, page: PageRequest) -> Self {
        Self { dialect, page }
    }

    /// The windowed form of `sql` for this dialect and page.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::UnsupportedPagination`] when the
    /// dialect's limit handler cannot window a result set. Callers then
    /// run the unwindowed query and page client-side.
    pub fn paged_sql(&self, sql: &str) -> Result<String, GenerationError> {
        let handler = self.dialect.limit_handler();
        if !handler.supports_limit() {
            return Err(GenerationError::UnsupportedPagination {
                dialect: self.dialect.name().to_string(),
            });
        }
        Ok(handler.process_sql(sql, &self.page))
    }

    /// The matching total-count query for `sql`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::MalformedCte`] when a CTE prologue does
    /// not parse.
    pub fn count_sql(&self, sql: &str) -> Result<String, GenerationError> {
        create_count_query(sql)
    }
}
