//! Pagination strategies.
//!
//! Each dialect carries one handler. Handlers work at two levels: wrapping
//! the fragment list of a generated paged select (named placeholders, bound
//! at execution time) and rewriting an already-rendered SQL string with
//! literal window values.

use std::fmt;

use crate::fragment::Fragment;
use crate::paging::PageRequest;

/// Dialect-specific row windowing.
pub trait LimitHandler: fmt::Debug + Send + Sync {
    /// Whether the dialect can window a result set at all.
    fn supports_limit(&self) -> bool {
        false
    }

    /// Whether the end-of-window parameter binds before the start.
    fn bind_limit_parameters_in_reverse_order(&self) -> bool {
        false
    }

    /// Whether the second parameter is the maximum row number rather than a
    /// row count.
    fn use_max_for_limit(&self) -> bool {
        false
    }

    /// Wraps a generated select into its windowed form, with named
    /// placeholders for the page window.
    fn wrap(&self, select: Vec<Fragment>) -> Vec<Fragment> {
        select
    }

    /// Rewrites a rendered SQL string with the literal window values.
    fn process_sql(&self, sql: &str, page: &PageRequest) -> String;
}

/// No windowing. Selects pass through untouched.
#[derive(Debug, Default)]
pub struct NoLimitHandler;

impl LimitHandler for NoLimitHandler {
    fn process_sql(&self, sql: &str, _page: &PageRequest) -> String {
        sql.to_string()
    }
}

/// `limit ? offset ?` suffix, as understood by H2, MySQL and PostgreSQL.
#[derive(Debug, Default)]
pub struct LimitOffsetHandler;

impl LimitHandler for LimitOffsetHandler {
    fn supports_limit(&self) -> bool {
        true
    }

    fn wrap(&self, mut select: Vec<Fragment>) -> Vec<Fragment> {
        select.push(Fragment::stat(" limit #{pageSize} offset #{offset}"));
        select
    }

    fn process_sql(&self, sql: &str, page: &PageRequest) -> String {
        format!("{sql} limit {} offset {}", page.page_size(), page.offset())
    }
}

/// Oracle-style two-tier `rownum` wrapping.
///
/// The inner query caps at the window end, the outer one discards the rows
/// before the window start. The end parameter binds first.
#[derive(Debug, Default)]
pub struct RowNumHandler;

impl LimitHandler for RowNumHandler {
    fn supports_limit(&self) -> bool {
        true
    }

    fn bind_limit_parameters_in_reverse_order(&self) -> bool {
        true
    }

    fn use_max_for_limit(&self) -> bool {
        true
    }

    fn wrap(&self, select: Vec<Fragment>) -> Vec<Fragment> {
        let mut wrapped = vec![Fragment::stat(
            "select * from ( select row_.*, rownum rownum_ from ( ",
        )];
        wrapped.extend(select);
        wrapped.push(Fragment::stat(
            " ) row_ where rownum <= #{offsetEnd}) where rownum_ > #{offset}",
        ));
        wrapped
    }

    fn process_sql(&self, sql: &str, page: &PageRequest) -> String {
        format!(
            "select * from ( select row_.*, rownum rownum_ from ( {sql} ) row_ where rownum <= {}) where rownum_ > {}",
            page.offset_end(),
            page.offset()
        )
    }
}

/// DB2-style `rownumber() over(...)` wrapping.
#[derive(Debug, Default)]
pub struct RowNumberOverHandler;

impl LimitHandler for RowNumberOverHandler {
    fn supports_limit(&self) -> bool {
        true
    }

    fn use_max_for_limit(&self) -> bool {
        true
    }

    fn wrap(&self, select: Vec<Fragment>) -> Vec<Fragment> {
        let mut wrapped = vec![Fragment::stat(
            "select * from ( select inner2_.*, rownumber() over(order by order of inner2_) as rownumber_ from ( ",
        )];
        wrapped.extend(select);
        wrapped.push(Fragment::stat(
            " fetch first #{offsetEnd} rows only ) as inner2_ ) as inner1_ where rownumber_ > #{offset} order by rownumber_",
        ));
        wrapped
    }

    fn process_sql(&self, sql: &str, page: &PageRequest) -> String {
        format!(
            "select * from ( select inner2_.*, rownumber() over(order by order of inner2_) as rownumber_ from ( {sql} fetch first {} rows only ) as inner2_ ) as inner1_ where rownumber_ > {} order by rownumber_",
            page.offset_end(),
            page.offset()
        )
    }
}
