//! Dynamic-statement fragments and call-time parameters.
//!
//! A generated statement is an ordered sequence of [`Fragment`]s. Most are
//! static SQL text with `#{name}` named placeholders; the rest are resolved
//! against a [`Params`] value when the statement is rendered for one call.
//! Rendering is pure: equal fragments and equal parameters always produce
//! byte-identical SQL text.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::example::{ExampleFilter, StringMatcher};
use crate::paging::PageRequest;

/// Sort direction, rendered verbatim into `order by` clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// One dynamic sort criterion, supplied at call time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortOrder {
    pub property: String,
    pub direction: Direction,
    #[serde(default)]
    pub ignore_case: bool,
}

impl SortOrder {
    pub fn asc(property: &str) -> Self {
        Self {
            property: property.to_string(),
            direction: Direction::Asc,
            ignore_case: false,
        }
    }

    pub fn desc(property: &str) -> Self {
        Self {
            property: property.to_string(),
            direction: Direction::Desc,
            ignore_case: false,
        }
    }

    #[must_use]
    pub fn ignoring_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }
}

/// Named parameters for one statement execution.
///
/// Values are loosely typed (`serde_json::Value`); nested objects are
/// addressed with dotted paths (`pk.high`, `address.city`). The reserved
/// slots mirror the generated statements' expectations: an example-filter
/// map, an `_ids` identifier list, `_sorts` criteria and the pagination
/// window (`offset` / `pageSize` / `offsetEnd`).
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: serde_json::Map<String, Value>,
    example: Option<HashMap<String, ExampleFilter>>,
    ids: Option<Vec<Value>>,
    sorts: Option<Vec<SortOrder>>,
}

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn example(mut self, example: HashMap<String, ExampleFilter>) -> Self {
        self.example = Some(example);
        self
    }

    #[must_use]
    pub fn ids(mut self, ids: Vec<Value>) -> Self {
        self.ids = Some(ids);
        self
    }

    #[must_use]
    pub fn sorts(mut self, sorts: Vec<SortOrder>) -> Self {
        self.sorts = Some(sorts);
        self
    }

    /// Binds the pagination window for a paged statement.
    #[must_use]
    pub fn page(mut self, page: PageRequest) -> Self {
        self.values
            .insert("offset".to_string(), Value::from(page.offset()));
        self.values
            .insert("pageSize".to_string(), Value::from(page.page_size()));
        self.values
            .insert("offsetEnd".to_string(), Value::from(page.offset_end()));
        self
    }

    /// Binds the pagination window for slice mode, over-fetching one row so
    /// the caller can detect a next page without a count query.
    #[must_use]
    pub fn slice(mut self, page: PageRequest) -> Self {
        self.values
            .insert("offset".to_string(), Value::from(page.offset()));
        self.values
            .insert("pageSize".to_string(), Value::from(page.page_size() + 1));
        self.values
            .insert("offsetEnd".to_string(), Value::from(page.offset_end()));
        self
    }

    /// Looks up a value by dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.values.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn set_value(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn example_filter(&self, property: &str) -> Option<&ExampleFilter> {
        self.example.as_ref()?.get(property)
    }

    pub fn has_example(&self) -> bool {
        self.example.is_some()
    }

    pub fn has_ids(&self) -> bool {
        self.ids.is_some()
    }

    pub fn sorts_ref(&self) -> Option<&[SortOrder]> {
        self.sorts.as_deref()
    }

    /// Element count of a named collection parameter, used by `ForEach`
    /// expansion. `_ids` resolves to the identifier list, anything else to
    /// an array value at that path.
    pub fn collection_len(&self, collection: &str) -> Option<usize> {
        if collection == "_ids" {
            return self.ids.as_ref().map(Vec::len);
        }
        self.get(collection)?.as_array().map(Vec::len)
    }
}

/// Runtime predicate deciding whether a conditional fragment is rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum Guard {
    /// The named (possibly dotted) parameter is present and non-null.
    ParamNotNull(String),
    /// The example filter for the property asks for a null check: the
    /// filter exists, carries no value and has `include_null` set.
    ExampleIncludesNull(String),
    /// The example filter for the property carries a value and matches the
    /// given matcher; `ignore_case` of `None` accepts either case mode.
    ExampleMatches {
        property: String,
        matcher: StringMatcher,
        ignore_case: Option<bool>,
    },
    /// An example-filter map was supplied at all.
    ExamplePresent,
    /// An `_ids` identifier list was supplied.
    IdsPresent,
}

impl Guard {
    #[must_use]
    pub fn evaluate(&self, params: &Params) -> bool {
        match self {
            Guard::ParamNotNull(path) => {
                params.get(path).is_some_and(|v| !v.is_null())
            }
            Guard::ExampleIncludesNull(property) => params
                .example_filter(property)
                .is_some_and(|f| f.value.is_none() && f.include_null),
            Guard::ExampleMatches {
                property,
                matcher,
                ignore_case,
            } => params.example_filter(property).is_some_and(|f| {
                f.value.is_some()
                    && f.matcher == *matcher
                    && ignore_case.is_none_or(|expected| f.ignore_case == expected)
            }),
            Guard::ExamplePresent => params.has_example(),
            Guard::IdsPresent => params.has_ids(),
        }
    }
}

/// One piece of a generated statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Literal SQL text with `#{name}` placeholders.
    Static(String),
    /// Body rendered only when the guard holds.
    Test { guard: Guard, body: Vec<Fragment> },
    /// Renders `" where "` plus the body with one leading `and ` / `or `
    /// stripped; renders nothing when the body comes out empty.
    Where(Vec<Fragment>),
    /// Renders `" set "` plus the body with a trailing comma stripped.
    Set(Vec<Fragment>),
    /// Per-element expansion over a named collection parameter. Each
    /// element becomes an indexed placeholder (`#{_ids[0]}`, ...).
    ForEach {
        collection: String,
        open: String,
        separator: String,
        close: String,
    },
    /// Deferred `order by` over `_sorts`, resolving property names through
    /// the select-column alias map captured at generation time.
    OrderBy { columns: Vec<(String, String)> },
}

impl Fragment {
    pub fn stat(text: impl Into<String>) -> Self {
        Fragment::Static(text.into())
    }

    fn render_into(&self, params: &Params, out: &mut String) {
        match self {
            Fragment::Static(text) => out.push_str(text),
            Fragment::Test { guard, body } => {
                if guard.evaluate(params) {
                    for fragment in body {
                        fragment.render_into(params, out);
                    }
                }
            }
            Fragment::Where(body) => {
                let inner = render(body, params);
                let inner = inner.trim_start();
                let inner = inner
                    .strip_prefix("and ")
                    .or_else(|| inner.strip_prefix("or "))
                    .unwrap_or(inner);
                if !inner.is_empty() {
                    out.push_str(" where ");
                    out.push_str(inner);
                }
            }
            Fragment::Set(body) => {
                let inner = render(body, params);
                let inner = inner.trim_end().trim_end_matches(',');
                if !inner.is_empty() {
                    out.push_str(" set ");
                    out.push_str(inner);
                }
            }
            Fragment::ForEach {
                collection,
                open,
                separator,
                close,
            } => {
                let Some(len) = params.collection_len(collection) else {
                    return;
                };
                out.push_str(open);
                for index in 0..len {
                    if index > 0 {
                        out.push_str(separator);
                    }
                    out.push_str(&format!("#{{{collection}[{index}]}}"));
                }
                out.push_str(close);
            }
            Fragment::OrderBy { columns } => {
                let Some(sorts) = params.sorts_ref() else {
                    return;
                };
                if sorts.is_empty() {
                    return;
                }
                out.push_str(" order by ");
                for (index, sort) in sorts.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    let column = columns
                        .iter()
                        .find(|(property, _)| *property == sort.property)
                        .map_or(sort.property.as_str(), |(_, column)| column.as_str());
                    if sort.ignore_case {
                        out.push_str("lower(");
                        out.push_str(column);
                        out.push(')');
                    } else {
                        out.push_str(column);
                    }
                    out.push(' ');
                    out.push_str(sort.direction.as_str());
                }
            }
        }
    }
}

/// Renders a fragment sequence against call parameters.
#[must_use]
pub fn render(fragments: &[Fragment], params: &Params) -> String {
    let mut out = String::new();
    for fragment in fragments {
        fragment.render_into(params, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn where_strips_leading_and() {
        let fragments = vec![Fragment::Where(vec![Fragment::stat(" and a=#{a}")])];
        assert_eq!(render(&fragments, &Params::new()), " where a=#{a}");
    }

    #[test]
    fn where_renders_nothing_for_empty_body() {
        let fragments = vec![Fragment::Where(vec![Fragment::Test {
            guard: Guard::IdsPresent,
            body: vec![Fragment::stat(" and id in (...)")],
        }])];
        assert_eq!(render(&fragments, &Params::new()), "");
    }

    #[test]
    fn set_strips_trailing_comma() {
        let fragments = vec![Fragment::Set(vec![
            Fragment::stat("a=#{a},"),
            Fragment::stat("b=#{b},"),
        ])];
        assert_eq!(render(&fragments, &Params::new()), " set a=#{a},b=#{b}");
    }

    #[test]
    fn param_guard_walks_dotted_paths() {
        let guard = Guard::ParamNotNull("address.city".to_string());
        let present = Params::new().value("address", json!({"city": "Basel"}));
        let null_inner = Params::new().value("address", json!({"city": null}));
        let absent = Params::new();

        assert!(guard.evaluate(&present));
        assert!(!guard.evaluate(&null_inner));
        assert!(!guard.evaluate(&absent));
    }

    #[test]
    fn foreach_expands_indexed_placeholders() {
        let fragments = vec![Fragment::ForEach {
            collection: "_ids".to_string(),
            open: "(".to_string(),
            separator: ",".to_string(),
            close: ")".to_string(),
        }];
        let params = Params::new().ids(vec![json!(1), json!(2), json!(3)]);
        assert_eq!(
            render(&fragments, &params),
            "(#{_ids[0]},#{_ids[1]},#{_ids[2]})"
        );
    }

    #[test]
    fn order_by_resolves_aliases_and_wraps_ignore_case() {
        let fragments = vec![Fragment::OrderBy {
            columns: vec![("name".to_string(), "\"User\".user_name".to_string())],
        }];
        let params = Params::new().sorts(vec![
            SortOrder::asc("name").ignoring_case(),
            SortOrder::desc("unmapped"),
        ]);
        assert_eq!(
            render(&fragments, &params),
            " order by lower(\"User\".user_name) ASC,unmapped DESC"
        );
    }
}
