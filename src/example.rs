//! Query-by-example support.
//!
//! Two halves: building the per-property [`ExampleFilter`] map from a probe
//! object plus a matcher configuration, and generating the guarded SQL
//! fragments that consume that map at render time. The guards partition the
//! filter space (matcher × case × null handling), so exactly one fragment
//! per property is active for any given filter configuration.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::condition::{ConditionKind, IgnoreCase, operator, value_expression};
use crate::dialect::Dialect;
use crate::entity::{EntityDescriptor, PropertyDescriptor, ValueKind};
use crate::fragment::{Fragment, Guard};

/// String matching policy for an example filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringMatcher {
    Exact,
    Containing,
    Starting,
    Ending,
}

impl fmt::Display for StringMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StringMatcher::Exact => "EXACT",
            StringMatcher::Containing => "CONTAINING",
            StringMatcher::Starting => "STARTING",
            StringMatcher::Ending => "ENDING",
        };
        f.write_str(name)
    }
}

/// Runtime filter state for one property, evaluated by fragment guards.
///
/// Never constructed for identifier properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleFilter {
    pub value: Option<Value>,
    pub matcher: StringMatcher,
    #[serde(default)]
    pub ignore_case: bool,
    #[serde(default)]
    pub include_null: bool,
}

/// How null probe values are treated when building an example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullHandler {
    #[default]
    Ignore,
    Include,
}

/// Matcher configuration applied while turning a probe into filters.
#[derive(Debug, Clone, Default)]
pub struct ExampleMatcher {
    default_matcher: Option<StringMatcher>,
    null_handler: NullHandler,
    ignore_case_all: bool,
    ignore_case_paths: HashSet<String>,
    ignored_paths: HashSet<String>,
    matcher_overrides: HashMap<String, StringMatcher>,
}

impl ExampleMatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_string_matcher(mut self, matcher: StringMatcher) -> Self {
        self.default_matcher = Some(matcher);
        self
    }

    #[must_use]
    pub fn with_null_handler(mut self, handler: NullHandler) -> Self {
        self.null_handler = handler;
        self
    }

    #[must_use]
    pub fn with_ignore_case(mut self) -> Self {
        self.ignore_case_all = true;
        self
    }

    #[must_use]
    pub fn with_ignore_case_for(mut self, path: &str) -> Self {
        self.ignore_case_paths.insert(path.to_string());
        self
    }

    #[must_use]
    pub fn with_ignored_path(mut self, path: &str) -> Self {
        self.ignored_paths.insert(path.to_string());
        self
    }

    #[must_use]
    pub fn with_matcher_for(mut self, path: &str, matcher: StringMatcher) -> Self {
        self.matcher_overrides.insert(path.to_string(), matcher);
        self
    }

    fn matcher_for(&self, path: &str) -> StringMatcher {
        self.matcher_overrides
            .get(path)
            .copied()
            .or(self.default_matcher)
            .unwrap_or(StringMatcher::Exact)
    }

    fn ignore_case_for(&self, path: &str) -> bool {
        self.ignore_case_all || self.ignore_case_paths.contains(path)
    }
}

/// Builds the per-property filter map from a loosely-typed probe.
///
/// Identifier properties never contribute. Ignored paths are dropped, null
/// probe values only survive under [`NullHandler::Include`], and ignore-case
/// string values are upper-cased here so they meet the `upper(...)`-wrapped
/// column at execution time.
#[must_use]
pub fn build_example(
    entity: &EntityDescriptor,
    probe: &serde_json::Map<String, Value>,
    matcher: &ExampleMatcher,
) -> HashMap<String, ExampleFilter> {
    let mut filters = HashMap::new();
    for property in entity.persistent_properties() {
        if matcher.ignored_paths.contains(&property.name) {
            continue;
        }
        let value = probe.get(&property.name).filter(|v| !v.is_null());
        let Some(value) = value else {
            if matcher.null_handler == NullHandler::Include {
                filters.insert(
                    property.name.clone(),
                    ExampleFilter {
                        value: None,
                        matcher: StringMatcher::Exact,
                        ignore_case: false,
                        include_null: true,
                    },
                );
            }
            continue;
        };

        let filter = if property.kind == ValueKind::String {
            let ignore_case = matcher.ignore_case_for(&property.name);
            let value = if ignore_case {
                value
                    .as_str()
                    .map_or_else(|| value.clone(), |s| Value::from(s.to_uppercase()))
            } else {
                value.clone()
            };
            ExampleFilter {
                value: Some(value),
                matcher: matcher.matcher_for(&property.name),
                ignore_case,
                include_null: false,
            }
        } else {
            ExampleFilter {
                value: Some(value.clone()),
                matcher: StringMatcher::Exact,
                ignore_case: false,
                include_null: false,
            }
        };
        filters.insert(property.name.clone(), filter);
    }
    filters
}

fn condition_kind(matcher: StringMatcher) -> ConditionKind {
    match matcher {
        StringMatcher::Exact => ConditionKind::Simple,
        StringMatcher::Containing => ConditionKind::Containing,
        StringMatcher::Starting => ConditionKind::StartingWith,
        StringMatcher::Ending => ConditionKind::EndingWith,
    }
}

const STRING_MATCHERS: [StringMatcher; 4] = [
    StringMatcher::Exact,
    StringMatcher::Containing,
    StringMatcher::Starting,
    StringMatcher::Ending,
];

/// Generates the guarded example fragments for one property.
///
/// String properties get one fragment per (matcher × ignore-case)
/// combination plus the include-null check; other kinds get the null check
/// and an exact match only. Fragments are mutually exclusive by guard
/// construction, not by runtime deduplication.
pub(crate) fn property_fragments(
    dialect: &Dialect,
    entity: &EntityDescriptor,
    property: &PropertyDescriptor,
    qualified: bool,
) -> Vec<Fragment> {
    let column = if qualified {
        format!(
            "{}.{}",
            dialect.quote_alias(&entity.name),
            dialect.quote(&property.column_name)
        )
    } else {
        dialect.quote(&property.column_name)
    };
    let value_param = format!("_example.{}.value", property.name);
    let mut fragments = Vec::new();

    fragments.push(Fragment::Test {
        guard: Guard::ExampleIncludesNull(property.name.clone()),
        body: vec![
            Fragment::stat(format!(" and {column}")),
            value_expression(ConditionKind::IsNull, IgnoreCase::Never, &[]),
        ],
    });

    if property.kind == ValueKind::String {
        for matcher in STRING_MATCHERS {
            let kind = condition_kind(matcher);
            for ignore_case in [true, false] {
                let column_side = if ignore_case {
                    format!("upper({column})")
                } else {
                    column.clone()
                };
                let case = if ignore_case {
                    IgnoreCase::WhenPossible
                } else {
                    IgnoreCase::Never
                };
                fragments.push(Fragment::Test {
                    guard: Guard::ExampleMatches {
                        property: property.name.clone(),
                        matcher,
                        ignore_case: Some(ignore_case),
                    },
                    body: vec![
                        Fragment::stat(format!(" and {column_side}{}", operator(kind))),
                        value_expression(kind, case, &[value_param.as_str()]),
                    ],
                });
            }
        }
    } else {
        fragments.push(Fragment::Test {
            guard: Guard::ExampleMatches {
                property: property.name.clone(),
                matcher: StringMatcher::Exact,
                ignore_case: None,
            },
            body: vec![
                Fragment::stat(format!(
                    " and {column}{}",
                    operator(ConditionKind::Simple)
                )),
                value_expression(ConditionKind::Simple, IgnoreCase::Never, &[value_param.as_str()]),
            ],
        });
    }

    fragments
}

/// Guarded fragments for every non-identifier property of the entity.
/// `qualified` controls whether columns carry the table alias; delete
/// statements drop it on dialects that reject aliased deletes.
pub(crate) fn entity_fragments(
    dialect: &Dialect,
    entity: &EntityDescriptor,
    qualified: bool,
) -> Vec<Fragment> {
    entity
        .persistent_properties()
        .flat_map(|property| property_fragments(dialect, entity, property, qualified))
        .collect()
}
