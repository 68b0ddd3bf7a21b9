//! Condition fragment building.
//!
//! Every supported comparison is split into two pieces the way the rendered
//! SQL needs them: the operator token that follows the column reference, and
//! the value expression on the right-hand side. Keeping the two separate
//! lets callers wrap the column side (`upper(...)`) independently of the
//! value side.

use crate::fragment::Fragment;

/// Comparison kinds recognised by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    Between,
    Like,
    NotLike,
    Containing,
    NotContaining,
    StartingWith,
    EndingWith,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
    True,
    False,
    Simple,
    NegatingSimple,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Before,
    After,
}

/// Case sensitivity requested for a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IgnoreCase {
    /// Wrap both sides in `upper(...)` unconditionally.
    Always,
    /// Wrap when the underlying property is string-typed. Callers resolve
    /// the type before building, so here it behaves like [`Always`].
    ///
    /// [`Always`]: IgnoreCase::Always
    WhenPossible,
    #[default]
    Never,
}

impl IgnoreCase {
    fn applies(self) -> bool {
        !matches!(self, IgnoreCase::Never)
    }
}

/// The operator token emitted between the column and the value expression.
///
/// Kinds whose value expression carries the whole right-hand side (null and
/// emptiness checks, boolean literals) have an empty operator.
#[must_use]
pub fn operator(kind: ConditionKind) -> &'static str {
    match kind {
        ConditionKind::Between => " between",
        ConditionKind::Like
        | ConditionKind::Containing
        | ConditionKind::StartingWith
        | ConditionKind::EndingWith => " like ",
        ConditionKind::NotLike | ConditionKind::NotContaining => " not like ",
        ConditionKind::In => " in ",
        ConditionKind::NotIn => " not in ",
        ConditionKind::IsNull
        | ConditionKind::IsNotNull
        | ConditionKind::IsEmpty
        | ConditionKind::IsNotEmpty
        | ConditionKind::True
        | ConditionKind::False => "",
        ConditionKind::Simple => "=",
        ConditionKind::NegatingSimple => "<>",
        ConditionKind::LessThan | ConditionKind::Before => "<",
        ConditionKind::LessThanEqual => "<=",
        ConditionKind::GreaterThan | ConditionKind::After => ">",
        ConditionKind::GreaterThanEqual => ">=",
    }
}

fn wrap_case(expression: String, ignore_case: IgnoreCase) -> String {
    if ignore_case.applies() {
        format!("upper({expression})")
    } else {
        expression
    }
}

/// Builds the right-hand side of a condition.
///
/// `params` supplies the placeholder paths the kind consumes: two for
/// `Between`, one collection name for `In`/`NotIn`, one for the remaining
/// parameterised kinds and none for the literal ones.
///
/// # Panics
///
/// Panics when `params` does not carry the arity the kind requires. The
/// statement builders are the only callers and pass fixed-shape slices.
#[must_use]
pub fn value_expression(kind: ConditionKind, ignore_case: IgnoreCase, params: &[&str]) -> Fragment {
    match kind {
        ConditionKind::Between => Fragment::stat(format!(
            " #{{{}}} and #{{{}}}",
            params[0], params[1]
        )),
        ConditionKind::Like | ConditionKind::NotLike => Fragment::stat(wrap_case(
            format!("#{{{}}}", params[0]),
            ignore_case,
        )),
        ConditionKind::Containing | ConditionKind::NotContaining => Fragment::stat(wrap_case(
            format!("concat('%',#{{{}}},'%')", params[0]),
            ignore_case,
        )),
        ConditionKind::StartingWith => Fragment::stat(wrap_case(
            format!("concat(#{{{}}},'%')", params[0]),
            ignore_case,
        )),
        ConditionKind::EndingWith => Fragment::stat(wrap_case(
            format!("concat('%',#{{{}}})", params[0]),
            ignore_case,
        )),
        ConditionKind::In | ConditionKind::NotIn => Fragment::ForEach {
            collection: params[0].to_string(),
            open: "(".to_string(),
            separator: ",".to_string(),
            close: ")".to_string(),
        },
        ConditionKind::IsNull => Fragment::stat(" is null"),
        ConditionKind::IsNotNull => Fragment::stat(" is not null"),
        ConditionKind::IsEmpty => Fragment::stat("=''"),
        ConditionKind::IsNotEmpty => Fragment::stat("<>''"),
        ConditionKind::True => Fragment::stat("=true"),
        ConditionKind::False => Fragment::stat("=false"),
        ConditionKind::Simple
        | ConditionKind::NegatingSimple
        | ConditionKind::LessThan
        | ConditionKind::LessThanEqual
        | ConditionKind::GreaterThan
        | ConditionKind::GreaterThanEqual
        | ConditionKind::Before
        | ConditionKind::After => Fragment::stat(wrap_case(
            format!("#{{{}}}", params[0]),
            ignore_case,
        )),
    }
}
