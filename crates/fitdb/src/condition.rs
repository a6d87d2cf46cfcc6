//! WHERE-clause predicates.
//!
//! A [`Condition`] is an immutable tree: leaves compare one column against bound
//! values, and [`and`] / [`or`] / [`not`] compose other conditions. Builders interpret
//! the tree into SQL; nothing here touches a connection, so conditions can be built,
//! cloned and rendered in isolation.
//!
//! ```ignore
//! use fitdb::condition::{and, eq, gt, or};
//!
//! let active_admins = and(vec![
//!     eq("status", "active"),
//!     or(vec![eq("role", "admin"), gt("level", 9)]),
//! ]);
//! ```
//!
//! Combinators never fail. Column names are quoted but not checked, and values are
//! bound as parameters, so any mistake surfaces when the database runs the statement.

use crate::ident::Ident;
use crate::sql::SqlWriter;
use crate::value::Value;

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    Like,
    Ilike,
}

impl CompareOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "<>",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Gte => ">=",
            CompareOp::Lte => "<=",
            CompareOp::Like => "like",
            CompareOp::Ilike => "ilike",
        }
    }
}

/// A composable WHERE predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column <op> value`
    Compare {
        column: Ident,
        op: CompareOp,
        value: Value,
    },
    /// `column in (...)` / `column not in (...)`
    InList {
        column: Ident,
        values: Vec<Value>,
        negated: bool,
    },
    /// `column is null` / `column is not null`
    NullCheck { column: Ident, is_null: bool },
    /// `column between low and high` (inclusive)
    Between {
        column: Ident,
        low: Value,
        high: Value,
    },
    /// Every sub-condition holds.
    And(Vec<Condition>),
    /// At least one sub-condition holds.
    Or(Vec<Condition>),
    /// The sub-condition does not hold.
    Not(Box<Condition>),
}

fn compare(column: &str, op: CompareOp, value: impl Into<Value>) -> Condition {
    Condition::Compare {
        column: Ident::parse(column),
        op,
        value: value.into(),
    }
}

/// `column = value`
pub fn eq(column: &str, value: impl Into<Value>) -> Condition {
    compare(column, CompareOp::Eq, value)
}

/// `column <> value`
pub fn neq(column: &str, value: impl Into<Value>) -> Condition {
    compare(column, CompareOp::Neq, value)
}

/// `column > value`
pub fn gt(column: &str, value: impl Into<Value>) -> Condition {
    compare(column, CompareOp::Gt, value)
}

/// `column < value`
pub fn lt(column: &str, value: impl Into<Value>) -> Condition {
    compare(column, CompareOp::Lt, value)
}

/// `column >= value`
pub fn gte(column: &str, value: impl Into<Value>) -> Condition {
    compare(column, CompareOp::Gte, value)
}

/// `column <= value`
pub fn lte(column: &str, value: impl Into<Value>) -> Condition {
    compare(column, CompareOp::Lte, value)
}

/// `column like pattern`. Wildcards are the caller's; the pattern is bound verbatim.
pub fn like(column: &str, pattern: impl Into<Value>) -> Condition {
    compare(column, CompareOp::Like, pattern)
}

/// `column ilike pattern` (case-insensitive, Postgres).
pub fn ilike(column: &str, pattern: impl Into<Value>) -> Condition {
    compare(column, CompareOp::Ilike, pattern)
}

/// `column in (values...)`. An empty list is kept as-is and renders `1 = 0`.
pub fn in_list<V: Into<Value>>(column: &str, values: impl IntoIterator<Item = V>) -> Condition {
    Condition::InList {
        column: Ident::parse(column),
        values: values.into_iter().map(Into::into).collect(),
        negated: false,
    }
}

/// `column not in (values...)`. An empty list is kept as-is and renders `1 = 1`.
pub fn not_in<V: Into<Value>>(column: &str, values: impl IntoIterator<Item = V>) -> Condition {
    Condition::InList {
        column: Ident::parse(column),
        values: values.into_iter().map(Into::into).collect(),
        negated: true,
    }
}

/// `column is null`
pub fn is_null(column: &str) -> Condition {
    Condition::NullCheck {
        column: Ident::parse(column),
        is_null: true,
    }
}

/// `column is not null`
pub fn is_not_null(column: &str) -> Condition {
    Condition::NullCheck {
        column: Ident::parse(column),
        is_null: false,
    }
}

/// `column between low and high`
pub fn between(column: &str, (low, high): (impl Into<Value>, impl Into<Value>)) -> Condition {
    Condition::Between {
        column: Ident::parse(column),
        low: low.into(),
        high: high.into(),
    }
}

/// All of `conditions`. An empty list matches every row.
pub fn and(conditions: Vec<Condition>) -> Condition {
    Condition::And(conditions)
}

/// Any of `conditions`. An empty list matches no row.
pub fn or(conditions: Vec<Condition>) -> Condition {
    Condition::Or(conditions)
}

/// Negation of `condition`.
pub fn not(condition: Condition) -> Condition {
    Condition::Not(Box::new(condition))
}

impl Condition {
    /// A condition matching every row, for deliberately unscoped UPDATE/DELETE.
    pub fn all() -> Self {
        Condition::And(Vec::new())
    }

    /// Combine with another condition under AND.
    pub fn and(self, other: Condition) -> Self {
        match self {
            Condition::And(mut conditions) => {
                conditions.push(other);
                Condition::And(conditions)
            }
            this => Condition::And(vec![this, other]),
        }
    }

    /// Combine with another condition under OR.
    pub fn or(self, other: Condition) -> Self {
        match self {
            Condition::Or(mut conditions) => {
                conditions.push(other);
                Condition::Or(conditions)
            }
            this => Condition::Or(vec![this, other]),
        }
    }

    /// Write this condition into `w`.
    ///
    /// Groups (`and`, `or`, `not`) carry their own parentheses, so a rendered group can
    /// sit next to any sibling without precedence leaking across the boundary.
    pub fn write_to(&self, w: &mut SqlWriter) {
        match self {
            Condition::Compare { column, op, value } => {
                w.push_ident(column)
                    .push(" ")
                    .push(op.as_sql())
                    .push(" ")
                    .push_bind(value.clone());
            }
            Condition::InList {
                values, negated, ..
            } if values.is_empty() => {
                w.push(if *negated { "1 = 1" } else { "1 = 0" });
            }
            Condition::InList {
                column,
                values,
                negated,
            } => {
                w.push_ident(column)
                    .push(if *negated { " not in (" } else { " in (" })
                    .push_separated(values, ", ", |w, v| {
                        w.push_bind(v.clone());
                    })
                    .push(")");
            }
            Condition::NullCheck { column, is_null } => {
                w.push_ident(column)
                    .push(if *is_null { " is null" } else { " is not null" });
            }
            Condition::Between { column, low, high } => {
                w.push_ident(column)
                    .push(" between ")
                    .push_bind(low.clone())
                    .push(" and ")
                    .push_bind(high.clone());
            }
            Condition::And(conditions) if conditions.is_empty() => {
                w.push("true");
            }
            Condition::Or(conditions) if conditions.is_empty() => {
                w.push("false");
            }
            Condition::And(conditions) => write_group(w, conditions, " and "),
            Condition::Or(conditions) => write_group(w, conditions, " or "),
            Condition::Not(inner) => {
                w.push("not (");
                inner.write_to(w);
                w.push(")");
            }
        }
    }
}

fn write_group(w: &mut SqlWriter, conditions: &[Condition], sep: &str) {
    w.push("(");
    w.push_separated(conditions, sep, |w, c| c.write_to(w));
    w.push(")");
}
