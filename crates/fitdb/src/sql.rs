//! SQL text generation.
//!
//! Builders never format values into SQL. They write keywords, identifiers and bound
//! values into a [`SqlWriter`] as separate parts; the resulting [`CompiledQuery`] can
//! then be rendered either in the dialect-neutral `?` form (what tests and logs compare
//! against) or in a dialect's native placeholder form (`$1, $2, ...` for Postgres).
//!
//! # Example
//!
//! ```ignore
//! use fitdb::{Dialect, qb::{QueryBuilder, SelectQuery}, condition::eq};
//!
//! let q = SelectQuery::new("users").filter(eq("id", 1)).limit(1).build();
//! assert_eq!(q.sql(), r#"select * from "users" where "id" = ? limit ?"#);
//! assert_eq!(q.to_native(Dialect::Postgres), r#"select * from "users" where "id" = $1 limit $2"#);
//! ```

use crate::ident::Ident;
use crate::value::Value;
use std::fmt::Write;

/// SQL dialect used to render a [`CompiledQuery`] for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
}

impl Dialect {
    /// Quote character for identifiers.
    pub fn quote_char(self) -> char {
        match self {
            Dialect::Postgres => '"',
        }
    }

    /// Write the placeholder for the 1-based parameter `idx`.
    pub fn write_placeholder(self, idx: usize, out: &mut String) {
        match self {
            Dialect::Postgres => {
                let _ = write!(out, "${idx}");
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SqlPart {
    Raw(String),
    Ident(Ident),
    Param,
}

/// Accumulates statement parts and their bindings in order.
#[derive(Debug, Default)]
pub struct SqlWriter {
    parts: Vec<SqlPart>,
    bindings: Vec<Value>,
}

impl SqlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw SQL (keywords, operators, punctuation).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }
        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a quoted identifier.
    pub fn push_ident(&mut self, ident: &Ident) -> &mut Self {
        self.parts.push(SqlPart::Ident(ident.clone()));
        self
    }

    /// Append a placeholder and bind its value.
    pub fn push_bind(&mut self, value: Value) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.bindings.push(value);
        self
    }

    /// Append `items` separated by `sep`, rendering each with `f`.
    pub fn push_separated<T>(
        &mut self,
        items: impl IntoIterator<Item = T>,
        sep: &str,
        mut f: impl FnMut(&mut Self, T),
    ) -> &mut Self {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.push(sep);
            }
            f(self, item);
        }
        self
    }

    pub fn finish(self) -> CompiledQuery {
        CompiledQuery {
            parts: self.parts,
            bindings: self.bindings,
        }
    }
}

/// A built statement: SQL parts plus bound values, kept together.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    parts: Vec<SqlPart>,
    bindings: Vec<Value>,
}

impl CompiledQuery {
    /// Render with `?` placeholders and double-quoted identifiers.
    pub fn sql(&self) -> String {
        self.render('"', |_, out| out.push('?'))
    }

    /// Render with the dialect's native placeholders and quoting.
    pub fn to_native(&self, dialect: Dialect) -> String {
        self.render(dialect.quote_char(), |idx, out| {
            dialect.write_placeholder(idx, out)
        })
    }

    /// Bound values in placeholder order.
    pub fn bindings(&self) -> &[Value] {
        &self.bindings
    }

    pub fn into_bindings(self) -> Vec<Value> {
        self.bindings
    }

    fn render(&self, quote: char, mut placeholder: impl FnMut(usize, &mut String)) -> String {
        let mut out = String::new();
        let mut idx = 0;
        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Ident(ident) => ident.write_quoted(quote, &mut out),
                SqlPart::Param => {
                    idx += 1;
                    placeholder(idx, &mut out);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_placeholders_in_order() {
        let mut w = SqlWriter::new();
        w.push("select * from ")
            .push_ident(&Ident::parse("users"))
            .push(" where ")
            .push_ident(&Ident::parse("a"))
            .push(" = ")
            .push_bind(Value::from(1))
            .push(" and ")
            .push_ident(&Ident::parse("b"))
            .push(" = ")
            .push_bind(Value::from("x"));
        let q = w.finish();

        assert_eq!(q.sql(), r#"select * from "users" where "a" = ? and "b" = ?"#);
        assert_eq!(
            q.to_native(Dialect::Postgres),
            r#"select * from "users" where "a" = $1 and "b" = $2"#
        );
        assert_eq!(q.bindings(), &[Value::Int(1), Value::Text("x".into())]);
    }

    #[test]
    fn question_marks_inside_identifiers_are_not_placeholders() {
        let mut w = SqlWriter::new();
        w.push_ident(&Ident::parse("why?")).push(" = ").push_bind(Value::Null);
        assert_eq!(w.finish().to_native(Dialect::Postgres), r#""why?" = $1"#);
    }

    #[test]
    fn separated_renders_commas() {
        let mut w = SqlWriter::new();
        w.push("(")
            .push_separated([1, 2, 3], ", ", |w, v| {
                w.push_bind(Value::from(v));
            })
            .push(")");
        let q = w.finish();
        assert_eq!(q.sql(), "(?, ?, ?)");
        assert_eq!(q.bindings().len(), 3);
    }
}
