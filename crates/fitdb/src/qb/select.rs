//! SELECT query descriptor.

use crate::client::GenericClient;
use crate::condition::Condition;
use crate::error::{DbError, DbResult};
use crate::ident::Ident;
use crate::qb::traits::QueryBuilder;
use crate::row::{FromRow, map_rows};
use crate::sql::{CompiledQuery, SqlWriter};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;
use tokio_postgres::Row;

/// Join flavour. Inner unless stated otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    fn as_sql(self) -> &'static str {
        match self {
            JoinType::Inner => "inner join",
            JoinType::Left => "left join",
            JoinType::Right => "right join",
            JoinType::Full => "full outer join",
        }
    }
}

/// Comparison between the two columns of a join condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinOp {
    #[default]
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
}

impl JoinOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinOp::Eq => "=",
            JoinOp::Ne => "<>",
            JoinOp::Lt => "<",
            JoinOp::Gt => ">",
            JoinOp::Lte => "<=",
            JoinOp::Gte => ">=",
        }
    }
}

impl fmt::Display for JoinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for JoinOp {
    type Err = DbError;

    /// Parse a textual operator. Anything outside the six comparisons is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" => Ok(JoinOp::Eq),
            "<>" | "!=" => Ok(JoinOp::Ne),
            "<" => Ok(JoinOp::Lt),
            ">" => Ok(JoinOp::Gt),
            "<=" => Ok(JoinOp::Lte),
            ">=" => Ok(JoinOp::Gte),
            other => Err(DbError::validation(format!(
                "unsupported join operator: {other:?}"
            ))),
        }
    }
}

/// `<kind> join <table> on <left> <operator> <right>`
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: String,
    /// `(left column, operator, right column)`
    pub on: (String, JoinOp, String),
    pub kind: JoinType,
}

impl Join {
    pub fn new(kind: JoinType, table: &str, on: (&str, JoinOp, &str)) -> Self {
        Self {
            table: table.to_string(),
            on: (on.0.to_string(), on.1, on.2.to_string()),
            kind,
        }
    }

    pub fn inner(table: &str, on: (&str, JoinOp, &str)) -> Self {
        Self::new(JoinType::Inner, table, on)
    }

    pub fn left(table: &str, on: (&str, JoinOp, &str)) -> Self {
        Self::new(JoinType::Left, table, on)
    }

    pub fn right(table: &str, on: (&str, JoinOp, &str)) -> Self {
        Self::new(JoinType::Right, table, on)
    }

    pub fn full(table: &str, on: (&str, JoinOp, &str)) -> Self {
        Self::new(JoinType::Full, table, on)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One ORDER BY term.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

/// SELECT descriptor.
///
/// Clauses render in a fixed order regardless of the order the builder methods were
/// called in: joins, where, order by, limit, offset.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    pub schema: Option<String>,
    /// Selected columns; empty means all columns.
    pub columns: Vec<String>,
    pub filter: Option<Condition>,
    pub joins: Vec<Join>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SelectQuery {
    /// Create a new SELECT descriptor for a table.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            schema: None,
            columns: Vec::new(),
            filter: None,
            joins: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Qualify the table with a schema.
    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    /// Set SELECT columns.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the WHERE condition, replacing any previous one.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = Some(condition);
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Add an ORDER BY term; terms sort in the order they were added.
    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order_by.push(OrderBy {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Pagination helper.
    ///
    /// `page` is 1-based (clamped to >= 1).
    /// `per_page` is clamped to >= 1.
    /// The offset saturates at `i64::MAX` instead of overflowing.
    pub fn paginate(mut self, page: i64, per_page: i64) -> Self {
        let p = page.max(1);
        let size = per_page.max(1);
        self.limit = Some(size);
        self.offset = Some((p - 1).saturating_mul(size));
        self
    }

    // ==================== Execution ====================

    /// Execute and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> DbResult<Vec<Row>> {
        Ok(self.run(conn).await?.rows)
    }

    /// Execute and map all rows to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> DbResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        map_rows(&rows)
    }

    /// Execute and return the first row, if any.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> DbResult<Option<Row>> {
        Ok(self.fetch_all(conn).await?.into_iter().next())
    }

    /// Execute and return the first row, failing with [`DbError::NotFound`] when empty.
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> DbResult<Row> {
        self.fetch_opt(conn)
            .await?
            .ok_or_else(|| DbError::not_found(format!("no row in {}", self.table)))
    }
}

impl QueryBuilder for SelectQuery {
    fn build(&self) -> CompiledQuery {
        let mut w = SqlWriter::new();

        w.push("select ");
        if self.columns.is_empty() {
            w.push("*");
        } else {
            w.push_separated(&self.columns, ", ", |w, col| {
                w.push_ident(&Ident::parse(col));
            });
        }
        w.push(" from ")
            .push_ident(&Ident::table(self.schema.as_deref(), &self.table));

        for join in &self.joins {
            let (left, op, right) = &join.on;
            w.push(" ")
                .push(join.kind.as_sql())
                .push(" ")
                .push_ident(&Ident::parse(&join.table))
                .push(" on ")
                .push_ident(&Ident::parse(left))
                .push(" ")
                .push(op.as_sql())
                .push(" ")
                .push_ident(&Ident::parse(right));
        }

        if let Some(filter) = &self.filter {
            w.push(" where ");
            filter.write_to(&mut w);
        }

        if !self.order_by.is_empty() {
            w.push(" order by ");
            w.push_separated(&self.order_by, ", ", |w, term| {
                w.push_ident(&Ident::parse(&term.column))
                    .push(match term.direction {
                        Direction::Asc => " asc",
                        Direction::Desc => " desc",
                    });
            });
        }

        if let Some(limit) = self.limit {
            w.push(" limit ").push_bind(Value::BigInt(limit));
        }
        if let Some(offset) = self.offset {
            w.push(" offset ").push_bind(Value::BigInt(offset));
        }

        w.finish()
    }
}
