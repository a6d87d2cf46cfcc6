//! INSERT query descriptor.

use crate::error::{DbError, DbResult};
use crate::ident::Ident;
use crate::qb::traits::QueryBuilder;
use crate::qb::write_returning;
use crate::sql::{CompiledQuery, SqlWriter};
use crate::value::Record;

/// INSERT descriptor: one or many rows in a single statement.
///
/// The column list is the union of every row's columns in first-seen order. A row that
/// lacks one of those columns gets `default` in that slot; an explicit
/// [`Value::Null`](crate::Value::Null) binds SQL NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    pub table: String,
    pub schema: Option<String>,
    pub rows: Vec<Record>,
    pub returning: Vec<String>,
}

impl InsertQuery {
    /// Create an INSERT of a single row.
    pub fn new(table: &str, row: Record) -> Self {
        Self::many(table, vec![row])
    }

    /// Create an INSERT of several rows. An empty list fails validation.
    pub fn many(table: &str, rows: Vec<Record>) -> Self {
        Self {
            table: table.to_string(),
            schema: None,
            rows,
            returning: Vec::new(),
        }
    }

    /// Qualify the table with a schema.
    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    /// Append another row.
    pub fn row(mut self, row: Record) -> Self {
        self.rows.push(row);
        self
    }

    /// Set RETURNING columns.
    pub fn returning(mut self, cols: &[&str]) -> Self {
        self.returning = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Column union across rows, in first-seen order.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for row in &self.rows {
            for col in row.columns() {
                if !columns.contains(&col) {
                    columns.push(col);
                }
            }
        }
        columns
    }
}

impl QueryBuilder for InsertQuery {
    fn build(&self) -> CompiledQuery {
        let mut w = SqlWriter::new();
        w.push("insert into ")
            .push_ident(&Ident::table(self.schema.as_deref(), &self.table));

        let columns = self.columns();
        if columns.is_empty() {
            w.push(" default values");
        } else {
            w.push(" (")
                .push_separated(&columns, ", ", |w, col| {
                    w.push_ident(&Ident::parse(col));
                })
                .push(") values ");
            w.push_separated(&self.rows, ", ", |w, row| {
                w.push("(")
                    .push_separated(&columns, ", ", |w, col| match row.get(col) {
                        Some(value) => {
                            w.push_bind(value.clone());
                        }
                        None => {
                            w.push("default");
                        }
                    })
                    .push(")");
            });
        }

        write_returning(&mut w, &self.returning);
        w.finish()
    }

    fn validate(&self) -> DbResult<()> {
        if self.rows.is_empty() {
            return Err(DbError::validation(format!(
                "insert into {} requires at least one row",
                self.table
            )));
        }
        // `default values` inserts exactly one row.
        if self.rows.len() > 1 && self.columns().is_empty() {
            return Err(DbError::validation(format!(
                "insert into {} has {} rows without columns",
                self.table,
                self.rows.len()
            )));
        }
        Ok(())
    }
}
