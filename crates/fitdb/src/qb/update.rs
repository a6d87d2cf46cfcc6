//! UPDATE query descriptor.

use crate::condition::Condition;
use crate::error::{DbError, DbResult};
use crate::ident::Ident;
use crate::qb::traits::QueryBuilder;
use crate::qb::write_returning;
use crate::sql::{CompiledQuery, SqlWriter};
use crate::value::Record;

/// UPDATE descriptor.
///
/// The WHERE condition is a required constructor argument; use
/// [`Condition::all()`] to update every row on purpose.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    pub table: String,
    pub schema: Option<String>,
    /// Columns to set, applied in map order.
    pub values: Record,
    pub filter: Condition,
    pub returning: Vec<String>,
}

impl UpdateQuery {
    pub fn new(table: &str, values: Record, filter: Condition) -> Self {
        Self {
            table: table.to_string(),
            schema: None,
            values,
            filter,
            returning: Vec::new(),
        }
    }

    /// Qualify the table with a schema.
    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    /// Set RETURNING columns.
    pub fn returning(mut self, cols: &[&str]) -> Self {
        self.returning = cols.iter().map(|s| s.to_string()).collect();
        self
    }
}

impl QueryBuilder for UpdateQuery {
    fn build(&self) -> CompiledQuery {
        let mut w = SqlWriter::new();
        w.push("update ")
            .push_ident(&Ident::table(self.schema.as_deref(), &self.table))
            .push(" set ")
            .push_separated(self.values.iter(), ", ", |w, (col, value)| {
                w.push_ident(&Ident::parse(col))
                    .push(" = ")
                    .push_bind(value.clone());
            })
            .push(" where ");
        self.filter.write_to(&mut w);
        write_returning(&mut w, &self.returning);
        w.finish()
    }

    fn validate(&self) -> DbResult<()> {
        if self.values.is_empty() {
            return Err(DbError::validation(format!(
                "update {} requires at least one column to set",
                self.table
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::eq;
    use crate::value::Value;

    #[test]
    fn test_set_in_map_order() {
        let q = UpdateQuery::new(
            "users",
            Record::new().set("name", "Jane").set("bio", None::<String>),
            eq("id", 1),
        )
        .build();
        assert_eq!(
            q.sql(),
            r#"update "users" set "name" = ?, "bio" = ? where "id" = ?"#
        );
        assert_eq!(
            q.bindings(),
            &[Value::Text("Jane".into()), Value::Null, Value::Int(1)]
        );
    }

    #[test]
    fn test_update_all_is_explicit() {
        let q = UpdateQuery::new("users", Record::new().set("active", false), Condition::all());
        assert_eq!(q.to_sql(), r#"update "users" set "active" = ? where true"#);
    }

    #[test]
    fn test_empty_values_fail_validation() {
        let q = UpdateQuery::new("users", Record::new(), eq("id", 1));
        assert!(matches!(q.validate(), Err(DbError::Validation(_))));
    }
}
