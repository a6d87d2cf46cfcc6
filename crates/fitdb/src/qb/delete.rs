//! DELETE query descriptor.

use crate::condition::Condition;
use crate::ident::Ident;
use crate::qb::traits::QueryBuilder;
use crate::qb::write_returning;
use crate::sql::{CompiledQuery, SqlWriter};

/// DELETE descriptor.
///
/// The WHERE condition is a required constructor argument; use
/// [`Condition::all()`] to delete every row on purpose.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    pub table: String,
    pub schema: Option<String>,
    pub filter: Condition,
    pub returning: Vec<String>,
}

impl DeleteQuery {
    pub fn new(table: &str, filter: Condition) -> Self {
        Self {
            table: table.to_string(),
            schema: None,
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

impl QueryBuilder for DeleteQuery {
    fn build(&self) -> CompiledQuery {
        let mut w = SqlWriter::new();
        w.push("delete from ")
            .push_ident(&Ident::table(self.schema.as_deref(), &self.table))
            .push(" where ");
        self.filter.write_to(&mut w);
        write_returning(&mut w, &self.returning);
        w.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{eq, lt};

    #[test]
    fn test_delete_basic() {
        let q = DeleteQuery::new("invitations", eq("id", 9i64));
        assert_eq!(q.to_sql(), r#"delete from "invitations" where "id" = ?"#);
    }

    #[test]
    fn test_delete_returning() {
        let q = DeleteQuery::new("sessions", lt("expires_at", 100i64)).returning(&["id", "user_id"]);
        assert_eq!(
            q.to_sql(),
            r#"delete from "sessions" where "expires_at" < ? returning "id", "user_id""#
        );
    }
}
