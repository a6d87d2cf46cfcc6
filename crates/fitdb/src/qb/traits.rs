//! Trait definitions for query builders.

use crate::client::{GenericClient, QueryResult};
use crate::error::DbResult;
use crate::sql::CompiledQuery;

/// Base trait for all query descriptors.
///
/// `build` is pure: the same descriptor always yields the same SQL text and bindings.
pub trait QueryBuilder: Sync {
    /// Build the SQL and its bindings.
    fn build(&self) -> CompiledQuery;

    /// Validate descriptor state before execution.
    fn validate(&self) -> DbResult<()> {
        Ok(())
    }

    /// Debug helper to get the `?`-placeholder SQL string.
    fn to_sql(&self) -> String {
        self.build().sql()
    }

    /// Validate, build, and execute against a client or transaction.
    fn run(
        &self,
        conn: &impl GenericClient,
    ) -> impl std::future::Future<Output = DbResult<QueryResult>> + Send {
        async move {
            self.validate()?;
            let query = self.build();
            conn.run(&query).await
        }
    }
}
