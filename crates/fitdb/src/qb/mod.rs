//! Query descriptors and their builders.
//!
//! Each descriptor is plain data describing one statement shape. Building it is pure and
//! yields a [`CompiledQuery`](crate::CompiledQuery): SQL parts plus bound values, never
//! values formatted into the SQL text.
//!
//! # Usage
//!
//! ```ignore
//! use fitdb::condition::{eq, gt};
//! use fitdb::qb::{self, Direction, QueryBuilder};
//! use fitdb::Record;
//!
//! // SELECT
//! let workouts = qb::select("workouts")
//!     .filter(eq("user_id", user_id).and(gt("duration", 600)))
//!     .order_by("started_at", Direction::Desc)
//!     .limit(20)
//!     .fetch_all_as::<Workout>(&client)
//!     .await?;
//!
//! // INSERT
//! qb::insert("exercises", Record::new().set("name", "Deadlift"))
//!     .returning(&["id"])
//!     .run(&client)
//!     .await?;
//!
//! // UPDATE
//! qb::update("users", Record::new().set("status", "inactive"), eq("id", user_id))
//!     .run(&client)
//!     .await?;
//!
//! // DELETE
//! qb::delete("sessions", eq("user_id", user_id)).run(&client).await?;
//! ```

mod delete;
mod insert;
mod select;
mod traits;
mod update;

pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use select::{Direction, Join, JoinOp, JoinType, OrderBy, SelectQuery};
pub use traits::QueryBuilder;
pub use update::UpdateQuery;

use crate::condition::Condition;
use crate::ident::Ident;
use crate::sql::SqlWriter;
use crate::value::Record;

/// Create a SELECT descriptor for the given table.
pub fn select(table: &str) -> SelectQuery {
    SelectQuery::new(table)
}

/// Create a single-row INSERT descriptor.
pub fn insert(table: &str, row: Record) -> InsertQuery {
    InsertQuery::new(table, row)
}

/// Create an UPDATE descriptor.
pub fn update(table: &str, values: Record, filter: Condition) -> UpdateQuery {
    UpdateQuery::new(table, values, filter)
}

/// Create a DELETE descriptor.
///
/// There is no unscoped variant: pass [`Condition::all()`] to delete every row.
pub fn delete(table: &str, filter: Condition) -> DeleteQuery {
    DeleteQuery::new(table, filter)
}

pub(crate) fn write_returning(w: &mut SqlWriter, columns: &[String]) {
    if columns.is_empty() {
        return;
    }
    w.push(" returning ");
    w.push_separated(columns, ", ", |w, col| {
        w.push_ident(&Ident::parse(col));
    });
}

#[cfg(test)]
mod tests;
