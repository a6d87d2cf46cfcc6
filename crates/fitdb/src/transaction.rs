//! Transaction helper macro.
//!
//! Builders are transaction-agnostic: anything implementing [`GenericClient`] can run
//! them, including `tokio_postgres::Transaction` and `deadpool_postgres::Transaction`.
//! The [`transaction!`] macro wraps a block in BEGIN/COMMIT/ROLLBACK on a client
//! checked out from a provider. Nested transactions are not supported.
//!
//! # Example
//!
//! ```ignore
//! use fitdb::{condition::eq, qb::{QueryBuilder, UpdateQuery, InsertQuery}, Record};
//!
//! let mut conn = db.connection().await?;
//! fitdb::transaction!(conn, tx, {
//!     UpdateQuery::new("workouts", Record::new().set("status", "done"), eq("id", 7))
//!         .run(&tx)
//!         .await?;
//!     InsertQuery::new("workout_log", Record::new().set("workout_id", 7))
//!         .run(&tx)
//!         .await?;
//!     Ok(())
//! })?;
//! ```
//!
//! [`GenericClient`]: crate::GenericClient

/// Runs the given block inside a database transaction.
///
/// - Begins a transaction via `$client.transaction().await`.
/// - Commits on `Ok(_)`.
/// - Rolls back on `Err(_)`, returning the block's error.
///
/// The block must evaluate to `fitdb::DbResult<T>`.
#[macro_export]
macro_rules! transaction {
    ($client:expr, $tx:ident, $body:block) => {{
        let $tx = ($client)
            .transaction()
            .await
            .map_err($crate::DbError::from)?;

        let __fitdb_tx_body_result = async { $body }.await;
        match __fitdb_tx_body_result {
            Ok(value) => {
                $tx.commit().await.map_err($crate::DbError::from)?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_err) = $tx.rollback().await {
                    $crate::__tracing::warn!(
                        target: "fitdb::sql",
                        error = %rollback_err,
                        "transaction rollback failed"
                    );
                }
                Err(error)
            }
        }
    }};
}
