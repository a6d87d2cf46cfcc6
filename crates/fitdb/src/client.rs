//! Generic client trait for unified statement execution.

use crate::error::DbResult;
use crate::sql::{CompiledQuery, Dialect};
use crate::value::Value;
use futures_util::{TryStreamExt, pin_mut};
use std::time::Instant;
use tokio_postgres::{Row, RowStream};

/// The driver-native outcome of one statement: returned rows plus the affected-row count.
#[derive(Debug, Default)]
pub struct QueryResult {
    /// Rows returned by the statement (SELECT output or `returning` columns).
    pub rows: Vec<Row>,
    /// Rows affected, as reported by the server.
    pub rows_affected: u64,
}

impl QueryResult {
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

/// A trait that unifies pooled clients, plain clients and transactions.
///
/// Builders run against anything implementing it, so the same descriptor executes on the
/// pool or inside an explicit transaction without changes.
pub trait GenericClient: Send + Sync {
    /// Execute native SQL (`$1, $2, ...`) with the given bindings.
    fn query_values(
        &self,
        sql: &str,
        values: &[Value],
    ) -> impl std::future::Future<Output = DbResult<QueryResult>> + Send;

    /// Execute a compiled statement.
    fn run(
        &self,
        query: &CompiledQuery,
    ) -> impl std::future::Future<Output = DbResult<QueryResult>> + Send {
        async move {
            let sql = query.to_native(Dialect::Postgres);
            self.query_values(&sql, query.bindings()).await
        }
    }
}

async fn collect(stream: RowStream) -> DbResult<QueryResult> {
    pin_mut!(stream);
    let mut rows = Vec::new();
    while let Some(row) = stream.try_next().await? {
        rows.push(row);
    }
    let rows_affected = stream.rows_affected().unwrap_or(rows.len() as u64);
    Ok(QueryResult {
        rows,
        rows_affected,
    })
}

fn log_statement(sql: &str, param_count: usize, started: Instant, result: &DbResult<QueryResult>) {
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    match result {
        Ok(res) => tracing::debug!(
            target: "fitdb::sql",
            sql,
            param_count,
            rows_affected = res.rows_affected,
            elapsed_ms,
            "statement executed"
        ),
        Err(err) => tracing::debug!(
            target: "fitdb::sql",
            sql,
            param_count,
            elapsed_ms,
            error = %err,
            "statement failed"
        ),
    }
}

impl GenericClient for tokio_postgres::Client {
    async fn query_values(&self, sql: &str, values: &[Value]) -> DbResult<QueryResult> {
        let started = Instant::now();
        let result = match self.query_raw(sql, values.iter()).await {
            Ok(stream) => collect(stream).await,
            Err(err) => Err(err.into()),
        };
        log_statement(sql, values.len(), started, &result);
        result
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query_values(&self, sql: &str, values: &[Value]) -> DbResult<QueryResult> {
        let started = Instant::now();
        let result = match self.query_raw(sql, values.iter()).await {
            Ok(stream) => collect(stream).await,
            Err(err) => Err(err.into()),
        };
        log_statement(sql, values.len(), started, &result);
        result
    }
}

impl GenericClient for deadpool_postgres::Client {
    async fn query_values(&self, sql: &str, values: &[Value]) -> DbResult<QueryResult> {
        let client: &tokio_postgres::Client = self;
        GenericClient::query_values(client, sql, values).await
    }
}

impl GenericClient for deadpool_postgres::Transaction<'_> {
    async fn query_values(&self, sql: &str, values: &[Value]) -> DbResult<QueryResult> {
        let tx: &tokio_postgres::Transaction<'_> = self;
        GenericClient::query_values(tx, sql, values).await
    }
}
