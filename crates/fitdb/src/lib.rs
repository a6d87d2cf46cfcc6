//! # fitdb
//!
//! Descriptor-driven SQL building and pooled Postgres access for the workout tracker.
//!
//! ## Features
//!
//! - **Plain-data queries**: describe a SELECT/INSERT/UPDATE/DELETE as a struct, build it
//!   into SQL text plus bound values
//! - **Composable filters**: `eq`, `gt`, `in_list`, `and`, `or` and friends build a
//!   `Condition` tree; groups carry their own parentheses
//! - **Safe defaults**: UPDATE and DELETE take a filter in their constructor
//! - **Transaction-friendly**: descriptors run on anything implementing `GenericClient`
//! - **Named databases**: a registry hands out connected providers by name
//!
//! ## Query descriptors (qb)
//!
//! ```ignore
//! use fitdb::prelude::*;
//!
//! let db = registry.get(fitdb::registry::MAIN)?;
//!
//! // SELECT
//! let rows = db
//!     .select(&SelectQuery::new("users").filter(eq("id", 1)).limit(1))
//!     .await?;
//!
//! // INSERT
//! db.insert(&InsertQuery::new("users", Record::new().set("name", "John")))
//!     .await?;
//!
//! // UPDATE
//! db.update(&UpdateQuery::new("users", Record::new().set("name", "Jane"), eq("id", 1)))
//!     .await?;
//!
//! // DELETE
//! db.delete(&DeleteQuery::new("users", eq("id", 1))).await?;
//! ```

pub mod client;
pub mod condition;
pub mod config;
pub mod error;
pub mod ident;
pub mod pool;
pub mod prelude;
pub mod provider;
pub mod qb;
pub mod registry;
pub mod row;
pub mod sql;
pub mod transaction;
pub mod value;

pub use client::{GenericClient, QueryResult};
pub use condition::{CompareOp, Condition};
pub use config::{DatabaseConfig, Engine, PoolConfig};
pub use error::{DbError, DbResult};
pub use ident::Ident;
pub use provider::{
    DatabaseProvider, DatabaseProviderExt, PgProvider, PoolStatus, PooledClient, create_provider,
    create_provider_for,
};
pub use registry::{Database, DatabaseRegistry, ProviderFactory};
pub use row::{FromRow, RowExt};
pub use sql::{CompiledQuery, Dialect, SqlWriter};
pub use value::{Record, Value};

// Re-export qb module for easy access
pub use qb::{
    DeleteQuery, Direction, InsertQuery, Join, JoinOp, JoinType, OrderBy, QueryBuilder,
    SelectQuery, UpdateQuery,
};

pub use tokio_postgres::Row;

#[doc(hidden)]
pub use tracing as __tracing;
