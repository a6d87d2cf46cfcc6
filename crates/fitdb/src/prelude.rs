//! Convenient imports for typical `fitdb` usage.
//!
//! ```ignore
//! use fitdb::prelude::*;
//! ```

pub use crate::{
    Database, DatabaseConfig, DatabaseProvider, DatabaseProviderExt, DatabaseRegistry, DbError,
    DbResult, FromRow, GenericClient, Record, Row, RowExt, Value,
};

pub use crate::condition::{
    Condition, and, between, eq, gt, gte, ilike, in_list, is_not_null, is_null, like, lt, lte,
    neq, not, not_in, or,
};

pub use crate::qb::{
    DeleteQuery, Direction, InsertQuery, Join, JoinOp, JoinType, QueryBuilder, SelectQuery,
    UpdateQuery,
};
