use fitdb::condition::{eq, in_list};
use fitdb::{
    DatabaseConfig, DatabaseProvider, DatabaseProviderExt, DbError, DbResult, DeleteQuery,
    FromRow, InsertQuery, PgProvider, PoolConfig, QueryBuilder, Record, Row, RowExt, SelectQuery,
    UpdateQuery, Value, transaction,
};
use std::time::{SystemTime, UNIX_EPOCH};

fn live_config(test: &str) -> Option<DatabaseConfig> {
    let _ = dotenvy::dotenv();
    match DatabaseConfig::from_env() {
        Ok(config) => Some(config),
        Err(err) => {
            eprintln!("PG_* variables are not set ({err}); skipping {test}");
            None
        }
    }
}

fn unique_table(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    format!("fitdb_test_{prefix}_{}_{nanos}", std::process::id())
}

#[derive(Debug, PartialEq)]
struct Exercise {
    id: i64,
    name: String,
    muscle: Option<String>,
}

impl FromRow for Exercise {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            name: row.try_get_column("name")?,
            muscle: row.try_get_column("muscle")?,
        })
    }
}

async fn create_exercises(provider: &PgProvider, table: &str) -> DbResult<()> {
    provider
        .query(
            &format!(
                "create table \"{table}\" (id bigserial primary key, name text not null, muscle text)"
            ),
            &[],
        )
        .await?;
    Ok(())
}

#[tokio::test]
async fn disconnect_on_unconnected_provider_is_ok() -> DbResult<()> {
    let provider = PgProvider::new();
    provider.disconnect().await?;
    assert!(!provider.is_connected());
    Ok(())
}

#[tokio::test]
async fn unreachable_server_fails_connect() {
    let config = DatabaseConfig::new("127.0.0.1", 1, "u", "p", "d").with_pool(PoolConfig {
        connection_timeout_ms: 250,
        ..PoolConfig::default()
    });
    let provider = PgProvider::new();
    let err = provider.connect(&config).await.unwrap_err();
    assert!(matches!(err, DbError::Connection(_)), "{err}");
    assert!(!provider.is_connected());
}

#[tokio::test]
async fn connect_is_idempotent() -> DbResult<()> {
    let Some(config) = live_config("connect_is_idempotent") else {
        return Ok(());
    };

    let provider = PgProvider::new();
    provider.connect(&config).await?;
    let status = provider.status().expect("connected provider has a pool");
    assert!(status.size >= 1);

    provider.connect(&config).await?;
    assert_eq!(provider.status(), Some(status));

    // A connected provider never opens another pool, so an unreachable target is not touched.
    let unreachable = DatabaseConfig::new("127.0.0.1", 1, "u", "p", "d").with_pool(PoolConfig {
        max: status.max_size + 3,
        connection_timeout_ms: 250,
        ..PoolConfig::default()
    });
    provider.connect(&unreachable).await?;
    assert_eq!(provider.status(), Some(status));

    provider.disconnect().await?;
    assert!(!provider.is_connected());
    provider.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn crud_round_trip() -> DbResult<()> {
    let Some(config) = live_config("crud_round_trip") else {
        return Ok(());
    };

    let provider = PgProvider::new();
    provider.connect(&config).await?;
    let table = unique_table("crud");
    create_exercises(&provider, &table).await?;

    let inserted = provider
        .insert(
            &InsertQuery::many(
                &table,
                vec![
                    Record::new().set("name", "Squat").set("muscle", "legs"),
                    Record::new().set("name", "Plank").set("muscle", Value::Null),
                ],
            )
            .returning(&["id"]),
        )
        .await?;
    assert_eq!(inserted.rows_affected, 2);
    let ids: Vec<i64> = inserted.rows.iter().map(|r| r.get("id")).collect();

    let select = SelectQuery::new(&table).filter(eq("id", ids[0])).limit(1);
    assert_eq!(
        select.to_sql(),
        format!(r#"select * from "{table}" where "id" = ? limit ?"#)
    );
    let found: Vec<Exercise> = provider.select_as(&select).await?;
    assert_eq!(
        found,
        vec![Exercise {
            id: ids[0],
            name: "Squat".into(),
            muscle: Some("legs".into()),
        }]
    );

    let updated = provider
        .update(&UpdateQuery::new(
            &table,
            Record::new().set("muscle", "core"),
            eq("id", ids[1]),
        ))
        .await?;
    assert_eq!(updated.rows_affected, 1);

    let deleted = provider
        .delete(&DeleteQuery::new(&table, in_list("id", ids.clone())))
        .await?;
    assert_eq!(deleted.rows_affected, 2);

    provider
        .query(&format!("drop table \"{table}\""), &[])
        .await?;
    provider.disconnect().await
}

#[tokio::test]
async fn statement_errors_surface_verbatim() -> DbResult<()> {
    let Some(config) = live_config("statement_errors_surface_verbatim") else {
        return Ok(());
    };

    let provider = PgProvider::new();
    provider.connect(&config).await?;
    let err = provider
        .select(&SelectQuery::new("fitdb_missing_table"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Statement(_)), "{err}");
    // undefined_table
    assert_eq!(err.sql_state(), Some("42P01"));
    provider.disconnect().await
}

#[tokio::test]
async fn transaction_rolls_back_on_error() -> DbResult<()> {
    let Some(config) = live_config("transaction_rolls_back_on_error") else {
        return Ok(());
    };

    let provider = PgProvider::new();
    provider.connect(&config).await?;
    let table = unique_table("tx");
    create_exercises(&provider, &table).await?;

    let mut conn = provider.connection().await?;
    let outcome: DbResult<()> = transaction!(conn, tx, {
        InsertQuery::new(&table, Record::new().set("name", "Row"))
            .run(&tx)
            .await?;
        Err::<(), _>(DbError::validation("abort"))
    });
    assert!(matches!(outcome, Err(DbError::Validation(_))));
    drop(conn);

    let rows = provider.select(&SelectQuery::new(&table)).await?;
    assert!(rows.is_empty());

    provider
        .query(&format!("drop table \"{table}\""), &[])
        .await?;
    provider.disconnect().await
}
