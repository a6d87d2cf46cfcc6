//! Basic usage example for fitdb
//!
//! Run with: cargo run --example basic -p fitdb
//!
//! Set PG_HOST, PG_PORT, PG_USER, PG_PASSWORD and PG_DATABASE in a .env file or the
//! environment. `RUST_LOG=fitdb=debug` prints every executed statement.

use fitdb::prelude::*;
use fitdb::registry::MAIN;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug)]
#[allow(dead_code)]
struct Exercise {
    id: i64,
    name: String,
    muscle_group: Option<String>,
}

impl FromRow for Exercise {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            name: row.try_get_column("name")?,
            muscle_group: row.try_get_column("muscle_group")?,
        })
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> DbResult<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let registry = DatabaseRegistry::from_env()?;
    registry.init().await?;
    let db = registry.get(MAIN)?;

    db.query(
        "create table if not exists exercises (
            id bigserial primary key,
            name text not null,
            muscle_group text
        )",
        &[],
    )
    .await?;
    db.delete(&DeleteQuery::new("exercises", Condition::all()))
        .await?;

    // Insert
    let inserted = db
        .insert(
            &InsertQuery::many(
                "exercises",
                vec![
                    Record::new().set("name", "Back Squat").set("muscle_group", "legs"),
                    Record::new().set("name", "Bench Press").set("muscle_group", "chest"),
                    Record::new().set("name", "Plank").set("muscle_group", Value::Null),
                ],
            )
            .returning(&["id"]),
        )
        .await?;
    println!("Inserted {} exercises", inserted.rows_affected);

    // Select
    let query = SelectQuery::new("exercises")
        .filter(or(vec![eq("muscle_group", "legs"), is_null("muscle_group")]))
        .order_by("name", Direction::Asc)
        .limit(10);
    println!("SQL: {}", query.to_sql());
    let exercises: Vec<Exercise> = db.select_as(&query).await?;
    for exercise in &exercises {
        println!("  {exercise:?}");
    }

    // Update
    let updated = db
        .update(&UpdateQuery::new(
            "exercises",
            Record::new().set("muscle_group", "core"),
            eq("name", "Plank"),
        ))
        .await?;
    println!("Updated {} rows", updated.rows_affected);

    // Delete
    let deleted = db
        .delete(&DeleteQuery::new("exercises", like("name", "B%")))
        .await?;
    println!("Deleted {} rows", deleted.rows_affected);

    registry.shutdown_all().await;
    Ok(())
}
