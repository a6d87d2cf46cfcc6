//! Integration tests for the qb module.

use crate::condition::{Condition, and, between, eq, gt, in_list, is_null, not_in, or};
use crate::qb::{
    DeleteQuery, Direction, InsertQuery, Join, JoinOp, QueryBuilder, SelectQuery, UpdateQuery,
    delete, insert, select, update,
};
use crate::sql::Dialect;
use crate::value::{Record, Value};

#[test]
fn test_select_by_id_scenario() {
    let q = select("users").filter(eq("id", 1)).limit(1).build();
    assert_eq!(q.sql(), r#"select * from "users" where "id" = ? limit ?"#);
    assert_eq!(
        q.to_native(Dialect::Postgres),
        r#"select * from "users" where "id" = $1 limit $2"#
    );
    assert_eq!(q.bindings(), &[Value::Int(1), Value::BigInt(1)]);
}

#[test]
fn test_build_is_idempotent() {
    let sel = select("users")
        .columns(&["id", "email"])
        .join(Join::left("orders", ("users.id", JoinOp::Eq, "orders.user_id")))
        .filter(and(vec![eq("a", 1), in_list("b", [1, 2, 3])]))
        .order_by("id", Direction::Desc)
        .paginate(2, 10);
    assert_eq!(sel.build(), sel.build());

    let ins = InsertQuery::many(
        "users",
        vec![Record::new().set("name", "a"), Record::new().set("email", "b")],
    );
    assert_eq!(ins.build(), ins.build());

    let upd = update("users", Record::new().set("name", "x"), eq("id", 1));
    assert_eq!(upd.build(), upd.build());

    let del = delete("users", or(vec![eq("x", "u"), eq("x", "admin")]));
    assert_eq!(del.build(), del.build());
}

#[test]
fn test_schema_qualification_in_every_builder() {
    let expected = r#""public"."users""#;
    let sqls = [
        SelectQuery::new("users").schema("public").to_sql(),
        InsertQuery::new("users", Record::new().set("a", 1))
            .schema("public")
            .to_sql(),
        UpdateQuery::new("users", Record::new().set("a", 1), eq("id", 1))
            .schema("public")
            .to_sql(),
        DeleteQuery::new("users", eq("id", 1)).schema("public").to_sql(),
    ];
    for sql in sqls {
        assert!(sql.contains(expected), "{sql}");
    }
}

#[test]
fn test_where_and_composition() {
    let q = select("t").filter(and(vec![eq("a", 1), gt("b", 2)])).build();
    assert_eq!(q.sql(), r#"select * from "t" where ("a" = ? and "b" > ?)"#);
    assert_eq!(q.bindings(), &[Value::Int(1), Value::Int(2)]);
}

#[test]
fn test_where_or_composition() {
    let q = select("users")
        .filter(or(vec![eq("role", "u"), eq("role", "admin")]))
        .build();
    assert_eq!(
        q.sql(),
        r#"select * from "users" where ("role" = ? or "role" = ?)"#
    );
    assert_eq!(
        q.bindings(),
        &[Value::Text("u".into()), Value::Text("admin".into())]
    );
}

#[test]
fn test_or_inside_and_keeps_precedence() {
    let q = select("users").filter(and(vec![
        eq("active", true),
        or(vec![eq("role", "coach"), is_null("role")]),
    ]));
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" where ("active" = ? and ("role" = ? or "role" is null))"#
    );
}

#[test]
fn test_left_join_before_where() {
    let q = select("users")
        .filter(eq("users.active", true))
        .join(Join::left("orders", ("users.id", JoinOp::Eq, "orders.user_id")));
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" left join "orders" on "users"."id" = "orders"."user_id" where "users"."active" = ?"#
    );
}

#[test]
fn test_pagination_after_ordering() {
    let q = select("users")
        .limit(10)
        .offset(20)
        .order_by("name", Direction::Asc)
        .filter(between("age", (18, 65)))
        .build();
    assert_eq!(
        q.sql(),
        r#"select * from "users" where "age" between ? and ? order by "name" asc limit ? offset ?"#
    );
    assert_eq!(
        q.bindings(),
        &[
            Value::Int(18),
            Value::Int(65),
            Value::BigInt(10),
            Value::BigInt(20)
        ]
    );
}

#[test]
fn test_insert_multi_row_with_null() {
    let q = InsertQuery::many(
        "users",
        vec![
            Record::new().set("name", "John").set("email", "j@x.com"),
            Record::new().set("name", "Jane").set("email", Value::Null),
        ],
    )
    .build();
    assert_eq!(
        q.sql(),
        r#"insert into "users" ("name", "email") values (?, ?), (?, ?)"#
    );
    assert_eq!(
        q.bindings(),
        &[
            Value::Text("John".into()),
            Value::Text("j@x.com".into()),
            Value::Text("Jane".into()),
            Value::Null,
        ]
    );
}

#[test]
fn test_insert_builder_appends_rows() {
    let q = insert("tags", Record::new().set("name", "push"))
        .row(Record::new().set("name", "pull"))
        .returning(&["id"]);
    assert_eq!(
        q.to_sql(),
        r#"insert into "tags" ("name") values (?), (?) returning "id""#
    );
}

#[test]
fn test_empty_in_list_binds_nothing() {
    let q = select("users").filter(in_list::<i32>("id", [])).build();
    assert_eq!(q.sql(), r#"select * from "users" where 1 = 0"#);
    assert!(q.bindings().is_empty());

    let q = select("users").filter(not_in::<i32>("id", [])).build();
    assert_eq!(q.sql(), r#"select * from "users" where 1 = 1"#);
    assert!(q.bindings().is_empty());
}

#[test]
fn test_unscoped_delete_is_explicit() {
    let q = delete("sessions", Condition::all());
    assert_eq!(q.to_sql(), r#"delete from "sessions" where true"#);
}

#[test]
fn test_native_placeholders_number_across_clauses() {
    let q = update(
        "users",
        Record::new().set("name", "a").set("age", 3),
        and(vec![eq("id", 1), in_list("team", ["x", "y"])]),
    )
    .returning(&["id"])
    .build();
    assert_eq!(
        q.to_native(Dialect::Postgres),
        r#"update "users" set "name" = $1, "age" = $2 where ("id" = $3 and "team" in ($4, $5)) returning "id""#
    );
}
