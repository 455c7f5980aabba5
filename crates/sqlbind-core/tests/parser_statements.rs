//! Tests for statement parsing.

mod common;
use common::*;

use sqlbind_core::ast::{
    Distinct, Expr, InsertSource, Operator, SelectColumns, SortOrder, Statement,
};
use sqlbind_core::lexer::JoinKind;

// ===================================================================
// SELECT
// ===================================================================

#[test]
fn select_star() {
    let s = parse_select("select * from t1");
    assert!(matches!(s.columns, SelectColumns::Star(_)));
    assert_eq!(s.table, "t1");
    assert_eq!(s.distinct, Distinct::Unspecified);
    assert!(s.where_clause.is_none());
}

#[test]
fn select_distinct_variants() {
    assert_eq!(parse_select("select all id from t1").distinct, Distinct::All);
    assert_eq!(parse_select("select distinct id from t1").distinct, Distinct::Distinct);
    assert_eq!(parse_select("select ? id from t1").distinct, Distinct::Placeholder);
}

#[test]
fn select_column_and_table_aliases() {
    let s = parse_select("select id as i, name n from t1 x where x.id = ?");
    let SelectColumns::Columns(columns) = &s.columns else {
        panic!("expected plain columns");
    };
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].name, "id");
    assert_eq!(columns[0].alias.as_deref(), Some("i"));
    assert_eq!(columns[1].alias.as_deref(), Some("n"));
    assert_eq!(s.table_alias.as_deref(), Some("x"));
    assert!(s.names_table("x"));
    assert!(s.names_table("t1"));
}

#[test]
fn select_functions() {
    let s = parse_select("select count(*) total, max(value) from t1");
    let SelectColumns::Functions(functions) = &s.columns else {
        panic!("expected functions");
    };
    assert_eq!(functions.len(), 2);
    assert_eq!(functions[0].call.name, "count");
    assert_eq!(functions[0].alias.as_deref(), Some("total"));
    assert_eq!(functions[1].alias, None);
}

#[test]
fn select_with_left_outer_join() {
    let s = parse_select("select t1.name, t2.name from t1 left outer join t2 on t1.id = t2.t1_id");
    let join = s.join.as_ref().expect("join");
    assert_eq!(join.kind, JoinKind::Left { outer: true });
    assert_eq!(join.table, "t2");
    assert_eq!(
        join.on.as_ref().map(ToString::to_string).as_deref(),
        Some("(t1.id = t2.t1_id)")
    );
    assert!(s.names_join("t2"));
}

#[test]
fn select_join_variants() {
    for (sql, kind) in [
        ("select * from t1 join t2", JoinKind::Plain),
        ("select * from t1 inner join t2", JoinKind::Inner),
        ("select * from t1 right join t2", JoinKind::Right { outer: false }),
        ("select * from t1 natural join t2", JoinKind::Natural),
        (
            "select * from t1 natural left outer join t2",
            JoinKind::NaturalLeft { outer: true },
        ),
    ] {
        let s = parse_select(sql);
        assert_eq!(s.join.map(|j| j.kind), Some(kind), "{sql}");
    }
}

#[test]
fn select_trailing_clauses() {
    let s = parse_select(
        "select name from t1 group by name, ? having count(*) > ? order by name, ? desc limit ?, 10",
    );
    assert_eq!(s.group_by, ["name", "?"]);
    assert_eq!(
        s.having.as_ref().map(ToString::to_string).as_deref(),
        Some("(count(*) > ?)")
    );
    assert_eq!(s.order_by, ["name", "?"]);
    assert_eq!(s.order, Some(SortOrder::Desc));
    assert_eq!(s.limit, ["?", "10"]);
}

#[test]
fn select_sort_direction_placeholder() {
    let s = parse_select("select * from t1 order by ? ?");
    assert_eq!(s.order_by, ["?"]);
    assert_eq!(s.order, Some(SortOrder::Placeholder));
}

#[test]
fn union_all_with_trailing_order_and_limit() {
    let s = parse_select(
        "select id from t1 where id > ? union all select id from t2 where id < ? order by id limit 5",
    );
    let union = s.union.as_ref().expect("union");
    assert!(union.all);
    assert_eq!(union.select.table, "t2");
    assert!(union.select.order_by.is_empty());
    assert_eq!(s.order_by, ["id"]);
    assert_eq!(s.limit, ["5"]);
}

#[test]
fn backtick_table_names() {
    assert_eq!(parse_select("select * from `t1`").table, "t1");
}

#[test]
fn outer_parentheses_and_semicolon() {
    let s = parse_select("((select id from t1 where id = ?));");
    assert_eq!(s.table, "t1");
    assert!(s.where_clause.is_some());
    assert_eq!(parse_select("select * from t1;").table, "t1");
}

#[test]
fn keywords_are_case_insensitive() {
    let s = parse_select("SELECT Name FROM t1 WHERE id IN (?, ?) ORDER BY Name ASC");
    assert_eq!(s.order, Some(SortOrder::Asc));
    assert_eq!(
        s.where_clause.map(|w| w.to_string()).as_deref(),
        Some("(id in (?, ?))")
    );
}

// ===================================================================
// INSERT
// ===================================================================

#[test]
fn insert_with_columns() {
    let i = parse_insert("insert into t1(name, value) values(?, ?)");
    assert_eq!(i.table, "t1");
    assert_eq!(i.columns, ["name", "value"]);
    let InsertSource::Values(values) = &i.source else {
        panic!("expected values");
    };
    assert_eq!(values.len(), 2);
    assert!(values.iter().all(Expr::is_placeholder));
}

#[test]
fn insert_without_columns_uses_table_arity() {
    let i = parse_insert("insert into t1 values(?, 'x', 3)");
    assert!(i.columns.is_empty());
    let InsertSource::Values(values) = &i.source else {
        panic!("expected values");
    };
    assert_eq!(values[1], Expr::ident("'x'"));
}

#[test]
fn insert_from_select() {
    let i = parse_insert("insert into t1(name) select name from t2 where id = ?");
    let InsertSource::Select(select) = &i.source else {
        panic!("expected select source");
    };
    assert_eq!(select.table, "t2");
}

// ===================================================================
// UPDATE and DELETE
// ===================================================================

#[test]
fn update_assignments() {
    let u = parse_update("update t1 set value = value + ?, name = ? where id = ?");
    assert_eq!(u.table, "t1");
    assert_eq!(u.assignments.len(), 2);
    assert_eq!(u.assignments[0].column, "value");
    assert_eq!(u.assignments[0].value.to_string(), "(value + ?)");
    assert_eq!(u.assignments[1].value, Expr::ident("?"));
    assert_eq!(
        u.where_clause.map(|w| w.to_string()).as_deref(),
        Some("(id = ?)")
    );
}

#[test]
fn delete_with_subquery() {
    let d = parse_delete("delete from t1 where id>(select id from t2)");
    assert_eq!(d.table, "t1");
    let Some(Expr::Binary(b)) = &d.where_clause else {
        panic!("expected comparison");
    };
    assert_eq!(b.op, Operator::Gt);
    assert!(matches!(*b.right, Expr::Select(ref s) if s.table == "t2"));
}

#[test]
fn delete_without_where() {
    assert!(parse_delete("delete from t2").where_clause.is_none());
}

#[test]
fn bare_expression_parses_as_expression() {
    assert!(matches!(parse("a = ? and b > 1"), Statement::Expression(_)));
}
