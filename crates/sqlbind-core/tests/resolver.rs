//! Tests for placeholder classification and naming.

mod common;
use common::*;

use sqlbind_core::ast::Operator;
use sqlbind_core::resolver::Clause;
use sqlbind_core::Error;

fn clauses(sql: &str) -> Vec<Clause> {
    holders(sql).into_iter().map(|h| h.clause).collect()
}

// ===================================================================
// Order and naming
// ===================================================================

#[test]
fn holders_follow_textual_order() {
    let hs = holders("select * from t1 where id = ? and name like ? or value between ? and ?");
    let names: Vec<_> = hs.iter().map(|h| h.name.as_str()).collect();
    // both bounds of between bind `value`, so they collide and demote
    assert_eq!(names, ["Id", "Name", "valueBet", "valueBet0"]);
    let ops: Vec<_> = hs.iter().map(|h| h.operator).collect();
    assert_eq!(
        ops,
        [
            Some(Operator::Eq),
            Some(Operator::Like),
            Some(Operator::Between),
            Some(Operator::Between)
        ]
    );
    assert!(hs[0].is_field && hs[1].is_field);
    assert!(hs[2].is_param() && hs[3].is_param());
}

#[test]
fn run_time_choices_become_markers() {
    let sql = "select ? name from t1 group by ? order by ? ? limit ?, ?";
    assert_eq!(
        holder_names(sql),
        ["t1Distinct", "t1Group", "t1Order", "t1Sort", "t1Limit", "t1Limit0"]
    );
    assert_eq!(
        clauses(sql),
        [
            Clause::Distinct,
            Clause::GroupBy,
            Clause::OrderBy,
            Clause::Sort,
            Clause::Limit,
            Clause::Limit
        ]
    );
    assert!(holders(sql).iter().all(|h| h.is_param() && h.operator.is_none()));
}

#[test]
fn in_list_items_inherit_the_column() {
    let hs = holders("select * from t1 where id in (?, ?) and name not in (?)");
    let names: Vec<_> = hs.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, ["idIn", "idIn0", "Name"]);
    assert_eq!(hs[2].operator, Some(Operator::NotIn));
    assert!(hs.iter().all(|h| h.column.is_some()));
}

#[test]
fn leftless_placeholders_are_named_arg() {
    assert_eq!(holder_names("select * from t1 where ? = 1"), ["arg"]);
    assert_eq!(
        holder_names("select * from t1 where upper(name) = upper(?) and lower(?) = name"),
        ["arg", "arg0"]
    );
    let hs = holders("select count(*) from t1 group by name having count(*) > ?");
    assert_eq!(hs.len(), 1);
    assert_eq!(hs[0].name, "arg");
    assert_eq!(hs[0].clause, Clause::Having);
}

#[test]
fn unknown_qualifier_uses_the_column_part() {
    let hs = holders("select * from t1 where z.id = ?");
    assert_eq!(hs[0].name, "idEq");
    assert!(hs[0].is_param());
    assert!(!hs[0].is_resolved());
}

// ===================================================================
// Joins
// ===================================================================

#[test]
fn join_fields_are_qualified() {
    let hs = holders(
        "select x.name from t1 x join t2 y on x.id = y.t1_id and y.name = ? where x.value > ?",
    );
    let names: Vec<_> = hs.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, ["T2.Name", "T1.Value"]);
    assert_eq!(hs[0].table.as_deref(), Some("t2"));
    assert_eq!(hs[0].clause, Clause::On);
    assert_eq!(hs[1].clause, Clause::Where);
}

#[test]
fn ambiguous_unqualified_column() {
    let err = resolve_err("select t1.name from t1 join t2 on t1.id = t2.t1_id where name = ?");
    let Error::AmbiguousColumn { column, tables } = err else {
        panic!("expected ambiguity, got {err:?}");
    };
    assert_eq!(column, "name");
    assert_eq!(tables, ["t1", "t2"]);
}

#[test]
fn column_unique_to_one_side_resolves() {
    let hs = holders("select * from t1 join t2 on t1.id = t2.t1_id where t1_id = ?");
    assert_eq!(hs[0].table.as_deref(), Some("t2"));
    assert_eq!(hs[0].name, "T2.T1Id");
}

// ===================================================================
// Subqueries
// ===================================================================

#[test]
fn subquery_without_placeholders_adds_nothing() {
    assert!(holders("delete from t1 where id>(select id from t2)").is_empty());
}

#[test]
fn subquery_placeholders_are_parameters() {
    let hs = holders("delete from t1 where id > (select id from t2 where t1_id = ?)");
    assert_eq!(hs.len(), 1);
    assert!(hs[0].is_param());
    assert!(hs[0].in_subquery);
    assert_eq!(hs[0].name, "t2T1IdEq");
}

#[test]
fn exists_subquery_has_its_own_scope() {
    let hs = holders(
        "select * from t1 where exists (select id from t2 where t2.t1_id = t1.id and name = ?) and id = ?",
    );
    let names: Vec<_> = hs.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, ["t2NameEq", "Id"]);
}

#[test]
fn union_branch_is_a_subquery() {
    let hs = holders("select id from t1 where id = ? union select id from t2 where id = ?");
    let names: Vec<_> = hs.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, ["Id", "t2IdEq"]);
    assert_eq!(hs[1].clause, Clause::Union);
}

// ===================================================================
// Data-modifying statements
// ===================================================================

#[test]
fn insert_values_bind_by_position() {
    let hs = holders("insert into t1 values(?, 'x', ?)");
    let names: Vec<_> = hs.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, ["Id", "Value"]);
    assert!(hs.iter().all(|h| h.is_field && h.clause == Clause::Values));
}

#[test]
fn insert_value_inside_a_function_is_free() {
    assert_eq!(
        holder_names("insert into t1(name, value) values(upper(?), ?)"),
        ["arg", "Value"]
    );
}

#[test]
fn insert_select_source() {
    let hs = holders("insert into t1(name) select name from t2 where id = ?");
    assert_eq!(hs[0].name, "t2IdEq");
    assert_eq!(hs[0].clause, Clause::Source);
}

#[test]
fn update_set_and_where() {
    let hs = holders("update t1 set value = value + ?, name = ? where id = ?");
    let names: Vec<_> = hs.iter().map(|h| h.name.as_str()).collect();
    assert_eq!(names, ["Value", "Name", "Id"]);
    assert_eq!(hs[0].operator, Some(Operator::Add));
    assert_eq!(
        clauses("update t1 set value = value + ?, name = ? where id = ?"),
        [Clause::Set, Clause::Set, Clause::Where]
    );
}
