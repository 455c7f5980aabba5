//! Tests for expression parsing and operator precedence.

mod common;
use common::*;

use sqlbind_core::ast::{Expr, FunctionArg, Operator};
use sqlbind_core::{parse_expression, tokenize};

// ===================================================================
// Precedence
// ===================================================================

#[test]
fn multiplication_addition_and() {
    let e = expr("a + b * c and d");
    assert_eq!(e.to_string(), "((a + (b * c)) and d)");

    let Expr::Binary(and) = e else {
        panic!("expected binary");
    };
    assert_eq!(and.op, Operator::And);
    let Expr::Binary(plus) = *and.left else {
        panic!("expected binary");
    };
    assert_eq!(plus.op, Operator::Add);
    assert!(matches!(*plus.right, Expr::Binary(ref mul) if mul.op == Operator::Mul));
    assert_eq!(*and.right, Expr::ident("d"));
}

#[test]
fn and_or_share_a_level() {
    assert_eq!(
        expr("a = 1 or b <> 2 and c >= 3").to_string(),
        "(((a = 1) or (b <> 2)) and (c >= 3))"
    );
}

#[test]
fn like_binds_tighter_than_comparison() {
    assert_eq!(expr("a like b = c").to_string(), "((a like b) = c)");
    assert_eq!(expr("name not like ? and x").to_string(), "((name not like ?) and x)");
}

#[test]
fn bitwise_takes_comparison_as_operand() {
    assert_eq!(expr("a & b = c").to_string(), "(a & (b = c))");
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(expr("(a or b) and c").to_string(), "((a or b) and c)");
    assert_eq!(expr("a * (b + c)").to_string(), "(a * (b + c))");
}

// ===================================================================
// Special right-hand sides
// ===================================================================

#[test]
fn between_holds_both_bounds() {
    let e = expr("a between b+c and 1+2");
    assert_eq!(e.to_string(), "(a between ((b + c) and (1 + 2)))");
    let Expr::Binary(between) = e else {
        panic!("expected binary");
    };
    assert_eq!(between.op, Operator::Between);
    assert!(matches!(*between.right, Expr::Binary(ref bounds) if bounds.op == Operator::And));
}

#[test]
fn between_then_and() {
    assert_eq!(
        expr("a not between ? and ? or b = ?").to_string(),
        "((a not between (? and ?)) or (b = ?))"
    );
}

#[test]
fn in_list() {
    let e = expr("a not in (b+c,1,a,1+2)");
    let Expr::Binary(b) = e else {
        panic!("expected binary");
    };
    assert_eq!(b.op, Operator::NotIn);
    let Expr::List(items) = *b.right else {
        panic!("expected list");
    };
    assert_eq!(items.len(), 4);
    assert_eq!(items[0].to_string(), "(b + c)");
    assert_eq!(items[3].to_string(), "(1 + 2)");
}

#[test]
fn in_subquery() {
    let e = expr("id in (select id from t2 where name = ?)");
    let Expr::Binary(b) = e else {
        panic!("expected binary");
    };
    assert!(matches!(*b.right, Expr::Select(ref s) if s.table == "t2"));
}

#[test]
fn subquery_display_keeps_its_clauses() {
    assert_eq!(
        expr("id in (select id from t2 where name = ?)").to_string(),
        "(id in (select id from t2 where (name = ?)))"
    );
    assert_eq!(
        expr("exists (SELECT DISTINCT count(*) AS n FROM t1 a JOIN t2 b ON a.id = b.t1_id GROUP BY a.name)")
            .to_string(),
        "exists (select distinct count(*) as n from t1 a join t2 b on (a.id = b.t1_id) group by a.name)"
    );
}

#[test]
fn is_null_and_placeholder() {
    assert_eq!(
        expr("a is null or b is not ?").to_string(),
        "((a is null) or (b is not ?))"
    );
    assert_eq!(expr("a IS NOT NULL").to_string(), "(a is not NULL)");
}

// ===================================================================
// Values
// ===================================================================

#[test]
fn exists_wraps_subquery() {
    let Expr::BoolUnary(u) = expr("exists (select id from t1 where value = ?)") else {
        panic!("expected exists");
    };
    assert_eq!(u.op, Operator::Exists);
    assert!(matches!(*u.value, Expr::Select(_)));
}

#[test]
fn function_arguments() {
    let Expr::FuncCall(count) = expr("count(*)") else {
        panic!("expected call");
    };
    assert_eq!(count.arg, FunctionArg::Star);

    let Expr::FuncCall(sum) = expr("SUM(price * qty)") else {
        panic!("expected call");
    };
    assert_eq!(sum.name, "SUM");
    assert!(matches!(sum.arg, FunctionArg::Expr(ref e) if e.to_string() == "(price * qty)"));

    assert_eq!(expr("count(*) > ?").to_string(), "(count(*) > ?)");
    assert_eq!(expr("concat(first, ' ', last)").to_string(), "concat(first, ' ', last)");
}

#[test]
fn quoted_literals_stay_whole() {
    assert_eq!(expr("name = 'it''s ( not a group'").to_string(), "(name = 'it''s ( not a group')");
}

#[test]
fn parsing_stops_at_clause_keywords() {
    let tokens = tokenize("a = ? and b > 1 order by a").unwrap();
    let (e, rest) = parse_expression(&tokens).unwrap();
    assert_eq!(e.to_string(), "((a = ?) and (b > 1))");
    assert_eq!(rest.len(), 2);
    assert_eq!(rest[0].text, "order by");
}
