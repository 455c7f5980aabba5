//! Property tests: every `?` yields exactly one holder, in textual order.

mod common;
use common::*;

use proptest::prelude::*;

/// Condition fragments over `t1`, with the table and column each of their
/// placeholders binds to.
const FRAGMENTS: &[(&str, &[(Option<&str>, Option<&str>)])] = &[
    ("id = ?", &[(Some("t1"), Some("id"))]),
    ("name like ?", &[(Some("t1"), Some("name"))]),
    (
        "value between ? and ?",
        &[(Some("t1"), Some("value")), (Some("t1"), Some("value"))],
    ),
    (
        "id in (?, ?, ?)",
        &[
            (Some("t1"), Some("id")),
            (Some("t1"), Some("id")),
            (Some("t1"), Some("id")),
        ],
    ),
    ("? = 1", &[(None, None)]),
    ("value > 3", &[]),
    (
        "exists (select id from t2 where t1_id = ?)",
        &[(Some("t2"), Some("t1_id"))],
    ),
    ("upper(name) = upper(?)", &[(None, None)]),
    ("z.id <> ?", &[(None, None)]),
];

fn where_clause() -> impl Strategy<Value = (String, Vec<(Option<&'static str>, Option<&'static str>)>)> {
    (
        prop::collection::vec(0..FRAGMENTS.len(), 1..6),
        prop::collection::vec(any::<bool>(), 6),
    )
        .prop_map(|(picks, ors)| {
            let mut sql = String::new();
            let mut expected = Vec::new();
            for (i, pick) in picks.iter().enumerate() {
                let (text, binds) = FRAGMENTS[*pick];
                if i > 0 {
                    sql.push_str(if ors[i] { " or " } else { " and " });
                }
                sql.push_str(text);
                expected.extend_from_slice(binds);
            }
            (sql, expected)
        })
}

proptest! {
    #[test]
    fn holders_match_placeholders((condition, expected) in where_clause()) {
        let sql = format!("select * from t1 where {condition} limit ?");
        let hs = holders(&sql);

        prop_assert_eq!(hs.len(), sql.matches('?').count());
        prop_assert_eq!(hs.len(), expected.len() + 1);
        for (holder, (table, column)) in hs.iter().zip(&expected) {
            prop_assert_eq!(holder.table.as_deref(), *table);
            prop_assert_eq!(holder.column.as_deref(), *column);
        }
        prop_assert_eq!(hs.last().map(|h| h.name.as_str()), Some("t1Limit"));
    }

    #[test]
    fn names_are_unique((condition, _) in where_clause()) {
        let sql = format!("select * from t1 where {condition}");
        let mut names = holder_names(&sql);
        let total = names.len();
        names.sort();
        names.dedup();
        prop_assert_eq!(names.len(), total);
    }
}
