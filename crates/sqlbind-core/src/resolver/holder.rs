//! Resolved placeholders and their generated names.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::ast::Operator;
use crate::naming::{snake_to_camel, snake_to_pascal};

/// The part of a statement a placeholder appeared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    Distinct,
    Columns,
    On,
    Where,
    GroupBy,
    Having,
    Union,
    OrderBy,
    Sort,
    Limit,
    /// `insert ... values (...)`
    Values,
    /// `insert ... select ...`
    Source,
    /// `update ... set ...`
    Set,
}

/// One `?` of a statement, classified as a record field or a free
/// parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holder {
    /// Table of the resolved column.
    pub table: Option<String>,
    /// The column the placeholder is compared with or assigned to, if it
    /// could be resolved against the schema.
    pub column: Option<String>,
    /// Operator of the comparison the placeholder is the right side of.
    pub operator: Option<Operator>,
    /// Bound from the record rather than passed as an argument.
    pub is_field: bool,
    /// Generated field or parameter name.
    pub name: String,
    pub clause: Clause,
    /// Found inside a nested `select`.
    pub in_subquery: bool,
    /// Name source for unresolved parameters.
    pub base: String,
    /// Type of the resolved column.
    pub target_type: Option<String>,
}

impl Holder {
    /// An unresolved parameter found in `clause`.
    #[must_use]
    pub fn new(clause: Clause, in_subquery: bool) -> Self {
        Self {
            table: None,
            column: None,
            operator: None,
            is_field: false,
            name: String::new(),
            clause,
            in_subquery,
            base: "arg".to_string(),
            target_type: None,
        }
    }

    #[must_use]
    pub const fn is_param(&self) -> bool {
        !self.is_field
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.column.is_some()
    }

    fn field_name(&self, has_join: bool) -> String {
        let column = snake_to_pascal(self.column.as_deref().unwrap_or(&self.base));
        match (&self.table, has_join) {
            (Some(table), true) => format!("{}.{column}", snake_to_pascal(table)),
            _ => column,
        }
    }

    fn param_name(&self, has_join: bool) -> String {
        match (&self.table, &self.column) {
            (Some(table), Some(column)) if self.in_subquery || has_join => {
                snake_to_camel(table) + &snake_to_pascal(column)
            }
            (_, Some(column)) => snake_to_camel(column),
            _ => snake_to_camel(&self.base),
        }
    }
}

/// Turns every field into a parameter.
pub fn demote_fields(holders: &mut [Holder]) {
    for holder in holders {
        holder.is_field = false;
    }
}

/// Names every holder.
///
/// Fields that would share a name are all turned into parameters first.
/// Parameters get their operator suffix, and a repeated parameter name gets
/// the first free numeric suffix starting at `0`. Running this again after
/// demoting more fields renames everything from scratch.
pub fn assign_names(holders: &mut [Holder], has_join: bool) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for holder in holders.iter().filter(|h| h.is_field) {
        *seen.entry(holder.field_name(has_join)).or_default() += 1;
    }
    for holder in holders.iter_mut().filter(|h| h.is_field) {
        if seen.get(&holder.field_name(has_join)).copied().unwrap_or(0) > 1 {
            holder.is_field = false;
        }
    }

    let mut taken: HashSet<String> = HashSet::new();
    for holder in holders.iter_mut() {
        if holder.is_field {
            holder.name = holder.field_name(has_join);
            continue;
        }
        let mut name = holder.param_name(has_join);
        if let Some(op) = holder.operator {
            name.push_str(op.suffix());
        }
        if taken.contains(&name) {
            let stem = name;
            let mut n = 0;
            name = format!("{stem}{n}");
            while taken.contains(&name) {
                n += 1;
                name = format!("{stem}{n}");
            }
        }
        taken.insert(name.clone());
        holder.name = name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(table: &str, column: &str, op: Operator) -> Holder {
        Holder {
            table: Some(table.into()),
            column: Some(column.into()),
            operator: Some(op),
            is_field: true,
            base: column.into(),
            ..Holder::new(Clause::Where, false)
        }
    }

    fn param(base: &str, op: Option<Operator>) -> Holder {
        Holder {
            operator: op,
            base: base.into(),
            ..Holder::new(Clause::Where, false)
        }
    }

    fn names(holders: &[Holder]) -> Vec<&str> {
        holders.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn fields_use_pascal_case() {
        let mut holders = vec![field("user_info", "created_at", Operator::Eq)];
        assign_names(&mut holders, false);
        assert_eq!(names(&holders), ["CreatedAt"]);
        assign_names(&mut holders, true);
        assert_eq!(names(&holders), ["UserInfo.CreatedAt"]);
    }

    #[test]
    fn colliding_fields_become_parameters() {
        let mut holders = vec![
            field("t", "id", Operator::Gt),
            field("t", "id", Operator::Lt),
            field("t", "id", Operator::NotEq),
            field("t", "name", Operator::Eq),
        ];
        assign_names(&mut holders, false);
        assert_eq!(names(&holders), ["idBg", "idLe", "idNEq", "Name"]);
        assert!(holders[..3].iter().all(Holder::is_param));
        assert!(holders[3].is_field);
    }

    #[test]
    fn repeated_parameters_get_numeric_suffixes() {
        let mut holders = vec![
            param("arg", None),
            param("arg", None),
            param("arg", None),
            param("user_id", Some(Operator::In)),
            param("user_id", Some(Operator::In)),
        ];
        assign_names(&mut holders, false);
        assert_eq!(names(&holders), ["arg", "arg0", "arg1", "userIdIn", "userIdIn0"]);
    }

    #[test]
    fn join_and_subquery_parameters_carry_the_table() {
        let mut sub = field("t2", "id", Operator::Eq);
        sub.is_field = false;
        sub.in_subquery = true;
        let mut holders = vec![sub];
        assign_names(&mut holders, false);
        assert_eq!(names(&holders), ["t2IdEq"]);

        let mut holders = vec![field("t1", "id", Operator::Eq)];
        demote_fields(&mut holders);
        assign_names(&mut holders, true);
        assert_eq!(names(&holders), ["t1IdEq"]);
    }

    #[test]
    fn renaming_is_repeatable() {
        let mut holders = vec![field("t", "a", Operator::Eq), param("x", Some(Operator::Eq))];
        assign_names(&mut holders, false);
        assign_names(&mut holders, false);
        assert_eq!(names(&holders), ["A", "xEq"]);
    }
}
