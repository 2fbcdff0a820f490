//! `SeaORM` rendering of [`Filter`] expressions.
//!
//! A SQL-backed [`Executor`](crate::pagination::Executor) can hand the filter, sort field
//! and limit it receives straight to [`select_statement`].

use sea_orm::{
    Condition,
    sea_query::{
        Alias, Asterisk, Expr, LikeExpr, Order, Query, SelectStatement, SimpleExpr,
        Value as SqlValue,
    },
};

use super::builder::{FieldFilter, Filter};
use super::operator::{Keyword, Operand};
use super::sort::DESCENDING_PREFIX;
use crate::value::Value;

const LIKE_ESCAPE: char = '\\';

fn sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Int(i) => (*i).into(),
        Value::UInt(u) => (*u).into(),
        Value::Float(f) => (*f).into(),
        Value::Bool(b) => (*b).into(),
        Value::Text(s) => s.clone().into(),
        Value::Timestamp(t) => (*t).into(),
        Value::Identifier(id) => id.to_hex().into(),
    }
}

fn sql_values(operand: &Operand) -> Vec<SqlValue> {
    match operand {
        Operand::Single(value) => vec![sql_value(value)],
        Operand::Many(values) => values.iter().map(sql_value).collect(),
    }
}

/// Escape LIKE wildcards so the pattern matches literally
fn escape_like_wildcards(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn predicate_expr(field: &str, keyword: Keyword, operand: &Operand) -> SimpleExpr {
    let column = Expr::col(Alias::new(field));
    match (keyword, operand) {
        (Keyword::Eq, Operand::Single(v)) => column.eq(sql_value(v)),
        (Keyword::Ne, Operand::Single(v)) => column.ne(sql_value(v)),
        (Keyword::Eq | Keyword::In, _) => column.is_in(sql_values(operand)),
        (Keyword::Ne | Keyword::Nin, _) => column.is_not_in(sql_values(operand)),
        (Keyword::Gt, _) => column.gt(first_value(operand)),
        (Keyword::Gte, _) => column.gte(first_value(operand)),
        (Keyword::Lt, _) => column.lt(first_value(operand)),
        (Keyword::Lte, _) => column.lte(first_value(operand)),
        // a pattern matches anywhere in the column, like an unanchored regex
        (Keyword::Regex, _) => {
            let pattern = match operand {
                Operand::Single(v) => v.to_string(),
                Operand::Many(vs) => vs.first().map(ToString::to_string).unwrap_or_default(),
            };
            column.like(
                LikeExpr::new(format!("%{}%", escape_like_wildcards(&pattern))).escape(LIKE_ESCAPE),
            )
        }
    }
}

fn first_value(operand: &Operand) -> SqlValue {
    match operand {
        Operand::Single(v) => sql_value(v),
        Operand::Many(vs) => vs.first().map_or(SqlValue::String(None), sql_value),
    }
}

fn field_condition(field: &str, conditions: &FieldFilter) -> Condition {
    conditions
        .iter()
        .fold(Condition::all(), |cond, (keyword, operand)| {
            cond.add(predicate_expr(field, *keyword, operand))
        })
}

impl Filter {
    /// Render as a `SeaORM` condition. Every field predicate and every conjunction part
    /// must hold; an empty filter is an empty (always true) condition.
    #[must_use]
    pub fn to_condition(&self) -> Condition {
        match self {
            Self::Fields(fields) => fields
                .iter()
                .fold(Condition::all(), |cond, (field, conditions)| {
                    cond.add(field_condition(field, conditions))
                }),
            Self::And(parts) => parts
                .iter()
                .fold(Condition::all(), |cond, part| cond.add(part.to_condition())),
        }
    }
}

/// Split a sort field into column and direction: `-age` sorts `age` descending.
#[must_use]
pub fn order_by(sort_field: &str) -> (String, Order) {
    sort_field.strip_prefix(DESCENDING_PREFIX).map_or_else(
        || (sort_field.to_string(), Order::Asc),
        |column| (column.to_string(), Order::Desc),
    )
}

/// `SELECT * FROM table WHERE <filter> ORDER BY <sort_field> LIMIT <limit>`.
///
/// An empty sort field leaves the order unspecified and a zero limit means no limit.
#[must_use]
pub fn select_statement(table: &str, filter: &Filter, sort_field: &str, limit: u64) -> SelectStatement {
    let mut statement = Query::select();
    statement
        .column(Asterisk)
        .from(Alias::new(table))
        .cond_where(filter.to_condition());

    let (column, order) = order_by(sort_field);
    if !column.is_empty() {
        statement.order_by(Alias::new(column), order);
    }
    if limit > 0 {
        statement.limit(limit);
    }
    statement
}
