#![allow(dead_code)]

use async_trait::async_trait;
use querycrate::filtering::{Filter, Keyword, Operand, select_statement};
use querycrate::{AsyncExecutor, Executor, Value};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::convert::Infallible;

pub type Row = BTreeMap<String, Value>;

pub const ITEMS_TABLE: &str = "items";

/// A row with a text `mark` and an integer `type`
pub fn item(mark: &str, kind: i64) -> Row {
    BTreeMap::from([
        ("mark".to_string(), Value::from(mark)),
        ("type".to_string(), Value::from(kind)),
    ])
}

pub fn marks(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.get("mark").map(ToString::to_string))
        .collect()
}

/// Four items of type 1
pub fn uniform_items() -> Vec<(&'static str, i64)> {
    vec![("1", 1), ("2", 1), ("3", 1), ("4", 1)]
}

/// Six items, types 1 and 2 interleaved
pub fn mixed_items() -> Vec<(&'static str, i64)> {
    vec![("1", 2), ("2", 2), ("3", 1), ("4", 2), ("5", 1), ("6", 2)]
}

// ============================================================================
// In-memory executor
// ============================================================================

/// Evaluates filters directly over a vector of rows.
pub struct MemoryStore {
    pub rows: Vec<Row>,
}

impl MemoryStore {
    pub fn new(items: &[(&str, i64)]) -> Self {
        Self {
            rows: items.iter().map(|&(mark, kind)| item(mark, kind)).collect(),
        }
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    let class = a.class()?;
    (b.class() == Some(class)).then(|| class.compare(a, b))
}

fn holds(value: Option<&Value>, keyword: Keyword, operand: &Operand) -> bool {
    let Some(value) = value else {
        return false;
    };
    match (keyword, operand) {
        (Keyword::Eq, Operand::Single(v)) => value == v,
        (Keyword::Ne, Operand::Single(v)) => value != v,
        (Keyword::In, Operand::Many(vs)) => vs.contains(value),
        (Keyword::Nin, Operand::Many(vs)) => !vs.contains(value),
        (Keyword::Gt, Operand::Single(v)) => compare(value, v) == Some(Ordering::Greater),
        (Keyword::Gte, Operand::Single(v)) => {
            matches!(compare(value, v), Some(Ordering::Greater | Ordering::Equal))
        }
        (Keyword::Lt, Operand::Single(v)) => compare(value, v) == Some(Ordering::Less),
        (Keyword::Lte, Operand::Single(v)) => {
            matches!(compare(value, v), Some(Ordering::Less | Ordering::Equal))
        }
        (Keyword::Regex, Operand::Single(v)) => value.to_string().contains(&v.to_string()),
        _ => false,
    }
}

pub fn matches(filter: &Filter, row: &Row) -> bool {
    match filter {
        Filter::Fields(fields) => fields.iter().all(|(field, conditions)| {
            conditions
                .iter()
                .all(|(keyword, operand)| holds(row.get(field), *keyword, operand))
        }),
        Filter::And(parts) => parts.iter().all(|part| matches(part, row)),
    }
}

impl Executor for MemoryStore {
    type Record = Row;
    type Error = Infallible;

    fn execute(&self, filter: &Filter, sort_field: &str, limit: u64) -> Result<Vec<Row>, Infallible> {
        let (field, descending) = sort_field
            .strip_prefix('-')
            .map_or((sort_field, false), |f| (f, true));

        let mut rows: Vec<Row> = self
            .rows
            .iter()
            .filter(|row| matches(filter, row))
            .cloned()
            .collect();
        rows.sort_by(|a, b| match (a.get(field), b.get(field)) {
            (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        });
        if descending {
            rows.reverse();
        }
        if limit > 0 {
            rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(rows)
    }
}

// ============================================================================
// SQLite executor
// ============================================================================

pub async fn setup_items_db(items: &[(&str, i64)]) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    db.execute_unprepared(&format!(
        "CREATE TABLE {ITEMS_TABLE} (mark TEXT NOT NULL, type INTEGER NOT NULL)"
    ))
    .await?;
    for (mark, kind) in items {
        db.execute_unprepared(&format!(
            "INSERT INTO {ITEMS_TABLE} (mark, type) VALUES ('{mark}', {kind})"
        ))
        .await?;
    }
    Ok(db)
}

/// Runs filters as SQL through `SeaORM`.
pub struct SqliteStore {
    pub db: DatabaseConnection,
}

#[async_trait]
impl AsyncExecutor for SqliteStore {
    type Record = Row;
    type Error = DbErr;

    async fn execute(&self, filter: &Filter, sort_field: &str, limit: u64) -> Result<Vec<Row>, DbErr> {
        let statement = select_statement(ITEMS_TABLE, filter, sort_field, limit);
        let backend = self.db.get_database_backend();
        let rows = self.db.query_all(backend.build(&statement)).await?;

        rows.iter()
            .map(|row| {
                let mark: String = row.try_get("", "mark")?;
                let kind: i64 = row.try_get("", "type")?;
                Ok(item(&mark, kind))
            })
            .collect()
    }
}
