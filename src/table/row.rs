//! Rows and column transforms
//!
//! A typed record is serialized back to its API shape and every column picks
//! its value out of it (or out of a hydrate result) by `json_path`, then
//! coerces it to the column type.

use super::registry::{ColumnDef, ColumnType, HydrateKind, TableDef};
use crate::error::{ConnectorError, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::HashMap;

/// One column value
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    String(String),
    Int(i64),
    Bool(bool),
    Json(Value),
}

/// A flat row: column name to value, in table column order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<(String, Cell)>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cell)| cell)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn push(&mut self, name: &str, cell: Cell) {
        self.cells.push((name.to_string(), cell));
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, cell) in &self.cells {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

/// Columns to produce for one query and the hydrate calls they need
#[derive(Debug, Clone)]
pub struct RowPlan {
    columns: Vec<&'static ColumnDef>,
    hydrates: Vec<HydrateKind>,
}

impl RowPlan {
    /// An empty `requested` list selects every column
    pub fn new(table: &'static TableDef, requested: &[String]) -> Result<Self> {
        let columns: Vec<&'static ColumnDef> = if requested.is_empty() {
            table.columns.iter().collect()
        } else {
            // keep table order regardless of request order
            for name in requested {
                if table.column(name).is_none() {
                    return Err(ConnectorError::UnknownColumn {
                        table: table.name.clone(),
                        column: name.clone(),
                    });
                }
            }
            table
                .columns
                .iter()
                .filter(|c| requested.iter().any(|r| r == &c.name))
                .collect()
        };

        let mut hydrates = Vec::new();
        for hydrate in columns.iter().filter_map(|c| c.hydrate) {
            if hydrate.resource() == table.resource && !hydrates.contains(&hydrate) {
                hydrates.push(hydrate);
            }
        }

        Ok(Self { columns, hydrates })
    }

    pub fn hydrates(&self) -> &[HydrateKind] {
        &self.hydrates
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static ColumnDef> + '_ {
        self.columns.iter().copied()
    }

    /// Build the row from the record and whatever the hydrate calls returned
    pub fn build(&self, item: &Value, hydrated: &HashMap<HydrateKind, Value>) -> Row {
        let mut row = Row::default();
        for column in &self.columns {
            let source = match column.hydrate {
                None => Some(item),
                Some(kind) => hydrated.get(&kind),
            };
            let cell = source
                .map(|v| coerce(extract_json_value(v, &column.json_path), column.column_type))
                .unwrap_or(Cell::Null);
            row.push(&column.name, cell);
        }
        row
    }
}

/// Extract a value from JSON using a dot-notation path.
/// Numeric parts index arrays, `*` maps the rest of the path over an array.
pub fn extract_json_value(value: &Value, path: &str) -> Value {
    if path.is_empty() {
        return value.clone();
    }

    let (head, rest) = path.split_once('.').unwrap_or((path, ""));

    if head == "*" {
        return match value {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| extract_json_value(item, rest))
                    .collect(),
            ),
            _ => Value::Null,
        };
    }

    let next = match (value, head.parse::<usize>()) {
        (Value::Array(items), Ok(idx)) => items.get(idx),
        _ => value.get(head),
    };

    next.map(|v| extract_json_value(v, rest))
        .unwrap_or(Value::Null)
}

/// Convert a JSON value to a column cell
pub fn coerce(value: Value, column_type: ColumnType) -> Cell {
    match (column_type, value) {
        (_, Value::Null) => Cell::Null,
        (ColumnType::Json, value) => Cell::Json(value),
        (ColumnType::String, Value::String(s)) => Cell::String(s),
        (ColumnType::String, value) => Cell::String(value.to_string()),
        (ColumnType::Int, Value::Number(n)) => n.as_i64().map(Cell::Int).unwrap_or(Cell::Null),
        (ColumnType::Int, Value::String(s)) => s.trim().parse().map(Cell::Int).unwrap_or(Cell::Null),
        (ColumnType::Bool, Value::Bool(b)) => Cell::Bool(b),
        (ColumnType::Bool, Value::String(s)) => match s.as_str() {
            "true" => Cell::Bool(true),
            "false" => Cell::Bool(false),
            _ => Cell::Null,
        },
        (ColumnType::Int | ColumnType::Bool, _) => Cell::Null,
    }
}
