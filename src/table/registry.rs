//! Table Registry - Load table definitions from JSON
//!
//! Table schemas live in embedded JSON files and are looked up by name by
//! the executor and the CLI.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded table JSON files (compiled into the binary)
const TABLE_FILES: &[&str] = &[include_str!("../tables/jira.json")];

/// Column value type exposed to the query engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Int,
    Bool,
    Json,
}

/// Which typed Jira record backs a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    User,
    Board,
    Project,
}

/// Secondary per-row calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HydrateKind {
    UserGroups,
    BoardConfiguration,
    ProjectComponents,
}

impl HydrateKind {
    /// Record type the hydrate call takes as input
    pub fn resource(self) -> ResourceKind {
        match self {
            Self::UserGroups => ResourceKind::User,
            Self::BoardConfiguration => ResourceKind::Board,
            Self::ProjectComponents => ResourceKind::Project,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserGroups => "user_groups",
            Self::BoardConfiguration => "board_configuration",
            Self::ProjectComponents => "project_components",
        }
    }
}

/// Column definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Dot path into the record (or into the hydrate output); `*` maps over arrays
    pub json_path: String,
    #[serde(default)]
    pub hydrate: Option<HydrateKind>,
}

/// Table definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct TableDef {
    /// Filled in from the map key
    #[serde(default)]
    pub name: String,
    pub description: String,
    pub resource: ResourceKind,
    /// Column used for single-row lookups
    #[serde(default)]
    pub get_key: Option<String>,
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn supports_get(&self) -> bool {
        self.get_key.is_some()
    }
}

/// Root structure of tables/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    #[serde(default)]
    pub tables: HashMap<String, TableDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<TableConfig> = OnceLock::new();

/// Get the table registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static TableConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = TableConfig {
            tables: HashMap::new(),
        };

        for content in TABLE_FILES {
            let partial: TableConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded table JSON: {}", e));
            final_config.tables.extend(partial.tables);
        }

        for (name, table) in final_config.tables.iter_mut() {
            table.name = name.clone();
        }

        final_config
    })
}

/// Get a table definition by name
pub fn get_table(name: &str) -> Option<&'static TableDef> {
    get_registry().tables.get(name)
}

/// All tables, sorted by name
pub fn all_tables() -> Vec<&'static TableDef> {
    let mut tables: Vec<&'static TableDef> = get_registry().tables.values().collect();
    tables.sort_by(|a, b| a.name.cmp(&b.name));
    tables
}
