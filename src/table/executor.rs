//! Table Executor
//!
//! Runs list and get queries against a table: scan the typed records, hydrate
//! each one through the connection's gate, then project it into a [`Row`].

use super::registry::{get_table, HydrateKind, ResourceKind, TableDef};
use super::row::{Row, RowPlan};
use crate::error::{ConnectorError, Result};
use crate::jira::boards::{self, Board};
use crate::jira::projects::{self, Project};
use crate::jira::users::{self, User};
use crate::jira::JiraClient;
use futures::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// What the host asks for
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    /// Stop after this many rows
    pub limit: Option<u64>,
    /// Columns to return; empty means all
    pub columns: Vec<String>,
}

impl QueryContext {
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }
}

fn lookup_table(name: &str) -> Result<&'static TableDef> {
    get_table(name).ok_or_else(|| ConnectorError::UnknownTable(name.to_string()))
}

/// Stream the rows of a table.
///
/// A failed page ends the stream after one error. A failed hydrate call only
/// costs its own row: that row comes out as an error and the scan goes on.
pub fn scan_table<'a>(
    client: &'a JiraClient,
    table_name: &str,
    ctx: &QueryContext,
) -> Result<BoxStream<'a, Result<Row>>> {
    let table = lookup_table(table_name)?;
    let plan = Arc::new(RowPlan::new(table, &ctx.columns)?);

    tracing::debug!(
        "Scanning {} (limit: {:?}, hydrates: {:?})",
        table.name,
        ctx.limit,
        plan.hydrates()
    );

    let rows = match table.resource {
        ResourceKind::User => {
            hydrate_each(client, &plan, users::list_users(client, ctx.limit), user_row)
        }
        ResourceKind::Board => {
            hydrate_each(client, &plan, boards::list_boards(client, ctx.limit), board_row)
        }
        ResourceKind::Project => hydrate_each(
            client,
            &plan,
            projects::list_projects(client, ctx.limit),
            project_row,
        ),
    };

    Ok(rows
        .inspect_err(move |e| tracing::error!("{}: {}", table.name, e))
        .boxed())
}

/// Fetch a single row by the table's key column. Unknown keys give `None`.
pub async fn get_row(
    client: &JiraClient,
    table_name: &str,
    key: &str,
    columns: &[String],
) -> Result<Option<Row>> {
    let table = lookup_table(table_name)?;
    let plan = Arc::new(RowPlan::new(table, columns)?);

    let result = match table.resource {
        ResourceKind::Board if table.supports_get() => {
            let id: i64 = key.trim().parse().map_err(|_| ConnectorError::InvalidKey {
                table: table.name.clone(),
                message: format!("board id must be an integer, got '{}'", key),
            })?;
            match boards::get_board(client, id).await? {
                Some(board) => Some(board_row(client, plan, board).await?),
                None => None,
            }
        }
        ResourceKind::Project if table.supports_get() => {
            match projects::get_project(client, key.trim()).await? {
                Some(project) => Some(project_row(client, plan, project).await?),
                None => None,
            }
        }
        _ => {
            return Err(ConnectorError::InvalidKey {
                table: table.name.clone(),
                message: "table does not support single-row lookups".to_string(),
            })
        }
    };

    if result.is_none() {
        tracing::debug!("{}: no row for key {}", table.name, key);
    }
    Ok(result)
}

/// Turn a stream of records into a stream of rows, hydrating up to the
/// gate's capacity of records at once. Row order follows scan order.
fn hydrate_each<'a, T, S, F, Fut>(
    client: &'a JiraClient,
    plan: &Arc<RowPlan>,
    items: S,
    to_row: F,
) -> BoxStream<'a, Result<Row>>
where
    T: Send + 'a,
    S: Stream<Item = Result<T>> + Send + 'a,
    F: Fn(&'a JiraClient, Arc<RowPlan>, T) -> Fut + Send + 'a,
    Fut: Future<Output = Result<Row>> + Send + 'a,
{
    let plan = plan.clone();
    let concurrency = client.gate().capacity();
    items
        .map(move |item| {
            let row = item.map(|item| to_row(client, plan.clone(), item));
            async move { row?.await }
        })
        .buffered(concurrency)
        .boxed()
}

async fn user_row(client: &JiraClient, plan: Arc<RowPlan>, user: User) -> Result<Row> {
    let mut hydrated: HashMap<HydrateKind, Value> = HashMap::new();
    for &kind in plan.hydrates() {
        if kind == HydrateKind::UserGroups {
            let groups = client
                .gate()
                .enrich("jira_user.user_groups", || users::get_user_groups(client, &user))
                .await?;
            hydrated.insert(kind, serde_json::to_value(groups)?);
        }
    }
    Ok(plan.build(&serde_json::to_value(&user)?, &hydrated))
}

async fn board_row(client: &JiraClient, plan: Arc<RowPlan>, board: Board) -> Result<Row> {
    let mut hydrated: HashMap<HydrateKind, Value> = HashMap::new();
    for &kind in plan.hydrates() {
        if kind == HydrateKind::BoardConfiguration {
            let config = client
                .gate()
                .enrich("jira_board.board_configuration", || {
                    boards::get_board_configuration(client, &board)
                })
                .await?;
            hydrated.insert(kind, serde_json::to_value(config)?);
        }
    }
    Ok(plan.build(&serde_json::to_value(&board)?, &hydrated))
}

async fn project_row(client: &JiraClient, plan: Arc<RowPlan>, project: Project) -> Result<Row> {
    let mut hydrated: HashMap<HydrateKind, Value> = HashMap::new();
    for &kind in plan.hydrates() {
        if kind == HydrateKind::ProjectComponents {
            let components = client
                .gate()
                .enrich("jira_project.project_components", || {
                    projects::get_project_components(client, &project)
                })
                .await?;
            hydrated.insert(kind, serde_json::to_value(components)?);
        }
    }
    Ok(plan.build(&serde_json::to_value(&project)?, &hydrated))
}
