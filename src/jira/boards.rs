//! Jira Software Boards

use super::client::JiraClient;
use crate::error::Result;
use crate::scan::{paginate, Page};
use futures::Stream;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: i64,
    pub name: Option<String>,
    #[serde(rename = "self")]
    pub self_url: Option<String>,
    /// simple, scrum or kanban
    #[serde(rename = "type")]
    pub board_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BoardList {
    #[serde(default)]
    values: Vec<Board>,
    total: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfiguration {
    pub filter: Option<FilterRef>,
    /// Kanban boards only
    pub sub_query: Option<SubQuery>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRef {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(rename = "self")]
    pub self_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubQuery {
    pub query: Option<String>,
}

/// Jira Server sends filter ids as strings, some Cloud responses as numbers
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Scan all boards
pub fn list_boards(
    client: &JiraClient,
    limit: Option<u64>,
) -> impl Stream<Item = Result<Board>> + Send + '_ {
    paginate(client.page_size(), limit, move |cursor| async move {
        let url = client.agile_url("board");
        let list: BoardList = client
            .get(
                &url,
                &[
                    ("startAt", cursor.offset.to_string()),
                    ("maxResults", cursor.page_size.to_string()),
                ],
            )
            .await?;
        Ok(match list.total {
            Some(total) => Page::with_total(list.values, total),
            None => Page::new(list.values),
        })
    })
}

/// Look up one board; an unknown id is not an error
pub async fn get_board(client: &JiraClient, id: i64) -> Result<Option<Board>> {
    if id == 0 {
        return Ok(None);
    }
    let url = client.agile_url(&format!("board/{}", id));
    client.get_optional(&url, &[]).await
}

/// Filter and sub-query of a board
pub async fn get_board_configuration(
    client: &JiraClient,
    board: &Board,
) -> Result<BoardConfiguration> {
    let url = client.agile_url(&format!("board/{}/configuration", board.id));
    client.get(&url, &[]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_board_list_decodes() {
        let list: BoardList = serde_json::from_value(json!({
            "maxResults": 50,
            "startAt": 0,
            "total": 2,
            "isLast": true,
            "values": [
                {"id": 1, "self": "https://jira/rest/agile/1.0/board/1", "name": "TEAM board", "type": "scrum"},
                {"id": 2, "self": "https://jira/rest/agile/1.0/board/2", "name": "OPS board", "type": "kanban"}
            ]
        }))
        .unwrap();
        assert_eq!(list.total, Some(2));
        assert_eq!(list.values[1].board_type.as_deref(), Some("kanban"));
    }

    #[test]
    fn test_configuration_accepts_string_or_numeric_filter_id() {
        let config: BoardConfiguration = serde_json::from_value(json!({
            "id": 2,
            "name": "OPS board",
            "filter": {"id": "10001", "self": "https://jira/rest/api/2/filter/10001"},
            "subQuery": {"query": "fixVersion in unreleasedVersions()"}
        }))
        .unwrap();
        assert_eq!(config.filter.unwrap().id.as_deref(), Some("10001"));
        assert_eq!(
            config.sub_query.unwrap().query.as_deref(),
            Some("fixVersion in unreleasedVersions()")
        );

        let config: BoardConfiguration =
            serde_json::from_value(json!({"filter": {"id": 10002}})).unwrap();
        assert_eq!(config.filter.unwrap().id.as_deref(), Some("10002"));
    }

    #[test]
    fn test_scrum_configuration_has_no_sub_query() {
        let config: BoardConfiguration =
            serde_json::from_value(json!({"filter": {"id": "10000"}})).unwrap();
        assert!(config.sub_query.is_none());
    }
}
