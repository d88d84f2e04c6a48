//! Jira Projects

use super::client::JiraClient;
use crate::error::Result;
use crate::scan::{paginate, Page};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub key: String,
    pub name: Option<String>,
    #[serde(rename = "self")]
    pub self_url: Option<String>,
    pub description: Option<String>,
    pub lead: Option<ProjectLead>,
    pub project_type_key: Option<String>,
    pub url: Option<String>,
    pub avatar_urls: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLead {
    pub account_id: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectComponent {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "self")]
    pub self_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectList {
    #[serde(default)]
    values: Vec<Project>,
    total: Option<u64>,
}

/// Fields the listing leaves out unless asked for
const PROJECT_EXPAND: &str = "description,lead,url";

/// Scan all projects visible to the account
pub fn list_projects(
    client: &JiraClient,
    limit: Option<u64>,
) -> impl Stream<Item = Result<Project>> + Send + '_ {
    paginate(client.page_size(), limit, move |cursor| async move {
        let url = client.api_url("project/search");
        let list: ProjectList = client
            .get(
                &url,
                &[
                    ("startAt", cursor.offset.to_string()),
                    ("maxResults", cursor.page_size.to_string()),
                    ("expand", PROJECT_EXPAND.to_string()),
                ],
            )
            .await?;
        Ok(match list.total {
            Some(total) => Page::with_total(list.values, total),
            None => Page::new(list.values),
        })
    })
}

/// Look up one project by id or key; an unknown project is not an error
pub async fn get_project(client: &JiraClient, id_or_key: &str) -> Result<Option<Project>> {
    if id_or_key.is_empty() {
        return Ok(None);
    }
    let url = client.api_url(&format!("project/{}", urlencoding::encode(id_or_key)));
    client
        .get_optional(&url, &[("expand", PROJECT_EXPAND.to_string())])
        .await
}

pub async fn get_project_components(
    client: &JiraClient,
    project: &Project,
) -> Result<Vec<ProjectComponent>> {
    let url = client.api_url(&format!(
        "project/{}/components",
        urlencoding::encode(&project.id)
    ));
    client.get(&url, &[]).await
}
