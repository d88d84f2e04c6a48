//! Jira Users
//!
//! `user/search` does not report a total, so the scan relies on short-page
//! detection. Group memberships need one extra request per user.

use super::client::JiraClient;
use crate::error::{ConnectorError, Result};
use crate::scan::{paginate, Page};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub account_id: Option<String>,
    /// Username (Jira Server / Data Center)
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub account_type: Option<String>,
    pub active: Option<bool>,
    #[serde(rename = "self")]
    pub self_url: Option<String>,
    pub avatar_urls: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGroup {
    pub name: String,
    #[serde(rename = "self")]
    pub self_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UserGroups {
    #[serde(default)]
    items: Vec<UserGroup>,
}

#[derive(Debug, Deserialize)]
struct UserWithGroups {
    #[serde(default)]
    groups: UserGroups,
}

/// Scan all users
pub fn list_users(
    client: &JiraClient,
    limit: Option<u64>,
) -> impl Stream<Item = Result<User>> + Send + '_ {
    paginate(client.page_size(), limit, move |cursor| async move {
        let url = client.api_url("user/search");
        let users: Vec<User> = client
            .get(
                &url,
                &[
                    // "." matches every user on Jira Server
                    ("username", ".".to_string()),
                    ("startAt", cursor.offset.to_string()),
                    ("maxResults", cursor.page_size.to_string()),
                ],
            )
            .await?;
        Ok(Page::new(users))
    })
}

/// Groups the user belongs to
pub async fn get_user_groups(client: &JiraClient, user: &User) -> Result<Vec<UserGroup>> {
    let selector = match (&user.account_id, &user.name) {
        (Some(id), _) if !id.is_empty() => ("accountId", id.clone()),
        (_, Some(name)) if !name.is_empty() => ("username", name.clone()),
        _ => {
            return Err(ConnectorError::InvalidKey {
                table: "jira_user".to_string(),
                message: "user has neither an account ID nor a username".to_string(),
            })
        }
    };

    let url = client.api_url("user");
    let user: UserWithGroups = client
        .get(&url, &[selector, ("expand", "groups".to_string())])
        .await?;

    Ok(user.groups.items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jira::{ConnectionSettings, Credentials};
    use serde_json::json;

    #[test]
    fn test_user_decodes_server_and_cloud_shapes() {
        let cloud: User = serde_json::from_value(json!({
            "self": "https://example.atlassian.net/rest/api/2/user?accountId=5b10ac8d82e05b22cc7d4ef5",
            "accountId": "5b10ac8d82e05b22cc7d4ef5",
            "accountType": "atlassian",
            "displayName": "Mia Krystof",
            "active": true,
            "avatarUrls": {"48x48": "https://avatar/48", "16x16": "https://avatar/16"}
        }))
        .unwrap();
        assert_eq!(cloud.account_id.as_deref(), Some("5b10ac8d82e05b22cc7d4ef5"));
        assert!(cloud.name.is_none());
        assert_eq!(cloud.active, Some(true));
        assert_eq!(cloud.avatar_urls.unwrap().len(), 2);

        let server: User = serde_json::from_value(json!({
            "name": "mia",
            "displayName": "Mia Krystof",
            "emailAddress": "mia@example.com"
        }))
        .unwrap();
        assert_eq!(server.name.as_deref(), Some("mia"));
        assert!(server.active.is_none());
    }

    #[test]
    fn test_user_serializes_with_api_field_names() {
        let user = User {
            account_id: Some("abc".to_string()),
            name: None,
            display_name: Some("Abc".to_string()),
            email_address: None,
            account_type: None,
            active: Some(true),
            self_url: Some("https://self".to_string()),
            avatar_urls: None,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["accountId"], "abc");
        assert_eq!(value["displayName"], "Abc");
        assert_eq!(value["self"], "https://self");
    }

    #[tokio::test]
    async fn test_groups_need_account_id_or_username() {
        let settings = ConnectionSettings::new(
            "http://127.0.0.1:9",
            Credentials::Bearer("pat".to_string()),
        )
        .unwrap();
        let client = JiraClient::connect(&settings).unwrap();
        let user: User = serde_json::from_value(json!({
            "accountId": "",
            "displayName": "Anonymous"
        }))
        .unwrap();

        let err = get_user_groups(&client, &user).await.unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidKey { ref table, .. } if table == "jira_user"));
    }

    #[test]
    fn test_missing_groups_is_empty() {
        let user: UserWithGroups = serde_json::from_value(json!({"name": "mia"})).unwrap();
        assert!(user.groups.items.is_empty());
    }
}
