//! Usage registry over the usage and rendering APIs.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    base::RepositoryClient,
    error::{ClientError, Result, error_message},
    transport::{HttpMethod, RequestOptions, TransportResult},
    usage::{NewUsage, Node, Usage, UsageRegistry},
};

/// Display mode requested from the rendering service.
const DISPLAY_MODE_INLINE: &str = "inline";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateUsageBody<'a> {
    app_id: &'a str,
    course_id: &'a str,
    resource_id: &'a str,
    node_id: &'a str,
    node_version: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedUsage {
    parent_node_id: String,
    node_id: String,
}

#[derive(Deserialize)]
struct UsageList {
    #[serde(default)]
    usages: Vec<UsageEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageEntry {
    #[serde(default)]
    app_id: String,
    #[serde(default)]
    course_id: String,
    #[serde(default)]
    resource_id: String,
    node_id: String,
}

/// [`UsageRegistry`] talking to `/rest/usage/v1` and `/rest/rendering/v1`.
#[derive(Debug, Clone)]
pub struct NodeHelper {
    base: Arc<RepositoryClient>,
}

impl NodeHelper {
    /// Creates a helper over `base`.
    pub fn new(base: Arc<RepositoryClient>) -> Self {
        Self { base }
    }

    fn app_id(&self) -> &str {
        self.base.config().app_id()
    }

    fn usage_headers(&self, usage: &Usage) -> Vec<(String, String)> {
        let mut headers = self.base.signature_headers(usage.usage_id.as_deref().unwrap_or_default());
        headers.extend([
            ("X-Edu-Usage-Node-Id".to_owned(), usage.node_id.clone()),
            ("X-Edu-Usage-Course-Id".to_owned(), usage.container_id.clone()),
            ("X-Edu-Usage-Resource-Id".to_owned(), usage.resource_id.clone()),
            ("X-Edu-Usage-Version".to_owned(), usage.node_version.clone().unwrap_or_default()),
        ]);
        headers
    }
}

fn unexpected(result: &TransportResult) -> ClientError {
    ClientError::UnexpectedStatus { status: result.http_status, message: error_message(&result.content) }
}

#[async_trait]
impl UsageRegistry for NodeHelper {
    #[tracing::instrument(skip(self, usage), fields(node_id = %usage.node_id))]
    async fn create_usage(&self, usage: &NewUsage) -> Result<Usage> {
        let url = self.base.endpoint(&["rest", "usage", "v1", "usages", "repository", "-home-"])?;
        let body = serde_json::to_string(&CreateUsageBody {
            app_id: self.app_id(),
            course_id: &usage.container_id,
            resource_id: &usage.resource_id,
            node_id: &usage.node_id,
            node_version: usage.node_version.as_deref(),
        })
        .map_err(|e| ClientError::invalid_response("failed to encode usage", e))?;

        let mut headers = self.base.signature_headers(&usage.ticket);
        headers.push(RepositoryClient::ticket_header(&usage.ticket));
        let options =
            RequestOptions::builder().method(HttpMethod::Post).headers(headers).body(body).build();

        let result = self.base.handle_request(&url, options).await.into_response()?;
        if result.http_status != 200 {
            return Err(ClientError::UsageCreationFailed {
                status: result.http_status,
                message: error_message(&result.content),
            });
        }
        let created: CreatedUsage = serde_json::from_str(&result.content)
            .map_err(|e| ClientError::invalid_response("createUsage response", e))?;

        Ok(Usage {
            node_id: created.parent_node_id,
            node_version: usage.node_version.clone(),
            container_id: usage.container_id.clone(),
            resource_id: usage.resource_id.clone(),
            usage_id: Some(created.node_id),
        })
    }

    #[tracing::instrument(skip(self, ticket))]
    async fn usage_id_by_parameters(
        &self,
        ticket: &str,
        node_id: &str,
        container_id: &str,
        resource_id: &str,
    ) -> Result<Option<String>> {
        let url = self.base.endpoint(&["rest", "usage", "v1", "usages", "node", node_id])?;
        let mut headers = self.base.signature_headers(ticket);
        headers.push(RepositoryClient::ticket_header(ticket));

        let result = self
            .base
            .handle_request(&url, RequestOptions::builder().headers(headers).build())
            .await
            .into_response()?;
        if result.http_status != 200 {
            return Err(unexpected(&result));
        }
        let list: UsageList = serde_json::from_str(&result.content)
            .map_err(|e| ClientError::invalid_response("usage list response", e))?;

        Ok(list
            .usages
            .into_iter()
            .find(|u| {
                u.app_id == self.app_id() && u.course_id == container_id && u.resource_id == resource_id
            })
            .map(|u| u.node_id))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_usage(&self, node_id: &str, usage_id: &str) -> Result<()> {
        let url = self.base.endpoint(&["rest", "usage", "v1", "usages", "node", node_id, usage_id])?;
        let options = RequestOptions::builder()
            .method(HttpMethod::Delete)
            .headers(self.base.signature_headers(usage_id))
            .build();

        let result = self.base.handle_request(&url, options).await.into_response()?;
        match result.http_status {
            200 => Ok(()),
            404 => Err(ClientError::UsageDeleted { message: error_message(&result.content) }),
            status => Err(ClientError::UsageDeletionFailed {
                status,
                message: error_message(&result.content),
            }),
        }
    }

    #[tracing::instrument(skip(self, usage), fields(node_id = %usage.node_id))]
    async fn node_by_usage(&self, usage: &Usage) -> Result<Node> {
        let mut url = self.base.endpoint(&["rest", "rendering", "v1", "details", "-home-", &usage.node_id])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("displayMode", DISPLAY_MODE_INLINE);
            if let Some(version) = usage.node_version.as_deref().filter(|v| !v.is_empty()) {
                query.append_pair("version", version);
            }
        }

        let options = RequestOptions::builder().headers(self.usage_headers(usage)).build();
        let result = self.base.handle_request(&url, options).await.into_response()?;
        match result.http_status {
            200 => serde_json::from_str(&result.content)
                .map_err(|e| ClientError::invalid_response("node details response", e)),
            404 => Err(ClientError::NodeDeleted { node_id: usage.node_id.clone() }),
            403 => Err(ClientError::UsageDeleted { message: error_message(&result.content) }),
            _ => Err(unexpected(&result)),
        }
    }
}
