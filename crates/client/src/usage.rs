//! Usages: the repository's record that a node is placed in a course.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use zeroize::Zeroizing;

use crate::error::Result;

/// A usage registered with the repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Node the usage refers to.
    pub node_id: String,
    /// Pinned node version, if any.
    pub node_version: Option<String>,
    /// Course the node is placed in.
    pub container_id: String,
    /// Resource (record) id inside the course.
    pub resource_id: String,
    /// The repository's id for this usage.
    pub usage_id: Option<String>,
}

/// Parameters of a usage to create.
#[derive(Clone, bon::Builder)]
pub struct NewUsage {
    /// Ticket of the user creating the usage.
    #[builder(with = |ticket: impl Into<String>| Zeroizing::new(ticket.into()))]
    pub ticket: Zeroizing<String>,
    /// Course id.
    #[builder(into)]
    pub container_id: String,
    /// Resource id inside the course.
    #[builder(into)]
    pub resource_id: String,
    /// Node to link.
    #[builder(into)]
    pub node_id: String,
    /// Node version to pin.
    #[builder(into)]
    pub node_version: Option<String>,
}

impl std::fmt::Debug for NewUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUsage")
            .field("ticket", &"<redacted>")
            .field("container_id", &self.container_id)
            .field("resource_id", &self.resource_id)
            .field("node_id", &self.node_id)
            .field("node_version", &self.node_version)
            .finish()
    }
}

/// Node metadata returned for a usage.
///
/// Fields other than `detailsSnippet` and `node` are kept in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Rendered HTML for embedding.
    #[serde(default)]
    pub details_snippet: Option<String>,
    /// The node's metadata object.
    #[serde(default)]
    pub node: Value,
    /// Any other fields of the response.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// The rendered snippet, or `""` if the repository sent none.
    #[must_use]
    pub fn snippet(&self) -> &str {
        self.details_snippet.as_deref().unwrap_or_default()
    }

    /// The node's display name, if present.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.node
            .get("title")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .or_else(|| self.node.get("name").and_then(Value::as_str))
    }
}

/// The repository's usage registry.
#[async_trait]
pub trait UsageRegistry: Send + Sync {
    /// Registers a usage.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UsageCreationFailed`](crate::ClientError::UsageCreationFailed)
    /// if the repository refuses.
    async fn create_usage(&self, usage: &NewUsage) -> Result<Usage>;

    /// Finds the id of the usage linking `node_id` to `container_id`/`resource_id`.
    async fn usage_id_by_parameters(
        &self,
        ticket: &str,
        node_id: &str,
        container_id: &str,
        resource_id: &str,
    ) -> Result<Option<String>>;

    /// Removes a usage.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UsageDeleted`](crate::ClientError::UsageDeleted)
    /// if the usage no longer exists.
    async fn delete_usage(&self, node_id: &str, usage_id: &str) -> Result<()>;

    /// Loads the node behind a usage.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NodeDeleted`](crate::ClientError::NodeDeleted) or
    /// [`ClientError::UsageDeleted`](crate::ClientError::UsageDeleted) when the
    /// node or the usage is gone.
    async fn node_by_usage(&self, usage: &Usage) -> Result<Node>;
}
