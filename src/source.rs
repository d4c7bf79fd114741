use anyhow::Result;
use async_trait::async_trait;

use crate::model::{NamespaceScope, ResourceInfo, ResourceRef};

/// Read side of a cluster as seen by the UI.
#[async_trait]
pub trait ClusterSource: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<String>>;

    /// Listable kind names, core kinds first.
    async fn list_resource_kinds(&self) -> Result<Vec<String>>;

    async fn list_resources(&self, kind: &str, scope: &NamespaceScope) -> Result<Vec<ResourceInfo>>;

    async fn fetch_logs(&self, namespace: &str, pod: &str, tail_lines: i64) -> Result<String>;

    async fn describe_resource(&self, target: &ResourceRef) -> Result<String>;

    async fn test_connectivity(&self) -> Result<()>;
}
