use std::collections::HashSet;
use std::fmt::Debug;
use std::future::Future;

use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Pod, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::api::{ListParams, LogParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::{ApiResource, DynamicObject};
use kube::discovery::{Discovery, Scope, verbs};
use kube::{Api, Client, Config, ResourceExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::model::{NamespaceScope, ResourceInfo, ResourceRef, normalize_kind};
use crate::source::ClusterSource;

const NONE: &str = "<none>";

#[derive(Debug, Clone)]
struct DiscoveredKind {
    resource: ApiResource,
    namespaced: bool,
}

pub struct KubeGateway {
    client: Client,
    default_namespace: String,
    discovered: RwLock<Vec<DiscoveredKind>>,
}

impl KubeGateway {
    pub async fn new() -> Result<Self> {
        let config = match Kubeconfig::read().ok() {
            Some(kubeconfig) => Config::from_custom_kubeconfig(
                kubeconfig,
                &KubeConfigOptions {
                    context: None,
                    cluster: None,
                    user: None,
                },
            )
            .await
            .context("failed to infer Kubernetes configuration")?,
            None => Config::infer()
                .await
                .context("failed to infer Kubernetes configuration")?,
        };

        let default_namespace = config.default_namespace.clone();
        let client = Client::try_from(config).context("failed to initialize Kubernetes client")?;

        Ok(Self {
            client,
            default_namespace,
            discovered: RwLock::new(Vec::new()),
        })
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    async fn discover(&self) -> Result<Vec<DiscoveredKind>> {
        let discovery = Discovery::new(self.client.clone())
            .run()
            .await
            .context("failed to run API discovery")?;
        let kinds = discovery
            .groups_alphabetical()
            .into_iter()
            .flat_map(|group| group.recommended_resources())
            .filter(|(_, capabilities)| capabilities.supports_operation(verbs::LIST))
            .map(|(resource, capabilities)| DiscoveredKind {
                resource,
                namespaced: matches!(capabilities.scope, Scope::Namespaced),
            })
            .collect::<Vec<_>>();
        debug!("discovered {} listable kinds", kinds.len());

        *self.discovered.write().await = kinds.clone();
        Ok(kinds)
    }

    async fn resolve_kind(&self, kind: &str) -> Result<DiscoveredKind> {
        let cached = find_kind(&self.discovered.read().await, kind).cloned();
        if let Some(found) = cached {
            return Ok(found);
        }

        let kinds = self.discover().await?;
        find_kind(&kinds, kind)
            .cloned()
            .with_context(|| format!("unknown resource kind {kind}"))
    }

    async fn fetch_pods(&self, scope: &NamespaceScope) -> Result<Vec<ResourceInfo>> {
        let pods: Api<Pod> = match scope {
            NamespaceScope::All => Api::all(self.client.clone()),
            NamespaceScope::Named(namespace) => Api::namespaced(self.client.clone(), namespace),
        };

        let list = list_all(&pods)
            .await
            .with_context(|| format!("failed to list pods in {scope}"))?;
        Ok(list.iter().map(pod_row).collect())
    }

    async fn fetch_services(&self, scope: &NamespaceScope) -> Result<Vec<ResourceInfo>> {
        let services: Api<Service> = match scope {
            NamespaceScope::All => Api::all(self.client.clone()),
            NamespaceScope::Named(namespace) => Api::namespaced(self.client.clone(), namespace),
        };

        let list = list_all(&services)
            .await
            .with_context(|| format!("failed to list services in {scope}"))?;
        Ok(list.iter().map(service_row).collect())
    }

    async fn fetch_deployments(&self, scope: &NamespaceScope) -> Result<Vec<ResourceInfo>> {
        let deployments: Api<Deployment> = match scope {
            NamespaceScope::All => Api::all(self.client.clone()),
            NamespaceScope::Named(namespace) => Api::namespaced(self.client.clone(), namespace),
        };

        let list = list_all(&deployments)
            .await
            .with_context(|| format!("failed to list deployments in {scope}"))?;
        Ok(list.iter().map(deployment_row).collect())
    }

    async fn fetch_dynamic(&self, kind: &str, scope: &NamespaceScope) -> Result<Vec<ResourceInfo>> {
        let discovered = self.resolve_kind(kind).await?;
        let resources: Api<DynamicObject> = match (discovered.namespaced, scope) {
            (true, NamespaceScope::Named(namespace)) => {
                Api::namespaced_with(self.client.clone(), namespace, &discovered.resource)
            }
            _ => Api::all_with(self.client.clone(), &discovered.resource),
        };

        let list = list_all(&resources)
            .await
            .with_context(|| format!("failed to list {kind} in {scope}"))?;
        Ok(list
            .iter()
            .map(|object| dynamic_row(object, &discovered.resource.kind))
            .collect())
    }
}

#[async_trait]
impl ClusterSource for KubeGateway {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces
            .list(&ListParams::default())
            .await
            .context("failed to list namespaces")?;
        Ok(list.iter().map(|namespace| namespace.name_any()).collect())
    }

    async fn list_resource_kinds(&self) -> Result<Vec<String>> {
        let kinds = self.discover().await?;
        Ok(kind_names(&kinds))
    }

    async fn list_resources(&self, kind: &str, scope: &NamespaceScope) -> Result<Vec<ResourceInfo>> {
        let kind = normalize_kind(kind);
        let mut rows = match kind.as_str() {
            "pods" => self.fetch_pods(scope).await?,
            "services" => self.fetch_services(scope).await?,
            "deployments" => self.fetch_deployments(scope).await?,
            _ => self.fetch_dynamic(&kind, scope).await?,
        };

        rows.sort_by(|left, right| {
            left.namespace
                .cmp(&right.namespace)
                .then_with(|| left.name.cmp(&right.name))
        });
        Ok(rows)
    }

    async fn fetch_logs(&self, namespace: &str, pod: &str, tail_lines: i64) -> Result<String> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = LogParams {
            tail_lines: Some(tail_lines),
            ..LogParams::default()
        };

        pods.logs(pod, &params)
            .await
            .with_context(|| format!("failed to load logs for {namespace}/{pod}"))
    }

    async fn describe_resource(&self, target: &ResourceRef) -> Result<String> {
        let discovered = self.resolve_kind(&target.kind).await?;
        let resources: Api<DynamicObject> = match (discovered.namespaced, &target.namespace) {
            (true, Some(namespace)) => {
                Api::namespaced_with(self.client.clone(), namespace, &discovered.resource)
            }
            _ => Api::all_with(self.client.clone(), &discovered.resource),
        };

        let mut object = resources
            .get(&target.name)
            .await
            .with_context(|| format!("failed to get {target}"))?;
        object.metadata.managed_fields = None;
        Ok(yaml_detail(&object))
    }

    async fn test_connectivity(&self) -> Result<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        namespaces
            .list(&ListParams::default().limit(1))
            .await
            .context("failed to reach the Kubernetes API")?;
        Ok(())
    }
}

fn find_kind<'a>(kinds: &'a [DiscoveredKind], kind: &str) -> Option<&'a DiscoveredKind> {
    let normalized = normalize_kind(kind);
    kinds.iter().find(|candidate| {
        candidate.resource.plural == normalized
            || candidate.resource.kind.eq_ignore_ascii_case(&normalized)
    })
}

fn kind_names(kinds: &[DiscoveredKind]) -> Vec<String> {
    let mut seen = HashSet::new();
    kinds
        .iter()
        .map(|kind| kind.resource.plural.clone())
        .filter(|plural| seen.insert(plural.clone()))
        .collect()
}

fn pod_row(pod: &Pod) -> ResourceInfo {
    let containers = pod
        .spec
        .as_ref()
        .map(|spec| spec.containers.len())
        .unwrap_or(0);
    let (ready, _, restarts) = pod.status.as_ref().map(pod_readiness).unwrap_or((0, 0, 0));
    let status = pod
        .status
        .as_ref()
        .and_then(|status| status.phase.clone())
        .filter(|phase| !phase.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());
    let ip = pod
        .status
        .as_ref()
        .and_then(|status| status.pod_ip.clone())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| NONE.to_string());
    let node = pod
        .spec
        .as_ref()
        .and_then(|spec| spec.node_name.clone())
        .filter(|node| !node.is_empty())
        .unwrap_or_else(|| NONE.to_string());

    ResourceInfo {
        name: pod.name_any(),
        namespace: pod.namespace().unwrap_or_default(),
        kind: "Pod".to_string(),
        ready: format!("{ready}/{containers}"),
        status,
        restarts: restarts.to_string(),
        age: human_age(pod.metadata.creation_timestamp.as_ref()),
        ip,
        node,
    }
}

fn service_row(service: &Service) -> ResourceInfo {
    let spec = service.spec.clone().unwrap_or_default();
    let service_type = spec
        .type_
        .clone()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "ClusterIP".to_string());
    let cluster_ip = spec
        .cluster_ip
        .clone()
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| NONE.to_string());
    let load_balancer_ip = service
        .status
        .as_ref()
        .and_then(|status| status.load_balancer.as_ref())
        .and_then(|balancer| balancer.ingress.as_ref())
        .and_then(|ingress| ingress.first())
        .and_then(|ingress| ingress.ip.clone());
    let external_ip = spec
        .external_ips
        .as_ref()
        .and_then(|ips| ips.first().cloned())
        .or_else(|| {
            (service_type == "LoadBalancer")
                .then_some(load_balancer_ip)
                .flatten()
        })
        .unwrap_or_else(|| NONE.to_string());
    let port = spec
        .ports
        .as_ref()
        .and_then(|ports| ports.first())
        .map(|port| {
            let protocol = port.protocol.clone().unwrap_or_else(|| "TCP".to_string());
            format!("{}/{}", port.port, protocol)
        })
        .unwrap_or_else(|| NONE.to_string());

    ResourceInfo {
        name: service.name_any(),
        namespace: service.namespace().unwrap_or_default(),
        kind: "Service".to_string(),
        ready: service_type,
        status: "Active".to_string(),
        restarts: port,
        age: human_age(service.metadata.creation_timestamp.as_ref()),
        ip: cluster_ip,
        node: external_ip,
    }
}

fn deployment_row(deployment: &Deployment) -> ResourceInfo {
    let desired = deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.replicas)
        .unwrap_or(1);
    let ready = deployment
        .status
        .as_ref()
        .and_then(|status| status.ready_replicas)
        .unwrap_or(0);
    let updated = deployment
        .status
        .as_ref()
        .and_then(|status| status.updated_replicas)
        .unwrap_or(0);
    let status = if ready == desired {
        "Available"
    } else if ready > 0 {
        "Progressing"
    } else {
        "Unknown"
    };

    ResourceInfo {
        name: deployment.name_any(),
        namespace: deployment.namespace().unwrap_or_default(),
        kind: "Deployment".to_string(),
        ready: format!("{ready}/{desired}"),
        status: status.to_string(),
        restarts: updated.to_string(),
        age: human_age(deployment.metadata.creation_timestamp.as_ref()),
        ip: NONE.to_string(),
        node: NONE.to_string(),
    }
}

fn dynamic_row(object: &DynamicObject, kind: &str) -> ResourceInfo {
    let status = object
        .data
        .get("status")
        .and_then(|status| status.get("phase"))
        .and_then(Value::as_str)
        .unwrap_or("-")
        .to_string();

    ResourceInfo {
        name: object.name_any(),
        namespace: object.namespace().unwrap_or_default(),
        kind: kind.to_string(),
        status,
        age: human_age(object.metadata.creation_timestamp.as_ref()),
        ..ResourceInfo::default()
    }
}

fn list_params() -> ListParams {
    ListParams::default().limit(500)
}

async fn list_all<K>(api: &Api<K>) -> Result<Vec<K>>
where
    K: Clone + DeserializeOwned + Debug,
{
    collect_pages(|params| async move {
        let list = api.list(&params).await?;
        Ok::<_, anyhow::Error>((list.items, list.metadata.continue_))
    })
    .await
}

/// Requests pages until the server stops handing out a continue token.
async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(ListParams) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<String>)>>,
{
    let mut params = list_params();
    let mut items = Vec::new();
    loop {
        let (page, token) = fetch(params).await?;
        items.extend(page);
        match token.filter(|token| !token.is_empty()) {
            Some(token) => {
                debug!("continuing list after {} items", items.len());
                params = list_params().continue_token(&token);
            }
            None => return Ok(items),
        }
    }
}

fn pod_readiness(status: &k8s_openapi::api::core::v1::PodStatus) -> (usize, usize, i32) {
    let container_statuses = status.container_statuses.as_deref().unwrap_or(&[]);
    let total = container_statuses.len();
    let ready = container_statuses
        .iter()
        .filter(|container| container.ready)
        .count();
    let restarts = container_statuses
        .iter()
        .map(|container| container.restart_count)
        .sum();

    (ready, total, restarts)
}

fn human_age(timestamp: Option<&Time>) -> String {
    let Some(timestamp) = timestamp else {
        return "-".to_string();
    };

    let elapsed_seconds =
        (k8s_openapi::jiff::Timestamp::now().as_second() - timestamp.0.as_second()).max(0);
    format_elapsed_seconds(elapsed_seconds)
}

fn format_elapsed_seconds(seconds: i64) -> String {
    if seconds >= 86_400 {
        return format!("{}d", seconds / 86_400);
    }

    if seconds >= 3_600 {
        return format!("{}h", seconds / 3_600);
    }

    if seconds >= 60 {
        return format!("{}m", seconds / 60);
    }

    format!("{seconds}s")
}

fn yaml_detail<T>(value: &T) -> String
where
    T: Serialize,
{
    serde_yaml::to_string(value).unwrap_or_else(|error| format!("failed to format detail: {error}"))
}
