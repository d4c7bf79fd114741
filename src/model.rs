use std::fmt::{Display, Formatter};

pub const ALL_NAMESPACES_LABEL: &str = "all namespaces";

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum NamespaceScope {
    All,
    Named(String),
}

impl NamespaceScope {
    pub fn label(&self) -> String {
        match self {
            Self::All => ALL_NAMESPACES_LABEL.to_string(),
            Self::Named(namespace) => namespace.clone(),
        }
    }

    #[cfg(test)]
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Named(namespace) => Some(namespace),
        }
    }
}

impl Display for NamespaceScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "{ALL_NAMESPACES_LABEL}"),
            Self::Named(namespace) => write!(f, "{namespace}"),
        }
    }
}

/// One listed cluster object, already flattened into display strings.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ResourceInfo {
    pub name: String,
    pub namespace: String,
    pub kind: String,
    pub ready: String,
    pub status: String,
    pub restarts: String,
    pub age: String,
    pub ip: String,
    pub node: String,
}

impl ResourceInfo {
    pub fn is_pod(&self) -> bool {
        is_pod_kind(&self.kind)
    }

    pub fn reference(&self) -> ResourceRef {
        ResourceRef {
            kind: normalize_kind(&self.kind),
            namespace: Some(self.namespace.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            name: self.name.clone(),
        }
    }
}

/// Address of a single object, used for describe and edit.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResourceRef {
    pub kind: String,
    pub namespace: Option<String>,
    pub name: String,
}

impl Display for ResourceRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}/{} in {namespace}", self.kind, self.name),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}

pub fn normalize_kind(token: &str) -> String {
    let lowered = token.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "po" | "pod" | "pods" => "pods".to_string(),
        "svc" | "service" | "services" => "services".to_string(),
        "deploy" | "deployment" | "deployments" => "deployments".to_string(),
        _ => lowered,
    }
}

pub fn is_pod_kind(kind: &str) -> bool {
    matches!(kind.trim().to_ascii_lowercase().as_str(), "pod" | "pods")
}
