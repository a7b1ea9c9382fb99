//! Kubernetes client for Longhorn CRDs and the core resources they back.
//!
//! Longhorn objects are read as [`DynamicObject`]s and handed to the
//! analysis core as plain JSON documents; PersistentVolumes and Pods use the
//! typed `k8s-openapi` structs.
//!
//! # Prerequisites
//!
//! - Valid kubeconfig (default context, or one chosen explicitly)
//! - Longhorn installed (CRDs in `longhorn.io/v1beta2`)
//! - RBAC permissions to list Longhorn nodes, volumes and replicas, cluster
//!   PersistentVolumes and Pods in claim namespaces
//!
//! # Example
//!
//! ```rust,ignore
//! use lhmon::analyzer::storage::cluster_client::{ClusterTarget, StorageClient};
//!
//! let client = StorageClient::connect(&ClusterTarget::default(), "longhorn-system").await?;
//! let volumes = client.list_volumes().await?;
//! ```

use k8s_openapi::api::core::v1::{PersistentVolume, Pod};
use kube::{
    Client, Config,
    api::{Api, ApiResource, DynamicObject, GroupVersionKind, ListParams},
    config::{KubeConfigOptions, Kubeconfig},
};
use serde_json::Value;
use std::path::PathBuf;

/// API group of the Longhorn CRDs.
pub const LONGHORN_GROUP: &str = "longhorn.io";

/// API version of the Longhorn CRDs.
pub const LONGHORN_VERSION: &str = "v1beta2";

/// Error type for cluster client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Failed to infer Kubernetes config: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),

    #[error("Failed to read kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("Failed to decode {kind}: {message}")]
    Decode { kind: String, message: String },

    #[error("API request failed: {0}")]
    Api(String),
}

/// Where to find the cluster.
#[derive(Debug, Clone, Default)]
pub struct ClusterTarget {
    /// Explicit kubeconfig file; `None` uses the default lookup.
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context; `None` uses the current context.
    pub context: Option<String>,
}

/// A Longhorn custom resource.
#[derive(Debug, Clone, Copy)]
struct LonghornKind {
    kind: &'static str,
    plural: &'static str,
}

const NODES: LonghornKind = LonghornKind {
    kind: "Node",
    plural: "nodes",
};
const VOLUMES: LonghornKind = LonghornKind {
    kind: "Volume",
    plural: "volumes",
};
const REPLICAS: LonghornKind = LonghornKind {
    kind: "Replica",
    plural: "replicas",
};

/// Reads Longhorn and core resources from one cluster.
#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    namespace: String,
}

impl StorageClient {
    /// Connect using `target`, reading Longhorn CRDs from `namespace`.
    pub async fn connect(target: &ClusterTarget, namespace: &str) -> Result<Self, ClusterError> {
        let config = match (&target.kubeconfig, &target.context) {
            (None, None) => Config::infer().await?,
            (path, context) => {
                let kubeconfig = match path {
                    Some(path) => Kubeconfig::read_from(path)?,
                    None => Kubeconfig::read()?,
                };
                Config::from_custom_kubeconfig(
                    kubeconfig,
                    &KubeConfigOptions {
                        context: context.clone(),
                        ..Default::default()
                    },
                )
                .await?
            }
        };
        let client = Client::try_from(config)?;
        log::debug!("Connected to Kubernetes API, Longhorn namespace {}", namespace);
        Ok(Self::from_client(client, namespace))
    }

    /// Wrap an existing client.
    pub fn from_client(client: Client, namespace: &str) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
        }
    }

    /// Get the current context name.
    pub fn current_context(target: &ClusterTarget) -> Result<String, ClusterError> {
        if let Some(context) = &target.context {
            return Ok(context.clone());
        }
        let kubeconfig = match &target.kubeconfig {
            Some(path) => Kubeconfig::read_from(path)?,
            None => Kubeconfig::read()?,
        };
        Ok(kubeconfig
            .current_context
            .unwrap_or_else(|| "default".to_string()))
    }

    async fn list_longhorn(&self, resource: LonghornKind) -> Result<Vec<Value>, ClusterError> {
        let gvk = GroupVersionKind::gvk(LONGHORN_GROUP, LONGHORN_VERSION, resource.kind);
        let api_resource = ApiResource::from_gvk_with_plural(&gvk, resource.plural);
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), &self.namespace, &api_resource);

        let list = api.list(&ListParams::default()).await?;
        log::debug!(
            "Listed {} {}.{} in {}",
            list.items.len(),
            resource.plural,
            LONGHORN_GROUP,
            self.namespace
        );

        list.items
            .into_iter()
            .map(|obj| {
                serde_json::to_value(obj).map_err(|e| ClusterError::Decode {
                    kind: resource.kind.to_string(),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    /// List Longhorn node objects.
    pub async fn list_nodes(&self) -> Result<Vec<Value>, ClusterError> {
        self.list_longhorn(NODES).await
    }

    /// List Longhorn volume objects.
    pub async fn list_volumes(&self) -> Result<Vec<Value>, ClusterError> {
        self.list_longhorn(VOLUMES).await
    }

    /// List Longhorn replica objects.
    pub async fn list_replicas(&self) -> Result<Vec<Value>, ClusterError> {
        self.list_longhorn(REPLICAS).await
    }

    /// List every PersistentVolume in the cluster.
    pub async fn list_persistent_volumes(&self) -> Result<Vec<PersistentVolume>, ClusterError> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    /// List pods in one namespace.
    pub async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, ClusterError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| ClusterError::Api(format!("Failed to list pods in {}: {}", namespace, e)))?;
        Ok(list.items)
    }
}
