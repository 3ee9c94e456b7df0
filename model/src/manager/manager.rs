use super::{error, Result};
use crate::clients::{ClusterClient, CrdClient};
use crate::events::{EventFilter, EventWatcher};
use crate::Cluster;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use snafu::ResultExt;
use std::path::Path;

/// # Cluster Manager
///
/// The cluster manager coordinates the objects needed to check that a cluster controller reacts to
/// `Cluster` objects: the `Cluster` CRD, the namespace the check runs in, the `Cluster` itself and
/// a watch over the namespace's `Event`s.
///
/// # Clients
///
/// For direct, lower-level operations on `Cluster` objects, use a [`ClusterClient`]. It can be
/// constructed independently or obtained from the `ClusterManager` using `cluster_client()`.
pub struct ClusterManager {
    pub k8s_client: Client,
}

impl ClusterManager {
    /// Create a `ClusterManager` from the path to a kubeconfig file.
    pub async fn new_from_kubeconfig_path(kubeconfig_path: &Path) -> Result<Self> {
        let kubeconfig = Kubeconfig::read_from(kubeconfig_path).context(error::ConfigReadSnafu)?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .context(error::ClientCreateKubeconfigSnafu)?;
        Ok(ClusterManager {
            k8s_client: config.try_into().context(error::KubeSnafu {
                action: "create client from `Kubeconfig`",
            })?,
        })
    }

    /// Create a `ClusterManager` using the default `kube::Client`. The kubeconfig is found the
    /// usual way, which includes the `KUBECONFIG` environment variable.
    pub async fn new() -> Result<Self> {
        Ok(ClusterManager {
            k8s_client: Client::try_default().await.context(error::KubeSnafu {
                action: "create client from `Kubeconfig`",
            })?,
        })
    }

    pub fn new_from_k8s_client(k8s_client: Client) -> Self {
        ClusterManager { k8s_client }
    }

    /// Create a `ClusterClient` for `namespace`.
    pub fn cluster_client(&self, namespace: &str) -> ClusterClient {
        ClusterClient::new_from_k8s_client(self.k8s_client.clone(), namespace)
    }

    /// Start watching the `Event`s of `namespace` that pass `filter`.
    pub fn watch_events(&self, namespace: &str, filter: EventFilter) -> EventWatcher {
        EventWatcher::start(self.k8s_client.clone(), namespace, filter)
    }

    /// List the `Cluster` objects in `namespace`.
    pub async fn list_clusters(&self, namespace: &str) -> Result<Vec<Cluster>> {
        self.cluster_client(namespace)
            .get_all()
            .await
            .context(error::ClientSnafu {
                action: format!("list clusters in namespace '{}'", namespace),
            })
    }

    /// Delete the `Cluster` named `name`. The object is returned if its deletion is still pending.
    pub async fn delete_cluster(&self, namespace: &str, name: &str) -> Result<Option<Cluster>> {
        self.cluster_client(namespace)
            .delete(name)
            .await
            .context(error::ClientSnafu {
                action: format!("delete cluster '{}'", name),
            })
    }
}
