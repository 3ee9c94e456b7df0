use crate::TestSettings;
use anyhow::{format_err, Context, Result};
use capi_model::ClusterManager;
use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Api, Client, Config,
};
use log::{debug, error};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Duration;
use tempfile::TempDir;

pub const KUBECONFIG_FILENAME: &str = "kubeconfig.yaml";

/// How often `wait_for_object` polls the API server.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Represents a `kind` cluster. The `Drop` trait is implemented deleting the `kind` cluster when it
/// goes out of scope.
#[derive(Debug)]
pub struct KindCluster {
    name: String,
    kubeconfig_dir: TempDir,
}

impl KindCluster {
    /// Creates a `KindCluster` while initializing a kind cluster. If a cluster named
    /// `cluster_name` already exists, it will be deleted.
    pub fn new(cluster_name: &str) -> Result<KindCluster> {
        let kubeconfig_dir = TempDir::new()?;
        Self::delete_kind_cluster(cluster_name)?;
        Self::create_kind_cluster(
            cluster_name,
            &kubeconfig_dir.path().join(KUBECONFIG_FILENAME),
        )?;
        Ok(Self {
            name: cluster_name.into(),
            kubeconfig_dir,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the path to the kubeconfig file in the `TempDir` created for the cluster.
    pub fn kubeconfig(&self) -> PathBuf {
        self.kubeconfig_dir.path().join(KUBECONFIG_FILENAME)
    }

    /// Create the k8s client for the cluster.
    pub async fn k8s_client(&self) -> Result<Client> {
        let kubeconfig = Kubeconfig::read_from(self.kubeconfig())?;
        let config =
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
        Ok(config.try_into()?)
    }

    /// Create a `ClusterManager` for the cluster.
    pub async fn manager(&self) -> Result<ClusterManager> {
        ClusterManager::new_from_kubeconfig_path(&self.kubeconfig())
            .await
            .context(format!(
                "Unable to create a cluster manager for kind cluster '{}'",
                self.name
            ))
    }

    /// Polls `api` until the object named `name` can be read, giving up after `timeout`.
    pub async fn wait_for_object<T>(
        &self,
        name: &str,
        api: Api<T>,
        timeout: Duration,
    ) -> Result<()>
    where
        T: Clone + DeserializeOwned + Debug,
    {
        tokio::time::timeout(timeout, async {
            while api.get(name).await.is_err() {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await
        .map_err(|_| {
            format_err!(
                "object '{}' did not show up in kind cluster '{}' within {:?}",
                name,
                self.name,
                timeout
            )
        })
    }

    fn create_kind_cluster(name: &str, kubeconfig: &Path) -> Result<()> {
        debug!("creating kind cluster '{}'", name);
        let output = Command::new(TestSettings::kind_path())
            .arg("--kubeconfig")
            .arg(
                kubeconfig
                    .to_str()
                    .ok_or_else(|| format_err!("non utf-8 path '{}'", kubeconfig.display()))?,
            )
            .arg("create")
            .arg("cluster")
            .arg("--name")
            .arg(name)
            .output()?;
        check_output("kind create cluster", &output)
    }

    fn delete_kind_cluster(name: &str) -> Result<()> {
        debug!("deleting kind cluster '{}'", name);
        let output = Command::new(TestSettings::kind_path())
            .arg("delete")
            .arg("cluster")
            .arg("--name")
            .arg(name)
            .output()?;
        check_output("kind delete cluster", &output)
    }
}

impl Drop for KindCluster {
    fn drop(&mut self) {
        if let Err(e) = Self::delete_kind_cluster(&self.name) {
            error!("unable to delete kind cluster '{}': {}", self.name, e)
        }
    }
}

fn check_output(what: &str, output: &Output) -> Result<()> {
    if !output.status.success() {
        return Err(format_err!(
            "'{}' failed with exit status '{}'\n\n{}\n\n{}",
            what,
            output.status.code().unwrap_or(1),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        ));
    }
    Ok(())
}
