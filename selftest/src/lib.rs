/*!

Provides utilities for testing `Cluster` objects and the controller that reacts to them, either in
a `kind` cluster created for the test or in the cluster the environment's kubeconfig points at.

!*/

pub mod kind;
mod test_settings;

use anyhow::{Context, Result};
use capi_model::ClusterManager;
pub use kind::KindCluster;
pub use test_settings::TestSettings;

/// Create a `ClusterManager` for the cluster named by the environment (`KUBECONFIG`, or the
/// default kubeconfig location).
pub async fn manager_from_env() -> Result<ClusterManager> {
    ClusterManager::new()
        .await
        .context("Unable to create a cluster manager from the environment's kubeconfig")
}
