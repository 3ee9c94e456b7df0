use anyhow::{Context, Result};
use capi_model::constants::DEFAULT_NAMESPACE;
use capi_model::ClusterManager;
use clap::Parser;

/// Delete a `Cluster` object.
#[derive(Debug, Parser)]
pub(crate) struct Delete {
    /// The namespace of the `Cluster`.
    #[clap(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// The name of the `Cluster` to delete.
    name: String,
}

impl Delete {
    pub(crate) async fn run(self, client: ClusterManager) -> Result<()> {
        let pending = client
            .delete_cluster(&self.namespace, &self.name)
            .await
            .context(format!("Unable to delete cluster '{}'", self.name))?;
        match pending {
            Some(_) => println!("Deletion of cluster '{}' was requested.", self.name),
            None => println!("Cluster '{}' was deleted.", self.name),
        }
        Ok(())
    }
}
