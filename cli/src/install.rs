use anyhow::{Context, Result};
use capi_model::ClusterManager;
use clap::Parser;

/// The install subcommand puts the `Cluster` CRD in a k8s cluster.
#[derive(Debug, Parser)]
pub(crate) struct Install {}

impl Install {
    pub(crate) async fn run(self, client: ClusterManager) -> Result<()> {
        client
            .install()
            .await
            .context("Unable to install the Cluster CRD to the cluster")?;

        println!("The Cluster CRD was successfully installed.");

        Ok(())
    }
}
