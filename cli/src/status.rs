use anyhow::{Context, Result};
use capi_model::constants::DEFAULT_NAMESPACE;
use capi_model::{ClusterManager, CrdExt};
use clap::Parser;

/// Check the status of the `Cluster` objects in a namespace.
#[derive(Debug, Parser)]
pub(crate) struct Status {
    /// The namespace to look in.
    #[clap(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// Output the results in JSON format.
    #[clap(long = "json")]
    json: bool,
}

impl Status {
    pub(crate) async fn run(self, client: ClusterManager) -> Result<()> {
        let clusters = client
            .list_clusters(&self.namespace)
            .await
            .context("Unable to get status")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&clusters)
                    .context("Could not create string from status.")?
            );
            return Ok(());
        }

        println!("{:<24} {:<32} ERROR", "NAME", "ENDPOINTS");
        for cluster in &clusters {
            let status = cluster.status.clone().unwrap_or_default();
            let endpoints = status
                .api_endpoints
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let endpoints = if endpoints.is_empty() {
                "-".to_string()
            } else {
                endpoints
            };
            println!(
                "{:<24} {:<32} {}",
                cluster.object_name(),
                endpoints,
                status.error().unwrap_or_else(|| "-".to_string())
            );
        }
        Ok(())
    }
}
