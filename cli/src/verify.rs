use anyhow::{Context, Result};
use capi_model::constants::{DEFAULT_CLUSTER_NAME, DEFAULT_NAMESPACE};
use capi_model::manager::DEFAULT_EVENT_TIMEOUT;
use capi_model::{describe_event, ClusterManager, VerifyConfig};
use clap::Parser;
use std::time::Duration;

/// Create a namespace and a `Cluster` in it, then wait for the controller to record an event about
/// the `Cluster`. The namespace is deleted afterwards.
#[derive(Debug, Parser)]
pub(crate) struct Verify {
    /// The namespace to create for the check. It must not exist yet.
    #[clap(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// The name of the `Cluster` to create.
    #[clap(long = "cluster-name", default_value = DEFAULT_CLUSTER_NAME)]
    cluster_name: String,

    /// How many seconds to wait for the event.
    #[clap(long = "timeout-secs")]
    timeout_secs: Option<u64>,

    /// Only accept an event about the `Cluster` that was created, rather than any `Cluster`.
    #[clap(long = "match-name")]
    match_name: bool,

    /// Leave the namespace and the `Cluster` behind.
    #[clap(long = "keep-namespace")]
    keep_namespace: bool,

    /// Install the `Cluster` CRD before running the check.
    #[clap(long)]
    install: bool,
}

impl Verify {
    pub(crate) async fn run(self, client: ClusterManager) -> Result<()> {
        if self.install {
            client
                .install()
                .await
                .context("Unable to install the Cluster CRD")?;
        }
        let config = VerifyConfig {
            namespace: self.namespace,
            cluster_name: self.cluster_name,
            timeout: self
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_EVENT_TIMEOUT),
            match_name: self.match_name,
            keep_namespace: self.keep_namespace,
            ..VerifyConfig::default()
        };
        let event = client
            .verify_cluster_event(&config)
            .await
            .context(format!(
                "No event was recorded for cluster '{}'",
                config.cluster_name
            ))?;
        println!("{}", describe_event(&event));
        Ok(())
    }
}
