use anyhow::{Context, Result};
use capi_model::system::cluster_crd_yaml;
use clap::Parser;

/// Print the `Cluster` CRD as YAML, e.g. to apply it with `kubectl`.
#[derive(Debug, Parser)]
pub(crate) struct Crd {}

impl Crd {
    pub(crate) fn run(self) -> Result<()> {
        let yaml = cluster_crd_yaml().context("Unable to serialize the Cluster CRD")?;
        print!("{}", yaml);
        Ok(())
    }
}
