/*!

This library provides the `Cluster` custom resource definition, its API client, a watcher for the
Kubernetes `Event`s recorded about `Cluster` objects, and a manager that ties them together to check
that a cluster controller reacts to new `Cluster` objects.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use cluster::{
    create_cluster_crd, ApiEndpoint, Cluster, ClusterNetworkingConfig, ClusterSpec, ClusterStatus,
    NetworkRanges, ProviderSpec,
};
pub use crd_ext::CrdExt;
pub use events::{describe_event, EventFilter, EventWatcher};
pub use manager::{ClusterManager, VerifyConfig};

pub mod clients;
mod cluster;
pub mod constants;
mod crd_ext;
pub mod events;
pub mod manager;
#[cfg(test)]
mod mock;
mod schema_utils;
pub mod system;
