use super::{error, ClusterManager, Result};
use crate::clients::CrdClient;
use crate::constants::{DEFAULT_CLUSTER_NAME, DEFAULT_NAMESPACE};
use crate::events::{describe_event, last_recorded, EventFilter};
use crate::{create_cluster_crd, Cluster, ClusterSpec};
use k8s_openapi::api::core::v1::Event;
use log::{debug, info, warn};
use snafu::ResultExt;
use std::collections::BTreeMap;
use std::time::Duration;

/// How long we wait for the controller to record an event about a new `Cluster` by default.
pub const DEFAULT_EVENT_TIMEOUT: Duration = Duration::from_secs(120);

/// Describes a check that a controller reacts to a new `Cluster` by recording an `Event` about it.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// The namespace that is created for the check.
    pub namespace: String,
    /// The name of the `Cluster` that is created.
    pub cluster_name: String,
    pub cluster_spec: ClusterSpec,
    /// Extra labels for the `Cluster`.
    pub labels: Option<BTreeMap<String, String>>,
    /// How long to wait for the event.
    pub timeout: Duration,
    /// Only accept events about the `Cluster` we created rather than any `Cluster`.
    pub match_name: bool,
    /// Leave the namespace (and the `Cluster` in it) behind when done.
    pub keep_namespace: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
            cluster_spec: ClusterSpec::example(),
            labels: None,
            timeout: DEFAULT_EVENT_TIMEOUT,
            match_name: false,
            keep_namespace: false,
        }
    }
}

impl VerifyConfig {
    pub(super) fn event_filter(&self) -> EventFilter {
        let filter = EventFilter::cluster();
        if self.match_name {
            filter.with_name(self.cluster_name.as_str())
        } else {
            filter
        }
    }
}

impl ClusterManager {
    /// Create a namespace, watch it for `Event`s, create a `Cluster` in it and wait for the first
    /// event that involves a `Cluster` and was recorded after the `Cluster` was created. The watch
    /// is stopped and, unless `keep_namespace` is set, the namespace is deleted whether or not the
    /// event showed up. If both waiting and cleaning up fail, the waiting error is returned.
    ///
    /// The namespace must not exist yet. If it does, nothing is created or deleted and
    /// `Error::NamespaceExists` is returned.
    ///
    /// The `Cluster` CRD must already be installed, see `install`.
    pub async fn verify_cluster_event(&self, config: &VerifyConfig) -> Result<Event> {
        self.create_namespace(&config.namespace).await?;
        let outcome = self.await_cluster_event(config).await;
        let cleanup = if config.keep_namespace {
            info!("keeping namespace '{}'", config.namespace);
            Ok(())
        } else {
            self.delete_namespace(&config.namespace).await
        };
        let event = outcome?;
        if let Err(e) = &cleanup {
            warn!("unable to clean up after the check: {}", e);
        }
        cleanup?;
        Ok(event)
    }

    async fn await_cluster_event(&self, config: &VerifyConfig) -> Result<Event> {
        // The watch must be running before the cluster exists so no event can be missed.
        let mut watcher = self.watch_events(&config.namespace, config.event_filter());

        let cluster = create_cluster_crd(
            config.cluster_name.as_str(),
            config.namespace.as_str(),
            config.labels.as_ref(),
            config.cluster_spec.clone(),
        );
        let created = self
            .cluster_client(&config.namespace)
            .create(cluster)
            .await
            .context(error::ClientSnafu {
                action: format!("create cluster '{}'", config.cluster_name),
            })?;
        info!(
            "created cluster '{}' in namespace '{}', waiting up to {:?} for an event",
            config.cluster_name, config.namespace, config.timeout
        );

        let event = watcher
            .next_event_where(config.timeout, |event| {
                caused_by(event, &created, config.match_name)
            })
            .await
            .context(error::EventSnafu {
                what: format!("cluster '{}' event", config.cluster_name),
            })?;
        watcher.stop();
        info!("observed {}", describe_event(&event));
        Ok(event)
    }
}

/// Whether `event` can be a reaction to the creation of `created`. The watch's initial list
/// delivers events that were already there, so anything last recorded before the `Cluster` existed
/// is rejected. Both times come from the API server. With `match_name`, an event about an earlier
/// object of the same name is rejected by uid.
fn caused_by(event: &Event, created: &Cluster, match_name: bool) -> bool {
    if let Some(created_at) = &created.metadata.creation_timestamp {
        match last_recorded(event) {
            Some(recorded) if recorded >= created_at.0 => {}
            recorded => {
                debug!(
                    "ignoring event recorded at {:?}, before the cluster was created at {}",
                    recorded, created_at.0
                );
                return false;
            }
        }
    }
    if match_name {
        if let (Some(uid), Some(created_uid)) =
            (event.involved_object.uid.as_ref(), created.metadata.uid.as_ref())
        {
            if uid != created_uid {
                debug!("ignoring event about an earlier cluster with uid '{}'", uid);
                return false;
            }
        }
    }
    true
}
