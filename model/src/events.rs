/*!

Watches core/v1 `Event`s in a namespace and hands the ones that involve a given kind of object to
the caller. The watch runs in a background task until the `EventWatcher` is stopped or dropped.

!*/

use crate::constants::{CLUSTER_KIND, EVENT_CHANNEL_CAPACITY};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Event;
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Client};
use log::{debug, trace, warn};
use snafu::Snafu;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(
        "Timed out after {:?} waiting for an event involving a {} in namespace '{}'{}",
        duration,
        kind,
        namespace,
        last_error
            .as_ref()
            .map(|e| format!(", last watch error: {}", e))
            .unwrap_or_default()
    ))]
    Timeout {
        duration: Duration,
        kind: String,
        namespace: String,
        /// The most recent error the watch ran into, if any.
        last_error: Option<String>,
    },

    #[snafu(display("The event watch for namespace '{}' ended unexpectedly", namespace))]
    WatchEnded { namespace: String },
}

/// Selects the `Event`s an `EventWatcher` passes on, based on the object the event is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// The `involvedObject.kind` that must match.
    pub kind: String,
    /// When set, the `involvedObject.name` that must match.
    pub name: Option<String>,
}

impl EventFilter {
    pub fn new<S: Into<String>>(kind: S) -> Self {
        Self {
            kind: kind.into(),
            name: None,
        }
    }

    /// Matches events about any `Cluster`.
    pub fn cluster() -> Self {
        Self::new(CLUSTER_KIND)
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn matches(&self, event: &Event) -> bool {
        let involved = &event.involved_object;
        if involved.kind.as_deref() != Some(self.kind.as_str()) {
            return false;
        }
        match &self.name {
            None => true,
            Some(name) => involved.name.as_deref() == Some(name.as_str()),
        }
    }
}

/// A running watch over the `Event`s of one namespace.
#[derive(Debug)]
pub struct EventWatcher {
    namespace: String,
    filter: EventFilter,
    receiver: mpsc::Receiver<Event>,
    last_error: Arc<Mutex<Option<String>>>,
    task: JoinHandle<()>,
}

impl EventWatcher {
    /// Start watching `namespace`. Events that are already present when the watch starts are
    /// delivered too.
    pub fn start<S>(client: Client, namespace: S, filter: EventFilter) -> Self
    where
        S: Into<String>,
    {
        let namespace = namespace.into();
        let api: Api<Event> = Api::namespaced(client, &namespace);
        let (sender, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        debug!(
            "watching events involving {} objects in namespace '{}'",
            filter.kind, namespace
        );
        let last_error = Arc::new(Mutex::new(None));
        let task = tokio::spawn(forward_events(
            api,
            filter.clone(),
            sender,
            Arc::clone(&last_error),
        ));
        Self {
            namespace,
            filter,
            receiver,
            last_error,
            task,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Wait for the next matching event.
    pub async fn next_event(&mut self, timeout: Duration) -> Result<Event> {
        self.next_event_where(timeout, |_| true).await
    }

    /// Wait for the next matching event that `accept` also agrees with. Events `accept` turns down
    /// are discarded. `timeout` covers the whole wait, not each event.
    pub async fn next_event_where<F>(&mut self, timeout: Duration, mut accept: F) -> Result<Event>
    where
        F: FnMut(&Event) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, self.receiver.recv()).await {
                Ok(Some(event)) if accept(&event) => return Ok(event),
                Ok(Some(event)) => trace!("discarding event: {}", describe_event(&event)),
                Ok(None) => {
                    return WatchEndedSnafu {
                        namespace: self.namespace.as_str(),
                    }
                    .fail()
                }
                Err(_) => {
                    return TimeoutSnafu {
                        duration: timeout,
                        kind: self.filter.kind.as_str(),
                        namespace: self.namespace.as_str(),
                        last_error: self.last_error(),
                    }
                    .fail()
                }
            }
        }
    }

    /// The most recent error the background watch ran into.
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .ok()
            .and_then(|last_error| last_error.clone())
    }

    /// Stop the background watch. Events already received can still be read.
    pub fn stop(&self) {
        trace!("stopping event watch in namespace '{}'", self.namespace);
        self.task.abort();
    }
}

impl Drop for EventWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn forward_events(
    api: Api<Event>,
    filter: EventFilter,
    sender: mpsc::Sender<Event>,
    last_error: Arc<Mutex<Option<String>>>,
) {
    let stream = watcher(api, watcher::Config::default())
        .default_backoff()
        .applied_objects();
    futures::pin_mut!(stream);
    while let Some(item) = stream.next().await {
        match item {
            Ok(event) if filter.matches(&event) => {
                debug!("observed event: {}", describe_event(&event));
                if sender.send(event).await.is_err() {
                    // The receiving side is gone, nobody is interested anymore.
                    return;
                }
            }
            Ok(event) => trace!("ignoring event: {}", describe_event(&event)),
            Err(e) => {
                warn!("error while watching events: {}", e);
                if let Ok(mut last_error) = last_error.lock() {
                    *last_error = Some(e.to_string());
                }
            }
        }
    }
}

/// The most recent time the API server has for `event`: the latest of its event time, last and
/// first timestamps and its creation timestamp.
pub fn last_recorded(event: &Event) -> Option<DateTime<Utc>> {
    [
        event.event_time.as_ref().map(|time| time.0),
        event.last_timestamp.as_ref().map(|time| time.0),
        event.first_timestamp.as_ref().map(|time| time.0),
        event.metadata.creation_timestamp.as_ref().map(|time| time.0),
    ]
    .into_iter()
    .flatten()
    .max()
}

/// A one line, human readable summary of an `Event`.
pub fn describe_event(event: &Event) -> String {
    let involved = &event.involved_object;
    format!(
        "{} {} {}/{}: {}",
        event.type_.as_deref().unwrap_or("Unknown"),
        event.reason.as_deref().unwrap_or("-"),
        involved.kind.as_deref().unwrap_or("-"),
        involved.name.as_deref().unwrap_or("-"),
        event.message.as_deref().unwrap_or("")
    )
}
