use anyhow::{Context, Result};
use capi_model::constants::{CLUSTER_KIND, DEFAULT_NAMESPACE};
use capi_model::events::Error as EventError;
use capi_model::{describe_event, ClusterManager, EventFilter};
use clap::Parser;
use std::time::Duration;

/// Print the events recorded in a namespace about a kind of object.
#[derive(Debug, Parser)]
pub(crate) struct Watch {
    /// The namespace to watch.
    #[clap(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// Only print events about objects of this kind.
    #[clap(long, default_value = CLUSTER_KIND)]
    kind: String,

    /// Only print events about the object with this name.
    #[clap(long)]
    name: Option<String>,

    /// Stop after this many events.
    #[clap(long)]
    count: Option<usize>,

    /// Stop when no event shows up for this many seconds.
    #[clap(long = "timeout-secs", default_value = "300")]
    timeout_secs: u64,

    /// Output the events in JSON format.
    #[clap(long = "json")]
    json: bool,
}

impl Watch {
    pub(crate) async fn run(self, client: ClusterManager) -> Result<()> {
        let mut filter = EventFilter::new(self.kind);
        if let Some(name) = self.name {
            filter = filter.with_name(name);
        }
        let mut watcher = client.watch_events(&self.namespace, filter);
        let timeout = Duration::from_secs(self.timeout_secs);
        let mut seen = 0;
        while self.count.map(|count| seen < count).unwrap_or(true) {
            let event = match watcher.next_event(timeout).await {
                Ok(event) => event,
                // Going quiet is the normal way for an open ended watch to end.
                Err(EventError::Timeout { .. }) if self.count.is_none() => break,
                Err(e) => return Err(e).context("Unable to watch events"),
            };
            if self.json {
                println!(
                    "{}",
                    serde_json::to_string(&event).context("Could not serialize event")?
                );
            } else {
                println!("{}", describe_event(&event));
            }
            seen += 1;
        }
        watcher.stop();
        Ok(())
    }
}
