use snafu::Snafu;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for `ClusterManager`
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum Error {
    #[snafu(display("Unable to {}: {}", action, source))]
    Client {
        action: String,
        source: crate::clients::Error,
    },

    #[snafu(display("Unable to create client: {}", source))]
    ClientCreateKubeconfig {
        source: kube::config::KubeconfigError,
    },

    #[snafu(display("Unable to read kubeconfig: {}", source))]
    ConfigRead {
        source: kube::config::KubeconfigError,
    },

    #[snafu(display("Error Creating {}: {}", what, source))]
    Create { what: String, source: kube::Error },

    #[snafu(display("Error waiting for the {}: {}", what, source))]
    Event {
        what: String,
        source: crate::events::Error,
    },

    #[snafu(display("Unable to {}: {}", action, source))]
    Kube { action: String, source: kube::Error },

    #[snafu(display(
        "Namespace '{}' already exists, refusing to use a namespace this run did not create",
        name
    ))]
    NamespaceExists { name: String },

    #[snafu(display("The {} was not ready after {:?}", what, duration))]
    NotReady { what: String, duration: Duration },
}
