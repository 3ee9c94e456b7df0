use crate::clients::{HttpStatusCode, StatusCode};
use snafu::Snafu;
use std::time::Duration;

/// The `Result` type returned by `clients`.
pub type Result<T> = std::result::Result<T, Error>;

/// The public error type returned by `clients`.
#[derive(Debug, Snafu)]
pub struct Error(InnerError);

/// The private error type returned by `clients`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub(crate) enum InnerError {
    #[snafu(display("Error initializing the Kubernetes client: {}", source))]
    Initialization { source: kube::Error },

    #[snafu(display("Unable to {} {}: {}", method, what, source))]
    KubeApiCall {
        method: String,
        what: String,
        source: kube::Error,
    },

    #[snafu(display("Unable to {} for '{}': {}", operation, name, source))]
    KubeApiCallFor {
        /// What we were trying to do, e.g. 'get status'.
        operation: String,
        /// The name of the k8s object we were trying to do this for, e.g. 'foo'.
        name: String,
        /// The error from kube-rs.
        source: kube::Error,
    },

    #[snafu(display("Timed out after {:?} waiting for {} '{}' to be deleted", duration, what, name))]
    DeletionTimeout {
        what: String,
        name: String,
        duration: Duration,
    },
}

impl HttpStatusCode for InnerError {
    fn status_code(&self) -> Option<StatusCode> {
        match self {
            InnerError::Initialization { .. } | InnerError::DeletionTimeout { .. } => None,
            InnerError::KubeApiCall { source: e, .. } => e.status_code(),
            InnerError::KubeApiCallFor { source: e, .. } => e.status_code(),
        }
    }
}

impl HttpStatusCode for Error {
    fn status_code(&self) -> Option<StatusCode> {
        self.0.status_code()
    }
}
