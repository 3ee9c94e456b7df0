mod cluster_client;
mod crd_client;
mod error;
mod http_status_code;

pub use cluster_client::ClusterClient;
pub use crd_client::CrdClient;
pub use error::{Error, Result};
pub use http_status_code::{AllowNotFound, HttpStatusCode, StatusCode};
