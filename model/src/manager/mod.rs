pub use error::{Error, Result};
pub use manager::ClusterManager;
pub use verify::{VerifyConfig, DEFAULT_EVENT_TIMEOUT};

mod error;
mod install;
mod manager;
mod manager_impl;
mod verify;
