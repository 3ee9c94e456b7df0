use super::HttpStatusCode;
use crate::clients::error::{self, Result};
use crate::CrdExt;
use core::fmt::Debug;
use http::StatusCode;
use kube::api::{ListParams, PostParams};
use kube::Api;
use log::trace;
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::{ensure, ResultExt};
use std::time::Duration;
use tokio::time::Instant;

/// How long to sleep between polls when waiting for an object to go away.
const DELETION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// A trait with implementations of code that is shared between namespaced CRD clients.
#[async_trait::async_trait]
pub trait CrdClient: Sized {
    type Crd: kube::Resource<DynamicType = (), Scope = k8s_openapi::NamespaceResourceScope>
        + Serialize
        + DeserializeOwned
        + Debug
        + Clone
        + Send
        + Sync
        + CrdExt;

    // The following need to be implemented which allows the rest of the functions to have
    // default implementations.

    fn new_from_api(api: Api<Self::Crd>) -> Self;
    fn kind(&self) -> &'static str;
    fn api(&self) -> &Api<Self::Crd>;

    /// Create a client for `namespace` using the default `kube::Client`.
    async fn new<S>(namespace: S) -> Result<Self>
    where
        S: AsRef<str> + Send,
    {
        let k8s_client = kube::Client::try_default()
            .await
            .context(error::InitializationSnafu)?;
        Ok(Self::new_from_k8s_client(k8s_client, namespace.as_ref()))
    }

    fn new_from_k8s_client(k8s_client: kube::Client, namespace: &str) -> Self {
        Self::new_from_api(Self::create_api(k8s_client, namespace))
    }

    fn create_api(k8s_client: kube::Client, namespace: &str) -> Api<Self::Crd> {
        Api::<Self::Crd>::namespaced(k8s_client, namespace)
    }

    async fn get<S>(&self, name: S) -> Result<Self::Crd>
    where
        S: AsRef<str> + Send,
    {
        let name: &str = name.as_ref();
        Ok(self
            .api()
            .get(name)
            .await
            .context(error::KubeApiCallSnafu {
                method: "get",
                what: self.kind(),
            })?)
    }

    async fn get_all(&self) -> Result<Vec<Self::Crd>> {
        Ok(self
            .api()
            .list(&ListParams::default())
            .await
            .context(error::KubeApiCallForSnafu {
                operation: "get all",
                name: format!("{}s", self.kind()),
            })?
            .items)
    }

    async fn create(&self, crd: Self::Crd) -> Result<Self::Crd> {
        trace!("creating {} '{}'", self.kind(), crd.object_name());
        Ok(self
            .api()
            .create(&PostParams::default(), &crd)
            .await
            .context(error::KubeApiCallSnafu {
                method: "create",
                what: self.kind(),
            })?)
    }

    /// Request deletion of the object. The object is returned when its deletion is still pending
    /// (e.g. because of finalizers), `None` is returned when it is already gone.
    async fn delete<S>(&self, name: S) -> Result<Option<Self::Crd>>
    where
        S: AsRef<str> + Send,
    {
        let name: &str = name.as_ref();
        trace!("deleting {} '{}'", self.kind(), name);
        Ok(self
            .api()
            .delete(name, &Default::default())
            .await
            .context(error::KubeApiCallSnafu {
                method: "delete",
                what: self.kind(),
            })?
            .map_right(|_| None)
            .map_left(Some)
            .into_inner())
    }

    /// Loop until `get(name)` returns `StatusCode::NOT_FOUND` or `timeout` elapses.
    async fn wait_for_deletion<S>(&self, name: S, timeout: Duration) -> Result<()>
    where
        S: AsRef<str> + Send,
    {
        let name: &str = name.as_ref();
        let start = Instant::now();
        loop {
            if let Err(err) = self.api().get(name).await {
                if err.status_code() == Some(StatusCode::NOT_FOUND) {
                    return Ok(());
                }
            }
            ensure!(
                start.elapsed() < timeout,
                error::DeletionTimeoutSnafu {
                    what: self.kind(),
                    name,
                    duration: timeout,
                }
            );
            tokio::time::sleep(DELETION_POLL_INTERVAL).await;
        }
    }
}
