use super::{error, ClusterManager, Result};
use core::fmt::Debug;
use kube::api::{Patch, PatchParams, PostParams};
use kube::{Api, Resource, ResourceExt};
use log::trace;
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::ResultExt;

impl ClusterManager {
    const MAX_RETRIES: i32 = 5;
    const BACKOFF_MS: u64 = 500;

    /// Create `data` or, if it already exists, merge it into the existing object. Retried a few
    /// times since freshly created namespaces and CRDs take a moment to settle.
    pub(super) async fn create_or_update<T>(&self, data: &T, what: &str) -> Result<()>
    where
        T: Resource<Scope = k8s_openapi::ClusterResourceScope>
            + Clone
            + DeserializeOwned
            + Serialize
            + Debug,
        <T as Resource>::DynamicType: Default,
    {
        let mut error = None;

        for _ in 0..Self::MAX_RETRIES {
            match self.create_or_update_internal(data, what).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    trace!("unable to create or update {}: {}", what, e);
                    error = Some(e)
                }
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(Self::BACKOFF_MS)).await;
        }
        match error {
            None => Ok(()),
            Some(error) => Err(error),
        }
    }

    async fn create_or_update_internal<T>(&self, data: &T, what: &str) -> Result<()>
    where
        T: Resource<Scope = k8s_openapi::ClusterResourceScope>
            + Clone
            + DeserializeOwned
            + Serialize
            + Debug,
        <T as Resource>::DynamicType: Default,
    {
        let api = self.api::<T>();
        // If the object already exists, update it with the new one using a `Patch`. If not create
        // a new one.
        match api.get(&data.name_any()).await {
            Ok(existing) => {
                api.patch(
                    &existing.name_any(),
                    &PatchParams::default(),
                    &Patch::Merge(data),
                )
                .await
            }
            Err(_err) => api.create(&PostParams::default(), data).await,
        }
        .context(error::CreateSnafu { what })?;

        Ok(())
    }

    /// Creates a non namespaced api of type `T`
    pub(super) fn api<T>(&self) -> Api<T>
    where
        T: Resource<Scope = k8s_openapi::ClusterResourceScope>,
        <T as Resource>::DynamicType: Default,
    {
        Api::<T>::all(self.k8s_client.clone())
    }
}
