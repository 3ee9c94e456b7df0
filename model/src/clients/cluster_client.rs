use super::error::Result;
use crate::clients::CrdClient;
use crate::{ApiEndpoint, Cluster};
use kube::Api;

/// An API Client for `Cluster` CRD objects in a single namespace.
///
/// # Example
///
/// ```
///# use capi_model::clients::{ClusterClient, CrdClient};
///# async fn no_run() {
/// let cluster_client = ClusterClient::new("clusterapi-test").await.unwrap();
/// let cluster = cluster_client.get("foo").await.unwrap();
///# }
/// ```
#[derive(Clone)]
pub struct ClusterClient {
    api: Api<Cluster>,
}

impl ClusterClient {
    /// Get the API endpoints the controller has reported for the `Cluster`. Empty until the
    /// controller has written a status.
    pub async fn api_endpoints<S>(&self, name: S) -> Result<Vec<ApiEndpoint>>
    where
        S: AsRef<str> + Send,
    {
        Ok(self
            .get(name)
            .await?
            .status
            .unwrap_or_default()
            .api_endpoints)
    }

    /// Get the error the controller has reported for the `Cluster`, if any.
    pub async fn error_status<S>(&self, name: S) -> Result<Option<String>>
    where
        S: AsRef<str> + Send,
    {
        Ok(self
            .get(name)
            .await?
            .status
            .and_then(|status| status.error()))
    }
}

impl CrdClient for ClusterClient {
    type Crd = Cluster;

    fn new_from_api(api: Api<Self::Crd>) -> Self {
        Self { api }
    }

    fn kind(&self) -> &'static str {
        "cluster"
    }

    fn api(&self) -> &Api<Self::Crd> {
        &self.api
    }
}

#[cfg(test)]
#[cfg(feature = "integ")]
mod test {
    use super::*;
    use crate::clients::{AllowNotFound, HttpStatusCode, StatusCode};
    use crate::constants::CLUSTER_CRD_NAME;
    use crate::{create_cluster_crd, ClusterSpec};
    use capi_selftest::KindCluster;
    use k8s_openapi::api::core::v1::Namespace;
    use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
    use kube::api::PostParams;
    use kube::CustomResourceExt;
    use std::time::Duration;

    const CLUSTER_NAME: &str = "cluster-client";
    const NAMESPACE: &str = "cluster-client-test";
    const OBJECT_NAME: &str = "foo";

    #[tokio::test]
    async fn cluster_client() {
        let cluster = KindCluster::new(CLUSTER_NAME).unwrap();
        let k8s_client = cluster.k8s_client().await.unwrap();
        let ns_api: Api<Namespace> = Api::all(k8s_client.clone());
        ns_api
            .create(&PostParams::default(), &crate::system::namespace(NAMESPACE))
            .await
            .unwrap();
        cluster
            .wait_for_object::<Namespace>(NAMESPACE, ns_api.clone(), Duration::from_secs(10))
            .await
            .unwrap();
        let crd_api: Api<CustomResourceDefinition> = Api::all(k8s_client.clone());
        crd_api
            .create(&PostParams::default(), &Cluster::crd())
            .await
            .unwrap();
        cluster
            .wait_for_object::<CustomResourceDefinition>(
                CLUSTER_CRD_NAME,
                crd_api,
                Duration::from_secs(10),
            )
            .await
            .unwrap();
        // The CRD object exists before the API server serves the new type.
        tokio::time::sleep(Duration::from_secs(2)).await;

        let cc = ClusterClient::new_from_k8s_client(k8s_client, NAMESPACE);
        cc.create(create_cluster_crd(
            OBJECT_NAME,
            NAMESPACE,
            None,
            ClusterSpec::example(),
        ))
        .await
        .unwrap();

        // Creating the same object twice is a conflict.
        let second = cc
            .create(create_cluster_crd(
                OBJECT_NAME,
                NAMESPACE,
                None,
                ClusterSpec::example(),
            ))
            .await;
        assert!(second.is_status_code(StatusCode::CONFLICT));

        let fetched = cc.get(OBJECT_NAME).await.unwrap();
        assert_eq!(fetched.spec, ClusterSpec::example());
        assert_eq!(cc.get_all().await.unwrap().len(), 1);

        // Nothing is reconciling these objects in a bare kind cluster.
        assert!(cc.api_endpoints(OBJECT_NAME).await.unwrap().is_empty());
        assert!(cc.error_status(OBJECT_NAME).await.unwrap().is_none());

        cc.delete(OBJECT_NAME).await.unwrap();
        cc.wait_for_deletion(OBJECT_NAME, Duration::from_secs(30))
            .await
            .unwrap();
        assert!(cc.get(OBJECT_NAME).await.allow_not_found().unwrap().is_none());
    }
}
