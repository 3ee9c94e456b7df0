use super::{error, ClusterManager, Result};
use crate::clients::{AllowNotFound, HttpStatusCode, StatusCode};
use crate::constants::CLUSTER_CRD_NAME;
use crate::system::namespace;
use crate::Cluster;
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{DeleteParams, PostParams};
use kube::CustomResourceExt;
use log::{debug, info};
use snafu::{ensure, ResultExt};
use std::time::Duration;
use tokio::time::Instant;

/// How long we wait for the API server to start serving the `Cluster` CRD.
const CRD_ESTABLISHED_TIMEOUT: Duration = Duration::from_secs(30);
const CRD_POLL_INTERVAL: Duration = Duration::from_millis(250);

impl ClusterManager {
    /// Install the `Cluster` CRD and wait until the API server serves it.
    pub async fn install(&self) -> Result<()> {
        self.create_crd().await?;
        self.wait_for_crd_established(CRD_ESTABLISHED_TIMEOUT).await?;
        info!("the '{}' CRD is established", CLUSTER_CRD_NAME);
        Ok(())
    }

    async fn create_crd(&self) -> Result<()> {
        let crd = Cluster::crd();
        self.create_or_update(&crd, "Cluster CRD").await
    }

    async fn wait_for_crd_established(&self, timeout: Duration) -> Result<()> {
        let api = self.api::<CustomResourceDefinition>();
        let start = Instant::now();
        loop {
            let crd = api.get(CLUSTER_CRD_NAME).await.context(error::KubeSnafu {
                action: "get the Cluster CRD",
            })?;
            if is_established(&crd) {
                return Ok(());
            }
            ensure!(
                start.elapsed() < timeout,
                error::NotReadySnafu {
                    what: "Cluster CRD",
                    duration: timeout,
                }
            );
            tokio::time::sleep(CRD_POLL_INTERVAL).await;
        }
    }

    /// Create the namespace `name`. A namespace that already exists is never taken over: it may
    /// belong to someone else and may hold events from before this run, so that is an error.
    pub async fn create_namespace(&self, name: &str) -> Result<()> {
        let created = self
            .api::<Namespace>()
            .create(&PostParams::default(), &namespace(name))
            .await;
        ensure!(
            !created.is_status_code(StatusCode::CONFLICT),
            error::NamespaceExistsSnafu { name }
        );
        created.context(error::CreateSnafu { what: "namespace" })?;

        // Give the object enough time to settle.
        let mut sleep_count = 0;
        let api = self.api::<Namespace>();
        while api.get(name).await.is_err() && sleep_count < 20 {
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
            sleep_count += 1;
        }

        api.get(name)
            .await
            .context(error::CreateSnafu { what: "namespace" })?;
        debug!("namespace '{}' is ready", name);

        Ok(())
    }

    /// Delete the namespace `name` and everything in it. A namespace that does not exist is not an
    /// error.
    pub async fn delete_namespace(&self, name: &str) -> Result<()> {
        let deleted = self
            .api::<Namespace>()
            .delete(name, &DeleteParams::default())
            .await
            .allow_not_found()
            .context(error::KubeSnafu {
                action: format!("delete namespace '{}'", name),
            })?;
        match deleted {
            Some(_) => debug!("requested deletion of namespace '{}'", name),
            None => debug!("namespace '{}' was already gone", name),
        }
        Ok(())
    }
}

/// Whether the API server reports the CRD as `Established`, i.e. it serves the new type.
fn is_established(crd: &CustomResourceDefinition) -> bool {
    crd.status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .map(|conditions| {
            conditions
                .iter()
                .any(|condition| condition.type_ == "Established" && condition.status == "True")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::manager::Error;
    use crate::mock::MockApi;
    use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
        CustomResourceDefinitionCondition, CustomResourceDefinitionStatus,
    };

    fn with_conditions(conditions: &[(&str, &str)]) -> CustomResourceDefinition {
        let mut crd = Cluster::crd();
        crd.status = Some(CustomResourceDefinitionStatus {
            conditions: Some(
                conditions
                    .iter()
                    .map(|(type_, status)| CustomResourceDefinitionCondition {
                        type_: type_.to_string(),
                        status: status.to_string(),
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        });
        crd
    }

    #[tokio::test]
    async fn existing_namespace_is_not_taken_over() {
        let api = MockApi::default();
        api.state().namespace_exists = true;
        let manager = ClusterManager::new_from_k8s_client(api.client());

        let err = manager.create_namespace("user-app").await.unwrap_err();
        assert!(matches!(err, Error::NamespaceExists { .. }), "{}", err);
        assert_eq!(api.requests(), vec!["POST /api/v1/namespaces"]);
    }

    #[tokio::test]
    async fn new_namespace_is_created() {
        let api = MockApi::default();
        let manager = ClusterManager::new_from_k8s_client(api.client());

        manager.create_namespace("clusterapi-test").await.unwrap();
        assert!(api.state().namespace_exists);
        assert_eq!(
            api.requests(),
            vec![
                "POST /api/v1/namespaces",
                "GET /api/v1/namespaces/clusterapi-test",
                "GET /api/v1/namespaces/clusterapi-test",
            ]
        );
    }

    #[test]
    fn established_condition() {
        assert!(!is_established(&Cluster::crd()));
        assert!(!is_established(&with_conditions(&[(
            "NamesAccepted",
            "True"
        )])));
        assert!(!is_established(&with_conditions(&[("Established", "False")])));
        assert!(is_established(&with_conditions(&[
            ("NamesAccepted", "True"),
            ("Established", "True")
        ])));
    }
}
