use crate::constants::{
    APP_MANAGED_BY, CAPI_EVENTS, DEFAULT_PODS_CIDR, DEFAULT_SERVICES_CIDR, DEFAULT_SERVICE_DOMAIN,
};
use crate::CrdExt;
use kube::core::ObjectMeta;
use kube::{CustomResource, Resource};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The desired state of a managed Kubernetes cluster. The `CustomResource` derive also produces a
/// struct named `Cluster` which represents a cluster CRD object in the k8s API.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[kube(
    derive = "Default",
    derive = "PartialEq",
    group = "cluster.k8s.io",
    kind = "Cluster",
    namespaced,
    plural = "clusters",
    singular = "cluster",
    status = "ClusterStatus",
    version = "v1alpha1"
)]
pub struct ClusterSpec {
    /// Cluster network configuration.
    pub cluster_network: ClusterNetworkingConfig,

    /// Provider-specific serialized configuration to use during cluster creation. It is
    /// recommended that providers maintain their own versioned API types that should be
    /// serialized/deserialized from this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_spec: Option<ProviderSpec>,
}

impl ClusterSpec {
    /// The cluster network used when checking that the controller reacts to a new `Cluster`.
    pub fn example() -> Self {
        Self {
            cluster_network: ClusterNetworkingConfig {
                services: NetworkRanges {
                    cidr_blocks: vec![DEFAULT_SERVICES_CIDR.to_string()],
                },
                pods: NetworkRanges {
                    cidr_blocks: vec![DEFAULT_PODS_CIDR.to_string()],
                },
                service_domain: DEFAULT_SERVICE_DOMAIN.to_string(),
            },
            provider_spec: None,
        }
    }
}

/// The network configuration attributes of a cluster.
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNetworkingConfig {
    /// The network ranges from which service VIPs are allocated.
    pub services: NetworkRanges,
    /// The network ranges from which POD networks are allocated.
    pub pods: NetworkRanges,
    /// Domain name for services.
    pub service_domain: String,
}

/// A list of CIDR blocks.
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRanges {
    #[serde(default, deserialize_with = "crate::schema_utils::null_to_default")]
    pub cidr_blocks: Vec<String>,
}

/// Opaque provider configuration.
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "crate::schema_utils::open_object")]
    pub value: Option<Map<String, Value>>,
}

/// The observed state of a `Cluster`. This is written by the controller.
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    /// The endpoints to communicate with the control plane.
    #[serde(default, deserialize_with = "crate::schema_utils::null_to_default")]
    pub api_endpoints: Vec<ApiEndpoint>,

    /// Provider-specific status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "crate::schema_utils::open_object")]
    pub provider_status: Option<Map<String, Value>>,

    /// Set by the controller when there is a problem reconciling the `Cluster` that requires
    /// user intervention.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,

    /// A more verbose description of `error_reason`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ClusterStatus {
    /// Returns the error reported by the controller, if any, formatted as `reason: message`.
    pub fn error(&self) -> Option<String> {
        match (&self.error_reason, &self.error_message) {
            (None, None) => None,
            (Some(reason), None) => Some(reason.clone()),
            (None, Some(message)) => Some(message.clone()),
            (Some(reason), Some(message)) => Some(format!("{}: {}", reason, message)),
        }
    }
}

/// A reachable Kubernetes API endpoint.
#[derive(Serialize, Deserialize, Debug, Default, Eq, PartialEq, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiEndpoint {
    /// The hostname on which the API server is serving.
    pub host: String,
    /// The port on which the API server is serving.
    pub port: i32,
}

impl std::fmt::Display for ApiEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl CrdExt for Cluster {
    fn object_meta(&self) -> &ObjectMeta {
        self.meta()
    }

    fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Build a `Cluster` object ready to be created in `namespace`. Objects built here are labelled as
/// managed by this tool, in addition to any `labels` provided.
pub fn create_cluster_crd<S1, S2>(
    name: S1,
    namespace: S2,
    labels: Option<&BTreeMap<String, String>>,
    cluster_spec: ClusterSpec,
) -> Cluster
where
    S1: Into<String>,
    S2: Into<String>,
{
    let mut all_labels = labels.cloned().unwrap_or_default();
    all_labels.insert(APP_MANAGED_BY.to_string(), CAPI_EVENTS.to_string());
    Cluster {
        metadata: ObjectMeta {
            name: Some(name.into()),
            namespace: Some(namespace.into()),
            labels: Some(all_labels),
            ..Default::default()
        },
        spec: cluster_spec,
        status: None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::{API_VERSION, CLUSTER_CRD_NAME, DEFAULT_NAMESPACE};
    use kube::CustomResourceExt;
    use serde_json::json;

    #[test]
    fn cluster_wire_format() {
        let cluster = create_cluster_crd("foo", DEFAULT_NAMESPACE, None, ClusterSpec::example());
        let value = serde_json::to_value(&cluster).unwrap();
        assert_eq!(value["apiVersion"], API_VERSION);
        assert_eq!(value["kind"], "Cluster");
        assert_eq!(value["metadata"]["namespace"], DEFAULT_NAMESPACE);
        assert_eq!(
            value["metadata"]["labels"][APP_MANAGED_BY],
            json!(CAPI_EVENTS)
        );
        assert_eq!(
            value["spec"],
            json!({
                "clusterNetwork": {
                    "services": { "cidrBlocks": ["10.96.0.0/12"] },
                    "pods": { "cidrBlocks": ["192.168.0.0/16"] },
                    "serviceDomain": "mydomain.com"
                }
            })
        );
    }

    #[test]
    fn status_with_null_endpoints() {
        let status: ClusterStatus = serde_json::from_value(json!({
            "apiEndpoints": null,
            "errorReason": "InvalidConfiguration"
        }))
        .unwrap();
        assert!(status.api_endpoints.is_empty());
        assert_eq!(status.error().unwrap(), "InvalidConfiguration");
    }

    #[test]
    fn status_error_formatting() {
        let status = ClusterStatus {
            error_reason: Some("CreateError".into()),
            error_message: Some("no capacity".into()),
            ..ClusterStatus::default()
        };
        assert_eq!(status.error().unwrap(), "CreateError: no capacity");
        assert!(ClusterStatus::default().error().is_none());
    }

    #[test]
    fn crd_definition() {
        let crd = Cluster::crd();
        assert_eq!(crd.metadata.name.as_deref(), Some(CLUSTER_CRD_NAME));
        assert_eq!(crd.spec.group, "cluster.k8s.io");
        assert_eq!(crd.spec.scope, "Namespaced");
        assert_eq!(crd.spec.names.kind, "Cluster");
        let version = crd.spec.versions.first().unwrap();
        assert_eq!(version.name, "v1alpha1");
        assert!(version.served);
        assert!(version
            .subresources
            .as_ref()
            .and_then(|s| s.status.as_ref())
            .is_some());
    }

    #[test]
    fn yaml_contains_spec() {
        let cluster = create_cluster_crd("bar", "ns", None, ClusterSpec::example());
        let yaml = cluster.to_yaml().unwrap();
        assert!(yaml.contains("serviceDomain: mydomain.com"));
        assert_eq!(cluster.object_name(), "bar");
        assert_eq!(cluster.object_namespace(), Some("ns"));
        assert!(!cluster.is_delete_requested());
    }
}
