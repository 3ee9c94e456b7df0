/// Encapsulates K8S object definitions that are created alongside `Cluster` objects
mod namespace;

pub use namespace::namespace;

use crate::Cluster;
use kube::CustomResourceExt;

/// The `Cluster` CRD as YAML, suitable for `kubectl apply`.
pub fn cluster_crd_yaml() -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&Cluster::crd())
}

#[test]
fn crd_yaml() {
    let yaml = cluster_crd_yaml().unwrap();
    assert!(yaml.contains("name: clusters.cluster.k8s.io"));
    assert!(yaml.contains("group: cluster.k8s.io"));
}
