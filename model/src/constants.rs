/// Helper macro to avoid retyping the API group of the `Cluster` resource when creating further
/// string constants from it. When given no parameters, this returns the API group. When given a
/// string literal parameter it adds `/parameter` to the end.
macro_rules! capi {
    () => {
        "cluster.k8s.io"
    };
    ($s:literal) => {
        concat!(capi!(), "/", $s)
    };
}

// API identifiers
pub const GROUP: &str = capi!();
pub const VERSION: &str = "v1alpha1";
pub const API_VERSION: &str = capi!("v1alpha1");
pub const CLUSTER_KIND: &str = "Cluster";
pub const CLUSTER_CRD_NAME: &str = concat!("clusters.", capi!());

// Defaults used by the event verification
pub const DEFAULT_NAMESPACE: &str = "clusterapi-test";
pub const DEFAULT_CLUSTER_NAME: &str = "foo";
pub const DEFAULT_SERVICE_DOMAIN: &str = "mydomain.com";
pub const DEFAULT_SERVICES_CIDR: &str = "10.96.0.0/12";
pub const DEFAULT_PODS_CIDR: &str = "192.168.0.0/16";

// Component names
pub const CAPI_EVENTS: &str = "capi-events";

// Standard tags https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
pub const APP_NAME: &str = "app.kubernetes.io/name";
pub const APP_PART_OF: &str = "app.kubernetes.io/part-of";
pub const APP_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

// Used to size the channel between an event watcher and its consumer
pub const EVENT_CHANNEL_CAPACITY: usize = 16;

#[test]
fn capi_constants_macro_test() {
    assert_eq!("cluster.k8s.io", capi!());
    assert_eq!("cluster.k8s.io/v1alpha1", API_VERSION);
    assert_eq!("cluster.k8s.io/foo", capi!("foo"));
    assert_eq!("clusters.cluster.k8s.io", CLUSTER_CRD_NAME);
}
