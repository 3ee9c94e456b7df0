use crate::constants::{APP_MANAGED_BY, APP_NAME, APP_PART_OF, CAPI_EVENTS};
use k8s_openapi::api::core::v1::Namespace;
use kube::api::ObjectMeta;
use maplit::btreemap;

/// Defines a namespace named `name`, labelled so that it can be recognized as created by this tool.
pub fn namespace<S>(name: S) -> Namespace
where
    S: Into<String>,
{
    let name = name.into();
    Namespace {
        metadata: ObjectMeta {
            labels: Some(btreemap! {
                APP_NAME.to_string() => name.clone(),
                APP_PART_OF.to_string() => CAPI_EVENTS.to_string(),
                APP_MANAGED_BY.to_string() => CAPI_EVENTS.to_string(),
            }),
            name: Some(name),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn namespace_labels() {
    let ns = namespace("clusterapi-test");
    assert_eq!(ns.metadata.name.as_deref(), Some("clusterapi-test"));
    let labels = ns.metadata.labels.unwrap();
    assert_eq!(labels.get(APP_NAME).unwrap(), "clusterapi-test");
    assert_eq!(labels.get(APP_MANAGED_BY).unwrap(), CAPI_EVENTS);
}
